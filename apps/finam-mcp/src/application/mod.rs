//! Application Layer - Ports, DTOs and use cases.
//!
//! - **DTOs**: Typed Finam API responses and request payloads
//! - **Ports**: The `FinamApiPort` contract and its error taxonomy
//! - **Use Cases**: Asset search over the full reference listing

pub mod dto;
pub mod ports;
pub mod use_cases;

pub use dto::*;
pub use ports::*;
pub use use_cases::*;
