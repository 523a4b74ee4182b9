//! Application Ports (Driven)
//!
//! - `FinamApiPort`: every upstream Finam operation the application uses

mod finam_api_port;

pub use finam_api_port::{ApiError, ErrorBody, FinamApiPort, TimeWindow};
