//! Domain Layer - Wire vocabulary and pure search logic.
//!
//! Types here have no I/O. They describe the closed enumerations the Finam
//! API speaks, how caller timestamps are interpreted, and how an asset
//! collection is filtered and windowed.

/// Closed wire enumerations with name-then-value parsing.
pub mod enums;

/// Asset filtering and pagination window.
pub mod asset_search;

/// ISO-8601 timestamp parsing and UTC encoding.
pub mod timestamp;
