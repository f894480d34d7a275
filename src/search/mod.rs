//! Search orchestration module
//!
//! Validates the query, picks a backend, drives the transport into a
//! bounded buffer and renders the extracted results as a text report.

mod error;
mod executor;
mod models;

pub use error::{ErrorKind, SearchError};
pub use executor::{ToolOutput, WebSearch};
pub use models::*;
