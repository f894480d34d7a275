//! Result types and report rendering

mod report;
mod types;

pub use report::{bounded, render};
pub use types::*;
