//! Search engine module
//!
//! Defines the Engine trait, the two providers, and the per-call choice
//! between them.

mod selector;
mod traits;

// Engine implementations
pub mod brave;
pub mod duckduckgo;

pub use selector::{Backend, Route};
pub use traits::*;
