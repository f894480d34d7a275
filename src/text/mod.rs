//! Text helpers shared by the extractors
//!
//! Percent encoding for outbound queries, percent decoding for wrapped
//! result links, and markup sanitizing for titles and snippets.

mod percent;
mod sanitize;

pub use percent::{decode, encode};
pub use sanitize::{sanitize, truncate_at_boundary};
