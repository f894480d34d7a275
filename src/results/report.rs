//! Plain-text report layout

use super::types::ResultSet;
use crate::text::truncate_at_boundary;

/// Report body when nothing was extracted
pub const NO_RESULTS: &str = "No web results found.";

/// Clip `text` to at most `limit` bytes on a char boundary.
pub fn bounded(text: &str, limit: usize) -> String {
    truncate_at_boundary(text, limit).to_string()
}

/// Render results as numbered entries within `limit` bytes.
///
/// An entry that does not fit is cut at a char boundary and nothing
/// follows it.
pub fn render(results: &ResultSet, limit: usize) -> String {
    if results.is_empty() {
        return bounded(NO_RESULTS, limit);
    }

    let mut out = String::new();
    for result in results {
        let entry = format!(
            "{}. {}\n   {}\n   {}\n\n",
            result.rank, result.title, result.url, result.snippet
        );
        let room = limit - out.len();
        if entry.len() > room {
            out.push_str(truncate_at_boundary(&entry, room));
            break;
        }
        out.push_str(&entry);
    }
    out
}
