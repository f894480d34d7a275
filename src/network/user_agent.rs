//! Request header values

use crate::VERSION;

/// User agent sent to providers unless settings override it
pub fn default_user_agent() -> String {
    format!("Mozilla/5.0 (compatible; webdigest/{})", VERSION)
}

/// Standard accept header for HTML requests
pub fn accept_html() -> &'static str {
    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"
}

/// Accept header for JSON APIs
pub fn accept_json() -> &'static str {
    "application/json"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_user_agent() {
        let ua = default_user_agent();
        assert!(ua.starts_with("Mozilla/5.0 (compatible; webdigest/"));
        assert!(ua.ends_with(')'));
    }
}
