//! DuckDuckGo HTML engine (anonymous fallback)
//!
//! The HTML endpoint needs no key, but its pages carry several kilobytes of
//! boilerplate before the first result. The engine asks the accumulator to
//! skip up to the results container, then scrapes result blocks with a
//! bounded marker scan instead of a DOM.

use super::traits::*;
use crate::network::{accept_html, FillMode};
use crate::results::ResultSet;
use crate::search::SearchError;
use crate::text::{decode, sanitize, truncate_at_boundary};

/// Default HTML endpoint
pub const DUCKDUCKGO_HTML_URL: &str = "https://html.duckduckgo.com/html/";

/// Start of the results container; everything before it is discarded
pub const RESULTS_MARKER: &str = "class=\"results\"";

const TITLE_MARKER: &str = "class=\"result__a\"";
const SNIPPET_MARKER: &str = "class=\"result__snippet\"";
const SNIPPET_CLOSERS: [&str; 3] = ["</a>", "</span>", "</td>"];

/// Query parameter carrying the real destination of a wrapped link
const REDIRECT_PARAM: &str = "uddg=";

/// How far before a title marker the opening `<a` may sit
const ANCHOR_LOOKBACK: usize = 500;
/// How far past a title marker the `href` may start
const HREF_LOOKAHEAD: usize = 20;

const RAW_MAX: usize = 511;
const TITLE_MAX: usize = 255;
const SNIPPET_MAX: usize = 511;
const URL_MAX: usize = 511;

/// DuckDuckGo web search engine
#[derive(Debug, Clone)]
pub struct DuckDuckGo {
    html_url: String,
}

impl DuckDuckGo {
    pub fn new() -> Self {
        Self::with_url(DUCKDUCKGO_HTML_URL)
    }

    pub fn with_url(html_url: impl Into<String>) -> Self {
        Self {
            html_url: html_url.into(),
        }
    }
}

impl Default for DuckDuckGo {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for DuckDuckGo {
    fn name(&self) -> &str {
        "DuckDuckGo"
    }

    fn fill_mode(&self) -> FillMode {
        FillMode::SkipUntil(RESULTS_MARKER)
    }

    fn request(&self, params: &RequestParams) -> EngineRequest {
        EngineRequest::post(&self.html_url)
            .header("Accept", accept_html())
            .form(format!("q={}", params.encoded_query))
    }

    fn response(&self, response: EngineResponse<'_>) -> Result<ResultSet, SearchError> {
        if !response.is_success() {
            return Err(SearchError::UpstreamStatus {
                provider: self.name().to_string(),
                status: response.status,
            });
        }

        Ok(extract_results(&response.text))
    }
}

/// Scrape up to [`crate::RESULT_COUNT`] results from DuckDuckGo HTML.
pub fn extract_results(html: &str) -> ResultSet {
    let mut results = ResultSet::new();
    let mut cursor = 0;

    while !results.is_full() {
        let Some(found) = html[cursor..].find(TITLE_MARKER) else {
            break;
        };
        let marker = cursor + found;

        let url = extract_url(html, marker);

        let Some(gt) = html[marker..].find('>') else {
            break;
        };
        let content = marker + gt + 1;
        let title = match html[content..].find("</a>") {
            Some(len) => {
                cursor = content + len + "</a>".len();
                let raw = truncate_at_boundary(&html[content..content + len], RAW_MAX);
                sanitize(raw, TITLE_MAX)
            }
            None => {
                cursor = content;
                String::new()
            }
        };

        let snippet = extract_snippet(html, &mut cursor);

        results.push(
            title.trim_start_matches(' '),
            url,
            snippet.trim_start_matches(' '),
        );
    }

    results
}

/// Destination of the anchor whose class marker sits at `marker`.
fn extract_url(html: &str, marker: usize) -> String {
    let bytes = html.as_bytes();
    let floor = marker.saturating_sub(ANCHOR_LOOKBACK);

    let mut start = (floor..=marker)
        .rev()
        .find(|&i| bytes[i] == b'<' && matches!(bytes.get(i + 1), Some(b'a' | b'A')))
        .unwrap_or(floor);
    while !html.is_char_boundary(start) {
        start += 1;
    }

    let Some(found) = html[start..].find("href=\"") else {
        return String::new();
    };
    let value_start = start + found + "href=\"".len();
    if start + found >= marker + HREF_LOOKAHEAD {
        return String::new();
    }
    let Some(len) = html[value_start..].find('"') else {
        return String::new();
    };

    let href = truncate_at_boundary(&html[value_start..value_start + len], URL_MAX);
    match href.find(REDIRECT_PARAM) {
        Some(pos) => {
            let wrapped = &href[pos + REDIRECT_PARAM.len()..];
            decode(wrapped.split('&').next().unwrap_or_default())
        }
        None => href.to_string(),
    }
}

/// Snippet belonging to the result whose title ended at `cursor`.
///
/// Only a snippet marker that precedes the next title marker counts, and its
/// closing tag must precede it too. On success `cursor` moves to the closer.
fn extract_snippet(html: &str, cursor: &mut usize) -> String {
    let from = *cursor;
    let Some(found) = html[from..].find(SNIPPET_MARKER) else {
        return String::new();
    };
    let snippet = from + found;
    let next_result = html[from..].find(TITLE_MARKER).map(|p| from + p);
    if next_result.map_or(false, |next| next < snippet) {
        return String::new();
    }

    let Some(gt) = html[snippet..].find('>') else {
        return String::new();
    };
    let content = snippet + gt + 1;

    let end = SNIPPET_CLOSERS
        .iter()
        .filter_map(|closer| html[content..].find(closer).map(|p| content + p))
        .find(|&end| next_result.map_or(true, |next| end < next));
    let Some(end) = end else {
        return String::new();
    };

    *cursor = end;
    sanitize(truncate_at_boundary(&html[content..end], RAW_MAX), SNIPPET_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::NO_TITLE;
    use std::borrow::Cow;

    fn block(i: usize) -> String {
        format!(
            r#"<div class="result results_links results_links_deep web-result">
  <div class="links_main links_deep result__body">
    <h2 class="result__title">
      <a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fsite{i}.example%2Fpage%3Fid%3D{i}&amp;rut=abc{i}">Title <b>{i}</b></a>
    </h2>
    <a class="result__snippet" href="//duckduckgo.com/l/?uddg=x">Snippet &amp; text
      {i}</a>
  </div>
</div>
"#
        )
    }

    fn page(count: usize) -> String {
        let body: String = (1..=count).map(block).collect();
        format!(r#"<div id="links" class="results">{body}</div>"#)
    }

    #[test]
    fn test_five_blocks_in_document_order() {
        let results = extract_results(&page(5));
        assert_eq!(results.len(), 5);

        for (i, result) in results.iter().enumerate() {
            let n = i + 1;
            assert_eq!(result.rank, n);
            assert_eq!(result.title, format!("Title {n}"));
            assert_eq!(result.url, format!("https://site{n}.example/page?id={n}"));
            assert_eq!(result.snippet, format!("Snippet & text {n}"));
        }
    }

    #[test]
    fn test_stops_at_five() {
        let results = extract_results(&page(8));
        assert_eq!(results.len(), 5);
        assert_eq!(results.iter().last().unwrap().title, "Title 5");
    }

    #[test]
    fn test_no_blocks() {
        assert!(extract_results(r#"<div class="results"><p>No results.</p></div>"#).is_empty());
        assert!(extract_results("").is_empty());
    }

    #[test]
    fn test_unwraps_redirect() {
        let html = r#"<a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=1">Example</a>"#;
        let results = extract_results(html);
        assert_eq!(results.iter().next().unwrap().url, "https://example.com");
    }

    #[test]
    fn test_plain_href_is_literal() {
        let html = r#"<a href="https://plain.example/a?b=c" class="result__a">Plain</a>"#;
        let results = extract_results(html);
        assert_eq!(results.iter().next().unwrap().url, "https://plain.example/a?b=c");
    }

    #[test]
    fn test_href_out_of_window_gives_empty_url() {
        let html = r#"<a class="result__a" data-tracking="aaaaaaaaaaaaaaaa" href="https://late.example">Late</a>"#;
        let results = extract_results(html);
        let first = results.iter().next().unwrap();
        assert_eq!(first.url, "");
        assert_eq!(first.title, "Late");
    }

    #[test]
    fn test_snippet_never_leaks_from_next_result() {
        let html = concat!(
            r#"<a class="result__a" href="https://one.example">One</a>"#,
            r#"<a class="result__a" href="https://two.example">Two</a>"#,
            r#"<span class="result__snippet">belongs to two</span>"#,
        );
        let results: Vec<_> = extract_results(html).iter().cloned().collect();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].snippet, "");
        assert_eq!(results[1].snippet, "belongs to two");
    }

    #[test]
    fn test_snippet_closer_past_next_result_is_rejected() {
        let html = concat!(
            r#"<a class="result__a" href="https://one.example">One</a>"#,
            r#"<div class="result__snippet">unterminated "#,
            r#"<a class="result__a" href="https://two.example">Two</a>"#,
        );
        let results: Vec<_> = extract_results(html).iter().cloned().collect();

        assert_eq!(results[0].snippet, "");
        assert_eq!(results[1].title, "Two");
    }

    #[test]
    fn test_span_closer_and_placeholder_title() {
        let html = r#"<a class="result__a" href="https://x.example">  </a><span class="result__snippet">  spaced   out </span>"#;
        let results = extract_results(html);
        let first = results.iter().next().unwrap();

        assert_eq!(first.title, NO_TITLE);
        assert_eq!(first.snippet, "spaced out ");
    }

    #[test]
    fn test_long_title_is_bounded() {
        let long = "w".repeat(2000);
        let html = format!(r#"<a class="result__a" href="https://x.example">{long}</a>"#);
        let results = extract_results(&html);
        assert_eq!(results.iter().next().unwrap().title.len(), TITLE_MAX);
    }

    #[test]
    fn test_engine_request_and_status() {
        let ddg = DuckDuckGo::with_url("http://127.0.0.1:9/html/");
        let request = ddg.request(&RequestParams::new("rust+async"));

        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.body.as_deref(), Some("q=rust+async"));
        assert_eq!(ddg.fill_mode(), FillMode::SkipUntil(RESULTS_MARKER));

        let accepted = ddg
            .response(EngineResponse {
                status: 202,
                text: Cow::Borrowed(""),
            })
            .unwrap();
        assert!(accepted.is_empty());

        let err = ddg
            .response(EngineResponse {
                status: 403,
                text: Cow::Borrowed(""),
            })
            .unwrap_err();
        assert!(matches!(err, SearchError::UpstreamStatus { status: 403, .. }));
    }
}
