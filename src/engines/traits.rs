//! Engine traits and types

use crate::network::FillMode;
use crate::results::ResultSet;
use crate::search::SearchError;
use std::borrow::Cow;

/// Parameters for building a search request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParams {
    /// Query already percent/plus encoded
    pub encoded_query: String,
    /// Number of results to ask for
    pub count: usize,
}

impl RequestParams {
    pub fn new(encoded_query: impl Into<String>) -> Self {
        Self {
            encoded_query: encoded_query.into(),
            count: crate::RESULT_COUNT,
        }
    }
}

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// HTTP request to be made for an engine.
///
/// The URL carries the query string already encoded; headers keep their
/// insertion order so the raw HTTP/1.1 form is deterministic.
#[derive(Debug, Clone)]
pub struct EngineRequest {
    /// URL to request
    pub url: String,
    /// HTTP method
    pub method: HttpMethod,
    /// Request headers
    pub headers: Vec<(String, String)>,
    /// Request body, already encoded
    pub body: Option<String>,
}

impl EngineRequest {
    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Get,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Create a POST request
    pub fn post(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Post,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Add a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Attach an already-encoded form body
    pub fn form(self, body: impl Into<String>) -> Self {
        let mut request = self.header("Content-Type", "application/x-www-form-urlencoded");
        request.body = Some(body.into());
        request
    }

    /// Look up a header value by case-insensitive name
    pub fn header_value(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Raw HTTP/1.1 form of this request for `host`, targeting `path`.
    pub fn to_http1(&self, host: &str, path: &str) -> String {
        let mut head = format!("{} {} HTTP/1.1\r\nHost: {}\r\n", self.method.as_str(), path, host);
        for (key, value) in &self.headers {
            head.push_str(&format!("{}: {}\r\n", key, value));
        }
        if let Some(ref body) = self.body {
            head.push_str(&format!("Content-Length: {}\r\n", body.len()));
        }
        head.push_str("Connection: close\r\n\r\n");
        if let Some(ref body) = self.body {
            head.push_str(body);
        }
        head
    }
}

/// Response handed back to an engine once the transport is done
#[derive(Debug)]
pub struct EngineResponse<'a> {
    /// HTTP status code
    pub status: u16,
    /// Whatever the accumulator kept of the body
    pub text: Cow<'a, str>,
}

impl EngineResponse<'_> {
    /// Check if response is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A search provider: how to ask, how to buffer the reply, how to read it
pub trait Engine: Send + Sync {
    /// Engine name, used in logs and error reports
    fn name(&self) -> &str;

    /// How the response buffer should be filled
    fn fill_mode(&self) -> FillMode {
        FillMode::Record
    }

    /// Build the HTTP request for a search
    fn request(&self, params: &RequestParams) -> EngineRequest;

    /// Parse the HTTP response into results
    fn response(&self, response: EngineResponse<'_>) -> Result<ResultSet, SearchError>;
}
