use std::collections::HashMap;
use std::fmt;

/// HTTP request methods.
///
/// The file server only answers GET and POST, but any token is accepted
/// by the parser so that other methods can be answered with 501 instead
/// of tearing the connection down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// POST - Submit data; served like GET, the body is never read
    POST,
    /// PUT - Replace a resource
    PUT,
    /// DELETE - Delete a resource
    DELETE,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// OPTIONS - Describe communication options
    OPTIONS,
    /// PATCH - Partial modification of a resource
    PATCH,
    /// Any other method token, kept verbatim
    Extension(String),
}

/// Represents a parsed HTTP request from a client.
///
/// Built once per connection by the parser and never modified afterwards.
/// Request bodies are not part of the exchange and are never read.
#[derive(Debug, Clone)]
pub struct Request {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The percent-decoded request target (e.g., "/docs/index.html")
    pub path: String,
    /// HTTP version token as sent by the client (e.g., "HTTP/1.0")
    pub version: String,
    /// Request headers; a repeated key keeps the last value
    pub headers: HashMap<String, String>,
}

impl Method {
    /// Parses an HTTP method token.
    ///
    /// Matching is case-sensitive; unknown tokens become
    /// [`Method::Extension`].
    ///
    /// # Example
    ///
    /// ```
    /// # use tempest::http::request::Method;
    /// assert_eq!(Method::parse("GET"), Method::GET);
    /// assert_eq!(Method::parse("get"), Method::Extension("get".to_string()));
    /// ```
    pub fn parse(s: &str) -> Self {
        match s {
            "GET" => Method::GET,
            "POST" => Method::POST,
            "PUT" => Method::PUT,
            "DELETE" => Method::DELETE,
            "HEAD" => Method::HEAD,
            "OPTIONS" => Method::OPTIONS,
            "PATCH" => Method::PATCH,
            other => Method::Extension(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::HEAD => "HEAD",
            Method::OPTIONS => "OPTIONS",
            Method::PATCH => "PATCH",
            Method::Extension(token) => token,
        }
    }

    /// Whether a file-serving directory answers this method with content.
    pub fn is_servable(&self) -> bool {
        matches!(self, Method::GET | Method::POST)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
