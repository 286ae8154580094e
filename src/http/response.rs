use std::collections::BTreeMap;

/// Version token used for every response the server produces.
///
/// Exchanges are never persistent, so the server speaks HTTP/1.0 framing.
pub const HTTP_VERSION: &str = "HTTP/1.0";

/// HTTP status codes produced by the server.
///
/// - `Ok` (200): File found and transmitted
/// - `BadRequest` (400): Malformed request head
/// - `NotFound` (404): Unmapped route, rejected path, or missing/non-regular file
/// - `NotImplemented` (501): Unsupported method or unrepresentable file size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
    /// 501 Not Implemented
    NotImplemented,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use tempest::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::NotImplemented => 501,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use tempest::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::NotImplemented.reason_phrase(), "Not Implemented");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::NotImplemented => "Not Implemented",
        }
    }
}

/// A complete HTTP response head plus an optional in-memory body.
///
/// File responses leave `body` empty and announce the file size in
/// `Content-Length`; the file bytes are streamed after the head.
#[derive(Debug, Clone)]
pub struct Response {
    /// Version token for the status line
    pub version: String,
    /// The HTTP status code
    pub status: StatusCode,
    /// Headers, serialized in key order
    pub headers: BTreeMap<String, String>,
    /// In-memory body, written verbatim after the head
    pub body: Vec<u8>,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```ignore
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .header("Content-Type", "text/html")
///     .body(b"<p>hi</p>".to_vec())
///     .build();
/// ```
pub struct ResponseBuilder {
    version: String,
    status: StatusCode,
    headers: BTreeMap<String, String>,
    body: Vec<u8>,
}

impl ResponseBuilder {
    /// Creates a new response builder with the specified status code.
    pub fn new(status: StatusCode) -> Self {
        Self {
            version: HTTP_VERSION.to_string(),
            status,
            headers: BTreeMap::new(),
            body: Vec::new(),
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Adds or replaces a header.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets the response body.
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Builds the final Response.
    ///
    /// Adds a Content-Length matching the body unless one was set
    /// explicitly, which is how streamed responses announce their size.
    pub fn build(mut self) -> Response {
        self.headers
            .entry("Content-Length".to_string())
            .or_insert_with(|| self.body.len().to_string());

        Response {
            version: self.version,
            status: self.status,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Response {
    /// Head of a 200 response whose body is a file of `file_size` bytes.
    pub fn file_head(file_size: u64) -> Self {
        ResponseBuilder::new(StatusCode::Ok)
            .header("Content-Length", file_size.to_string())
            .build()
    }

    /// Creates a 400 Bad Request response with an empty body.
    pub fn bad_request() -> Self {
        ResponseBuilder::new(StatusCode::BadRequest)
            .header("Content-Type", "text/html")
            .build()
    }

    /// Creates a 404 Not Found response naming the requested path.
    pub fn not_found(requested_path: &str) -> Self {
        html_error(
            StatusCode::NotFound,
            "The requested file could not be found",
            requested_path,
        )
    }

    /// Creates a 501 Not Implemented response naming the requested path.
    pub fn not_implemented(requested_path: &str) -> Self {
        html_error(
            StatusCode::NotImplemented,
            "could not serve the file because some required functionality \
             is not implemented in the web server",
            requested_path,
        )
    }
}

fn html_error(status: StatusCode, message: &str, requested_path: &str) -> Response {
    let body = format!("<h2>{}</h2><p>{}</p>", message, requested_path);
    ResponseBuilder::new(status)
        .header("Content-Type", "text/html")
        .body(body.into_bytes())
        .build()
}
