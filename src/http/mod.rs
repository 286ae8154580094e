//! HTTP protocol implementation.
//!
//! Only the subset a static file server needs: one request head per
//! connection, no bodies, no persistent connections.
//!
//! - **`uri`**: Percent-decoding of request targets
//! - **`request`**: HTTP request representation
//! - **`parser`**: Reads a request line and header block from a buffered stream
//! - **`response`**: HTTP response representation, builder and canned error pages
//! - **`writer`**: Serializes responses into a byte sink
//!
//! # Example
//!
//! ```ignore
//! use tempest::http::parser::parse_request;
//!
//! let mut head: &[u8] = b"GET /index.html HTTP/1.0\r\n\r\n";
//! let request = parse_request(&mut head).await?;
//! assert_eq!(request.path, "/index.html");
//! ```

pub mod uri;
pub mod request;
pub mod response;
pub mod parser;
pub mod writer;
