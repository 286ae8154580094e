use std::collections::HashMap;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::http::request::{Method, Request};
use crate::http::uri::{decode_in_place, DecodeError};

#[derive(Debug, Error)]
pub enum ParseError {
    /// The stream ended before the blank line closing the header block.
    #[error("request ended before the end of the header block")]
    UnexpectedEof,
    /// The `\r` closing the header block was not followed by `\n`.
    #[error("missing new-line at the end of the header block")]
    MissingTerminator,
    #[error("request head is not valid UTF-8")]
    InvalidUtf8,
    #[error("invalid request target: {0}")]
    Decode(#[from] DecodeError),
    #[error("failed to read request: {0}")]
    Io(#[from] std::io::Error),
}

/// Reads one request line and one header block from `source`.
///
/// Consumes exactly the bytes of the request head, up to and including the
/// terminating `\r\n`. Anything after that (a body, for instance) is left
/// in the stream untouched.
pub async fn parse_request<R>(source: &mut R) -> Result<Request, ParseError>
where
    R: AsyncBufRead + Unpin,
{
    // GET /file HTTP/1.0\r\n
    let method = read_field(source, b' ').await?;
    let method = Method::parse(&into_string(method)?);

    let mut target = read_field(source, b' ').await?;
    decode_in_place(&mut target)?;
    let path = into_string(target)?;

    let mut version = read_field(source, b'\n').await?;
    trim_trailing(&mut version, b'\r');
    let version = into_string(version)?;

    let mut headers = HashMap::new();
    while peek(source).await? != b'\r' {
        // key: value\r\n
        let key = read_field(source, b':').await?;
        if peek(source).await? == b' ' {
            source.consume(1);
        }
        let mut value = read_field(source, b'\n').await?;
        trim_trailing(&mut value, b'\r');

        headers.insert(into_string(key)?, into_string(value)?);
    }

    // the header block ends with \r\n
    source.consume(1);
    match source.read_u8().await {
        Ok(b'\n') => {}
        Ok(_) => return Err(ParseError::MissingTerminator),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(ParseError::UnexpectedEof);
        }
        Err(e) => return Err(e.into()),
    }

    Ok(Request {
        method,
        path,
        version,
        headers,
    })
}

/// Reads up to `delimiter` and returns the bytes before it.
async fn read_field<R>(source: &mut R, delimiter: u8) -> Result<Vec<u8>, ParseError>
where
    R: AsyncBufRead + Unpin,
{
    let mut field = Vec::new();
    source.read_until(delimiter, &mut field).await?;
    if field.pop() != Some(delimiter) {
        return Err(ParseError::UnexpectedEof);
    }
    Ok(field)
}

async fn peek<R>(source: &mut R) -> Result<u8, ParseError>
where
    R: AsyncBufRead + Unpin,
{
    let available = source.fill_buf().await?;
    available.first().copied().ok_or(ParseError::UnexpectedEof)
}

fn trim_trailing(field: &mut Vec<u8>, trailing: u8) {
    if field.last() == Some(&trailing) {
        field.pop();
    }
}

fn into_string(bytes: Vec<u8>) -> Result<String, ParseError> {
    String::from_utf8(bytes).map_err(|_| ParseError::InvalidUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn parse_simple_get() {
        let mut req: &[u8] = b"GET / HTTP/1.0\r\nHost: example.com\r\n\r\n";

        let parsed = parse_request(&mut req).await.unwrap();

        assert_eq!(parsed.path, "/");
        assert_eq!(parsed.headers.get("Host").unwrap(), "example.com");
        assert!(req.is_empty());
    }

    #[test]
    fn trim_trailing_removes_one_byte_only() {
        let mut field = b"value\r\r".to_vec();
        trim_trailing(&mut field, b'\r');
        assert_eq!(field, b"value\r");
    }
}
