use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::response::Response;

/// Serializes the status line, the headers and the blank separator line.
pub fn serialize_head(resp: &Response) -> Vec<u8> {
    let mut buf = Vec::new();

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        resp.version,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    // Headers
    for (k, v) in &resp.headers {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    buf
}

/// Serializes the head followed by the in-memory body.
pub fn serialize_response(resp: &Response) -> Vec<u8> {
    let mut buf = serialize_head(resp);
    buf.extend_from_slice(&resp.body);
    buf
}

/// Writes a serialized response into a sink.
///
/// Nothing is flushed: a file payload may still follow the head in the same
/// sink, so flushing is left to whoever finishes the response.
pub struct ResponseWriter {
    buffer: Vec<u8>,
    written: usize,
}

impl ResponseWriter {
    /// Writer for the whole response, body included.
    pub fn new(response: &Response) -> Self {
        Self {
            buffer: serialize_response(response),
            written: 0,
        }
    }

    /// Writer for the head only; the caller streams the body itself.
    pub fn head_only(response: &Response) -> Self {
        Self {
            buffer: serialize_head(response),
            written: 0,
        }
    }

    pub async fn write_to<W>(&mut self, sink: &mut W) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        while self.written < self.buffer.len() {
            let n = sink.write(&self.buffer[self.written..]).await?;

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            self.written += n;
        }

        Ok(())
    }
}
