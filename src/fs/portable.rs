//! File serving with nothing but buffered reads and writes.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use bytes::BytesMut;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::fs::directory::{Served, send_in_memory_response};
use crate::fs::path::complete_served_path;
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};
use crate::http::writer::ResponseWriter;
use crate::server::connection::Sender;

/// Default buffer size for copying file contents
const BUFFER_SIZE: usize = 8192;

pub struct PortableFileDirectory {
    root: PathBuf,
}

impl PortableFileDirectory {
    /// Serves files below `root`, which is canonicalized here and fixed from
    /// then on.
    pub fn new(root: impl AsRef<Path>) -> anyhow::Result<Self> {
        let root = canonical_root(root.as_ref())?;
        Ok(Self { root })
    }

    pub async fn respond(
        &self,
        request: &Request,
        sub_path: &str,
        sender: &mut Sender,
    ) -> anyhow::Result<Served> {
        if !request.method.is_servable() {
            warn!(method = %request.method, path = %request.path, "Method not implemented");
            return send_in_memory_response(&Response::not_implemented(&request.path), sender)
                .await;
        }

        let Some(full_path) = complete_served_path(&self.root, sub_path) else {
            warn!(path = %request.path, "Rejected request path");
            return send_in_memory_response(&Response::not_found(&request.path), sender).await;
        };

        let mut file = match File::open(&full_path).await {
            Ok(file) => file,
            Err(e) => {
                debug!(path = %full_path.display(), error = %e, "Cannot open file");
                return send_in_memory_response(&Response::not_found(&request.path), sender)
                    .await;
            }
        };

        let metadata = file
            .metadata()
            .await
            .with_context(|| format!("failed to stat {}", full_path.display()))?;

        if !metadata.is_file() {
            warn!(path = %full_path.display(), "Not a regular file");
            return send_in_memory_response(&Response::not_found(&request.path), sender).await;
        }

        let file_size = metadata.len();
        if usize::try_from(file_size).is_err() {
            warn!(path = %full_path.display(), file_size, "File too large for this platform");
            return send_in_memory_response(&Response::not_implemented(&request.path), sender)
                .await;
        }

        debug!(path = %full_path.display(), file_size, "Copying file");
        ResponseWriter::head_only(&Response::file_head(file_size))
            .write_to(sender)
            .await?;

        let copied = copy_file(&mut file, sender).await?;
        if copied != file_size {
            anyhow::bail!(
                "{} changed size during transmission ({} of {} bytes)",
                full_path.display(),
                copied,
                file_size
            );
        }
        sender.flush().await?;

        Ok(Served {
            status: StatusCode::Ok,
            bytes: file_size,
        })
    }
}

/// Resolves a served root to its absolute canonical form.
pub(crate) fn canonical_root(root: &Path) -> anyhow::Result<PathBuf> {
    std::fs::canonicalize(root)
        .with_context(|| format!("cannot serve {}", root.display()))
}

/// Copies `source` into `sink` until end of file and returns the byte count.
pub(crate) async fn copy_file<R, W>(source: &mut R, sink: &mut W) -> io::Result<u64>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buffer = BytesMut::with_capacity(BUFFER_SIZE);
    let mut total = 0u64;

    loop {
        buffer.clear();
        let n = source.read_buf(&mut buffer).await?;
        if n == 0 {
            return Ok(total);
        }

        sink.write_all(&buffer).await?;
        total += n as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn copy_file_moves_every_byte() {
        let data: Vec<u8> = (0..3 * BUFFER_SIZE + 17).map(|i| i as u8).collect();
        let mut source: &[u8] = &data;
        let mut sink = Vec::new();

        let copied = copy_file(&mut source, &mut sink).await.unwrap();

        assert_eq!(copied, data.len() as u64);
        assert_eq!(sink, data);
    }
}
