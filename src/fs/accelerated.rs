//! File serving through `sendfile(2)` when the client is a real socket.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::fs::directory::{Served, send_in_memory_response};
use crate::fs::file_handle::FileHandle;
use crate::fs::path::complete_served_path;
use crate::fs::portable::{canonical_root, copy_file};
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};
use crate::http::writer::ResponseWriter;
use crate::server::connection::Sender;

pub struct AcceleratedFileDirectory {
    root: PathBuf,
}

impl AcceleratedFileDirectory {
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

        let file = match FileHandle::open_read(&full_path).await {
            Ok(file) => file,
            Err(e) if is_missing_target(&e) => {
                debug!(path = %full_path.display(), error = %e, "No such file");
                return send_in_memory_response(&Response::not_found(&request.path), sender)
                    .await;
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to open {}", full_path.display()));
            }
        };

        let status = file
            .status()
            .with_context(|| format!("failed to stat {}", full_path.display()))?;

        if usize::try_from(status.size).is_err() {
            warn!(path = %full_path.display(), file_size = status.size, "File too large for this platform");
            return send_in_memory_response(&Response::not_implemented(&request.path), sender)
                .await;
        }

        if !status.is_regular {
            warn!(path = %full_path.display(), "Not a regular file");
            return send_in_memory_response(&Response::not_found(&request.path), sender).await;
        }

        ResponseWriter::head_only(&Response::file_head(status.size))
            .write_to(sender)
            .await?;
        // the head must reach the socket before sendfile writes behind the buffer
        sender.flush().await?;

        if let Some(socket) = sender.raw_response() {
            debug!(path = %full_path.display(), file_size = status.size, "Sending file with sendfile");
            let sent = file.send_to(&socket, status.size).await?;
            if sent != status.size {
                anyhow::bail!(
                    "sending the whole file failed ({} of {} bytes)",
                    sent,
                    status.size
                );
            }
            return Ok(Served {
                status: StatusCode::Ok,
                bytes: sent,
            });
        }

        debug!(path = %full_path.display(), file_size = status.size, "No raw socket, copying file");
        let mut file = file.into_async();
        let copied = copy_file(&mut file, sender).await?;
        if copied != status.size {
            anyhow::bail!(
                "{} changed size during transmission ({} of {} bytes)",
                full_path.display(),
                copied,
                status.size
            );
        }
        sender.flush().await?;

        Ok(Served {
            status: StatusCode::Ok,
            bytes: copied,
        })
    }
}

/// Open failures that mean the requested name does not lead to a file.
///
/// Everything else (permissions, I/O errors) is a fault of the served tree.
fn is_missing_target(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory | io::ErrorKind::InvalidInput
    ) || matches!(e.raw_os_error(), Some(libc::ENAMETOOLONG | libc::ELOOP))
}
