use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::fs::portable::PortableFileDirectory;
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};
use crate::http::writer::ResponseWriter;
use crate::server::connection::Sender;

#[cfg(target_os = "linux")]
use crate::fs::accelerated::AcceleratedFileDirectory;

pub type RespondFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<Served>> + Send + 'a>>;

/// What a directory answered with: the status line it wrote and the size of
/// the body that followed the head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Served {
    pub status: StatusCode,
    pub bytes: u64,
}

/// Looks up the child directory for one path segment.
///
/// Children are owned elsewhere; the lookup never consumes or modifies them.
pub type SubDirMapping = Box<dyn Fn(&str) -> Option<Arc<Directory>> + Send + Sync>;

/// A node of the served tree.
///
/// Immutable once built, so one tree can serve any number of connections
/// concurrently behind an `Arc`.
pub enum Directory {
    Virtual(VirtualDirectory),
    Portable(PortableFileDirectory),
    #[cfg(target_os = "linux")]
    Accelerated(AcceleratedFileDirectory),
}

impl Directory {
    pub fn virtual_dir<F>(mapping: F) -> Self
    where
        F: Fn(&str) -> Option<Arc<Directory>> + Send + Sync + 'static,
    {
        Directory::Virtual(VirtualDirectory::new(Box::new(mapping)))
    }

    pub fn portable(root: impl AsRef<Path>) -> anyhow::Result<Self> {
        Ok(Directory::Portable(PortableFileDirectory::new(root)?))
    }

    #[cfg(target_os = "linux")]
    pub fn accelerated(root: impl AsRef<Path>) -> anyhow::Result<Self> {
        Ok(Directory::Accelerated(AcceleratedFileDirectory::new(root)?))
    }

    /// The fastest file directory this platform supports.
    pub fn optimal(root: impl AsRef<Path>) -> anyhow::Result<Self> {
        #[cfg(target_os = "linux")]
        {
            Self::accelerated(root)
        }
        #[cfg(not(target_os = "linux"))]
        {
            Self::portable(root)
        }
    }

    /// Answers `request` for the still unresolved `sub_path`.
    ///
    /// Misses and unsupported requests are answered in-band (404/501); only
    /// transport and filesystem faults come back as errors.
    pub fn respond<'a>(
        &'a self,
        request: &'a Request,
        sub_path: &'a str,
        sender: &'a mut Sender,
    ) -> RespondFuture<'a> {
        Box::pin(async move {
            match self {
                Directory::Virtual(dir) => dir.respond(request, sub_path, sender).await,
                Directory::Portable(dir) => dir.respond(request, sub_path, sender).await,
                #[cfg(target_os = "linux")]
                Directory::Accelerated(dir) => dir.respond(request, sub_path, sender).await,
            }
        })
    }
}

/// Routes by the next path segment to a child directory.
pub struct VirtualDirectory {
    mapping: SubDirMapping,
}

impl VirtualDirectory {
    pub fn new(mapping: SubDirMapping) -> Self {
        Self { mapping }
    }

    pub async fn respond(
        &self,
        request: &Request,
        sub_path: &str,
        sender: &mut Sender,
    ) -> anyhow::Result<Served> {
        let (segment, rest) = split_segment(sub_path);

        match (self.mapping)(segment) {
            Some(child) => {
                debug!(segment, rest, "Delegating to sub-directory");
                child.respond(request, rest, sender).await
            }
            None => {
                warn!(path = %request.path, segment, "No directory mapped for segment");
                send_in_memory_response(&Response::not_found(&request.path), sender).await
            }
        }
    }
}

/// Splits `/a/b/c` into `a` and `/b/c`. One leading separator is dropped;
/// the remainder keeps its own.
fn split_segment(sub_path: &str) -> (&str, &str) {
    let trimmed = sub_path.strip_prefix('/').unwrap_or(sub_path);
    match trimmed.find('/') {
        Some(end) => trimmed.split_at(end),
        None => (trimmed, ""),
    }
}

/// Writes a complete in-memory response. Flushing is left to the caller.
pub async fn send_in_memory_response(
    response: &Response,
    sender: &mut Sender,
) -> anyhow::Result<Served> {
    ResponseWriter::new(response).write_to(sender).await?;
    Ok(Served {
        status: response.status,
        bytes: response.body.len() as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_segment_keeps_separator_on_rest() {
        assert_eq!(split_segment("/docs/a/b.txt"), ("docs", "/a/b.txt"));
        assert_eq!(split_segment("docs/a"), ("docs", "/a"));
        assert_eq!(split_segment("/docs"), ("docs", ""));
        assert_eq!(split_segment(""), ("", ""));
        assert_eq!(split_segment("//x"), ("", "/x"));
    }
}
