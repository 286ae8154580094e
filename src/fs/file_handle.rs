//! Exclusive ownership of an open file plus zero-copy transmission to a
//! socket via `sendfile(2)`.

use std::io;
use std::os::fd::{AsRawFd, RawFd};
use std::path::Path;

use crate::server::connection::RawSocket;

/// Linux never moves more than this many bytes in a single `sendfile` call.
const MAX_PER_CALL: u64 = 0x7fff_f000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStatus {
    pub size: u64,
    pub is_regular: bool,
}

/// An open, read-only file with exactly one owner.
///
/// Not `Clone`; the descriptor is closed once, when the handle is dropped.
#[derive(Debug)]
pub struct FileHandle {
    file: std::fs::File,
}

impl FileHandle {
    pub async fn open_read(path: &Path) -> io::Result<Self> {
        let file = tokio::fs::File::open(path).await?;
        Ok(Self {
            file: file.into_std().await,
        })
    }

    pub fn status(&self) -> io::Result<FileStatus> {
        let metadata = self.file.metadata()?;
        Ok(FileStatus {
            size: metadata.len(),
            is_regular: metadata.is_file(),
        })
    }

    /// Transmits `byte_count` bytes from the current file offset into
    /// `destination` and returns how many were sent.
    ///
    /// A call that makes no progress while bytes remain fails with
    /// `WriteZero` instead of being retried.
    pub async fn send_to(&self, destination: &RawSocket<'_>, byte_count: u64) -> io::Result<u64> {
        let source = self.file.as_raw_fd();
        let mut total_sent = 0u64;
        let mut rest = byte_count;

        while rest > 0 {
            let piece_length = rest.min(MAX_PER_CALL) as usize;
            let sent = destination
                .write_with(|socket| sendfile(socket, source, piece_length))
                .await?;

            if sent == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    format!("sendfile made no progress with {} bytes left", rest),
                ));
            }

            total_sent += sent as u64;
            rest -= sent as u64;
        }

        Ok(total_sent)
    }

    /// Hands the descriptor over to tokio for a buffered copy.
    pub fn into_async(self) -> tokio::fs::File {
        tokio::fs::File::from_std(self.file)
    }
}

fn sendfile(socket: RawFd, source: RawFd, count: usize) -> io::Result<usize> {
    // SAFETY: both descriptors stay open for the duration of the call and a
    // null offset makes the kernel use and advance the file's own offset.
    let sent = unsafe { libc::sendfile(socket, source, std::ptr::null_mut(), count) };
    if sent < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(sent as usize)
    }
}
