//! The served directory tree.
//!
//! A [`Directory`](directory::Directory) answers a request for a sub-path.
//! Virtual directories route by path segment; file directories map the
//! sub-path below a served root and transmit the file, either with
//! `sendfile(2)` (Linux) or with a plain buffered copy.

pub mod path;
pub mod directory;
pub mod portable;

#[cfg(target_os = "linux")]
pub mod file_handle;
#[cfg(target_os = "linux")]
pub mod accelerated;

pub use directory::{Directory, Served};
