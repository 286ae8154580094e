//! Tempest - a minimal HTTP file server
//!
//! Core library: request parsing, the served directory tree and the
//! connection plumbing.

pub mod config;
pub mod fs;
pub mod http;
pub mod server;
