//! Networking: accepting clients and running one exchange per connection.
//!
//! ```text
//!   Acceptor ──accept──▶ Connection ──spawn──▶ handle_connection
//!      ▲                                          │ parse request
//!      └────────── re-arm accept                  │ Directory::respond
//!                                                 ▼ shutdown / abort
//! ```

pub mod connection;
pub mod acceptor;
pub mod handler;
pub mod listener;
