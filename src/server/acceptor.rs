use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::{TcpListener, ToSocketAddrs};
use tracing::{error, info};

use crate::fs::Directory;
use crate::server::connection::Connection;
use crate::server::handler::handle_connection;

/// Owns the listening socket and drains its accept queue.
pub struct Acceptor {
    listener: TcpListener,
}

impl Acceptor {
    /// Binds and starts listening.
    pub async fn bind(addr: impl ToSocketAddrs) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .context("failed to bind listening socket")?;
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until accepting fails.
    ///
    /// Each connection is handed to `on_client` and the next accept is armed
    /// right after; `on_client` must not wait for the request to be served.
    /// An accept error ends the loop and is returned to the caller.
    pub async fn run<F>(self, mut on_client: F) -> anyhow::Result<()>
    where
        F: FnMut(Connection),
    {
        loop {
            let (socket, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!(error = %e, "Accepting connections failed");
                    return Err(e).context("accept failed");
                }
            };
            info!("Accepted connection from {}", peer);

            on_client(Connection::tcp(socket));
        }
    }
}

/// Connection callback that serves every connection on its own task.
pub fn spawn_per_connection(root: Arc<Directory>) -> impl FnMut(Connection) {
    move |connection| {
        tokio::spawn(handle_connection(connection, Arc::clone(&root)));
    }
}
