use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info};

use crate::fs::Directory;
use crate::http::parser::parse_request;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;
use crate::server::connection::Connection;

enum ExchangeState {
    Reading,
    Responding(Request),
    Closed,
}

/// Serves exactly one request on `connection` and closes it.
///
/// Failures stop at this boundary: they are logged and the connection is
/// aborted, nothing reaches the acceptor or other connections.
pub async fn handle_connection(mut connection: Connection, root: Arc<Directory>) {
    let peer = connection.peer_label();

    match exchange(&mut connection, &root).await {
        Ok(()) => {
            if let Err(e) = connection.shutdown().await {
                error!(peer = %peer, error = %e, "Failed to shut down connection");
            }
        }
        Err(e) => {
            let cause = format!("{:#}", e);
            error!(peer = %peer, error = %cause, "Connection aborted");
            connection.abort();
        }
    }
}

async fn exchange(connection: &mut Connection, root: &Directory) -> anyhow::Result<()> {
    let mut state = ExchangeState::Reading;

    loop {
        match state {
            ExchangeState::Reading => match parse_request(connection.request()).await {
                Ok(request) => {
                    debug!(method = %request.method, path = %request.path, "Parsed request");
                    state = ExchangeState::Responding(request);
                }
                Err(e) => {
                    // best effort; the connection is torn down either way
                    let sender = connection.sender();
                    if ResponseWriter::new(&Response::bad_request())
                        .write_to(sender)
                        .await
                        .is_ok()
                    {
                        let _ = sender.flush().await;
                    }
                    return Err(anyhow::Error::new(e).context("malformed request"));
                }
            },

            ExchangeState::Responding(request) => {
                let served = root
                    .respond(&request, &request.path, connection.sender())
                    .await?;
                info!(
                    peer = %connection.peer_label(),
                    method = %request.method,
                    path = %request.path,
                    status = served.status.as_u16(),
                    bytes = served.bytes,
                    "Request served"
                );
                state = ExchangeState::Closed;
            }

            ExchangeState::Closed => return Ok(()),
        }
    }
}
