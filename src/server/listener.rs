use tracing::info;

use crate::config::Config;
use crate::server::acceptor::{spawn_per_connection, Acceptor};

pub async fn run(cfg: &Config) -> anyhow::Result<()> {
    let root = cfg.build_root()?;

    let acceptor = Acceptor::bind(&cfg.listen_addr).await?;
    info!("Listening on {}", acceptor.local_addr()?);

    acceptor.run(spawn_per_connection(root)).await
}
