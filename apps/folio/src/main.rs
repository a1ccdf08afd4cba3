mod cli;
mod config;
mod errors;
mod models;
mod persist;
mod render;
mod store;

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::Cli;
use crate::config::Config;
use crate::persist::local::LocalSlot;
use crate::persist::mirror::spawn_mirror;
use crate::persist::reconcile::reconcile;
use crate::persist::remote::RemoteStore;
use crate::store::collection::CollectionStore;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    let config = Config::from_env()?;

    // Structured logging on stderr; stdout belongs to command output.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    debug!("Folio v{}", env!("CARGO_PKG_VERSION"));
    debug!(
        "collection slot: {}, remote store: {}",
        config.data_path.display(),
        config.remote_url
    );

    let slot = LocalSlot::new(&config.data_path);
    let remote = RemoteStore::new(&config.remote_url);
    let (mirror, mirror_task) = spawn_mirror(remote.clone());
    let mut store = CollectionStore::open(slot, mirror);

    // One-time merge of the remote store into the hydrated collection.
    reconcile(&mut store, &remote).await;

    cli::run(&mut store, args.command)?;

    // Dropping the store releases the last mirror handle; the worker drains
    // any queued remote writes before the process exits.
    drop(store);
    mirror_task.await?;

    Ok(())
}
