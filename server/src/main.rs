use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::{
    net::TcpListener,
    signal::unix::{signal, SignalKind},
    sync::broadcast,
    task::JoinSet,
};
use tracing_subscriber::EnvFilter;

use crate::{config::Config, room_manager::RoomManager};

mod config;
mod room_manager;
mod session;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    let room_manager = Arc::new(RoomManager::new());
    let mut join_set: JoinSet<anyhow::Result<()>> = JoinSet::new();

    let mut interrupt =
        signal(SignalKind::interrupt()).context("failed to create interrupt signal stream")?;
    let server = TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("could not bind to {}", config.bind_address()))?;
    let (quit_tx, quit_rx) = broadcast::channel::<()>(1);

    tracing::info!(addr = %config.bind_address(), "listening");
    loop {
        tokio::select! {
            _ = interrupt.recv() => {
                tracing::info!("server interrupted, gracefully shutting down");
                // sessions may all be gone already, nobody listening is fine
                let _ = quit_tx.send(());
                break;
            }
            accepted = server.accept() => match accepted {
                Ok((socket, addr)) => {
                    tracing::debug!(%addr, "accepted connection");
                    join_set.spawn(session::handle_user_session(room_manager.clone(), quit_rx.resubscribe(), socket));
                }
                Err(err) => tracing::warn!(error = %err, "failed to accept connection"),
            },
            // reap finished sessions so the join set does not grow without bound
            Some(finished) = join_set.join_next(), if !join_set.is_empty() => match finished {
                Ok(Err(err)) => tracing::debug!(error = %err, "session ended with an error"),
                Err(err) => tracing::warn!(error = %err, "session task failed"),
                Ok(Ok(())) => (),
            },
        }
    }

    while join_set.join_next().await.is_some() {}
    tracing::info!(open_rooms = room_manager.room_count().await, "server shut down");

    Ok(())
}
