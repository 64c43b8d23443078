//! HTTP backend for reading recent mailbox messages.
//!
//! At startup the server loads a pipe-separated account list into an
//! immutable in-memory table, then serves three routes:
//!
//! - `POST /read-email` — read a mailbox named in a JSON body
//! - `GET /api/read-email` — read a mailbox named in the `hotmail` query
//!   parameter
//! - `GET /` — static landing page
//!
//! Each read exchanges the account's stored OAuth2 refresh token for an
//! access token, then lists the newest messages from Microsoft Graph.

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use mailpeek_core::{AccountStore, GraphClient};
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod routes;

use routes::AppState;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Port to listen on.
    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    port: u16,

    /// Path to the pipe-separated account list.
    #[arg(short, long, default_value = "accounts.txt")]
    accounts: PathBuf,

    /// Directory holding the static landing page.
    #[arg(long, default_value = "static")]
    static_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("info".parse().context("failed to parse log directive")?),
        )
        .init();

    let args = Args::parse();

    let accounts = AccountStore::load(&args.accounts)
        .with_context(|| format!("failed to load accounts from {}", args.accounts.display()))?;
    info!(count = accounts.len(), "loaded account list");

    let state = AppState {
        accounts: Arc::new(accounts),
        graph: GraphClient::new(),
        static_dir: args.static_dir,
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(address = %addr, "mailpeek server listening");

    axum::serve(listener, routes::router(state))
        .with_graceful_shutdown(async {
            let _ = signal::ctrl_c().await;
            info!("received shutdown signal");
        })
        .await
        .context("server error")?;

    Ok(())
}
