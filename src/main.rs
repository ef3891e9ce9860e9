/// CPF Verifier
///
/// A small web form that checks a Brazilian taxpayer identifier (CPF)
/// against a local verification cache and, on a miss, against a remote
/// verification service, persisting the result.

mod api;
mod config;
mod context;
mod coordinator;
mod cpf;
mod db;
mod error;
mod metrics;
mod server;
mod store;
mod verification;
mod views;

use anyhow::Context;
use config::ServerConfig;
use context::AppContext;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = ServerConfig::from_env().context("Failed to load configuration")?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_new(&config.logging.level)
                .unwrap_or_else(|_| "cpf_verifier=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Print banner
    print_banner();

    // Create application context; an unreachable store is fatal
    let ctx = AppContext::new(config)
        .await
        .context("Failed to connect to the verification store")?;
    tracing::info!("✅ Connected to the verification store");

    // Keep store connectivity current for the request gate
    ctx.start_health_monitor();

    // Start server
    server::serve(ctx).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
   ___ ___ ___  __   __       _  __ _
  / __| _ \ __| \ \ / /__ _ _(_)/ _(_)___ _ _
 | (__|  _/ _|   \ V / -_) '_| |  _| / -_) '_|
  \___|_| |_|     \_/\___|_| |_|_| |_\___|_|

        CPF Verifier v{}
        "#,
        env!("CARGO_PKG_VERSION")
    );
}
