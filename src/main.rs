use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use oidc_gateway::config::loader::load_config;
use oidc_gateway::Gateway;

#[derive(Parser)]
#[command(name = "oidc-gateway")]
#[command(about = "Declarative HTTP gateway with OIDC bearer-token guards", long_about = None)]
struct Args {
    /// Path to the gateway configuration file.
    #[arg(short, long, default_value = "gateway.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "oidc_gateway=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = load_config(&args.config)?;

    tracing::info!(
        config = %args.config.display(),
        bind_address = %config.listener.bind_address,
        endpoints = config.endpoints.len(),
        "configuration loaded"
    );

    // Every endpoint registers before the listener opens; a bad declaration
    // stops the process here with a non-zero exit.
    let gateway = Gateway::from_config(&config)?;

    match &config.listener.tls {
        Some(tls) => {
            let addr = config.listener.bind_address.parse()?;
            gateway.run_tls(addr, tls).await?;
        }
        None => {
            let listener = TcpListener::bind(&config.listener.bind_address).await?;
            gateway.run(listener).await?;
        }
    }

    Ok(())
}
