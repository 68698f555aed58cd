//! Homestay Server entry point.

use homestay_server::{ServerConfig, start_server};
use tracing::error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let default_directive: Directive = "homestay=info"
        .parse()
        .unwrap_or_else(|_| Directive::from(tracing::Level::INFO));
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_directive))
        .json()
        .init();

    tracing::info!("Starting homestay server...");

    let result = match ServerConfig::load() {
        Ok(config) => start_server(config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        error!(error = %e, "Server exited with an error");
        std::process::exit(1);
    }
}
