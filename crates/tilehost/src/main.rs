use tileserver::{TileServerApi, TileServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    let _ = dotenv::dotenv();

    let config = match TileServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            eprintln!("Please check your settings in the .env file");
            std::process::exit(1);
        }
    };

    init_tracing(&config);

    tracing::info!("{} starting", config.app_name);

    if !config.tiles_dir.is_dir() {
        tracing::warn!(
            "Tiles directory {} does not exist; every tile request will return 404 until it is created",
            config.tiles_dir.display()
        );
    }

    let server = TileServerApi::new(config);
    if let Err(e) = server.serve(shutdown_signal()).await {
        tracing::error!("Tile server failed: {}", e);
        std::process::exit(1);
    }
}

/// Install the global tracing subscriber, honouring `RUST_LOG` when set
fn init_tracing(config: &TileServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_log_filter()));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if config.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
