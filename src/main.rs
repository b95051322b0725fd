use std::sync::Arc;

use form_relay::board::{BoardApi, BoardClient};
use form_relay::config::AppConfig;
use form_relay::server::{AppState, relay_routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  export MONDAY_API_TOKEN=...");
        eprintln!("  export MONDAY_BOARD_ID=1234567890");
        std::process::exit(1);
    });
    let addr = config.server.bind_addr()?;

    eprintln!("📨 form-relay v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Board: {} via {}", config.board.board_id, config.board.api_url);
    eprintln!("   Webhook: POST http://{addr}/form-webhook");
    eprintln!("   Test board: POST http://{addr}/test-board\n");

    let board: Arc<dyn BoardApi> = Arc::new(BoardClient::new(&config.board));
    let app = relay_routes(AppState::new(board));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Relay server started");
    axum::serve(listener, app).await?;

    Ok(())
}
