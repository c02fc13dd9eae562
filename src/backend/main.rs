/**
 * xfchat Server Entry Point
 *
 * Loads configuration, opens the store and serves the chat backend over
 * HTTP and WebSocket.
 */

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenv::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .init();

    tracing::info!("[Startup] Server initialization started");

    let config = xfchat::backend::server::load_config().map_err(|e| {
        tracing::error!("[Startup] Invalid configuration: {}", e);
        e
    })?;
    let addr = config.bind_addr;

    let app = xfchat::backend::server::create_app(config).await.map_err(|e| {
        tracing::error!("[Startup] Failed to open store: {}", e);
        e
    })?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("[Startup] Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
