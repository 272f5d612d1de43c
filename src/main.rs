use nhatro_api::{app, config, database::manager::DatabaseManager};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nhatro_api=info,tower_http=info".into()),
        )
        .init();

    let config = config::config();
    tracing::info!("Starting nhatro API in {:?} mode", config.environment);

    if let Err(err) = DatabaseManager::migrate().await {
        eprintln!("migration failed: {err}");
        std::process::exit(1);
    }

    // Allow tests or deployments to override port via env
    let port = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("nhatro API listening on http://{}", bind_addr);

    if let Err(err) = axum::serve(listener, app()).await {
        eprintln!("server error: {err}");
        std::process::exit(1);
    }
}
