use std::io;

use encore::config::get_config;
use encore::http::{AppState, create_router, load_festival};
use encore::likes::LikeStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = get_config();
    let state = AppState::new(LikeStore::load(&config.likes_path));

    // Document load is fire-and-forget; until it lands (or if it never
    // does) the view routes answer 503 LOADING.
    tokio::spawn(load_festival(state.clone(), config.schedule_path.clone()));

    let app = create_router(state);
    info!(address = %config.bind_address, "encore listening");
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
