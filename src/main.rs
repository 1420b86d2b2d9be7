mod app;
mod auth;
mod config;
mod error;
mod images;
mod posts;
mod state;
mod storage;
mod tasks;
#[cfg(test)]
mod testing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "postboard=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let state = state::AppState::init().await?;
    let tasks = state.tasks.clone();

    app::serve(app::build_app(state)).await?;

    // Let in-flight emails and image jobs finish before exiting.
    tasks.drain().await;
    Ok(())
}
