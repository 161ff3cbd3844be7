use std::sync::Arc;

use portal_api::app::services::AppServices;
use portal_api::config::Config;

#[tokio::main]
async fn main() {
    portal_observability::init();

    let config = Config::from_env();
    let services = Arc::new(AppServices::in_memory(&config));

    let cors_origin = config.cors_origin.as_deref().and_then(|origin| {
        origin.parse().ok().or_else(|| {
            tracing::warn!(origin, "CORS_ORIGIN is not a valid header value; ignoring");
            None
        })
    });

    let app = portal_api::app::build_app(services, cors_origin);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {e}", config.bind_addr));

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
