//! Server bootstrap: config, collaborators, tracing, and the axum listener.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::Method;
use bubble_guardian::Guardian;
use bubble_guardian_acc::AccChainView;
use bubble_guardian_memory::InMemoryDataServer;
use tower_http::cors;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::handlers::{self, AppState};
use crate::sig_down::SigDown;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::load()?;

    let chain_view = AccChainView::connect_http(config.chain_id, &config.rpc_url, config.delegate_registry)?;
    let data_server = InMemoryDataServer::new();
    let guardian = Guardian::new(Arc::new(chain_view), Arc::new(data_server), config.host_domain.clone());

    let state: AppState<AccChainView, InMemoryDataServer> = AppState {
        guardian: Arc::new(guardian),
    };

    let app = handlers::routes(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            cors::CorsLayer::new()
                .allow_origin(cors::Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers(cors::Any),
        );

    let addr = SocketAddr::new(config.host, config.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "bubble-guardian-server listening");

    let sig_down = SigDown::try_new()?;
    let cancellation_token = sig_down.cancellation_token();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancellation_token.cancelled().await })
        .await?;

    Ok(())
}
