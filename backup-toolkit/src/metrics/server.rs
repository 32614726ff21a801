//! HTTP listener serving `GET /metrics`.

use super::registry::PrometheusMetrics;
use crate::utils::errors::Result;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use tracing::{error, info};

/// Router with the single `/metrics` route. Everything else is a 404.
///
/// `get` also answers HEAD, so HEAD is routed to the 404 handler explicitly.
pub fn create_router(metrics: PrometheusMetrics) -> Router {
    Router::new()
        .route(
            "/metrics",
            get(metrics_handler).head(not_found).fallback(not_found),
        )
        .fallback(not_found)
        .with_state(metrics)
}

/// Bind `host:port` and serve the metrics router on a detached task.
///
/// Returns the bound address (useful with port 0). The task is never joined
/// or cancelled.
pub async fn serve(host: &str, port: u16, metrics: PrometheusMetrics) -> Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    let addr = listener.local_addr()?;
    let app = create_router(metrics);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Metrics listener stopped: {}", e);
        }
    });

    info!("Metrics listener on http://{}/metrics", addr);
    Ok(addr)
}

/// GET /metrics - Counter values in the text exposition format
async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> Response {
    match metrics.render() {
        Ok(body) => ([(header::CONTENT_TYPE, metrics.content_type())], body).into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
