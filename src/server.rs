//! HTTP surface: `GET /api/search` and `GET /health`

use crate::{
    aggregator::Aggregator,
    error::{ErrorKind, SearchError},
    types::{SearchRequest, SearchResult},
};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::set_header::SetResponseHeaderLayer;

/// Query-string parameters of `GET /api/search`
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub query: Option<String>,
    pub mode: Option<String>,
}

#[derive(Debug, Serialize)]
struct SearchResponse {
    results: Vec<SearchResult>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

/// [`SearchError`] rendered as an HTTP response
#[derive(Debug)]
pub struct ApiError(pub SearchError);

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let (status, body) = match &err {
            SearchError::InvalidInput(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: msg.clone(),
                    message: None,
                },
            ),
            SearchError::ConfigError(msg) => {
                log::error!("Search configuration error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: msg.clone(),
                        message: None,
                    },
                )
            }
            _ if err.kind() == ErrorKind::Upstream => {
                let status = if err.is_timeout() {
                    StatusCode::GATEWAY_TIMEOUT
                } else {
                    StatusCode::BAD_GATEWAY
                };
                (
                    status,
                    ErrorBody {
                        error: "Upstream search provider failed".to_string(),
                        message: Some(err.to_string()),
                    },
                )
            }
            _ => {
                log::error!("Unexpected search failure: {err:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "Internal server error".to_string(),
                        message: None,
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Build the application router around a shared aggregator
///
/// Every response, extractor rejections included, carries `Cache-Control: no-store`.
pub fn router(aggregator: Arc<Aggregator>) -> Router {
    Router::new()
        .route("/api/search", get(search))
        .route("/health", get(health_check))
        .with_state(aggregator)
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
}

async fn search(
    State(aggregator): State<Arc<Aggregator>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params
        .map_err(|rejection| SearchError::InvalidInput(rejection.body_text()))?;
    let query = params.q.as_deref().or(params.query.as_deref());
    let request = SearchRequest::parse(query, params.mode.as_deref())?;

    let results = aggregator.search(&request).await?;
    Ok((StatusCode::OK, Json(SearchResponse { results })).into_response())
}

async fn health_check() -> Response {
    Json(json!({ "status": "ok" })).into_response()
}

/// Serve `router` on `addr` until Ctrl-C
pub async fn serve(addr: SocketAddr, aggregator: Aggregator) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(Arc::new(aggregator)))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    log::info!("Shutting down");
}
