use std::sync::Arc;

use axum::extract::{RawQuery, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::{Json, Router};

use crate::core::cms::Cms;
use crate::model::sync_report::SyncReport;

pub const API_KEY_HEADER: &str = "x-api-key";

/// `force=true` or `force=1` in the query string; any other value is off.
pub fn force_requested(query: Option<&str>) -> bool {
    query
        .map(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .any(|(key, value)| key == "force" && matches!(value.as_ref(), "true" | "1"))
        })
        .unwrap_or(false)
}

pub fn router(cms: Arc<Cms>) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/sync-courses", any(sync_courses))
        .with_state(cms)
}

/// Serves the router until the listener fails.
pub async fn serve(port: u16, cms: Arc<Cms>) -> anyhow::Result<()> {
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("sync endpoint listening on http://{}", addr);
    axum::serve(listener, router(cms)).await?;
    Ok(())
}

async fn sync_courses(
    State(cms): State<Arc<Cms>>,
    method: Method,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    if method != Method::GET {
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            Json(SyncReport::failure("Methode niet toegestaan. Gebruik GET.")),
        )
            .into_response();
    }

    if let Some(expected) = cms.config().sync_api_key.as_deref() {
        let given = headers.get(API_KEY_HEADER).and_then(|value| value.to_str().ok());
        if given != Some(expected) {
            log::warn!("rejected sync request with missing or wrong api key");
            return (
                StatusCode::UNAUTHORIZED,
                Json(SyncReport::failure("Niet geautoriseerd")),
            )
                .into_response();
        }
    }

    let report = cms.synchronize(force_requested(query.as_deref())).await;
    log::info!("{}", report.message);
    (StatusCode::OK, Json(report)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn force_flag_values() {
        assert!(force_requested(Some("force=true")));
        assert!(force_requested(Some("x=1&force=1")));
        assert!(!force_requested(Some("force=yes")));
        assert!(!force_requested(Some("force=false")));
        assert!(!force_requested(None));
    }
}
