use std::sync::Arc;

use axum::{extract::State, routing::get, Router};
use chrono::{DateTime, Utc};

/// Shared with the liveness handler. Holds nothing the poll loop owns.
pub struct AppState {
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(liveness))
        .with_state(state)
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}

async fn liveness(State(state): State<Arc<AppState>>) -> String {
    liveness_text(state.started_at, Utc::now())
}

fn liveness_text(started_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let uptime = (now - started_at).num_seconds().max(0);
    format!(
        "Junior Doctor Bot is running! Up since {} ({}s)",
        started_at.format("%Y-%m-%d %H:%M:%S UTC"),
        uptime
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::TimeZone;
    use tower::ServiceExt;

    #[test]
    fn liveness_text_reports_uptime() {
        let start = Utc.with_ymd_and_hms(2025, 3, 5, 9, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 3, 5, 9, 1, 30).unwrap();

        assert_eq!(
            liveness_text(start, now),
            "Junior Doctor Bot is running! Up since 2025-03-05 09:00:00 UTC (90s)"
        );
    }

    #[tokio::test]
    async fn root_returns_ok() {
        let app = router(Arc::new(AppState::new()));
        let resp = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body = axum::body::to_bytes(resp.into_body(), 1024).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.starts_with("Junior Doctor Bot is running!"));
    }

    #[tokio::test]
    async fn other_routes_are_not_found() {
        let app = router(Arc::new(AppState::new()));
        let resp = app
            .oneshot(Request::builder().uri("/admin").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
