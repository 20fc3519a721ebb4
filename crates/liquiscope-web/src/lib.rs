//! # Liquiscope Web
//!
//! Browser dashboard over the liquidity cache. Built with Axum; charts are
//! drawn client-side by Plotly.js from the JSON the API returns.
//!
//! | Method | Path | Result |
//! |--------|------|--------|
//! | GET | `/` | page shell |
//! | GET | `/api/symbols` | selector entries |
//! | GET | `/api/dashboard?symbol=&start_date=&end_date=` | charts and table |
//! | GET | `/api/theme` | session theme |
//! | POST | `/api/theme/toggle` | flip the session theme |
//! | GET | `/health` | liveness |
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use liquiscope_core::{CacheConfig, CacheReader, Dashboard, RecordSource};
//! use liquiscope_web::{AppState, DashboardConfig, DashboardServer};
//!
//! let source: Arc<dyn RecordSource> = Arc::new(CacheReader::open(CacheConfig::default())?);
//! let state = AppState::load(Arc::new(Dashboard::new(source))).await;
//! DashboardServer::new(state, DashboardConfig::from_env()).run().await?;
//! ```

pub mod error;
pub mod handlers;
pub mod server;
pub mod state;

pub use error::{ApiError, ServerError};
pub use server::{build_router, DashboardConfig, DashboardServer};
pub use state::{
    AppState, Session, SessionStore, SharedDashboard, DEFAULT_SESSION_CAPACITY, SESSION_COOKIE,
};

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::header::{COOKIE, SET_COOKIE};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use liquiscope_core::{
        AssetRecord, CacheConfig, CacheReader, Dashboard, MemorySource, RecordSource, Symbol,
        TradeDate,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    fn memory_router() -> Router {
        let symbol = Symbol::parse("AAA").expect("symbol");
        let records = (1..=5)
            .map(|day| {
                AssetRecord::new(
                    symbol.clone(),
                    TradeDate::parse(&format!("2024-01-0{day}")).expect("date"),
                    Some(f64::from(day)),
                    Some(0.01),
                    Some(0.0),
                )
            })
            .collect();
        let source: Arc<dyn RecordSource> = Arc::new(MemorySource::new(records));
        let dashboard = Arc::new(Dashboard::new(source));
        let catalog = dashboard.symbol_options().expect("catalog");
        build_router(Arc::new(AppState::new(dashboard, catalog)), false)
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        serde_json::from_slice(&bytes).expect("json")
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).expect("request")
    }

    #[tokio::test]
    async fn dashboard_endpoint_renders_window() {
        let response = memory_router()
            .oneshot(get("/api/dashboard?symbol=AAA&start_date=2024-01-02&end_date=2024-01-04"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(SET_COOKIE));
        let body = json_body(response).await;
        assert_eq!(body["table"]["rows"].as_array().map(Vec::len), Some(3));
        assert_eq!(body["price_chart"]["data"][0]["x"].as_array().map(Vec::len), Some(3));
        assert_eq!(body["theme"], "dark");
    }

    #[tokio::test]
    async fn dashboard_without_selection_is_empty() {
        let response = memory_router()
            .oneshot(get("/api/dashboard?symbol=&start_date=&end_date="))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["price_chart"]["data"], serde_json::json!([]));
        assert_eq!(body["table"]["columns"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn inverted_window_is_bad_request() {
        let response = memory_router()
            .oneshot(get("/api/dashboard?symbol=AAA&start_date=2024-01-05&end_date=2024-01-01"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"].as_str().is_some_and(|e| e.contains("after")));
    }

    #[tokio::test]
    async fn unavailable_cache_is_service_unavailable() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let reader =
            CacheReader::open(CacheConfig::at(dir.path().join("absent.duckdb"))).expect("reader");
        let source: Arc<dyn RecordSource> = Arc::new(reader);
        let state = AppState::load(Arc::new(Dashboard::new(source))).await;
        assert!(state.catalog.is_empty());

        let response = build_router(state, false)
            .oneshot(get("/api/dashboard?symbol=AAA&start_date=2024-01-01&end_date=2024-01-02"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn theme_toggle_sticks_to_session() {
        let router = memory_router();

        let first = router
            .clone()
            .oneshot(
                Request::post("/api/theme/toggle")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        let cookie = first
            .headers()
            .get(SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(str::to_owned)
            .expect("session cookie");
        assert_eq!(json_body(first).await["theme"], "light");

        let same_session = router
            .clone()
            .oneshot(
                Request::get("/api/theme")
                    .header(COOKIE, &cookie)
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert!(!same_session.headers().contains_key(SET_COOKIE));
        assert_eq!(json_body(same_session).await["theme"], "light");

        let other_session = router.oneshot(get("/api/theme")).await.expect("response");
        assert_eq!(json_body(other_session).await["theme"], "dark");
    }

    #[tokio::test]
    async fn symbols_and_health() {
        let router = memory_router();

        let symbols = router.clone().oneshot(get("/api/symbols")).await.expect("response");
        assert_eq!(
            json_body(symbols).await,
            serde_json::json!([{ "label": "AAA", "value": "AAA" }])
        );

        let health = router.oneshot(get("/health")).await.expect("response");
        assert_eq!(json_body(health).await["status"], "ok");
    }

    #[tokio::test]
    async fn index_page_embeds_plotly() {
        let response = memory_router().oneshot(get("/")).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        assert!(String::from_utf8_lossy(&bytes).contains("plotly"));
    }
}
