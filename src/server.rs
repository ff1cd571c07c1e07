use crate::models::StoredListing;
use crate::pipeline::{HuntResponse, Hunter};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

const DEFAULT_LISTINGS_LIMIT: u32 = 20;
const MAX_LISTINGS_LIMIT: u32 = 100;

pub fn router(hunter: Arc<Hunter>) -> Router {
    Router::new()
        .route("/api/hunt", get(hunt_handler))
        .route("/api/listings", get(listings_handler))
        .route("/health", get(health_handler))
        .with_state(hunter)
}

/// Runs the pipeline once per request
async fn hunt_handler(State(hunter): State<Arc<Hunter>>) -> (StatusCode, Json<HuntResponse>) {
    info!("Hunt triggered");
    let response = hunter.run().await;
    let status =
        StatusCode::from_u16(response.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (status, Json(response))
}

#[derive(Debug, Deserialize)]
struct ListingsQuery {
    limit: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ListingsResponse {
    ok: bool,
    listings: Vec<StoredListing>,
}

async fn listings_handler(
    State(hunter): State<Arc<Hunter>>,
    Query(query): Query<ListingsQuery>,
) -> Result<Json<ListingsResponse>, (StatusCode, Json<serde_json::Value>)> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LISTINGS_LIMIT)
        .min(MAX_LISTINGS_LIMIT);

    let listings = hunter.store().recent(limit).await.map_err(|e| {
        error!(error = %e, "Failed to load listings");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "ok": false, "message": e.to_string() })),
        )
    })?;

    Ok(Json(ListingsResponse { ok: true, listings }))
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::test_extractor;
    use crate::models::{FetchSource, Listing};
    use crate::notify::{Notifier, NotifyError};
    use crate::scrapers::{FetchFailure, FetchedPage, PageFetcher};
    use crate::store::SqliteListingStore;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    struct StaticFetcher(Result<FetchedPage, FetchFailure>);

    #[async_trait]
    impl PageFetcher for StaticFetcher {
        async fn fetch(&self) -> Result<FetchedPage, FetchFailure> {
            self.0.clone()
        }

        fn source_name(&self) -> &'static str {
            "static"
        }
    }

    struct SilentNotifier;

    #[async_trait]
    impl Notifier for SilentNotifier {
        async fn notify(&self, _listing: &Listing) -> Result<(), NotifyError> {
            Ok(())
        }
    }

    async fn app(fetched: Result<FetchedPage, FetchFailure>) -> Router {
        let store = SqliteListingStore::in_memory().await.unwrap();
        let hunter = Hunter::new(
            Arc::new(StaticFetcher(fetched)),
            Arc::new(store),
            Arc::new(SilentNotifier),
            test_extractor(),
        );
        router(Arc::new(hunter))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn hunt_returns_summary() {
        let app = app(Ok(FetchedPage {
            body: "https://ingatlan.com/67890 https://ingatlan.com/67891".to_string(),
            source: FetchSource::Fallback,
        }))
        .await;

        let (status, body) = get_json(app.clone(), "/api/hunt").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"ok": true, "scraped": 2, "inserted": 2, "source": "fallback"})
        );

        let (status, body) = get_json(app, "/api/listings?limit=1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["listings"].as_array().unwrap().len(), 1);
        assert_eq!(body["listings"][0]["external_id"], "67891");
    }

    #[tokio::test]
    async fn hunt_propagates_fetch_status() {
        let app = app(Err(FetchFailure::Blocked { status: 403 })).await;

        let (status, body) = get_json(app, "/api/hunt").await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["ok"], json!(false));
        assert_eq!(body["status"], json!(403));
        assert!(body["message"].as_str().unwrap().contains("403"));
    }

    #[tokio::test]
    async fn health_is_ok() {
        let app = app(Err(FetchFailure::EmptyBody)).await;

        let (status, body) = get_json(app, "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
    }
}
