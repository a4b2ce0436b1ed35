use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::application::{TokensResponse, ValuationService};
use super::error::ApiError;

pub const HEALTH_STATUS: &str = "Solana Meme Tracker API - ONLINE";

/// Shared handler state
pub struct AppState {
    pub service: ValuationService,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokensQuery {
    pub wallet: Option<String>,
    pub min_usd: Option<f64>,
    pub limit: Option<usize>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/api/tokens", get(tokens))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: HEALTH_STATUS.to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

async fn tokens(
    State(state): State<Arc<AppState>>,
    query: Result<Query<TokensQuery>, QueryRejection>,
) -> Result<Json<TokensResponse>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let mut policy = state.service.settings().policy.clone();
    if let Some(min_usd) = query.min_usd {
        if !min_usd.is_finite() || min_usd < 0.0 {
            return Err(ApiError::BadRequest(format!("Invalid minUsd: {}", min_usd)));
        }
        policy = policy.with_min_usd_value(min_usd);
    }
    if let Some(limit) = query.limit {
        if limit == 0 {
            return Err(ApiError::BadRequest("limit must be at least 1".to_string()));
        }
        policy = policy.with_max_results(Some(limit));
    }

    let wallet = query.wallet.unwrap_or_default();
    let valuation = state.service.value_wallet_detailed(&wallet, &policy).await?;

    Ok(Json(valuation.into_response()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use regex::Regex;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::application::{FetcherConfig, PipelineSettings};
    use crate::ports::mocks::{MockBalanceProvider, MockPriceProvider};

    fn app(balances: MockBalanceProvider, prices: MockPriceProvider) -> Router {
        let service = ValuationService::new(
            Arc::new(balances),
            Arc::new(prices),
            FetcherConfig::immediate(),
            PipelineSettings::default(),
        );
        router(Arc::new(AppState { service }))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn wallet_app() -> Router {
        app(
            MockBalanceProvider::new()
                .with_balance("A", 2, 0)
                .with_balance("B", 2, 0)
                .with_balance("C", 1_000, 0),
            MockPriceProvider::new()
                .with_price("a", 3.0)
                .with_price("b", 20.0)
                .with_price("c", 0.05),
        )
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_json(wallet_app(), "/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], HEALTH_STATUS);
        let rfc3339 = Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d{3}Z$").unwrap();
        assert!(rfc3339.is_match(body["timestamp"].as_str().unwrap()));
    }

    #[tokio::test]
    async fn test_tokens_uses_configured_floor() {
        let (status, body) = get_json(wallet_app(), "/api/tokens?wallet=W1").await;

        assert_eq!(status, StatusCode::OK);
        let tokens = body["tokens"].as_array().unwrap();
        // C = 50 USD, B = 40 USD, A = 6 USD below the $10 floor
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0]["tokenAddress"], "C");
        assert_eq!(tokens[1]["tokenAddress"], "B");
        assert_eq!(tokens[1]["tokenAmount"]["uiAmount"], 2.0);
        assert!(tokens[0].get("usdValue").is_none());
    }

    #[tokio::test]
    async fn test_tokens_query_overrides() {
        let (status, body) = get_json(wallet_app(), "/api/tokens?wallet=W1&minUsd=0&limit=1").await;

        assert_eq!(status, StatusCode::OK);
        let tokens = body["tokens"].as_array().unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0]["tokenAddress"], "C");
    }

    #[tokio::test]
    async fn test_missing_wallet_is_bad_request() {
        for uri in ["/api/tokens", "/api/tokens?wallet=", "/api/tokens?wallet=%20"] {
            let (status, body) = get_json(wallet_app(), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(body["error"], "Wallet address is required");
        }
    }

    #[tokio::test]
    async fn test_invalid_query_is_bad_request() {
        for uri in [
            "/api/tokens?wallet=W1&limit=0",
            "/api/tokens?wallet=W1&minUsd=-1",
            "/api/tokens?wallet=W1&limit=abc",
        ] {
            let (status, body) = get_json(wallet_app(), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert!(body["error"].is_string());
        }
    }

    #[tokio::test]
    async fn test_upstream_error_message() {
        let app = app(
            MockBalanceProvider::new().with_error("Invalid params: invalid owner address"),
            MockPriceProvider::new(),
        );
        let (status, body) = get_json(app, "/api/tokens?wallet=nope").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid params: invalid owner address");
    }
}
