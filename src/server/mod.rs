//! HTTP surface.
//!
//! Thin plumbing over the pipeline: `/emails` runs one fetch cycle per
//! request, `/health` reports registry size, and the two auth routes
//! delegate to the credential issuer and registry. No route is ever
//! failed by pipeline results — an all-accounts-down cycle is an empty
//! feed, not a 5xx.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use crate::domain::Email;
use crate::providers::CredentialIssuer;
use crate::registry::AccountRegistry;
use crate::services::Aggregator;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<AccountRegistry>,
    pub aggregator: Arc<Aggregator>,
    pub issuer: Arc<dyn CredentialIssuer>,
    /// Where to send the browser after a successful connection.
    pub frontend_url: String,
}

/// Builds the service router with CORS restricted to the frontend
/// origin.
pub fn router(state: AppState) -> Router {
    let cors = match state.frontend_url.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(_) => {
            tracing::warn!(
                frontend_url = %state.frontend_url,
                "frontend url is not a valid origin, allowing any"
            );
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    };

    Router::new()
        .route("/emails", get(emails))
        .route("/health", get(health))
        .route("/auth", get(auth))
        .route("/auth/callback", get(auth_callback))
        .layer(cors)
        .with_state(state)
}

/// Runs one fetch cycle and returns the merged feed. An empty array —
/// no accounts, or every account failed — is a normal response.
async fn emails(State(state): State<AppState>) -> Json<Vec<Email>> {
    Json(state.aggregator.run_cycle().await)
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "accounts": state.registry.len().await,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

async fn auth(State(state): State<AppState>) -> Redirect {
    Redirect::temporary(&state.issuer.authorize_url())
}

#[derive(Debug, Deserialize)]
struct CallbackQuery {
    code: Option<String>,
}

async fn auth_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let Some(code) = query.code else {
        return (StatusCode::BAD_REQUEST, "missing code in query").into_response();
    };

    match state.issuer.exchange(&code).await {
        Ok((address, credential)) => {
            state.registry.register(address, credential).await;
            Redirect::temporary(&state.frontend_url).into_response()
        }
        Err(error) => {
            tracing::warn!(%error, "auth callback failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "authentication failed").into_response()
        }
    }
}
