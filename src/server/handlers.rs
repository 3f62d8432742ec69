//! Endpoint handlers.
//!
//! Checks run in order: provider key (404), method (405), body (400).

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use super::AppState;
use crate::error::{ClientError, GatewayResult};
use crate::types::{ExchangeRequest, FederatedTokenResponse, FederationRequest};

fn require_post(method: &Method) -> Result<(), ClientError> {
    if *method == Method::POST {
        Ok(())
    } else {
        Err(ClientError::MethodNotAllowed)
    }
}

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ClientError> {
    serde_json::from_slice(body).map_err(|e| {
        debug!(error = %e, "rejecting request body");
        ClientError::InvalidBody
    })
}

/// `POST /exchange/{provider}`: relay the provider's token response.
pub async fn exchange(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
    method: Method,
    body: Bytes,
) -> GatewayResult<Response> {
    let config = state
        .registry
        .token_provider(&provider)
        .ok_or(ClientError::UnknownProvider { key: provider.clone() })?;
    require_post(&method)?;
    let request: ExchangeRequest = parse_body(&body)?;

    let upstream = state.exchange.exchange(config, request).await?;

    let status = StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::BAD_GATEWAY);
    Ok((
        status,
        [(header::CONTENT_TYPE, "application/json")],
        upstream.body,
    )
        .into_response())
}

/// `POST /token/{provider}`: verify an access token and mint a federated token.
pub async fn federate(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
    method: Method,
    body: Bytes,
) -> GatewayResult<Json<FederatedTokenResponse>> {
    let adapter = state
        .registry
        .profile_adapter(&provider)
        .ok_or(ClientError::UnknownProvider { key: provider.clone() })?;
    require_post(&method)?;
    let access_token = parse_body::<FederationRequest>(&body)?.into_access_token()?;

    let profile = adapter
        .fetch_profile(state.transport.as_ref(), &access_token)
        .await?;
    let token = state
        .broker
        .federate(&profile, adapter.refresh_existing())
        .await?;

    Ok(Json(token.into()))
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not found")
}
