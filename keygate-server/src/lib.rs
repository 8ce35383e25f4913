//! HTTP API for the Keygate license server.
//!
//! The router is built by [`build_router`] so integration tests can
//! mount it on an OS-assigned port.

use axum::extract::{ConnectInfo, Query, State};
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use keygate_license::{LicenseService, Verification};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

/// Query parameters of the verification endpoint.
#[derive(Debug, Deserialize)]
pub struct VerifyParams {
    /// License key.
    pub key: String,
    /// Device identifier the key should be bound to.
    #[serde(rename = "computerSID")]
    pub computer_sid: String,
    /// Client-reported origin address. Falls back to the peer address.
    #[serde(rename = "ipAddress")]
    pub ip_address: Option<String>,
}

/// JSON body returned by the verification endpoint.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct VerifyResponse {
    /// Whether the key is valid for this device.
    pub valid: bool,
    /// Denial reason or already-active notice.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// RFC 3339 expiry, present on valid outcomes.
    #[serde(rename = "expirationDate", skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
}

impl VerifyResponse {
    fn from_outcome(outcome: &Verification) -> Self {
        match outcome {
            Verification::Granted {
                expiration,
                already_active,
            } => Self {
                valid: true,
                message: already_active
                    .then(|| "License key has already been used on this computer.".to_string()),
                expiration_date: Some(expiration.to_rfc3339()),
            },
            Verification::Denied(reason) => Self {
                valid: false,
                message: Some(reason.message().to_string()),
                expiration_date: None,
            },
        }
    }
}

async fn verify_handler(
    State(service): State<Arc<LicenseService>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Query(params): Query<VerifyParams>,
) -> Json<VerifyResponse> {
    let origin = params
        .ip_address
        .unwrap_or_else(|| peer.ip().to_string());

    match service.verify(&params.key, &params.computer_sid, &origin) {
        Ok(outcome) => {
            info!(
                key = %params.key,
                device = %params.computer_sid,
                valid = outcome.is_valid(),
                "verification"
            );
            Json(VerifyResponse::from_outcome(&outcome))
        }
        Err(err) => {
            error!("verification not persisted: {err}");
            Json(VerifyResponse {
                valid: false,
                message: Some("License server storage error.".to_string()),
                expiration_date: None,
            })
        }
    }
}

/// Build the HTTP API router over the given service.
pub fn build_router(service: Arc<LicenseService>) -> Router {
    Router::new()
        .route("/api/v1/verify", get(verify_handler))
        .with_state(service)
}
