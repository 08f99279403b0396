//! Client for the spreadsheet-backed rewards endpoint.
//!
//! The endpoint owns authentication and balance storage. Every failure is
//! translated here into one of the [`DashboardError`] kinds:
//! - credential rejected -> `Auth`
//! - any other error shape, network failure or unreadable body -> `Transient`
//! - adjustment refused -> `Update`

use crate::errors::DashboardError;
use crate::models::{FetchResponse, UpdateRequest, UpdateResponse, User};
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE};
use std::future::Future;

/// Deployed Apps Script web app backing the sheet.
pub const DEFAULT_ENDPOINT_URL: &str = "https://script.google.com/macros/s/AKfycbwwm4eiWDbmMxGADofaJCkjV0V7F3KgL3PfE-QeYwhaEexl9G_5uQhIu63R_FrXUZmIZA/exec";

pub const LOAD_FAILED: &str = "Could not load data. Try again.";
pub const CONNECTION_FAILED: &str =
    "Could not load data. Please check your connection and try again.";

/// Operations the reconciler needs from the remote side.
pub trait Endpoint: Send + Sync {
    /// Validates a credential and returns the full user list.
    fn authenticate(
        &self,
        password: &str,
    ) -> impl Future<Output = Result<Vec<User>, DashboardError>> + Send;

    /// Same wire call as [`Endpoint::authenticate`], issued for an existing session.
    fn refresh(
        &self,
        password: &str,
    ) -> impl Future<Output = Result<Vec<User>, DashboardError>> + Send {
        self.authenticate(password)
    }

    /// Sends absolute post-adjustment totals.
    fn submit_adjustment(
        &self,
        request: &UpdateRequest,
    ) -> impl Future<Output = Result<(), DashboardError>> + Send;
}

#[derive(Clone)]
pub struct HttpEndpoint {
    http: reqwest::Client,
    url: String,
}

impl HttpEndpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Endpoint for HttpEndpoint {
    async fn authenticate(&self, password: &str) -> Result<Vec<User>, DashboardError> {
        let response = self
            .http
            .get(&self.url)
            .query(&[("password", password)])
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "balance fetch failed");
                DashboardError::Transient(CONNECTION_FAILED.to_string())
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            tracing::warn!(error = %e, "balance fetch body unreadable");
            DashboardError::Transient(CONNECTION_FAILED.to_string())
        })?;

        let users = classify_fetch(&body)?;
        tracing::info!(%status, users = users.len(), "balances fetched");
        Ok(users)
    }

    async fn submit_adjustment(&self, request: &UpdateRequest) -> Result<(), DashboardError> {
        let payload = serde_json::to_string(request)
            .map_err(|e| DashboardError::Update(e.to_string()))?;

        // The endpoint reads the body as plain text.
        let response = self
            .http
            .post(&self.url)
            .header(CONTENT_TYPE, "text/plain;charset=utf-8")
            .header(CACHE_CONTROL, "no-store")
            .body(payload)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "adjustment request failed");
                DashboardError::Update(e.to_string())
            })?;

        let body = response
            .bytes()
            .await
            .map_err(|e| DashboardError::Update(e.to_string()))?;

        classify_update(&body)?;
        tracing::info!(
            user = %request.user_affected,
            new_local = request.new_local,
            new_global = request.new_global,
            "adjustment accepted"
        );
        Ok(())
    }
}

/// Maps a fetch response body onto users or an error kind.
pub fn classify_fetch(body: &[u8]) -> Result<Vec<User>, DashboardError> {
    let parsed: FetchResponse = serde_json::from_slice(body).map_err(|e| {
        tracing::warn!(error = %e, "balance fetch returned unparseable body");
        DashboardError::Transient(CONNECTION_FAILED.to_string())
    })?;

    match parsed {
        FetchResponse::Users(users) => Ok(users),
        FetchResponse::Failure(err) if err.is_error() => {
            let message = err.text().unwrap_or(LOAD_FAILED).to_string();
            if err.is_invalid_password() {
                tracing::info!("endpoint rejected credential");
                Err(DashboardError::Auth(message))
            } else {
                tracing::warn!(%message, "endpoint reported an error");
                Err(DashboardError::Transient(message))
            }
        }
        FetchResponse::Failure(_) => {
            tracing::warn!("balance fetch returned an unexpected object");
            Err(DashboardError::Transient(LOAD_FAILED.to_string()))
        }
    }
}

/// Anything other than `{"status":"success"}` is a refusal.
pub fn classify_update(body: &[u8]) -> Result<(), DashboardError> {
    let parsed: UpdateResponse =
        serde_json::from_slice(body).map_err(|e| DashboardError::Update(e.to_string()))?;

    if parsed.status.as_deref() == Some("success") {
        return Ok(());
    }

    let message = parsed
        .message
        .unwrap_or_else(|| "endpoint did not confirm the update".to_string());
    tracing::warn!(%message, "adjustment refused");
    Err(DashboardError::Update(message))
}
