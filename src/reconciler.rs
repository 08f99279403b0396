//! Keeps the in-memory session and the persisted one in lockstep with the
//! endpoint, and drives what the dashboard shows.
//!
//! Auth failures destroy session state. Transient failures never do: a
//! flaky network must not log anyone out.

use crate::errors::{DashboardError, Rejection};
use crate::models::{
    Direction, PendingAdjustment, Session, StateResponse, UpdateRequest, User, UserCard,
};
use crate::remote::Endpoint;
use crate::storage::SessionStore;
use crate::validation::check_adjustment;
use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, warn};

/// Which panel the presenter shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    LoggedOut,
    Loading,
    Dashboard,
    ErrorShown,
}

impl View {
    pub fn as_str(self) -> &'static str {
        match self {
            View::LoggedOut => "logged_out",
            View::Loading => "loading",
            View::Dashboard => "dashboard",
            View::ErrorShown => "error_shown",
        }
    }
}

pub struct Reconciler<E> {
    endpoint: E,
    store: SessionStore,
    acting_user: String,
    session: Option<Session>,
    view: View,
    /// Panel-level text: login failures, load failures.
    message: Option<String>,
    /// Alert-style text from the last adjustment attempt.
    notice: Option<String>,
}

impl<E: Endpoint> Reconciler<E> {
    pub fn new(endpoint: E, store: SessionStore, acting_user: impl Into<String>) -> Self {
        Self {
            endpoint,
            store,
            acting_user: acting_user.into(),
            session: None,
            view: View::LoggedOut,
            message: None,
            notice: None,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn users(&self) -> &[User] {
        self.session
            .as_ref()
            .map(|s| s.users_data.as_slice())
            .unwrap_or_default()
    }

    #[cfg(test)]
    pub(crate) fn endpoint(&self) -> &E {
        &self.endpoint
    }

    pub fn snapshot(&self) -> StateResponse {
        StateResponse {
            view: self.view.as_str().to_string(),
            message: self.message.clone(),
            notice: self.notice.clone(),
            logged_in_user: self.session.as_ref().map(|s| s.logged_in_user.clone()),
            users: self.users().iter().map(UserCard::from).collect(),
        }
    }

    /// Picks up a stored session at startup and revalidates it.
    pub async fn restore(&mut self) -> Result<(), DashboardError> {
        match self.store.load().await {
            Some(session) if !session.password.is_empty() => {
                info!(user = %session.logged_in_user, "restoring stored session");
                self.session = Some(session);
                self.refresh().await
            }
            _ => {
                self.view = View::LoggedOut;
                Ok(())
            }
        }
    }

    pub async fn login(&mut self, password: &str) -> Result<(), DashboardError> {
        self.notice = None;
        if password.is_empty() {
            self.message = Some(Rejection::MissingPassword.to_string());
            return Err(Rejection::MissingPassword.into());
        }

        self.message = None;
        self.view = View::Loading;
        let outcome = self.endpoint.authenticate(password).await;
        let identity = self.acting_user.clone();
        self.apply_fetch(password, &identity, outcome).await
    }

    pub async fn refresh(&mut self) -> Result<(), DashboardError> {
        let Some(session) = self.session.as_ref() else {
            return Err(DashboardError::NotLoggedIn);
        };
        let password = session.password.clone();
        let identity = session.logged_in_user.clone();

        self.view = View::Loading;
        let outcome = self.endpoint.refresh(&password).await;
        self.apply_fetch(&password, &identity, outcome).await
    }

    pub async fn logout(&mut self) -> Result<(), DashboardError> {
        if let Some(session) = self.session.as_ref() {
            info!(user = %session.logged_in_user, "logging out");
        }
        self.drop_session().await?;
        self.view = View::LoggedOut;
        self.message = None;
        self.notice = None;
        Ok(())
    }

    /// Validates, submits and, on acknowledgement, applies an adjustment.
    pub async fn adjust(
        &mut self,
        username: &str,
        direction: Direction,
        raw_local: &str,
        raw_global: &str,
        reason: &str,
    ) -> Result<PendingAdjustment, DashboardError> {
        let result = self
            .try_adjust(username, direction, raw_local, raw_global, reason)
            .await;
        self.notice = result.as_ref().err().map(|err| err.to_string());
        if result.is_ok() {
            self.view = View::Dashboard;
            self.message = None;
        }
        result
    }

    async fn try_adjust(
        &mut self,
        username: &str,
        direction: Direction,
        raw_local: &str,
        raw_global: &str,
        reason: &str,
    ) -> Result<PendingAdjustment, DashboardError> {
        let session = self.session.as_ref().ok_or(DashboardError::NotLoggedIn)?;
        let user = session
            .find_user(username)
            .ok_or_else(|| DashboardError::UnknownUser(username.to_string()))?;

        let pending = check_adjustment(user, direction, raw_local, raw_global, reason)?;

        let request = UpdateRequest {
            password: session.password.clone(),
            updated_by: session.logged_in_user.clone(),
            user_affected: pending.username.clone(),
            reason: pending.reason.clone(),
            new_local: pending.new_local,
            new_global: pending.new_global,
        };

        info!(
            user = %pending.username,
            action = direction.label(),
            delta_local = pending.delta_local,
            delta_global = pending.delta_global,
            "submitting adjustment"
        );
        self.endpoint.submit_adjustment(&request).await?;

        // Optimistic apply: the endpoint's reply is not re-read for balances.
        let Some(mut updated) = self.session.clone() else {
            return Err(DashboardError::NotLoggedIn);
        };
        if let Some(user) = updated.find_user_mut(&pending.username) {
            user.current_local_points = pending.new_local;
            user.current_global_points = pending.new_global;
        }
        updated.timestamp = now_millis();
        if let Err(err) = self.store.save(&updated).await {
            return Err(self.storage_failed(err));
        }
        self.session = Some(updated);

        Ok(pending)
    }

    async fn apply_fetch(
        &mut self,
        password: &str,
        identity: &str,
        outcome: Result<Vec<User>, DashboardError>,
    ) -> Result<(), DashboardError> {
        match outcome {
            Ok(users) => {
                let session = Session {
                    password: password.to_string(),
                    logged_in_user: identity.to_string(),
                    users_data: users,
                    timestamp: now_millis(),
                };
                if let Err(err) = self.store.save(&session).await {
                    return Err(self.storage_failed(err));
                }
                info!(user = %identity, users = session.users_data.len(), "session refreshed");
                self.session = Some(session);
                self.view = View::Dashboard;
                self.message = None;
                self.notice = None;
                Ok(())
            }
            Err(DashboardError::Auth(message)) => {
                warn!(%message, "credential rejected, clearing session");
                self.drop_session().await?;
                self.view = View::LoggedOut;
                self.message = Some(message.clone());
                Err(DashboardError::Auth(message))
            }
            Err(err) => {
                warn!(error = %err, "fetch failed, keeping session");
                self.view = View::ErrorShown;
                self.message = Some(err.to_string());
                Err(err)
            }
        }
    }

    async fn drop_session(&mut self) -> Result<(), DashboardError> {
        self.session = None;
        match self.store.clear().await {
            Ok(()) => Ok(()),
            Err(err) => Err(self.storage_failed(err)),
        }
    }

    /// The stored copy is unchanged after a failed write, so memory keeps
    /// matching it; the page shows the fault instead of hanging in `Loading`.
    fn storage_failed(&mut self, err: std::io::Error) -> DashboardError {
        let err = DashboardError::Storage(err);
        error!(error = %err, "session storage failed");
        self.view = View::ErrorShown;
        self.message = Some(err.to_string());
        err
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
