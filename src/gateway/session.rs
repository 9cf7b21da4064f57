//! Bearer credential for the content API and its lifecycle.
//!
//! A credential is installed once at startup (static token or login), passed
//! explicitly to every fetch, and invalidated when the content API answers 401.
//! Nothing re-acquires it implicitly; a new login must be requested.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialSource {
    StaticToken,
    Login,
}

#[derive(Clone, PartialEq)]
pub struct Credential {
    token: String,
    source: CredentialSource,
    acquired_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    pub fn static_token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            source: CredentialSource::StaticToken,
            acquired_at: Utc::now(),
            expires_at: None,
        }
    }

    /// Credential from a login response; `expires_ms` is the lifetime the content API reported.
    pub fn from_login(token: impl Into<String>, expires_ms: Option<i64>) -> Self {
        let acquired_at = Utc::now();
        Self {
            token: token.into(),
            source: CredentialSource::Login,
            acquired_at,
            expires_at: expires_ms.and_then(|ms| {
                Duration::try_milliseconds(ms).and_then(|lifetime| acquired_at.checked_add_signed(lifetime))
            }),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn status(&self) -> CredentialStatus {
        CredentialStatus {
            authenticated: true,
            source: Some(self.source),
            acquired_at: Some(self.acquired_at),
            expires_at: self.expires_at,
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("source", &self.source)
            .field("acquired_at", &self.acquired_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Public view of the session, safe to serialise.
#[derive(Debug, Clone, Serialize)]
pub struct CredentialStatus {
    pub authenticated: bool,
    pub source: Option<CredentialSource>,
    pub acquired_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl CredentialStatus {
    fn signed_out() -> Self {
        Self {
            authenticated: false,
            source: None,
            acquired_at: None,
            expires_at: None,
        }
    }
}

/// Holder of the single active credential.
#[derive(Debug, Default)]
pub struct Session {
    active: RwLock<Option<Credential>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        Self {
            active: RwLock::new(Some(credential)),
        }
    }

    pub async fn install(&self, credential: Credential) {
        tracing::info!(source = ?credential.source, "Content API credential installed");
        *self.active.write().await = Some(credential);
    }

    pub async fn current(&self) -> Option<Credential> {
        self.active.read().await.clone()
    }

    /// Drop `rejected` if it is still the active credential.
    ///
    /// A credential installed after `rejected` was handed out is kept.
    pub async fn invalidate(&self, rejected: &Credential) -> bool {
        let mut active = self.active.write().await;
        if active.as_ref().is_some_and(|c| c.token == rejected.token) {
            *active = None;
            tracing::warn!("Content API rejected credential; session invalidated");
            true
        } else {
            false
        }
    }

    pub async fn clear(&self) {
        *self.active.write().await = None;
    }

    pub async fn status(&self) -> CredentialStatus {
        self.active
            .read()
            .await
            .as_ref()
            .map(Credential::status)
            .unwrap_or_else(CredentialStatus::signed_out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalidate_drops_matching_credential() {
        let credential = Credential::static_token("abc");
        let session = Session::with_credential(credential.clone());
        assert!(session.invalidate(&credential).await);
        assert!(session.current().await.is_none());
        assert!(!session.status().await.authenticated);
    }

    #[tokio::test]
    async fn invalidate_keeps_newer_credential() {
        let stale = Credential::static_token("old");
        let session = Session::new();
        session.install(Credential::from_login("new", Some(900_000))).await;
        assert!(!session.invalidate(&stale).await);
        let current = session.current().await.unwrap();
        assert_eq!(current.token(), "new");
        assert!(session.status().await.expires_at.is_some());
    }

    #[test]
    fn debug_output_redacts_token() {
        let credential = Credential::static_token("super-secret");
        let rendered = format!("{credential:?}");
        assert!(!rendered.contains("super-secret"));
    }

    #[test]
    fn absurd_login_lifetime_has_no_expiry() {
        let credential = Credential::from_login("token", Some(i64::MAX));
        assert!(credential.status().expires_at.is_none());

        let credential = Credential::from_login("token", Some(900_000));
        assert!(credential.status().expires_at.is_some());
    }
}
