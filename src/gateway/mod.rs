//! Client for the headless content API.
//!
//! Every collection is read whole (`limit` from config, `-1` by default) and
//! comes back wrapped in a `{ "data": [...] }` envelope. Individual records
//! that cannot be decoded are skipped; a missing or null `data` is an empty
//! collection. A 401 is reported as [`AppError::Unauthorized`] so callers can
//! invalidate the credential they used.

pub mod session;

use std::time::Duration;

use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::{Instrument, InstrumentLink, Lesson, Package, Payment, Relation, User};
pub use session::{Credential, CredentialSource, CredentialStatus, Session};

/// Collections the dashboard reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Users,
    Instruments,
    Packages,
    Lessons,
    Payments,
    Relations,
    StudentInstruments,
    TeacherInstruments,
}

impl Collection {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Instruments => "items/instruments",
            Self::Packages => "items/packages",
            Self::Lessons => "items/lessons",
            Self::Payments => "items/payments",
            Self::Relations => "items/student_teacher_relations",
            Self::StudentInstruments => "items/junction_students_instruments",
            Self::TeacherInstruments => "items/junction_teachers_instruments",
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct LoginData {
    access_token: String,
    #[serde(default)]
    expires: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct ContentClient {
    base_url: String,
    collection_limit: i64,
    http: reqwest::Client,
}

impl ContentClient {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.content_api_timeout_secs))
            .build()?;
        Ok(Self {
            base_url: config.content_api_url.trim_end_matches('/').to_string(),
            collection_limit: config.collection_limit,
            http,
        })
    }

    fn url(&self, path: &str) -> Result<Url, AppError> {
        Url::parse(&format!("{}/{}", self.base_url, path))
            .map_err(|e| AppError::Internal(format!("Invalid content API URL: {e}")))
    }

    /// Exchange email and password for an access token.
    pub async fn login(&self, email: &str, password: &str) -> Result<Credential, AppError> {
        let response = self
            .http
            .post(self.url("auth/login")?)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(AppError::Unauthorized),
            status => return Err(AppError::Upstream { status: status.as_u16() }),
        }

        let envelope: Envelope<LoginData> = response.json().await?;
        let data = envelope
            .data
            .ok_or_else(|| AppError::Internal("Login response carried no token".to_string()))?;
        Ok(Credential::from_login(data.access_token, data.expires))
    }

    /// Liveness of the content API itself.
    pub async fn ping(&self) -> Result<(), AppError> {
        let response = self.http.get(self.url("server/ping")?).send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(AppError::Upstream {
                status: response.status().as_u16(),
            })
        }
    }

    /// Read a whole collection.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        collection: Collection,
        credential: &Credential,
    ) -> Result<Vec<T>, AppError> {
        let mut url = self.url(collection.path())?;
        url.query_pairs_mut()
            .append_pair("limit", &self.collection_limit.to_string());

        let response = self
            .http
            .get(url)
            .bearer_auth(credential.token())
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::UNAUTHORIZED => return Err(AppError::Unauthorized),
            status => {
                tracing::warn!(collection = collection.path(), status = status.as_u16(), "Collection fetch failed");
                return Err(AppError::Upstream { status: status.as_u16() });
            }
        }

        let envelope: Envelope<Vec<Value>> = response.json().await?;
        let raw = envelope.data.unwrap_or_default();
        let total = raw.len();
        let records: Vec<T> = raw
            .into_iter()
            .filter_map(|value| serde_json::from_value(value).ok())
            .collect();

        if records.len() < total {
            tracing::warn!(
                collection = collection.path(),
                skipped = total - records.len(),
                "Skipped undecodable records"
            );
        }
        tracing::debug!(collection = collection.path(), records = records.len(), "Fetched collection");
        Ok(records)
    }

    pub async fn users(&self, credential: &Credential) -> Result<Vec<User>, AppError> {
        self.fetch(Collection::Users, credential).await
    }

    pub async fn instruments(&self, credential: &Credential) -> Result<Vec<Instrument>, AppError> {
        self.fetch(Collection::Instruments, credential).await
    }

    pub async fn packages(&self, credential: &Credential) -> Result<Vec<Package>, AppError> {
        self.fetch(Collection::Packages, credential).await
    }

    pub async fn lessons(&self, credential: &Credential) -> Result<Vec<Lesson>, AppError> {
        self.fetch(Collection::Lessons, credential).await
    }

    pub async fn payments(&self, credential: &Credential) -> Result<Vec<Payment>, AppError> {
        self.fetch(Collection::Payments, credential).await
    }

    pub async fn relations(&self, credential: &Credential) -> Result<Vec<Relation>, AppError> {
        self.fetch(Collection::Relations, credential).await
    }

    pub async fn student_instruments(
        &self,
        credential: &Credential,
    ) -> Result<Vec<InstrumentLink>, AppError> {
        self.fetch(Collection::StudentInstruments, credential).await
    }

    pub async fn teacher_instruments(
        &self,
        credential: &Credential,
    ) -> Result<Vec<InstrumentLink>, AppError> {
        self.fetch(Collection::TeacherInstruments, credential).await
    }
}
