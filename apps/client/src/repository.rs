//! Word repository: words, per-user study status and the login endpoints.

use crate::api::{
    builtin_categories, status_batch, Category, ClearRecordRequest, Envelope, LoginRequest,
    LoginResult, RegisterRequest, WireStudyStatus, WireWord,
};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::session::{SessionStore, UserSession};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use wordbook_core::{StatusUpdate, StudyStatus, Word};

/// Activation code sent with self-service registrations.
const DEFAULT_ACTIVATION_CODE: &str = "DEFAULT_CODE";

/// Source of words and study status for a book.
#[async_trait]
pub trait WordRepository: Send + Sync {
    async fn fetch_words(&self, book_id: &str) -> Result<Vec<Word>>;

    async fn fetch_study_status(&self, book_id: &str) -> Result<Vec<StudyStatus>>;

    /// Upsert a batch keyed by word id and module.
    async fn update_study_status(&self, batch: &[StatusUpdate]) -> Result<()>;

    /// Reset every study status of a book.
    async fn clear_study_record(&self, book_id: &str) -> Result<()>;
}

/// Repository client speaking the `{code, data, msg}` HTTP API.
#[derive(Clone)]
pub struct HttpWordRepository {
    client: Client,
    base_url: String,
    session: Arc<dyn SessionStore>,
}

impl HttpWordRepository {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        session: Arc<dyn SessionStore>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn from_config(config: &ClientConfig, session: Arc<dyn SessionStore>) -> Result<Self> {
        Self::new(config.api_url.clone(), config.http_timeout, session)
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// Book categories, or the built-in list if the repository is unavailable.
    pub async fn fetch_categories(&self) -> Vec<Category> {
        let request = self.client.get(self.url("/api/categories"));
        match self.send::<Vec<Category>>(request).await {
            Ok(Some(categories)) => categories,
            Ok(None) => {
                tracing::warn!("categories response had no data, using built-in list");
                builtin_categories()
            }
            Err(e) => {
                tracing::warn!(error = %e, "categories unavailable, using built-in list");
                builtin_categories()
            }
        }
    }

    /// Log in and store the session.
    pub async fn login(&self, username: &str, password: &str) -> Result<UserSession> {
        let request = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&LoginRequest { username, password });
        self.start_session(request).await
    }

    /// Create an account and store the session.
    pub async fn register(&self, username: &str, password: &str) -> Result<UserSession> {
        let request = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&RegisterRequest {
                username,
                password,
                activation_code: DEFAULT_ACTIVATION_CODE,
            });
        self.start_session(request).await
    }

    /// End the session. The local session is cleared even if the server
    /// call fails.
    pub async fn logout(&self) -> Result<()> {
        let request = self.authorized(self.client.post(self.url("/api/auth/logout")));
        if let Err(e) = self.send::<serde_json::Value>(request).await {
            tracing::warn!(error = %e, "logout failed on server");
        }
        self.session.clear()
    }

    async fn start_session(&self, request: RequestBuilder) -> Result<UserSession> {
        let result: LoginResult = self
            .send(request)
            .await?
            .ok_or_else(|| ClientError::Parse("login response without data".to_string()))?;
        let session = UserSession {
            token: result.token,
            username: result.username,
            user_id: result.user_id,
        };
        self.session.set_user(session.clone())?;
        Ok(session)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.get_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Option<T>> {
        let result = self.send_inner(request).await;
        if matches!(result, Err(ClientError::Unauthorized)) {
            tracing::info!("session rejected, clearing stored login");
            if let Err(e) = self.session.clear() {
                tracing::warn!(error = %e, "could not clear session");
            }
        }
        result
    }

    async fn send_inner<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Option<T>> {
        let resp = request
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(ClientError::Backend { status, message });
        }

        let envelope: Envelope<T> = resp
            .json()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))?;
        envelope.into_result()
    }
}

#[async_trait]
impl WordRepository for HttpWordRepository {
    async fn fetch_words(&self, book_id: &str) -> Result<Vec<Word>> {
        let request = self.authorized(
            self.client
                .get(self.url("/api/words"))
                .query(&[("bookId", book_id)]),
        );
        let words: Vec<WireWord> = self.send(request).await?.unwrap_or_default();
        tracing::debug!(book_id, count = words.len(), "fetched words");
        Ok(words.into_iter().map(Word::from).collect())
    }

    async fn fetch_study_status(&self, book_id: &str) -> Result<Vec<StudyStatus>> {
        let request = self.authorized(
            self.client
                .get(self.url("/api/study/status"))
                .query(&[("bookId", book_id)]),
        );
        let statuses: Vec<WireStudyStatus> = self.send(request).await?.unwrap_or_default();
        Ok(statuses.into_iter().map(StudyStatus::from).collect())
    }

    async fn update_study_status(&self, batch: &[StatusUpdate]) -> Result<()> {
        let wire = status_batch(batch);
        if wire.is_empty() {
            return Ok(());
        }
        let request = self.authorized(self.client.post(self.url("/api/study/status")).json(&wire));
        self.send::<serde_json::Value>(request).await?;
        tracing::debug!(count = wire.len(), "study status updated");
        Ok(())
    }

    async fn clear_study_record(&self, book_id: &str) -> Result<()> {
        let request = self.authorized(
            self.client
                .post(self.url("/api/study/clear"))
                .json(&ClearRecordRequest { book_id }),
        );
        self.send::<serde_json::Value>(request).await?;
        tracing::info!(book_id, "study record cleared");
        Ok(())
    }
}
