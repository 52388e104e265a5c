use reqwest::multipart::Form;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::RwLock;
use tracing::debug;

use crate::config::CatConfig;
use crate::errors::{CatError, CatResult};

/// Agent id used by the system-level (admin) endpoints
pub const SYSTEM_AGENT_ID: &str = "system";

/// Which agent, and optionally which user, a request acts for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scope<'a> {
    pub agent_id: Option<&'a str>,
    pub user_id: Option<&'a str>,
}

impl<'a> Scope<'a> {
    pub fn agent(agent_id: Option<&'a str>) -> Self {
        Scope {
            agent_id,
            user_id: None,
        }
    }

    pub fn system() -> Self {
        Scope::agent(Some(SYSTEM_AGENT_ID))
    }

    pub fn with_user(mut self, user_id: Option<&'a str>) -> Self {
        self.user_id = user_id;
        self
    }
}

/// Authenticated JSON client shared by every endpoint
pub struct HttpClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    default_agent_id: String,
    token: RwLock<Option<String>>,
}

impl HttpClient {
    pub fn new(config: &CatConfig) -> CatResult<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            base_url: config.http_base_url().trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            default_agent_id: config.agent_id.clone(),
            token: RwLock::new(None),
        })
    }

    pub fn set_token(&self, token: Option<String>) {
        let mut slot = match self.token.write() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        *slot = token;
    }

    pub fn token(&self) -> Option<String> {
        match self.token.read() {
            Ok(slot) => slot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// The credential sent as bearer: a session token wins over the API key
    pub fn credential(&self) -> Option<String> {
        self.token().or_else(|| self.api_key.clone())
    }

    fn request(&self, method: Method, path: &str, scope: Scope<'_>) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, agent_id = ?scope.agent_id, "sending request");

        let agent_id = scope.agent_id.unwrap_or(&self.default_agent_id);
        let mut builder = self.client.request(method, &url).header("agent_id", agent_id);
        if let Some(user_id) = scope.user_id {
            builder = builder.header("user_id", user_id);
        }
        if let Some(credential) = self.credential() {
            builder = builder.bearer_auth(credential);
        }
        builder
    }

    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> CatResult<T> {
        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatError::Http { status, body });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(CatError::Decoding)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, scope: Scope<'_>) -> CatResult<T> {
        self.execute(self.request(Method::GET, path, scope)).await
    }

    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q, scope: Scope<'_>) -> CatResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.execute(self.request(Method::GET, path, scope).query(query))
            .await
    }

    pub async fn post_json<T, B>(&self, path: &str, body: &B, scope: Scope<'_>) -> CatResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(self.request(Method::POST, path, scope).json(body))
            .await
    }

    pub async fn put_json<T, B>(&self, path: &str, body: &B, scope: Scope<'_>) -> CatResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(self.request(Method::PUT, path, scope).json(body))
            .await
    }

    pub async fn put<T: DeserializeOwned>(&self, path: &str, scope: Scope<'_>) -> CatResult<T> {
        self.execute(self.request(Method::PUT, path, scope)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str, scope: Scope<'_>) -> CatResult<T> {
        self.execute(self.request(Method::DELETE, path, scope)).await
    }

    pub async fn delete_json<T, B>(&self, path: &str, body: &B, scope: Scope<'_>) -> CatResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(self.request(Method::DELETE, path, scope).json(body))
            .await
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
        scope: Scope<'_>,
    ) -> CatResult<T> {
        self.execute(self.request(Method::POST, path, scope).multipart(form))
            .await
    }
}
