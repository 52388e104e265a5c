use url::Url;

use crate::config::CatConfig;
use crate::endpoints::admins::AdminsEndpoint;
use crate::endpoints::memory::MemoryEndpoint;
use crate::endpoints::message::MessageEndpoint;
use crate::endpoints::plugins::PluginsEndpoint;
use crate::endpoints::settings::{FactoryKind, SettingsEndpoint};
use crate::errors::CatResult;
use crate::exchange::MessageExchanger;
use crate::http::HttpClient;
use crate::transport::WsConnector;

/// Entry point to a Cat instance.
///
/// Owns the HTTP transport, the WebSocket exchanger and the session token.
/// Endpoints are cheap views borrowed from the client.
pub struct CatClient {
    config: CatConfig,
    http: HttpClient,
    exchanger: MessageExchanger<WsConnector>,
}

impl CatClient {
    pub fn new(config: CatConfig) -> CatResult<Self> {
        let http = HttpClient::new(&config)?;
        let exchanger =
            MessageExchanger::new(WsConnector::new().with_connect_timeout(config.timeout()));

        Ok(Self {
            config,
            http,
            exchanger,
        })
    }

    pub fn from_env() -> CatResult<Self> {
        Self::new(CatConfig::from_env()?)
    }

    pub fn config(&self) -> &CatConfig {
        &self.config
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn exchanger(&self) -> &MessageExchanger<WsConnector> {
        &self.exchanger
    }

    /// Use `token` for every following request instead of the API key
    pub fn add_token<S: Into<String>>(&self, token: S) {
        self.http.set_token(Some(token.into()));
    }

    pub fn token(&self) -> Option<String> {
        self.http.token()
    }

    /// WebSocket URL for a conversation between `agent_id` and `user_id`,
    /// carrying the current credential
    pub fn ws_url(&self, agent_id: Option<&str>, user_id: Option<&str>) -> CatResult<Url> {
        let agent_id = agent_id.unwrap_or(&self.config.agent_id);
        let user_id = user_id.unwrap_or(&self.config.user_id);

        let mut url = Url::parse(&self.config.ws_base_url())?;
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(["ws", agent_id]);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("user_id", user_id);
            if let Some(token) = self.http.token() {
                query.append_pair("token", &token);
            } else if let Some(api_key) = &self.config.api_key {
                query.append_pair("apikey", api_key);
            }
        }
        Ok(url)
    }

    pub fn message(&self) -> MessageEndpoint<'_> {
        MessageEndpoint::new(self)
    }

    pub fn memory(&self) -> MemoryEndpoint<'_> {
        MemoryEndpoint::new(self)
    }

    pub fn admins(&self) -> AdminsEndpoint<'_> {
        AdminsEndpoint::new(self)
    }

    pub fn plugins(&self) -> PluginsEndpoint<'_> {
        PluginsEndpoint::new(self)
    }

    pub fn large_language_model(&self) -> SettingsEndpoint<'_> {
        SettingsEndpoint::new(self, FactoryKind::LargeLanguageModel)
    }

    pub fn embedder(&self) -> SettingsEndpoint<'_> {
        SettingsEndpoint::new(self, FactoryKind::Embedder)
    }

    pub fn auth_handler(&self) -> SettingsEndpoint<'_> {
        SettingsEndpoint::new(self, FactoryKind::AuthHandler)
    }
}
