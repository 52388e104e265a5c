use std::fmt;

use crate::client::CatClient;
use crate::errors::CatResult;
use crate::http::Scope;
use crate::models::settings::{
    FactoryObjectSettingOutput, FactoryObjectSettingsOutput, SettingInput,
};

/// The pluggable factories whose configuration can be read and chosen remotely
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FactoryKind {
    LargeLanguageModel,
    Embedder,
    AuthHandler,
}

impl FactoryKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            FactoryKind::LargeLanguageModel => "/llm",
            FactoryKind::Embedder => "/embedder",
            FactoryKind::AuthHandler => "/auth_handler",
        }
    }

    /// The embedder is shared by every agent and lives on the system agent
    pub fn is_system(&self) -> bool {
        matches!(self, FactoryKind::Embedder)
    }
}

impl fmt::Display for FactoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FactoryKind::LargeLanguageModel => "large language model",
            FactoryKind::Embedder => "embedder",
            FactoryKind::AuthHandler => "auth handler",
        };
        f.write_str(name)
    }
}

/// Settings of one factory: list the available configurations, inspect one,
/// or select one with its values.
pub struct SettingsEndpoint<'a> {
    client: &'a CatClient,
    kind: FactoryKind,
}

impl<'a> SettingsEndpoint<'a> {
    pub(crate) fn new(client: &'a CatClient, kind: FactoryKind) -> Self {
        Self { client, kind }
    }

    pub fn kind(&self) -> FactoryKind {
        self.kind
    }

    fn url(&self, path: &str) -> String {
        format!("{}/settings{}", self.kind.prefix(), path)
    }

    fn scope<'s>(&self, agent_id: Option<&'s str>) -> Scope<'s> {
        if self.kind.is_system() {
            Scope::system()
        } else {
            Scope::agent(agent_id)
        }
    }

    /// Every configuration of the factory and the one currently selected
    pub async fn get_settings(
        &self,
        agent_id: Option<&str>,
    ) -> CatResult<FactoryObjectSettingsOutput> {
        self.client
            .http()
            .get(&self.url(""), self.scope(agent_id))
            .await
    }

    pub async fn get_setting(
        &self,
        name: &str,
        agent_id: Option<&str>,
    ) -> CatResult<FactoryObjectSettingOutput> {
        self.client
            .http()
            .get(&self.url(&format!("/{}", name)), self.scope(agent_id))
            .await
    }

    /// Select configuration `name`; only `values.value` is sent
    pub async fn put_setting(
        &self,
        name: &str,
        values: &SettingInput,
        agent_id: Option<&str>,
    ) -> CatResult<FactoryObjectSettingOutput> {
        self.client
            .http()
            .put_json(
                &self.url(&format!("/{}", name)),
                &values.value,
                self.scope(agent_id),
            )
            .await
    }
}
