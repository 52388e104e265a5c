use serde_json::{Map, Value};

use crate::client::CatClient;
use crate::errors::CatResult;
use crate::http::Scope;
use crate::models::plugin::{
    PluginCollectionOutput, PluginSettingsOutput, PluginToggleOutput, PluginsSettingsOutput,
};

const PREFIX: &str = "/plugins";

/// Plugins as seen by a single agent: activation and per-agent settings.
pub struct PluginsEndpoint<'a> {
    client: &'a CatClient,
}

impl<'a> PluginsEndpoint<'a> {
    pub(crate) fn new(client: &'a CatClient) -> Self {
        Self { client }
    }

    fn url(path: &str) -> String {
        format!("{}{}", PREFIX, path)
    }

    /// Installed plugins for the agent, plus registry matches for `query`
    pub async fn get_available_plugins(
        &self,
        query: Option<&str>,
        agent_id: Option<&str>,
    ) -> CatResult<PluginCollectionOutput> {
        match query {
            Some(query) => {
                self.client
                    .http()
                    .get_with_query(PREFIX, &[("query", query)], Scope::agent(agent_id))
                    .await
            }
            None => self.client.http().get(PREFIX, Scope::agent(agent_id)).await,
        }
    }

    /// Flip the activation state of a plugin for the agent
    pub async fn toggle_plugin(
        &self,
        plugin_id: &str,
        agent_id: Option<&str>,
    ) -> CatResult<PluginToggleOutput> {
        self.client
            .http()
            .put(
                &Self::url(&format!("/toggle/{}", plugin_id)),
                Scope::agent(agent_id),
            )
            .await
    }

    pub async fn get_plugins_settings(
        &self,
        agent_id: Option<&str>,
    ) -> CatResult<PluginsSettingsOutput> {
        self.client
            .http()
            .get(&Self::url("/settings"), Scope::agent(agent_id))
            .await
    }

    pub async fn get_plugin_settings(
        &self,
        plugin_id: &str,
        agent_id: Option<&str>,
    ) -> CatResult<PluginSettingsOutput> {
        self.client
            .http()
            .get(
                &Self::url(&format!("/settings/{}", plugin_id)),
                Scope::agent(agent_id),
            )
            .await
    }

    pub async fn put_plugin_settings(
        &self,
        plugin_id: &str,
        values: &Map<String, Value>,
        agent_id: Option<&str>,
    ) -> CatResult<PluginSettingsOutput> {
        self.client
            .http()
            .put_json(
                &Self::url(&format!("/settings/{}", plugin_id)),
                values,
                Scope::agent(agent_id),
            )
            .await
    }
}
