use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;

use crate::client::CatClient;
use crate::errors::CatResult;
use crate::http::Scope;
use crate::models::admin::{AdminOutput, ResetOutput, TokenOutput};
use crate::models::plugin::{
    PluginCollectionOutput, PluginDeleteOutput, PluginDetailsOutput,
    PluginInstallFromRegistryOutput, PluginInstallOutput, PluginSettingsOutput,
    PluginsSettingsOutput,
};

const PREFIX: &str = "/admins";

pub type Permissions = HashMap<String, Vec<String>>;

/// System-level administration: admin users, resets and the plugin catalogue.
///
/// These calls always act as the `system` agent.
pub struct AdminsEndpoint<'a> {
    client: &'a CatClient,
}

#[derive(Serialize)]
struct AdminPayload<'p> {
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'p str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'p str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    permissions: Option<&'p Permissions>,
}

#[derive(Serialize)]
struct PageQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    skip: Option<u32>,
}

impl<'a> AdminsEndpoint<'a> {
    pub(crate) fn new(client: &'a CatClient) -> Self {
        Self { client }
    }

    fn url(path: &str) -> String {
        format!("{}{}", PREFIX, path)
    }

    /// Log in. The returned token is kept by the client and used for every
    /// later request.
    pub async fn token(&self, username: &str, password: &str) -> CatResult<TokenOutput> {
        let output: TokenOutput = self
            .client
            .http()
            .post_json(
                &Self::url("/auth/token"),
                &json!({ "username": username, "password": password }),
                Scope::system(),
            )
            .await?;

        self.client.add_token(output.access_token.clone());
        Ok(output)
    }

    pub async fn post_admin(
        &self,
        username: &str,
        password: &str,
        permissions: Option<&Permissions>,
    ) -> CatResult<AdminOutput> {
        let payload = AdminPayload {
            username: Some(username),
            password: Some(password),
            permissions,
        };
        self.client
            .http()
            .post_json(PREFIX, &payload, Scope::system())
            .await
    }

    pub async fn get_admins(
        &self,
        limit: Option<u32>,
        skip: Option<u32>,
    ) -> CatResult<Vec<AdminOutput>> {
        self.client
            .http()
            .get_with_query(PREFIX, &PageQuery { limit, skip }, Scope::system())
            .await
    }

    pub async fn get_admin(&self, admin_id: &str) -> CatResult<AdminOutput> {
        self.client
            .http()
            .get(&Self::url(&format!("/{}", admin_id)), Scope::system())
            .await
    }

    /// Update the given fields of an admin; `None` leaves a field untouched
    pub async fn put_admin(
        &self,
        admin_id: &str,
        username: Option<&str>,
        password: Option<&str>,
        permissions: Option<&Permissions>,
    ) -> CatResult<AdminOutput> {
        let payload = AdminPayload {
            username,
            password,
            permissions,
        };
        self.client
            .http()
            .put_json(
                &Self::url(&format!("/{}", admin_id)),
                &payload,
                Scope::system(),
            )
            .await
    }

    pub async fn delete_admin(&self, admin_id: &str) -> CatResult<AdminOutput> {
        self.client
            .http()
            .delete(&Self::url(&format!("/{}", admin_id)), Scope::system())
            .await
    }

    /// Reset the whole installation. Deletes all data.
    pub async fn factory_reset(&self) -> CatResult<ResetOutput> {
        self.reset("/utils/factory_reset/").await
    }

    /// Reset the agent to factory settings. Deletes all its data.
    pub async fn agent_reset(&self) -> CatResult<ResetOutput> {
        self.reset("/utils/agent_reset/").await
    }

    pub async fn agent_destroy(&self) -> CatResult<ResetOutput> {
        self.reset("/utils/agent_destroy/").await
    }

    async fn reset(&self, path: &str) -> CatResult<ResetOutput> {
        self.client
            .http()
            .post_json(&Self::url(path), &json!({}), Scope::system())
            .await
    }

    pub async fn get_available_plugins(
        &self,
        query: Option<&str>,
    ) -> CatResult<PluginCollectionOutput> {
        let url = Self::url("/plugins");
        match query {
            Some(query) => {
                self.client
                    .http()
                    .get_with_query(&url, &[("query", query)], Scope::system())
                    .await
            }
            None => self.client.http().get(&url, Scope::system()).await,
        }
    }

    /// Upload a plugin packaged as a zip archive
    pub async fn install_plugin_from_zip(&self, path: &Path) -> CatResult<PluginInstallOutput> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "plugin.zip".to_string());

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/zip")?;
        let form = Form::new().part("file", part);

        self.client
            .http()
            .post_multipart(&Self::url("/plugins/upload"), form, Scope::system())
            .await
    }

    pub async fn install_plugin_from_registry(
        &self,
        url: &str,
    ) -> CatResult<PluginInstallFromRegistryOutput> {
        self.client
            .http()
            .post_json(
                &Self::url("/plugins/upload/registry"),
                &json!({ "url": url }),
                Scope::system(),
            )
            .await
    }

    /// Default settings of every plugin
    pub async fn get_plugins_settings(&self) -> CatResult<PluginsSettingsOutput> {
        self.client
            .http()
            .get(&Self::url("/plugins/settings"), Scope::system())
            .await
    }

    pub async fn get_plugin_settings(&self, plugin_id: &str) -> CatResult<PluginSettingsOutput> {
        self.client
            .http()
            .get(
                &Self::url(&format!("/plugins/settings/{}", plugin_id)),
                Scope::system(),
            )
            .await
    }

    pub async fn get_plugin_details(&self, plugin_id: &str) -> CatResult<PluginDetailsOutput> {
        self.client
            .http()
            .get(
                &Self::url(&format!("/plugins/{}", plugin_id)),
                Scope::system(),
            )
            .await
    }

    pub async fn delete_plugin(&self, plugin_id: &str) -> CatResult<PluginDeleteOutput> {
        self.client
            .http()
            .delete(
                &Self::url(&format!("/plugins/{}", plugin_id)),
                Scope::system(),
            )
            .await
    }
}
