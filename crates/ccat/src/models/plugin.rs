use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginFilters {
    #[serde(default)]
    pub query: Option<String>,
}

/// A plugin known to the Cat, either installed or offered by the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub author_url: Option<String>,
    #[serde(default)]
    pub plugin_url: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub thumb: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub hooks: Vec<Value>,
    #[serde(default)]
    pub tools: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginItemRegistry {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub author_url: Option<String>,
    #[serde(default)]
    pub plugin_url: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub thumb: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginCollectionOutput {
    #[serde(default)]
    pub filters: PluginFilters,
    #[serde(default)]
    pub installed: Vec<PluginItem>,
    #[serde(default)]
    pub registry: Vec<PluginItemRegistry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginInstallOutput {
    pub filename: String,
    pub content_type: String,
    pub info: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginInstallFromRegistryOutput {
    pub url: String,
    pub info: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginSettingsOutput {
    pub name: String,
    #[serde(default)]
    pub value: Map<String, Value>,
    #[serde(default)]
    pub schema: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginsSettingsOutput {
    pub settings: Vec<PluginSettingsOutput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginDetailsOutput {
    pub data: PluginItem,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginDeleteOutput {
    pub deleted: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginToggleOutput {
    pub info: String,
}
