use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A configuration to apply to a factory object (LLM, embedder, auth handler)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingInput {
    pub name: String,
    pub value: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl SettingInput {
    pub fn new<S: Into<String>>(name: S) -> Self {
        SettingInput {
            name: name.into(),
            value: Map::new(),
            category: None,
        }
    }

    pub fn with_value<K: Into<String>>(mut self, key: K, value: Value) -> Self {
        self.value.insert(key.into(), value);
        self
    }

    pub fn with_category<S: Into<String>>(mut self, category: S) -> Self {
        self.category = Some(category.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactoryObjectSetting {
    pub name: String,
    #[serde(default)]
    pub value: Map<String, Value>,
    #[serde(default)]
    pub scheme: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactoryObjectSettingsOutput {
    pub settings: Vec<FactoryObjectSetting>,
    #[serde(default)]
    pub selected_configuration: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactoryObjectSettingOutput {
    pub name: String,
    #[serde(default)]
    pub value: Map<String, Value>,
    #[serde(default)]
    pub scheme: Option<Map<String, Value>>,
}
