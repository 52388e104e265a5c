use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

use super::message::Why;

/// The vector memory collections kept per agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Episodic,
    Declarative,
    Procedural,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Episodic => "episodic",
            Collection::Declarative => "declarative",
            Collection::Procedural => "procedural",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Speaker of a conversation history entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Human,
    #[serde(rename = "AI")]
    Ai,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
    pub vectors_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionsOutput {
    pub collections: Vec<CollectionInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionsDestroyOutput {
    pub deleted: HashMap<String, bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationHistoryItemContent {
    pub text: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub audio: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub why: Option<Why>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationHistoryItem {
    pub who: Role,
    pub when: f64,
    pub content: ConversationHistoryItemContent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationHistoryOutput {
    pub history: Vec<ConversationHistoryItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationHistoryDeleteOutput {
    pub deleted: bool,
}

/// Payload for a new or replaced memory point
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryPoint {
    pub content: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl MemoryPoint {
    pub fn new<S: Into<String>>(content: S) -> Self {
        MemoryPoint {
            content: content.into(),
            metadata: Map::new(),
        }
    }

    pub fn with_metadata<K: Into<String>>(mut self, key: K, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Tag the point with its author unless a source is already set.
    pub(crate) fn with_default_source(mut self, user_id: Option<&str>) -> Self {
        if let Some(user_id) = user_id {
            let has_source = self
                .metadata
                .get("source")
                .is_some_and(|source| !source.is_null() && source.as_str() != Some(""));
            if !has_source {
                self.metadata
                    .insert("source".to_string(), Value::String(user_id.to_string()));
            }
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryPointOutput {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default)]
    pub vector: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryPointDeleteOutput {
    pub deleted: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletedOperation {
    pub operation_id: i64,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryPointsDeleteByMetadataOutput {
    pub deleted: DeletedOperation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(default)]
    pub payload: Option<Value>,
    #[serde(default)]
    pub vector: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryPointsOutput {
    pub points: Vec<Record>,
    #[serde(default)]
    pub next_offset: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecallQuery {
    pub text: String,
    #[serde(default)]
    pub vector: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecallVectors {
    pub embedder: String,
    #[serde(default)]
    pub collections: HashMap<String, Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecallOutput {
    pub query: MemoryRecallQuery,
    pub vectors: MemoryRecallVectors,
}
