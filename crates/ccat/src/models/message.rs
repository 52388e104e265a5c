use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A message sent to the Cat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audio: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
}

impl Message {
    pub fn new<S: Into<String>>(text: S) -> Self {
        Message {
            text: text.into(),
            images: Vec::new(),
            audio: Vec::new(),
            user_id: None,
            agent_id: None,
        }
    }

    pub fn with_user_id<S: Into<String>>(mut self, user_id: S) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_agent_id<S: Into<String>>(mut self, agent_id: S) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    /// Attach an image, either a URL or a base64 data URI
    pub fn with_image<S: Into<String>>(mut self, image: S) -> Self {
        self.images.push(image.into());
        self
    }

    pub fn with_audio<S: Into<String>>(mut self, audio: S) -> Self {
        self.audio.push(audio.into());
        self
    }
}

/// The final reply to a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub content: String,
    #[serde(rename = "type")]
    pub message_type: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub why: Option<Why>,
}

/// Provenance of a reply: the input, the steps taken and the memories recalled.
/// Carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Why {
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub intermediate_steps: Vec<Value>,
    #[serde(default)]
    pub model_interactions: Vec<Value>,
    #[serde(default)]
    pub memory: MemorySnapshot,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    #[serde(default)]
    pub episodic: Vec<Value>,
    #[serde(default)]
    pub declarative: Vec<Value>,
    #[serde(default)]
    pub procedural: Vec<Value>,
}

impl Why {
    pub fn new<S: Into<String>>(input: S) -> Self {
        Why {
            input: input.into(),
            ..Default::default()
        }
    }

    pub fn with_memory(mut self, memory: MemorySnapshot) -> Self {
        self.memory = memory;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_skips_empty_fields() {
        let message = Message::new("Hello");
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value, json!({"text": "Hello"}));

        let message = Message::new("Hello")
            .with_user_id("userID")
            .with_agent_id("agentID")
            .with_image("https://example.com/cat.png");
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(
            value,
            json!({
                "text": "Hello",
                "images": ["https://example.com/cat.png"],
                "user_id": "userID",
                "agent_id": "agentID"
            })
        );
    }

    #[test]
    fn test_response_from_wire() {
        let response: Response = serde_json::from_value(json!({
            "type": "chat",
            "content": "Hello World",
            "user_id": "userID",
            "agent_id": "agentID",
            "why": {
                "input": "input",
                "intermediate_steps": [["tool", "output"]],
                "memory": {"episodic": [], "declarative": [{"id": 1}], "procedural": []}
            }
        }))
        .unwrap();

        assert_eq!(response.content, "Hello World");
        assert_eq!(response.message_type, "chat");
        assert_eq!(response.user_id.as_deref(), Some("userID"));
        let why = response.why.unwrap();
        assert_eq!(why.input, "input");
        assert_eq!(why.intermediate_steps.len(), 1);
        assert!(why.model_interactions.is_empty());
        assert_eq!(why.memory.declarative, vec![json!({"id": 1})]);
    }

    #[test]
    fn test_response_requires_content() {
        let result: Result<Response, _> =
            serde_json::from_value(json!({"type": "chat", "user_id": "userID"}));
        assert!(result.is_err());
    }
}
