//! One message out, one reply back, over a fresh connection.
//!
//! The Cat streams several frames per message (notifications, tokens, status
//! updates) and ends with a single frame tagged `"type": "chat"`. The exchanger
//! forwards everything before that frame to an optional observer and decodes the
//! chat frame into a [`Response`].
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::errors::{CatError, CatResult};
use crate::models::message::Response;
use crate::transport::{Connection, Connector};

lazy_static! {
    static ref TERMINAL_FRAME: Regex = Regex::new(r#""type"\s*:\s*"chat""#).unwrap();
}

/// Receives every frame that arrives before the reply. Returning an error aborts
/// the exchange with [`CatError::Observer`]; the connection is still closed.
pub type FrameObserver<'a> = dyn FnMut(&str) -> anyhow::Result<()> + Send + 'a;

/// Whether a raw frame is the reply that ends an exchange.
///
/// This is a tag test on the text, not a parse: intermediate frames are not
/// required to be valid responses, or even valid JSON.
pub fn is_terminal_frame(frame: &str) -> bool {
    TERMINAL_FRAME.is_match(frame)
}

pub struct MessageExchanger<C> {
    connector: C,
}

impl<C: Connector> MessageExchanger<C> {
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    /// Send `message` to `target` and wait for its reply.
    ///
    /// There is no deadline: without a reply the loop runs until the transport
    /// ends the stream or fails.
    pub async fn exchange<M: Serialize + Sync>(
        &self,
        target: &str,
        message: &M,
        observer: Option<&mut FrameObserver<'_>>,
    ) -> CatResult<Response> {
        let mut connection = self.connector.connect(target).await?;

        let outcome = Self::converse(&mut connection, message, observer).await;

        if let Err(e) = connection.close().await {
            warn!("Failed to close connection: {}", e);
        }

        let frame = outcome?;
        serde_json::from_str(&frame).map_err(CatError::Decoding)
    }

    async fn converse<M: Serialize + Sync>(
        connection: &mut C::Connection,
        message: &M,
        mut observer: Option<&mut FrameObserver<'_>>,
    ) -> CatResult<String> {
        let payload = serde_json::to_string(message).map_err(CatError::Encoding)?;
        connection.send(payload).await?;

        let mut skipped = 0usize;
        loop {
            let frame = connection
                .receive()
                .await?
                .ok_or_else(|| CatError::transport("no message received"))?;

            if is_terminal_frame(&frame) {
                debug!(skipped, "received reply");
                return Ok(frame);
            }

            skipped += 1;
            if let Some(observer) = observer.as_deref_mut() {
                observer(&frame).map_err(CatError::Observer)?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::message::Message;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Script {
        frames: VecDeque<CatResult<Option<String>>>,
        sent: Vec<String>,
        targets: Vec<String>,
        closes: usize,
        fail_connect: bool,
        fail_send: bool,
        fail_close: bool,
    }

    /// Replays a fixed sequence of frames and records what happened
    #[derive(Clone, Default)]
    struct ScriptedConnector {
        script: Arc<Mutex<Script>>,
    }

    struct ScriptedConnection {
        script: Arc<Mutex<Script>>,
    }

    impl ScriptedConnector {
        fn with_frames(frames: Vec<&str>) -> Self {
            let connector = Self::default();
            connector.script.lock().unwrap().frames = frames
                .into_iter()
                .map(|frame| Ok(Some(frame.to_string())))
                .collect();
            connector
        }

        fn script(&self) -> std::sync::MutexGuard<'_, Script> {
            self.script.lock().unwrap()
        }
    }

    #[async_trait]
    impl Connector for ScriptedConnector {
        type Connection = ScriptedConnection;

        async fn connect(&self, target: &str) -> CatResult<ScriptedConnection> {
            let mut script = self.script.lock().unwrap();
            if script.fail_connect {
                return Err(CatError::transport("connection refused"));
            }
            script.targets.push(target.to_string());
            Ok(ScriptedConnection {
                script: self.script.clone(),
            })
        }
    }

    #[async_trait]
    impl Connection for ScriptedConnection {
        async fn send(&mut self, text: String) -> CatResult<()> {
            let mut script = self.script.lock().unwrap();
            if script.fail_send {
                return Err(CatError::transport("broken pipe"));
            }
            script.sent.push(text);
            Ok(())
        }

        async fn receive(&mut self) -> CatResult<Option<String>> {
            let mut script = self.script.lock().unwrap();
            script.frames.pop_front().unwrap_or(Ok(None))
        }

        async fn close(&mut self) -> CatResult<()> {
            let mut script = self.script.lock().unwrap();
            script.closes += 1;
            if script.fail_close {
                return Err(CatError::transport("already gone"));
            }
            Ok(())
        }
    }

    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("cannot encode"))
        }
    }

    const CHAT_FRAME: &str = r#"{"type":"chat","content":"Hello World","user_id":"userID","agent_id":"agentID","why":{"input":"input","memory":{"episodic":[],"declarative":[],"procedural":[]}}}"#;

    fn hello() -> Message {
        Message::new("Hello World")
            .with_user_id("userID")
            .with_agent_id("agentID")
    }

    #[tokio::test]
    async fn test_exchange_returns_reply() {
        let connector = ScriptedConnector::with_frames(vec![CHAT_FRAME]);
        let exchanger = MessageExchanger::new(connector.clone());

        let response = exchanger
            .exchange("ws://cat/ws/agentID", &hello(), None)
            .await
            .unwrap();

        assert_eq!(response.content, "Hello World");
        assert_eq!(response.message_type, "chat");
        assert_eq!(response.user_id.as_deref(), Some("userID"));
        assert_eq!(response.agent_id.as_deref(), Some("agentID"));
        let why = response.why.unwrap();
        assert_eq!(why.input, "input");
        assert!(why.memory.episodic.is_empty());
        assert!(why.memory.declarative.is_empty());
        assert!(why.memory.procedural.is_empty());

        let script = connector.script();
        assert_eq!(script.targets, vec!["ws://cat/ws/agentID"]);
        assert_eq!(script.closes, 1);
        let sent: serde_json::Value = serde_json::from_str(&script.sent[0]).unwrap();
        assert_eq!(
            sent,
            json!({"text": "Hello World", "user_id": "userID", "agent_id": "agentID"})
        );
    }

    #[tokio::test]
    async fn test_observer_sees_intermediate_frames_in_order() {
        let frames = vec![
            r#"{"type":"notification","content":"Thinking..."}"#,
            r#"{"type":"chat_token","content":"Hel"}"#,
            "not even json",
            CHAT_FRAME,
        ];
        let connector = ScriptedConnector::with_frames(frames.clone());
        let exchanger = MessageExchanger::new(connector.clone());

        let mut seen = Vec::new();
        let mut observer = |frame: &str| -> anyhow::Result<()> {
            seen.push(frame.to_string());
            Ok(())
        };
        let response = exchanger
            .exchange("ws://cat", &hello(), Some(&mut observer))
            .await
            .unwrap();

        assert_eq!(response.content, "Hello World");
        assert_eq!(seen, frames[..3].to_vec());
        assert_eq!(connector.script().closes, 1);
    }

    #[tokio::test]
    async fn test_status_frame_then_chat() {
        let connector = ScriptedConnector::with_frames(vec![
            r#"{"type":"status","msg":"thinking"}"#,
            r#"{"type": "chat", "content": "Meow"}"#,
        ]);
        let exchanger = MessageExchanger::new(connector);

        let mut calls = Vec::new();
        let mut observer = |frame: &str| -> anyhow::Result<()> {
            calls.push(frame.to_string());
            Ok(())
        };
        let response = exchanger
            .exchange("ws://cat", &Message::new("hi"), Some(&mut observer))
            .await
            .unwrap();

        assert_eq!(calls, vec![r#"{"type":"status","msg":"thinking"}"#]);
        assert_eq!(response.content, "Meow");
        assert_eq!(response.user_id, None);
        assert!(response.why.is_none());
    }

    #[tokio::test]
    async fn test_stream_end_without_reply() {
        let connector =
            ScriptedConnector::with_frames(vec![r#"{"type":"notification","content":"..."}"#]);
        let exchanger = MessageExchanger::new(connector.clone());

        let err = exchanger
            .exchange("ws://cat", &hello(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, CatError::Transport(ref msg) if msg == "no message received"));
        assert_eq!(connector.script().closes, 1);
    }

    #[tokio::test]
    async fn test_receive_error_closes_connection() {
        let connector = ScriptedConnector::default();
        connector
            .script()
            .frames
            .push_back(Err(CatError::transport("reset by peer")));
        let exchanger = MessageExchanger::new(connector.clone());

        let err = exchanger
            .exchange("ws://cat", &hello(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, CatError::Transport(_)));
        assert_eq!(connector.script().closes, 1);
    }

    #[tokio::test]
    async fn test_reply_missing_content_fails_to_decode() {
        let connector =
            ScriptedConnector::with_frames(vec![r#"{"type":"chat","user_id":"userID"}"#]);
        let exchanger = MessageExchanger::new(connector.clone());

        let err = exchanger
            .exchange("ws://cat", &hello(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, CatError::Decoding(_)));
        assert_eq!(connector.script().closes, 1);
    }

    #[tokio::test]
    async fn test_encoding_failure_sends_nothing() {
        let connector = ScriptedConnector::with_frames(vec![CHAT_FRAME]);
        let exchanger = MessageExchanger::new(connector.clone());

        let err = exchanger
            .exchange("ws://cat", &Unencodable, None)
            .await
            .unwrap_err();

        assert!(matches!(err, CatError::Encoding(_)));
        let script = connector.script();
        assert!(script.sent.is_empty());
        assert_eq!(script.closes, 1);
    }

    #[tokio::test]
    async fn test_send_failure_closes_connection() {
        let connector = ScriptedConnector::with_frames(vec![CHAT_FRAME]);
        connector.script().fail_send = true;
        let exchanger = MessageExchanger::new(connector.clone());

        let err = exchanger
            .exchange("ws://cat", &hello(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, CatError::Transport(ref msg) if msg == "broken pipe"));
        assert_eq!(connector.script().closes, 1);
    }

    #[tokio::test]
    async fn test_connect_failure() {
        let connector = ScriptedConnector::default();
        connector.script().fail_connect = true;
        let exchanger = MessageExchanger::new(connector.clone());

        let err = exchanger
            .exchange("ws://cat", &hello(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, CatError::Transport(_)));
        assert_eq!(connector.script().closes, 0);
    }

    #[tokio::test]
    async fn test_observer_error_aborts_exchange() {
        let connector = ScriptedConnector::with_frames(vec![
            r#"{"type":"notification","content":"one"}"#,
            r#"{"type":"notification","content":"two"}"#,
            CHAT_FRAME,
        ]);
        let exchanger = MessageExchanger::new(connector.clone());

        let mut calls = 0;
        let mut observer = |_: &str| -> anyhow::Result<()> {
            calls += 1;
            anyhow::bail!("observer gave up")
        };
        let err = exchanger
            .exchange("ws://cat", &hello(), Some(&mut observer))
            .await
            .unwrap_err();

        assert!(matches!(err, CatError::Observer(_)));
        assert_eq!(calls, 1);
        let script = connector.script();
        assert_eq!(script.closes, 1);
        assert_eq!(script.frames.len(), 2);
    }

    #[tokio::test]
    async fn test_close_failure_does_not_mask_reply() {
        let connector = ScriptedConnector::with_frames(vec![CHAT_FRAME]);
        connector.script().fail_close = true;
        let exchanger = MessageExchanger::new(connector.clone());

        let response = exchanger.exchange("ws://cat", &hello(), None).await.unwrap();
        assert_eq!(response.content, "Hello World");
    }

    #[tokio::test]
    async fn test_close_failure_does_not_mask_earlier_error() {
        let connector = ScriptedConnector::default();
        {
            let mut script = connector.script();
            script.fail_send = true;
            script.fail_close = true;
        }
        let exchanger = MessageExchanger::new(connector.clone());

        let err = exchanger
            .exchange("ws://cat", &hello(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, CatError::Transport(ref msg) if msg == "broken pipe"));
    }

    #[test]
    fn test_is_terminal_frame() {
        assert!(is_terminal_frame(r#"{"type":"chat","content":"x"}"#));
        assert!(is_terminal_frame(r#"{"content": "x", "type": "chat"}"#));
        assert!(!is_terminal_frame(r#"{"type":"chat_token","content":"x"}"#));
        assert!(!is_terminal_frame(r#"{"type":"notification","content":"chat"}"#));
        assert!(!is_terminal_frame("chat"));
    }
}
