use serde_json::json;
use tracing::debug;

use crate::client::CatClient;
use crate::errors::CatResult;
use crate::exchange::{FrameObserver, MessageExchanger};
use crate::http::Scope;
use crate::models::message::{Message, Response};
use crate::transport::Connector;

pub struct MessageEndpoint<'a> {
    client: &'a CatClient,
}

impl<'a> MessageEndpoint<'a> {
    pub(crate) fn new(client: &'a CatClient) -> Self {
        Self { client }
    }

    /// Send a message over plain HTTP. Only the text is forwarded.
    pub async fn send_http_message(&self, message: &Message) -> CatResult<Response> {
        let scope = Scope::agent(message.agent_id.as_deref()).with_user(message.user_id.as_deref());
        self.client
            .http()
            .post_json("/message", &json!({ "text": message.text }), scope)
            .await
    }

    /// Send a message over WebSocket and wait for the reply. Frames that arrive
    /// before it (notifications, streamed tokens) go to `observer`.
    pub async fn send_websocket_message(
        &self,
        message: &Message,
        observer: Option<&mut FrameObserver<'_>>,
    ) -> CatResult<Response> {
        self.send_websocket_message_with(self.client.exchanger(), message, observer)
            .await
    }

    /// Same as [`send_websocket_message`](Self::send_websocket_message) over a
    /// caller supplied transport.
    pub async fn send_websocket_message_with<C: Connector>(
        &self,
        exchanger: &MessageExchanger<C>,
        message: &Message,
        observer: Option<&mut FrameObserver<'_>>,
    ) -> CatResult<Response> {
        let target = self
            .client
            .ws_url(message.agent_id.as_deref(), message.user_id.as_deref())?;
        debug!(path = target.path(), "sending websocket message");

        exchanger.exchange(target.as_str(), message, observer).await
    }
}
