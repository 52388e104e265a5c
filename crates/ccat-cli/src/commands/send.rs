use anyhow::Result;

use ccat::models::message::Message;
use ccat::CatClient;

use crate::render;

pub async fn run(client: &CatClient, text: &str, http: bool) -> Result<()> {
    let message = Message::new(text);
    let response = if http {
        client.message().send_http_message(&message).await?
    } else {
        client
            .message()
            .send_websocket_message(&message, None)
            .await?
    };

    render::markdown(&response.content)
}
