use anyhow::Result;
use cliclack::{input, spinner};
use console::style;
use tokio::sync::mpsc;

use ccat::models::message::Message;
use ccat::CatClient;

use crate::render;

pub async fn run(client: &CatClient, agent_id: Option<&str>, user_id: Option<&str>) -> Result<()> {
    println!(
        "Chatting with the Cat at {} {}",
        style(client.config().http_base_url()).cyan(),
        style("- type \"exit\" to end the session").dim()
    );
    println!();

    loop {
        let text: String = input("Message:").placeholder("").multiline().interact()?;

        if text.trim().eq_ignore_ascii_case("exit") {
            break;
        }

        let mut message = Message::new(text);
        if let Some(agent_id) = agent_id {
            message = message.with_agent_id(agent_id);
        }
        if let Some(user_id) = user_id {
            message = message.with_user_id(user_id);
        }

        let spin = spinner();
        spin.start("awaiting reply");

        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let exchange = async move {
            let mut observer = move |frame: &str| -> anyhow::Result<()> {
                tx.send(render::frame_status(frame))?;
                Ok(())
            };
            client
                .message()
                .send_websocket_message(&message, Some(&mut observer))
                .await
        };
        let progress = async {
            while let Some(status) = rx.recv().await {
                spin.set_message(status);
            }
        };
        let (reply, ()) = tokio::join!(exchange, progress);

        match reply {
            Ok(response) => {
                spin.stop("");
                render::markdown(&response.content)?;
            }
            Err(e) => {
                spin.error(format!("{}", e));
                tracing::debug!(error = ?e, "exchange failed");
            }
        }
        println!();
    }
    Ok(())
}
