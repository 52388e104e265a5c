use anyhow::Result;
use clap::Subcommand;

use ccat::CatClient;

use crate::render;

#[derive(Subcommand, Debug)]
pub enum MemoryCommand {
    /// List the collections and their sizes
    Collections,

    /// Recall the memories closest to a text
    Recall {
        text: String,

        /// Number of memories per collection
        #[arg(short, long)]
        k: Option<u32>,
    },

    /// Show the conversation history
    History,
}

pub async fn run(client: &CatClient, command: MemoryCommand) -> Result<()> {
    let memory = client.memory();
    match command {
        MemoryCommand::Collections => render::json(&memory.get_memory_collections(None).await?),
        MemoryCommand::Recall { text, k } => {
            render::json(&memory.get_memory_recall(&text, k, None, None).await?)
        }
        MemoryCommand::History => {
            render::json(&memory.get_conversation_history(None, None).await?)
        }
    }
}
