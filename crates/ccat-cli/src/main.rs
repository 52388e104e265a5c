use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ccat::{CatClient, CatConfig};

mod commands;
mod render;

use commands::{chat, memory, plugins, send, settings};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Command,
}

/// Overrides for the `CCAT_*` environment settings
#[derive(Args, Debug, Default)]
struct ConnectionArgs {
    /// Cat host (can also be set via CCAT_HOST)
    #[arg(long, global = true)]
    host: Option<String>,

    /// Cat port (can also be set via CCAT_PORT)
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Use https and wss
    #[arg(long, global = true)]
    secure: bool,

    /// API key (can also be set via CCAT_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Chat with the Cat over WebSocket
    Chat {
        #[arg(long)]
        agent_id: Option<String>,

        #[arg(long)]
        user_id: Option<String>,
    },

    /// Send a single message and print the reply
    Send {
        text: String,

        /// Use the HTTP endpoint instead of WebSocket
        #[arg(long)]
        http: bool,
    },

    /// Inspect the agent memory
    Memory {
        #[command(subcommand)]
        command: memory::MemoryCommand,
    },

    /// Browse plugins
    Plugins {
        #[command(subcommand)]
        command: plugins::PluginsCommand,
    },

    /// Show the settings of a factory
    Settings {
        #[arg(value_enum)]
        factory: settings::Factory,
    },
}

impl ConnectionArgs {
    fn apply(self, mut config: CatConfig) -> CatConfig {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if self.secure {
            config.secure = true;
        }
        if let Some(api_key) = self.api_key {
            config.api_key = Some(api_key);
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = CatConfig::from_env().context("Failed to load configuration")?;
    let config = cli.connection.apply(config);
    tracing::debug!(host = %config.host, port = config.port, "connecting");
    let client = CatClient::new(config)?;

    match cli.command {
        Command::Chat { agent_id, user_id } => {
            chat::run(&client, agent_id.as_deref(), user_id.as_deref()).await
        }
        Command::Send { text, http } => send::run(&client, &text, http).await,
        Command::Memory { command } => memory::run(&client, command).await,
        Command::Plugins { command } => plugins::run(&client, command).await,
        Command::Settings { factory } => settings::run(&client, factory).await,
    }
}
