use anyhow::Result;
use clap::Subcommand;
use console::style;

use ccat::CatClient;

#[derive(Subcommand, Debug)]
pub enum PluginsCommand {
    /// List installed plugins and registry matches
    List { query: Option<String> },
}

pub async fn run(client: &CatClient, command: PluginsCommand) -> Result<()> {
    match command {
        PluginsCommand::List { query } => {
            let output = client
                .plugins()
                .get_available_plugins(query.as_deref(), None)
                .await?;

            println!("{}", style("Installed").bold());
            for plugin in &output.installed {
                let state = if plugin.active.unwrap_or(false) {
                    style("active").green()
                } else {
                    style("inactive").dim()
                };
                println!("  {} ({}) {}", plugin.name, plugin.id, state);
            }

            if !output.registry.is_empty() {
                println!("{}", style("Registry").bold());
                for plugin in &output.registry {
                    match &plugin.url {
                        Some(url) => println!("  {} {}", plugin.name, style(url).dim()),
                        None => println!("  {}", plugin.name),
                    }
                }
            }
            Ok(())
        }
    }
}
