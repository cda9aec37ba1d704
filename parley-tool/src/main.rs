mod ask;
mod config;
mod error;
mod logging;

#[cfg(feature = "chat")]
mod chat;

use clap::{Parser, Subcommand};
use parley_client::AssistantClient;

use crate::config::{BASE_URL_ENV, Settings, load_config};

#[derive(Parser)]
#[command(name = "parley")]
#[command(about = "Chat with the parley assistant service", long_about = None)]
struct Cli {
    /// Base URL of the assistant service
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[cfg(feature = "chat")]
    /// Start an interactive chat session
    Chat {
        /// Heading shown above the conversation
        #[arg(long)]
        title: Option<String>,
    },

    /// Ask a single question and print the conversation
    Ask {
        /// The question to send
        #[arg(required = true)]
        query: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config()?;
    let settings = Settings::resolve(config, cli.base_url, std::env::var(BASE_URL_ENV).ok());
    logging::init(&settings.log_file)?;

    tracing::info!(base_url = %settings.base_url, "Starting parley");
    let client = AssistantClient::with_base_url(&settings.base_url);

    match cli.command {
        #[cfg(feature = "chat")]
        Command::Chat { title } => {
            chat::run(client, title.unwrap_or(settings.title)).await?;
        }
        Command::Ask { query } => {
            ask::run(client, &query.join(" ")).await?;
        }
    }

    Ok(())
}
