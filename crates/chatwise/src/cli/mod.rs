//! ChatWise cli definition and entrypoint.
mod ask;
mod chat;
pub mod ux;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chatwise_core::config::{Config, Environment, get_config};
use chatwise_core::{ReplyMode, Resolution};
use clap::{Args, Parser, Subcommand};
use url::Url;

use crate::log::setup_logging;
use crate::svc::chat::Chat;
use ux::{TYPING_MESSAGE, TypingSpinner};

/// ChatWise - a conversational chat widget for the terminal.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Show verbose logs.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

/// Settings that override the configured widget.
#[derive(Args, Debug, Default)]
struct WidgetArgs {
    /// Reply with the local keyword responder instead of the endpoint.
    #[arg(long)]
    local: bool,

    /// Environment used to pick the endpoint, e.g. development or production.
    #[arg(short, long)]
    env: Option<Environment>,

    /// Chat endpoint to use instead of the configured one.
    #[arg(long)]
    endpoint: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open an interactive chat session.
    Chat {
        #[command(flatten)]
        widget: WidgetArgs,
    },
    /// Send one message and print the reply.
    Ask {
        /// Message to send.
        #[arg(required = true)]
        message: Vec<String>,
        #[command(flatten)]
        widget: WidgetArgs,
    },
}

/// Runs the main CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        setup_logging().context("Failed to set up logging")?;
    }

    match cli.command {
        Commands::Chat { widget } => {
            let config = load_config(cli.config, &widget)?;
            chat::execute(Chat::new(&config)).await
        }
        Commands::Ask { message, widget } => {
            let config = load_config(cli.config, &widget)?;
            ask::execute(message, Chat::new(&config)).await
        }
    }
}

fn load_config(config_path: Option<PathBuf>, widget: &WidgetArgs) -> Result<Config> {
    let environment = match widget.env {
        Some(env) => env,
        None => Environment::from_env().context("Failed to read environment")?,
    };
    let config = get_config(config_path, environment).context("Failed to load configuration")?;
    apply_overrides(config, widget)
}

fn apply_overrides(mut config: Config, widget: &WidgetArgs) -> Result<Config> {
    if let Some(endpoint) = &widget.endpoint {
        config.widget.endpoint =
            Url::parse(endpoint).with_context(|| format!("Invalid endpoint '{endpoint}'"))?;
    }
    if widget.local {
        config.widget.mode = ReplyMode::Local;
    }
    Ok(config)
}

/// Runs one dispatch cycle with the typing indicator shown while the reply is pending.
///
/// Returns `None` when the text was not accepted.
pub(crate) async fn dispatch(chat: &mut Chat, text: &str) -> Option<Resolution> {
    let ticket = chat.begin(text)?;
    let spinner = TypingSpinner::new(TYPING_MESSAGE.to_string());
    let outcome = chat.exchange(&ticket).await;
    spinner.clear();
    Some(chat.resolve(ticket, outcome))
}
