use crate::cli::dispatch;
use crate::cli::ux::{ChatMessageType, format_history, style_chat_text};
use crate::svc::chat::Chat;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

// -------------
// REPL commands
// -------------
#[derive(Parser, Debug)]
#[command(multicall = true)]
struct ReplCommand {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// List the messages of this conversation
    #[command(alias = "h")]
    History,
    /// Exit the chat session
    #[command(alias = "q", alias = "quit")]
    Exit,
}

/// Parses a `/command` line. Returns `None` for anything that is not a command.
fn parse_command(line: &str) -> Option<Result<Command, clap::Error>> {
    let rest = line.trim().strip_prefix('/')?;
    Some(ReplCommand::try_parse_from(rest.split_whitespace()).map(|c| c.command))
}

/// Line to keep in the editor history, if any.
fn history_entry(line: &str) -> Option<&str> {
    let entry = line.trim();
    (!entry.is_empty()).then_some(entry)
}

/// Reads lines until the user exits. Every other line is submitted as a message.
pub async fn run(chat: &mut Chat) -> Result<()> {
    let mut editor = DefaultEditor::new().context("Failed to initialize line editor")?;
    let prompt = format!("\n{}", style_chat_text("> ", ChatMessageType::Prompt));

    loop {
        let line = match editor.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("Failed to read input"),
        };

        match parse_command(&line) {
            Some(Ok(Command::Exit)) => break,
            Some(Ok(Command::History)) => println!("{}", format_history(chat.turns())),
            Some(Err(e)) => eprintln!("{e}"),
            None => {
                if let Some(entry) = history_entry(&line) {
                    editor
                        .add_history_entry(entry)
                        .context("Failed to add history entry")?;
                }
                // Blank lines are ignored by the dispatcher.
                dispatch(chat, &line).await;
            }
        }
    }

    debug!("Chat session closed after {} turns", chat.turns().len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_exit_and_aliases() {
        for line in ["/exit", "/q", "/quit", "  /exit  "] {
            assert_eq!(parse_command(line).unwrap().unwrap(), Command::Exit, "{line}");
        }
    }

    #[test]
    fn test_parse_command_history() {
        assert_eq!(
            parse_command("/history").unwrap().unwrap(),
            Command::History
        );
        assert_eq!(parse_command("/h").unwrap().unwrap(), Command::History);
    }

    #[test]
    fn test_parse_command_unknown() {
        assert!(parse_command("/bogus").unwrap().is_err());
        assert!(parse_command("/").unwrap().is_err());
    }

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert!(parse_command("quanto custa?").is_none());
        assert!(parse_command("").is_none());
        assert!(parse_command("a/b").is_none());
    }

    #[test]
    fn test_history_entry_skips_blank_lines() {
        assert_eq!(history_entry("  quanto custa?  "), Some("quanto custa?"));
        assert_eq!(history_entry(" \t "), None);
        assert_eq!(history_entry(""), None);
    }
}
