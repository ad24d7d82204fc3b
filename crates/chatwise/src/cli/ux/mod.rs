mod presenter;
mod progress;

pub use presenter::{
    ChatMessageType, format_banner, format_history, format_turn, style_chat_text,
};
pub use progress::TypingSpinner;

/// Message shown next to the spinner while a reply is pending.
pub const TYPING_MESSAGE: &str = "Digitando...";

/// Prints a formatted error message to stderr.
pub fn present_error(error: anyhow::Error) {
    eprintln!("\n{}", format_error(&error));
}

fn format_error(error: &anyhow::Error) -> String {
    let label = style_chat_text("ERROR:", ChatMessageType::Error);
    format!("{label} {error:#}")
}
