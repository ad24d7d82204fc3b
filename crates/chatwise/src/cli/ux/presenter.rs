use chatwise_core::{ReplyMode, Sender, Turn};
use chrono::{DateTime, Local, Utc};
use console::{Style, StyledObject};

/// Label shown above the user's turns.
const USER_LABEL: &str = "Você";

/// Represents the type of a chat message, used for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatMessageType {
    /// The prompt for user input.
    Prompt,
    /// Header of a user turn.
    User,
    /// Header of a bot turn.
    Bot,
    /// Footer information, like turn ids or status.
    Footer,
    /// An error message.
    Error,
}

/// Styles a string of text according to the specified `ChatMessageType`.
pub fn style_chat_text(text: &str, style: ChatMessageType) -> StyledObject<&str> {
    let style_obj = match style {
        ChatMessageType::Prompt => Style::new().blue().bold(),
        ChatMessageType::User => Style::new().blue(),
        ChatMessageType::Bot => Style::new().green().bold(),
        ChatMessageType::Footer => Style::new().white().dim(),
        ChatMessageType::Error => Style::new().red().bold(),
    };
    style_obj.apply_to(text)
}

/// Formats an instant as local wall-clock time, e.g. `14:05`.
pub fn format_time(timestamp: DateTime<Utc>) -> String {
    timestamp.with_timezone(&Local).format("%H:%M").to_string()
}

/// Formats a turn as a labelled block: a header with author and time, then the text.
pub fn format_turn(turn: &Turn, bot_label: &str) -> String {
    let (label, style) = match turn.sender() {
        Sender::User => (USER_LABEL, ChatMessageType::User),
        Sender::Bot => (bot_label, ChatMessageType::Bot),
    };
    let time = format_time(turn.timestamp());
    format!(
        "{} {}\n{}",
        style_chat_text(label, style),
        style_chat_text(&time, ChatMessageType::Footer),
        turn.text()
    )
}

/// One line per turn for the `/history` command.
pub fn format_history(turns: &[Turn]) -> String {
    if turns.is_empty() {
        return style_chat_text("No messages yet.", ChatMessageType::Footer).to_string();
    }

    turns
        .iter()
        .map(|turn| {
            let meta = format!(
                "[{}] {} {:>4}",
                format_time(turn.timestamp()),
                turn.id(),
                turn.sender().as_str()
            );
            format!(
                "{} {}",
                style_chat_text(&meta, ChatMessageType::Footer),
                turn.text()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Banner printed when the chat opens.
pub fn format_banner(title: &str, mode: ReplyMode, endpoint: &str) -> String {
    let meta = format!("{mode} mode · {endpoint} · /exit to leave");
    format!(
        "{}\n{}",
        style_chat_text(title, ChatMessageType::Prompt),
        style_chat_text(&meta, ChatMessageType::Footer)
    )
}
