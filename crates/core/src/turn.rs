//! A turn is one message in the conversation, authored by the user or the bot.
use chrono::{DateTime, Utc};
use std::fmt;

/// Author of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match &self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }
}

impl From<Sender> for String {
    fn from(val: Sender) -> Self {
        val.as_str().into()
    }
}

/// Identifier of a turn, unique within one conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TurnId(String);

impl TurnId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hands out turn ids for a single conversation.
///
/// The counter makes ids unique within the conversation. The random tag only keeps
/// ids from two conversations apart most of the time; ids are display keys, so a
/// cross-conversation clash is harmless.
#[derive(Debug)]
pub struct TurnIdGenerator {
    tag: String,
    next: u64,
}

impl TurnIdGenerator {
    pub fn new() -> Self {
        let tag = format!("{:08x}", rand::random::<u32>());
        Self { tag, next: 0 }
    }

    pub fn next_id(&mut self) -> TurnId {
        self.next += 1;
        TurnId(format!("{}-{}", self.tag, self.next))
    }
}

impl Default for TurnIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// A committed message. Fields are read-only once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    id: TurnId,
    text: String,
    sender: Sender,
    timestamp: DateTime<Utc>,
}

impl Turn {
    pub(crate) fn new(id: TurnId, text: String, sender: Sender) -> Self {
        Self {
            id,
            text,
            sender,
            timestamp: Utc::now(),
        }
    }

    pub fn id(&self) -> &TurnId {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
