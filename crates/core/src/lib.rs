mod assets;

pub mod config;
pub mod dispatcher;
pub mod reply;
pub mod responder;
pub mod store;
pub mod transport;
pub mod turn;

#[cfg(test)]
mod test_utils;

pub use crate::assets::{get_config_dir, get_data_dir};
pub use crate::dispatcher::{
    APOLOGY_TEXT, DispatchError, DispatchTicket, ReplyMode, ReplySource, Resolution,
    TurnDispatcher,
};
pub use crate::reply::NOT_UNDERSTOOD_TEXT;
pub use crate::store::ConversationState;
pub use crate::transport::{ChatTransport, HttpTransport, OutboundMessage, TransportError};
pub use crate::turn::{Sender, Turn, TurnId};
