use std::sync::Arc;

use chatwise_core::config::Config;
use chatwise_core::store::TurnObserver;
use chatwise_core::{
    ChatTransport, ConversationState, DispatchTicket, HttpTransport, ReplyMode, Resolution,
    TransportError, Turn, TurnDispatcher,
};
use url::Url;

/// A mounted chat widget: one conversation and the dispatcher that feeds it.
pub struct Chat {
    state: ConversationState,
    dispatcher: TurnDispatcher,
    title: String,
    endpoint: Url,
}

impl Chat {
    pub fn new(config: &Config) -> Self {
        let widget = &config.widget;
        let transport = HttpTransport::new(widget.endpoint.clone(), widget.credential.clone());
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(config: &Config, transport: Arc<dyn ChatTransport>) -> Self {
        let dispatcher = TurnDispatcher::new(transport, config.widget.mode)
            .with_responder(config.responder.clone());

        Self {
            state: ConversationState::new(),
            dispatcher,
            title: config.widget.title.clone(),
            endpoint: config.widget.endpoint.clone(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn mode(&self) -> ReplyMode {
        self.dispatcher.mode()
    }

    pub fn subscribe(&mut self, observer: TurnObserver) {
        self.state.subscribe(observer);
    }

    pub fn turns(&self) -> &[Turn] {
        self.state.turns()
    }

    pub fn is_pending(&self) -> bool {
        self.state.is_pending()
    }

    /// Puts `text` in the input buffer and starts a dispatch for it.
    ///
    /// Returns `None` when the text is blank or a reply is still pending.
    pub fn begin(&mut self, text: &str) -> Option<DispatchTicket> {
        self.state.set_draft(text);
        self.dispatcher.begin(&mut self.state)
    }

    pub async fn exchange(&self, ticket: &DispatchTicket) -> Result<String, TransportError> {
        self.dispatcher.exchange(ticket).await
    }

    pub fn resolve(
        &mut self,
        ticket: DispatchTicket,
        outcome: Result<String, TransportError>,
    ) -> Resolution {
        self.dispatcher.resolve(&mut self.state, ticket, outcome)
    }
}
