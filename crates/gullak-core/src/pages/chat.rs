//! Chat page controller
//!
//! The transcript lives locally; each send appends the user's message
//! plus a placeholder reply, then resolves the placeholder with the
//! advisor's answer or the failure text. One request in flight at a
//! time; a failure leaves the input usable.

use crate::advisor::{AdviceRequest, AdvisorError, FAILURE_REPLY};
use crate::models::{ChatMessage, ChatRole, Session};
use crate::view::demo;

/// A send in progress: the placeholder to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    placeholder_id: String,
}

pub struct ChatPage {
    session: Session,
    messages: Vec<ChatMessage>,
    in_flight: bool,
}

impl ChatPage {
    /// Open a chat for the session. Guests start with the welcome
    /// messages; signed-in users start blank.
    pub fn new(session: Session) -> Self {
        let messages = if session.is_authenticated() {
            Vec::new()
        } else {
            demo::demo_welcome_messages()
        };
        Self {
            session,
            messages,
            in_flight: false,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_waiting(&self) -> bool {
        self.in_flight
    }

    pub fn greeting(&self) -> String {
        match &self.session {
            Session::Authenticated { .. } => {
                format!("Welcome {} 👋", self.session.greeting_name())
            }
            Session::Guest => "Chat with Gullak AI".to_string(),
        }
    }

    /// Start a send. Appends the user message and a placeholder reply,
    /// and returns the request to dispatch. `None` when the text is
    /// blank or a request is already in flight.
    pub fn begin(&mut self, text: &str) -> Option<(ChatTurn, AdviceRequest)> {
        let text = text.trim();
        if text.is_empty() || self.in_flight {
            return None;
        }

        self.messages.push(ChatMessage::user(text));
        let request = AdviceRequest::for_chat(&self.session, &self.messages);

        let placeholder = ChatMessage::assistant("Thinking...");
        let turn = ChatTurn {
            placeholder_id: placeholder.id.clone(),
        };
        self.messages.push(placeholder);
        self.in_flight = true;

        Some((turn, request))
    }

    /// Resolve a send: the placeholder becomes the advice on success or
    /// the failure text on error. The transcript accepts input again
    /// either way.
    pub fn resolve(&mut self, turn: ChatTurn, outcome: Result<String, AdvisorError>) {
        let content = match outcome {
            Ok(advice) => advice,
            Err(_) => FAILURE_REPLY.to_string(),
        };

        if let Some(message) = self
            .messages
            .iter_mut()
            .find(|m| m.id == turn.placeholder_id)
        {
            message.content = content;
            message.role = ChatRole::Assistant;
        }
        self.in_flight = false;
    }
}
