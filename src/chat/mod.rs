//! Support chat widget.
//!
//! A `ChatSession` keeps the transcript and asks a `ResponseStrategy` for
//! the bot's reply after a short simulated typing delay. The only strategy
//! shipped today draws from a fixed corpus of canned answers; a real
//! dispatcher can be swapped in without touching call sites.

pub mod canned;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub use canned::CannedResponder;

/// First message shown when the widget opens.
pub const GREETING: &str =
    "Hi! 👋 Welcome to Automation Hub! How can I help you with n8n workflows today?";

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    pub sender: Sender,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

/// Picks the bot's next reply given the transcript so far.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResponseStrategy: Send + Sync {
    async fn respond(&self, history: &[ChatMessage]) -> Result<String>;

    /// Strategy identifier for logging.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub struct ChatSession {
    messages: Vec<ChatMessage>,
    is_typing: bool,
    next_id: u64,
    typing_delay: Duration,
    strategy: Arc<dyn ResponseStrategy>,
}

impl ChatSession {
    pub fn new(strategy: Arc<dyn ResponseStrategy>, typing_delay: Duration) -> Self {
        let mut session = Self {
            messages: Vec::new(),
            is_typing: false,
            next_id: 1,
            typing_delay,
            strategy,
        };
        session.push(Sender::Bot, GREETING.to_string());
        session
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_typing(&self) -> bool {
        self.is_typing
    }

    /// Post a user message and wait for the bot's answer. Blank input is
    /// ignored and returns `None`.
    pub async fn send(&mut self, text: &str) -> Result<Option<ChatMessage>> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        self.push(Sender::User, text.to_string());

        self.is_typing = true;
        tokio::time::sleep(self.typing_delay).await;
        let reply = self.strategy.respond(&self.messages).await;
        self.is_typing = false;

        let reply = match reply {
            Ok(reply) => reply,
            Err(e) => {
                warn!(strategy = self.strategy.name(), error = %e, "Chat strategy failed");
                return Err(e);
            }
        };
        debug!(strategy = self.strategy.name(), "Bot replied");
        Ok(Some(self.push(Sender::Bot, reply).clone()))
    }

    fn push(&mut self, sender: Sender, message: String) -> &ChatMessage {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(ChatMessage {
            id,
            sender,
            message,
            timestamp: Utc::now(),
        });
        &self.messages[self.messages.len() - 1]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
