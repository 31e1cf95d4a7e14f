//! Scripted chat strategy for integration testing.
//!
//! Provides a deterministic `ResponseStrategy` that replays a fixed list
//! of answers in order, records what it was asked, and can be told to
//! fail, all in-memory.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use automation_hub::chat::{ChatMessage, ChatSession, ResponseStrategy, Sender, GREETING};

pub struct ScriptedResponder {
    script: Vec<String>,
    cursor: Arc<Mutex<usize>>,
    seen: Arc<Mutex<Vec<String>>>,
    /// If set, every call returns this error.
    force_error: Arc<Mutex<Option<String>>>,
}

impl ScriptedResponder {
    pub fn new(script: &[&str]) -> Self {
        Self {
            script: script.iter().map(|s| s.to_string()).collect(),
            cursor: Arc::new(Mutex::new(0)),
            seen: Arc::new(Mutex::new(Vec::new())),
            force_error: Arc::new(Mutex::new(None)),
        }
    }

    pub fn set_error(&self, msg: Option<&str>) {
        *self.force_error.lock().unwrap() = msg.map(String::from);
    }

    /// Last user message seen by each call, in order.
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResponseStrategy for ScriptedResponder {
    async fn respond(&self, history: &[ChatMessage]) -> Result<String> {
        if let Some(e) = self.force_error.lock().unwrap().clone() {
            return Err(anyhow!(e));
        }
        let last_user = history
            .iter()
            .rev()
            .find(|m| m.sender == Sender::User)
            .map(|m| m.message.clone())
            .unwrap_or_default();
        self.seen.lock().unwrap().push(last_user);

        let mut cursor = self.cursor.lock().unwrap();
        let reply = self.script[*cursor % self.script.len()].clone();
        *cursor += 1;
        Ok(reply)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[tokio::test(start_paused = true)]
async fn test_conversation_follows_script() {
    let responder = Arc::new(ScriptedResponder::new(&["First answer", "Second answer"]));
    let mut session = ChatSession::new(responder.clone(), Duration::from_millis(1500));

    let r1 = session.send("Which CRM workflows exist?").await.unwrap().unwrap();
    let r2 = session.send("And pricing?").await.unwrap().unwrap();
    let r3 = session.send("Thanks").await.unwrap().unwrap();

    assert_eq!(r1.message, "First answer");
    assert_eq!(r2.message, "Second answer");
    assert_eq!(r3.message, "First answer");
    assert_eq!(
        responder.seen(),
        vec!["Which CRM workflows exist?", "And pricing?", "Thanks"]
    );

    let transcript: Vec<Sender> = session.messages().iter().map(|m| m.sender).collect();
    assert_eq!(
        transcript,
        vec![
            Sender::Bot,
            Sender::User,
            Sender::Bot,
            Sender::User,
            Sender::Bot,
            Sender::User,
            Sender::Bot
        ]
    );
    assert_eq!(session.messages()[0].message, GREETING);
}

#[tokio::test(start_paused = true)]
async fn test_recovers_after_strategy_failure() {
    let responder = Arc::new(ScriptedResponder::new(&["Back online"]));
    let mut session = ChatSession::new(responder.clone(), Duration::ZERO);

    responder.set_error(Some("upstream timeout"));
    tokio_test::assert_err!(session.send("hello?").await);
    assert!(!session.is_typing());

    responder.set_error(None);
    let reply = tokio_test::assert_ok!(session.send("hello again").await);
    assert_eq!(reply.unwrap().message, "Back online");
    // greeting + failed user msg + user msg + reply
    assert_eq!(session.messages().len(), 4);
}
