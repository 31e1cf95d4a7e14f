//! Canned-response strategy: a uniform random pick from a fixed corpus.

use anyhow::Result;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

use super::{ChatMessage, ResponseStrategy};

pub const CANNED_REPLIES: &[&str] = &[
    "I'd be happy to help you find the perfect workflow! What type of automation are you looking for?",
    "Great question! Our workflows are designed to save you hours of manual work. Which business process would you like to automate?",
    "That sounds like a perfect use case for automation! Let me suggest some workflows that might help.",
    "I can help you with that! Have you checked out our workflow demos? They show exactly how each automation works.",
    "Absolutely! Our n8n workflows are pre-built and ready to deploy. Would you like me to show you some popular options?",
    "That's a common challenge many businesses face. We have several workflows that can solve that problem efficiently.",
    "Perfect! I can guide you through the setup process. Most of our workflows can be deployed in under 30 minutes.",
    "Great choice! That workflow has helped many businesses save significant time. Would you like to see a demo?",
];

pub struct CannedResponder {
    replies: Vec<String>,
    rng: Mutex<StdRng>,
}

impl CannedResponder {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic sequence of picks, for tests and demos.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            replies: CANNED_REPLIES.iter().map(|s| s.to_string()).collect(),
            rng: Mutex::new(rng),
        }
    }
}

impl Default for CannedResponder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResponseStrategy for CannedResponder {
    async fn respond(&self, _history: &[ChatMessage]) -> Result<String> {
        let idx = {
            let mut rng = self
                .rng
                .lock()
                .map_err(|_| anyhow::anyhow!("Canned responder RNG poisoned"))?;
            rng.gen_range(0..self.replies.len())
        };
        Ok(self.replies[idx].clone())
    }

    fn name(&self) -> &str {
        "canned"
    }
}
