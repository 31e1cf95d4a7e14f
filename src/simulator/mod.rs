//! Step-through workflow demos.
//!
//! A `StepPlayer` walks a workflow's steps one tick at a time while
//! playing and stops on the last step. `DemoShowcase` holds the home page
//! demos and resets the player whenever another demo is picked; the
//! `driver` module runs a showcase on a tokio timer.

pub mod driver;

pub use driver::DemoPlayerHandle;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::types::HubError;

const BUILTIN_DEMOS: &str = include_str!("demos.json");

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub title: String,
    pub description: String,
    /// Simulated execution time of the step.
    #[serde(default)]
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Completed,
    Active,
    Pending,
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct StepPlayer {
    steps: Vec<Step>,
    current_step: usize,
    is_playing: bool,
    speed: Duration,
}

fn check_speed(speed: Duration) -> Result<(), HubError> {
    if speed.is_zero() {
        return Err(HubError::Config(
            "demo step interval must be greater than zero".into(),
        ));
    }
    Ok(())
}

impl StepPlayer {
    pub fn new(steps: Vec<Step>, speed: Duration) -> Result<Self, HubError> {
        if steps.is_empty() {
            return Err(HubError::Validation("A demo needs at least one step".into()));
        }
        check_speed(speed)?;
        Ok(Self {
            steps,
            current_step: 0,
            is_playing: false,
            speed,
        })
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Interval between ticks while playing.
    pub fn speed(&self) -> Duration {
        self.speed
    }

    pub fn set_speed(&mut self, speed: Duration) -> Result<(), HubError> {
        check_speed(speed)?;
        self.speed = speed;
        Ok(())
    }

    pub fn play(&mut self) {
        self.is_playing = true;
    }

    pub fn pause(&mut self) {
        self.is_playing = false;
    }

    /// Stop and rewind to the first step.
    pub fn reset(&mut self) {
        self.is_playing = false;
        self.current_step = 0;
    }

    /// One timer tick. Advances while playing; on the last step playback
    /// stops and the position stays put. Returns true if the step changed.
    pub fn tick(&mut self) -> bool {
        if !self.is_playing {
            return false;
        }
        if self.current_step >= self.steps.len() - 1 {
            self.is_playing = false;
            debug!(step = self.current_step, "Demo reached last step");
            return false;
        }
        self.current_step += 1;
        true
    }

    pub fn step_status(&self, index: usize) -> StepStatus {
        if index < self.current_step {
            StepStatus::Completed
        } else if index == self.current_step {
            StepStatus::Active
        } else {
            StepStatus::Pending
        }
    }

    pub fn progress_pct(&self) -> f64 {
        (self.current_step + 1) as f64 / self.steps.len() as f64 * 100.0
    }

    pub fn remaining_steps(&self) -> usize {
        self.steps.len() - self.current_step
    }

    /// Sum of the step durations, in whole seconds.
    pub fn estimated_total_secs(&self) -> u64 {
        let total_ms: u64 = self.steps.iter().map(|s| s.duration_ms).sum();
        (total_ms as f64 / 1000.0).round() as u64
    }
}

// ---------------------------------------------------------------------------
// Demo showcase
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Demo {
    pub title: String,
    pub description: String,
    pub time_saved: String,
    pub before: Vec<String>,
    pub after: Vec<String>,
    pub steps: Vec<Step>,
}

pub fn builtin_demos() -> Result<Vec<Demo>> {
    serde_json::from_str(BUILTIN_DEMOS).context("Built-in demo fixture is invalid")
}

/// The "see it in action" section: a set of demos, one selected.
#[derive(Debug, Clone)]
pub struct DemoShowcase {
    demos: Vec<Demo>,
    current_demo: usize,
    player: StepPlayer,
}

impl DemoShowcase {
    pub fn new(demos: Vec<Demo>, speed: Duration) -> Result<Self, HubError> {
        let first = demos
            .first()
            .ok_or_else(|| HubError::Validation("No demos configured".into()))?;
        let player = StepPlayer::new(first.steps.clone(), speed)?;
        Ok(Self {
            demos,
            current_demo: 0,
            player,
        })
    }

    pub fn demos(&self) -> &[Demo] {
        &self.demos
    }

    pub fn current_index(&self) -> usize {
        self.current_demo
    }

    pub fn current_demo(&self) -> &Demo {
        &self.demos[self.current_demo]
    }

    pub fn player(&self) -> &StepPlayer {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut StepPlayer {
        &mut self.player
    }

    /// Switch demos; playback stops and rewinds.
    pub fn select_demo(&mut self, index: usize) -> Result<(), HubError> {
        let demo = self
            .demos
            .get(index)
            .ok_or_else(|| HubError::not_found("Demo", index))?;
        self.player = StepPlayer::new(demo.steps.clone(), self.player.speed())?;
        self.current_demo = index;
        Ok(())
    }

    pub fn snapshot(&self) -> DemoSnapshot {
        let player = &self.player;
        DemoSnapshot {
            demo_index: self.current_demo,
            title: self.current_demo().title.clone(),
            current_step: player.current_step(),
            is_playing: player.is_playing(),
            speed_ms: player.speed().as_millis() as u64,
            progress_pct: player.progress_pct(),
            remaining_steps: player.remaining_steps(),
            step_statuses: (0..player.steps().len())
                .map(|i| player.step_status(i))
                .collect(),
        }
    }
}

/// Serialisable view of the showcase for clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoSnapshot {
    pub demo_index: usize,
    pub title: String,
    pub current_step: usize,
    pub is_playing: bool,
    pub speed_ms: u64,
    pub progress_pct: f64,
    pub remaining_steps: usize,
    pub step_statuses: Vec<StepStatus>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
