//! Home page workflow builder.
//!
//! A scratch pad for sketching a workflow: a name plus an ordered list of
//! trigger/action/condition/delay steps. Nothing is deployed; saving only
//! acknowledges the draft.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

use crate::types::HubError;

pub const DEFAULT_WORKFLOW_NAME: &str = "My Custom Workflow";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Trigger,
    Action,
    Condition,
    Delay,
}

impl StepKind {
    pub const ALL: &'static [StepKind] = &[
        StepKind::Trigger,
        StepKind::Action,
        StepKind::Condition,
        StepKind::Delay,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            StepKind::Trigger => "Trigger",
            StepKind::Action => "Action",
            StepKind::Condition => "Condition",
            StepKind::Delay => "Delay",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            StepKind::Trigger => "⚡",
            StepKind::Action => "🔧",
            StepKind::Condition => "❓",
            StepKind::Delay => "⏰",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for StepKind {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trigger" => Ok(StepKind::Trigger),
            "action" => Ok(StepKind::Action),
            "condition" => Ok(StepKind::Condition),
            "delay" => Ok(StepKind::Delay),
            other => Err(HubError::Validation(format!("Unknown step type: {other}"))),
        }
    }
}

/// Palette entry shown on the "Add Steps" buttons.
#[derive(Debug, Clone, Serialize)]
pub struct StepType {
    #[serde(rename = "type")]
    pub kind: StepKind,
    pub title: &'static str,
    pub icon: &'static str,
}

pub fn step_types() -> Vec<StepType> {
    StepKind::ALL
        .iter()
        .map(|k| StepType {
            kind: *k,
            title: k.title(),
            icon: k.icon(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuilderStep {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: StepKind,
    pub title: String,
    pub description: String,
    pub icon: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowBuilder {
    name: String,
    steps: Vec<BuilderStep>,
    #[serde(skip)]
    next_id: u64,
}

impl Default for WorkflowBuilder {
    /// A trigger followed by an action.
    fn default() -> Self {
        let steps = vec![
            BuilderStep {
                id: 1,
                kind: StepKind::Trigger,
                title: StepKind::Trigger.title().into(),
                description: "When this happens...".into(),
                icon: StepKind::Trigger.icon(),
            },
            BuilderStep {
                id: 2,
                kind: StepKind::Action,
                title: StepKind::Action.title().into(),
                description: "Do this...".into(),
                icon: StepKind::Action.icon(),
            },
        ];
        Self {
            name: DEFAULT_WORKFLOW_NAME.into(),
            steps,
            next_id: 3,
        }
    }
}

impl WorkflowBuilder {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[BuilderStep] {
        &self.steps
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Append a step of `kind` with placeholder text.
    pub fn add_step(&mut self, kind: StepKind) -> &BuilderStep {
        let id = self.next_id;
        self.next_id += 1;
        self.steps.push(BuilderStep {
            id,
            kind,
            title: kind.title().into(),
            description: "Configure this step...".into(),
            icon: kind.icon(),
        });
        &self.steps[self.steps.len() - 1]
    }

    pub fn remove_step(&mut self, id: u64) -> Result<(), HubError> {
        let before = self.steps.len();
        self.steps.retain(|s| s.id != id);
        if self.steps.len() == before {
            return Err(HubError::not_found("Step", id));
        }
        Ok(())
    }

    /// Acknowledge the draft. Returns the confirmation text.
    pub fn save(&self) -> String {
        info!(name = %self.name, steps = self.steps.len(), "Workflow draft saved");
        format!("Workflow \"{}\" saved successfully!", self.name)
    }
}
