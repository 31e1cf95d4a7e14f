//! Integration compatibility checker.
//!
//! Lists the third-party services workflows can talk to, and scores a
//! user's selection by the share of fully supported services.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::workflows::ALL;

const BUILTIN_INTEGRATIONS: &str = include_str!("data/integrations.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportStatus {
    Supported,
    Partial,
    Unsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Integration {
    pub id: u32,
    pub name: String,
    pub category: String,
    pub status: SupportStatus,
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone)]
pub struct IntegrationDirectory {
    integrations: Vec<Integration>,
}

impl IntegrationDirectory {
    pub fn builtin() -> Result<Self> {
        let integrations: Vec<Integration> = serde_json::from_str(BUILTIN_INTEGRATIONS)
            .context("Built-in integration fixture is invalid")?;
        Ok(Self { integrations })
    }

    pub fn all(&self) -> &[Integration] {
        &self.integrations
    }

    pub fn get(&self, id: u32) -> Option<&Integration> {
        self.integrations.iter().find(|i| i.id == id)
    }

    /// Case-insensitive name match plus an exact category match
    /// (`"all"` matches every category).
    pub fn filter(&self, search: &str, category: &str) -> Vec<&Integration> {
        let needle = search.to_lowercase();
        self.integrations
            .iter()
            .filter(|i| i.name.to_lowercase().contains(&needle))
            .filter(|i| category.is_empty() || category == ALL || i.category == category)
            .collect()
    }

    /// `"all"` followed by each category in first-seen order.
    pub fn categories(&self) -> Vec<String> {
        let mut out = vec![ALL.to_string()];
        for i in &self.integrations {
            if !out.contains(&i.category) {
                out.push(i.category.clone());
            }
        }
        out
    }

    /// Percentage (0–100, rounded) of selected integrations that are fully
    /// supported. Repeated ids count once; unknown ids count as not
    /// supported.
    pub fn compatibility_score(&self, selected: &[u32]) -> u32 {
        let distinct: BTreeSet<u32> = selected.iter().copied().collect();
        if distinct.is_empty() {
            return 0;
        }
        let supported = distinct
            .iter()
            .filter(|id| {
                self.get(**id)
                    .is_some_and(|i| i.status == SupportStatus::Supported)
            })
            .count();
        (supported as f64 / distinct.len() as f64 * 100.0).round() as u32
    }
}

/// The user's current pick of integrations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationSelection {
    ids: Vec<u32>,
}

impl IntegrationSelection {
    /// Add the id if absent, remove it if present.
    pub fn toggle(&mut self, id: u32) {
        if let Some(pos) = self.ids.iter().position(|i| *i == id) {
            self.ids.remove(pos);
        } else {
            self.ids.push(id);
        }
    }

    pub fn contains(&self, id: u32) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> &[u32] {
        &self.ids
    }
}
