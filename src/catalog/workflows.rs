//! Workflow catalog: fixture loading, search, and facet listing.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

use crate::types::{Complexity, HubError};

/// Catalog compiled into the binary.
const BUILTIN_WORKFLOWS: &str = include_str!("data/workflows.json");

/// Filter value meaning "no filter".
pub const ALL: &str = "all";

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

/// A pre-built automation workflow listed in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub category: String,
    pub complexity: Complexity,
    /// One-off price in USD.
    pub price: Decimal,
    pub integrations: Vec<String>,
    pub use_case: String,
    #[serde(default)]
    pub benefits: Vec<String>,
    pub estimated_setup_time: String,
    /// Marketing count, e.g. "45+".
    #[serde(default)]
    pub deployments: String,
    #[serde(default)]
    pub badge: Option<String>,
    #[serde(default)]
    pub featured: bool,
}

impl fmt::Display for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} [{} | {}] ${}",
            self.id, self.title, self.category, self.complexity, self.price
        )
    }
}

impl Workflow {
    /// Case-insensitive match on title, description, use case, or any
    /// integration name. `needle` must already be lowercase.
    fn matches_search(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self.use_case.to_lowercase().contains(needle)
            || self
                .integrations
                .iter()
                .any(|i| i.to_lowercase().contains(needle))
    }
}

/// Card shown in the home page carousel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturedSlide {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub deployments: String,
    pub price: Decimal,
    pub badge: Option<String>,
}

impl From<&Workflow> for FeaturedSlide {
    fn from(w: &Workflow) -> Self {
        Self {
            id: w.id,
            title: w.title.clone(),
            description: w.description.clone(),
            deployments: w.deployments.clone(),
            price: w.price,
            badge: w.badge.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

/// Search box plus the two drop-downs of the catalog page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub complexity: Option<String>,
}

impl WorkflowFilter {
    /// Number of drop-down filters currently narrowing the list.
    pub fn active_filter_count(&self) -> usize {
        [&self.category, &self.complexity]
            .iter()
            .filter(|f| is_set(f))
            .count()
    }

    /// Reset search and both drop-downs.
    pub fn clear(&mut self) {
        self.search = None;
        self.category = Some(ALL.to_string());
        self.complexity = Some(ALL.to_string());
    }

    fn accepts(&self, workflow: &Workflow) -> bool {
        if let Some(term) = self.search.as_deref().filter(|s| !s.is_empty()) {
            if !workflow.matches_search(&term.to_lowercase()) {
                return false;
            }
        }
        if is_set(&self.category) && self.category.as_deref() != Some(workflow.category.as_str()) {
            return false;
        }
        if is_set(&self.complexity)
            && !self
                .complexity
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(workflow.complexity.as_str()))
        {
            return false;
        }
        true
    }
}

fn is_set(filter: &Option<String>) -> bool {
    filter.as_deref().is_some_and(|f| !f.is_empty() && f != ALL)
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct WorkflowCatalog {
    workflows: Vec<Workflow>,
}

impl WorkflowCatalog {
    pub fn new(workflows: Vec<Workflow>) -> Self {
        Self { workflows }
    }

    /// Catalog from the fixture embedded at compile time.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_WORKFLOWS).context("Built-in workflow fixture is invalid")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let workflows: Vec<Workflow> =
            serde_json::from_str(json).context("Failed to parse workflow catalog")?;
        Ok(Self::new(workflows))
    }

    /// Load a catalog fixture from disk.
    pub fn load(path: &str) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read workflow catalog: {path}"))?;
        let catalog = Self::from_json(&json)?;
        info!(path, count = catalog.len(), "Workflow catalog loaded");
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.workflows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workflows.is_empty()
    }

    pub fn all(&self) -> &[Workflow] {
        &self.workflows
    }

    pub fn get(&self, id: u32) -> Result<&Workflow, HubError> {
        self.workflows
            .iter()
            .find(|w| w.id == id)
            .ok_or_else(|| HubError::not_found("Workflow", id))
    }

    /// Workflows passing every active filter, in catalog order.
    pub fn search(&self, filter: &WorkflowFilter) -> Vec<&Workflow> {
        let results: Vec<&Workflow> = self
            .workflows
            .iter()
            .filter(|w| filter.accepts(w))
            .collect();
        debug!(
            search = ?filter.search,
            category = ?filter.category,
            complexity = ?filter.complexity,
            matched = results.len(),
            "Catalog search"
        );
        results
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<String> {
        distinct(self.workflows.iter().map(|w| w.category.clone()))
    }

    /// Distinct complexities in first-seen order.
    pub fn complexities(&self) -> Vec<Complexity> {
        distinct(self.workflows.iter().map(|w| w.complexity))
    }

    /// Slides for the home page carousel.
    pub fn featured(&self) -> Vec<FeaturedSlide> {
        self.workflows
            .iter()
            .filter(|w| w.featured)
            .map(FeaturedSlide::from)
            .collect()
    }
}

fn distinct<T: PartialEq>(values: impl Iterator<Item = T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::new();
    for v in values {
        if !out.contains(&v) {
            out.push(v);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
