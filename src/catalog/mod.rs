//! Static catalog data: workflows and supported integrations.
//!
//! Fixtures are JSON files embedded at compile time; a workflow fixture
//! can also be loaded from disk via `hub.workflows_path`.

pub mod integrations;
pub mod workflows;

pub use integrations::{IntegrationDirectory, IntegrationSelection};
pub use workflows::{FeaturedSlide, Workflow, WorkflowCatalog, WorkflowFilter};
