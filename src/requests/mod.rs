//! Client requests: custom workflow builds and modifications of catalog
//! workflows.
//!
//! `RequestDesk` owns the key-value store; every mutation is saved before
//! returning so a crash never loses an acknowledged submission. A failed
//! save rolls the in-memory change back.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::catalog::WorkflowCatalog;
use crate::storage::{LocalStore, CUSTOM_REQUESTS_KEY, MODIFICATION_REQUESTS_KEY};
use crate::types::{HubError, RequestStatus};

// ---------------------------------------------------------------------------
// Custom workflow requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomRequestForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub budget: String,
    #[serde(default)]
    pub delivery_time: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub integrations: Vec<String>,
}

impl CustomRequestForm {
    /// Add an integration tag. Blank and duplicate tags are ignored.
    pub fn add_integration(&mut self, raw: &str) -> bool {
        let tag = raw.trim();
        if tag.is_empty() || self.integrations.iter().any(|t| t == tag) {
            return false;
        }
        self.integrations.push(tag.to_string());
        true
    }

    pub fn remove_integration(&mut self, tag: &str) -> bool {
        let before = self.integrations.len();
        self.integrations.retain(|t| t != tag);
        self.integrations.len() != before
    }

    pub fn validate(&self) -> Result<(), HubError> {
        let required = [&self.title, &self.description, &self.budget, &self.delivery_time];
        if required.iter().any(|f| f.trim().is_empty()) {
            return Err(HubError::Validation(
                "Please fill in all required fields".into(),
            ));
        }
        Ok(())
    }

    /// Re-apply the tag rules to tags that arrived over the wire.
    fn normalize(mut self) -> Self {
        let raw = std::mem::take(&mut self.integrations);
        for tag in &raw {
            self.add_integration(tag);
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomRequest {
    pub id: Uuid,
    #[serde(flatten)]
    pub form: CustomRequestForm,
    pub status: RequestStatus,
    pub submitted_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Modification requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    /// Within 2 weeks.
    Low,
    /// Within 1 week.
    #[default]
    Normal,
    /// Within 3 days.
    High,
    /// Within 24 hours.
    Urgent,
}

fn default_request_type() -> String {
    "modification".into()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModificationForm {
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub client_email: String,
    #[serde(default = "default_request_type")]
    pub request_type: String,
    #[serde(default)]
    pub modifications: String,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub budget: String,
    #[serde(default)]
    pub additional_notes: String,
}

impl Default for ModificationForm {
    fn default() -> Self {
        Self {
            client_name: String::new(),
            client_email: String::new(),
            request_type: default_request_type(),
            modifications: String::new(),
            urgency: Urgency::default(),
            budget: String::new(),
            additional_notes: String::new(),
        }
    }
}

impl ModificationForm {
    pub fn validate(&self) -> Result<(), HubError> {
        let required = [&self.client_name, &self.client_email, &self.modifications];
        if required.iter().any(|f| f.trim().is_empty()) {
            return Err(HubError::Validation(
                "Please fill in all required fields".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModificationRequest {
    pub id: Uuid,
    pub workflow_id: u32,
    pub workflow_title: String,
    #[serde(flatten)]
    pub form: ModificationForm,
    pub status: RequestStatus,
    pub submitted_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// The admin "update status" button: pending → in progress → completed →
/// pending. A rejected request re-enters the cycle as pending.
pub fn cycle_status(status: RequestStatus) -> RequestStatus {
    match status {
        RequestStatus::Pending => RequestStatus::InProgress,
        RequestStatus::InProgress => RequestStatus::Completed,
        RequestStatus::Completed | RequestStatus::Rejected => RequestStatus::Pending,
    }
}

/// Everything the admin dashboard lists.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOverview {
    pub custom: Vec<CustomRequest>,
    pub modification: Vec<ModificationRequest>,
    pub pending_count: usize,
}

// ---------------------------------------------------------------------------
// Desk
// ---------------------------------------------------------------------------

pub struct RequestDesk {
    store: LocalStore,
}

impl RequestDesk {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    pub fn submit_custom(&mut self, form: CustomRequestForm) -> Result<CustomRequest> {
        let form = form.normalize();
        form.validate()?;
        let request = CustomRequest {
            id: Uuid::new_v4(),
            form,
            status: RequestStatus::Pending,
            submitted_at: Utc::now(),
        };
        let previous = self.store.get(CUSTOM_REQUESTS_KEY).cloned();
        self.store.push(CUSTOM_REQUESTS_KEY, &request)?;
        self.persist(CUSTOM_REQUESTS_KEY, previous)?;
        info!(id = %request.id, title = %request.form.title, "Custom request submitted");
        Ok(request)
    }

    pub fn submit_modification(
        &mut self,
        catalog: &WorkflowCatalog,
        workflow_id: u32,
        form: ModificationForm,
    ) -> Result<ModificationRequest> {
        let workflow = catalog.get(workflow_id)?;
        form.validate()?;
        let request = ModificationRequest {
            id: Uuid::new_v4(),
            workflow_id,
            workflow_title: workflow.title.clone(),
            form,
            status: RequestStatus::Pending,
            submitted_at: Utc::now(),
        };
        let previous = self.store.get(MODIFICATION_REQUESTS_KEY).cloned();
        self.store.push(MODIFICATION_REQUESTS_KEY, &request)?;
        self.persist(MODIFICATION_REQUESTS_KEY, previous)?;
        info!(
            id = %request.id,
            workflow_id,
            urgency = ?request.form.urgency,
            "Modification request submitted"
        );
        Ok(request)
    }

    pub fn custom_requests(&self) -> Result<Vec<CustomRequest>> {
        self.store.list(CUSTOM_REQUESTS_KEY)
    }

    pub fn modification_requests(&self) -> Result<Vec<ModificationRequest>> {
        self.store.list(MODIFICATION_REQUESTS_KEY)
    }

    pub fn overview(&self) -> Result<RequestOverview> {
        let custom = self.custom_requests()?;
        let modification = self.modification_requests()?;
        let pending_count = custom
            .iter()
            .map(|r| r.status)
            .chain(modification.iter().map(|r| r.status))
            .filter(|s| *s == RequestStatus::Pending)
            .count();
        Ok(RequestOverview {
            custom,
            modification,
            pending_count,
        })
    }

    pub fn pending_count(&self) -> Result<usize> {
        Ok(self.overview()?.pending_count)
    }

    /// Set a request's status explicitly. `None` advances it one step
    /// along the admin cycle. Returns the new status.
    pub fn update_status(
        &mut self,
        id: Uuid,
        status: Option<RequestStatus>,
    ) -> Result<RequestStatus> {
        let mut custom = self.custom_requests()?;
        if let Some(req) = custom.iter_mut().find(|r| r.id == id) {
            req.status = status.unwrap_or_else(|| cycle_status(req.status));
            let new_status = req.status;
            self.replace(CUSTOM_REQUESTS_KEY, &custom)?;
            info!(%id, status = %new_status, "Request status changed");
            return Ok(new_status);
        }

        let mut modification = self.modification_requests()?;
        if let Some(req) = modification.iter_mut().find(|r| r.id == id) {
            req.status = status.unwrap_or_else(|| cycle_status(req.status));
            let new_status = req.status;
            self.replace(MODIFICATION_REQUESTS_KEY, &modification)?;
            info!(%id, status = %new_status, "Request status changed");
            return Ok(new_status);
        }

        Err(HubError::not_found("Request", id).into())
    }

    /// Remove a request of either kind.
    pub fn delete(&mut self, id: Uuid) -> Result<()> {
        let mut custom = self.custom_requests()?;
        let before = custom.len();
        custom.retain(|r| r.id != id);
        if custom.len() != before {
            self.replace(CUSTOM_REQUESTS_KEY, &custom)?;
            info!(%id, "Custom request deleted");
            return Ok(());
        }

        let mut modification = self.modification_requests()?;
        let before = modification.len();
        modification.retain(|r| r.id != id);
        if modification.len() != before {
            self.replace(MODIFICATION_REQUESTS_KEY, &modification)?;
            info!(%id, "Modification request deleted");
            return Ok(());
        }

        Err(HubError::not_found("Request", id).into())
    }

    /// Overwrite the list under `key` and save.
    fn replace<T: Serialize>(&mut self, key: &str, items: &[T]) -> Result<()> {
        let previous = self.store.get(key).cloned();
        self.store.set(key, &items)?;
        self.persist(key, previous)
    }

    /// Save, or restore `key` to `previous` if the write fails.
    fn persist(&mut self, key: &str, previous: Option<Value>) -> Result<()> {
        let Err(e) = self.store.save() else {
            return Ok(());
        };
        warn!(key, error = %e, "Store save failed, change rolled back");
        match previous {
            Some(value) => self.store.set(key, &value)?,
            None => {
                self.store.remove(key);
            }
        }
        Err(e)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
