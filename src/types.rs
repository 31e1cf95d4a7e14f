//! Shared types for Automation Hub.
//!
//! These types are used across the catalog, auth, requests, and dashboard
//! modules. Engine-specific types (carousel state, ROI inputs) live with
//! their engines.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Workflow complexity tier shown on catalog cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Medium,
    Complex,
}

impl Complexity {
    pub const ALL: &'static [Complexity] =
        &[Complexity::Simple, Complexity::Medium, Complexity::Complex];

    /// The lowercase identifier used in fixtures and query strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Simple => "simple",
            Complexity::Medium => "medium",
            Complexity::Complex => "complex",
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Complexity::Simple => write!(f, "Simple"),
            Complexity::Medium => write!(f, "Medium"),
            Complexity::Complex => write!(f, "Complex"),
        }
    }
}

/// Parse a complexity identifier (case-insensitive).
impl std::str::FromStr for Complexity {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simple" | "easy" => Ok(Complexity::Simple),
            "medium" | "intermediate" => Ok(Complexity::Medium),
            "complex" | "advanced" => Ok(Complexity::Complex),
            other => Err(HubError::Validation(format!("Unknown complexity: {other}"))),
        }
    }
}

/// Who a session belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// Lifecycle of a custom or modification request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    InProgress,
    Completed,
    Rejected,
}

impl RequestStatus {
    /// Snake-case wire identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::InProgress => "in_progress",
            RequestStatus::Completed => "completed",
            RequestStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_status(self.as_str()))
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "pending" => Ok(RequestStatus::Pending),
            "in_progress" => Ok(RequestStatus::InProgress),
            "completed" => Ok(RequestStatus::Completed),
            "rejected" => Ok(RequestStatus::Rejected),
            other => Err(HubError::Validation(format!("Unknown request status: {other}"))),
        }
    }
}

/// Title-case a snake_case status: `"in_progress"` → `"In Progress"`.
pub fn format_status(status: &str) -> String {
    status
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for Automation Hub.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    #[error("Carousel needs at least one item")]
    EmptyCarousel,

    #[error("Visible count must be between 1 and 3, got {0}")]
    InvalidVisibleCount(usize),

    #[error("Slide {slide} out of range (carousel has {len} slides)")]
    SlideOutOfRange { slide: usize, len: usize },

    #[error("{0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("{0} is no longer running")]
    Stopped(&'static str),
}

impl HubError {
    pub fn not_found(entity: &'static str, id: impl fmt::Display) -> Self {
        HubError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complexity_display() {
        assert_eq!(format!("{}", Complexity::Simple), "Simple");
        assert_eq!(format!("{}", Complexity::Complex), "Complex");
    }

    #[test]
    fn test_complexity_from_str() {
        assert_eq!("MEDIUM".parse::<Complexity>().unwrap(), Complexity::Medium);
        assert_eq!("easy".parse::<Complexity>().unwrap(), Complexity::Simple);
        assert!("nonsense".parse::<Complexity>().is_err());
    }

    #[test]
    fn test_complexity_serializes_lowercase() {
        let json = serde_json::to_string(&Complexity::Complex).unwrap();
        assert_eq!(json, "\"complex\"");
    }

    #[test]
    fn test_request_status_wire_format() {
        let json = serde_json::to_string(&RequestStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        let parsed: RequestStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(parsed, RequestStatus::Completed);
    }

    #[test]
    fn test_request_status_from_str_variants() {
        assert_eq!("in progress".parse::<RequestStatus>().unwrap(), RequestStatus::InProgress);
        assert_eq!("In-Progress".parse::<RequestStatus>().unwrap(), RequestStatus::InProgress);
        assert!("shipped".parse::<RequestStatus>().is_err());
    }

    #[test]
    fn test_format_status() {
        assert_eq!(format_status("in_progress"), "In Progress");
        assert_eq!(format_status("pending"), "Pending");
        assert_eq!(format_status("in_development"), "In Development");
        assert_eq!(format_status(""), "");
    }

    #[test]
    fn test_request_status_display() {
        assert_eq!(RequestStatus::InProgress.to_string(), "In Progress");
    }

    #[test]
    fn test_error_messages() {
        let e = HubError::SlideOutOfRange { slide: 7, len: 4 };
        assert_eq!(e.to_string(), "Slide 7 out of range (carousel has 4 slides)");
        let e = HubError::not_found("Workflow", 42);
        assert_eq!(e.to_string(), "Workflow not found: 42");
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Admin.to_string(), "admin");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
    }
}
