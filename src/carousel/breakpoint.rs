//! Viewport breakpoints for the carousel.

use serde::Serialize;

/// Widths below this are treated as phones.
pub const MEDIUM_MIN_WIDTH: u32 = 768;
/// Widths at or above this are treated as desktops.
pub const WIDE_MIN_WIDTH: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    Narrow,
    Medium,
    Wide,
}

impl Breakpoint {
    pub fn from_width(width_px: u32) -> Self {
        if width_px < MEDIUM_MIN_WIDTH {
            Breakpoint::Narrow
        } else if width_px < WIDE_MIN_WIDTH {
            Breakpoint::Medium
        } else {
            Breakpoint::Wide
        }
    }

    /// Number of cards shown side by side.
    pub fn visible_count(&self) -> usize {
        match self {
            Breakpoint::Narrow => 1,
            Breakpoint::Medium => 2,
            Breakpoint::Wide => 3,
        }
    }
}
