//! ROI calculator for the "how much will automation save me" panel.

pub mod calculator;
pub mod input;

pub use calculator::{calculate, RoiCalculator, RoiField, RoiInputs, RoiResults, RoiSummary};
