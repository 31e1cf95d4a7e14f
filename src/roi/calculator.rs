//! ROI derivation.
//!
//! Recomputes the savings metrics from the five form inputs. Division by
//! zero is deliberately left unguarded: a zero weekly saving gives an
//! infinite (or NaN) payback period and a zero total cost gives an
//! infinite (or NaN) ROI. Formatting those is the renderer's job.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

use super::input::parse_lenient;
use crate::types::HubError;

/// Average number of weeks in a month.
pub const WEEKS_PER_MONTH: f64 = 4.33;
pub const MONTHS_PER_YEAR: f64 = 12.0;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoiInputs {
    /// Hours of manual work per person per week.
    pub hours_per_week: f64,
    pub hourly_rate: f64,
    pub number_of_employees: f64,
    pub workflow_cost: f64,
    /// Setup effort in hours, billed at `hourly_rate`.
    pub setup_time: f64,
}

impl Default for RoiInputs {
    fn default() -> Self {
        Self {
            hours_per_week: 10.0,
            hourly_rate: 25.0,
            number_of_employees: 5.0,
            workflow_cost: 49.0,
            setup_time: 2.0,
        }
    }
}

/// One of the five calculator fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoiField {
    HoursPerWeek,
    HourlyRate,
    NumberOfEmployees,
    WorkflowCost,
    SetupTime,
}

impl RoiField {
    pub const ALL: &'static [RoiField] = &[
        RoiField::HoursPerWeek,
        RoiField::HourlyRate,
        RoiField::NumberOfEmployees,
        RoiField::WorkflowCost,
        RoiField::SetupTime,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RoiField::HoursPerWeek => "hoursPerWeek",
            RoiField::HourlyRate => "hourlyRate",
            RoiField::NumberOfEmployees => "numberOfEmployees",
            RoiField::WorkflowCost => "workflowCost",
            RoiField::SetupTime => "setupTime",
        }
    }
}

impl FromStr for RoiField {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoiField::ALL
            .iter()
            .copied()
            .find(|f| f.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| HubError::Validation(format!("Unknown ROI field: {s}")))
    }
}

impl RoiInputs {
    pub fn get(&self, field: RoiField) -> f64 {
        match field {
            RoiField::HoursPerWeek => self.hours_per_week,
            RoiField::HourlyRate => self.hourly_rate,
            RoiField::NumberOfEmployees => self.number_of_employees,
            RoiField::WorkflowCost => self.workflow_cost,
            RoiField::SetupTime => self.setup_time,
        }
    }

    pub fn set(&mut self, field: RoiField, value: f64) {
        let slot = match field {
            RoiField::HoursPerWeek => &mut self.hours_per_week,
            RoiField::HourlyRate => &mut self.hourly_rate,
            RoiField::NumberOfEmployees => &mut self.number_of_employees,
            RoiField::WorkflowCost => &mut self.workflow_cost,
            RoiField::SetupTime => &mut self.setup_time,
        };
        *slot = value;
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoiResults {
    /// Team hours saved per week.
    pub weekly_time_saved: f64,
    pub weekly_savings: f64,
    pub monthly_savings: f64,
    pub yearly_savings: f64,
    pub total_cost: f64,
    /// Weeks until the savings cover the total cost.
    pub payback_period: f64,
    /// First-year return, in percent.
    pub roi: f64,
}

/// Derive every metric from `inputs`. O(1), no caching.
pub fn calculate(inputs: &RoiInputs) -> RoiResults {
    let weekly_time_saved = inputs.hours_per_week * inputs.number_of_employees;
    let weekly_savings = weekly_time_saved * inputs.hourly_rate;
    let monthly_savings = weekly_savings * WEEKS_PER_MONTH;
    let yearly_savings = monthly_savings * MONTHS_PER_YEAR;

    let total_cost = inputs.workflow_cost + inputs.setup_time * inputs.hourly_rate;
    let payback_period = total_cost / weekly_savings;
    let roi = (yearly_savings - total_cost) / total_cost * 100.0;

    RoiResults {
        weekly_time_saved,
        weekly_savings,
        monthly_savings,
        yearly_savings,
        total_cost,
        payback_period,
        roi,
    }
}

// ---------------------------------------------------------------------------
// Calculator (form state)
// ---------------------------------------------------------------------------

/// Form state: current inputs plus results that are always in sync.
#[derive(Debug, Clone)]
pub struct RoiCalculator {
    inputs: RoiInputs,
    results: RoiResults,
}

impl Default for RoiCalculator {
    fn default() -> Self {
        Self::new(RoiInputs::default())
    }
}

impl RoiCalculator {
    pub fn new(inputs: RoiInputs) -> Self {
        let results = calculate(&inputs);
        Self { inputs, results }
    }

    pub fn inputs(&self) -> &RoiInputs {
        &self.inputs
    }

    pub fn results(&self) -> &RoiResults {
        &self.results
    }

    /// Apply raw text typed into a field and recompute everything.
    pub fn set_field(&mut self, field: RoiField, raw: &str) -> &RoiResults {
        let value = parse_lenient(raw);
        self.inputs.set(field, value);
        self.results = calculate(&self.inputs);
        debug!(
            field = field.name(),
            value,
            yearly_savings = self.results.yearly_savings,
            "ROI recomputed"
        );
        &self.results
    }
}

// ---------------------------------------------------------------------------
// Display formatting
// ---------------------------------------------------------------------------

/// Human-readable strings for the results panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoiSummary {
    pub weekly_time_saved: String,
    pub monthly_savings: String,
    pub yearly_savings: String,
    pub payback_period: String,
    pub roi: String,
}

impl RoiSummary {
    pub fn from_results(results: &RoiResults) -> Self {
        Self {
            weekly_time_saved: format!("{} hours", to_fixed(results.weekly_time_saved, 1)),
            monthly_savings: format!("${}", to_fixed(results.monthly_savings, 0)),
            yearly_savings: format!("${}", to_fixed(results.yearly_savings, 0)),
            payback_period: format!("{} weeks", to_fixed(results.payback_period, 1)),
            roi: format!("{}%", to_fixed(results.roi, 0)),
        }
    }
}

/// Fixed-point formatting that rounds halves away from zero (so 5412.5
/// shows as 5413). Non-finite values render as `∞`, `-∞` or `—`.
pub fn to_fixed(value: f64, digits: u32) -> String {
    if value.is_nan() {
        return "—".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "∞".into() } else { "-∞".into() };
    }
    let scale = 10f64.powi(digits as i32);
    let rounded = (value * scale).round() / scale;
    // Avoid printing "-0".
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{:.*}", digits as usize, rounded)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
