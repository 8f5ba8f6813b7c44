use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::rng::SamplerKind;

/// Options shared by every request kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampler: Option<SamplerKind>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", content = "params", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SimulationRequest {
    Retirement(RetirementParams),
    GoalTarget(GoalTargetParams),
    DriftProjection(DriftProjectionParams),
}

impl SimulationRequest {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Retirement(_) => "RETIREMENT",
            Self::GoalTarget(_) => "GOAL_TARGET",
            Self::DriftProjection(_) => "DRIFT_PROJECTION",
        }
    }

    pub fn options(&self) -> RunOptions {
        match self {
            Self::Retirement(p) => p.run,
            Self::GoalTarget(p) => p.run,
            Self::DriftProjection(p) => p.run,
        }
    }

    pub fn options_mut(&mut self) -> &mut RunOptions {
        match self {
            Self::Retirement(p) => &mut p.run,
            Self::GoalTarget(p) => &mut p.run,
            Self::DriftProjection(p) => &mut p.run,
        }
    }

    pub fn simulations(&self) -> u32 {
        match self {
            Self::Retirement(p) => p.num_simulations,
            Self::GoalTarget(p) => p.num_simulations,
            Self::DriftProjection(p) => p.num_simulations,
        }
    }
}

fn default_retirement_simulations() -> u32 {
    500
}

fn default_retirement_years() -> u32 {
    40
}

fn default_goal_simulations() -> u32 {
    1000
}

fn default_drift_simulations() -> u32 {
    500
}

fn default_drift_years() -> u32 {
    10
}

fn default_step_days() -> u32 {
    30
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementParams {
    pub current_age: u32,
    pub retirement_age: u32,
    pub current_corpus: f64,
    pub monthly_contribution: f64,
    pub monthly_expenses: f64,
    /// Annual percent, e.g. 10 for 10%.
    pub expected_return: f64,
    pub inflation: f64,
    pub volatility: f64,
    #[serde(default = "default_retirement_simulations")]
    pub num_simulations: u32,
    #[serde(default = "default_retirement_years")]
    pub forecast_years: u32,
    #[serde(flatten)]
    pub run: RunOptions,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskProfile {
    Conservative,
    Balanced,
    Aggressive,
}

impl RiskProfile {
    /// Annual (mean %, std dev %).
    pub fn annual_moments(self) -> (f64, f64) {
        match self {
            Self::Conservative => (7.0, 6.0),
            Self::Balanced => (10.0, 12.0),
            Self::Aggressive => (13.0, 18.0),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketScenario {
    Bear,
    #[default]
    Base,
    Bull,
}

impl MarketScenario {
    /// Additive (mean pp, std dev pp) shift applied to the risk profile.
    pub fn adjustment(self) -> (f64, f64) {
        match self {
            Self::Bear => (-4.0, 5.0),
            Self::Base => (0.0, 0.0),
            Self::Bull => (4.0, -2.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalTargetParams {
    pub current_wealth: f64,
    #[serde(alias = "monthlySip")]
    pub monthly_contribution: f64,
    pub horizon_years: u32,
    pub inflation_rate: f64,
    #[serde(default)]
    pub adjust_for_inflation: bool,
    pub risk_profile: RiskProfile,
    #[serde(default)]
    pub scenario: MarketScenario,
    pub target_amount: f64,
    #[serde(default = "default_goal_simulations")]
    pub num_simulations: u32,
    #[serde(flatten)]
    pub run: RunOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct HistoryPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Income,
    Expense,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LifeEvent {
    pub date: NaiveDate,
    pub amount: f64,
    pub kind: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl LifeEvent {
    /// Expenses always leave the portfolio whatever sign the caller used.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            EventKind::Income => self.amount,
            EventKind::Expense => -self.amount.abs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftProjectionParams {
    #[serde(default)]
    pub history: Vec<HistoryPoint>,
    #[serde(default)]
    pub life_events: Vec<LifeEvent>,
    #[serde(default = "default_drift_years")]
    pub forecast_years: u32,
    #[serde(default = "default_drift_simulations")]
    pub num_simulations: u32,
    #[serde(default = "default_step_days")]
    pub step_days: u32,
    /// Projection origin when `history` is empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub run: RunOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PathPoint {
    pub age: u32,
    pub wealth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatedPath {
    pub points: Vec<PathPoint>,
    pub ruined: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementResult {
    pub simulations: Vec<SimulatedPath>,
    pub success_rate: f64,
    pub median_final_wealth: f64,
}

/// Year-end wealth percentiles for the goal chart.
///
/// With `adjustForInflation` the percentiles are in today's money, so the
/// unchanged `target` is the real target; otherwise both are nominal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentileBand {
    pub year: u32,
    pub p10: f64,
    pub p50: f64,
    pub p90: f64,
    pub target: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalTargetResult {
    pub chart_data: Vec<PercentileBand>,
    pub success_probability: f64,
    pub p50_final: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventMarker {
    Income,
    Expense,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionBand {
    pub date: NaiveDate,
    pub bear: f64,
    pub base: f64,
    pub bull: f64,
    pub event_marker: Option<EventMarker>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SimulationOutput {
    Retirement(RetirementResult),
    GoalTarget(GoalTargetResult),
    DriftProjection(Vec<ProjectionBand>),
}
