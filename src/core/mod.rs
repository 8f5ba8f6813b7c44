mod aggregate;
mod engine;
mod error;
mod estimator;
mod overlay;
mod rng;
mod types;

pub use aggregate::{PeriodAccumulator, Quantiles, downsample_days, percentile, quantiles};
pub use engine::{
    PROGRESS_EVERY, RETAINED_PATHS, run_drift_projection, run_goal_target, run_retirement,
};
pub use error::SimulationError;
pub use estimator::{DriftEstimate, estimate_drift};
pub use overlay::CashflowOverlay;
pub use rng::{
    BoxMuller, CentralLimit, NormalSource, Sampler, SamplerKind, SeededRng, UniformSource,
    entropy_seed,
};
pub use types::{
    DriftProjectionParams, EventKind, EventMarker, GoalTargetParams, GoalTargetResult,
    HistoryPoint, LifeEvent, MarketScenario, PathPoint, PercentileBand, ProjectionBand,
    RetirementParams, RetirementResult, RiskProfile, RunOptions, SimulatedPath, SimulationOutput,
    SimulationRequest,
};

impl SimulationRequest {
    /// Sampler used when the request does not name one.
    pub fn default_sampler(&self) -> SamplerKind {
        match self {
            Self::GoalTarget(_) => SamplerKind::CentralLimit,
            Self::Retirement(_) | Self::DriftProjection(_) => SamplerKind::BoxMuller,
        }
    }
}

/// Runs one request synchronously with a sampler built from its options.
pub fn run_simulation(
    request: &SimulationRequest,
    progress: impl FnMut(u8),
) -> Result<SimulationOutput, SimulationError> {
    let options = request.options();
    let kind = options.sampler.unwrap_or_else(|| request.default_sampler());
    let seed = options.seed.unwrap_or_else(entropy_seed);
    let mut normal = Sampler::new(kind, seed);

    match request {
        SimulationRequest::Retirement(params) => {
            run_retirement(params, &mut normal, progress).map(SimulationOutput::Retirement)
        }
        SimulationRequest::GoalTarget(params) => {
            run_goal_target(params, &mut normal, progress).map(SimulationOutput::GoalTarget)
        }
        SimulationRequest::DriftProjection(params) => {
            run_drift_projection(params, &mut normal, progress)
                .map(SimulationOutput::DriftProjection)
        }
    }
}
