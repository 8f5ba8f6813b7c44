use chrono::Days;
use tracing::debug;

use super::aggregate::{PeriodAccumulator, downsample_days, percentile};
use super::error::SimulationError;
use super::estimator::{DAYS_PER_YEAR, DriftEstimate, estimate_drift};
use super::overlay::CashflowOverlay;
use super::rng::NormalSource;
use super::types::{
    DriftProjectionParams, GoalTargetParams, GoalTargetResult, PathPoint, PercentileBand,
    ProjectionBand, RetirementParams, RetirementResult, SimulatedPath,
};

/// Full paths handed back to the caller for charting.
pub const RETAINED_PATHS: usize = 50;
/// Progress is reported after every this many simulations, and after the last one.
pub const PROGRESS_EVERY: u32 = 50;
/// Yearly growth of pre-retirement contributions (rising income).
const CONTRIBUTION_GROWTH: f64 = 0.05;

struct ProgressTicker<P> {
    total: u32,
    last: Option<u8>,
    sink: P,
}

impl<P: FnMut(u8)> ProgressTicker<P> {
    fn new(total: u32, sink: P) -> Self {
        Self {
            total,
            last: None,
            sink,
        }
    }

    fn completed(&mut self, done: u32) {
        if done % PROGRESS_EVERY != 0 && done != self.total {
            return;
        }
        let pct = ((u64::from(done) * 100) / u64::from(self.total.max(1))).min(100) as u8;
        if self.last.is_some_and(|last| pct <= last) {
            return;
        }
        self.last = Some(pct);
        (self.sink)(pct);
    }
}

fn require_simulations(n: u32) -> Result<(), SimulationError> {
    if n == 0 {
        return Err(SimulationError::invalid("numSimulations must be > 0"));
    }
    Ok(())
}

pub fn run_retirement<N, P>(
    params: &RetirementParams,
    normal: &mut N,
    progress: P,
) -> Result<RetirementResult, SimulationError>
where
    N: NormalSource + ?Sized,
    P: FnMut(u8),
{
    require_simulations(params.num_simulations)?;

    let inflation = params.inflation / 100.0;
    let years_to_retirement = params.retirement_age.saturating_sub(params.current_age);
    let first_year_expenses =
        params.monthly_expenses * 12.0 * (1.0 + inflation).powi(years_to_retirement as i32);

    let total = params.num_simulations;
    let mut ticker = ProgressTicker::new(total, progress);
    let mut retained = Vec::with_capacity(RETAINED_PATHS.min(total as usize));
    let mut finals = Vec::with_capacity(total as usize);
    let mut survivors = 0_u32;

    for sim in 0..total {
        let path = simulate_retirement_path(params, first_year_expenses, normal);
        if !path.ruined {
            survivors += 1;
        }
        finals.push(path.points.last().map(|p| p.wealth).unwrap_or(0.0));
        if retained.len() < RETAINED_PATHS {
            retained.push(path);
        }
        ticker.completed(sim + 1);
    }

    Ok(RetirementResult {
        simulations: retained,
        success_rate: f64::from(survivors) / f64::from(total) * 100.0,
        median_final_wealth: percentile(&mut finals, 0.5),
    })
}

fn simulate_retirement_path<N: NormalSource + ?Sized>(
    params: &RetirementParams,
    first_year_expenses: f64,
    normal: &mut N,
) -> SimulatedPath {
    let mean = params.expected_return / 100.0;
    let vol = params.volatility / 100.0;
    let inflation = params.inflation / 100.0;

    let mut wealth = params.current_corpus.max(0.0);
    let mut contribution = params.monthly_contribution * 12.0;
    let mut expenses = first_year_expenses;
    let mut ruined = false;

    let mut points = Vec::with_capacity(params.forecast_years as usize + 1);
    points.push(PathPoint {
        age: params.current_age,
        wealth,
    });

    for year in 1..=params.forecast_years {
        let age = params.current_age + year;
        let annual_return = mean + vol * normal.next_normal();
        wealth *= 1.0 + annual_return;

        if age <= params.retirement_age {
            wealth += contribution;
            contribution *= 1.0 + CONTRIBUTION_GROWTH;
        } else {
            wealth -= expenses;
            expenses *= 1.0 + inflation;
        }

        if wealth < 0.0 {
            wealth = 0.0;
            ruined = true;
        }
        points.push(PathPoint { age, wealth });
    }

    SimulatedPath { points, ruined }
}

pub fn run_goal_target<N, P>(
    params: &GoalTargetParams,
    normal: &mut N,
    progress: P,
) -> Result<GoalTargetResult, SimulationError>
where
    N: NormalSource + ?Sized,
    P: FnMut(u8),
{
    require_simulations(params.num_simulations)?;
    if params.horizon_years == 0 {
        return Err(SimulationError::invalid("horizonYears must be > 0"));
    }

    let (profile_mean, profile_sd) = params.risk_profile.annual_moments();
    let (mean_shift, sd_shift) = params.scenario.adjustment();
    let annual_mean = (profile_mean + mean_shift) / 100.0;
    let annual_sd = (profile_sd + sd_shift).max(0.0) / 100.0;
    let monthly_mean = annual_mean / 12.0;
    let monthly_sd = annual_sd / 12.0_f64.sqrt();
    let inflation = params.inflation_rate / 100.0;

    let years = params.horizon_years;
    let total = params.num_simulations;
    let mut ticker = ProgressTicker::new(total, progress);
    let mut acc = PeriodAccumulator::new(years as usize, total as usize);
    let mut hits = 0_u32;

    for sim in 0..total {
        let mut wealth = params.current_wealth.max(0.0);
        let mut final_value = wealth;

        for month in 1..=years * 12 {
            let monthly_return = monthly_mean + monthly_sd * normal.next_normal();
            wealth = (wealth * (1.0 + monthly_return) + params.monthly_contribution).max(0.0);

            if month % 12 == 0 {
                let year = month / 12;
                let value = if params.adjust_for_inflation {
                    wealth / (1.0 + inflation).powi(year as i32)
                } else {
                    wealth
                };
                acc.push(year as usize - 1, value);
                final_value = value;
            }
        }

        if final_value >= params.target_amount {
            hits += 1;
        }
        ticker.completed(sim + 1);
    }

    let chart_data: Vec<PercentileBand> = acc
        .into_quantiles()
        .into_iter()
        .enumerate()
        .map(|(idx, q)| PercentileBand {
            year: idx as u32 + 1,
            p10: q.p10,
            p50: q.p50,
            p90: q.p90,
            target: params.target_amount,
        })
        .collect();
    let p50_final = chart_data.last().map(|b| b.p50).unwrap_or(0.0);

    Ok(GoalTargetResult {
        chart_data,
        success_probability: f64::from(hits) / f64::from(total) * 100.0,
        p50_final,
    })
}

pub fn run_drift_projection<N, P>(
    params: &DriftProjectionParams,
    normal: &mut N,
    progress: P,
) -> Result<Vec<ProjectionBand>, SimulationError>
where
    N: NormalSource + ?Sized,
    P: FnMut(u8),
{
    require_simulations(params.num_simulations)?;
    if params.step_days == 0 {
        return Err(SimulationError::invalid("stepDays must be > 0"));
    }

    let (start, start_wealth) = match params.history.last() {
        Some(last) => (last.date, last.value.max(0.0)),
        None => match params.start_date {
            Some(date) => (date, 0.0),
            None => {
                return Err(SimulationError::invalid(
                    "history is empty and no startDate was given",
                ));
            }
        },
    };

    let values: Vec<f64> = params.history.iter().map(|p| p.value).collect();
    let drift = estimate_drift(&values);
    let overlay = CashflowOverlay::build(start, &params.life_events);
    debug!(
        %start,
        from_history = drift.from_history,
        daily_mean = drift.mean,
        daily_std_dev = drift.std_dev,
        has_cashflows = !overlay.is_empty(),
        "drift projection inputs"
    );

    let horizon_days = (f64::from(params.forecast_years) * DAYS_PER_YEAR) as u32;
    let sample_days = downsample_days(horizon_days, params.step_days);
    let last_day = sample_days.last().copied().unwrap_or(0);

    let total = params.num_simulations;
    let mut ticker = ProgressTicker::new(total, progress);
    let mut acc = PeriodAccumulator::new(sample_days.len(), total as usize);

    for sim in 0..total {
        let path = project_daily_path(start_wealth, drift, &overlay, last_day, normal);
        for (bucket, day) in sample_days.iter().enumerate() {
            acc.push(bucket, path[*day as usize - 1]);
        }
        ticker.completed(sim + 1);
    }

    let mut bands = Vec::with_capacity(sample_days.len());
    let mut prev_day = 0;
    for (q, day) in acc.into_quantiles().into_iter().zip(sample_days) {
        let date = start
            .checked_add_days(Days::new(u64::from(day)))
            .ok_or_else(|| SimulationError::invalid("projection runs past the calendar range"))?;
        bands.push(ProjectionBand {
            date,
            bear: q.p10,
            base: q.p50,
            bull: q.p90,
            event_marker: overlay.marker_between(prev_day, day),
        });
        prev_day = day;
    }

    Ok(bands)
}

/// Wealth at the end of days `1..=days`; index `d - 1` holds day `d`.
fn project_daily_path<N: NormalSource + ?Sized>(
    start_wealth: f64,
    drift: DriftEstimate,
    overlay: &CashflowOverlay,
    days: u32,
    normal: &mut N,
) -> Vec<f64> {
    let mut wealth = start_wealth;
    let mut path = Vec::with_capacity(days as usize);
    for day in 1..=days {
        let growth = (drift.mean + drift.std_dev * normal.next_normal()).exp();
        wealth = (wealth * growth + overlay.amount_on(day)).max(0.0);
        path.push(wealth);
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::core::rng::{Sampler, SamplerKind};
    use crate::core::types::{
        EventKind, EventMarker, HistoryPoint, LifeEvent, MarketScenario, RiskProfile, RunOptions,
    };
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sampler(seed: u64) -> Sampler {
        Sampler::new(SamplerKind::BoxMuller, seed)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn sample_retirement() -> RetirementParams {
        RetirementParams {
            current_age: 30,
            retirement_age: 60,
            current_corpus: 1_000_000.0,
            monthly_contribution: 20_000.0,
            monthly_expenses: 50_000.0,
            expected_return: 10.0,
            inflation: 6.0,
            volatility: 15.0,
            num_simulations: 200,
            forecast_years: 40,
            run: RunOptions::default(),
        }
    }

    fn sample_goal() -> GoalTargetParams {
        GoalTargetParams {
            current_wealth: 500_000.0,
            monthly_contribution: 10_000.0,
            horizon_years: 10,
            inflation_rate: 6.0,
            adjust_for_inflation: false,
            risk_profile: RiskProfile::Balanced,
            scenario: MarketScenario::Base,
            target_amount: 3_000_000.0,
            num_simulations: 300,
            run: RunOptions::default(),
        }
    }

    fn sample_history() -> Vec<HistoryPoint> {
        let start = date(2024, 1, 1);
        [100_000.0, 101_000.0, 100_500.0, 102_000.0, 103_500.0, 103_000.0]
            .into_iter()
            .enumerate()
            .map(|(i, value)| HistoryPoint {
                date: start + Days::new(i as u64),
                value,
            })
            .collect()
    }

    fn sample_drift() -> DriftProjectionParams {
        DriftProjectionParams {
            history: sample_history(),
            life_events: Vec::new(),
            forecast_years: 2,
            num_simulations: 100,
            step_days: 30,
            start_date: None,
            run: RunOptions::default(),
        }
    }

    #[test]
    fn retirement_example_scenario_shapes_output() {
        let params = sample_retirement();
        let result = run_retirement(&params, &mut sampler(1), |_| {}).expect("runs");

        assert!(result.success_rate.is_finite());
        assert!((0.0..=100.0).contains(&result.success_rate));
        assert!(result.simulations.len() <= RETAINED_PATHS);
        assert_eq!(result.simulations.len(), RETAINED_PATHS);
        for path in &result.simulations {
            assert_eq!(path.points.len(), params.forecast_years as usize + 1);
            assert_eq!(path.points[0].age, 30);
            assert_eq!(path.points[40].age, 70);
            assert!(path.points.iter().all(|p| p.wealth >= 0.0));
        }
    }

    #[test]
    fn retirement_retains_every_path_when_fewer_than_cap() {
        let mut params = sample_retirement();
        params.num_simulations = 7;
        let result = run_retirement(&params, &mut sampler(2), |_| {}).expect("runs");
        assert_eq!(result.simulations.len(), 7);
    }

    #[test]
    fn retirement_without_savings_always_ruins() {
        let mut params = sample_retirement();
        params.current_corpus = 0.0;
        params.monthly_contribution = 0.0;
        params.monthly_expenses = 1.0;
        let result = run_retirement(&params, &mut sampler(3), |_| {}).expect("runs");

        assert_eq!(result.success_rate, 0.0);
        assert_eq!(result.median_final_wealth, 0.0);
        assert!(result.simulations.iter().all(|p| p.ruined));
    }

    #[test]
    fn retirement_zero_volatility_follows_closed_form() {
        let mut params = sample_retirement();
        params.current_age = 30;
        params.retirement_age = 31;
        params.forecast_years = 2;
        params.current_corpus = 1_000.0;
        params.monthly_contribution = 10.0;
        params.monthly_expenses = 5.0;
        params.expected_return = 10.0;
        params.volatility = 0.0;
        params.inflation = 6.0;
        params.num_simulations = 1;

        let result = run_retirement(&params, &mut sampler(4), |_| {}).expect("runs");
        let points = &result.simulations[0].points;
        assert_approx(points[0].wealth, 1_000.0);
        // 1000 * 1.1 + 120
        assert_approx(points[1].wealth, 1_220.0);
        // 1220 * 1.1 - 60 * 1.06
        assert_approx(points[2].wealth, 1_278.4);
        assert_approx(result.success_rate, 100.0);
    }

    #[test]
    fn retirement_contributions_grow_five_percent_a_year() {
        let mut params = sample_retirement();
        params.retirement_age = 90;
        params.forecast_years = 2;
        params.current_corpus = 0.0;
        params.monthly_contribution = 100.0;
        params.expected_return = 0.0;
        params.volatility = 0.0;
        params.num_simulations = 1;

        let result = run_retirement(&params, &mut sampler(5), |_| {}).expect("runs");
        let points = &result.simulations[0].points;
        assert_approx(points[1].wealth, 1_200.0);
        assert_approx(points[2].wealth, 2_460.0);
    }

    #[test]
    fn retirement_ruined_path_stays_at_zero_after_floor() {
        let mut params = sample_retirement();
        params.current_age = 60;
        params.retirement_age = 60;
        params.current_corpus = 100.0;
        params.monthly_expenses = 100.0;
        params.expected_return = 0.0;
        params.volatility = 0.0;
        params.forecast_years = 5;
        params.num_simulations = 1;

        let result = run_retirement(&params, &mut sampler(6), |_| {}).expect("runs");
        let path = &result.simulations[0];
        assert!(path.ruined);
        assert!(path.points[1..].iter().all(|p| p.wealth == 0.0));
    }

    #[test]
    fn retirement_rejects_zero_simulations() {
        let mut params = sample_retirement();
        params.num_simulations = 0;
        let err = run_retirement(&params, &mut sampler(1), |_| {}).expect_err("invalid");
        assert!(matches!(err, SimulationError::InvalidInput(_)));
    }

    #[test]
    fn goal_target_reports_one_band_per_year() {
        let params = sample_goal();
        let mut cl = Sampler::new(SamplerKind::CentralLimit, 9);
        let result = run_goal_target(&params, &mut cl, |_| {}).expect("runs");

        assert_eq!(result.chart_data.len(), 10);
        for (idx, band) in result.chart_data.iter().enumerate() {
            assert_eq!(band.year, idx as u32 + 1);
            assert!(band.p10 <= band.p50 && band.p50 <= band.p90);
            assert!(band.p10 >= 0.0);
            assert_eq!(band.target, params.target_amount);
        }
        assert_eq!(result.p50_final, result.chart_data[9].p50);
        assert!((0.0..=100.0).contains(&result.success_probability));
    }

    // Starting exactly at the target can still end below it after a bad year,
    // so the funded case needs a surplus the bounded sampler cannot erase.
    #[test]
    fn goal_target_already_funded_succeeds_in_every_scenario() {
        for profile in [
            RiskProfile::Conservative,
            RiskProfile::Balanced,
            RiskProfile::Aggressive,
        ] {
            for scenario in [MarketScenario::Bear, MarketScenario::Base, MarketScenario::Bull] {
                let mut params = sample_goal();
                params.monthly_contribution = 0.0;
                params.horizon_years = 1;
                params.risk_profile = profile;
                params.scenario = scenario;
                params.target_amount = 10_000.0;
                params.current_wealth = 1_000_000.0;

                let mut cl = Sampler::new(SamplerKind::CentralLimit, 17);
                let result = run_goal_target(&params, &mut cl, |_| {}).expect("runs");
                assert_eq!(
                    result.success_probability, 100.0,
                    "{profile:?}/{scenario:?}"
                );
            }
        }
    }

    #[test]
    fn goal_target_inflation_adjustment_deflates_each_year() {
        let nominal = sample_goal();
        let mut real = sample_goal();
        real.adjust_for_inflation = true;

        let a = run_goal_target(&nominal, &mut sampler(21), |_| {}).expect("runs");
        let b = run_goal_target(&real, &mut sampler(21), |_| {}).expect("runs");

        for (n, r) in a.chart_data.iter().zip(&b.chart_data) {
            let deflator = 1.06_f64.powi(n.year as i32);
            assert!((r.p50 - n.p50 / deflator).abs() <= 1e-6 * n.p50.max(1.0));
        }
        assert!(b.success_probability <= a.success_probability);
    }

    #[test]
    fn goal_target_rejects_zero_horizon() {
        let mut params = sample_goal();
        params.horizon_years = 0;
        assert!(run_goal_target(&params, &mut sampler(1), |_| {}).is_err());
    }

    #[test]
    fn drift_projection_downsamples_to_horizon_over_step() {
        let params = sample_drift();
        let bands = run_drift_projection(&params, &mut sampler(31), |_| {}).expect("runs");

        assert_eq!(bands.len(), (2 * 365) / 30);
        let origin = date(2024, 1, 6);
        assert_eq!(bands[0].date, origin + Days::new(30));
        assert_eq!(bands[1].date, origin + Days::new(60));
        for band in &bands {
            assert!(band.bear <= band.base && band.base <= band.bull);
            assert!(band.bear >= 0.0);
            assert_eq!(band.event_marker, None);
        }
    }

    #[test]
    fn drift_projection_flags_event_buckets() {
        let mut params = sample_drift();
        let origin = date(2024, 1, 6);
        params.life_events = vec![
            LifeEvent {
                date: origin + Days::new(45),
                amount: 20_000.0,
                kind: EventKind::Income,
                category: Some("bonus".to_string()),
            },
            LifeEvent {
                date: origin + Days::new(90),
                amount: 5_000.0,
                kind: EventKind::Expense,
                category: None,
            },
        ];
        let bands = run_drift_projection(&params, &mut sampler(32), |_| {}).expect("runs");

        assert_eq!(bands[0].event_marker, None);
        assert_eq!(bands[1].event_marker, Some(EventMarker::Income));
        assert_eq!(bands[2].event_marker, Some(EventMarker::Expense));
        assert_eq!(bands[3].event_marker, None);
    }

    #[test]
    fn drift_projection_uses_start_date_without_history() {
        let mut params = sample_drift();
        params.history.clear();
        params.start_date = Some(date(2025, 3, 1));
        params.life_events = vec![LifeEvent {
            date: date(2025, 3, 11),
            amount: 1_000.0,
            kind: EventKind::Income,
            category: None,
        }];

        let bands = run_drift_projection(&params, &mut sampler(33), |_| {}).expect("runs");
        assert_eq!(bands[0].date, date(2025, 3, 31));
        assert!(bands[0].base > 0.0);
    }

    #[test]
    fn drift_projection_requires_an_origin() {
        let mut params = sample_drift();
        params.history.clear();
        let err = run_drift_projection(&params, &mut sampler(1), |_| {}).expect_err("no origin");
        assert!(err.to_string().contains("startDate"));
    }

    #[test]
    fn life_event_shifts_its_day_by_exactly_its_amount() {
        let start = date(2024, 1, 1);
        let drift = DriftEstimate::fallback();
        let event_day = 17_u32;
        let event = LifeEvent {
            date: start + Days::new(u64::from(event_day)),
            amount: 100_000.0,
            kind: EventKind::Income,
            category: None,
        };

        let with_event = CashflowOverlay::build(start, &[event]);
        let without_event = CashflowOverlay::build(start, &[]);

        let a = project_daily_path(50_000.0, drift, &with_event, 40, &mut sampler(77));
        let b = project_daily_path(50_000.0, drift, &without_event, 40, &mut sampler(77));

        let idx = event_day as usize - 1;
        assert_eq!(a[..idx], b[..idx]);
        assert!((a[idx] - b[idx] - 100_000.0).abs() < 1e-6);
    }

    #[test]
    fn same_seed_produces_identical_output() {
        let params = sample_retirement();
        let a = run_retirement(&params, &mut sampler(123), |_| {}).expect("runs");
        let b = run_retirement(&params, &mut sampler(123), |_| {}).expect("runs");
        assert_eq!(
            serde_json::to_string(&a).expect("json"),
            serde_json::to_string(&b).expect("json")
        );

        let params = sample_drift();
        let a = run_drift_projection(&params, &mut sampler(5), |_| {}).expect("runs");
        let b = run_drift_projection(&params, &mut sampler(5), |_| {}).expect("runs");
        assert_eq!(
            serde_json::to_string(&a).expect("json"),
            serde_json::to_string(&b).expect("json")
        );
    }

    #[test]
    fn progress_is_monotone_and_finishes_at_100() {
        let mut params = sample_retirement();
        params.num_simulations = 230;
        let mut seen = Vec::new();
        run_retirement(&params, &mut sampler(8), |p| seen.push(p)).expect("runs");

        assert_eq!(seen, vec![21, 43, 65, 86, 100]);
    }

    #[test]
    fn progress_for_tiny_runs_still_reports_completion() {
        let mut params = sample_goal();
        params.num_simulations = 3;
        let mut seen = Vec::new();
        run_goal_target(&params, &mut sampler(8), |p| seen.push(p)).expect("runs");
        assert_eq!(seen, vec![100]);
    }

    proptest! {
        #[test]
        fn retirement_wealth_never_negative(
            seed in 0u64..10_000,
            corpus in 0.0f64..2_000_000.0,
            contribution in 0.0f64..50_000.0,
            expenses in 0.0f64..200_000.0,
            ret in -5.0f64..15.0,
            vol in 0.0f64..60.0,
        ) {
            let mut params = sample_retirement();
            params.current_corpus = corpus;
            params.monthly_contribution = contribution;
            params.monthly_expenses = expenses;
            params.expected_return = ret;
            params.volatility = vol;
            params.num_simulations = 20;

            let result = run_retirement(&params, &mut sampler(seed), |_| {}).expect("runs");
            prop_assert!((0.0..=100.0).contains(&result.success_rate));
            for path in &result.simulations {
                prop_assert_eq!(path.points.len(), 41);
                prop_assert!(path.points.iter().all(|p| p.wealth >= 0.0));
            }
        }

        #[test]
        fn goal_bands_ordered_and_probability_bounded(
            seed in 0u64..10_000,
            wealth in 0.0f64..5_000_000.0,
            sip in 0.0f64..100_000.0,
            years in 1u32..15,
            target in 0.0f64..20_000_000.0,
            adjust in proptest::bool::ANY,
        ) {
            let mut params = sample_goal();
            params.current_wealth = wealth;
            params.monthly_contribution = sip;
            params.horizon_years = years;
            params.target_amount = target;
            params.adjust_for_inflation = adjust;
            params.scenario = MarketScenario::Bear;
            params.risk_profile = RiskProfile::Aggressive;
            params.num_simulations = 30;

            let mut cl = Sampler::new(SamplerKind::CentralLimit, seed);
            let result = run_goal_target(&params, &mut cl, |_| {}).expect("runs");
            prop_assert_eq!(result.chart_data.len(), years as usize);
            prop_assert!((0.0..=100.0).contains(&result.success_probability));
            for band in &result.chart_data {
                prop_assert!(band.p10 >= 0.0);
                prop_assert!(band.p10 <= band.p50 && band.p50 <= band.p90);
            }
        }

        #[test]
        fn drift_bands_ordered_with_large_expenses(seed in 0u64..10_000, outflow in 0.0f64..500_000.0) {
            let mut params = sample_drift();
            params.num_simulations = 20;
            params.life_events = vec![LifeEvent {
                date: date(2024, 3, 1),
                amount: outflow,
                kind: EventKind::Expense,
                category: None,
            }];
            let bands = run_drift_projection(&params, &mut sampler(seed), |_| {}).expect("runs");
            for band in &bands {
                prop_assert!(band.bear >= 0.0);
                prop_assert!(band.bear <= band.base && band.base <= band.bull);
            }
        }
    }
}
