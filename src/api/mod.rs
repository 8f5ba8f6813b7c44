use axum::{
    Router,
    extract::Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::io::Read;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::core::{
    DriftProjectionParams, GoalTargetParams, RetirementParams, SamplerKind, SimulationRequest,
};
use crate::worker::{ComputeUnit, WorkerMessage};

const MAX_SIMULATIONS: u32 = 100_000;
const MAX_YEARS: u32 = 100;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliSampler {
    BoxMuller,
    CentralLimit,
}

impl From<CliSampler> for SamplerKind {
    fn from(value: CliSampler) -> Self {
        match value {
            CliSampler::BoxMuller => SamplerKind::BoxMuller,
            CliSampler::CentralLimit => SamplerKind::CentralLimit,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "wealthsim",
    about = "Monte Carlo wealth projections (retirement drawdown, goal targets, drift-based net worth)"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the simulation API over HTTP
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Run one request and stream its messages as JSON lines
    Run {
        #[arg(long, default_value = "-", help = "Request JSON file, or - for stdin")]
        input: String,
        #[arg(long, help = "Seed override for reproducible output")]
        seed: Option<u64>,
        #[arg(long, value_enum, help = "Normal sampler override")]
        sampler: Option<CliSampler>,
    },
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub async fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Serve { port } => run_http_server(port)
            .await
            .map_err(|e| format!("Server error: {e}")),
        Command::Run {
            input,
            seed,
            sampler,
        } => {
            let raw = read_input(&input)?;
            let mut request = serde_json::from_str::<SimulationRequest>(&raw)
                .map_err(|e| format!("Invalid request JSON: {e}"))?;
            let options = request.options_mut();
            if seed.is_some() {
                options.seed = seed;
            }
            if let Some(sampler) = sampler {
                options.sampler = Some(sampler.into());
            }
            run_to_stdout(request).await
        }
    }
}

fn read_input(path: &str) -> Result<String, String> {
    if path == "-" {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .map_err(|e| format!("Failed to read stdin: {e}"))?;
        return Ok(raw);
    }
    std::fs::read_to_string(path).map_err(|e| format!("Failed to read {path}: {e}"))
}

async fn run_to_stdout(request: SimulationRequest) -> Result<(), String> {
    validate_request(&request)?;

    let unit = ComputeUnit::spawn();
    let mut ticket = unit.submit(request).map_err(|e| e.to_string())?;
    while let Some(message) = ticket.next().await {
        let line = serde_json::to_string(&message).map_err(|e| e.to_string())?;
        println!("{line}");
        if let WorkerMessage::Error { error } = message {
            return Err(error);
        }
        if message.is_terminal() {
            return Ok(());
        }
    }
    Err("compute unit stopped without a terminal message".to_string())
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/simulate", post(simulate_post_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "wealthsim HTTP API listening");

    axum::serve(listener, app).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, serde_json::json!({ "status": "ok" }))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_post_handler(Json(request): Json<SimulationRequest>) -> Response {
    simulate_handler_impl(request).await
}

async fn simulate_handler_impl(request: SimulationRequest) -> Response {
    if let Err(msg) = validate_request(&request) {
        return error_response(StatusCode::BAD_REQUEST, &msg);
    }

    // A fresh unit per HTTP request keeps concurrent callers independent.
    respond_from_unit(&ComputeUnit::spawn(), request).await
}

async fn respond_from_unit(unit: &ComputeUnit, request: SimulationRequest) -> Response {
    let mut ticket = match unit.submit(request) {
        Ok(ticket) => ticket,
        Err(e) => return error_response(StatusCode::SERVICE_UNAVAILABLE, &e.to_string()),
    };

    while let Some(message) = ticket.next().await {
        match message {
            WorkerMessage::Progress { progress } => debug!(progress, "http simulation progress"),
            WorkerMessage::Complete { .. } => return json_response(StatusCode::OK, message),
            WorkerMessage::Error { .. } => {
                return json_response(StatusCode::UNPROCESSABLE_ENTITY, message);
            }
        }
    }
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "compute unit stopped without a terminal message",
    )
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

/// Caller-side checks on user-entered parameters; the engine itself only
/// rejects inputs that would break its arithmetic.
pub fn validate_request(request: &SimulationRequest) -> Result<(), String> {
    match request {
        SimulationRequest::Retirement(p) => validate_retirement(p),
        SimulationRequest::GoalTarget(p) => validate_goal(p),
        SimulationRequest::DriftProjection(p) => validate_drift(p),
    }
}

fn require_finite(fields: &[(&str, f64)]) -> Result<(), String> {
    for (name, value) in fields {
        if !value.is_finite() {
            return Err(format!("{name} must be a finite number"));
        }
    }
    Ok(())
}

fn validate_simulations(n: u32) -> Result<(), String> {
    if n == 0 {
        return Err("numSimulations must be > 0".to_string());
    }
    if n > MAX_SIMULATIONS {
        return Err(format!("numSimulations must be <= {MAX_SIMULATIONS}"));
    }
    Ok(())
}

fn validate_retirement(p: &RetirementParams) -> Result<(), String> {
    require_finite(&[
        ("currentCorpus", p.current_corpus),
        ("monthlyContribution", p.monthly_contribution),
        ("monthlyExpenses", p.monthly_expenses),
        ("expectedReturn", p.expected_return),
        ("inflation", p.inflation),
        ("volatility", p.volatility),
    ])?;
    validate_simulations(p.num_simulations)?;

    if p.retirement_age < p.current_age {
        return Err("retirementAge must be >= currentAge".to_string());
    }
    if p.forecast_years == 0 || p.forecast_years > MAX_YEARS {
        return Err(format!("forecastYears must be between 1 and {MAX_YEARS}"));
    }
    if p.current_corpus < 0.0 {
        return Err("currentCorpus must be >= 0".to_string());
    }
    if p.monthly_contribution < 0.0 || p.monthly_expenses < 0.0 {
        return Err("monthlyContribution and monthlyExpenses must be >= 0".to_string());
    }
    if p.volatility < 0.0 {
        return Err("volatility must be >= 0".to_string());
    }
    if p.inflation <= -100.0 {
        return Err("inflation must be > -100".to_string());
    }
    Ok(())
}

fn validate_goal(p: &GoalTargetParams) -> Result<(), String> {
    require_finite(&[
        ("currentWealth", p.current_wealth),
        ("monthlyContribution", p.monthly_contribution),
        ("inflationRate", p.inflation_rate),
        ("targetAmount", p.target_amount),
    ])?;
    validate_simulations(p.num_simulations)?;

    if p.horizon_years == 0 || p.horizon_years > MAX_YEARS {
        return Err(format!("horizonYears must be between 1 and {MAX_YEARS}"));
    }
    if p.current_wealth < 0.0 || p.monthly_contribution < 0.0 {
        return Err("currentWealth and monthlyContribution must be >= 0".to_string());
    }
    if p.target_amount <= 0.0 {
        return Err("targetAmount must be > 0".to_string());
    }
    if p.inflation_rate <= -100.0 {
        return Err("inflationRate must be > -100".to_string());
    }
    Ok(())
}

fn validate_drift(p: &DriftProjectionParams) -> Result<(), String> {
    validate_simulations(p.num_simulations)?;

    if p.forecast_years == 0 || p.forecast_years > MAX_YEARS {
        return Err(format!("forecastYears must be between 1 and {MAX_YEARS}"));
    }
    if p.step_days == 0 {
        return Err("stepDays must be > 0".to_string());
    }
    if p.history.is_empty() && p.start_date.is_none() {
        return Err("history must not be empty unless startDate is given".to_string());
    }
    if p.history.windows(2).any(|w| w[1].date < w[0].date) {
        return Err("history must be in chronological order".to_string());
    }
    if p.history.iter().any(|h| !h.value.is_finite()) {
        return Err("history values must be finite numbers".to_string());
    }
    if p.life_events.iter().any(|e| !e.amount.is_finite()) {
        return Err("lifeEvents amounts must be finite numbers".to_string());
    }
    Ok(())
}
