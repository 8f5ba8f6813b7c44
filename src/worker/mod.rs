//! Background compute unit.
//!
//! A [`ComputeUnit`] serves submitted [`SimulationRequest`]s one at a time in
//! FIFO order. Each request runs on tokio's blocking pool and reports back
//! through its own [`Ticket`]: zero or more `PROGRESS` messages with
//! non-decreasing percentages, then exactly one `COMPLETE` or `ERROR`.
//!
//! There is no cooperative cancellation. [`ComputeUnit::terminate`] drops the
//! whole unit: queued requests are discarded and a computation already on the
//! blocking pool runs to completion with its output thrown away. Once
//! `terminate` returns, no further message reaches any ticket; each ticket
//! then ends without a terminal message.

use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::core::{
    SamplerKind, SimulationError, SimulationOutput, SimulationRequest, run_simulation,
};

/// One emission from the compute unit for a single request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerMessage {
    Progress { progress: u8 },
    Complete { result: SimulationOutput },
    Error { error: String },
}

impl WorkerMessage {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress { .. })
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitState {
    Idle,
    Running,
    Completed,
    Failed,
}

/// Computation run for each request; swapped out in tests.
pub type Runner =
    fn(&SimulationRequest, &mut dyn FnMut(u8)) -> Result<SimulationOutput, SimulationError>;

struct Job {
    request: SimulationRequest,
    reply: mpsc::UnboundedSender<WorkerMessage>,
}

pub struct ComputeUnit {
    jobs: mpsc::UnboundedSender<Job>,
    state: watch::Receiver<UnitState>,
    torn_down: Arc<AtomicBool>,
    dispatcher: JoinHandle<()>,
}

impl ComputeUnit {
    /// Starts a unit on the current tokio runtime.
    pub fn spawn() -> Self {
        Self::spawn_with(default_runner)
    }

    pub fn spawn_with(runner: Runner) -> Self {
        let (jobs_tx, jobs_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(UnitState::Idle);
        let torn_down = Arc::new(AtomicBool::new(false));
        let dispatcher = tokio::spawn(dispatch_loop(
            jobs_rx,
            state_tx,
            runner,
            Arc::clone(&torn_down),
        ));
        Self {
            jobs: jobs_tx,
            state: state_rx,
            torn_down,
            dispatcher,
        }
    }

    pub fn submit(&self, request: SimulationRequest) -> Result<Ticket, SimulationError> {
        let (reply, messages) = mpsc::unbounded_channel();
        self.jobs
            .send(Job { request, reply })
            .map_err(|_| SimulationError::Terminated)?;
        Ok(Ticket { messages })
    }

    pub fn state(&self) -> UnitState {
        *self.state.borrow()
    }

    /// Coarse cancellation: tears the unit down without waiting for work in flight.
    pub fn terminate(self) {
        self.torn_down.store(true, Ordering::SeqCst);
        self.dispatcher.abort();
    }
}

/// Receiving side for one submitted request.
pub struct Ticket {
    messages: mpsc::UnboundedReceiver<WorkerMessage>,
}

impl Ticket {
    /// Next message, or `None` once the terminal message has been read or the unit is gone.
    pub async fn next(&mut self) -> Option<WorkerMessage> {
        self.messages.recv().await
    }

    /// Drains the ticket, feeding progress to `on_progress`, and returns the outcome.
    pub async fn wait(
        mut self,
        mut on_progress: impl FnMut(u8),
    ) -> Result<SimulationOutput, SimulationError> {
        while let Some(message) = self.messages.recv().await {
            match message {
                WorkerMessage::Progress { progress } => on_progress(progress),
                WorkerMessage::Complete { result } => return Ok(result),
                WorkerMessage::Error { error } => return Err(SimulationError::Reported(error)),
            }
        }
        Err(SimulationError::Terminated)
    }
}

fn default_runner(
    request: &SimulationRequest,
    progress: &mut dyn FnMut(u8),
) -> Result<SimulationOutput, SimulationError> {
    run_simulation(request, progress)
}

async fn dispatch_loop(
    mut jobs: mpsc::UnboundedReceiver<Job>,
    state: watch::Sender<UnitState>,
    runner: Runner,
    torn_down: Arc<AtomicBool>,
) {
    while let Some(Job { request, reply }) = jobs.recv().await {
        let kind = request.kind_name();
        let simulations = request.simulations();
        let sampler = request.options().sampler.map(SamplerKind::name);
        info!(kind, simulations, sampler, "simulation request received");
        state.send_replace(UnitState::Running);
        let started = Instant::now();

        let progress_reply = reply.clone();
        let silenced = Arc::clone(&torn_down);
        let outcome = tokio::task::spawn_blocking(move || {
            let mut forward = |progress: u8| {
                if silenced.load(Ordering::SeqCst) {
                    return;
                }
                debug!(kind, progress, "simulation progress");
                let _ = progress_reply.send(WorkerMessage::Progress { progress });
            };
            runner(&request, &mut forward)
        })
        .await;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        let terminal = match outcome {
            Ok(Ok(result)) => {
                info!(kind, elapsed_ms, "simulation complete");
                state.send_replace(UnitState::Completed);
                WorkerMessage::Complete { result }
            }
            Ok(Err(err)) => {
                warn!(kind, elapsed_ms, error = %err, "simulation rejected");
                state.send_replace(UnitState::Failed);
                WorkerMessage::Error {
                    error: err.to_string(),
                }
            }
            Err(join_err) => {
                let reason = if join_err.is_panic() {
                    panic_message(join_err.into_panic())
                } else {
                    "simulation task was cancelled".to_string()
                };
                warn!(kind, elapsed_ms, error = %reason, "simulation failed");
                state.send_replace(UnitState::Failed);
                WorkerMessage::Error {
                    error: SimulationError::panicked(reason).to_string(),
                }
            }
        };

        let _ = reply.send(terminal);
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
