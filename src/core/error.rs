use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SimulationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("simulation aborted: {0}")]
    Panicked(String),

    /// Failure text received over the message boundary.
    #[error("{0}")]
    Reported(String),

    #[error("compute unit terminated before the request finished")]
    Terminated,
}

impl SimulationError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn panicked(msg: impl Into<String>) -> Self {
        Self::Panicked(msg.into())
    }
}
