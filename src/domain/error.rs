use thiserror::Error;

/// Errors surfaced by the simulation engines
///
/// Numerical instability is deliberately absent: it is damped inside the
/// integrator and reported through `StabilityReport` instead.
#[derive(Debug, Error)]
pub enum SimError {
    /// Rejected configuration or topology. Raised by `initialize`,
    /// `replace_springs`, `set_spring_stiffness` and `pin`/`unpin`.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The parallel compute context was lost. Terminal until `initialize`.
    #[error("Resource failure: {0}")]
    ResourceFailure(String),

    #[error("Config JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SimError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        SimError::Configuration(msg.into())
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SimError::ResourceFailure(_))
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
