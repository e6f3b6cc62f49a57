use thiserror::Error;

/// Errors raised by the simulation engine.
///
/// `Configuration` is raised once, when a config is built. `InvalidState`
/// means a core invariant broke during a tick and the run cannot continue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("invalid simulation state: {0}")]
    InvalidState(String),

    #[error("frame has {actual} pixels, expected {expected}")]
    FrameSize { expected: usize, actual: usize },
}

impl SimulationError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        SimulationError::Configuration(msg.into())
    }
}
