use thiserror::Error;

/// Numeric failures detected after a run completes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("trajectory left the finite domain at step {step} (state = ({x}, {y}))")]
    NonFinite { step: usize, x: f64, y: f64 },

    #[error("series left the finite domain at period {period} (value = {value})")]
    NonFiniteSeries { period: usize, value: f64 },
}
