use thiserror::Error;

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Errors raised by configuration constructors and the two solvers.
///
/// `Config` is raised synchronously at construction time, `Domain` when a
/// valid-looking query falls outside a model's fitted range, and `Numerical`
/// when an integration diverges. All three are fatal to the run; nothing is
/// retried or silently corrected.
#[derive(Debug, Error)]
pub enum SimError {
    /// Invalid construction input. Names the offending parameter.
    #[error("invalid configuration: {parameter}: {reason}")]
    Config {
        parameter: &'static str,
        reason: String,
    },

    /// A query outside a model's supported range.
    #[error("{quantity} = {value} outside supported range [{min}, {max}]")]
    Domain {
        quantity: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Integration divergence or non-convergence. Carries the last good
    /// simulation time for diagnostics.
    #[error("numerical failure at t = {time} s: {reason}")]
    Numerical { time: f64, reason: String },
}

impl SimError {
    pub(crate) fn config(parameter: &'static str, reason: impl Into<String>) -> Self {
        SimError::Config {
            parameter,
            reason: reason.into(),
        }
    }
}
