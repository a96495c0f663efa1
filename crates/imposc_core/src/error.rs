use thiserror::Error;

/// Failures reported by the impact oscillator core.
///
/// Expected outcomes of a parameter sweep (complex roots, unphysical orbits)
/// are not errors; they surface as `None` from the periodic-orbit solver.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ImposcError {
    #[error("forcing frequency is zero, so the forcing period is undefined")]
    ZeroForcingFrequency,

    #[error("no impact found within {elapsed} time units of the last impact")]
    NoImpactFound { elapsed: f64 },

    #[error("(1, {n}) orbit curve is degenerate: {reason}")]
    DegenerateOrbitCurve { n: u32, reason: &'static str },

    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

pub type Result<T> = std::result::Result<T, ImposcError>;
