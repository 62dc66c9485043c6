use thiserror::Error;

use crate::point::DescriptorPoint;

/// Returned by a [`crate::traits::CoverageSolver`] that could not converge from a guess.
#[derive(Debug, Clone, Copy, Error, PartialEq)]
#[error("solver did not converge (resid={residual})")]
pub struct ConvergenceError {
    /// Residual at the last iterate.
    pub residual: f64,
}

/// Recoverable failure to obtain coverages at a single point.
///
/// These feed the minimum-residual and bisection retry logic and are never
/// surfaced as a fatal mapping error.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PointError {
    #[error(transparent)]
    Convergence(#[from] ConvergenceError),

    #[error("solver returned an empty coverage vector")]
    EmptyCoverage,

    #[error(
        "no valid solution between {origin} and {target} after {bisections} bisections (resid={residual})"
    )]
    BisectionExhausted {
        origin: DescriptorPoint,
        target: DescriptorPoint,
        bisections: usize,
        residual: f64,
    },

    #[error("{attempts} bisection steps were not sufficient to move from {origin} to {target}")]
    BisectionLineExhausted {
        origin: DescriptorPoint,
        target: DescriptorPoint,
        attempts: usize,
    },
}

impl PointError {
    /// Residual carried by the failure, if it has one.
    pub fn residual(&self) -> Option<f64> {
        match self {
            PointError::Convergence(err) => Some(err.residual),
            PointError::BisectionExhausted { residual, .. } => Some(*residual),
            PointError::EmptyCoverage | PointError::BisectionLineExhausted { .. } => None,
        }
    }
}

/// Structural errors that abort a mapping call.
#[derive(Debug, Error)]
pub enum MapperError {
    #[error("resolution must have one or two positive entries, got {0:?}")]
    InvalidResolution(Vec<usize>),

    #[error("invalid descriptor ranges: {reason}")]
    InvalidDescriptorRanges { reason: String },

    #[error(
        "descriptor {name} does not appear in reaction network; add it via a dummy site or use an adsorbate from the network"
    )]
    DescriptorNotInNetwork { name: String },

    #[error("coefficient row {row} has {found} entries, expected {expected}")]
    InvalidCoefficients {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("invalid mapper settings: {reason}")]
    InvalidSettings { reason: String },

    #[error("failed to parse settings: {0}")]
    SettingsParse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::{ConvergenceError, PointError};
    use crate::point::DescriptorPoint;

    #[test]
    fn residual_is_structured() {
        let err = PointError::from(ConvergenceError { residual: 0.25 });
        assert_eq!(err.residual(), Some(0.25));
        assert_eq!(err.to_string(), "solver did not converge (resid=0.25)");

        let line = PointError::BisectionLineExhausted {
            origin: DescriptorPoint::from([0.0, 0.0]),
            target: DescriptorPoint::from([1.0, 1.0]),
            attempts: 8,
        };
        assert_eq!(line.residual(), None);
        assert!(line.to_string().contains("[0, 0]"));
    }
}
