//! Deterministic collaborators for exercising the mapper.
//!
//! `IdentityScaler` passes descriptors through as parameters. `ReachSolver`
//! returns the parameters themselves as the "coverage", and converges only
//! when the guess lies within `reach` of the parameters, so a coverage solved
//! at one point is a good guess exactly for points nearby.

use crate::error::ConvergenceError;
use crate::point::{Coverage, DescriptorPoint};
use crate::traits::{CoverageSolver, Scaler};

pub(crate) struct IdentityScaler;

impl Scaler for IdentityScaler {
    fn parameters(&self, point: &DescriptorPoint) -> Vec<f64> {
        point.components().to_vec()
    }
}

pub(crate) struct ReachSolver {
    pub species: Vec<String>,
    pub reach: f64,
    /// Points whose own initial guess is useless.
    pub hard: Vec<DescriptorPoint>,
    /// Points where the solver never converges.
    pub unreachable: Vec<DescriptorPoint>,
    /// Points where the solver "succeeds" with an empty vector.
    pub empty_at: Vec<DescriptorPoint>,
    /// Additional (duplicate) initial guesses returned per point.
    pub extra_guesses: usize,
    pub always_fail: bool,
    pub solve_calls: usize,
}

impl ReachSolver {
    pub fn with_reach(reach: f64) -> Self {
        Self {
            species: vec!["x_s".to_string(), "y_s".to_string()],
            reach,
            hard: Vec::new(),
            unreachable: Vec::new(),
            empty_at: Vec::new(),
            extra_guesses: 0,
            always_fail: false,
            solve_calls: 0,
        }
    }

    pub fn failing() -> Self {
        Self {
            always_fail: true,
            ..Self::with_reach(0.0)
        }
    }
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

impl CoverageSolver for ReachSolver {
    fn adsorbate_names(&self) -> &[String] {
        &self.species
    }

    fn solve(&mut self, parameters: &[f64], guess: &[f64]) -> Result<Coverage, ConvergenceError> {
        self.solve_calls += 1;
        if self.always_fail || self.unreachable.iter().any(|p| p.components() == parameters) {
            return Err(ConvergenceError { residual: 1.0 });
        }
        let residual = distance(parameters, guess);
        if residual > self.reach {
            return Err(ConvergenceError { residual });
        }
        if self.empty_at.iter().any(|p| p.components() == parameters) {
            return Ok(Vec::new());
        }
        Ok(parameters.to_vec())
    }

    fn residual(&mut self, parameters: &[f64], coverage: &[f64]) -> f64 {
        distance(parameters, coverage)
    }

    fn initial_guesses(&mut self, parameters: &[f64]) -> Vec<Coverage> {
        let guess = if self.hard.iter().any(|p| p.components() == parameters) {
            vec![10.0; parameters.len()]
        } else {
            parameters.to_vec()
        };
        vec![guess; 1 + self.extra_guesses]
    }
}
