use crate::error::ConvergenceError;
use crate::point::{Coverage, DescriptorPoint};

/// Maps a descriptor point to the reaction parameters of the kinetic model.
pub trait Scaler {
    /// Returns the reaction parameters at `point`.
    /// Must be deterministic: the mapper may evaluate the same point many times.
    fn parameters(&self, point: &DescriptorPoint) -> Vec<f64>;
}

/// Steady-state coverage solver for a fixed set of reaction parameters.
pub trait CoverageSolver {
    /// Names of the tracked adsorbates, in coverage-vector order.
    fn adsorbate_names(&self) -> &[String];

    /// Converges the steady-state equations starting from `guess`.
    fn solve(&mut self, parameters: &[f64], guess: &[f64]) -> Result<Coverage, ConvergenceError>;

    /// Residual of `coverage` under `parameters`. Lower is a better guess.
    fn residual(&mut self, parameters: &[f64], coverage: &[f64]) -> f64;

    /// Boltzmann-weighted initial guesses, best first.
    fn initial_guesses(&mut self, parameters: &[f64]) -> Vec<Coverage>;
}
