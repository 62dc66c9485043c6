//! Grid continuation of steady-state coverages.
//!
//! The mapper sweeps a descriptor grid, seeding each unresolved cell with
//! coverages from already-solved neighbors. Guesses are tried in order of
//! increasing residual ([`min_residual`]); when every direct attempt fails the
//! line towards the target is bisected ([`bisection`]) until the solver
//! converges. Sweeps repeat until no cell makes further progress.

pub mod bisection;
pub mod cell;
pub mod mapper;
pub mod min_residual;
pub mod seed;

#[cfg(test)]
pub(crate) mod test_support;

pub use bisection::bisect_descriptor_line;
pub use cell::CellState;
pub use mapper::{
    map_coverages, CoverageMapping, GridMapper, MappingRequest, SeedMap, SeedSummary,
};
pub use min_residual::{check_by_min_residual, Candidate, SelectionOutcome};
pub use seed::{remap_coverage, CoverageRemap};

use tracing::warn;

use crate::coverage_map::CoverageMap;
use crate::error::PointError;
use crate::point::{Coverage, DescriptorPoint};
use crate::settings::MapperSettings;
use crate::traits::{CoverageSolver, Scaler};

/// Mutable state shared by the refiner, the selector and the grid mapper for
/// the duration of one mapping call.
pub struct MappingContext<'a, S, V> {
    scaler: &'a S,
    solver: &'a mut V,
    settings: &'a MapperSettings,
    map: CoverageMap,
}

impl<'a, S: Scaler, V: CoverageSolver> MappingContext<'a, S, V> {
    pub fn new(scaler: &'a S, solver: &'a mut V, settings: &'a MapperSettings) -> Self {
        Self {
            scaler,
            solver,
            settings,
            map: CoverageMap::new(),
        }
    }

    pub fn settings(&self) -> &'a MapperSettings {
        self.settings
    }

    pub fn map(&self) -> &CoverageMap {
        &self.map
    }

    pub fn adsorbate_names(&self) -> &[String] {
        self.solver.adsorbate_names()
    }

    pub fn record(&mut self, point: DescriptorPoint, coverage: Coverage) {
        self.map.append(point, coverage);
    }

    /// Single solver attempt at `point` starting from `guess`. No retries.
    pub fn solve_point(
        &mut self,
        point: &DescriptorPoint,
        guess: &[f64],
    ) -> Result<Coverage, PointError> {
        let parameters = self.scaler.parameters(point);
        let coverage = self.solver.solve(&parameters, guess)?;
        if coverage.is_empty() {
            warn!(
                point = %point.rounded(self.settings.descriptor_decimal_precision),
                "solver returned no coverages"
            );
            return Err(PointError::EmptyCoverage);
        }
        Ok(coverage)
    }

    /// Residual of `coverage` used as a guess at `point`.
    pub fn residual_at(&mut self, point: &DescriptorPoint, coverage: &[f64]) -> f64 {
        let parameters = self.scaler.parameters(point);
        self.solver.residual(&parameters, coverage)
    }

    /// Boltzmann-weighted guesses at `point`, capped at `max_initial_guesses`.
    pub fn initial_guesses(&mut self, point: &DescriptorPoint) -> Vec<Coverage> {
        let parameters = self.scaler.parameters(point);
        let mut guesses = self.solver.initial_guesses(&parameters);
        if let Some(max) = self.settings.max_initial_guesses {
            guesses.truncate(max);
        }
        guesses
    }

    pub fn into_map(self) -> CoverageMap {
        self.map
    }
}
