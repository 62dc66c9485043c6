use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::cell::CellState;
use super::min_residual::{check_by_min_residual, sort_by_residual, Candidate, SelectionOutcome};
use super::seed::{remap_coverage, seeding_order, CoverageRemap};
use super::MappingContext;
use crate::coverage_map::CoverageMap;
use crate::error::MapperError;
use crate::grid::{DescriptorGrid, Resolution};
use crate::settings::MapperSettings;
use crate::traits::{CoverageSolver, Scaler};

/// A prior coverage map reused as initial guesses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedMap {
    pub map: CoverageMap,
    /// Species ordering of the prior coverages, if it differs from the current run.
    #[serde(default)]
    pub adsorbate_names: Option<Vec<String>>,
}

/// Inputs of one mapping call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingRequest {
    pub descriptor_ranges: Vec<(f64, f64)>,
    pub resolution: Resolution,
    #[serde(default)]
    pub seed: Option<SeedMap>,
}

/// Result of a mapping call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageMapping {
    /// Deduplicated solved points, in insertion order.
    pub map: CoverageMap,
    /// Grid cells left without a solution.
    pub unresolved: usize,
    /// Number of sweeps performed, including the one that observed no progress.
    pub sweeps: usize,
}

/// What seeding from a prior map achieved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    /// Prior entries that converged and now resolve a grid cell.
    pub solved: usize,
    /// Prior entries that do not lie on the grid.
    pub off_grid: usize,
    /// Prior coverages that had to be remapped to the current species.
    pub remapped: usize,
}

/// Sweeps a descriptor grid until no cell makes further progress.
pub struct GridMapper<'a, S, V> {
    ctx: MappingContext<'a, S, V>,
    grid: DescriptorGrid,
    cells: Vec<CellState>,
    sweeps: usize,
}

impl<'a, S: Scaler, V: CoverageSolver> GridMapper<'a, S, V> {
    pub fn new(
        scaler: &'a S,
        solver: &'a mut V,
        settings: &'a MapperSettings,
        grid: DescriptorGrid,
    ) -> Result<Self, MapperError> {
        settings.validate()?;
        let cells = vec![CellState::default(); grid.len()];
        Ok(Self {
            ctx: MappingContext::new(scaler, solver, settings),
            grid,
            cells,
            sweeps: 0,
        })
    }

    pub fn grid(&self) -> &DescriptorGrid {
        &self.grid
    }

    pub fn map(&self) -> &CoverageMap {
        self.ctx.map()
    }

    pub fn cell(&self, i: usize, j: usize) -> Option<&CellState> {
        let (m, n) = self.grid.shape();
        if i >= m || j >= n {
            return None;
        }
        self.cells.get(self.index(i, j))
    }

    pub fn unresolved_count(&self) -> usize {
        self.cells.iter().filter(|cell| !cell.is_resolved()).count()
    }

    /// Euclidean norm of the per-cell progress scores.
    pub fn progress(&self) -> f64 {
        let n = self.n_directions();
        self.cells
            .iter()
            .map(|cell| cell.score(n).powi(2))
            .sum::<f64>()
            .sqrt()
    }

    /// Solves directly at every grid cell covered by `seed`, using the prior
    /// coverages as initial guesses.
    pub fn seed(&mut self, seed: &SeedMap) -> SeedSummary {
        let mut summary = SeedSummary::default();
        let precision = self.ctx.settings().descriptor_decimal_precision;
        let current = self.ctx.adsorbate_names().to_vec();

        for entry in seeding_order(&seed.map) {
            let pt = entry.point.rounded(precision);
            let Some((i, j)) = self.grid.locate(&entry.point, precision) else {
                debug!(%pt, "initial guess point is not on the grid");
                summary.off_grid += 1;
                continue;
            };

            let (guess, remap) =
                remap_coverage(&entry.coverage, &current, seed.adsorbate_names.as_deref());
            if remap != CoverageRemap::Unchanged {
                summary.remapped += 1;
            }

            match self.ctx.solve_point(&entry.point, &guess) {
                Ok(coverage) => {
                    self.ctx.record(entry.point.clone(), coverage.clone());
                    let index = self.index(i, j);
                    self.cells[index] = CellState::Resolved { coverage };
                    summary.solved += 1;
                    debug!(%pt, ?remap, "solved from initial guess");
                }
                Err(err) => {
                    debug!(%pt, ?remap, error = %err, "initial guess did not converge");
                }
            }
        }

        info!(
            solved = summary.solved,
            off_grid = summary.off_grid,
            remapped = summary.remapped,
            "seeded from prior coverage map"
        );
        summary
    }

    /// Runs sweeps while the progress measure strictly increases.
    pub fn run(&mut self) {
        let mut previous = -1.0;
        let mut current = self.progress();
        while current > previous {
            info!(
                n_unmapped = self.unresolved_count(),
                n_iter = self.sweeps,
                "points do not have valid solution"
            );
            previous = current;
            self.sweep();
            current = self.progress();
        }

        let n_unmapped = self.unresolved_count();
        if n_unmapped == 0 {
            info!(n_iter = self.sweeps, "found solutions at all points");
        } else {
            warn!(n_unmapped, n_iter = self.sweeps, "no solution at some points");
        }
    }

    /// One pass over every cell, rows then columns.
    pub fn sweep(&mut self) {
        let (m, n) = self.grid.shape();
        for i in 0..m {
            for j in 0..n {
                self.resolve_cell(i, j);
            }
        }
        self.sweeps += 1;
    }

    pub fn finish(self) -> CoverageMapping {
        let unresolved = self.unresolved_count();
        let precision = self.ctx.settings().descriptor_decimal_precision;
        CoverageMapping {
            map: self.ctx.into_map().deduplicated(precision),
            unresolved,
            sweeps: self.sweeps,
        }
    }

    /// Searches the untried directions of cell `(i, j)`.
    ///
    /// A cell with no candidates this sweep keeps its in-bounds directions
    /// open, so neighbors solved later can still reach it.
    fn resolve_cell(&mut self, i: usize, j: usize) {
        let settings = self.ctx.settings();
        let n_directions = settings.search_directions.len();
        let index = self.index(i, j);
        if !self.cells[index].needs_search(n_directions) {
            return;
        }
        let CellState::Unresolved { tried } = &self.cells[index] else {
            return;
        };
        let mut tried = tried.clone();

        let this_pt = self.grid.point(i, j);
        let mut candidates = Vec::new();

        for (k, direction) in settings.search_directions.iter().enumerate() {
            if tried.contains(&k) {
                continue;
            }
            let Some((si, sj)) = self.grid.offset((i, j), (direction.0, direction.1)) else {
                tried.insert(k);
                continue;
            };

            let sol_pt = self.grid.point(si, sj);
            if sol_pt == this_pt {
                for guess in self.ctx.initial_guesses(&this_pt) {
                    let residual = self.ctx.residual_at(&this_pt, &guess);
                    candidates.push(Candidate {
                        residual,
                        origin: sol_pt.clone(),
                        guess,
                    });
                }
                tried.insert(k);
            } else if let Some(guess) = self
                .ctx
                .map()
                .retrieve(&sol_pt, settings.descriptor_decimal_precision)
                .cloned()
            {
                let residual = self.ctx.residual_at(&this_pt, &guess);
                candidates.push(Candidate {
                    residual,
                    origin: sol_pt,
                    guess,
                });
                tried.insert(k);
            }
        }

        sort_by_residual(&mut candidates);
        let precision = settings.descriptor_decimal_precision;
        let outcome = match check_by_min_residual(&mut self.ctx, candidates, &this_pt, false) {
            SelectionOutcome::Remaining(mut remaining)
                if settings.max_bisections > 0 && !remaining.is_empty() =>
            {
                debug!(
                    pt = %this_pt.rounded(precision),
                    "no solution from current information; attempting bisection"
                );
                sort_by_residual(&mut remaining);
                check_by_min_residual(&mut self.ctx, remaining, &this_pt, true)
            }
            SelectionOutcome::Remaining(remaining) => {
                if settings.max_bisections > 0 {
                    debug!(
                        pt = %this_pt.rounded(precision),
                        "no solution from current information; no nearby points for bisection"
                    );
                }
                SelectionOutcome::Remaining(remaining)
            }
            converged => converged,
        };

        self.cells[index] = match outcome {
            SelectionOutcome::Converged(coverage) => CellState::Resolved { coverage },
            SelectionOutcome::Remaining(_) => CellState::Unresolved { tried },
        };
    }

    fn index(&self, i: usize, j: usize) -> usize {
        i * self.grid.shape().1 + j
    }

    fn n_directions(&self) -> usize {
        self.ctx.settings().search_directions.len()
    }
}

/// Maps steady-state coverages over the grid described by `request`.
///
/// Per-cell convergence failures never abort the call; they are reported as
/// [`CoverageMapping::unresolved`]. Only malformed inputs return an error.
pub fn map_coverages<S: Scaler, V: CoverageSolver>(
    scaler: &S,
    solver: &mut V,
    settings: &MapperSettings,
    request: &MappingRequest,
) -> Result<CoverageMapping, MapperError> {
    let grid = DescriptorGrid::new(&request.descriptor_ranges, request.resolution)?;
    let mut mapper = GridMapper::new(scaler, solver, settings, grid)?;
    if let Some(seed) = &request.seed {
        mapper.seed(seed);
    }
    mapper.run();
    Ok(mapper.finish())
}
