use tracing::debug;

use super::bisection::bisect_descriptor_line;
use super::MappingContext;
use crate::point::{Coverage, DescriptorPoint};
use crate::traits::{CoverageSolver, Scaler};

/// A guess for a target cell: the coverages solved at `origin` and their
/// residual when used at the target.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub residual: f64,
    pub origin: DescriptorPoint,
    pub guess: Coverage,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectionOutcome {
    /// One candidate converged at the target.
    Converged(Coverage),
    /// Every candidate failed. Holds the ones worth bisecting, with the
    /// residuals of their failed attempts.
    Remaining(Vec<Candidate>),
}

/// Stable ascending sort by residual; NaN residuals go last.
pub fn sort_by_residual(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| a.residual.total_cmp(&b.residual));
}

/// Tries `candidates` in order until one converges at `target`.
///
/// Candidates are expected in ascending residual order. Each distinct origin
/// is tried once per call, except the target itself, which may contribute
/// several initial guesses. With `bisect` set, guesses from other points are
/// walked in with [`bisect_descriptor_line`] instead of solved directly.
pub fn check_by_min_residual<S: Scaler, V: CoverageSolver>(
    ctx: &mut MappingContext<'_, S, V>,
    candidates: Vec<Candidate>,
    target: &DescriptorPoint,
    bisect: bool,
) -> SelectionOutcome {
    let precision = ctx.settings().descriptor_decimal_precision;
    let mut remaining = Vec::new();
    let mut tried: Vec<DescriptorPoint> = Vec::new();

    for (n_iter, candidate) in candidates.into_iter().enumerate() {
        let is_target = candidate.origin == *target;
        debug!(
            pt = %target.rounded(precision),
            old_pt = %candidate.origin.rounded(precision),
            n_iter,
            "trying coverages"
        );

        if tried.contains(&candidate.origin) {
            continue;
        }

        let attempt = if !bisect || is_target {
            ctx.solve_point(target, &candidate.guess).map(|coverage| {
                ctx.record(target.clone(), coverage.clone());
                coverage
            })
        } else {
            bisect_descriptor_line(ctx, target, &candidate.origin, &candidate.guess)
        };

        match attempt {
            Ok(coverage) => {
                debug!(
                    pt = %target.rounded(precision),
                    old_pt = %candidate.origin.rounded(precision),
                    n_iter,
                    bisect,
                    "solved using coverages from neighbor"
                );
                return SelectionOutcome::Converged(coverage);
            }
            Err(err) => {
                debug!(
                    pt = %target.rounded(precision),
                    old_pt = %candidate.origin.rounded(precision),
                    n_iter,
                    old_resid = candidate.residual,
                    resid = ?err.residual(),
                    error = %err,
                    "no solution using coverages from neighbor"
                );
                // The target's own guesses are not bisected, so they are never retried.
                if !is_target {
                    if let Some(residual) = err.residual() {
                        remaining.push(Candidate {
                            residual,
                            ..candidate.clone()
                        });
                    }
                }
            }
        }

        if !is_target {
            tried.push(candidate.origin);
        }
    }

    SelectionOutcome::Remaining(remaining)
}

#[cfg(test)]
mod tests {
    use super::{check_by_min_residual, sort_by_residual, Candidate, SelectionOutcome};
    use crate::mapping::test_support::{IdentityScaler, ReachSolver};
    use crate::mapping::MappingContext;
    use crate::point::DescriptorPoint;
    use crate::settings::MapperSettings;

    fn candidate(residual: f64, origin: [f64; 2], guess: [f64; 2]) -> Candidate {
        Candidate {
            residual,
            origin: DescriptorPoint::from(origin),
            guess: guess.to_vec(),
        }
    }

    #[test]
    fn sort_is_stable_and_ascending() {
        let mut candidates = vec![
            candidate(0.5, [0.0, 0.0], [0.0, 0.0]),
            candidate(f64::NAN, [1.0, 0.0], [0.0, 0.0]),
            candidate(0.1, [0.0, 1.0], [0.0, 0.0]),
            candidate(0.5, [1.0, 1.0], [0.0, 0.0]),
        ];
        sort_by_residual(&mut candidates);
        let origins: Vec<_> = candidates.iter().map(|c| c.origin.components().to_vec()).collect();
        assert_eq!(
            origins,
            vec![vec![0.0, 1.0], vec![0.0, 0.0], vec![1.0, 1.0], vec![1.0, 0.0]]
        );
    }

    #[test]
    fn stops_at_first_converging_candidate() {
        let settings = MapperSettings::default();
        let mut solver = ReachSolver::with_reach(0.6);
        let mut ctx = MappingContext::new(&IdentityScaler, &mut solver, &settings);

        let target = DescriptorPoint::from([1.0, 1.0]);
        let outcome = check_by_min_residual(
            &mut ctx,
            vec![
                candidate(0.5, [1.0, 0.5], [1.0, 0.5]),
                candidate(0.7, [0.5, 0.5], [0.5, 0.5]),
            ],
            &target,
            false,
        );
        assert_eq!(outcome, SelectionOutcome::Converged(vec![1.0, 1.0]));
        assert_eq!(ctx.map().len(), 1);
        drop(ctx);
        assert_eq!(solver.solve_calls, 1);
    }

    #[test]
    fn failed_candidates_are_kept_for_bisection_except_the_target() {
        let settings = MapperSettings::default();
        let mut solver = ReachSolver::with_reach(0.1);
        let mut ctx = MappingContext::new(&IdentityScaler, &mut solver, &settings);

        let target = DescriptorPoint::from([1.0, 1.0]);
        let outcome = check_by_min_residual(
            &mut ctx,
            vec![
                candidate(0.3, [1.0, 1.0], [5.0, 1.0]),
                candidate(0.4, [1.0, 1.0], [1.0, 5.0]),
                candidate(0.5, [1.0, 0.0], [1.0, 0.0]),
                candidate(0.6, [1.0, 0.0], [0.5, 0.0]),
                candidate(0.7, [0.0, 0.0], [0.0, 0.0]),
            ],
            &target,
            false,
        );
        match outcome {
            SelectionOutcome::Remaining(rest) => {
                assert_eq!(rest.len(), 2);
                assert_eq!(rest[0].origin, DescriptorPoint::from([1.0, 0.0]));
                assert_eq!(rest[0].residual, 1.0);
                assert_eq!(rest[1].origin, DescriptorPoint::from([0.0, 0.0]));
                assert_eq!(rest[1].residual, 2f64.sqrt());
            }
            other => panic!("expected remaining candidates, got {other:?}"),
        }
        assert!(ctx.map().is_empty());
        drop(ctx);
        // Both target guesses are tried, the repeated origin only once.
        assert_eq!(solver.solve_calls, 4);
    }

    #[test]
    fn bisecting_pass_records_intermediate_points() {
        let settings = MapperSettings {
            max_bisections: 2,
            ..MapperSettings::default()
        };
        let mut solver = ReachSolver::with_reach(0.6);
        let mut ctx = MappingContext::new(&IdentityScaler, &mut solver, &settings);

        let target = DescriptorPoint::from([1.0, 0.0]);
        let outcome = check_by_min_residual(
            &mut ctx,
            vec![candidate(1.0, [0.0, 0.0], [0.0, 0.0])],
            &target,
            true,
        );
        assert_eq!(outcome, SelectionOutcome::Converged(vec![1.0, 0.0]));
        let points: Vec<_> = ctx.map().iter().map(|e| e.point.clone()).collect();
        assert_eq!(
            points,
            vec![DescriptorPoint::from([0.5, 0.0]), DescriptorPoint::from([1.0, 0.0])]
        );
    }
}
