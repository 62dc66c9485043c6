use nalgebra::DVector;
use tracing::debug;

use super::MappingContext;
use crate::error::PointError;
use crate::point::{Coverage, DescriptorPoint};
use crate::traits::{CoverageSolver, Scaler};

/// Finds coverages at `target` given that `guess` is a good guess at `origin`.
///
/// Each step tries the target first and halves the remaining distance towards
/// the last solved point on failure, at most `max_bisections` times. Every
/// solved point, intermediate or final, is recorded in the working map. The
/// walk takes at most `2^max_bisections` steps.
pub fn bisect_descriptor_line<S: Scaler, V: CoverageSolver>(
    ctx: &mut MappingContext<'_, S, V>,
    target: &DescriptorPoint,
    origin: &DescriptorPoint,
    guess: &[f64],
) -> Result<Coverage, PointError> {
    let settings = ctx.settings();
    let max_steps = 1usize << settings.max_bisections;

    let mut solved_from = origin.clone();
    let mut coverage = guess.to_vec();

    for _ in 0..max_steps {
        let (reached, solved) = next_valid_coverage(ctx, target, &solved_from, &coverage)?;
        ctx.record(reached.clone(), solved.clone());
        if reached == *target {
            return Ok(solved);
        }

        coverage = if settings.extrapolate_coverages {
            extrapolate_coverage(&solved_from, &coverage, &reached, &solved, target)
        } else {
            solved
        };
        solved_from = reached;
    }

    Err(PointError::BisectionLineExhausted {
        origin: origin.clone(),
        target: target.clone(),
        attempts: max_steps,
    })
}

/// Closest point on the line from `solved_from` to `target` where `guess` converges.
fn next_valid_coverage<S: Scaler, V: CoverageSolver>(
    ctx: &mut MappingContext<'_, S, V>,
    target: &DescriptorPoint,
    solved_from: &DescriptorPoint,
    guess: &[f64],
) -> Result<(DescriptorPoint, Coverage), PointError> {
    let settings = ctx.settings();
    let precision = settings.descriptor_decimal_precision;
    let mut current = target.clone();
    let mut residual = None;

    for n_iter in 1..=settings.max_bisections {
        match ctx.solve_point(&current, guess) {
            Ok(coverage) => {
                debug!(
                    old_pt = %solved_from.rounded(precision),
                    new_pt = %current.rounded(precision),
                    n_iter,
                    "bisection moved"
                );
                return Ok((current, coverage));
            }
            Err(err) => {
                residual = err.residual().or(residual);
                debug!(
                    old_pt = %solved_from.rounded(precision),
                    new_pt = %current.rounded(precision),
                    n_iter,
                    resid = ?err.residual(),
                    "bisection failed to move"
                );
                current = solved_from.midpoint(&current);
            }
        }
    }

    let residual = match residual {
        Some(residual) => residual,
        None => ctx.residual_at(target, guess),
    };
    debug!(
        old_pt = %solved_from.rounded(precision),
        new_pt = %target.rounded(precision),
        resid = residual,
        "maximum iterations bisecting"
    );
    Err(PointError::BisectionExhausted {
        origin: solved_from.clone(),
        target: target.clone(),
        bisections: settings.max_bisections,
        residual,
    })
}

/// Linear projection of the coverage trend from `(p0, c0)` through `(p1, c1)`
/// out to the distance of `p2` from `p0`.
pub(crate) fn extrapolate_coverage(
    p0: &DescriptorPoint,
    c0: &[f64],
    p1: &DescriptorPoint,
    c1: &[f64],
    p2: &DescriptorPoint,
) -> Coverage {
    let traveled = p0.distance(p1);
    if traveled == 0.0 || c0.len() != c1.len() {
        return c1.to_vec();
    }
    let c0 = DVector::from_column_slice(c0);
    let slope = (DVector::from_column_slice(c1) - &c0) / traveled;
    let projected = c0 + slope * p0.distance(p2);
    projected.iter().copied().collect()
}
