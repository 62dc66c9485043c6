//! Reuse of a prior coverage map as initial guesses.

use tracing::warn;

use crate::coverage_map::{CoverageEntry, CoverageMap};
use crate::point::Coverage;

/// How a prior coverage vector was adapted to the current species ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverageRemap {
    Unchanged,
    /// Components were matched by species name.
    ByName,
    /// Missing trailing species were set to zero.
    Padded,
    /// Extra trailing components were dropped.
    Truncated,
}

/// Adapts `guess` to the species in `current`.
///
/// With `prior` names the components are matched by name: species missing
/// from the prior run start at zero and species absent from the current run
/// are dropped. Without names the vector is zero-padded or truncated.
pub fn remap_coverage(
    guess: &[f64],
    current: &[String],
    prior: Option<&[String]>,
) -> (Coverage, CoverageRemap) {
    if let Some(prior) = prior {
        if prior == current && guess.len() == current.len() {
            return (guess.to_vec(), CoverageRemap::Unchanged);
        }
        let mut remapped = vec![0.0; current.len()];
        for (slot, name) in remapped.iter_mut().zip(current) {
            if let Some(old) = prior.iter().position(|p| p == name) {
                *slot = guess.get(old).copied().unwrap_or(0.0);
            }
        }
        warn!(
            prior = ?prior,
            current = ?current,
            "remapping guess coverages by adsorbate name"
        );
        return (remapped, CoverageRemap::ByName);
    }

    let n = current.len();
    if guess.len() < n {
        warn!(
            found = guess.len(),
            expected = n,
            "guess coverage vector is shorter than the number of adsorbates; assuming undefined coverages are 0"
        );
        let mut padded = guess.to_vec();
        padded.resize(n, 0.0);
        (padded, CoverageRemap::Padded)
    } else if guess.len() > n {
        warn!(
            found = guess.len(),
            expected = n,
            "guess coverage vector is longer than the number of adsorbates; discarding extra coverages"
        );
        (guess[..n].to_vec(), CoverageRemap::Truncated)
    } else {
        (guess.to_vec(), CoverageRemap::Unchanged)
    }
}

/// Prior entries in the order they are seeded: descending by point.
pub(crate) fn seeding_order(prior: &CoverageMap) -> Vec<CoverageEntry> {
    let mut entries = prior.entries().to_vec();
    entries.sort_by(|a, b| b.point.total_cmp(&a.point));
    entries
}
