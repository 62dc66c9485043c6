use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::point::{Coverage, DescriptorPoint};

/// A solved point: descriptor coordinates and the converged coverages there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageEntry {
    pub point: DescriptorPoint,
    pub coverage: Coverage,
}

/// Ordered collection of solved points.
///
/// Appends never deduplicate; [`CoverageMap::deduplicated`] performs the single
/// finalization pass that keeps the first entry per rounded point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoverageMap {
    entries: Vec<CoverageEntry>,
}

impl CoverageMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CoverageEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &CoverageEntry> {
        self.entries.iter()
    }

    pub fn append(&mut self, point: DescriptorPoint, coverage: Coverage) {
        self.entries.push(CoverageEntry { point, coverage });
    }

    /// Coverage of the first entry whose point matches `point` at `precision`.
    pub fn retrieve(&self, point: &DescriptorPoint, precision: u32) -> Option<&Coverage> {
        let key = point.rounded_key(precision);
        self.entries
            .iter()
            .find(|entry| entry.point.rounded_key(precision) == key)
            .map(|entry| &entry.coverage)
    }

    /// Copy of the map keeping only the first entry for each rounded point.
    pub fn deduplicated(&self, precision: u32) -> CoverageMap {
        let mut seen = HashSet::new();
        let entries = self
            .entries
            .iter()
            .filter(|entry| seen.insert(entry.point.rounded_key(precision)))
            .cloned()
            .collect();
        CoverageMap { entries }
    }
}

impl FromIterator<CoverageEntry> for CoverageMap {
    fn from_iter<I: IntoIterator<Item = CoverageEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for CoverageMap {
    type Item = CoverageEntry;
    type IntoIter = std::vec::IntoIter<CoverageEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::CoverageMap;
    use crate::point::DescriptorPoint;

    fn sample_map() -> CoverageMap {
        let mut map = CoverageMap::new();
        map.append(DescriptorPoint::from([0.0, 1.0]), vec![0.1]);
        map.append(DescriptorPoint::from([1.0, 1.0]), vec![0.2]);
        map.append(DescriptorPoint::from([0.001, 0.999]), vec![0.3]);
        map
    }

    #[test]
    fn retrieve_returns_first_match_at_precision() {
        let map = sample_map();
        let found = map.retrieve(&DescriptorPoint::from([0.002, 1.0]), 2);
        assert_eq!(found, Some(&vec![0.1]));
        assert!(map.retrieve(&DescriptorPoint::from([0.5, 0.5]), 2).is_none());
    }

    #[test]
    fn deduplicated_keeps_first_occurrence_in_order() {
        let deduped = sample_map().deduplicated(2);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped.entries()[0].coverage, vec![0.1]);
        assert_eq!(deduped.entries()[1].coverage, vec![0.2]);

        let finer = sample_map().deduplicated(4);
        assert_eq!(finer.len(), 3);
    }

    #[test]
    fn serializes_as_entry_list() {
        let mut map = CoverageMap::new();
        map.append(DescriptorPoint::from([0.5, -1.0]), vec![0.25, 0.75]);
        let json = serde_json::to_string(&map).expect("map should serialize");
        assert_eq!(json, r#"[{"point":[0.5,-1.0],"coverage":[0.25,0.75]}]"#);
        let back: CoverageMap = serde_json::from_str(&json).expect("map should deserialize");
        assert_eq!(back, map);
    }
}
