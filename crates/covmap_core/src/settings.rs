use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::MapperError;

/// Largest accepted `max_bisections`; the line walk is bounded by `2^max_bisections`.
pub const MAX_BISECTIONS_LIMIT: usize = 32;
/// Largest accepted `descriptor_decimal_precision`.
pub const MAX_DECIMAL_PRECISION: u32 = 12;

/// Offset `(di, dj)` in grid-index space towards a neighbor cell.
/// `(0, 0)` means "retry the cell's own initial guesses".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchDirection(pub isize, pub isize);

impl SearchDirection {
    pub fn is_origin(&self) -> bool {
        self.0 == 0 && self.1 == 0
    }
}

/// Options recognized by the grid mapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperSettings {
    pub search_directions: Vec<SearchDirection>,
    pub max_bisections: usize,
    pub max_initial_guesses: Option<usize>,
    pub descriptor_decimal_precision: u32,
    pub extrapolate_coverages: bool,
}

impl Default for MapperSettings {
    fn default() -> Self {
        Self {
            search_directions: vec![
                SearchDirection(0, 0),
                SearchDirection(0, 1),
                SearchDirection(1, 0),
                SearchDirection(0, -1),
                SearchDirection(-1, 0),
                SearchDirection(-1, 1),
                SearchDirection(1, 1),
                SearchDirection(1, -1),
                SearchDirection(-1, -1),
            ],
            max_bisections: 3,
            max_initial_guesses: Some(3),
            descriptor_decimal_precision: 2,
            extrapolate_coverages: false,
        }
    }
}

impl MapperSettings {
    /// Parses settings from JSON; omitted fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, MapperError> {
        let settings: MapperSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), MapperError> {
        let invalid = |reason: String| Err(MapperError::InvalidSettings { reason });

        if self.search_directions.is_empty() {
            return invalid("search_directions must not be empty".to_string());
        }
        let mut seen = HashSet::new();
        for direction in &self.search_directions {
            if !seen.insert(direction) {
                return invalid(format!("duplicate search direction {direction:?}"));
            }
        }
        if self.max_bisections >= MAX_BISECTIONS_LIMIT {
            return invalid(format!(
                "max_bisections must be below {MAX_BISECTIONS_LIMIT}, got {}",
                self.max_bisections
            ));
        }
        if self.descriptor_decimal_precision > MAX_DECIMAL_PRECISION {
            return invalid(format!(
                "descriptor_decimal_precision must be at most {MAX_DECIMAL_PRECISION}, got {}",
                self.descriptor_decimal_precision
            ));
        }
        Ok(())
    }
}
