pub mod coverage_map;
pub mod error;
pub mod grid;
pub mod mapping;
pub mod point;
pub mod scaler;
pub mod settings;
/// The `covmap_core` crate computes steady-state coverage maps of a kinetic
/// model over a two-dimensional grid of descriptors.
///
/// Key components:
/// - **Traits**: `Scaler` (descriptors to reaction parameters) and `CoverageSolver`
///   (steady-state solve, residuals, initial guesses).
/// - **Coverage map**: solved points, queried and deduplicated at a decimal precision.
/// - **Mapping**: minimum-residual guess selection, descriptor-line bisection, and the
///   grid sweep that ties them together.
pub mod traits;

pub use coverage_map::{CoverageEntry, CoverageMap};
pub use error::{ConvergenceError, MapperError, PointError};
pub use grid::{DescriptorGrid, Resolution};
pub use mapping::{
    map_coverages, CoverageMapping, GridMapper, MappingRequest, SeedMap, SeedSummary,
};
pub use point::{Coverage, DescriptorPoint};
pub use scaler::LinearScaler;
pub use settings::{MapperSettings, SearchDirection};
pub use traits::{CoverageSolver, Scaler};
