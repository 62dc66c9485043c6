use nalgebra::{DMatrix, DVector};

use crate::error::MapperError;
use crate::point::DescriptorPoint;
use crate::traits::Scaler;

/// Linear scaling relations: every reaction parameter is an affine function of
/// the descriptors, `p = C · [d_1, ..., d_n, 1]`.
#[derive(Debug, Clone)]
pub struct LinearScaler {
    descriptor_names: Vec<String>,
    parameter_names: Vec<String>,
    coefficients: DMatrix<f64>,
}

impl LinearScaler {
    /// Builds a scaler from one coefficient row per parameter.
    ///
    /// Every descriptor must be a species of the reaction network, and every row
    /// must hold one slope per descriptor plus an intercept.
    pub fn new(
        network_species: &[String],
        descriptor_names: Vec<String>,
        parameter_names: Vec<String>,
        coefficient_rows: &[Vec<f64>],
    ) -> Result<Self, MapperError> {
        for name in &descriptor_names {
            if !network_species.contains(name) {
                return Err(MapperError::DescriptorNotInNetwork { name: name.clone() });
            }
        }

        let width = descriptor_names.len() + 1;
        if coefficient_rows.len() != parameter_names.len() {
            return Err(MapperError::InvalidCoefficients {
                row: coefficient_rows.len().min(parameter_names.len()),
                expected: parameter_names.len(),
                found: coefficient_rows.len(),
            });
        }
        for (row, values) in coefficient_rows.iter().enumerate() {
            if values.len() != width {
                return Err(MapperError::InvalidCoefficients {
                    row,
                    expected: width,
                    found: values.len(),
                });
            }
        }

        let coefficients = DMatrix::from_row_iterator(
            coefficient_rows.len(),
            width,
            coefficient_rows.iter().flatten().copied(),
        );

        Ok(Self {
            descriptor_names,
            parameter_names,
            coefficients,
        })
    }

    pub fn descriptor_names(&self) -> &[String] {
        &self.descriptor_names
    }

    pub fn parameter_names(&self) -> &[String] {
        &self.parameter_names
    }
}

impl Scaler for LinearScaler {
    fn parameters(&self, point: &DescriptorPoint) -> Vec<f64> {
        let mut full = DVector::from_element(self.coefficients.ncols(), 1.0);
        for (slot, &d) in full.iter_mut().zip(point.components()) {
            *slot = d;
        }
        let params = &self.coefficients * full;
        params.iter().copied().collect()
    }
}
