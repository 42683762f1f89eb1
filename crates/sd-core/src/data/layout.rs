//! Layout detection for independent-variable payloads
//!
//! Callers send predictors either as a flat vector (one predictor) or as a
//! nested array whose orientation is not declared. The heuristic below
//! decides the orientation from the shape alone:
//!
//! - a flat vector is one predictor, one value per observation;
//! - a single outer element holding several values is one variable given
//!   variable-major and is transposed;
//! - several outer elements each holding more than one value are
//!   variable-major and are transposed;
//! - anything else (inner length 1) is already observation-major.
//!
//! Square shapes (e.g. two observations of two variables) are ambiguous.
//! They follow the variable-major rule and a warning is logged.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::{DataError, Result, Shape};

/// Predictor payload as received from the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndependentData {
    /// One predictor, one value per observation
    Vector(Vec<f64>),
    /// Nested values of undeclared orientation
    Matrix(Vec<Vec<f64>>),
}

/// Orientation of a nested predictor payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Outer index = observation, inner index = variable
    ObservationMajor,
    /// Outer index = variable, inner index = observation
    VariableMajor,
}

impl IndependentData {
    /// Shape of the payload as received (outer × inner)
    pub fn shape(&self) -> Shape {
        match self {
            IndependentData::Vector(v) => Shape::new(v.len(), 1),
            IndependentData::Matrix(m) => {
                Shape::new(m.len(), m.first().map(Vec::len).unwrap_or(0))
            }
        }
    }

    /// Orientation chosen by the shape heuristic
    pub fn orientation(&self) -> Orientation {
        let shape = self.shape();
        match self {
            IndependentData::Vector(_) => Orientation::ObservationMajor,
            IndependentData::Matrix(_) if shape.cols > 1 => Orientation::VariableMajor,
            IndependentData::Matrix(_) => Orientation::ObservationMajor,
        }
    }

    /// Whether the orientation heuristic is guessing
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, IndependentData::Matrix(_)) && self.shape().is_square()
    }

    /// Normalize to an observation-major matrix (rows = observations)
    pub fn to_observation_major(&self) -> Result<Array2<f64>> {
        match self {
            IndependentData::Vector(v) => {
                if v.is_empty() {
                    return Err(DataError::EmptyInput("independent data"));
                }
                Ok(Array2::from_shape_fn((v.len(), 1), |(i, _)| v[i]))
            }
            IndependentData::Matrix(m) => {
                let shape = self.shape();
                if shape.is_empty() {
                    return Err(DataError::EmptyInput("independent data"));
                }
                for (row, inner) in m.iter().enumerate() {
                    if inner.len() != shape.cols {
                        return Err(DataError::RaggedMatrix {
                            row,
                            len: inner.len(),
                            expected: shape.cols,
                        });
                    }
                }

                if self.is_ambiguous() {
                    log::warn!(
                        "independent data shape {} is ambiguous; treating it as variable-major",
                        shape
                    );
                }

                match self.orientation() {
                    Orientation::VariableMajor => Ok(Array2::from_shape_fn(
                        (shape.cols, shape.rows),
                        |(obs, var)| m[var][obs],
                    )),
                    Orientation::ObservationMajor => Ok(Array2::from_shape_fn(
                        (shape.rows, shape.cols),
                        |(obs, var)| m[obs][var],
                    )),
                }
            }
        }
    }
}

impl From<Vec<f64>> for IndependentData {
    fn from(v: Vec<f64>) -> Self {
        IndependentData::Vector(v)
    }
}

impl From<Vec<Vec<f64>>> for IndependentData {
    fn from(m: Vec<Vec<f64>>) -> Self {
        IndependentData::Matrix(m)
    }
}
