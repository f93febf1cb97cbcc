//! Coordinate transform contract and its script-backed implementation

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::adapter::InvocationAdapter;
use crate::compiler::CompiledOperation;
use crate::error::{Error, Result};
use crate::types::FormatTag;

/// Row-major matrix, the shape of a transform derivative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    rows: usize,
    columns: usize,
    elements: Vec<f64>,
}

impl Matrix {
    pub fn zeros(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            elements: vec![0.0; rows * columns],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn get(&self, row: usize, column: usize) -> Option<f64> {
        if row < self.rows && column < self.columns {
            self.elements.get(row * self.columns + column).copied()
        } else {
            None
        }
    }
}

/// N-dimensional coordinate transform
pub trait MathTransform: fmt::Debug {
    fn source_dimensions(&self) -> usize;

    fn target_dimensions(&self) -> usize;

    /// Transform a single point
    fn transform(&self, point: &[f64]) -> Result<Vec<f64>>;

    /// Jacobian of the transform at `point`
    fn derivative(&self, point: &[f64]) -> Result<Matrix>;

    fn is_identity(&self) -> bool {
        false
    }

    /// Transform packed coordinates, returning the number of points written
    ///
    /// `source` holds consecutive points of `source_dimensions()` values; results
    /// are written the same way into `destination`. Stops at the first failure.
    fn transform_points(&self, source: &[f64], destination: &mut [f64]) -> Result<usize> {
        let source_dim = self.source_dimensions();
        let target_dim = self.target_dimensions();

        if source_dim == 0 || target_dim == 0 {
            return Err(Error::UnsupportedOperation {
                message: "transform with a zero dimension".to_string(),
                feature: None,
            });
        }
        if source.len() % source_dim != 0 {
            return Err(Error::DimensionMismatch {
                expected: source_dim,
                actual: source.len() % source_dim,
            });
        }
        let count = source.len() / source_dim;
        if destination.len() < count * target_dim {
            return Err(Error::ResultShape {
                expected: count * target_dim,
                actual: destination.len(),
            });
        }

        for (point, output) in source
            .chunks_exact(source_dim)
            .zip(destination.chunks_exact_mut(target_dim))
        {
            let values = self.transform(point)?;
            if values.len() != target_dim {
                return Err(Error::ResultShape {
                    expected: target_dim,
                    actual: values.len(),
                });
            }
            output.copy_from_slice(&values);
        }
        Ok(count)
    }
}

/// [`MathTransform`] backed by a remotely generated script
///
/// Only built from a successfully compiled operation, so it is always ready
/// to evaluate. Calls are not reentrant; use one instance per thread.
#[derive(Debug)]
pub struct ScriptTransform {
    operation: CompiledOperation,
    adapter: InvocationAdapter,
    source_dimensions: usize,
    target_dimensions: usize,
}

impl ScriptTransform {
    pub fn new(operation: CompiledOperation) -> Self {
        Self {
            source_dimensions: operation.source_dimensions(),
            target_dimensions: operation.target_dimensions(),
            adapter: InvocationAdapter::new(),
            operation,
        }
    }

    pub fn dialect(&self) -> FormatTag {
        self.operation.dialect()
    }
}

impl MathTransform for ScriptTransform {
    fn source_dimensions(&self) -> usize {
        self.source_dimensions
    }

    fn target_dimensions(&self) -> usize {
        self.target_dimensions
    }

    fn transform(&self, point: &[f64]) -> Result<Vec<f64>> {
        let output = self.adapter.invoke(
            &self.operation,
            point,
            self.source_dimensions,
            self.target_dimensions,
        )?;
        trace!(?point, ?output, "Point transformed");
        Ok(output)
    }

    fn derivative(&self, _point: &[f64]) -> Result<Matrix> {
        Err(Error::UnsupportedOperation {
            message: format!("derivative of a {} operation", self.dialect()),
            feature: Some("derivative".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Swaps axes and appends a zero height
    #[derive(Debug)]
    struct SwapAxes;

    impl MathTransform for SwapAxes {
        fn source_dimensions(&self) -> usize {
            2
        }

        fn target_dimensions(&self) -> usize {
            3
        }

        fn transform(&self, point: &[f64]) -> Result<Vec<f64>> {
            if point[0].is_nan() {
                return Err(Error::ScriptExecution {
                    dialect: FormatTag::JavaScript,
                    message: "NaN".to_string(),
                });
            }
            Ok(vec![point[1], point[0], 0.0])
        }

        fn derivative(&self, _point: &[f64]) -> Result<Matrix> {
            Ok(Matrix::zeros(3, 2))
        }
    }

    #[test]
    fn test_matrix_access() {
        let matrix = Matrix::zeros(3, 2);
        assert_eq!(matrix.rows(), 3);
        assert_eq!(matrix.columns(), 2);
        assert_eq!(matrix.get(2, 1), Some(0.0));
        assert_eq!(matrix.get(3, 0), None);
    }

    #[test]
    fn test_transform_points_packs_results() {
        let source = [1.0, 2.0, 3.0, 4.0];
        let mut destination = [f64::NAN; 6];

        let count = SwapAxes.transform_points(&source, &mut destination).unwrap();
        assert_eq!(count, 2);
        assert_eq!(destination, [2.0, 1.0, 0.0, 4.0, 3.0, 0.0]);
    }

    #[test]
    fn test_transform_points_validates_buffers() {
        let mut destination = [0.0; 6];
        assert!(matches!(
            SwapAxes.transform_points(&[1.0, 2.0, 3.0], &mut destination),
            Err(Error::DimensionMismatch { .. })
        ));

        let mut small = [0.0; 5];
        assert!(matches!(
            SwapAxes.transform_points(&[1.0, 2.0, 3.0, 4.0], &mut small),
            Err(Error::ResultShape { expected: 6, actual: 5 })
        ));
    }

    #[test]
    fn test_transform_points_stops_at_first_failure() {
        let mut destination = [0.0; 9];
        let err = SwapAxes
            .transform_points(&[1.0, 2.0, f64::NAN, 0.0, 5.0, 6.0], &mut destination)
            .unwrap_err();
        assert!(matches!(err, Error::ScriptExecution { .. }));
        assert_eq!(&destination[..3], &[2.0, 1.0, 0.0]);
        assert_eq!(&destination[6..], &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_default_is_not_identity() {
        assert!(!SwapAxes.is_identity());
    }
}
