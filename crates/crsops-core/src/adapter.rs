//! Invocation of compiled operations
//!
//! Both dialects return an ordered sequence of numbers from `transform`. The
//! adapter checks the input against the source dimension before any foreign
//! code runs; the session then reads exactly the target dimension from the
//! result. A shorter result is an error. Trailing extra elements are never
//! read, matching what existing generators rely on.

use crate::compiler::CompiledOperation;
use crate::error::{Error, Result};

/// Runs a compiled operation on one point
#[derive(Debug, Clone, Copy, Default)]
pub struct InvocationAdapter;

impl InvocationAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Transform `input` and return exactly `target_dimensions` coordinates
    pub fn invoke(
        &self,
        operation: &CompiledOperation,
        input: &[f64],
        source_dimensions: usize,
        target_dimensions: usize,
    ) -> Result<Vec<f64>> {
        if input.len() != source_dimensions {
            return Err(Error::DimensionMismatch {
                expected: source_dimensions,
                actual: input.len(),
            });
        }

        operation
            .session()
            .as_session()
            .call_transform(input, target_dimensions)
    }
}
