//! CPython session for `text/x-python` operations
//!
//! The source is executed in a private namespace and must define a class
//! named `Operation`. Calls are made by evaluating a synthesized expression,
//! `Operation().transform([c0, c1, ...])`, in that namespace.

use std::fmt;

use pyo3::prelude::*;
use pyo3::types::PyDict;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::runtime::{readable_length, ScriptSession};
use crate::types::FormatTag;

/// Name the source must bind its operation class to
pub const OPERATION_CLASS: &str = "Operation";

/// Isolated module namespace on the embedded interpreter
pub struct PySession {
    namespace: Py<PyDict>,
    loaded: bool,
}

impl PySession {
    pub fn new() -> Result<Self> {
        Python::with_gil(|py| {
            let namespace = PyDict::new_bound(py);
            let builtins = py.import_bound("builtins").map_err(|e| Error::SessionUnavailable {
                dialect: FormatTag::Python,
                message: e.to_string(),
            })?;
            namespace
                .set_item("__builtins__", builtins)
                .map_err(|e| Error::SessionUnavailable {
                    dialect: FormatTag::Python,
                    message: e.to_string(),
                })?;

            Ok(Self {
                namespace: namespace.unbind(),
                loaded: false,
            })
        })
    }
}

impl ScriptSession for PySession {
    fn dialect(&self) -> FormatTag {
        FormatTag::Python
    }

    fn load(&mut self, source: &str) -> Result<()> {
        Python::with_gil(|py| {
            let namespace = self.namespace.bind(py);
            py.run_bound(source, Some(namespace), None)
                .map_err(|e| Error::Compilation {
                    dialect: FormatTag::Python,
                    message: e.to_string(),
                })?;

            let operation = namespace
                .get_item(OPERATION_CLASS)
                .map_err(|e| Error::Compilation {
                    dialect: FormatTag::Python,
                    message: e.to_string(),
                })?;
            match operation {
                Some(class) if class.is_callable() => Ok(()),
                _ => Err(Error::MissingCallable {
                    dialect: FormatTag::Python,
                    name: OPERATION_CLASS.to_string(),
                }),
            }
        })?;

        self.loaded = true;
        debug!(class = OPERATION_CLASS, "Python operation loaded");
        Ok(())
    }

    fn call_transform(&self, input: &[f64], target_dimensions: usize) -> Result<Vec<f64>> {
        if !self.loaded {
            return Err(Error::MissingCallable {
                dialect: FormatTag::Python,
                name: OPERATION_CLASS.to_string(),
            });
        }
        let expression = call_expression(input);
        trace!(%expression, "Invoking Python transform");

        Python::with_gil(|py| {
            let namespace = self.namespace.bind(py);
            let result = py
                .eval_bound(&expression, Some(namespace), None)
                .map_err(|e| execution_message(e.to_string()))?;

            let length = result
                .len()
                .map_err(|_| execution_message("transform did not return a sequence"))?;

            let count = readable_length(length, target_dimensions)?;
            (0..count)
                .map(|index| {
                    result
                        .get_item(index)
                        .and_then(|item| item.extract::<f64>())
                        .map_err(|e| {
                            execution_message(format!("element {} of the result: {}", index, e))
                        })
                })
                .collect()
        })
    }
}

impl fmt::Debug for PySession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PySession")
            .field("loaded", &self.loaded)
            .finish_non_exhaustive()
    }
}

impl Drop for PySession {
    fn drop(&mut self) {
        // Clearing breaks reference cycles between the namespace and the classes it defines.
        Python::with_gil(|py| self.namespace.bind(py).clear());
        debug!("Released Python session");
    }
}

/// `Operation().transform([...])` with every coordinate as a Python literal
pub(crate) fn call_expression(input: &[f64]) -> String {
    let coordinates: Vec<String> = input.iter().map(|&value| python_literal(value)).collect();
    format!("{}().transform([{}])", OPERATION_CLASS, coordinates.join(", "))
}

/// Round-trippable Python literal for a float
fn python_literal(value: f64) -> String {
    if value.is_nan() {
        "float('nan')".to_string()
    } else if value.is_infinite() {
        if value > 0.0 {
            "float('inf')".to_string()
        } else {
            "float('-inf')".to_string()
        }
    } else {
        // Debug formatting is the shortest representation that parses back exactly.
        format!("{:?}", value)
    }
}

fn execution_message(message: impl Into<String>) -> Error {
    Error::ScriptExecution {
        dialect: FormatTag::Python,
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDENTITY: &str = "class Operation:\n    def transform(self, coords):\n        return list(coords)\n";

    fn loaded(source: &str) -> Result<PySession> {
        let mut session = PySession::new()?;
        session.load(source)?;
        Ok(session)
    }

    #[test]
    fn test_python_literals() {
        assert_eq!(python_literal(0.0), "0.0");
        assert_eq!(python_literal(-0.0), "-0.0");
        assert_eq!(python_literal(2.3522), "2.3522");
        assert_eq!(python_literal(1e21), "1e21");
        assert_eq!(python_literal(f64::NAN), "float('nan')");
        assert_eq!(python_literal(f64::NEG_INFINITY), "float('-inf')");
    }

    #[test]
    fn test_call_expression() {
        assert_eq!(
            call_expression(&[2.3522, 48.8566]),
            "Operation().transform([2.3522, 48.8566])"
        );
        assert_eq!(call_expression(&[]), "Operation().transform([])");
    }

    #[test]
    fn test_identity_round_trip() {
        let session = loaded(IDENTITY).unwrap();
        assert_eq!(session.call_transform(&[0.0, 0.0], 2).unwrap(), vec![0.0, 0.0]);

        let values = [0.1, -123456.789, 1e-300, 6378137.0];
        assert_eq!(session.call_transform(&values, values.len()).unwrap(), values.to_vec());
    }

    #[test]
    fn test_integers_and_tuples_are_numbers() {
        let session = loaded(
            "class Operation:\n    def transform(self, coords):\n        return (1, 2.5, True)\n",
        )
        .unwrap();
        assert_eq!(session.call_transform(&[0.0], 3).unwrap(), vec![1.0, 2.5, 1.0]);
    }

    #[test]
    fn test_missing_operation_class() {
        let err = loaded("class Transform:\n    pass\n").unwrap_err();
        assert!(matches!(err, Error::MissingCallable { dialect: FormatTag::Python, .. }));

        let err = loaded("Operation = 3\n").unwrap_err();
        assert!(matches!(err, Error::MissingCallable { .. }));
    }

    #[test]
    fn test_syntax_and_import_errors_are_compilation_errors() {
        let err = loaded("class Operation(:\n").unwrap_err();
        match err {
            Error::Compilation { message, .. } => assert!(message.contains("SyntaxError")),
            other => panic!("unexpected error: {other:?}"),
        }

        let err = loaded("import module_that_does_not_exist\n").unwrap_err();
        assert!(matches!(err, Error::Compilation { .. }));
    }

    #[test]
    fn test_sessions_are_isolated() {
        let first = loaded(IDENTITY).unwrap();
        let second = PySession::new().unwrap();

        assert!(first.call_transform(&[1.0], 1).is_ok());
        Python::with_gil(|py| {
            assert!(second.namespace.bind(py).get_item(OPERATION_CLASS).unwrap().is_none());
        });
    }

    #[test]
    fn test_runtime_errors_and_bad_results() {
        let session = loaded(
            "class Operation:\n    def transform(self, coords):\n        raise ValueError('latitude out of range')\n",
        )
        .unwrap();
        match session.call_transform(&[0.0, 95.0], 2).unwrap_err() {
            Error::ScriptExecution { message, .. } => {
                assert!(message.contains("latitude out of range"))
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let session = loaded(
            "class Operation:\n    def transform(self, coords):\n        return ['x', 'y']\n",
        )
        .unwrap();
        assert!(matches!(
            session.call_transform(&[0.0, 0.0], 2),
            Err(Error::ScriptExecution { .. })
        ));

        let session = loaded(
            "class Operation:\n    def transform(self, coords):\n        return 4.0\n",
        )
        .unwrap();
        assert!(matches!(
            session.call_transform(&[0.0, 0.0], 2),
            Err(Error::ScriptExecution { .. })
        ));
    }

    #[test]
    fn test_non_finite_inputs_reach_the_script() {
        let session = loaded(IDENTITY).unwrap();
        let result = session.call_transform(&[f64::NAN, f64::INFINITY], 2).unwrap();
        assert!(result[0].is_nan());
        assert_eq!(result[1], f64::INFINITY);
    }

    #[test]
    fn test_elements_past_target_dimension_are_not_read() {
        let session = loaded(
            "class Operation:\n    def transform(self, coords):\n        return list(coords) + [9.0, 'x']\n",
        )
        .unwrap();
        assert_eq!(session.call_transform(&[1.0, 2.0], 2).unwrap(), vec![1.0, 2.0]);
        assert!(matches!(
            session.call_transform(&[1.0, 2.0], 4),
            Err(Error::ScriptExecution { .. })
        ));
    }

    #[test]
    fn test_short_result_is_shape_error() {
        let session = loaded(IDENTITY).unwrap();
        assert!(matches!(
            session.call_transform(&[1.0, 2.0], 3),
            Err(Error::ResultShape { expected: 3, actual: 2 })
        ));
    }
}
