//! QuickJS session for `text/javascript` operations
//!
//! The service sends a class expression. Loading evaluates it, instantiates
//! it with `new` and binds the instance to the global `operation`; every call
//! then looks that binding up and invokes its `transform` method with the
//! coordinates exposed as a `Float64Array`.

use std::fmt;

use rquickjs::function::This;
use rquickjs::{CatchResultExt, CaughtError, Context, Function, Object, Runtime, TypedArray, Value};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::runtime::{readable_length, ScriptSession};
use crate::types::FormatTag;

/// Global name the operation instance is bound to
pub const OPERATION_BINDING: &str = "operation";

/// Method invoked on the operation instance
pub const TRANSFORM_METHOD: &str = "transform";

// Returns the name of whatever is missing, or an empty string once bound.
const BIND_OPERATION: &str = r#"(function (candidate) {
    if (typeof candidate !== "function") {
        return "constructor";
    }
    const instance = new candidate();
    if (instance === null || typeof instance !== "object" || typeof instance.transform !== "function") {
        return "operation.transform";
    }
    globalThis.operation = instance;
    return "";
})"#;

/// QuickJS runtime and context owned by one operation
pub struct JsSession {
    context: Context,
    // Kept so the runtime is released together with the context.
    _runtime: Runtime,
    loaded: bool,
}

impl JsSession {
    pub fn new() -> Result<Self> {
        let runtime = Runtime::new().map_err(|e| Error::SessionUnavailable {
            dialect: FormatTag::JavaScript,
            message: e.to_string(),
        })?;
        let context = Context::full(&runtime).map_err(|e| Error::SessionUnavailable {
            dialect: FormatTag::JavaScript,
            message: e.to_string(),
        })?;

        Ok(Self {
            context,
            _runtime: runtime,
            loaded: false,
        })
    }
}

impl ScriptSession for JsSession {
    fn dialect(&self) -> FormatTag {
        FormatTag::JavaScript
    }

    fn load(&mut self, source: &str) -> Result<()> {
        let expression = format!("({})", strip_statement_terminator(source));

        self.context.with(|ctx| {
            let candidate: Value = ctx
                .eval(expression)
                .catch(&ctx)
                .map_err(compilation_error)?;
            let binder: Function = ctx
                .eval(BIND_OPERATION)
                .catch(&ctx)
                .map_err(compilation_error)?;
            let missing: String = binder
                .call((candidate,))
                .catch(&ctx)
                .map_err(compilation_error)?;

            if missing.is_empty() {
                Ok(())
            } else {
                Err(Error::MissingCallable {
                    dialect: FormatTag::JavaScript,
                    name: missing,
                })
            }
        })?;

        self.loaded = true;
        debug!(binding = OPERATION_BINDING, "JavaScript operation bound");
        Ok(())
    }

    fn call_transform(&self, input: &[f64], target_dimensions: usize) -> Result<Vec<f64>> {
        if !self.loaded {
            return Err(Error::MissingCallable {
                dialect: FormatTag::JavaScript,
                name: OPERATION_BINDING.to_string(),
            });
        }
        trace!(?input, "Invoking JavaScript transform");

        self.context.with(|ctx| {
            let operation: Object = ctx
                .globals()
                .get(OPERATION_BINDING)
                .catch(&ctx)
                .map_err(execution_error)?;
            let transform: Function = operation
                .get(TRANSFORM_METHOD)
                .catch(&ctx)
                .map_err(execution_error)?;
            let coordinates = TypedArray::<f64>::new(ctx.clone(), input.to_vec())
                .catch(&ctx)
                .map_err(execution_error)?;
            let result: Value = transform
                .call((This(operation), coordinates))
                .catch(&ctx)
                .map_err(execution_error)?;

            read_numbers(&result, target_dimensions)
        })
    }
}

impl fmt::Debug for JsSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsSession")
            .field("loaded", &self.loaded)
            .finish_non_exhaustive()
    }
}

impl Drop for JsSession {
    fn drop(&mut self) {
        debug!("Releasing JavaScript session");
    }
}

/// Read the leading `count` elements of an array-like result by index
fn read_numbers(result: &Value<'_>, count: usize) -> Result<Vec<f64>> {
    let sequence = result
        .as_object()
        .ok_or_else(|| execution_message("transform did not return an array-like value"))?;

    let length: Value = sequence
        .get("length")
        .map_err(|e| execution_message(e.to_string()))?;
    let length = length
        .as_number()
        .filter(|n| n.is_finite() && *n >= 0.0)
        .ok_or_else(|| execution_message("transform result has no numeric length"))?;

    // Float to integer casts saturate, so huge lengths stay huge
    let count = readable_length(length as usize, count)?;
    (0..count)
        .map(|index| {
            let key = u32::try_from(index)
                .map_err(|_| execution_message(format!("result index {} out of range", index)))?;
            let item: Value = sequence
                .get(key)
                .map_err(|e| execution_message(e.to_string()))?;
            item.as_number().ok_or_else(|| {
                execution_message(format!("element {} of the result is not a number", index))
            })
        })
        .collect()
}

/// Allow `class X { ... };` as well as a bare class expression
fn strip_statement_terminator(source: &str) -> &str {
    source.trim_end().trim_end_matches(';').trim_end()
}

fn compilation_error(error: CaughtError<'_>) -> Error {
    Error::Compilation {
        dialect: FormatTag::JavaScript,
        message: error.to_string(),
    }
}

fn execution_error(error: CaughtError<'_>) -> Error {
    execution_message(error.to_string())
}

fn execution_message(message: impl Into<String>) -> Error {
    Error::ScriptExecution {
        dialect: FormatTag::JavaScript,
        message: message.into(),
    }
}
