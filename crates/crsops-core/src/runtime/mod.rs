//! Embedded interpreter sessions
//!
//! Each dialect has its own session type behind the [`ScriptSession`] trait:
//! QuickJS for `text/javascript`, CPython for `text/x-python`.
//! [`InterpreterSession`] is the tagged variant the rest of the pipeline
//! works with, and [`LanguageRuntimeSelector`] creates a fresh one per
//! operation. Sessions are never shared or pooled.

use tracing::debug;

use crate::error::{Error, Result};
use crate::types::FormatTag;

#[cfg(feature = "javascript")]
pub mod javascript;
#[cfg(feature = "python")]
pub mod python;

#[cfg(feature = "javascript")]
pub use javascript::JsSession;
#[cfg(feature = "python")]
pub use python::PySession;

/// Dialect-specific evaluation and invocation
pub trait ScriptSession {
    /// Dialect this session evaluates
    fn dialect(&self) -> FormatTag;

    /// Evaluate operation source so that a callable operation is available
    fn load(&mut self, source: &str) -> Result<()>;

    /// Call the loaded operation's `transform` and read the first `target_dimensions` elements
    ///
    /// A shorter result is a [`Error::ResultShape`]. Elements past the target
    /// dimension are never read, whatever their type.
    fn call_transform(&self, input: &[f64], target_dimensions: usize) -> Result<Vec<f64>>;
}

/// Number of result elements to read, given the length the script returned
pub(crate) fn readable_length(returned: usize, target_dimensions: usize) -> Result<usize> {
    if returned < target_dimensions {
        return Err(Error::ResultShape {
            expected: target_dimensions,
            actual: returned,
        });
    }
    if returned > target_dimensions {
        debug!(
            returned,
            target_dimensions,
            "Ignoring extra coordinates returned by operation"
        );
    }
    Ok(target_dimensions)
}

/// A live interpreter, exclusively owned by one compiled operation
#[derive(Debug)]
pub enum InterpreterSession {
    #[cfg(feature = "javascript")]
    JavaScript(JsSession),
    #[cfg(feature = "python")]
    Python(PySession),
}

impl InterpreterSession {
    pub fn dialect(&self) -> FormatTag {
        self.as_session().dialect()
    }

    pub fn as_session(&self) -> &dyn ScriptSession {
        match *self {
            #[cfg(feature = "javascript")]
            InterpreterSession::JavaScript(ref session) => session as &dyn ScriptSession,
            #[cfg(feature = "python")]
            InterpreterSession::Python(ref session) => session as &dyn ScriptSession,
        }
    }

    pub fn as_session_mut(&mut self) -> &mut dyn ScriptSession {
        match *self {
            #[cfg(feature = "javascript")]
            InterpreterSession::JavaScript(ref mut session) => session as &mut dyn ScriptSession,
            #[cfg(feature = "python")]
            InterpreterSession::Python(ref mut session) => session as &mut dyn ScriptSession,
        }
    }
}

/// Maps a format tag to a new interpreter session
///
/// Every compiled-in dialect is enabled by default; hosts may narrow the set
/// with [`LanguageRuntimeSelector::only`].
#[derive(Debug, Clone, Copy)]
pub struct LanguageRuntimeSelector {
    javascript: bool,
    python: bool,
}

impl LanguageRuntimeSelector {
    pub fn new() -> Self {
        Self {
            javascript: cfg!(feature = "javascript"),
            python: cfg!(feature = "python"),
        }
    }

    /// Selector restricted to `dialects` (and to what is compiled in)
    pub fn only(dialects: &[FormatTag]) -> Self {
        let compiled = Self::new();
        Self {
            javascript: compiled.javascript && dialects.contains(&FormatTag::JavaScript),
            python: compiled.python && dialects.contains(&FormatTag::Python),
        }
    }

    /// Whether sessions for `format` can be started
    pub fn supports(&self, format: FormatTag) -> bool {
        match format {
            FormatTag::JavaScript => self.javascript,
            FormatTag::Python => self.python,
        }
    }

    /// Start a fresh session for `format`
    pub fn select(&self, format: FormatTag) -> Result<InterpreterSession> {
        if !self.supports(format) {
            return Err(Error::UnsupportedFormat {
                format: format!("{} (not enabled)", format.mime_type()),
            });
        }

        let session = match format {
            #[cfg(feature = "javascript")]
            FormatTag::JavaScript => InterpreterSession::JavaScript(JsSession::new()?),
            #[cfg(feature = "python")]
            FormatTag::Python => InterpreterSession::Python(PySession::new()?),
            #[allow(unreachable_patterns)]
            other => {
                return Err(Error::UnsupportedFormat {
                    format: format!("{} (not enabled)", other.mime_type()),
                })
            }
        };

        debug!(dialect = %format, "Interpreter session started");
        Ok(session)
    }
}

impl Default for LanguageRuntimeSelector {
    fn default() -> Self {
        Self::new()
    }
}
