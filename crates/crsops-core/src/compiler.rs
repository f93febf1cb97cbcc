//! Compilation of fetched source into an interpreter-resident operation

use tracing::debug;

use crate::error::{Error, Result};
use crate::runtime::InterpreterSession;
use crate::types::{FetchedSource, FormatTag};

/// A loaded operation together with the session that owns it
///
/// Dropping the operation tears the session down.
#[derive(Debug)]
pub struct CompiledOperation {
    session: InterpreterSession,
    source_dimensions: usize,
    target_dimensions: usize,
}

impl CompiledOperation {
    pub fn dialect(&self) -> FormatTag {
        self.session.dialect()
    }

    pub fn source_dimensions(&self) -> usize {
        self.source_dimensions
    }

    pub fn target_dimensions(&self) -> usize {
        self.target_dimensions
    }

    pub(crate) fn session(&self) -> &InterpreterSession {
        &self.session
    }
}

/// Evaluates fetched source inside a session
#[derive(Debug, Clone, Copy, Default)]
pub struct DynamicTransformCompiler;

impl DynamicTransformCompiler {
    pub fn new() -> Self {
        Self
    }

    /// Load `source` into `session`; the source text is discarded afterwards
    pub fn compile(
        &self,
        mut session: InterpreterSession,
        source: FetchedSource,
        source_dimensions: usize,
        target_dimensions: usize,
    ) -> Result<CompiledOperation> {
        let dialect = session.dialect();
        if source.format() != dialect {
            return Err(Error::Compilation {
                dialect,
                message: format!("received {} source for a {} session", source.format(), dialect),
            });
        }

        session.as_session_mut().load(source.text())?;
        debug!(
            %dialect,
            source_dimensions,
            target_dimensions,
            bytes = source.text().len(),
            "Operation compiled"
        );

        Ok(CompiledOperation {
            session,
            source_dimensions,
            target_dimensions,
        })
    }
}
