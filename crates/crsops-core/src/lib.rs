//! crsops Core - remotely generated coordinate operations
//!
//! This crate asks a code service for the source of a coordinate
//! operation between two reference systems, evaluates that source in an
//! embedded interpreter and exposes it as an ordinary [`MathTransform`].
//!
//! # Main Components
//!
//! - **HTTP client**: [`TransformCodeClient`] fetches operation source over HTTP GET
//! - **Runtimes**: QuickJS (`javascript` feature) and CPython (`python` feature) sessions
//! - **Compiler and adapter**: load source into a session, invoke it per point
//! - **Factory**: [`RemoteOperationFactory`] runs the whole pipeline
//!
//! # Example
//!
//! ```no_run
//! use crsops_core::{
//!     CoordinateOperationFactory, HttpClientConfig, ReferenceSystemDescriptor,
//!     RemoteOperationFactory, Result,
//! };
//!
//! fn example() -> Result<()> {
//!     let factory = RemoteOperationFactory::connect(
//!         "http://localhost:8080/operation",
//!         HttpClientConfig::default(),
//!     )?;
//!     let source = ReferenceSystemDescriptor::new("GEOGCRS[\"WGS 84\"]", 2)?;
//!     let target = ReferenceSystemDescriptor::new("PROJCRS[\"WGS 84 / Pseudo-Mercator\"]", 2)?;
//!
//!     let operation = factory.create_operation(&source, &target)?;
//!     let projected = operation.transform().transform(&[2.3522, 48.8566])?;
//!     println!("{:?}", projected);
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod compiler;
pub mod error;
pub mod factory;
pub mod http;
pub mod runtime;
pub mod transform;
pub mod types;

pub use adapter::InvocationAdapter;
pub use compiler::{CompiledOperation, DynamicTransformCompiler};
pub use error::{Error, ErrorKind, Result};
pub use factory::{CoordinateOperation, CoordinateOperationFactory, RemoteOperationFactory};
pub use http::{CodeSource, HttpClientConfig, TransformCodeClient};
pub use runtime::{InterpreterSession, LanguageRuntimeSelector, ScriptSession};
pub use transform::{MathTransform, Matrix, ScriptTransform};
pub use types::{
    AreaOfInterest, FetchedSource, FormatTag, OperationHints, OperationMetadata, OperationMethod,
    OperationRequest, ReferenceSystemDescriptor,
};

/// Version of the crsops core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
