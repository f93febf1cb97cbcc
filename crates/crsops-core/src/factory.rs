//! Coordinate operation factory backed by a remote code service
//!
//! Construction runs fetch, select, compile and wrap in that order. Any stage
//! failure surfaces as [`Error::OperationConstructionFailed`] with the stage
//! error kept as its source.

use std::fmt;

use tracing::{info, instrument};

use crate::compiler::DynamicTransformCompiler;
use crate::error::{Error, Result};
use crate::http::{CodeSource, HttpClientConfig, TransformCodeClient};
use crate::runtime::LanguageRuntimeSelector;
use crate::transform::{MathTransform, ScriptTransform};
use crate::types::{
    FormatTag, OperationHints, OperationMetadata, OperationMethod, OperationRequest,
    ReferenceSystemDescriptor,
};

/// A named, dimensioned transform between two reference systems
pub struct CoordinateOperation {
    metadata: OperationMetadata,
    source: ReferenceSystemDescriptor,
    target: ReferenceSystemDescriptor,
    transform: Box<dyn MathTransform>,
}

impl CoordinateOperation {
    /// Bundle a transform with its reference systems
    ///
    /// Fails when the transform's dimensions differ from the descriptors'.
    pub fn new(
        metadata: OperationMetadata,
        source: ReferenceSystemDescriptor,
        target: ReferenceSystemDescriptor,
        transform: Box<dyn MathTransform>,
    ) -> Result<Self> {
        if transform.source_dimensions() != source.dimension() {
            return Err(Error::DimensionMismatch {
                expected: source.dimension(),
                actual: transform.source_dimensions(),
            });
        }
        if transform.target_dimensions() != target.dimension() {
            return Err(Error::DimensionMismatch {
                expected: target.dimension(),
                actual: transform.target_dimensions(),
            });
        }

        Ok(Self {
            metadata,
            source,
            target,
            transform,
        })
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn metadata(&self) -> &OperationMetadata {
        &self.metadata
    }

    pub fn source(&self) -> &ReferenceSystemDescriptor {
        &self.source
    }

    pub fn target(&self) -> &ReferenceSystemDescriptor {
        &self.target
    }

    pub fn transform(&self) -> &dyn MathTransform {
        self.transform.as_ref()
    }
}

impl fmt::Debug for CoordinateOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoordinateOperation")
            .field("metadata", &self.metadata)
            .field("source_dimension", &self.source.dimension())
            .field("target_dimension", &self.target.dimension())
            .field("transform", &self.transform)
            .finish()
    }
}

/// Creates coordinate operations between reference systems
pub trait CoordinateOperationFactory {
    /// Identity of whoever provides the operations
    fn vendor(&self) -> &str;

    /// Create an operation in the default dialect
    fn create_operation(
        &self,
        source: &ReferenceSystemDescriptor,
        target: &ReferenceSystemDescriptor,
    ) -> Result<CoordinateOperation> {
        self.create_operation_with_format(source, target, FormatTag::default())
    }

    fn create_operation_with_format(
        &self,
        source: &ReferenceSystemDescriptor,
        target: &ReferenceSystemDescriptor,
        format: FormatTag,
    ) -> Result<CoordinateOperation>;

    fn create_operation_with_method(
        &self,
        source: &ReferenceSystemDescriptor,
        target: &ReferenceSystemDescriptor,
        method: &OperationMethod,
    ) -> Result<CoordinateOperation>;

    fn create_concatenated_operation(
        &self,
        name: &str,
        operations: Vec<CoordinateOperation>,
    ) -> Result<CoordinateOperation>;

    fn create_defining_conversion(
        &self,
        name: &str,
        method: &OperationMethod,
        parameters: &[(String, f64)],
    ) -> Result<CoordinateOperation>;
}

/// Factory that asks a code service for each operation
#[derive(Debug, Clone)]
pub struct RemoteOperationFactory<S = TransformCodeClient> {
    code_source: S,
    selector: LanguageRuntimeSelector,
    compiler: DynamicTransformCompiler,
}

impl RemoteOperationFactory<TransformCodeClient> {
    /// Factory for the code service at `service_url`
    pub fn connect(service_url: &str, config: HttpClientConfig) -> Result<Self> {
        Ok(Self::new(TransformCodeClient::new(service_url, config)?))
    }
}

impl<S: CodeSource> RemoteOperationFactory<S> {
    pub fn new(code_source: S) -> Self {
        Self {
            code_source,
            selector: LanguageRuntimeSelector::new(),
            compiler: DynamicTransformCompiler::new(),
        }
    }

    /// Replace the runtime selector, e.g. to allow fewer dialects
    pub fn with_selector(mut self, selector: LanguageRuntimeSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn code_source(&self) -> &S {
        &self.code_source
    }

    pub fn selector(&self) -> &LanguageRuntimeSelector {
        &self.selector
    }

    /// Create an operation from a raw format tag
    ///
    /// Unknown tags fail before any request is sent.
    pub fn create_operation_for_tag(
        &self,
        source: &ReferenceSystemDescriptor,
        target: &ReferenceSystemDescriptor,
        tag: &str,
    ) -> Result<CoordinateOperation> {
        let request = OperationRequest::from_tag(source.clone(), target.clone(), tag)
            .map_err(Error::construction_failed)?;
        self.build(&request).map_err(Error::construction_failed)
    }

    /// Create an operation, passing extra selection hints to the service
    pub fn create_operation_with_hints(
        &self,
        source: &ReferenceSystemDescriptor,
        target: &ReferenceSystemDescriptor,
        format: FormatTag,
        hints: OperationHints,
    ) -> Result<CoordinateOperation> {
        let request = OperationRequest::new(source.clone(), target.clone(), format).with_hints(hints);
        self.build(&request).map_err(Error::construction_failed)
    }

    #[instrument(skip_all, fields(format = %request.format()))]
    fn build(&self, request: &OperationRequest) -> Result<CoordinateOperation> {
        let source_dim = request.source().dimension();
        let target_dim = request.target().dimension();

        let fetched = self.code_source.fetch(request)?;
        let session = self.selector.select(request.format())?;
        let compiled = self.compiler.compile(session, fetched, source_dim, target_dim)?;
        let transform = ScriptTransform::new(compiled);

        let operation = CoordinateOperation::new(
            OperationMetadata::new(request.format(), self.code_source.vendor()),
            request.source().clone(),
            request.target().clone(),
            Box::new(transform),
        )?;

        info!(
            name = operation.name(),
            source_dimension = source_dim,
            target_dimension = target_dim,
            "Coordinate operation created"
        );
        Ok(operation)
    }
}

impl<S: CodeSource> CoordinateOperationFactory for RemoteOperationFactory<S> {
    fn vendor(&self) -> &str {
        self.code_source.vendor()
    }

    fn create_operation_with_format(
        &self,
        source: &ReferenceSystemDescriptor,
        target: &ReferenceSystemDescriptor,
        format: FormatTag,
    ) -> Result<CoordinateOperation> {
        self.create_operation_with_hints(source, target, format, OperationHints::default())
    }

    fn create_operation_with_method(
        &self,
        _source: &ReferenceSystemDescriptor,
        _target: &ReferenceSystemDescriptor,
        _method: &OperationMethod,
    ) -> Result<CoordinateOperation> {
        Err(Error::unsupported("operation by method"))
    }

    fn create_concatenated_operation(
        &self,
        _name: &str,
        _operations: Vec<CoordinateOperation>,
    ) -> Result<CoordinateOperation> {
        Err(Error::unsupported("concatenated operation"))
    }

    fn create_defining_conversion(
        &self,
        _name: &str,
        _method: &OperationMethod,
        _parameters: &[(String, f64)],
    ) -> Result<CoordinateOperation> {
        Err(Error::unsupported("defining conversion"))
    }
}
