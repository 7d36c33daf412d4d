//! Request validation pipe
//!
//! A [`Pipe`] sits between the transport layer and a handler argument. At
//! transform time it picks a schema, validates the incoming payload against
//! it, and returns the (possibly coerced) value or a [`PipeError`].
//!
//! Schema selection precedence:
//!
//! 1. Request-bound pipe with a framework-resolved argument type: the
//!    validation group is inferred from the request method and derivation
//!    is non-forced, so undeclared types pass through.
//! 2. An explicitly bound schema is used as-is.
//! 3. An explicitly bound type always yields a schema (forced derivation),
//!    even when the type declared nothing.
//! 4. A framework-resolved argument type on an unbound pipe derives
//!    non-forced, like case 1 but with the configured group.
//! 5. Otherwise the payload passes through untouched.

mod errors;
mod metadata;
mod options;

pub use errors::PipeError;
pub use metadata::{ArgumentKind, ArgumentMetadata};
pub use options::{PipeConfigError, PipeOptions};

use std::sync::Arc;

use serde_json::Value;

use crate::group::ValidationGroup;
use crate::observability::Logger;
use crate::registry::{self, SchemaRegistry, TypeRef};
use crate::schema::{Schema, SchemaOptions};

/// Validation defaults applied at the pipe boundary: collect every error
/// and tolerate undeclared properties unless a schema says otherwise.
pub(crate) const PIPE_VALIDATE_DEFAULTS: SchemaOptions = SchemaOptions {
    abort_early: Some(false),
    allow_unknown: Some(true),
    convert: None,
};

/// The request method and nothing else; all the pipe needs to infer a
/// validation group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    method: String,
}

impl RequestInfo {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into().to_ascii_uppercase(),
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }
}

/// A request a pipe was constructed for, one variant per transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBinding {
    /// Plain HTTP request
    Http(RequestInfo),
    /// Secondary-protocol envelope wrapping an inner request
    Rpc { request: RequestInfo },
}

impl RequestBinding {
    pub fn http(method: impl Into<String>) -> Self {
        RequestBinding::Http(RequestInfo::new(method))
    }

    pub fn rpc(method: impl Into<String>) -> Self {
        RequestBinding::Rpc {
            request: RequestInfo::new(method),
        }
    }

    pub fn method(&self) -> &str {
        match self {
            RequestBinding::Http(info) => info.method(),
            RequestBinding::Rpc { request } => request.method(),
        }
    }

    /// Maps the request method onto a validation group: creation methods
    /// validate with CREATE, mutation methods with UPDATE, everything
    /// else with the default group.
    pub fn inferred_group(&self) -> ValidationGroup {
        match self.method() {
            "POST" => ValidationGroup::Create,
            "PUT" | "PATCH" => ValidationGroup::Update,
            _ => ValidationGroup::Default,
        }
    }
}

/// What a pipe was bound to at construction.
#[derive(Debug, Clone)]
enum Binding {
    Unbound,
    Schema(Schema),
    Type(TypeRef),
    Request(RequestBinding),
}

/// Which registry a pipe derives schemas from.
#[derive(Debug, Clone)]
enum RegistryRef {
    Global,
    Shared(Arc<SchemaRegistry>),
}

impl RegistryRef {
    fn get(&self) -> &SchemaRegistry {
        match self {
            RegistryRef::Global => registry::global(),
            RegistryRef::Shared(shared) => shared,
        }
    }
}

/// Validates handler arguments against declared or explicitly bound schemas.
#[derive(Debug, Clone)]
pub struct Pipe {
    binding: Binding,
    options: PipeOptions,
    registry: RegistryRef,
}

impl Pipe {
    /// An unbound pipe with default options. Validates arguments whose
    /// types declared schemas; passes everything else through.
    pub fn unbound() -> Self {
        Self {
            binding: Binding::Unbound,
            options: PipeOptions::default(),
            registry: RegistryRef::Global,
        }
    }

    /// An unbound pipe with explicit options.
    pub fn new(options: PipeOptions) -> Result<Self, PipeConfigError> {
        options.validate()?;
        Ok(Self {
            binding: Binding::Unbound,
            options,
            registry: RegistryRef::Global,
        })
    }

    /// A pipe that validates every payload against one fixed schema.
    pub fn with_schema(schema: Schema, options: PipeOptions) -> Result<Self, PipeConfigError> {
        options.validate()?;
        Ok(Self {
            binding: Binding::Schema(schema),
            options,
            registry: RegistryRef::Global,
        })
    }

    /// A pipe bound to a specific type. Derivation is forced, so the
    /// pipe validates even when the type declared nothing.
    pub fn for_type<T: 'static>(options: PipeOptions) -> Result<Self, PipeConfigError> {
        options.validate()?;
        Ok(Self {
            binding: Binding::Type(TypeRef::of::<T>()),
            options,
            registry: RegistryRef::Global,
        })
    }

    /// A request-scoped pipe. The validation group is inferred from the
    /// request method instead of taken from options.
    pub fn for_request(request: RequestBinding) -> Self {
        Self {
            binding: Binding::Request(request),
            options: PipeOptions::default(),
            registry: RegistryRef::Global,
        }
    }

    /// A request-scoped pipe carrying shared options (error reporting
    /// flags still apply; the group does not).
    pub fn for_request_with(
        request: RequestBinding,
        options: PipeOptions,
    ) -> Result<Self, PipeConfigError> {
        options.validate()?;
        Ok(Self {
            binding: Binding::Request(request),
            options,
            registry: RegistryRef::Global,
        })
    }

    /// Swaps the process-wide registry for a caller-owned one.
    pub fn with_registry(mut self, registry: Arc<SchemaRegistry>) -> Self {
        self.registry = RegistryRef::Shared(registry);
        self
    }

    fn group(&self) -> &ValidationGroup {
        self.options.group.as_ref().unwrap_or(&ValidationGroup::Default)
    }

    fn resolve_schema(&self, metadata: &ArgumentMetadata) -> Result<Option<Schema>, PipeError> {
        if let Binding::Request(request) = &self.binding {
            if let Some(metatype) = metadata.metatype {
                let group = request.inferred_group();
                return Ok(self.registry.get().schema_for(metatype, false, &group)?);
            }
            return Ok(None);
        }

        match &self.binding {
            Binding::Schema(schema) => return Ok(Some(schema.clone())),
            Binding::Type(ty) => {
                return Ok(self.registry.get().schema_for(*ty, true, self.group())?)
            }
            _ => {}
        }

        if let Some(metatype) = metadata.metatype {
            return Ok(self.registry.get().schema_for(metatype, false, self.group())?);
        }

        Ok(None)
    }

    /// Validates a payload for the given argument. Returns the validated
    /// (possibly coerced) value, or the payload unchanged when no schema
    /// applies.
    pub fn transform(
        &self,
        payload: Value,
        metadata: &ArgumentMetadata,
    ) -> Result<Value, PipeError> {
        let schema = match self.resolve_schema(metadata)? {
            Some(schema) => schema,
            None => return Ok(payload),
        };

        match schema.validate(&payload, &PIPE_VALIDATE_DEFAULTS) {
            Ok(validated) => Ok(validated),
            Err(failure) => {
                let reasons = failure.reasons();
                Logger::warn(
                    "request_validation_failed",
                    &[("kind", metadata.kind.as_str()), ("reasons", &reasons)],
                );

                if let Some(custom) = failure.custom_error() {
                    return Err(PipeError::Custom(custom.clone()));
                }

                let item = match &metadata.data {
                    Some(name) => format!("item '{name}' "),
                    None => String::new(),
                };
                let formatted = format!(
                    "Request validation of {} {}failed, because: {}",
                    metadata.kind, item, reasons
                );

                if self.options.use_validation_error {
                    let message = if self.options.skip_error_formatting {
                        reasons
                    } else {
                        formatted
                    };
                    Err(PipeError::Validation { message, failure })
                } else {
                    Err(PipeError::BadRequest(formatted))
                }
            }
        }
    }
}

impl Default for Pipe {
    fn default() -> Self {
        Self::unbound()
    }
}

/// Builds request-scoped pipes sharing one options bag, typically one
/// factory per application wired into the transport layer.
#[derive(Debug, Clone)]
pub struct PipeFactory {
    options: PipeOptions,
    registry: RegistryRef,
}

impl PipeFactory {
    pub fn new(options: PipeOptions) -> Result<Self, PipeConfigError> {
        options.validate()?;
        Ok(Self {
            options,
            registry: RegistryRef::Global,
        })
    }

    pub fn with_registry(mut self, registry: Arc<SchemaRegistry>) -> Self {
        self.registry = RegistryRef::Shared(registry);
        self
    }

    /// A pipe for one request, carrying the factory's options.
    pub fn request_pipe(&self, request: RequestBinding) -> Pipe {
        Pipe {
            binding: Binding::Request(request),
            options: self.options.clone(),
            registry: self.registry.clone(),
        }
    }

    /// An unbound pipe carrying the factory's options.
    pub fn pipe(&self) -> Pipe {
        Pipe {
            binding: Binding::Unbound,
            options: self.options.clone(),
            registry: self.registry.clone(),
        }
    }
}
