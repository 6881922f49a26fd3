//! Entry points for code that turns failures into responses.
//!
//! The transport is not handled here: every function returns a [`Rendered`]
//! status and body for the caller to send.

use std::error::Error;

use serde_json::{json, Value};

use crate::descriptor::{Descriptor, Status};
use crate::error::JsonApiError;
use crate::kigen::ErrorType;
use crate::registry::MappingRegistry;
use crate::resolver::{Rendered, Resolver};

/// Something that can be rendered: a built descriptor or a catalog handle.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderableError {
    Descriptor(Descriptor),
    Type(ErrorType),
}

impl RenderableError {
    pub fn into_descriptor(self) -> Descriptor {
        match self {
            RenderableError::Descriptor(descriptor) => descriptor,
            RenderableError::Type(handle) => handle.descriptor(),
        }
    }
}

impl From<Descriptor> for RenderableError {
    fn from(descriptor: Descriptor) -> Self {
        RenderableError::Descriptor(descriptor)
    }
}

impl From<ErrorType> for RenderableError {
    fn from(handle: ErrorType) -> Self {
        RenderableError::Type(handle)
    }
}

/// How much of the original failure to copy into `meta`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OriginalError {
    #[default]
    Omit,
    /// `original_error` (type name) and `message`.
    Summary,
    /// `Summary` plus `causes`, the `source()` chain.
    FullTrace,
}

/// Render a batch of descriptors. The status is the first descriptor's.
pub fn render(
    errors: impl IntoIterator<Item = Descriptor>,
    short: bool,
) -> Result<Rendered, JsonApiError> {
    Resolver::from_errors(errors)?.render(short)
}

/// Render one error, optionally overriding the reported status.
pub fn render_error(
    error: impl Into<RenderableError>,
    status: Option<Status>,
    short: bool,
) -> Result<Rendered, JsonApiError> {
    let mut rendered = Resolver::from(error.into().into_descriptor()).render(short)?;
    if let Some(status) = status {
        rendered.status = status;
    }
    Ok(rendered)
}

/// Resolve `failure` through `registry` and render it.
///
/// A failure that is already a [`Descriptor`] is rendered as-is. Anything
/// else goes through [`MappingRegistry::lookup_error`]; when neither a
/// mapping nor a fallback exists this fails with
/// [`JsonApiError::UnresolvableFailure`].
pub fn handle_error<E>(
    registry: &MappingRegistry,
    failure: &E,
    original: OriginalError,
    short: bool,
) -> Result<Rendered, JsonApiError>
where
    E: Error + 'static,
{
    respond(
        registry,
        failure,
        Some(std::any::type_name::<E>()),
        original,
        short,
    )
}

/// [`handle_error`] for failures whose concrete type is erased, such as
/// `Box<dyn Error>`. Resolution still uses the runtime type. The
/// `original_error` meta names the matched mapping type and is left out when
/// the fallback applies.
pub fn handle_dyn_error(
    registry: &MappingRegistry,
    failure: &(dyn Error + 'static),
    original: OriginalError,
    short: bool,
) -> Result<Rendered, JsonApiError> {
    respond(registry, failure, None, original, short)
}

fn respond(
    registry: &MappingRegistry,
    failure: &(dyn Error + 'static),
    type_name: Option<&str>,
    original: OriginalError,
    short: bool,
) -> Result<Rendered, JsonApiError> {
    if let Some(descriptor) = failure.downcast_ref::<Descriptor>() {
        return render_error(descriptor.clone(), None, short);
    }

    let (handle, type_name) = match registry.find_mapping(failure) {
        Some((ty, handle)) => (handle, type_name.or(Some(ty.name()))),
        None => {
            let handle = registry.lookup_error(failure).ok_or_else(|| {
                JsonApiError::UnresolvableFailure {
                    failure: type_name.map_or_else(|| failure.to_string(), str::to_string),
                }
            })?;
            (handle, type_name)
        }
    };

    let mut descriptor = handle.descriptor();
    attach_original(&mut descriptor, failure, type_name, original);
    render_error(descriptor, None, short)
}

fn attach_original(
    descriptor: &mut Descriptor,
    failure: &(dyn Error + 'static),
    type_name: Option<&str>,
    original: OriginalError,
) {
    if original == OriginalError::Omit {
        return;
    }

    let meta = &mut descriptor.meta;
    if let Some(type_name) = type_name {
        meta.insert("original_error".into(), json!(type_name));
    }
    meta.insert("message".into(), json!(failure.to_string()));

    if original == OriginalError::FullTrace {
        let mut causes = Vec::new();
        let mut source = failure.source();
        while let Some(cause) = source {
            causes.push(Value::String(cause.to_string()));
            source = cause.source();
        }
        meta.insert("causes".into(), Value::Array(causes));
    }
}
