//! HTTP error catalog and JSON:API error rendering.
//!
//! The pieces, leaf first:
//!
//! - [`catalog`]: the fixed table of 4xx/5xx error kinds.
//! - [`descriptor`]: one JSON:API error object.
//! - [`kigen`]: [`ErrorTypeRegistry`], one [`ErrorType`] handle per catalog entry.
//! - [`registry`]: [`MappingRegistry`], failure identity to handle, plus a fallback.
//! - [`resolver`] / [`serializer`]: the `{"errors": [...]}` envelope, full or short.
//!
//! ```
//! use std::sync::Arc;
//! use jsonapi_errors_core::{ErrorTypeRegistry, MappingRegistry, Resolver};
//!
//! let registry = MappingRegistry::new(Arc::new(ErrorTypeRegistry::loaded()));
//! registry.set_fallback(500u16).unwrap();
//!
//! #[derive(Debug, thiserror::Error)]
//! #[error("upstream timed out")]
//! struct Timeout;
//!
//! let handle = registry.lookup_error(&Timeout).unwrap();
//! let rendered = Resolver::from(handle.descriptor()).render(true).unwrap();
//! assert_eq!(rendered.status.code(), Some(500));
//! ```

pub mod catalog;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod helpers;
pub mod kigen;
pub mod registry;
pub mod resolver;
pub mod serializer;

pub use catalog::{CatalogEntry, ErrorClass};
pub use config::Config;
pub use descriptor::{Descriptor, DescriptorAttrs, Links, Source, Status};
pub use error::{ErrorCode, JsonApiError};
pub use helpers::{
    handle_dyn_error, handle_error, render, render_error, OriginalError, RenderableError,
};
pub use kigen::{ErrorKey, ErrorType, ErrorTypeRegistry};
pub use registry::{ErrorRef, FailureId, FailureType, MappingRegistry};
pub use resolver::{Rendered, Resolver};
pub use serializer::JsonApiSerializer;
