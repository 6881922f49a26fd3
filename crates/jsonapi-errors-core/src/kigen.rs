//! Error type registry.
//!
//! [`ErrorTypeRegistry`] materializes one [`ErrorType`] handle per catalog
//! entry and indexes it by status, symbolic code and display name. Loading is
//! idempotent and safe under concurrent first calls: the indexes are built
//! exactly once and become visible to every reader only when complete.
//! Lookups before loading return `None`.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

use crate::catalog::{self, CatalogEntry};
use crate::descriptor::{Descriptor, DescriptorAttrs, Status};
use crate::error::JsonApiError;

/// Key for looking up an error type: a status or a symbolic code / name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKey<'a> {
    Status(u16),
    Symbol(&'a str),
}

impl From<u16> for ErrorKey<'_> {
    fn from(status: u16) -> Self {
        ErrorKey::Status(status)
    }
}

impl<'a> From<&'a str> for ErrorKey<'a> {
    fn from(symbol: &'a str) -> Self {
        ErrorKey::Symbol(symbol)
    }
}

impl<'a> From<&'a String> for ErrorKey<'a> {
    fn from(symbol: &'a String) -> Self {
        ErrorKey::Symbol(symbol)
    }
}

impl fmt::Display for ErrorKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKey::Status(status) => write!(f, "{status}"),
            ErrorKey::Symbol(symbol) => f.write_str(symbol),
        }
    }
}

/// Handle bound to one catalog entry.
///
/// Acts as a [`Descriptor`] factory pre-filling `code`, `title` and `status`
/// from the entry. Two handles are equal only when they are bound to the
/// same entry.
#[derive(Clone, Copy)]
pub struct ErrorType {
    entry: &'static CatalogEntry,
}

impl ErrorType {
    fn new(entry: &'static CatalogEntry) -> Self {
        Self { entry }
    }

    pub fn status(&self) -> u16 {
        self.entry.status
    }

    pub fn code(&self) -> &'static str {
        self.entry.code
    }

    pub fn name(&self) -> &'static str {
        self.entry.name
    }

    /// Build a descriptor with the catalog defaults.
    pub fn descriptor(&self) -> Descriptor {
        self.instantiate(DescriptorAttrs::default())
    }

    /// Build a descriptor with the catalog defaults, then apply `attrs`.
    pub fn instantiate(&self, attrs: DescriptorAttrs) -> Descriptor {
        let mut descriptor = Descriptor {
            status: Status::new(self.entry.status),
            code: self.entry.code.to_string(),
            title: self.entry.message.to_string(),
            ..Descriptor::default()
        };
        descriptor.apply(attrs);
        descriptor
    }
}

impl PartialEq for ErrorType {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.entry, other.entry)
    }
}

impl Eq for ErrorType {}

impl Hash for ErrorType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.entry.status.hash(state);
    }
}

impl fmt::Debug for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ErrorType({} {})", self.entry.status, self.entry.name)
    }
}

struct TypeIndex {
    by_status: HashMap<u16, ErrorType>,
    by_symbol: HashMap<&'static str, ErrorType>,
    by_name: HashMap<&'static str, ErrorType>,
}

/// Lazily loaded registry of catalog handles.
#[derive(Default)]
pub struct ErrorTypeRegistry {
    index: OnceLock<TypeIndex>,
    materialized: AtomicUsize,
}

impl ErrorTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry that is already loaded.
    pub fn loaded() -> Self {
        let registry = Self::new();
        registry.load_errors();
        registry
    }

    /// Materialize every catalog entry. Calls after the first are no-ops.
    pub fn load_errors(&self) {
        self.index.get_or_init(|| {
            let mut index = TypeIndex {
                by_status: HashMap::new(),
                by_symbol: HashMap::new(),
                by_name: HashMap::new(),
            };

            for entry in catalog::entries() {
                if index.by_status.contains_key(&entry.status) {
                    continue;
                }
                let handle = ErrorType::new(entry);
                self.materialized.fetch_add(1, Ordering::Relaxed);

                index.by_status.insert(entry.status, handle);
                index.by_symbol.insert(entry.code, handle);
                index.by_name.insert(entry.name, handle);
            }

            tracing::debug!(count = index.by_status.len(), "loaded error types");
            index
        });
    }

    pub fn is_loaded(&self) -> bool {
        self.index.get().is_some()
    }

    /// Look up a handle by status, then symbolic code, then display name.
    ///
    /// Returns `None` when the key is unknown or the registry is not loaded.
    pub fn fetch_error_type<'a>(&self, key: impl Into<ErrorKey<'a>>) -> Option<ErrorType> {
        let index = self.index.get()?;
        match key.into() {
            ErrorKey::Status(status) => index.by_status.get(&status).copied(),
            ErrorKey::Symbol(symbol) => index
                .by_symbol
                .get(symbol)
                .or_else(|| index.by_name.get(symbol))
                .copied(),
        }
    }

    /// Like [`fetch_error_type`](Self::fetch_error_type), but reports why a
    /// handle could not be produced.
    pub fn require<'a>(&self, key: impl Into<ErrorKey<'a>>) -> Result<ErrorType, JsonApiError> {
        if !self.is_loaded() {
            return Err(JsonApiError::RegistryNotLoaded);
        }
        let key = key.into();
        self.fetch_error_type(key)
            .ok_or_else(|| JsonApiError::unknown(key))
    }

    /// All handles in catalog order. Empty when not loaded.
    pub fn error_types(&self) -> Vec<ErrorType> {
        if !self.is_loaded() {
            return Vec::new();
        }
        catalog::entries()
            .filter_map(|entry| self.fetch_error_type(entry.status))
            .collect()
    }
}
