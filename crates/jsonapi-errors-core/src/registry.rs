//! Mapping from application failures to catalog error types.
//!
//! Values are resolved to [`ErrorType`] handles when they are installed, so an
//! unknown catalog reference is reported at configuration time. Failures are
//! matched on their runtime type, so a mapped error still resolves when it
//! arrives as `&dyn Error` or `Box<dyn Error>`.

use std::any::TypeId;
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Deserializer};

use crate::descriptor::Status;
use crate::error::JsonApiError;
use crate::kigen::{ErrorKey, ErrorType, ErrorTypeRegistry};

/// A concrete failure type, with a runtime test for type-erased errors.
#[derive(Clone, Copy)]
pub struct FailureType {
    id: TypeId,
    name: &'static str,
    matches: fn(&(dyn Error + 'static)) -> bool,
}

fn is_type<E: Error + 'static>(failure: &(dyn Error + 'static)) -> bool {
    failure.is::<E>()
}

impl FailureType {
    pub fn of<E: Error + 'static>() -> Self {
        Self {
            id: TypeId::of::<E>(),
            name: std::any::type_name::<E>(),
            matches: is_type::<E>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether `failure` is exactly this type.
    pub fn matches(&self, failure: &(dyn Error + 'static)) -> bool {
        (self.matches)(failure)
    }
}

impl PartialEq for FailureType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FailureType {}

impl Hash for FailureType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FailureType({})", self.name)
    }
}

/// Identity of a failure kind.
///
/// Either the Rust type of the failure or a configured name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FailureId {
    Type(FailureType),
    Named(String),
}

impl FailureId {
    pub fn of<E: Error + 'static>() -> Self {
        FailureId::Type(FailureType::of::<E>())
    }

    pub fn named(name: impl Into<String>) -> Self {
        FailureId::Named(name.into())
    }

    pub fn name(&self) -> &str {
        match self {
            FailureId::Type(ty) => ty.name(),
            FailureId::Named(name) => name,
        }
    }
}

impl fmt::Display for FailureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<&str> for FailureId {
    fn from(name: &str) -> Self {
        FailureId::named(name)
    }
}

impl From<String> for FailureId {
    fn from(name: String) -> Self {
        FailureId::Named(name)
    }
}

/// Reference to a catalog error type: a resolved handle, a status, or a
/// symbolic code / display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorRef {
    Handle(ErrorType),
    Status(u16),
    Symbol(String),
}

impl fmt::Display for ErrorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorRef::Handle(handle) => f.write_str(handle.name()),
            ErrorRef::Status(status) => write!(f, "{status}"),
            ErrorRef::Symbol(symbol) => f.write_str(symbol),
        }
    }
}

impl From<ErrorType> for ErrorRef {
    fn from(handle: ErrorType) -> Self {
        ErrorRef::Handle(handle)
    }
}

impl From<u16> for ErrorRef {
    fn from(status: u16) -> Self {
        ErrorRef::Status(status)
    }
}

impl From<&str> for ErrorRef {
    fn from(symbol: &str) -> Self {
        ErrorRef::Symbol(symbol.to_string())
    }
}

impl From<String> for ErrorRef {
    fn from(symbol: String) -> Self {
        ErrorRef::Symbol(symbol)
    }
}

/// Numbers and numeric strings (`"404"`) decode to [`ErrorRef::Status`];
/// anything else is a symbol.
impl<'de> Deserialize<'de> for ErrorRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Status(u16),
            Symbol(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Status(status) => ErrorRef::Status(status),
            Raw::Symbol(symbol) => match Status::parse(&symbol).ok().and_then(|s| s.code()) {
                Some(status) => ErrorRef::Status(status),
                None => ErrorRef::Symbol(symbol),
            },
        })
    }
}

/// Failure-to-error-type table plus a fallback.
///
/// Construct one per process (or per test) and share it by reference.
/// Mutation replaces state wholesale; readers never observe a partially
/// installed table.
pub struct MappingRegistry {
    types: Arc<ErrorTypeRegistry>,
    mapping: RwLock<Arc<HashMap<FailureId, ErrorType>>>,
    fallback: RwLock<Option<ErrorType>>,
}

impl Default for MappingRegistry {
    fn default() -> Self {
        Self::new(Arc::new(ErrorTypeRegistry::new()))
    }
}

impl MappingRegistry {
    pub fn new(types: Arc<ErrorTypeRegistry>) -> Self {
        Self {
            types,
            mapping: RwLock::new(Arc::new(HashMap::new())),
            fallback: RwLock::new(None),
        }
    }

    pub fn types(&self) -> &ErrorTypeRegistry {
        &self.types
    }

    /// Resolve a reference to a handle through the type registry.
    pub fn resolve(&self, value: &ErrorRef) -> Result<ErrorType, JsonApiError> {
        match value {
            ErrorRef::Handle(handle) => Ok(*handle),
            ErrorRef::Status(status) => self.types.require(*status),
            ErrorRef::Symbol(symbol) => self.types.require(ErrorKey::Symbol(symbol)),
        }
    }

    pub fn set_fallback(&self, value: impl Into<ErrorRef>) -> Result<(), JsonApiError> {
        let handle = self.resolve(&value.into())?;
        *self
            .fallback
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(handle);

        tracing::debug!(fallback = ?handle, "installed fallback error type");
        Ok(())
    }

    pub fn fallback(&self) -> Option<ErrorType> {
        *self.fallback.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the whole mapping table.
    ///
    /// Either every entry resolves and the new table is installed, or the
    /// first unresolved entry is reported and the previous table stays.
    pub fn set_mapping<I, K, V>(&self, table: I) -> Result<(), JsonApiError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<FailureId>,
        V: Into<ErrorRef>,
    {
        let mut resolved = HashMap::new();
        for (failure, value) in table {
            let failure = failure.into();
            let value = value.into();
            let handle = self.resolve(&value).map_err(|err| match err {
                JsonApiError::UnknownCatalogEntry { key, .. } => {
                    JsonApiError::unknown_mapping(key, &failure)
                }
                other => other,
            })?;
            resolved.insert(failure, handle);
        }

        tracing::debug!(entries = resolved.len(), "installed error mapping");
        *self.mapping.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(resolved);
        Ok(())
    }

    /// Read-only snapshot of the installed table.
    pub fn mapping(&self) -> Arc<HashMap<FailureId, ErrorType>> {
        Arc::clone(&self.mapping.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// The mapping entry whose type is the runtime type of `failure`.
    ///
    /// Type entries match exactly, so at most one entry applies.
    pub fn find_mapping(
        &self,
        failure: &(dyn Error + 'static),
    ) -> Option<(FailureType, ErrorType)> {
        self.mapping().iter().find_map(|(id, handle)| match id {
            FailureId::Type(ty) if ty.matches(failure) => Some((*ty, *handle)),
            _ => None,
        })
    }

    /// Resolve a failure by its runtime type: its mapping, else the fallback.
    pub fn lookup_error(&self, failure: &(dyn Error + 'static)) -> Option<ErrorType> {
        match self.find_mapping(failure) {
            Some((_, handle)) => Some(handle),
            None => self.fallback_for(failure),
        }
    }

    /// Resolve an explicit identity: its mapping, else the fallback.
    pub fn lookup_id(&self, failure: &FailureId) -> Option<ErrorType> {
        match self.mapping().get(failure) {
            Some(handle) => Some(*handle),
            None => self.fallback_for(failure),
        }
    }

    fn fallback_for<D: fmt::Display + ?Sized>(&self, failure: &D) -> Option<ErrorType> {
        let fallback = self.fallback();
        match fallback {
            Some(handle) => {
                tracing::debug!(%failure, fallback = ?handle, "no mapping, using fallback");
            }
            None => {
                tracing::warn!(%failure, "no mapping and no fallback error type");
            }
        }
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, thiserror::Error)]
    #[error("key not found")]
    struct KeyError;

    #[derive(Debug, thiserror::Error)]
    #[error("bad argument")]
    struct ArgumentError;

    #[derive(Debug, thiserror::Error)]
    #[error("something broke")]
    struct StandardError;

    fn registry() -> MappingRegistry {
        MappingRegistry::new(Arc::new(ErrorTypeRegistry::loaded()))
    }

    fn handle(registry: &MappingRegistry, key: u16) -> ErrorType {
        registry.types().fetch_error_type(key).unwrap()
    }

    #[test]
    fn test_set_fallback_with_handle() {
        let registry = registry();
        let not_found = handle(&registry, 404);
        registry.set_fallback(not_found).unwrap();
        assert_eq!(registry.fallback(), Some(not_found));
    }

    #[test]
    fn test_set_fallback_by_status_and_symbol() {
        let registry = registry();
        let not_found = handle(&registry, 404);

        registry.set_fallback(404u16).unwrap();
        assert_eq!(registry.fallback(), Some(not_found));

        registry.set_fallback("not_found").unwrap();
        assert_eq!(registry.fallback(), Some(not_found));
    }

    #[test]
    fn test_set_fallback_unknown() {
        let registry = registry();
        let err = registry.set_fallback("unknown_error").unwrap_err();
        assert!(matches!(err, JsonApiError::UnknownCatalogEntry { .. }));
        assert_eq!(registry.fallback(), None);
    }

    #[test]
    fn test_set_fallback_before_load() {
        let registry = MappingRegistry::default();
        let err = registry.set_fallback(500u16).unwrap_err();
        assert!(matches!(err, JsonApiError::RegistryNotLoaded));
    }

    #[test]
    fn test_set_mapping_resolves_statuses_and_symbols() {
        let registry = registry();
        let not_found = handle(&registry, 404);
        registry
            .set_mapping([
                (FailureId::of::<KeyError>(), ErrorRef::from(404u16)),
                (FailureId::of::<ArgumentError>(), ErrorRef::from("bad_request")),
            ])
            .unwrap();

        let mapping = registry.mapping();
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping[&FailureId::of::<KeyError>()], not_found);
        assert_eq!(mapping[&FailureId::of::<ArgumentError>()], handle(&registry, 400));
    }

    #[test]
    fn test_set_mapping_keeps_handles() {
        let registry = registry();
        let not_found = handle(&registry, 404);
        registry
            .set_mapping([(FailureId::of::<KeyError>(), not_found)])
            .unwrap();
        assert_eq!(registry.lookup_error(&KeyError), Some(not_found));
    }

    #[test]
    fn test_set_mapping_replaces_table() {
        let registry = registry();
        registry
            .set_mapping([(FailureId::of::<KeyError>(), 404u16)])
            .unwrap();
        registry
            .set_mapping([(FailureId::of::<ArgumentError>(), 400u16)])
            .unwrap();

        assert!(registry.lookup_error(&KeyError).is_none());
        assert_eq!(registry.lookup_error(&ArgumentError), Some(handle(&registry, 400)));
    }

    #[test]
    fn test_set_mapping_unknown_leaves_prior_table() {
        let registry = registry();
        registry
            .set_mapping([(FailureId::of::<KeyError>(), 404u16)])
            .unwrap();

        let err = registry
            .set_mapping([
                (FailureId::of::<ArgumentError>(), 400u16),
                (FailureId::of::<KeyError>(), 9999u16),
            ])
            .unwrap_err();

        match err {
            JsonApiError::UnknownCatalogEntry { key, failure } => {
                assert_eq!(key, "9999");
                assert!(failure.unwrap().ends_with("KeyError"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let mapping = registry.mapping();
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping[&FailureId::of::<KeyError>()], handle(&registry, 404));
    }

    #[test]
    fn test_lookup_mapped_and_fallback() {
        let registry = registry();
        registry.set_fallback("internal_server_error").unwrap();
        registry
            .set_mapping([
                (FailureId::of::<KeyError>(), "not_found"),
                (FailureId::of::<ArgumentError>(), "bad_request"),
            ])
            .unwrap();

        assert_eq!(registry.lookup_error(&KeyError), Some(handle(&registry, 404)));
        assert_eq!(
            registry.lookup_error(&StandardError),
            Some(handle(&registry, 500))
        );
    }

    #[test]
    fn test_lookup_without_fallback_is_none() {
        let registry = registry();
        registry
            .set_mapping(std::iter::empty::<(FailureId, ErrorRef)>())
            .unwrap();
        assert!(registry.lookup_error(&StandardError).is_none());
    }

    #[test]
    fn test_lookup_keys_on_type_not_value() {
        #[derive(Debug, thiserror::Error)]
        #[error("timed out after {attempt} attempts")]
        struct Timeout {
            attempt: u32,
        }

        let registry = registry();
        registry
            .set_mapping([(FailureId::of::<Timeout>(), 504u16)])
            .unwrap();

        assert_eq!(
            registry.lookup_error(&Timeout { attempt: 1 }),
            registry.lookup_error(&Timeout { attempt: 2 })
        );
    }

    #[test]
    fn test_lookup_through_type_erased_failures() {
        let registry = registry();
        registry.set_fallback(500u16).unwrap();
        registry
            .set_mapping([(FailureId::of::<KeyError>(), 404u16)])
            .unwrap();

        let not_found = Some(handle(&registry, 404));
        let boxed: Box<dyn Error> = Box::new(KeyError);
        assert_eq!(registry.lookup_error(&KeyError), not_found);
        assert_eq!(registry.lookup_error(&*boxed), not_found);
        assert_eq!(registry.lookup_error(boxed.as_ref()), not_found);

        let shared: Box<dyn Error + Send + Sync> = Box::new(KeyError);
        assert_eq!(registry.lookup_error(&*shared), not_found);

        let other: Box<dyn Error> = Box::new(StandardError);
        assert_eq!(registry.lookup_error(&*other), Some(handle(&registry, 500)));
    }

    #[test]
    fn test_find_mapping_reports_matched_type() {
        let registry = registry();
        registry
            .set_mapping([
                (FailureId::of::<KeyError>(), 404u16),
                (FailureId::of::<ArgumentError>(), 400u16),
            ])
            .unwrap();

        let boxed: Box<dyn Error> = Box::new(ArgumentError);
        let (ty, matched) = registry.find_mapping(&*boxed).unwrap();
        assert!(ty.name().ends_with("ArgumentError"));
        assert_eq!(matched, handle(&registry, 400));
        assert!(registry.find_mapping(&StandardError).is_none());
    }

    #[test]
    fn test_failure_type_equality_ignores_matcher() {
        assert_eq!(FailureId::of::<KeyError>(), FailureId::of::<KeyError>());
        assert_ne!(FailureId::of::<KeyError>(), FailureId::of::<ArgumentError>());
        assert_ne!(FailureId::of::<KeyError>(), FailureId::named("KeyError"));
    }

    #[test]
    fn test_named_identities() {
        let registry = registry();
        registry
            .set_mapping([("RecordNotFound", 404u16), ("RecordInvalid", 422u16)])
            .unwrap();

        assert_eq!(
            registry.lookup_id(&FailureId::named("RecordInvalid")),
            Some(handle(&registry, 422))
        );
        assert!(registry.lookup_id(&FailureId::named("Other")).is_none());
    }

    #[test]
    fn test_error_ref_deserializes_status_or_symbol() {
        let r: ErrorRef = serde_json::from_str("404").unwrap();
        assert_eq!(r, ErrorRef::Status(404));
        let r: ErrorRef = serde_json::from_str("\"conflict\"").unwrap();
        assert_eq!(r, ErrorRef::Symbol("conflict".to_string()));
    }

    #[test]
    fn test_error_ref_numeric_string_is_status() {
        let r: ErrorRef = serde_json::from_str("\"404\"").unwrap();
        assert_eq!(r, ErrorRef::Status(404));
        let r: ErrorRef = serde_json::from_str("\" 503 \"").unwrap();
        assert_eq!(r, ErrorRef::Status(503));

        let registry = registry();
        registry.set_fallback(serde_json::from_str::<ErrorRef>("\"404\"").unwrap()).unwrap();
        assert_eq!(registry.fallback(), Some(handle(&registry, 404)));
    }
}
