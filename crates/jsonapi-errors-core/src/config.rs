//! Configuration for the mapping registry.

use std::collections::BTreeMap;
use std::io::Read;

use serde::Deserialize;

use crate::error::JsonApiError;
use crate::registry::{ErrorRef, MappingRegistry};

/// Startup configuration.
///
/// ## Serialization Format
///
/// Fields are read in `kebab-case`:
///
/// ```json
/// {
///   "load-on-start": true,
///   "fallback": 500,
///   "mapping": { "RecordNotFound": "not_found", "RecordInvalid": 422 }
/// }
/// ```
///
/// Mapping values and the fallback accept a status (a JSON number or a
/// numeric string), a symbolic code or a display name. Mapping keys are
/// failure names (see [`FailureId::named`](crate::registry::FailureId::named)).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Load the error type registry before installing anything. Default: false.
    pub load_on_start: bool,
    /// Error type used when no mapping matches.
    pub fallback: Option<ErrorRef>,
    /// Failure name to error type.
    pub mapping: BTreeMap<String, ErrorRef>,
}

impl Config {
    pub fn from_json_str(text: &str) -> Result<Self, JsonApiError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, JsonApiError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Install this configuration on `registry`.
    ///
    /// Order: load the type registry (if requested), resolve the fallback,
    /// replace the mapping table, then install the fallback. Nothing is
    /// installed unless both the fallback and every mapping entry resolve.
    pub fn apply(&self, registry: &MappingRegistry) -> Result<(), JsonApiError> {
        if self.load_on_start {
            registry.types().load_errors();
        }

        let fallback = self
            .fallback
            .as_ref()
            .map(|value| registry.resolve(value))
            .transpose()?;

        registry.set_mapping(
            self.mapping
                .iter()
                .map(|(failure, value)| (failure.as_str(), value.clone())),
        )?;

        if let Some(handle) = fallback {
            registry.set_fallback(handle)?;
        }

        tracing::debug!(
            entries = self.mapping.len(),
            fallback = self.fallback.is_some(),
            "applied error configuration"
        );
        Ok(())
    }
}
