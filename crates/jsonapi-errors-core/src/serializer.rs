//! JSON:API `{"errors": [...]}` envelope.
//!
//! Full mode writes every descriptor field. Short mode keeps only `status`,
//! `title`, `detail` and `source`, in that order.

use serde::Serialize;
use serde_json::Value;

use crate::descriptor::{Descriptor, Source, Status};
use crate::error::JsonApiError;

#[derive(Serialize)]
struct Envelope<T> {
    errors: Vec<T>,
}

/// Reduced projection of a [`Descriptor`].
#[derive(Debug, Serialize)]
pub struct ShortError<'a> {
    pub status: &'a Status,
    pub title: &'a str,
    pub detail: &'a str,
    pub source: &'a Source,
}

impl<'a> From<&'a Descriptor> for ShortError<'a> {
    fn from(d: &'a Descriptor) -> Self {
        Self {
            status: &d.status,
            title: &d.title,
            detail: &d.detail,
            source: &d.source,
        }
    }
}

/// Serializer over a borrowed, ordered list of descriptors.
#[derive(Debug, Clone, Copy)]
pub struct JsonApiSerializer<'a> {
    errors: &'a [Descriptor],
}

impl<'a> JsonApiSerializer<'a> {
    pub fn new(errors: &'a [Descriptor]) -> Self {
        Self { errors }
    }

    pub fn errors(&self) -> &'a [Descriptor] {
        self.errors
    }

    /// The envelope as a JSON value.
    pub fn to_hash(&self, short: bool) -> Result<Value, JsonApiError> {
        let value = if short {
            serde_json::to_value(self.short_envelope())?
        } else {
            serde_json::to_value(self.full_envelope())?
        };
        Ok(value)
    }

    /// The envelope as a JSON string, fields in wire order.
    pub fn to_json(&self, short: bool) -> Result<String, JsonApiError> {
        let text = if short {
            serde_json::to_string(&self.short_envelope())?
        } else {
            serde_json::to_string(&self.full_envelope())?
        };
        Ok(text)
    }

    /// Pretty-printed variant of [`to_json`](Self::to_json).
    pub fn to_json_pretty(&self, short: bool) -> Result<String, JsonApiError> {
        let text = if short {
            serde_json::to_string_pretty(&self.short_envelope())?
        } else {
            serde_json::to_string_pretty(&self.full_envelope())?
        };
        Ok(text)
    }

    fn full_envelope(&self) -> Envelope<&'a Descriptor> {
        Envelope {
            errors: self.errors.iter().collect(),
        }
    }

    fn short_envelope(&self) -> Envelope<ShortError<'a>> {
        Envelope {
            errors: self.errors.iter().map(ShortError::from).collect(),
        }
    }
}
