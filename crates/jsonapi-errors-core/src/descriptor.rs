//! The JSON:API error object.
//!
//! A [`Descriptor`] is one concrete error occurrence, independent of the
//! catalog. It is built directly from [`DescriptorAttrs`] or through a catalog
//! handle (see [`crate::kigen::ErrorType`]) which pre-fills `code`, `title`
//! and `status`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::JsonApiError;

/// HTTP status carried by a descriptor.
///
/// Always an integer once set. Numeric strings such as `"404"` are parsed on
/// the way in; an unset status is written as `""`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Status(Option<u16>);

impl Status {
    pub const EMPTY: Status = Status(None);

    pub const fn new(code: u16) -> Self {
        Status(Some(code))
    }

    /// Parse a status from text. The empty string yields [`Status::EMPTY`].
    pub fn parse(value: &str) -> Result<Self, JsonApiError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(Status::EMPTY);
        }
        trimmed
            .parse::<u16>()
            .map(Status::new)
            .map_err(|_| JsonApiError::InvalidStatus {
                value: value.to_string(),
            })
    }

    pub fn code(&self) -> Option<u16> {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}

impl From<u16> for Status {
    fn from(code: u16) -> Self {
        Status::new(code)
    }
}

impl FromStr for Status {
    type Err = JsonApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::parse(s)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(code) => write!(f, "{code}"),
            None => Ok(()),
        }
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Some(code) => serializer.serialize_u16(code),
            None => serializer.serialize_str(""),
        }
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(u16),
            Str(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Int(code) => Ok(Status::new(code)),
            Raw::Str(s) => Status::parse(&s).map_err(serde::de::Error::custom),
        }
    }
}

/// `links` member of an error object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Links {
    pub about: String,
    #[serde(rename = "type")]
    pub type_: String,
}

/// `source` member of an error object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Source {
    pub pointer: String,
    pub parameter: String,
    pub header: String,
}

impl Source {
    pub fn pointer(pointer: impl Into<String>) -> Self {
        Self {
            pointer: pointer.into(),
            ..Self::default()
        }
    }

    pub fn parameter(parameter: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            ..Self::default()
        }
    }
}

/// A single JSON:API error object.
///
/// Field order matches the wire order: `id, links, status, code, title,
/// detail, source, meta`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Descriptor {
    pub id: String,
    pub links: Links,
    pub status: Status,
    pub code: String,
    pub title: String,
    pub detail: String,
    pub source: Source,
    pub meta: Map<String, Value>,
}

impl Descriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_attrs(attrs: DescriptorAttrs) -> Self {
        let mut descriptor = Self::default();
        descriptor.apply(attrs);
        descriptor
    }

    /// Overwrite every field that `attrs` sets, leaving the rest untouched.
    pub fn apply(&mut self, attrs: DescriptorAttrs) {
        let DescriptorAttrs {
            id,
            links,
            status,
            code,
            title,
            detail,
            source,
            meta,
        } = attrs;

        if let Some(id) = id {
            self.id = id;
        }
        if let Some(links) = links {
            self.links = links;
        }
        if let Some(status) = status {
            self.status = status;
        }
        if let Some(code) = code {
            self.code = code;
        }
        if let Some(title) = title {
            self.title = title;
        }
        if let Some(detail) = detail {
            self.detail = detail;
        }
        if let Some(source) = source {
            self.source = source;
        }
        if let Some(meta) = meta {
            self.meta = meta;
        }
    }

    /// Human message: the detail when present, otherwise the title.
    pub fn message(&self) -> &str {
        if self.detail.is_empty() {
            &self.title
        } else {
            &self.detail
        }
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for Descriptor {}

/// Attribute overrides for building a [`Descriptor`].
///
/// Unset fields keep their default (empty, or the catalog value when
/// instantiated from a handle).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DescriptorAttrs {
    pub id: Option<String>,
    pub links: Option<Links>,
    pub status: Option<Status>,
    pub code: Option<String>,
    pub title: Option<String>,
    pub detail: Option<String>,
    pub source: Option<Source>,
    pub meta: Option<Map<String, Value>>,
}

impl DescriptorAttrs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn links(mut self, links: Links) -> Self {
        self.links = Some(links);
        self
    }

    pub fn status(mut self, status: impl Into<Status>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }

    pub fn meta(mut self, meta: Map<String, Value>) -> Self {
        self.meta = Some(meta);
        self
    }
}
