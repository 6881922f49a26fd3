//! Normalizes one or many descriptors and picks the status to report.
//!
//! A batch always reports the status of its **first** descriptor. The other
//! statuses are not aggregated; callers that need a particular status for a
//! heterogeneous batch must order the batch themselves.

use serde_json::Value;

use crate::descriptor::{Descriptor, Status};
use crate::error::JsonApiError;
use crate::serializer::JsonApiSerializer;

/// Status plus wire body, ready to hand to a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub status: Status,
    pub body: String,
}

/// A non-empty, ordered batch of descriptors.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolver {
    errors: Vec<Descriptor>,
}

impl Resolver {
    /// Build from any sequence of descriptors.
    ///
    /// Fails with [`JsonApiError::InvalidDescriptorInput`] when the sequence is
    /// empty.
    pub fn from_errors(
        errors: impl IntoIterator<Item = Descriptor>,
    ) -> Result<Self, JsonApiError> {
        let errors: Vec<Descriptor> = errors.into_iter().collect();
        if errors.is_empty() {
            return Err(JsonApiError::InvalidDescriptorInput);
        }
        Ok(Self { errors })
    }

    pub fn errors(&self) -> &[Descriptor] {
        &self.errors
    }

    /// Status of the first descriptor in the batch.
    pub fn status(&self) -> Status {
        self.errors[0].status
    }

    pub fn serializer(&self) -> JsonApiSerializer<'_> {
        JsonApiSerializer::new(&self.errors)
    }

    pub fn to_hash(&self, short: bool) -> Result<Value, JsonApiError> {
        self.serializer().to_hash(short)
    }

    pub fn to_json(&self, short: bool) -> Result<String, JsonApiError> {
        self.serializer().to_json(short)
    }

    pub fn render(&self, short: bool) -> Result<Rendered, JsonApiError> {
        Ok(Rendered {
            status: self.status(),
            body: self.to_json(short)?,
        })
    }
}

impl From<Descriptor> for Resolver {
    fn from(error: Descriptor) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl TryFrom<Vec<Descriptor>> for Resolver {
    type Error = JsonApiError;

    fn try_from(errors: Vec<Descriptor>) -> Result<Self, Self::Error> {
        Self::from_errors(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DescriptorAttrs;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn with_status(status: u16) -> Descriptor {
        Descriptor::from_attrs(DescriptorAttrs::new().status(status).title("t"))
    }

    #[test]
    fn test_single_descriptor_becomes_batch_of_one() {
        let resolver = Resolver::from(with_status(404));
        assert_eq!(resolver.errors().len(), 1);
        assert_eq!(resolver.status(), Status::new(404));
    }

    #[test]
    fn test_status_is_first_element() {
        let resolver = Resolver::try_from(vec![with_status(422), with_status(500)]).unwrap();
        assert_eq!(resolver.status(), Status::new(422));

        let resolver = Resolver::try_from(vec![with_status(500), with_status(422)]).unwrap();
        assert_eq!(resolver.status(), Status::new(500));
    }

    #[test]
    fn test_empty_batch_is_rejected() {
        let err = Resolver::from_errors(Vec::new()).unwrap_err();
        assert!(matches!(err, JsonApiError::InvalidDescriptorInput));
    }

    #[test]
    fn test_render_returns_status_and_body() {
        let rendered = Resolver::from(with_status(409)).render(true).unwrap();
        assert_eq!(rendered.status, Status::new(409));

        let body: Value = serde_json::from_str(&rendered.body).unwrap();
        assert_eq!(body["errors"][0]["status"], json!(409));
        assert!(body["errors"][0].get("code").is_none());
    }

    #[test]
    fn test_to_hash_delegates_to_serializer() {
        let resolver = Resolver::try_from(vec![with_status(400), with_status(401)]).unwrap();
        assert_eq!(
            resolver.to_hash(false).unwrap(),
            resolver.serializer().to_hash(false).unwrap()
        );
    }
}
