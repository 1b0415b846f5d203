//! Desired and remote resource representations.
//!
//! A resource is a named bag of JSON attributes. Desired resources come from
//! the seed manifest, remote resources from a collection backend. Both sides
//! are matched by their `name` attribute, which is unique within a class.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Attribute map carried by every resource.
pub type Attributes = serde_json::Map<String, Value>;

/// Errors raised while building a resource from raw JSON.
#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("Resource entry is not a JSON object")]
    NotAnObject,

    #[error("Resource entry has no string 'name' attribute")]
    MissingName,

    #[error("Remote resource '{name}' has no usable 'id' attribute")]
    MissingId { name: String },
}

/// A resource as declared in the seed manifest.
///
/// The `name` is also present under the `"name"` key of `attributes`, so the
/// full attribute map can be sent to a backend as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct DesiredResource {
    pub name: String,
    pub attributes: Attributes,
}

impl DesiredResource {
    /// Builds a resource, forcing the `name` attribute to match `name`.
    pub fn new(name: impl Into<String>, mut attributes: Attributes) -> Self {
        let name = name.into();
        attributes.insert("name".to_string(), Value::String(name.clone()));
        Self { name, attributes }
    }

    /// Builds a resource from a raw attribute map, taking the name from the
    /// `"name"` key.
    pub fn from_attributes(attributes: Attributes) -> Result<Self, ResourceError> {
        let name = match attributes.get("name") {
            Some(Value::String(name)) if !name.is_empty() => name.clone(),
            _ => return Err(ResourceError::MissingName),
        };
        Ok(Self { name, attributes })
    }

    /// Builds a resource from a JSON value that must be an object.
    pub fn from_value(value: Value) -> Result<Self, ResourceError> {
        match value {
            Value::Object(map) => Self::from_attributes(map),
            _ => Err(ResourceError::NotAnObject),
        }
    }

    /// Returns true when every desired attribute is already present on the
    /// remote resource with an equal value.
    ///
    /// Remote-only attributes (ids, timestamps, server side defaults) are
    /// ignored, so a freshly created resource satisfies its own declaration.
    pub fn is_satisfied_by(&self, remote: &RemoteResource) -> bool {
        self.attributes
            .iter()
            .all(|(key, value)| remote.attributes.get(key) == Some(value))
    }
}

/// A resource as reported by a collection backend, with the backend assigned
/// identifier split out for follow-up calls.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteResource {
    pub id: String,
    pub name: String,
    pub attributes: Attributes,
}

impl RemoteResource {
    /// Builds a resource from a raw attribute map, taking `name` and `id`
    /// from the corresponding keys. Numeric ids are stringified.
    pub fn from_attributes(attributes: Attributes) -> Result<Self, ResourceError> {
        let name = match attributes.get("name") {
            Some(Value::String(name)) if !name.is_empty() => name.clone(),
            _ => return Err(ResourceError::MissingName),
        };
        let id = match attributes.get("id") {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => return Err(ResourceError::MissingId { name }),
        };
        Ok(Self {
            id,
            name,
            attributes,
        })
    }

    /// Builds a resource from a JSON value that must be an object.
    pub fn from_value(value: Value) -> Result<Self, ResourceError> {
        match value {
            Value::Object(map) => Self::from_attributes(map),
            _ => Err(ResourceError::NotAnObject),
        }
    }
}

/// Marks which remote resources a class is allowed to delete.
///
/// A remote resource is owned when its `attribute` equals `value`. Owned
/// resources survive cleanup even when nothing in desired state matches
/// them; everything else, including resources without the attribute, counts
/// as foreign and is eligible for deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnershipRule {
    pub attribute: String,
    pub value: Value,
}

impl OwnershipRule {
    pub fn new(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Returns true when the remote resource carries the ownership marker.
    pub fn owns(&self, remote: &RemoteResource) -> bool {
        remote.attributes.get(&self.attribute) == Some(&self.value)
    }
}
