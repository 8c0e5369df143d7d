//! Runtime instance values
//!
//! Instances are built by an external factory or deserializer. Structured
//! values carry a type tag (a fully qualified class name); resources also
//! carry the shadow identifier that validation keeps in sync with the
//! declared identifier field.

use chrono::{DateTime, FixedOffset};
use std::collections::BTreeMap;

/// Field key of the shadow identifier. Always permitted on a resource.
pub const IDENTIFIER_KEY: &str = "$identifier";

/// Field entries of a structured value
pub type Fields = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Integer(i64),
    Double(f64),
    Boolean(bool),
    DateTime(DateTime<FixedOffset>),
}

/// A runtime value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    /// An enum literal
    Enum(String),
    Array(Vec<Value>),
    Concept(Concept),
    Resource(Resource),
    Relationship(Relationship),
}

/// A non-identifiable structured value
#[derive(Debug, Clone, PartialEq)]
pub struct Concept {
    pub type_name: String,
    pub fields: Fields,
}

/// An identifiable structured value
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub type_name: String,
    /// Shadow identifier, normalized by validation
    pub identifier: Option<String>,
    pub fields: Fields,
}

/// A reference to a resource: type tag and identifier only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub type_name: String,
    pub identifier: String,
}

impl Value {
    pub fn concept(type_name: impl Into<String>) -> Self {
        Self::Concept(Concept {
            type_name: type_name.into(),
            fields: Fields::new(),
        })
    }

    /// A resource with its shadow identifier set
    pub fn resource(type_name: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::Resource(Resource {
            type_name: type_name.into(),
            identifier: Some(identifier.into()),
            fields: Fields::new(),
        })
    }

    /// A resource whose shadow identifier has not been populated yet
    pub fn bare_resource(type_name: impl Into<String>) -> Self {
        Self::Resource(Resource {
            type_name: type_name.into(),
            identifier: None,
            fields: Fields::new(),
        })
    }

    pub fn relationship(type_name: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::Relationship(Relationship {
            type_name: type_name.into(),
            identifier: identifier.into(),
        })
    }

    pub fn enum_value(literal: impl Into<String>) -> Self {
        Self::Enum(literal.into())
    }

    /// Set a field on a concept or resource. Other values are returned unchanged.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        if let Some(fields) = self.fields_mut() {
            fields.insert(key.into(), value.into());
        }
        self
    }

    pub fn fields(&self) -> Option<&Fields> {
        match self {
            Self::Concept(concept) => Some(&concept.fields),
            Self::Resource(resource) => Some(&resource.fields),
            _ => None,
        }
    }

    pub fn fields_mut(&mut self) -> Option<&mut Fields> {
        match self {
            Self::Concept(concept) => Some(&mut concept.fields),
            Self::Resource(resource) => Some(&mut resource.fields),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields().and_then(|fields| fields.get(key))
    }

    /// Type tag of structured values
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Self::Concept(concept) => Some(&concept.type_name),
            Self::Resource(resource) => Some(&resource.type_name),
            Self::Relationship(relationship) => Some(&relationship.type_name),
            _ => None,
        }
    }

    /// String content of string scalars and enum literals
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(Scalar::String(s)) | Self::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Runtime type label used in diagnostics
    pub fn type_label(&self) -> String {
        match self {
            Self::Scalar(Scalar::String(_)) | Self::Enum(_) => "string".to_string(),
            Self::Scalar(Scalar::Integer(_) | Scalar::Double(_)) => "number".to_string(),
            Self::Scalar(Scalar::Boolean(_)) => "boolean".to_string(),
            Self::Scalar(Scalar::DateTime(_)) => "datetime".to_string(),
            Self::Array(_) => "array".to_string(),
            Self::Concept(Concept { type_name, .. })
            | Self::Resource(Resource { type_name, .. })
            | Self::Relationship(Relationship { type_name, .. }) => type_name.clone(),
        }
    }
}

/// Label of an absent value
pub const UNDEFINED: &str = "undefined";

impl Resource {
    /// `<type>#<identifier>`, or `None` while the shadow identifier is unset
    pub fn fully_qualified_identifier(&self) -> Option<String> {
        self.identifier
            .as_ref()
            .filter(|id| !id.trim().is_empty())
            .map(|id| format!("{}#{}", self.type_name, id))
    }
}

impl Relationship {
    /// `resource:<type>#<identifier>`
    pub fn to_uri(&self) -> String {
        format!("resource:{}#{}", self.type_name, self.identifier)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Scalar(Scalar::String(s.to_string()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Scalar(Scalar::String(s))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Scalar(Scalar::Integer(n))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Scalar(Scalar::Integer(i64::from(n)))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Scalar(Scalar::Double(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Scalar(Scalar::Boolean(b))
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Self::Scalar(Scalar::DateTime(dt))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }
}
