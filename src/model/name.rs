//! Namespace and qualified type names
//!
//! Namespaces may carry a semantic version: `org.acme@1.0.0`. A qualified
//! name appends the short type name: `org.acme@1.0.0.Vehicle`. Versions
//! contain dots but short names never do, so the split is on the last dot.

use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ModelError;

/// A (possibly versioned) namespace identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NamespaceId {
    pub name: String,
    pub version: Option<Version>,
}

impl NamespaceId {
    pub fn new(name: impl Into<String>, version: Option<Version>) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }

    /// Parse `org.acme` or `org.acme@1.0.0`
    pub fn parse(s: &str) -> Result<Self, ModelError> {
        let (name, version) = match s.split_once('@') {
            Some((name, version)) => (name, Some(Version::parse(version)?)),
            None => (s, None),
        };

        if name.is_empty() || name.split('.').any(|segment| segment.is_empty()) {
            return Err(ModelError::InvalidNamespace(s.to_string()));
        }

        Ok(Self::new(name, version))
    }

    /// Qualify a short type name with this namespace
    pub fn qualify(&self, short_name: &str) -> QualifiedName {
        QualifiedName {
            namespace: self.clone(),
            name: short_name.to_string(),
        }
    }
}

impl fmt::Display for NamespaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}@{}", self.name, version),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Fully qualified name of a class or enum declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QualifiedName {
    pub namespace: NamespaceId,
    pub name: String,
}

impl QualifiedName {
    pub fn parse(s: &str) -> Result<Self, ModelError> {
        let (namespace, name) = split_qualified(s)
            .ok_or_else(|| ModelError::InvalidQualifiedName(s.to_string()))?;
        if name.is_empty() || name.contains('@') {
            return Err(ModelError::InvalidQualifiedName(s.to_string()));
        }
        Ok(Self {
            namespace: NamespaceId::parse(namespace)?,
            name: name.to_string(),
        })
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

/// Split a qualified name into its namespace and short name without validating either
pub fn split_qualified(s: &str) -> Option<(&str, &str)> {
    s.rsplit_once('.')
}
