//! Class, field and enum declarations

use serde::{Deserialize, Serialize};
use std::fmt;

use super::name::QualifiedName;

// =============================================================================
// Field Types
// =============================================================================

/// The fixed set of primitive field types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveType {
    String,
    Integer,
    Long,
    Double,
    Boolean,
    DateTime,
}

impl PrimitiveType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "String" => Some(Self::String),
            "Integer" => Some(Self::Integer),
            "Long" => Some(Self::Long),
            "Double" => Some(Self::Double),
            "Boolean" => Some(Self::Boolean),
            "DateTime" => Some(Self::DateTime),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Integer => "Integer",
            Self::Long => "Long",
            Self::Double => "Double",
            Self::Boolean => "Boolean",
            Self::DateTime => "DateTime",
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared type of a field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeRef {
    Primitive(PrimitiveType),
    /// Fully qualified class or enum name
    Named(String),
}

impl TypeRef {
    /// Primitive when the name is one of the primitive types, otherwise a named reference
    pub fn parse(name: &str) -> Self {
        PrimitiveType::from_name(name)
            .map(Self::Primitive)
            .unwrap_or_else(|| Self::Named(name.to_string()))
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Primitive(p) => p.as_str(),
            Self::Named(name) => name,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Field Declaration
// =============================================================================

/// A field of a class declaration. Relationship fields are references to
/// identifiable instances rather than embedded values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDeclaration {
    pub name: String,
    pub type_ref: TypeRef,
    pub is_array: bool,
    pub is_optional: bool,
    pub is_relationship: bool,
}

impl FieldDeclaration {
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
            is_array: false,
            is_optional: false,
            is_relationship: false,
        }
    }

    pub fn primitive(name: impl Into<String>, primitive: PrimitiveType) -> Self {
        Self::new(name, TypeRef::Primitive(primitive))
    }

    pub fn named(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(name, TypeRef::Named(type_name.into()))
    }

    pub fn array(mut self) -> Self {
        self.is_array = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.is_optional = true;
        self
    }

    pub fn relationship(mut self) -> Self {
        self.is_relationship = true;
        self
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self.type_ref, TypeRef::Primitive(_))
    }

    /// Type label used in diagnostics: `Type` or `Type[]`
    pub fn expected_type_label(&self) -> String {
        if self.is_array {
            format!("{}[]", self.type_ref)
        } else {
            self.type_ref.to_string()
        }
    }
}

// =============================================================================
// Class Declaration
// =============================================================================

/// Declaration keyword of a class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    #[default]
    Concept,
    Asset,
    Participant,
    Transaction,
    Event,
}

/// How instances of an identifiable class are identified
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Identity {
    /// Identified by a declared String field
    Field(String),
    /// Identified by the shadow identifier only
    System,
}

impl Identity {
    pub fn field_name(&self) -> Option<&str> {
        match self {
            Self::Field(name) => Some(name),
            Self::System => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDeclaration {
    pub name: QualifiedName,
    pub kind: ClassKind,
    pub is_abstract: bool,
    /// Fully qualified super type name
    pub super_type: Option<String>,
    /// Identity declared on this class. Subclasses inherit it, see
    /// [`ResolvedClass::identity`](super::ResolvedClass::identity).
    pub identity: Option<Identity>,
    /// Own fields, in declaration order
    pub fields: Vec<FieldDeclaration>,
}

impl ClassDeclaration {
    pub fn new(name: QualifiedName, kind: ClassKind) -> Self {
        Self {
            name,
            kind,
            is_abstract: false,
            super_type: None,
            identity: None,
            fields: Vec::new(),
        }
    }

    pub fn with_super_type(mut self, super_type: impl Into<String>) -> Self {
        self.super_type = Some(super_type.into());
        self
    }

    pub fn abstract_class(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn identified_by(mut self, field: impl Into<String>) -> Self {
        self.identity = Some(Identity::Field(field.into()));
        self
    }

    pub fn system_identified(mut self) -> Self {
        self.identity = Some(Identity::System);
        self
    }

    pub fn with_field(mut self, field: FieldDeclaration) -> Self {
        self.fields.push(field);
        self
    }

    pub fn qualified_name(&self) -> String {
        self.name.to_string()
    }
}

// =============================================================================
// Enum Declaration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDeclaration {
    pub name: QualifiedName,
    /// Permitted literals in declaration order
    pub values: Vec<String>,
}

impl EnumDeclaration {
    pub fn new<I, S>(name: QualifiedName, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    pub fn qualified_name(&self) -> String {
        self.name.to_string()
    }
}
