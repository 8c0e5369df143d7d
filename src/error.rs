//! Error types for model compilation and instance validation

use std::fmt;

use thiserror::Error;

/// Result type for validation operations
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Why a type name could not be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundReason {
    /// The owning namespace is not part of the graph
    NamespaceNotLoaded,
    /// The namespace exists but does not declare the type
    NotDeclared,
    /// The name has no namespace part at all
    Unqualified,
}

impl fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NamespaceNotLoaded => write!(f, "namespace is not loaded"),
            Self::NotDeclared => write!(f, "type is not declared in the namespace"),
            Self::Unqualified => write!(f, "type name is not fully qualified"),
        }
    }
}

/// A referenced type is absent from the declaration graph
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Type \"{type_name}\" not found in namespace \"{namespace}\": {reason}.")]
pub struct TypeNotFound {
    pub type_name: String,
    pub namespace: String,
    pub reason: NotFoundReason,
}

/// A model violation raised while validating an instance.
///
/// The first violation aborts the walk. Message prefixes are matched by
/// downstream tooling and must stay stable.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error(transparent)]
    TypeNotFound(#[from] TypeNotFound),

    #[error("Model violation in the \"{root}\" instance. Class \"{class_name}\" has the value of \"{value}\". Expected a Resource or Concept.")]
    NotAResourceOrConcept {
        root: String,
        class_name: String,
        value: String,
    },

    #[error("The class \"{class_name}\" is abstract. Should not have an instance!")]
    AbstractInstantiation { class_name: String },

    #[error("Instance \"{root}\" has a property named \"{property}\", which is not declared in \"{class_name}\".")]
    UndeclaredProperty {
        root: String,
        property: String,
        class_name: String,
    },

    #[error("Instance \"{root}\" has an empty identifier.")]
    EmptyIdentifier { root: String },

    #[error("Model violation in the \"{root}\" instance. The field \"{property}\" has a value of \"{value}\" (type of value: \"{actual_type}\"). Expected type of value: \"{expected_type}\".")]
    TypeMismatch {
        root: String,
        property: String,
        value: String,
        actual_type: String,
        expected_type: String,
    },

    #[error("Model violation in the \"{root}\" instance. Invalid enum value of \"{value}\" for the field \"{enum_name}\".")]
    InvalidEnumValue {
        root: String,
        value: String,
        enum_name: String,
    },

    #[error("Model violation in the \"{root}\" instance. The relationship field \"{property}\" has a value of type \"{actual_type}\". Expected a relationship to \"{expected_type}\".")]
    RelationshipTypeMismatch {
        root: String,
        property: String,
        actual_type: String,
        expected_type: String,
    },

    #[error("Model violation in the \"{root}\" instance. Nesting depth exceeds the limit of {limit}.")]
    DepthLimitExceeded { root: String, limit: usize },
}

impl ValidationError {
    /// True when the failure points at the declaration graph rather than the instance
    pub fn is_schema_error(&self) -> bool {
        matches!(self, Self::TypeNotFound(_))
    }

    /// Short stable name of the violation kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TypeNotFound(_) => "TypeNotFound",
            Self::NotAResourceOrConcept { .. } => "NotAResourceOrConcept",
            Self::AbstractInstantiation { .. } => "AbstractInstantiation",
            Self::UndeclaredProperty { .. } => "UndeclaredProperty",
            Self::EmptyIdentifier { .. } => "EmptyIdentifier",
            Self::TypeMismatch { .. } => "TypeMismatch",
            Self::InvalidEnumValue { .. } => "InvalidEnumValue",
            Self::RelationshipTypeMismatch { .. } => "RelationshipTypeMismatch",
            Self::DepthLimitExceeded { .. } => "DepthLimitExceeded",
        }
    }
}

/// Errors raised while building or mutating the declaration graph
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid namespace \"{0}\"")]
    InvalidNamespace(String),

    #[error("Invalid qualified name \"{0}\"")]
    InvalidQualifiedName(String),

    #[error("Namespace already loaded: {0}")]
    DuplicateNamespace(String),

    #[error("Namespace not loaded: {0}")]
    UnknownNamespace(String),

    #[error("Namespace {namespace} is still referenced by {dependent}")]
    NamespaceInUse { namespace: String, dependent: String },

    #[error("Duplicate declaration: {0}")]
    DuplicateDeclaration(String),

    #[error("Class {class_name} extends unknown type {super_type}")]
    UnknownSuperType { class_name: String, super_type: String },

    #[error("Class {class_name} extends {super_type}, which is not a class")]
    SuperTypeNotClass { class_name: String, super_type: String },

    #[error("Inheritance cycle through {0}")]
    InheritanceCycle(String),

    #[error("Field {field} is declared more than once in the flattened fields of {class_name}")]
    DuplicateField { class_name: String, field: String },

    #[error("Concept {class_name} cannot declare or inherit an identity")]
    IdentifiedConcept { class_name: String },

    #[error("Identifier field {field} of {class_name} must be a declared String field")]
    InvalidIdentifierField { class_name: String, field: String },

    #[error("Field {field} of {class_name} has unknown type {type_name}")]
    UnknownFieldType {
        class_name: String,
        field: String,
        type_name: String,
    },

    #[error("Relationship field {field} of {class_name} must target an identifiable class, not {type_name}")]
    InvalidRelationshipTarget {
        class_name: String,
        field: String,
        type_name: String,
    },

    #[error("Enum {enum_name} declares the value {value} more than once")]
    DuplicateEnumValue { enum_name: String, value: String },

    #[error("Invalid model file: {0}")]
    InvalidFormat(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Semver error: {0}")]
    Semver(#[from] semver::Error),
}
