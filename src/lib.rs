//! Familiar Conformance
//!
//! Schema-directed validation of model instances against a graph of class
//! and enum declarations organised into versioned namespaces.
//!
//! ## Features
//!
//! - **Declaration Graph**: Namespaces compile into an arena of classes with
//!   flattened field sets and resolved ancestor chains
//! - **Substitutability**: Fields accept values of the declared class or any
//!   transitive subtype
//! - **Identifier Normalization**: Shadow identifiers are kept in step with the
//!   declared identifier field
//! - **Stable Diagnostics**: Violation messages follow a fixed shape that
//!   downstream tooling matches on
//!
//! ## Architecture
//!
//! ```text
//! model files (JSON) ──▶ Namespace ──▶ ModelGraph (compiled arena)
//!                                          │
//!                                    TypeResolver
//!                                          │
//! Value ──────────────────────────────▶ Validator ──▶ Ok(()) | ValidationError
//! ```

pub mod config;
pub mod error;
pub mod model;
pub mod render;
pub mod resolver;
pub mod validator;
pub mod value;

pub use config::ConformanceConfig;
pub use error::{ModelError, NotFoundReason, Result, TypeNotFound, ValidationError};
pub use model::{
    ClassDeclaration, ClassKind, Declaration, EnumDeclaration, FieldDeclaration, Identity,
    ModelGraph, Namespace, NamespaceId, PrimitiveType, QualifiedName, ResolvedClass, TypeRef,
};
pub use render::{render_value, RenderOptions};
pub use resolver::TypeResolver;
pub use validator::{ValidationOptions, Validator};
pub use value::{Concept, Relationship, Resource, Scalar, Value};
