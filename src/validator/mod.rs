//! Instance Validation
//!
//! Walks a runtime [`Value`] against a declaration in lock-step, depth first.
//! The first mismatch aborts the walk with a [`ValidationError`]; a
//! successful walk may have normalized resource identifiers, which is the
//! only mutation validation performs.
//!
//! ```text
//! validate(decl, value)
//!   └─ class check ── shape, resolve, abstract, assignable, undeclared keys, identifier
//!        └─ field checks (flattened order)
//!             ├─ primitive / enum
//!             ├─ relationship
//!             └─ embedded class ──▶ class check (depth + 1)
//! ```

mod class;
mod field;

use serde::{Deserialize, Serialize};

use crate::config::ConformanceConfig;
use crate::error::{Result, ValidationError};
use crate::model::{Declaration, FieldDeclaration, ModelGraph, TypeRef};
use crate::render::{render_value, RenderOptions};
use crate::resolver::TypeResolver;
use crate::value::{Value, UNDEFINED};

/// Options recognised by a validation pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationOptions {
    /// Accept a resource where a relationship is declared, as it can be converted
    #[serde(default)]
    pub convert_resources_to_relationships: bool,

    /// Accept a resource where a relationship is declared, without conversion
    #[serde(default)]
    pub permit_resources_for_relationships: bool,

    /// Deepest embedding accepted before the walk gives up
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    64
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            convert_resources_to_relationships: false,
            permit_resources_for_relationships: false,
            max_depth: default_max_depth(),
        }
    }
}

impl ValidationOptions {
    pub fn accepts_resources_for_relationships(&self) -> bool {
        self.convert_resources_to_relationships || self.permit_resources_for_relationships
    }
}

/// Validates instances against a declaration graph
pub struct Validator<'r, R: TypeResolver + ?Sized = ModelGraph> {
    resolver: &'r R,
    options: ValidationOptions,
    render: RenderOptions,
}

impl<'r, R: TypeResolver + ?Sized> Validator<'r, R> {
    pub fn new(resolver: &'r R, options: ValidationOptions) -> Self {
        Self {
            resolver,
            options,
            render: RenderOptions::default(),
        }
    }

    pub fn from_config(resolver: &'r R, config: &ConformanceConfig) -> Self {
        Self {
            resolver,
            options: config.validation.clone(),
            render: config.render.clone(),
        }
    }

    pub fn with_render_options(mut self, render: RenderOptions) -> Self {
        self.render = render;
        self
    }

    /// Validate `value` against `declaration`.
    ///
    /// `root` identifies the outermost instance in messages and defaults to
    /// `"undefined"`. A [`ValidationError::TypeNotFound`] is the resolver's
    /// error, unchanged.
    pub fn validate(
        &self,
        declaration: Declaration<'_>,
        value: &mut Value,
        root: Option<&str>,
    ) -> Result<()> {
        let walk = Walk {
            resolver: self.resolver,
            options: &self.options,
            render: &self.render,
            root: root.unwrap_or(UNDEFINED).to_string(),
        };
        tracing::debug!(
            declaration = %declaration.name(),
            root = %walk.root,
            "validating instance"
        );

        let result = match declaration {
            Declaration::Class(class) => walk.check_class(class, value, "$class", 0),
            // A bare value checked against an enum goes through a synthetic
            // `value` field typed by the enum itself.
            Declaration::Enum(enumeration) => {
                let type_ref = TypeRef::Named(enumeration.qualified_name());
                let field = FieldDeclaration::new("value", type_ref);
                walk.check_field(&field, Some(value), 0)
            }
        };

        if let Err(err) = &result {
            tracing::debug!(kind = err.kind(), root = %walk.root, "{err}");
        }
        result
    }

    /// Validate a structured value against its own type tag, using its fully
    /// qualified identifier as the root identifier.
    pub fn validate_instance(&self, value: &mut Value) -> Result<()> {
        let Some(type_name) = value.type_name() else {
            return Err(ValidationError::NotAResourceOrConcept {
                root: UNDEFINED.to_string(),
                class_name: UNDEFINED.to_string(),
                value: render_value(value, &self.render),
            });
        };

        let declaration = self.resolver.resolve(type_name)?;
        let root = match &*value {
            Value::Resource(resource) => resource.fully_qualified_identifier(),
            _ => None,
        };
        self.validate(declaration, value, root.as_deref())
    }
}

/// State of one validation call
pub(crate) struct Walk<'a, R: TypeResolver + ?Sized> {
    pub(crate) resolver: &'a R,
    pub(crate) options: &'a ValidationOptions,
    pub(crate) render: &'a RenderOptions,
    /// Identifier of the outermost instance
    pub(crate) root: String,
}

impl<'a, R: TypeResolver + ?Sized> Walk<'a, R> {
    pub(crate) fn render(&self, value: &Value) -> String {
        render_value(value, self.render)
    }
}
