//! Type Resolution
//!
//! The capability the validator depends on to turn qualified type names into
//! declarations. [`ModelGraph`] is the stock implementation.

use crate::error::{NotFoundReason, TypeNotFound};
use crate::model::name::split_qualified;
use crate::model::{Declaration, ModelGraph};

/// Resolves fully qualified type names against a declaration graph
pub trait TypeResolver {
    /// Resolve a class or enum by fully qualified name
    fn resolve(&self, name: &str) -> Result<Declaration<'_>, TypeNotFound>;

    /// True when class `actual` is `expected` or one of its subtypes
    fn is_assignable(&self, actual: &str, expected: &str) -> bool;
}

impl TypeResolver for ModelGraph {
    fn resolve(&self, name: &str) -> Result<Declaration<'_>, TypeNotFound> {
        if let Some(declaration) = self.declaration(name) {
            return Ok(declaration);
        }

        let (namespace, reason) = match split_qualified(name) {
            Some((namespace, _)) if self.has_namespace(namespace) => {
                (namespace, NotFoundReason::NotDeclared)
            }
            Some((namespace, _)) => (namespace, NotFoundReason::NamespaceNotLoaded),
            None => ("", NotFoundReason::Unqualified),
        };

        Err(TypeNotFound {
            type_name: name.to_string(),
            namespace: namespace.to_string(),
            reason,
        })
    }

    fn is_assignable(&self, actual: &str, expected: &str) -> bool {
        ModelGraph::is_assignable(self, actual, expected)
    }
}
