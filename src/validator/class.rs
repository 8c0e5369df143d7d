//! Class declaration checks

use super::Walk;
use crate::error::{Result, ValidationError};
use crate::model::{Declaration, ResolvedClass};
use crate::resolver::TypeResolver;
use crate::value::{Resource, Value, IDENTIFIER_KEY};

impl<'a, R: TypeResolver + ?Sized> Walk<'a, R> {
    /// Check a structured value against class `expected`. `property` names the
    /// field holding the value, for assignment mismatches.
    pub(crate) fn check_class(
        &self,
        expected: &ResolvedClass,
        value: &mut Value,
        property: &str,
        depth: usize,
    ) -> Result<()> {
        if depth > self.options.max_depth {
            return Err(ValidationError::DepthLimitExceeded {
                root: self.root.clone(),
                limit: self.options.max_depth,
            });
        }

        let (type_name, is_resource) = match &*value {
            Value::Concept(concept) => (concept.type_name.clone(), false),
            Value::Resource(resource) => (resource.type_name.clone(), true),
            _ => return Err(self.not_a_resource_or_concept(&expected.name(), value)),
        };
        if is_resource != expected.is_identifiable() {
            return Err(self.not_a_resource_or_concept(&expected.name(), value));
        }

        // stale type tags surface as TypeNotFound
        let resolved = match self.resolver.resolve(&type_name)? {
            Declaration::Class(class) => class,
            Declaration::Enum(_) => return Err(self.not_a_resource_or_concept(&type_name, value)),
        };

        if resolved.is_abstract() {
            return Err(ValidationError::AbstractInstantiation {
                class_name: resolved.name(),
            });
        }

        let expected_name = expected.name();
        if !self.resolver.is_assignable(&type_name, &expected_name) {
            return Err(ValidationError::TypeMismatch {
                root: self.root.clone(),
                property: property.to_string(),
                value: self.render(value),
                actual_type: type_name,
                expected_type: expected_name,
            });
        }
        if is_resource != resolved.is_identifiable() {
            return Err(self.not_a_resource_or_concept(&type_name, value));
        }

        if let Some(fields) = value.fields() {
            if let Some(key) = fields
                .keys()
                .find(|key| key.as_str() != IDENTIFIER_KEY && !resolved.has_field(key))
            {
                return Err(ValidationError::UndeclaredProperty {
                    root: self.root.clone(),
                    property: key.clone(),
                    class_name: resolved.name(),
                });
            }
        }

        if let Value::Resource(resource) = &mut *value {
            self.normalize_identifier(resolved, resource)?;
        }

        let Some(fields) = value.fields_mut() else {
            return Ok(());
        };
        for field in resolved.fields() {
            tracing::trace!(class = %type_name, field = %field.name, "checking field");
            self.check_field(field, fields.get_mut(&field.name), depth)?;
        }
        Ok(())
    }

    /// Keep the shadow identifier and the declared identifier field in step.
    ///
    /// An empty identifier field is filled from a non-empty shadow; otherwise
    /// the shadow takes the field's value. A non-string identifier is left
    /// for the field check to report.
    fn normalize_identifier(&self, class: &ResolvedClass, resource: &mut Resource) -> Result<()> {
        let shadow = resource
            .identifier
            .as_deref()
            .or_else(|| resource.fields.get(IDENTIFIER_KEY).and_then(Value::as_str))
            .filter(|id| !is_blank(id))
            .map(str::to_string);

        let identifier = match class.identifier_field() {
            None => shadow,
            Some(field_name) => {
                let current = resource.fields.get(field_name);
                if current.is_some_and(|value| value.as_str().is_none()) {
                    return Ok(());
                }
                match current.and_then(Value::as_str).filter(|id| !is_blank(id)) {
                    Some(id) => Some(id.to_string()),
                    None => {
                        if let Some(id) = &shadow {
                            resource
                                .fields
                                .insert(field_name.to_string(), Value::from(id.as_str()));
                        }
                        shadow
                    }
                }
            }
        };

        let Some(identifier) = identifier else {
            return Err(ValidationError::EmptyIdentifier {
                root: self.root.clone(),
            });
        };

        if let Some(key_value) = resource.fields.get_mut(IDENTIFIER_KEY) {
            *key_value = Value::from(identifier.as_str());
        }
        resource.identifier = Some(identifier);
        Ok(())
    }

    fn not_a_resource_or_concept(&self, class_name: &str, value: &Value) -> ValidationError {
        ValidationError::NotAResourceOrConcept {
            root: self.root.clone(),
            class_name: class_name.to_string(),
            value: self.render(value),
        }
    }
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}
