//! Field checks: cardinality, primitives, enums, relationships

use super::Walk;
use crate::error::{Result, ValidationError};
use crate::model::{Declaration, EnumDeclaration, FieldDeclaration, PrimitiveType, TypeRef};
use crate::resolver::TypeResolver;
use crate::value::{Scalar, Value, UNDEFINED};

impl<'a, R: TypeResolver + ?Sized> Walk<'a, R> {
    /// Check the entry for `field`; `None` when the value has no such key
    pub(crate) fn check_field(
        &self,
        field: &FieldDeclaration,
        value: Option<&mut Value>,
        depth: usize,
    ) -> Result<()> {
        let Some(value) = value else {
            if field.is_optional {
                return Ok(());
            }
            return Err(ValidationError::TypeMismatch {
                root: self.root.clone(),
                property: field.name.clone(),
                value: UNDEFINED.to_string(),
                actual_type: UNDEFINED.to_string(),
                expected_type: field.expected_type_label(),
            });
        };

        if !field.is_array {
            return self.check_item(field, value, depth);
        }

        match value {
            Value::Array(items) => {
                for item in items.iter_mut() {
                    self.check_item(field, item, depth)?;
                }
                Ok(())
            }
            other => Err(self.type_mismatch(field, other)),
        }
    }

    /// Check a single (non-array) value of `field`
    fn check_item(&self, field: &FieldDeclaration, item: &mut Value, depth: usize) -> Result<()> {
        if field.is_relationship {
            return self.check_relationship(field, item);
        }

        match &field.type_ref {
            TypeRef::Primitive(primitive) => {
                if matches_primitive(*primitive, item) {
                    Ok(())
                } else {
                    Err(self.type_mismatch(field, item))
                }
            }
            TypeRef::Named(type_name) => match self.resolver.resolve(type_name)? {
                Declaration::Enum(enumeration) => self.check_enum(enumeration, item),
                Declaration::Class(class) => self.check_class(class, item, &field.name, depth + 1),
            },
        }
    }

    fn check_enum(&self, enumeration: &EnumDeclaration, item: &Value) -> Result<()> {
        match item.as_str() {
            Some(literal) if enumeration.contains(literal) => Ok(()),
            Some(literal) => Err(self.invalid_enum_value(enumeration, literal.to_string())),
            None => Err(self.invalid_enum_value(enumeration, self.render(item))),
        }
    }

    /// A relationship field takes a relationship, or a resource when the
    /// options allow it. Either way the target must be an identifiable class
    /// assignable to the declared type.
    fn check_relationship(&self, field: &FieldDeclaration, item: &Value) -> Result<()> {
        let expected = field.type_ref.name();
        let actual = match item {
            Value::Relationship(relationship) => &relationship.type_name,
            Value::Resource(resource) if self.options.accepts_resources_for_relationships() => {
                &resource.type_name
            }
            other => return Err(self.relationship_mismatch(field, relationship_label(other))),
        };

        let target = self.resolver.resolve(actual)?;
        let identifiable = target.as_class().map(|c| c.is_identifiable()).unwrap_or(false);
        if !identifiable || !self.resolver.is_assignable(actual, expected) {
            return Err(self.relationship_mismatch(field, actual.clone()));
        }
        Ok(())
    }

    fn type_mismatch(&self, field: &FieldDeclaration, value: &Value) -> ValidationError {
        ValidationError::TypeMismatch {
            root: self.root.clone(),
            property: field.name.clone(),
            value: self.render(value),
            actual_type: value.type_label(),
            expected_type: field.expected_type_label(),
        }
    }

    fn invalid_enum_value(&self, enumeration: &EnumDeclaration, value: String) -> ValidationError {
        ValidationError::InvalidEnumValue {
            root: self.root.clone(),
            value,
            enum_name: enumeration.qualified_name(),
        }
    }

    fn relationship_mismatch(
        &self,
        field: &FieldDeclaration,
        actual_type: String,
    ) -> ValidationError {
        ValidationError::RelationshipTypeMismatch {
            root: self.root.clone(),
            property: field.name.clone(),
            actual_type,
            expected_type: field.type_ref.name().to_string(),
        }
    }
}

/// Numeric primitives reject non-finite values; integral primitives accept
/// doubles only when they carry no fraction.
fn matches_primitive(primitive: PrimitiveType, item: &Value) -> bool {
    let Value::Scalar(scalar) = item else {
        return primitive == PrimitiveType::String && matches!(item, Value::Enum(_));
    };

    match (primitive, scalar) {
        (PrimitiveType::String, Scalar::String(_)) => true,
        (PrimitiveType::Integer | PrimitiveType::Long, Scalar::Integer(_)) => true,
        (PrimitiveType::Integer | PrimitiveType::Long, Scalar::Double(n)) => {
            n.is_finite() && n.fract() == 0.0
        }
        (PrimitiveType::Double, Scalar::Integer(_)) => true,
        (PrimitiveType::Double, Scalar::Double(n)) => n.is_finite(),
        (PrimitiveType::Boolean, Scalar::Boolean(_)) => true,
        (PrimitiveType::DateTime, Scalar::DateTime(_)) => true,
        _ => false,
    }
}

/// Describes what was supplied where a relationship was expected
fn relationship_label(value: &Value) -> String {
    match value {
        Value::Resource(resource) => format!("resource {}", resource.type_name),
        Value::Concept(concept) => format!("concept {}", concept.type_name),
        other => other.type_label(),
    }
}
