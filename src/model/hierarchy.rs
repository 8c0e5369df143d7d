//! Inheritance compilation
//!
//! Turns the namespaces of a [`ModelGraph`](super::ModelGraph) into an arena of
//! [`ResolvedClass`] entries. Super type edges are ordered with a topological
//! sort so every class is flattened after its ancestors; a failed sort means
//! the inheritance chain loops.

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeMap, HashMap, HashSet};

use super::declaration::{
    ClassKind, EnumDeclaration, FieldDeclaration, Identity, PrimitiveType, TypeRef,
};
use super::{DeclId, Namespace, ResolvedClass};
use crate::error::ModelError;

/// Compiled lookup tables for a set of namespaces
#[derive(Debug, Default)]
pub(crate) struct CompiledModel {
    pub(crate) classes: Vec<ResolvedClass>,
    pub(crate) class_index: HashMap<String, DeclId>,
    pub(crate) enums: Vec<EnumDeclaration>,
    pub(crate) enum_index: HashMap<String, usize>,
}

pub(crate) fn compile(
    namespaces: &BTreeMap<String, Namespace>,
) -> Result<CompiledModel, ModelError> {
    let mut model = CompiledModel::default();

    for namespace in namespaces.values() {
        for class in &namespace.classes {
            let name = class.qualified_name();
            if model.class_index.contains_key(&name) || model.enum_index.contains_key(&name) {
                return Err(ModelError::DuplicateDeclaration(name));
            }
            model.class_index.insert(name, DeclId(model.classes.len()));
            model.classes.push(ResolvedClass::unresolved(class.clone()));
        }
        for enumeration in &namespace.enums {
            let name = enumeration.qualified_name();
            if model.class_index.contains_key(&name) || model.enum_index.contains_key(&name) {
                return Err(ModelError::DuplicateDeclaration(name));
            }
            check_enum_values(enumeration)?;
            model.enum_index.insert(name, model.enums.len());
            model.enums.push(enumeration.clone());
        }
    }

    let order = inheritance_order(&model)?;
    for id in order {
        flatten(&mut model, id)?;
    }

    for class in &model.classes {
        check_field_types(&model, class)?;
    }

    Ok(model)
}

fn check_enum_values(enumeration: &EnumDeclaration) -> Result<(), ModelError> {
    let mut seen = HashSet::new();
    for value in &enumeration.values {
        if !seen.insert(value.as_str()) {
            return Err(ModelError::DuplicateEnumValue {
                enum_name: enumeration.qualified_name(),
                value: value.clone(),
            });
        }
    }
    Ok(())
}

/// Classes ordered so that every super type precedes its subtypes
fn inheritance_order(model: &CompiledModel) -> Result<Vec<DeclId>, ModelError> {
    let count = model.classes.len();
    let mut graph: DiGraph<DeclId, ()> = DiGraph::with_capacity(count, count);
    let nodes: Vec<NodeIndex> = (0..model.classes.len())
        .map(|i| graph.add_node(DeclId(i)))
        .collect();

    for (i, class) in model.classes.iter().enumerate() {
        let Some(super_type) = &class.declaration.super_type else {
            continue;
        };
        match model.class_index.get(super_type) {
            Some(parent) => {
                graph.add_edge(nodes[parent.0], nodes[i], ());
            }
            None if model.enum_index.contains_key(super_type) => {
                return Err(ModelError::SuperTypeNotClass {
                    class_name: class.name(),
                    super_type: super_type.clone(),
                });
            }
            None => {
                return Err(ModelError::UnknownSuperType {
                    class_name: class.name(),
                    super_type: super_type.clone(),
                });
            }
        }
    }

    toposort(&graph, None)
        .map(|sorted| sorted.into_iter().map(|idx| graph[idx]).collect())
        .map_err(|cycle| {
            let id = graph[cycle.node_id()];
            ModelError::InheritanceCycle(model.classes[id.0].name())
        })
}

/// Fill in ancestors, identity and flattened fields. Parents are already flattened.
fn flatten(model: &mut CompiledModel, id: DeclId) -> Result<(), ModelError> {
    let parent = model.classes[id.0]
        .declaration
        .super_type
        .as_ref()
        .and_then(|super_type| model.class_index.get(super_type).copied());

    let (ancestors, mut fields, inherited_identity) = match parent {
        Some(parent_id) => {
            let parent = &model.classes[parent_id.0];
            let mut ancestors = vec![parent_id];
            ancestors.extend(parent.ancestors.iter().copied());
            (ancestors, parent.fields.clone(), parent.identity.clone())
        }
        None => (Vec::new(), Vec::new(), None),
    };

    let class = &mut model.classes[id.0];
    let class_name = class.declaration.qualified_name();

    fields.extend(class.declaration.fields.iter().cloned());
    let mut field_index = HashMap::with_capacity(fields.len());
    for (i, field) in fields.iter().enumerate() {
        if field_index.insert(field.name.clone(), i).is_some() {
            return Err(ModelError::DuplicateField {
                class_name,
                field: field.name.clone(),
            });
        }
    }

    let kind = class.declaration.kind;
    let identity = match class.declaration.identity.clone().or(inherited_identity) {
        Some(_) if kind == ClassKind::Concept => {
            return Err(ModelError::IdentifiedConcept { class_name });
        }
        Some(identity) => Some(identity),
        // assets, participants, transactions and events are always identifiable
        None if kind != ClassKind::Concept => Some(Identity::System),
        None => None,
    };
    if let Some(Identity::Field(id_field)) = &identity {
        let valid = field_index
            .get(id_field)
            .map(|&i| is_identifier_field(&fields[i]))
            .unwrap_or(false);
        if !valid {
            return Err(ModelError::InvalidIdentifierField {
                class_name,
                field: id_field.clone(),
            });
        }
    }

    class.ancestors = ancestors;
    class.identity = identity;
    class.fields = fields;
    class.field_index = field_index;
    Ok(())
}

fn is_identifier_field(field: &FieldDeclaration) -> bool {
    field.type_ref == TypeRef::Primitive(PrimitiveType::String)
        && !field.is_array
        && !field.is_relationship
}

fn check_field_types(model: &CompiledModel, class: &ResolvedClass) -> Result<(), ModelError> {
    for field in &class.declaration.fields {
        let invalid_target = || ModelError::InvalidRelationshipTarget {
            class_name: class.name(),
            field: field.name.clone(),
            type_name: field.type_ref.to_string(),
        };

        match &field.type_ref {
            TypeRef::Primitive(_) if field.is_relationship => return Err(invalid_target()),
            TypeRef::Primitive(_) => {}
            TypeRef::Named(type_name) => {
                if let Some(target) = model.class_index.get(type_name) {
                    if field.is_relationship && model.classes[target.0].is_concept() {
                        return Err(invalid_target());
                    }
                } else if model.enum_index.contains_key(type_name) {
                    if field.is_relationship {
                        return Err(invalid_target());
                    }
                } else {
                    return Err(ModelError::UnknownFieldType {
                        class_name: class.name(),
                        field: field.name.clone(),
                        type_name: type_name.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}
