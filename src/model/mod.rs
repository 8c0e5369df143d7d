//! Declaration Graph
//!
//! Namespaces of class and enum declarations, compiled into an arena of
//! [`ResolvedClass`] entries on every mutation. Each entry carries its
//! ancestor chain and its flattened field set so validation never walks the
//! inheritance chain itself.
//!
//! The graph is read-only while validations borrow it; adding or removing a
//! namespace needs `&mut ModelGraph` and recompiles the arena.

pub mod declaration;
pub mod hierarchy;
pub mod loader;
pub mod name;

pub use declaration::{
    ClassDeclaration, ClassKind, EnumDeclaration, FieldDeclaration, Identity, PrimitiveType,
    TypeRef,
};
pub use name::{NamespaceId, QualifiedName};

use std::collections::{BTreeMap, HashMap};

use crate::error::ModelError;
use hierarchy::CompiledModel;
use name::split_qualified;

/// Index of a class in the compiled arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(pub(crate) usize);

// =============================================================================
// Namespace
// =============================================================================

/// A namespace and the declarations it owns
#[derive(Debug, Clone, PartialEq)]
pub struct Namespace {
    pub id: NamespaceId,
    pub classes: Vec<ClassDeclaration>,
    pub enums: Vec<EnumDeclaration>,
}

impl Namespace {
    pub fn new(id: NamespaceId) -> Self {
        Self {
            id,
            classes: Vec::new(),
            enums: Vec::new(),
        }
    }

    /// Parse the namespace id and create an empty namespace
    pub fn parse(id: &str) -> Result<Self, ModelError> {
        Ok(Self::new(NamespaceId::parse(id)?))
    }

    /// Start a class declaration qualified with this namespace
    pub fn class_decl(&self, name: &str, kind: ClassKind) -> ClassDeclaration {
        ClassDeclaration::new(self.id.qualify(name), kind)
    }

    /// Start an enum declaration qualified with this namespace
    pub fn enum_decl<I, S>(&self, name: &str, values: I) -> EnumDeclaration
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        EnumDeclaration::new(self.id.qualify(name), values)
    }

    pub fn with_class(mut self, class: ClassDeclaration) -> Self {
        self.classes.push(class);
        self
    }

    pub fn with_enum(mut self, enumeration: EnumDeclaration) -> Self {
        self.enums.push(enumeration);
        self
    }

    /// Qualify short super type and field type names with this namespace
    fn qualify_references(&mut self) {
        let id = self.id.clone();
        let qualify = |name: &mut String| {
            if !name.contains('.') {
                *name = id.qualify(name).to_string();
            }
        };

        for class in &mut self.classes {
            if let Some(super_type) = class.super_type.as_mut() {
                qualify(super_type);
            }
            for field in &mut class.fields {
                if let TypeRef::Named(type_name) = &mut field.type_ref {
                    qualify(type_name);
                }
            }
        }
    }

    /// Fully qualified names this namespace refers to outside itself
    fn external_references(&self) -> impl Iterator<Item = &str> {
        let own = self.id.to_string();
        self.classes
            .iter()
            .flat_map(|class| {
                class.super_type.as_deref().into_iter().chain(
                    class.fields.iter().filter_map(|field| match &field.type_ref {
                        TypeRef::Named(name) => Some(name.as_str()),
                        TypeRef::Primitive(_) => None,
                    }),
                )
            })
            .filter(move |name| split_qualified(name).map(|(ns, _)| ns != own).unwrap_or(false))
    }
}

// =============================================================================
// Resolved Declarations
// =============================================================================

/// A class declaration with its inheritance chain resolved
#[derive(Debug, Clone)]
pub struct ResolvedClass {
    pub declaration: ClassDeclaration,
    /// Ancestors, nearest first
    pub ancestors: Vec<DeclId>,
    /// Own or inherited identity
    pub identity: Option<Identity>,
    /// Own and inherited fields, root ancestor first
    pub(crate) fields: Vec<FieldDeclaration>,
    pub(crate) field_index: HashMap<String, usize>,
}

impl ResolvedClass {
    pub(crate) fn unresolved(declaration: ClassDeclaration) -> Self {
        Self {
            declaration,
            ancestors: Vec::new(),
            identity: None,
            fields: Vec::new(),
            field_index: HashMap::new(),
        }
    }

    pub fn name(&self) -> String {
        self.declaration.qualified_name()
    }

    pub fn is_abstract(&self) -> bool {
        self.declaration.is_abstract
    }

    pub fn is_identifiable(&self) -> bool {
        self.identity.is_some()
    }

    /// Non-identifiable embeddable structure
    pub fn is_concept(&self) -> bool {
        !self.is_identifiable()
    }

    /// Declared identifier field, `None` for concepts and system-identified classes
    pub fn identifier_field(&self) -> Option<&str> {
        self.identity.as_ref().and_then(Identity::field_name)
    }

    /// Flattened field set
    pub fn fields(&self) -> &[FieldDeclaration] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDeclaration> {
        self.field_index.get(name).map(|&i| &self.fields[i])
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field_index.contains_key(name)
    }
}

/// A resolved type: class or enum
#[derive(Debug, Clone, Copy)]
pub enum Declaration<'a> {
    Class(&'a ResolvedClass),
    Enum(&'a EnumDeclaration),
}

impl<'a> Declaration<'a> {
    pub fn name(&self) -> String {
        match self {
            Self::Class(class) => class.name(),
            Self::Enum(enumeration) => enumeration.qualified_name(),
        }
    }

    pub fn as_class(&self) -> Option<&'a ResolvedClass> {
        match *self {
            Self::Class(class) => Some(class),
            Self::Enum(_) => None,
        }
    }
}

// =============================================================================
// Model Graph
// =============================================================================

/// The declaration graph
#[derive(Debug, Default)]
pub struct ModelGraph {
    /// Namespaces keyed by their display id
    namespaces: BTreeMap<String, Namespace>,
    compiled: CompiledModel,
}

impl ModelGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a set of namespaces
    pub fn from_namespaces(
        namespaces: impl IntoIterator<Item = Namespace>,
    ) -> Result<Self, ModelError> {
        let mut graph = Self::new();
        for namespace in namespaces {
            graph.insert_namespace(namespace)?;
        }
        graph.recompile()?;
        Ok(graph)
    }

    /// Add a namespace and recompile. On failure the graph is left unchanged.
    pub fn add_namespace(&mut self, namespace: Namespace) -> Result<(), ModelError> {
        let key = self.insert_namespace(namespace)?;
        if let Err(err) = self.recompile() {
            self.namespaces.remove(&key);
            return Err(err);
        }
        tracing::info!(
            namespace = %key,
            declarations = self.declaration_count(),
            "added namespace"
        );
        Ok(())
    }

    /// Remove a namespace. Refused while another namespace still refers into it.
    pub fn remove_namespace(&mut self, id: &str) -> Result<Namespace, ModelError> {
        if !self.namespaces.contains_key(id) {
            return Err(ModelError::UnknownNamespace(id.to_string()));
        }

        for (key, other) in &self.namespaces {
            if key == id {
                continue;
            }
            let uses_removed = other
                .external_references()
                .any(|name| split_qualified(name).map(|(ns, _)| ns == id).unwrap_or(false));
            if uses_removed {
                return Err(ModelError::NamespaceInUse {
                    namespace: id.to_string(),
                    dependent: key.clone(),
                });
            }
        }

        let removed = self
            .namespaces
            .remove(id)
            .ok_or_else(|| ModelError::UnknownNamespace(id.to_string()))?;
        if let Err(err) = self.recompile() {
            self.namespaces.insert(id.to_string(), removed);
            return Err(err);
        }
        tracing::warn!(namespace = %id, "removed namespace");
        Ok(removed)
    }

    pub fn namespace(&self, id: &str) -> Option<&Namespace> {
        self.namespaces.get(id)
    }

    pub fn has_namespace(&self, id: &str) -> bool {
        self.namespaces.contains_key(id)
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &Namespace> {
        self.namespaces.values()
    }

    pub fn class(&self, name: &str) -> Option<&ResolvedClass> {
        self.compiled
            .class_index
            .get(name)
            .map(|id| &self.compiled.classes[id.0])
    }

    pub fn enumeration(&self, name: &str) -> Option<&EnumDeclaration> {
        self.compiled
            .enum_index
            .get(name)
            .map(|&i| &self.compiled.enums[i])
    }

    pub fn declaration(&self, name: &str) -> Option<Declaration<'_>> {
        self.class(name)
            .map(Declaration::Class)
            .or_else(|| self.enumeration(name).map(Declaration::Enum))
    }

    /// Number of class and enum declarations across all namespaces
    pub fn declaration_count(&self) -> usize {
        self.compiled.classes.len() + self.compiled.enums.len()
    }

    /// True when `actual` is `expected` or a transitive subtype of it
    pub fn is_assignable(&self, actual: &str, expected: &str) -> bool {
        let (Some(actual_id), Some(expected_id)) = (
            self.compiled.class_index.get(actual),
            self.compiled.class_index.get(expected),
        ) else {
            return false;
        };
        actual_id == expected_id
            || self.compiled.classes[actual_id.0].ancestors.contains(expected_id)
    }

    fn insert_namespace(&mut self, mut namespace: Namespace) -> Result<String, ModelError> {
        let key = namespace.id.to_string();
        if self.namespaces.contains_key(&key) {
            return Err(ModelError::DuplicateNamespace(key));
        }
        namespace.qualify_references();
        self.namespaces.insert(key.clone(), namespace);
        Ok(key)
    }

    fn recompile(&mut self) -> Result<(), ModelError> {
        self.compiled = hierarchy::compile(&self.namespaces)?;
        Ok(())
    }
}
