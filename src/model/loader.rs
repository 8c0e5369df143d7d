//! Model File Loading
//!
//! Reads namespaces from the JSON model-file format:
//!
//! ```json
//! {
//!   "namespace": "org.acme@1.0.0",
//!   "declarations": [
//!     { "$type": "class", "name": "Vehicle", "kind": "asset", "abstract": true,
//!       "identifiedBy": "vin",
//!       "fields": [ { "name": "vin", "type": "String" } ] },
//!     { "$type": "enum", "name": "Color", "values": ["RED", "GREEN"] }
//!   ]
//! }
//! ```
//!
//! A document holds either one namespace object or an array of them. Type
//! names without a namespace are qualified with the owning namespace.

use serde::{Deserialize, Serialize};

use super::declaration::{ClassKind, FieldDeclaration, Identity, TypeRef};
use super::{ModelGraph, Namespace};
use crate::error::ModelError;

/// One namespace in a model file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFile {
    pub namespace: String,
    #[serde(default)]
    pub declarations: Vec<DeclarationDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "$type", rename_all = "lowercase")]
pub enum DeclarationDef {
    Class(ClassDef),
    Enum(EnumDef),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDef {
    pub name: String,
    #[serde(default)]
    pub kind: ClassKind,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub super_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identified_by: Option<String>,
    #[serde(default)]
    pub system_identified: bool,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub array: bool,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub relationship: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumDef {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ModelDocument {
    One(ModelFile),
    Many(Vec<ModelFile>),
}

impl ModelFile {
    /// Convert into a namespace. Short type names stay short until the
    /// namespace is added to a graph.
    pub fn into_namespace(self) -> Result<Namespace, ModelError> {
        let mut namespace = Namespace::parse(&self.namespace)?;

        for declaration in self.declarations {
            match declaration {
                DeclarationDef::Class(def) => {
                    if def.identified_by.is_some() && def.system_identified {
                        return Err(ModelError::InvalidFormat(format!(
                            "class {} is both identifiedBy and systemIdentified",
                            def.name
                        )));
                    }

                    let mut class = namespace.class_decl(&def.name, def.kind);
                    class.is_abstract = def.is_abstract;
                    class.super_type = def.super_type;
                    class.identity = match (def.identified_by, def.system_identified) {
                        (Some(field), _) => Some(Identity::Field(field)),
                        (None, true) => Some(Identity::System),
                        (None, false) => None,
                    };
                    class.fields = def.fields.into_iter().map(FieldDef::into_declaration).collect();
                    namespace.classes.push(class);
                }
                DeclarationDef::Enum(def) => {
                    let enumeration = namespace.enum_decl(&def.name, def.values);
                    namespace.enums.push(enumeration);
                }
            }
        }

        Ok(namespace)
    }
}

impl FieldDef {
    fn into_declaration(self) -> FieldDeclaration {
        FieldDeclaration {
            name: self.name,
            type_ref: TypeRef::parse(&self.type_name),
            is_array: self.array,
            is_optional: self.optional,
            is_relationship: self.relationship,
        }
    }
}

/// Parse a model document into namespaces
pub fn parse_model_files(json: &str) -> Result<Vec<Namespace>, ModelError> {
    let files = match serde_json::from_str::<ModelDocument>(json)? {
        ModelDocument::One(file) => vec![file],
        ModelDocument::Many(files) => files,
    };
    files.into_iter().map(ModelFile::into_namespace).collect()
}

impl ModelGraph {
    /// Build a graph from a model document
    pub fn from_json_str(json: &str) -> Result<Self, ModelError> {
        Self::from_namespaces(parse_model_files(json)?)
    }

    /// Add every namespace of a model document. Namespaces already added
    /// stay in the graph if a later one fails.
    pub fn add_model_file_json(&mut self, json: &str) -> Result<(), ModelError> {
        for namespace in parse_model_files(json)? {
            self.add_namespace(namespace)?;
        }
        Ok(())
    }
}
