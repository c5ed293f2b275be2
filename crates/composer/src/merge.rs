// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Merging of endpoint schemas into one namespaced schema.
//!
//! Every type an endpoint declares is renamed by prefixing it with the endpoint's prefix, and
//! every reference to such a type is rewritten to match. Built-in scalars keep their names. The
//! merged `Query` root gets one field per endpoint, named by its namespace and typed by the
//! endpoint's renamed query root (likewise for `Mutation`).

use std::collections::{BTreeMap, HashSet};

use async_graphql_parser::{
    Positioned,
    types::{
        BaseType, FieldDefinition, InputValueDefinition, ObjectType, Type, TypeDefinition, TypeKind,
    },
};
use async_graphql_value::Name;
use async_trait::async_trait;
use soap_schema::{
    GraphQLSchema, MUTATION_ROOT_TYPENAME, QUERY_ROOT_TYPENAME,
    schema::is_builtin_scalar,
    type_normalization::{default_positioned, default_positioned_name, is_valid_name, named_type},
};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    #[error("There are no schemas to merge")]
    NoSchemas,

    #[error("'{0}' is not a valid namespace")]
    InvalidNamespace(String),

    #[error("Namespace '{0}' is used more than once")]
    DuplicateNamespace(String),

    #[error("Type '{type_name}' of namespace '{second}' collides with the same type of '{first}'")]
    TypeCollision {
        type_name: String,
        first: String,
        second: String,
    },

    #[error("Type '{type_name}' of namespace '{namespace}' collides with the merged root type")]
    RootCollision {
        type_name: String,
        namespace: String,
    },

    #[error("None of the schemas has a query root")]
    NoQueryRoot,
}

#[derive(Debug, Clone)]
pub struct NamespacedSchema {
    pub namespace: String,
    pub prefix: String,
    pub schema: GraphQLSchema,
}

#[derive(Debug, Clone)]
pub struct MergedSchema {
    pub schema: GraphQLSchema,
    /// Namespace each merged (non-root) type came from
    pub type_origins: BTreeMap<String, String>,
}

#[async_trait]
pub trait SchemaMerger: Send + Sync {
    async fn merge(&self, schemas: Vec<NamespacedSchema>) -> Result<MergedSchema, MergeError>;
}

/// The result does not depend on the order of the input schemas.
#[derive(Debug, Default)]
pub struct NamespaceMerger;

#[async_trait]
impl SchemaMerger for NamespaceMerger {
    async fn merge(&self, schemas: Vec<NamespacedSchema>) -> Result<MergedSchema, MergeError> {
        if schemas.is_empty() {
            return Err(MergeError::NoSchemas);
        }

        let mut namespaces = HashSet::new();
        let mut types = BTreeMap::new();
        let mut type_origins: BTreeMap<String, String> = BTreeMap::new();
        let mut query_fields = vec![];
        let mut mutation_fields = vec![];

        for NamespacedSchema {
            namespace,
            prefix,
            schema,
        } in schemas
        {
            if !is_valid_name(&namespace) {
                return Err(MergeError::InvalidNamespace(namespace));
            }
            if !namespaces.insert(namespace.clone()) {
                return Err(MergeError::DuplicateNamespace(namespace));
            }

            let renamer = TypeRenamer::new(&prefix, &schema);

            if schema.query_root().is_some() {
                query_fields.push((namespace.clone(), renamer.rename(QUERY_ROOT_TYPENAME)));
            }
            if schema.mutation_root().is_some() {
                mutation_fields.push((namespace.clone(), renamer.rename(MUTATION_ROOT_TYPENAME)));
            }

            for definition in schema.into_type_definitions() {
                if is_builtin_scalar(definition.name.node.as_str()) {
                    continue;
                }

                let definition = renamer.rename_definition(definition);
                let type_name = definition.name.node.to_string();

                if let Some(first) = type_origins.get(&type_name) {
                    return Err(MergeError::TypeCollision {
                        type_name,
                        first: first.clone(),
                        second: namespace,
                    });
                }

                type_origins.insert(type_name.clone(), namespace.clone());
                types.insert(type_name, definition);
            }
        }

        if query_fields.is_empty() {
            return Err(MergeError::NoQueryRoot);
        }

        for (root_name, fields) in [
            (QUERY_ROOT_TYPENAME, query_fields),
            (MUTATION_ROOT_TYPENAME, mutation_fields),
        ] {
            if fields.is_empty() {
                continue;
            }
            if let Some(namespace) = type_origins.get(root_name) {
                return Err(MergeError::RootCollision {
                    type_name: root_name.to_string(),
                    namespace: namespace.clone(),
                });
            }
            types.insert(root_name.to_string(), root_definition(root_name, fields));
        }

        Ok(MergedSchema {
            schema: GraphQLSchema::new(types.into_values().collect()),
            type_origins,
        })
    }
}

fn root_definition(root_name: &str, mut fields: Vec<(String, Name)>) -> TypeDefinition {
    fields.sort_by(|(a, _), (b, _)| a.cmp(b));

    let fields = fields
        .into_iter()
        .map(|(namespace, type_name)| {
            default_positioned(FieldDefinition {
                description: None,
                name: default_positioned(Name::new(namespace)),
                arguments: vec![],
                ty: default_positioned(named_type(type_name, false)),
                directives: vec![],
            })
        })
        .collect();

    TypeDefinition {
        extend: false,
        description: None,
        name: default_positioned_name(root_name),
        directives: vec![],
        kind: TypeKind::Object(ObjectType {
            implements: vec![],
            fields,
        }),
    }
}

/// Renames the types declared by one schema
struct TypeRenamer<'a> {
    prefix: &'a str,
    declared: HashSet<String>,
}

impl<'a> TypeRenamer<'a> {
    fn new(prefix: &'a str, schema: &GraphQLSchema) -> Self {
        Self {
            prefix,
            declared: schema
                .type_names()
                .filter(|name| !is_builtin_scalar(name))
                .map(str::to_string)
                .collect(),
        }
    }

    fn rename(&self, name: &str) -> Name {
        if self.declared.contains(name) {
            Name::new(format!("{}{}", self.prefix, name))
        } else {
            Name::new(name)
        }
    }

    fn rename_name(&self, name: &mut Positioned<Name>) {
        name.node = self.rename(name.node.as_str());
    }

    fn rename_type(&self, ty: &mut Type) {
        match &mut ty.base {
            BaseType::Named(name) => *name = self.rename(name.as_str()),
            BaseType::List(element) => self.rename_type(element),
        }
    }

    fn rename_input_value(&self, value: &mut Positioned<InputValueDefinition>) {
        self.rename_type(&mut value.node.ty.node);
    }

    fn rename_field(&self, field: &mut Positioned<FieldDefinition>) {
        self.rename_type(&mut field.node.ty.node);
        field
            .node
            .arguments
            .iter_mut()
            .for_each(|argument| self.rename_input_value(argument));
    }

    fn rename_definition(&self, mut definition: TypeDefinition) -> TypeDefinition {
        self.rename_name(&mut definition.name);

        match &mut definition.kind {
            TypeKind::Scalar | TypeKind::Enum(_) => {}
            TypeKind::Object(object_type) => {
                object_type
                    .implements
                    .iter_mut()
                    .for_each(|name| self.rename_name(name));
                object_type
                    .fields
                    .iter_mut()
                    .for_each(|field| self.rename_field(field));
            }
            TypeKind::Interface(interface_type) => {
                interface_type
                    .implements
                    .iter_mut()
                    .for_each(|name| self.rename_name(name));
                interface_type
                    .fields
                    .iter_mut()
                    .for_each(|field| self.rename_field(field));
            }
            TypeKind::Union(union_type) => {
                union_type
                    .members
                    .iter_mut()
                    .for_each(|member| self.rename_name(member));
            }
            TypeKind::InputObject(input_object_type) => {
                input_object_type
                    .fields
                    .iter_mut()
                    .for_each(|field| self.rename_input_value(field));
            }
        }

        definition
    }
}
