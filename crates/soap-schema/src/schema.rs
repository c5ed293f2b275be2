// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use async_graphql_parser::{
    parse_schema,
    types::{ObjectType, TypeDefinition, TypeKind, TypeSystemDefinition},
};
use thiserror::Error;

pub const QUERY_ROOT_TYPENAME: &str = "Query";
pub const MUTATION_ROOT_TYPENAME: &str = "Mutation";

/// Scalars every GraphQL schema has without declaring them
pub const BUILTIN_SCALARS: [&str; 5] = ["Boolean", "Float", "ID", "Int", "String"];

/// A GraphQL schema, held as the type definitions it declares.
///
/// Root operation types follow the default naming (`Query`, `Mutation`). A schema is never
/// mutated once built; composition produces new schemas instead.
#[derive(Debug, Clone)]
pub struct GraphQLSchema {
    type_definitions: Vec<TypeDefinition>,
}

#[derive(Error, Debug)]
pub enum SchemaParseError {
    #[error("Invalid schema document: {0}")]
    Syntax(String),

    #[error("Root operation type names other than Query and Mutation are not supported")]
    CustomRootType,
}

impl GraphQLSchema {
    pub fn new(type_definitions: Vec<TypeDefinition>) -> Self {
        Self { type_definitions }
    }

    /// Build a schema from its SDL. Directive definitions are ignored.
    pub fn from_sdl(sdl: &str) -> Result<Self, SchemaParseError> {
        let document = parse_schema(sdl).map_err(|e| SchemaParseError::Syntax(e.to_string()))?;

        let mut type_definitions = vec![];

        for definition in document.definitions {
            match definition {
                TypeSystemDefinition::Type(typ) => type_definitions.push(typ.node),
                TypeSystemDefinition::Schema(schema) => {
                    let schema = schema.node;
                    let custom_query = schema
                        .query
                        .is_some_and(|name| name.node.as_str() != QUERY_ROOT_TYPENAME);
                    let custom_mutation = schema
                        .mutation
                        .is_some_and(|name| name.node.as_str() != MUTATION_ROOT_TYPENAME);

                    if custom_query || custom_mutation {
                        return Err(SchemaParseError::CustomRootType);
                    }
                }
                TypeSystemDefinition::Directive(_) => {}
            }
        }

        Ok(Self { type_definitions })
    }

    pub fn type_definitions(&self) -> &[TypeDefinition] {
        &self.type_definitions
    }

    pub fn into_type_definitions(self) -> Vec<TypeDefinition> {
        self.type_definitions
    }

    pub fn get_type_definition(&self, type_name: &str) -> Option<&TypeDefinition> {
        self.type_definitions
            .iter()
            .find(|td| td.name.node.as_str() == type_name)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.type_definitions
            .iter()
            .map(|td| td.name.node.as_str())
    }

    pub fn query_root(&self) -> Option<&ObjectType> {
        self.object_type(QUERY_ROOT_TYPENAME)
    }

    pub fn mutation_root(&self) -> Option<&ObjectType> {
        self.object_type(MUTATION_ROOT_TYPENAME)
    }

    pub fn query_field_names(&self) -> Vec<&str> {
        self.query_root()
            .map(|root| {
                root.fields
                    .iter()
                    .map(|field| field.node.name.node.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn object_type(&self, type_name: &str) -> Option<&ObjectType> {
        self.get_type_definition(type_name)
            .and_then(|td| match &td.kind {
                TypeKind::Object(object_type) => Some(object_type),
                _ => None,
            })
    }

    pub fn to_sdl(&self) -> String {
        self.to_string()
    }
}

pub fn is_builtin_scalar(type_name: &str) -> bool {
    BUILTIN_SCALARS.contains(&type_name)
}
