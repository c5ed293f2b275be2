// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::{BTreeMap, HashSet};

use async_graphql_parser::{
    Positioned,
    types::{
        FieldDefinition, InputObjectType, InputValueDefinition, ObjectType, Type, TypeDefinition,
        TypeKind,
    },
};
use async_graphql_value::Name;
use thiserror::Error;
use tracing::debug;

use crate::{
    description::{OperationDefinition, PartDefinition, ServiceDescription},
    schema::{GraphQLSchema, MUTATION_ROOT_TYPENAME, QUERY_ROOT_TYPENAME, is_builtin_scalar},
    type_normalization::{
        default_positioned, default_positioned_name, is_valid_name, list_type, named_type,
    },
    type_resolver::{ResolvedType, TypeResolver},
};

#[derive(Error, Debug)]
pub enum SchemaBuildError {
    #[error("'{name}' is not a valid GraphQL name for {kind}")]
    InvalidName { kind: &'static str, name: String },

    #[error("'{name}' is reserved and cannot name a generated type")]
    ReservedName { name: String },

    #[error("Type '{name}' is defined more than once with different definitions")]
    TypeConflict { name: String },

    #[error("The service description defines no operations")]
    NoOperations,
}

/// Builds the GraphQL schema of one service.
///
/// Every operation becomes a field of the `Query` root. Input parts become arguments; complex
/// input parts become `<Type>Input` input objects. A single output part is the field's type, no
/// output part is `Boolean`, and several parts are gathered into an `<Operation>Output` object.
/// When several ports expose an operation of the same name, the first one is used.
///
/// A type name may be registered more than once only with an identical definition.
pub struct SchemaBuilder<'r> {
    resolver: &'r dyn TypeResolver,
    types: BTreeMap<String, TypeDefinition>,
}

impl<'r> SchemaBuilder<'r> {
    pub fn new(resolver: &'r dyn TypeResolver) -> Self {
        Self {
            resolver,
            types: BTreeMap::new(),
        }
    }

    pub fn build(
        mut self,
        description: &ServiceDescription,
    ) -> Result<GraphQLSchema, SchemaBuildError> {
        let mut seen = HashSet::new();
        let mut query_fields = vec![];

        for operation_ref in description.operations() {
            let operation = operation_ref.operation;

            if !seen.insert(operation.name.as_str()) {
                debug!(
                    "skipping operation '{}' of port '{}', already defined by another port",
                    operation.name, operation_ref.port.name
                );
                continue;
            }

            query_fields.push(default_positioned(self.operation_field(operation)?));
        }

        if query_fields.is_empty() {
            return Err(SchemaBuildError::NoOperations);
        }

        self.types.insert(
            QUERY_ROOT_TYPENAME.to_string(),
            object_definition(
                QUERY_ROOT_TYPENAME,
                description.documentation.clone(),
                query_fields,
            ),
        );

        Ok(GraphQLSchema::new(self.types.into_values().collect()))
    }

    fn operation_field(
        &mut self,
        operation: &OperationDefinition,
    ) -> Result<FieldDefinition, SchemaBuildError> {
        let name = valid_name("an operation", &operation.name)?;

        let arguments = operation
            .input
            .iter()
            .map(|part| {
                Ok(default_positioned(InputValueDefinition {
                    description: None,
                    name: default_positioned(valid_name("an argument", &part.name)?),
                    ty: default_positioned(self.input_part_type(part)?),
                    default_value: None,
                    directives: vec![],
                }))
            })
            .collect::<Result<Vec<_>, SchemaBuildError>>()?;

        let ty = match operation.output.as_slice() {
            [] => named_type(Name::new("Boolean"), true),
            [part] => self.output_part_type(part)?,
            parts => {
                let output_name = format!("{}Output", operation.name);
                let fields = self.output_fields(parts)?;
                self.register(object_definition(&output_name, None, fields))?;
                named_type(Name::new(output_name), true)
            }
        };

        Ok(FieldDefinition {
            description: operation.documentation.clone().map(default_positioned),
            name: default_positioned(name),
            arguments,
            ty: default_positioned(ty),
            directives: vec![],
        })
    }

    fn input_part_type(&mut self, part: &PartDefinition) -> Result<Type, SchemaBuildError> {
        let type_name = if part.is_complex() {
            let input_name = format!("{}Input", local_name(&part.type_name));
            let input_name = valid_name("an input type", &input_name)?;

            let fields = part
                .fields
                .iter()
                .map(|field| {
                    Ok(default_positioned(InputValueDefinition {
                        description: None,
                        name: default_positioned(valid_name("an input field", &field.name)?),
                        ty: default_positioned(self.input_part_type(field)?),
                        default_value: None,
                        directives: vec![],
                    }))
                })
                .collect::<Result<Vec<_>, SchemaBuildError>>()?;

            self.register(TypeDefinition {
                extend: false,
                description: None,
                name: default_positioned(input_name.clone()),
                directives: vec![],
                kind: TypeKind::InputObject(InputObjectType { fields }),
            })?;
            input_name
        } else {
            let resolved = self.resolver.input_type(&part.type_name);
            self.register_resolved(resolved)?
        };

        Ok(wrap(part, type_name))
    }

    fn output_part_type(&mut self, part: &PartDefinition) -> Result<Type, SchemaBuildError> {
        let type_name = if part.is_complex() {
            let object_name = valid_name("an output type", local_name(&part.type_name))?;
            let fields = self.output_fields(&part.fields)?;
            self.register(object_definition(object_name.as_str(), None, fields))?;
            object_name
        } else {
            let resolved = self.resolver.output_type(&part.type_name);
            self.register_resolved(resolved)?
        };

        Ok(wrap(part, type_name))
    }

    fn output_fields(
        &mut self,
        parts: &[PartDefinition],
    ) -> Result<Vec<Positioned<FieldDefinition>>, SchemaBuildError> {
        parts
            .iter()
            .map(|part| {
                Ok(default_positioned(FieldDefinition {
                    description: None,
                    name: default_positioned(valid_name("an output field", &part.name)?),
                    arguments: vec![],
                    ty: default_positioned(self.output_part_type(part)?),
                    directives: vec![],
                }))
            })
            .collect()
    }

    fn register_resolved(&mut self, resolved: ResolvedType) -> Result<Name, SchemaBuildError> {
        if let Some(definition) = resolved.definition {
            self.register(definition)?;
        }
        Ok(resolved.name)
    }

    fn register(&mut self, definition: TypeDefinition) -> Result<(), SchemaBuildError> {
        let name = definition.name.node.to_string();

        if is_reserved(&name) {
            return Err(SchemaBuildError::ReservedName { name });
        }

        match self.types.get(&name) {
            Some(registered) if render(registered) != render(&definition) => {
                Err(SchemaBuildError::TypeConflict { name })
            }
            Some(_) => Ok(()),
            None => {
                self.types.insert(name, definition);
                Ok(())
            }
        }
    }
}

fn wrap(part: &PartDefinition, type_name: Name) -> Type {
    if part.list {
        list_type(named_type(type_name, false), !part.required)
    } else {
        named_type(type_name, !part.required)
    }
}

fn object_definition(
    name: &str,
    description: Option<String>,
    fields: Vec<Positioned<FieldDefinition>>,
) -> TypeDefinition {
    TypeDefinition {
        extend: false,
        description: description.map(default_positioned),
        name: default_positioned_name(name),
        directives: vec![],
        kind: TypeKind::Object(ObjectType {
            implements: vec![],
            fields,
        }),
    }
}

fn is_reserved(name: &str) -> bool {
    name == QUERY_ROOT_TYPENAME || name == MUTATION_ROOT_TYPENAME || is_builtin_scalar(name)
}

fn render(definition: &TypeDefinition) -> String {
    GraphQLSchema::new(vec![definition.clone()]).to_sdl()
}

fn local_name(type_name: &str) -> &str {
    type_name.rsplit(':').next().unwrap_or(type_name)
}

fn valid_name(kind: &'static str, name: &str) -> Result<Name, SchemaBuildError> {
    if is_valid_name(name) {
        Ok(Name::new(name))
    } else {
        Err(SchemaBuildError::InvalidName {
            kind,
            name: name.to_string(),
        })
    }
}
