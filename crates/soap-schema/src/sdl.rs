// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::fmt::{Display, Formatter, Result};

use async_graphql_parser::{
    Positioned,
    types::{FieldDefinition, InputValueDefinition, TypeDefinition, TypeKind},
};
use async_graphql_value::Name;

use crate::schema::GraphQLSchema;

impl Display for GraphQLSchema {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        for (index, type_definition) in self.type_definitions().iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write_type_definition(f, type_definition)?;
        }
        Ok(())
    }
}

fn write_type_definition(f: &mut Formatter<'_>, td: &TypeDefinition) -> Result {
    write_description(f, td.description.as_ref().map(|d| d.node.as_str()), "")?;

    let name = &td.name.node;

    match &td.kind {
        TypeKind::Scalar => writeln!(f, "scalar {name}"),
        TypeKind::Object(object_type) => {
            write!(f, "type {name}")?;
            write_implements(f, &object_type.implements)?;
            write_fields(f, &object_type.fields)
        }
        TypeKind::Interface(interface_type) => {
            write!(f, "interface {name}")?;
            write_implements(f, &interface_type.implements)?;
            write_fields(f, &interface_type.fields)
        }
        TypeKind::Union(union_type) => {
            let members: Vec<&str> = union_type
                .members
                .iter()
                .map(|member| member.node.as_str())
                .collect();
            writeln!(f, "union {name} = {}", members.join(" | "))
        }
        TypeKind::Enum(enum_type) => {
            writeln!(f, "enum {name} {{")?;
            for value in &enum_type.values {
                write_description(
                    f,
                    value.node.description.as_ref().map(|d| d.node.as_str()),
                    "  ",
                )?;
                writeln!(f, "  {}", value.node.value.node)?;
            }
            writeln!(f, "}}")
        }
        TypeKind::InputObject(input_type) => {
            writeln!(f, "input {name} {{")?;
            for field in &input_type.fields {
                write_description(
                    f,
                    field.node.description.as_ref().map(|d| d.node.as_str()),
                    "  ",
                )?;
                write!(f, "  ")?;
                write_input_value(f, &field.node)?;
                writeln!(f)?;
            }
            writeln!(f, "}}")
        }
    }
}

fn write_implements(f: &mut Formatter<'_>, implements: &[Positioned<Name>]) -> Result {
    if !implements.is_empty() {
        let names: Vec<&str> = implements.iter().map(|name| name.node.as_str()).collect();
        write!(f, " implements {}", names.join(" & "))?;
    }
    Ok(())
}

fn write_fields(f: &mut Formatter<'_>, fields: &[Positioned<FieldDefinition>]) -> Result {
    writeln!(f, " {{")?;
    for field in fields {
        let field = &field.node;
        write_description(f, field.description.as_ref().map(|d| d.node.as_str()), "  ")?;
        write!(f, "  {}", field.name.node)?;

        if !field.arguments.is_empty() {
            write!(f, "(")?;
            for (index, argument) in field.arguments.iter().enumerate() {
                if index > 0 {
                    write!(f, ", ")?;
                }
                write_input_value(f, &argument.node)?;
            }
            write!(f, ")")?;
        }

        writeln!(f, ": {}", field.ty.node)?;
    }
    writeln!(f, "}}")
}

fn write_input_value(f: &mut Formatter<'_>, value: &InputValueDefinition) -> Result {
    write!(f, "{}: {}", value.name.node, value.ty.node)?;
    if let Some(default_value) = &value.default_value {
        write!(f, " = {}", default_value.node)?;
    }
    Ok(())
}

fn write_description(f: &mut Formatter<'_>, description: Option<&str>, indent: &str) -> Result {
    match description {
        Some(description) => {
            writeln!(f, "{indent}\"\"\"")?;
            for line in description.lines() {
                writeln!(f, "{indent}{}", line.replace("\"\"\"", "\\\"\"\""))?;
            }
            writeln!(f, "{indent}\"\"\"")
        }
        None => Ok(()),
    }
}
