// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use async_graphql_parser::{
    Pos, Positioned,
    types::{BaseType, Type},
};
use async_graphql_value::Name;

pub fn default_positioned<T>(value: T) -> Positioned<T> {
    Positioned::new(value, Pos::default())
}

pub fn default_positioned_name(value: &str) -> Positioned<Name> {
    default_positioned(Name::new(value))
}

pub fn named_type(name: Name, nullable: bool) -> Type {
    Type {
        base: BaseType::Named(name),
        nullable,
    }
}

pub fn list_type(element: Type, nullable: bool) -> Type {
    Type {
        base: BaseType::List(Box::new(element)),
        nullable,
    }
}

/// The innermost named type, such as `Int` for `[Int!]!`
pub fn underlying_type(typ: &Type) -> &Name {
    match &typ.base {
        BaseType::Named(name) => name,
        BaseType::List(inner) => underlying_type(inner),
    }
}

/// Whether `name` is a syntactically valid GraphQL name (`/[_A-Za-z][_0-9A-Za-z]*/`)
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();

    match chars.next() {
        Some(first) if first == '_' || first.is_ascii_alphabetic() => {
            chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        }
        _ => false,
    }
}
