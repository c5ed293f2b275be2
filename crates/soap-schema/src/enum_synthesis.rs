// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Encoded enumeration type names.
//!
//! Services describe restricted value sets with a type name such as `string|EUR,USD,GBP`: the
//! base wire type, a `|`, and the allowed values separated by commas. Decoding such a name yields
//! the members of a GraphQL enum, in the order given.

use std::collections::HashSet;

use async_graphql_parser::types::{EnumType, EnumValueDefinition, TypeDefinition, TypeKind};

use crate::type_normalization::{default_positioned, default_positioned_name, is_valid_name};

const BASE_SEPARATOR: char = '|';
const VALUE_SEPARATOR: char = ',';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumSynthesisDescriptor {
    base: String,
    values: Vec<String>,
}

impl EnumSynthesisDescriptor {
    /// Decode an encoded type name. Returns `None` for names that are not well-formed: no base,
    /// no values, or a value that is empty, duplicated, reserved, or not a valid GraphQL name.
    pub fn decode(type_name: &str) -> Option<Self> {
        let (base, values) = type_name.split_once(BASE_SEPARATOR)?;

        if base.is_empty() {
            return None;
        }

        let values: Vec<String> = values
            .split(VALUE_SEPARATOR)
            .map(str::to_string)
            .collect();

        let mut seen = HashSet::new();
        let well_formed = values
            .iter()
            .all(|value| is_valid_enum_value(value) && seen.insert(value.as_str()));

        well_formed.then(|| Self {
            base: base.to_string(),
            values,
        })
    }

    /// Decode only if the base wire type is `base`
    pub fn decode_with_base(type_name: &str, base: &str) -> Option<Self> {
        Self::decode(type_name).filter(|descriptor| descriptor.base == base)
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn to_type_definition(&self, enum_name: &str) -> TypeDefinition {
        TypeDefinition {
            extend: false,
            description: None,
            name: default_positioned_name(enum_name),
            directives: vec![],
            kind: TypeKind::Enum(EnumType {
                values: self
                    .values
                    .iter()
                    .map(|value| {
                        default_positioned(EnumValueDefinition {
                            description: None,
                            value: default_positioned_name(value),
                            directives: vec![],
                        })
                    })
                    .collect(),
            }),
        }
    }
}

fn is_valid_enum_value(value: &str) -> bool {
    is_valid_name(value) && !matches!(value, "true" | "false" | "null")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enum_values(td: &TypeDefinition) -> Vec<&str> {
        match &td.kind {
            TypeKind::Enum(enum_type) => enum_type
                .values
                .iter()
                .map(|value| value.node.value.node.as_str())
                .collect(),
            _ => panic!("expected an enum"),
        }
    }

    #[test]
    fn decodes_values_in_order() {
        let descriptor = EnumSynthesisDescriptor::decode("string|EUR,USD,GBP").unwrap();

        assert_eq!(descriptor.base(), "string");
        assert_eq!(descriptor.values(), ["EUR", "USD", "GBP"]);

        let td = descriptor.to_type_definition("Currency");
        assert_eq!(td.name.node.as_str(), "Currency");
        assert_eq!(enum_values(&td), vec!["EUR", "USD", "GBP"]);
    }

    #[test]
    fn single_value() {
        let descriptor = EnumSynthesisDescriptor::decode("string|meters").unwrap();

        assert_eq!(descriptor.values(), ["meters"]);
    }

    #[test]
    fn malformed_names() {
        for type_name in [
            "string",
            "|EUR,USD",
            "string|",
            "string|EUR,,USD",
            "string|EUR,USD,",
            "string|EUR,EUR",
            "string|light-year",
            "string|1st",
            "string|true,false",
        ] {
            assert_eq!(
                EnumSynthesisDescriptor::decode(type_name),
                None,
                "{type_name} should not decode"
            );
        }
    }

    #[test]
    fn requires_matching_base() {
        assert!(EnumSynthesisDescriptor::decode_with_base("string|EUR", "string").is_some());
        assert!(EnumSynthesisDescriptor::decode_with_base("int|EUR", "string").is_none());
    }

    #[test]
    fn decoding_is_deterministic() {
        let first = EnumSynthesisDescriptor::decode("string|a,b,c");
        let second = EnumSynthesisDescriptor::decode("string|a,b,c");

        assert_eq!(first, second);
    }
}
