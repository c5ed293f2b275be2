// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Mapping of wire type names to GraphQL types.
//!
//! A [`TypeResolver`] is total: every wire type name resolves to some GraphQL type. Customization
//! happens through [`TypeOverride`]s, which may decline a name by returning `None`. A
//! [`LayeredTypeResolver`] tries its override first and delegates everything the override
//! declines to its base resolver. Layers chain, so several overrides for one endpoint are
//! expressed as a stack of `LayeredTypeResolver`s ending in a [`DefaultTypeResolver`].

use std::sync::Arc;

use async_graphql_parser::types::TypeDefinition;
use async_graphql_value::Name;

use crate::enum_synthesis::EnumSynthesisDescriptor;

/// The outcome of resolving a wire type name.
#[derive(Debug, Clone)]
pub struct ResolvedType {
    /// Name of the GraphQL type to reference
    pub name: Name,
    /// Definition the schema must include for `name` to resolve (`None` for built-in scalars)
    pub definition: Option<TypeDefinition>,
}

impl ResolvedType {
    pub fn named(name: &str) -> Self {
        Self {
            name: Name::new(name),
            definition: None,
        }
    }

    pub fn defined(definition: TypeDefinition) -> Self {
        Self {
            name: definition.name.node.clone(),
            definition: Some(definition),
        }
    }
}

pub trait TypeResolver: Send + Sync {
    fn input_type(&self, type_name: &str) -> ResolvedType;

    fn output_type(&self, type_name: &str) -> ResolvedType;
}

/// Maps XSD primitive types to GraphQL scalars.
///
/// Namespace qualifiers (`xsd:int`) are ignored and an encoded enumeration (`string|a,b`)
/// resolves as its base type. Names without a known mapping resolve to `String`.
#[derive(Debug, Clone, Default)]
pub struct DefaultTypeResolver {
    warn_unknown: bool,
}

impl DefaultTypeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log a warning for every wire type name without a known mapping
    pub fn with_warnings(warn_unknown: bool) -> Self {
        Self { warn_unknown }
    }

    pub fn scalar_for(type_name: &str) -> Option<&'static str> {
        let base = type_name
            .split_once('|')
            .map_or(type_name, |(base, _)| base);
        let local_name = base.rsplit(':').next().unwrap_or(base);

        let scalar = match local_name {
            "string" | "normalizedString" | "token" | "anyURI" | "QName" | "NOTATION"
            | "language" | "Name" | "NCName" | "ID" | "IDREF" | "ENTITY" | "date" | "dateTime"
            | "time" | "duration" | "gYear" | "gYearMonth" | "gMonth" | "gMonthDay" | "gDay"
            | "base64Binary" | "hexBinary" | "char" | "guid" => "String",
            "int" | "integer" | "long" | "short" | "byte" | "unsignedInt" | "unsignedShort"
            | "unsignedByte" | "unsignedLong" | "positiveInteger" | "negativeInteger"
            | "nonNegativeInteger" | "nonPositiveInteger" => "Int",
            "float" | "double" | "decimal" => "Float",
            "boolean" => "Boolean",
            _ => return None,
        };

        Some(scalar)
    }

    fn resolve(&self, type_name: &str) -> ResolvedType {
        match Self::scalar_for(type_name) {
            Some(scalar) => ResolvedType::named(scalar),
            None => {
                if self.warn_unknown {
                    tracing::warn!("no mapping for wire type '{}', using String", type_name);
                }
                ResolvedType::named("String")
            }
        }
    }
}

impl TypeResolver for DefaultTypeResolver {
    fn input_type(&self, type_name: &str) -> ResolvedType {
        self.resolve(type_name)
    }

    fn output_type(&self, type_name: &str) -> ResolvedType {
        self.resolve(type_name)
    }
}

/// A partial type mapping. Returning `None` leaves the name to the resolver below.
pub trait TypeOverride: Send + Sync {
    fn input_type(&self, type_name: &str) -> Option<ResolvedType>;

    fn output_type(&self, _type_name: &str) -> Option<ResolvedType> {
        None
    }
}

pub struct LayeredTypeResolver {
    type_override: Arc<dyn TypeOverride>,
    base: Arc<dyn TypeResolver>,
}

impl LayeredTypeResolver {
    pub fn new(type_override: Arc<dyn TypeOverride>, base: Arc<dyn TypeResolver>) -> Self {
        Self {
            type_override,
            base,
        }
    }

    /// Layer `type_override` over the default resolver
    pub fn over_default(type_override: Arc<dyn TypeOverride>) -> Self {
        Self::new(type_override, Arc::new(DefaultTypeResolver::new()))
    }
}

impl TypeResolver for LayeredTypeResolver {
    fn input_type(&self, type_name: &str) -> ResolvedType {
        self.type_override
            .input_type(type_name)
            .unwrap_or_else(|| self.base.input_type(type_name))
    }

    fn output_type(&self, type_name: &str) -> ResolvedType {
        self.type_override
            .output_type(type_name)
            .unwrap_or_else(|| self.base.output_type(type_name))
    }
}

/// The wire type names an override recognizes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signature {
    Exact(String),
    Prefix(String),
}

impl Signature {
    pub fn matches(&self, type_name: &str) -> bool {
        match self {
            Signature::Exact(signature) => type_name == signature,
            Signature::Prefix(prefix) => type_name.starts_with(prefix.as_str()),
        }
    }

    /// The base wire type declared by the signature (the part before `|`)
    pub fn base(&self) -> Option<&str> {
        let signature = match self {
            Signature::Exact(signature) | Signature::Prefix(signature) => signature,
        };
        signature.split_once('|').map(|(base, _)| base)
    }
}

/// Replaces matching encoded enumeration names (`string|EUR,USD`) on input with an enum of the
/// given name.
#[derive(Debug, Clone)]
pub struct EnumOverride {
    enum_name: String,
    signature: Signature,
}

impl EnumOverride {
    pub fn new(enum_name: impl Into<String>, signature: Signature) -> Self {
        Self {
            enum_name: enum_name.into(),
            signature,
        }
    }

    pub fn exact(enum_name: impl Into<String>, signature: impl Into<String>) -> Self {
        Self::new(enum_name, Signature::Exact(signature.into()))
    }

    pub fn prefix(enum_name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self::new(enum_name, Signature::Prefix(prefix.into()))
    }

    pub fn enum_name(&self) -> &str {
        &self.enum_name
    }
}

impl TypeOverride for EnumOverride {
    fn input_type(&self, type_name: &str) -> Option<ResolvedType> {
        if !self.signature.matches(type_name) {
            return None;
        }

        let base = self.signature.base()?;
        EnumSynthesisDescriptor::decode_with_base(type_name, base)
            .map(|descriptor| ResolvedType::defined(descriptor.to_type_definition(&self.enum_name)))
    }
}

#[cfg(test)]
mod tests {
    use async_graphql_parser::types::TypeKind;

    use super::*;

    const CURRENCY_PREFIX: &str = "string|AFA,ALL,DZD";

    fn currency_resolver() -> LayeredTypeResolver {
        LayeredTypeResolver::over_default(Arc::new(EnumOverride::prefix(
            "Currency",
            CURRENCY_PREFIX,
        )))
    }

    fn enum_values(resolved: &ResolvedType) -> Vec<String> {
        match resolved.definition.as_ref().map(|td| &td.kind) {
            Some(TypeKind::Enum(enum_type)) => enum_type
                .values
                .iter()
                .map(|value| value.node.value.node.to_string())
                .collect(),
            _ => panic!("expected an enum definition"),
        }
    }

    #[test]
    fn default_mapping() {
        let resolver = DefaultTypeResolver::new();

        for (wire, graphql) in [
            ("string", "String"),
            ("s:string", "String"),
            ("xsd:int", "Int"),
            ("unsignedShort", "Int"),
            ("double", "Float"),
            ("decimal", "Float"),
            ("boolean", "Boolean"),
            ("dateTime", "String"),
            ("string|EUR,USD", "String"),
            ("tns:SomethingElse", "String"),
        ] {
            let resolved = resolver.input_type(wire);
            assert_eq!(resolved.name.as_str(), graphql, "{wire}");
            assert!(resolved.definition.is_none());
        }
    }

    #[test]
    fn prefix_override_synthesizes_enum() {
        let resolved = currency_resolver().input_type("string|AFA,ALL,DZD,ARS");

        assert_eq!(resolved.name.as_str(), "Currency");
        assert_eq!(enum_values(&resolved), vec!["AFA", "ALL", "DZD", "ARS"]);
    }

    #[test]
    fn exact_override_requires_exact_match() {
        let resolver = LayeredTypeResolver::over_default(Arc::new(EnumOverride::exact(
            "AstronomicalUnit",
            "string|meters,kilometers,miles",
        )));

        let matched = resolver.input_type("string|meters,kilometers,miles");
        assert_eq!(matched.name.as_str(), "AstronomicalUnit");
        assert_eq!(enum_values(&matched), vec!["meters", "kilometers", "miles"]);

        let unmatched = resolver.input_type("string|meters,kilometers");
        assert_eq!(unmatched.name.as_str(), "String");
        assert!(unmatched.definition.is_none());
    }

    #[test]
    fn unmatched_names_resolve_like_base() {
        let base = DefaultTypeResolver::new();
        let resolver = currency_resolver();

        for type_name in [
            "string",
            "int",
            "s:double",
            "string|EUR,USD",
            "string|AFA,ALL",
            "tns:Weather",
            "",
        ] {
            let expected = base.input_type(type_name);
            let actual = resolver.input_type(type_name);

            assert_eq!(actual.name, expected.name, "{type_name}");
            assert!(actual.definition.is_none(), "{type_name}");
        }
    }

    #[test]
    fn malformed_match_falls_through() {
        // Matches the prefix but a value is not a valid enum value
        let resolved = currency_resolver().input_type("string|AFA,ALL,DZD,A-B");

        assert_eq!(resolved.name.as_str(), "String");
        assert!(resolved.definition.is_none());
    }

    #[test]
    fn output_types_are_not_overridden_by_enum() {
        let resolved = currency_resolver().output_type("string|AFA,ALL,DZD");

        assert_eq!(resolved.name.as_str(), "String");
    }

    #[test]
    fn overrides_chain() {
        let inner = Arc::new(currency_resolver());
        let resolver = LayeredTypeResolver::new(
            Arc::new(EnumOverride::exact("Unit", "string|meters,miles")),
            inner,
        );

        assert_eq!(
            resolver.input_type("string|meters,miles").name.as_str(),
            "Unit"
        );
        assert_eq!(
            resolver.input_type("string|AFA,ALL,DZD").name.as_str(),
            "Currency"
        );
        assert_eq!(resolver.input_type("int").name.as_str(), "Int");
    }
}
