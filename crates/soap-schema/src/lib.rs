// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! GraphQL schemas for SOAP services.
//!
//! A [`ServiceDescription`] is turned into a [`GraphQLSchema`] by [`SchemaBuilder`], which maps
//! every wire type name through a [`TypeResolver`]. Callers customize that mapping by layering
//! [`TypeOverride`]s (such as [`EnumOverride`]) over the [`DefaultTypeResolver`].

pub mod builder;
pub mod description;
pub mod enum_synthesis;
pub mod schema;
mod sdl;
pub mod type_normalization;
pub mod type_resolver;

pub use builder::{SchemaBuildError, SchemaBuilder};
pub use description::{OperationPath, ServiceDescription};
pub use enum_synthesis::EnumSynthesisDescriptor;
pub use schema::{GraphQLSchema, MUTATION_ROOT_TYPENAME, QUERY_ROOT_TYPENAME, SchemaParseError};
pub use type_resolver::{
    DefaultTypeResolver, EnumOverride, LayeredTypeResolver, ResolvedType, Signature, TypeOverride,
    TypeResolver,
};
