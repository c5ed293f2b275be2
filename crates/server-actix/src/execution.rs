// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use async_trait::async_trait;
use composer::{ComposedSchema, caller::CallError};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// The body of a GraphQL POST request
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLRequest {
    pub query: String,
    #[serde(default)]
    pub operation_name: Option<String>,
    #[serde(default)]
    pub variables: Option<Map<String, Value>>,
}

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Call(#[from] CallError),
}

/// Executes GraphQL operations against a composed schema
#[async_trait]
pub trait OperationExecutor: Send + Sync {
    async fn execute(
        &self,
        schema: &ComposedSchema,
        request: GraphQLRequest,
    ) -> Result<Value, ExecutionError>;
}
