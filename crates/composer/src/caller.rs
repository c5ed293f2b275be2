// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Invocation of SOAP operations on behalf of GraphQL fields.
//!
//! A [`SoapCaller`] performs the call. Result shaping is a separate capability: a
//! [`ResultBuilder`] may reshape a raw result or decline, and a [`LayeredCaller`] combines one
//! with the caller below it.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use soap_schema::OperationPath;
use thiserror::Error;

use crate::client::{ClientError, ServiceClient};

#[derive(Debug, Clone, PartialEq)]
pub struct CallInput {
    pub operation: OperationPath,
    pub arguments: Value,
}

#[derive(Error, Debug)]
pub enum CallError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Unexpected result for '{operation}': {message}")]
    UnexpectedResult { operation: String, message: String },
}

#[async_trait]
pub trait SoapCaller: Send + Sync {
    async fn call(&self, input: &CallInput) -> Result<Value, CallError>;
}

/// Invokes operations through a service client and returns the raw result
pub struct DefaultSoapCaller {
    client: Arc<dyn ServiceClient>,
}

impl DefaultSoapCaller {
    pub fn new(client: Arc<dyn ServiceClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SoapCaller for DefaultSoapCaller {
    async fn call(&self, input: &CallInput) -> Result<Value, CallError> {
        Ok(self
            .client
            .invoke(&input.operation, input.arguments.clone())
            .await?)
    }
}

pub trait ResultBuilder: Send + Sync {
    /// The shaped result, or `None` to keep the raw one
    fn build_result(&self, input: &CallInput, result: &Value) -> Option<Value>;
}

pub struct LayeredCaller {
    result_builder: Arc<dyn ResultBuilder>,
    base: Arc<dyn SoapCaller>,
}

impl LayeredCaller {
    pub fn new(result_builder: Arc<dyn ResultBuilder>, base: Arc<dyn SoapCaller>) -> Self {
        Self {
            result_builder,
            base,
        }
    }
}

#[async_trait]
impl SoapCaller for LayeredCaller {
    async fn call(&self, input: &CallInput) -> Result<Value, CallError> {
        let raw = self.base.call(input).await?;

        Ok(self
            .result_builder
            .build_result(input, &raw)
            .unwrap_or(raw))
    }
}

/// Picks a nested value out of the raw result, such as `["Result", "$value"]`. Results without
/// the path are kept as they are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPath {
    segments: Vec<String>,
}

impl ResultPath {
    pub fn new<S: Into<String>>(segments: impl IntoIterator<Item = S>) -> Self {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }
}

impl ResultBuilder for ResultPath {
    fn build_result(&self, _input: &CallInput, result: &Value) -> Option<Value> {
        self.segments
            .iter()
            .try_fold(result, |value, segment| value.get(segment.as_str()))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    struct FixedCaller(Value);

    #[async_trait]
    impl SoapCaller for FixedCaller {
        async fn call(&self, _input: &CallInput) -> Result<Value, CallError> {
            Ok(self.0.clone())
        }
    }

    fn input() -> CallInput {
        CallInput {
            operation: OperationPath {
                service: "Calculator".to_string(),
                port: "CalculatorSoap".to_string(),
                operation: "Add".to_string(),
            },
            arguments: json!({ "intA": 1, "intB": 2 }),
        }
    }

    #[tokio::test]
    async fn extracts_nested_result() {
        let caller = LayeredCaller::new(
            Arc::new(ResultPath::new(["Result", "$value"])),
            Arc::new(FixedCaller(json!({ "Result": { "$value": 3 } }))),
        );

        assert_eq!(caller.call(&input()).await.unwrap(), json!(3));
    }

    #[tokio::test]
    async fn keeps_raw_result_without_path() {
        let raw = json!({ "AddResult": 3 });
        let caller = LayeredCaller::new(
            Arc::new(ResultPath::new(["Result", "$value"])),
            Arc::new(FixedCaller(raw.clone())),
        );

        assert_eq!(caller.call(&input()).await.unwrap(), raw);
    }
}
