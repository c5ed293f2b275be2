// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Access to SOAP services.
//!
//! A [`ServiceClient`] is a connected service: it can describe itself and invoke its
//! operations. A [`ClientFactory`] connects to a service given its address.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use soap_schema::{OperationPath, ServiceDescription};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Failed to fetch '{address}': {source}")]
    Http {
        address: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("'{address}' responded with status {status}")]
    Status { address: String, status: u16 },

    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{address}' is not a valid service description: {source}")]
    InvalidDescription {
        address: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("No location is known for operation '{0}'")]
    NoLocation(String),

    #[error("{0}")]
    Other(String),
}

#[async_trait]
pub trait ServiceClient: Send + Sync {
    /// The address the client was connected to, if any
    fn address(&self) -> Option<&str> {
        None
    }

    async fn describe(&self) -> Result<ServiceDescription, ClientError>;

    async fn invoke(&self, operation: &OperationPath, input: Value) -> Result<Value, ClientError>;
}

#[async_trait]
pub trait ClientFactory: Send + Sync {
    async fn connect(&self, address: &str) -> Result<Arc<dyn ServiceClient>, ClientError>;
}

/// Connects to services published as JSON description documents.
///
/// Addresses starting with `http://` or `https://` are fetched, anything else is read as a local
/// file.
#[derive(Clone, Default)]
pub struct DocumentClientFactory {
    http: reqwest::Client,
}

impl DocumentClientFactory {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    async fn load(&self, address: &str) -> Result<String, ClientError> {
        if is_remote(address) {
            debug!("fetching service description from '{}'", address);
            let response = self
                .http
                .get(address)
                .send()
                .await
                .map_err(|source| ClientError::Http {
                    address: address.to_string(),
                    source,
                })?;

            if !response.status().is_success() {
                return Err(ClientError::Status {
                    address: address.to_string(),
                    status: response.status().as_u16(),
                });
            }

            response.text().await.map_err(|source| ClientError::Http {
                address: address.to_string(),
                source,
            })
        } else {
            debug!("reading service description from '{}'", address);
            tokio::fs::read_to_string(address)
                .await
                .map_err(|source| ClientError::Io {
                    path: address.to_string(),
                    source,
                })
        }
    }
}

#[async_trait]
impl ClientFactory for DocumentClientFactory {
    async fn connect(&self, address: &str) -> Result<Arc<dyn ServiceClient>, ClientError> {
        let document = self.load(address).await?;
        let description = ServiceDescription::from_json(&document).map_err(|source| {
            ClientError::InvalidDescription {
                address: address.to_string(),
                source,
            }
        })?;

        Ok(Arc::new(DocumentClient {
            address: address.to_string(),
            description,
            http: self.http.clone(),
        }))
    }
}

/// A service loaded from a description document. Operations are invoked by posting the JSON
/// input to the location of the operation's port.
pub struct DocumentClient {
    address: String,
    description: ServiceDescription,
    http: reqwest::Client,
}

impl DocumentClient {
    fn operation_location(&self, operation: &OperationPath) -> Option<&str> {
        self.description
            .location_of(operation)
            .or_else(|| is_remote(&self.address).then_some(self.address.as_str()))
    }
}

#[async_trait]
impl ServiceClient for DocumentClient {
    fn address(&self) -> Option<&str> {
        Some(&self.address)
    }

    async fn describe(&self) -> Result<ServiceDescription, ClientError> {
        Ok(self.description.clone())
    }

    async fn invoke(&self, operation: &OperationPath, input: Value) -> Result<Value, ClientError> {
        let location = self
            .operation_location(operation)
            .ok_or_else(|| ClientError::NoLocation(operation.operation.clone()))?;

        let body = serde_json::json!({
            "operation": operation.operation,
            "input": input,
        });

        let http_error = |source| ClientError::Http {
            address: location.to_string(),
            source,
        };

        let response = self
            .http
            .post(location)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .send()
            .await
            .map_err(http_error)?;

        if !response.status().is_success() {
            return Err(ClientError::Status {
                address: location.to_string(),
                status: response.status().as_u16(),
            });
        }

        let text = response.text().await.map_err(http_error)?;
        serde_json::from_str(&text).map_err(|e| ClientError::Other(e.to_string()))
    }
}

fn is_remote(address: &str) -> bool {
    address.starts_with("http://") || address.starts_with("https://")
}
