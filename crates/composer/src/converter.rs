// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use soap_schema::{DefaultTypeResolver, GraphQLSchema, SchemaBuildError, SchemaBuilder, TypeResolver};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    caller::{DefaultSoapCaller, SoapCaller},
    client::{ClientError, ClientFactory, DocumentClientFactory, ServiceClient},
    descriptor::{EndpointDescriptor, EndpointSource},
};

#[derive(Error, Debug)]
pub enum EndpointConversionError {
    #[error("The endpoint has neither an address nor a pre-built client")]
    MissingSource,

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Build(#[from] SchemaBuildError),

    #[error("{0}")]
    Other(String),
}

/// The schema of one endpoint, with the caller its fields resolve through
pub struct EndpointSchema {
    pub schema: GraphQLSchema,
    pub caller: Arc<dyn SoapCaller>,
}

impl fmt::Debug for EndpointSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointSchema")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait SchemaConverter: Send + Sync {
    async fn convert(
        &self,
        descriptor: &EndpointDescriptor,
    ) -> Result<EndpointSchema, EndpointConversionError>;
}

/// Converts an endpoint by asking its service for a description and building the schema from it
pub struct DescriptionConverter {
    factory: Arc<dyn ClientFactory>,
}

impl DescriptionConverter {
    pub fn new(factory: Arc<dyn ClientFactory>) -> Self {
        Self { factory }
    }

    async fn client(
        &self,
        descriptor: &EndpointDescriptor,
    ) -> Result<Arc<dyn ServiceClient>, EndpointConversionError> {
        match descriptor.source() {
            Some(EndpointSource::Client(client)) => Ok(client.clone()),
            Some(EndpointSource::Address(address)) => Ok(self.factory.connect(address).await?),
            None => Err(EndpointConversionError::MissingSource),
        }
    }
}

impl Default for DescriptionConverter {
    fn default() -> Self {
        Self::new(Arc::new(DocumentClientFactory::default()))
    }
}

#[async_trait]
impl SchemaConverter for DescriptionConverter {
    async fn convert(
        &self,
        descriptor: &EndpointDescriptor,
    ) -> Result<EndpointSchema, EndpointConversionError> {
        let client = self.client(descriptor).await?;
        let description = client.describe().await?;

        let default_resolver: Arc<dyn TypeResolver> =
            Arc::new(DefaultTypeResolver::with_warnings(descriptor.debug().warnings));
        let resolver = descriptor.type_resolver().unwrap_or(&default_resolver);

        let schema = SchemaBuilder::new(resolver.as_ref()).build(&description)?;

        if descriptor.debug().debug {
            info!(
                "schema generated for '{}':\n{}",
                descriptor.label(),
                schema.to_sdl()
            );
        } else {
            debug!("schema generated for '{}'", descriptor.label());
        }

        let caller = descriptor
            .caller()
            .cloned()
            .unwrap_or_else(|| Arc::new(DefaultSoapCaller::new(client)));

        Ok(EndpointSchema { schema, caller })
    }
}
