// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Composition of SOAP services into one GraphQL schema.
//!
//! A [`CompositionRequest`] is resolved into a [`CompositionPlan`]: either a single endpoint
//! served as is, or a set of named endpoints merged into a namespaced schema. Endpoints are
//! converted concurrently, and an endpoint that fails to convert is reported and left out
//! without affecting the others. The composed schema is handed to a [`SchemaServer`] only once
//! composition has succeeded.

pub mod caller;
pub mod client;
pub mod composition;
pub mod converter;
pub mod descriptor;
pub mod diagnostics;
pub mod error;
pub mod fetcher;
pub mod merge;
pub mod plan;
pub mod request;
pub mod serving;

use std::sync::Arc;

use tracing::{Instrument, info, info_span};

pub use caller::{CallInput, DefaultSoapCaller, LayeredCaller, ResultBuilder, ResultPath, SoapCaller};
pub use client::{ClientFactory, DocumentClientFactory, ServiceClient};
pub use composition::{ComposedSchema, EndpointBinding};
pub use converter::{DescriptionConverter, EndpointSchema, SchemaConverter};
pub use descriptor::{DebugFlags, EndpointDescriptor};
pub use diagnostics::{DiagnosticsSink, RecordingDiagnostics, TracingDiagnostics};
pub use error::{CompositionError, ConfigurationError, NoEndpointsAvailableError};
pub use merge::{NamespaceMerger, SchemaMerger};
pub use plan::{CompositionPlan, PlanKind};
pub use request::{CompositionRequest, ServerOptions};
pub use serving::{ListenOptions, SchemaServer};

use crate::{
    composition::NamespaceMergeOrchestrator, error::EndpointFailure,
    fetcher::EndpointSchemaFetcher,
};

pub struct Composer {
    converter: Arc<dyn SchemaConverter>,
    merger: Arc<dyn SchemaMerger>,
    diagnostics: Arc<dyn DiagnosticsSink>,
}

impl Composer {
    pub fn new(converter: Arc<dyn SchemaConverter>) -> Self {
        Self {
            converter,
            merger: Arc::new(NamespaceMerger),
            diagnostics: Arc::new(TracingDiagnostics),
        }
    }

    pub fn with_merger(mut self, merger: Arc<dyn SchemaMerger>) -> Self {
        self.merger = merger;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn DiagnosticsSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub async fn compose(&self, plan: &CompositionPlan) -> Result<ComposedSchema, CompositionError> {
        match plan.kind() {
            PlanKind::Direct(descriptor) => {
                let label = descriptor.label();
                let result = self
                    .converter
                    .convert(descriptor)
                    .instrument(info_span!("endpoint", name = %label))
                    .await;

                match result {
                    Ok(endpoint) => {
                        self.diagnostics.endpoint_added(&label, &label);
                        Ok(ComposedSchema::direct(endpoint, label))
                    }
                    Err(error) => {
                        self.diagnostics.endpoint_failed(&label, &label, &error);
                        Err(NoEndpointsAvailableError {
                            failures: vec![EndpointFailure {
                                endpoint: label,
                                error,
                            }],
                        }
                        .into())
                    }
                }
            }
            PlanKind::Federated(endpoints) => {
                let outcome =
                    EndpointSchemaFetcher::new(self.converter.as_ref(), self.diagnostics.as_ref())
                        .fetch(endpoints)
                        .await;

                NamespaceMergeOrchestrator::new(self.merger.as_ref())
                    .merge(outcome)
                    .await
            }
        }
    }

    /// Resolve, compose, and start serving. Nothing listens unless composition succeeds.
    pub async fn compose_and_serve<S: SchemaServer>(
        &self,
        request: &CompositionRequest,
        server: &S,
    ) -> Result<S::Handle, CompositionError> {
        let plan = CompositionPlan::resolve(request)?;
        let composed = self.compose(&plan).await?;

        let options = plan.listen_options();
        let handle = server.listen(Arc::new(composed), options).await?;
        info!(
            "serving GraphQL on port {} at path '{}'",
            options.port(),
            options.path()
        );

        Ok(handle)
    }
}

impl Default for Composer {
    fn default() -> Self {
        Self::new(Arc::new(DescriptionConverter::default()))
    }
}

/// Compose with the default converter and merger
pub async fn compose_and_serve<S: SchemaServer>(
    request: &CompositionRequest,
    server: &S,
) -> Result<S::Handle, CompositionError> {
    Composer::default().compose_and_serve(request, server).await
}
