// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use futures::future::join_all;
use tracing::{Instrument, info_span};

use crate::{
    converter::{EndpointSchema, SchemaConverter},
    descriptor::EndpointDescriptor,
    diagnostics::DiagnosticsSink,
    error::EndpointFailure,
};

#[derive(Debug)]
pub struct FetchedEndpoint {
    pub name: String,
    pub label: String,
    pub schema: EndpointSchema,
}

#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub survivors: Vec<FetchedEndpoint>,
    pub failures: Vec<EndpointFailure>,
}

/// Converts all endpoints concurrently. A failing endpoint is reported to the diagnostics sink
/// and left out; it never affects the conversion of the others.
pub struct EndpointSchemaFetcher<'a> {
    converter: &'a dyn SchemaConverter,
    diagnostics: &'a dyn DiagnosticsSink,
}

impl<'a> EndpointSchemaFetcher<'a> {
    pub fn new(converter: &'a dyn SchemaConverter, diagnostics: &'a dyn DiagnosticsSink) -> Self {
        Self {
            converter,
            diagnostics,
        }
    }

    pub async fn fetch(&self, endpoints: &[(String, EndpointDescriptor)]) -> FetchOutcome {
        let conversions = endpoints.iter().map(|(name, descriptor)| {
            let span = info_span!("endpoint", name = %name);
            async move { (name, descriptor, self.converter.convert(descriptor).await) }
                .instrument(span)
        });

        let mut outcome = FetchOutcome::default();

        for (name, descriptor, result) in join_all(conversions).await {
            let label = descriptor.label();
            match result {
                Ok(schema) => {
                    self.diagnostics.endpoint_added(name, &label);
                    outcome.survivors.push(FetchedEndpoint {
                        name: name.clone(),
                        label,
                        schema,
                    });
                }
                Err(error) => {
                    self.diagnostics.endpoint_failed(name, &label, &error);
                    outcome.failures.push(EndpointFailure {
                        endpoint: name.clone(),
                        error,
                    });
                }
            }
        }

        outcome
    }
}
