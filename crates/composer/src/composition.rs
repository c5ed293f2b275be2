// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{collections::BTreeMap, fmt, sync::Arc};

use soap_schema::GraphQLSchema;

use crate::{
    caller::SoapCaller,
    converter::EndpointSchema,
    error::{CompositionError, NoEndpointsAvailableError},
    fetcher::FetchOutcome,
    merge::{NamespacedSchema, SchemaMerger},
};

/// The caller serving one endpoint's fields. A direct composition has a single binding without
/// a namespace.
#[derive(Clone)]
pub struct EndpointBinding {
    pub namespace: Option<String>,
    pub label: String,
    pub caller: Arc<dyn SoapCaller>,
}

impl fmt::Debug for EndpointBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointBinding")
            .field("namespace", &self.namespace)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// A schema ready to be served
#[derive(Debug, Clone)]
pub struct ComposedSchema {
    schema: GraphQLSchema,
    endpoints: Vec<EndpointBinding>,
    type_origins: BTreeMap<String, String>,
}

impl ComposedSchema {
    pub fn direct(endpoint: EndpointSchema, label: String) -> Self {
        Self {
            schema: endpoint.schema,
            endpoints: vec![EndpointBinding {
                namespace: None,
                label,
                caller: endpoint.caller,
            }],
            type_origins: BTreeMap::new(),
        }
    }

    pub fn schema(&self) -> &GraphQLSchema {
        &self.schema
    }

    pub fn sdl(&self) -> String {
        self.schema.to_sdl()
    }

    pub fn endpoints(&self) -> &[EndpointBinding] {
        &self.endpoints
    }

    pub fn is_federated(&self) -> bool {
        self.endpoints
            .iter()
            .any(|endpoint| endpoint.namespace.is_some())
    }

    pub fn namespaces(&self) -> Vec<&str> {
        self.endpoints
            .iter()
            .filter_map(|endpoint| endpoint.namespace.as_deref())
            .collect()
    }

    /// The binding for `namespace` (`None` for a direct composition)
    pub fn binding(&self, namespace: Option<&str>) -> Option<&EndpointBinding> {
        self.endpoints
            .iter()
            .find(|endpoint| endpoint.namespace.as_deref() == namespace)
    }

    /// The namespace a merged type came from
    pub fn origin_of(&self, type_name: &str) -> Option<&str> {
        self.type_origins.get(type_name).map(String::as_str)
    }
}

/// Merges the endpoints that converted successfully, each under its own name
pub struct NamespaceMergeOrchestrator<'a> {
    merger: &'a dyn SchemaMerger,
}

impl<'a> NamespaceMergeOrchestrator<'a> {
    pub fn new(merger: &'a dyn SchemaMerger) -> Self {
        Self { merger }
    }

    pub async fn merge(&self, outcome: FetchOutcome) -> Result<ComposedSchema, CompositionError> {
        let FetchOutcome {
            mut survivors,
            failures,
        } = outcome;

        if survivors.is_empty() {
            return Err(NoEndpointsAvailableError { failures }.into());
        }

        survivors.sort_by(|a, b| a.name.cmp(&b.name));

        let (schemas, endpoints): (Vec<_>, Vec<_>) = survivors
            .into_iter()
            .map(|survivor| {
                let schema = NamespacedSchema {
                    namespace: survivor.name.clone(),
                    prefix: survivor.name.clone(),
                    schema: survivor.schema.schema,
                };
                let binding = EndpointBinding {
                    namespace: Some(survivor.name),
                    label: survivor.label,
                    caller: survivor.schema.caller,
                };
                (schema, binding)
            })
            .unzip();

        let merged = self.merger.merge(schemas).await?;

        Ok(ComposedSchema {
            schema: merged.schema,
            endpoints,
            type_origins: merged.type_origins,
        })
    }
}
