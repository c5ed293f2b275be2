// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use thiserror::Error;

use crate::{converter::EndpointConversionError, merge::MergeError, serving::ListenError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Unrecognized configuration: {0}")]
    UnrecognizedShape(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Endpoint '{0}' has neither an address nor a pre-built client")]
    MissingEndpointSource(String),

    #[error("'{0}' is not a valid endpoint name. Endpoint names must be valid GraphQL names")]
    InvalidEndpointName(String),

    #[error("No endpoints are configured")]
    NoEndpoints,
}

#[derive(Debug)]
pub struct EndpointFailure {
    pub endpoint: String,
    pub error: EndpointConversionError,
}

#[derive(Error, Debug)]
#[error("None of the endpoints could be converted{}", failure_summary(.failures))]
pub struct NoEndpointsAvailableError {
    pub failures: Vec<EndpointFailure>,
}

fn failure_summary(failures: &[EndpointFailure]) -> String {
    failures
        .iter()
        .map(|failure| format!("\n  {}: {}", failure.endpoint, failure.error))
        .collect()
}

#[derive(Error, Debug)]
pub enum CompositionError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    NoEndpointsAvailable(#[from] NoEndpointsAvailableError),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error(transparent)]
    Listen(#[from] ListenError),
}
