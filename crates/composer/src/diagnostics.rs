// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::{Mutex, PoisonError};

use tracing::{info, warn};

use crate::converter::EndpointConversionError;

/// Receives the outcome of converting each endpoint
pub trait DiagnosticsSink: Send + Sync {
    fn endpoint_added(&self, _endpoint: &str, _label: &str) {}

    fn endpoint_failed(&self, endpoint: &str, label: &str, error: &EndpointConversionError);
}

/// Reports through `tracing`
#[derive(Debug, Default)]
pub struct TracingDiagnostics;

impl DiagnosticsSink for TracingDiagnostics {
    fn endpoint_added(&self, endpoint: &str, label: &str) {
        info!("added SOAP endpoint '{}' from '{}'", endpoint, label);
    }

    fn endpoint_failed(&self, endpoint: &str, label: &str, error: &EndpointConversionError) {
        warn!("skipping SOAP endpoint '{}' ({}): {}", endpoint, label, error);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticEvent {
    Added {
        endpoint: String,
        label: String,
    },
    Failed {
        endpoint: String,
        label: String,
        message: String,
    },
}

/// Keeps every event, and forwards it to `tracing` as well
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn failed_endpoints(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                DiagnosticEvent::Failed { endpoint, .. } => Some(endpoint),
                DiagnosticEvent::Added { .. } => None,
            })
            .collect()
    }

    fn record(&self, event: DiagnosticEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl DiagnosticsSink for RecordingDiagnostics {
    fn endpoint_added(&self, endpoint: &str, label: &str) {
        TracingDiagnostics.endpoint_added(endpoint, label);
        self.record(DiagnosticEvent::Added {
            endpoint: endpoint.to_string(),
            label: label.to_string(),
        });
    }

    fn endpoint_failed(&self, endpoint: &str, label: &str, error: &EndpointConversionError) {
        TracingDiagnostics.endpoint_failed(endpoint, label, error);
        self.record(DiagnosticEvent::Failed {
            endpoint: endpoint.to_string(),
            label: label.to_string(),
            message: error.to_string(),
        });
    }
}
