// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Description of a SOAP service: its services, ports, and the operations each port exposes,
//! with parts typed by wire type name.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDescription {
    #[serde(default)]
    pub documentation: Option<String>,
    pub services: Vec<ServiceDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    pub name: String,
    pub ports: Vec<PortDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortDefinition {
    pub name: String,
    /// Address operations of this port are invoked at
    #[serde(default)]
    pub location: Option<String>,
    pub operations: Vec<OperationDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationDefinition {
    pub name: String,
    #[serde(default)]
    pub documentation: Option<String>,
    #[serde(default)]
    pub input: Vec<PartDefinition>,
    #[serde(default)]
    pub output: Vec<PartDefinition>,
}

/// A message part. Parts with `fields` are complex types named by `type_name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub list: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub fields: Vec<PartDefinition>,
}

impl PartDefinition {
    pub fn is_complex(&self) -> bool {
        !self.fields.is_empty()
    }
}

/// Identifies an operation for invocation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationPath {
    pub service: String,
    pub port: String,
    pub operation: String,
}

pub struct OperationRef<'a> {
    pub service: &'a ServiceDefinition,
    pub port: &'a PortDefinition,
    pub operation: &'a OperationDefinition,
}

impl OperationRef<'_> {
    pub fn path(&self) -> OperationPath {
        OperationPath {
            service: self.service.name.clone(),
            port: self.port.name.clone(),
            operation: self.operation.name.clone(),
        }
    }
}

impl ServiceDescription {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// All operations, in declaration order across services and ports
    pub fn operations(&self) -> impl Iterator<Item = OperationRef<'_>> {
        self.services.iter().flat_map(|service| {
            service.ports.iter().flat_map(move |port| {
                port.operations.iter().map(move |operation| OperationRef {
                    service,
                    port,
                    operation,
                })
            })
        })
    }

    /// The first operation named `name`
    pub fn find_operation(&self, name: &str) -> Option<OperationRef<'_>> {
        self.operations().find(|op| op.operation.name == name)
    }

    pub fn location_of(&self, path: &OperationPath) -> Option<&str> {
        self.services
            .iter()
            .filter(|service| service.name == path.service)
            .flat_map(|service| service.ports.iter())
            .find(|port| port.name == path.port)
            .and_then(|port| port.location.as_deref())
    }
}
