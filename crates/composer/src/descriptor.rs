// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{fmt, sync::Arc};

use soap_schema::{DefaultTypeResolver, LayeredTypeResolver, TypeOverride, TypeResolver};

use crate::{caller::SoapCaller, client::ServiceClient};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebugFlags {
    /// Log the generated schema of the endpoint
    pub debug: bool,
    /// Warn about wire types without a GraphQL mapping
    pub warnings: bool,
}

/// Where an endpoint's service comes from
pub enum EndpointSource<'a> {
    Client(&'a Arc<dyn ServiceClient>),
    Address(&'a str),
}

/// Everything needed to turn one SOAP endpoint into a GraphQL schema.
///
/// An endpoint needs a service address or a pre-built client. When both are present the client
/// is used and the address only labels the endpoint in diagnostics.
#[derive(Clone, Default)]
pub struct EndpointDescriptor {
    address: Option<String>,
    client: Option<Arc<dyn ServiceClient>>,
    caller: Option<Arc<dyn SoapCaller>>,
    type_resolver: Option<Arc<dyn TypeResolver>>,
    debug: DebugFlags,
}

impl EndpointDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_address(address: impl Into<String>) -> Self {
        Self::new().with_address(address)
    }

    pub fn from_client(client: Arc<dyn ServiceClient>) -> Self {
        Self::new().with_client(client)
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_client(mut self, client: Arc<dyn ServiceClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn with_caller(mut self, caller: Arc<dyn SoapCaller>) -> Self {
        self.caller = Some(caller);
        self
    }

    pub fn with_type_resolver(mut self, type_resolver: Arc<dyn TypeResolver>) -> Self {
        self.type_resolver = Some(type_resolver);
        self
    }

    /// Layer `type_override` over the current resolver (or the default one)
    pub fn with_type_override(mut self, type_override: Arc<dyn TypeOverride>) -> Self {
        let base = self
            .type_resolver
            .take()
            .unwrap_or_else(|| Arc::new(DefaultTypeResolver::with_warnings(self.debug.warnings)));

        self.type_resolver = Some(Arc::new(LayeredTypeResolver::new(type_override, base)));
        self
    }

    pub fn with_debug(mut self, debug: DebugFlags) -> Self {
        self.debug = debug;
        self
    }

    /// The address, ignoring blank ones
    pub fn address(&self) -> Option<&str> {
        self.address
            .as_deref()
            .filter(|address| !address.trim().is_empty())
    }

    pub fn client(&self) -> Option<&Arc<dyn ServiceClient>> {
        self.client.as_ref()
    }

    pub fn caller(&self) -> Option<&Arc<dyn SoapCaller>> {
        self.caller.as_ref()
    }

    pub fn type_resolver(&self) -> Option<&Arc<dyn TypeResolver>> {
        self.type_resolver.as_ref()
    }

    pub fn debug(&self) -> DebugFlags {
        self.debug
    }

    pub fn source(&self) -> Option<EndpointSource<'_>> {
        match (&self.client, self.address()) {
            (Some(client), _) => Some(EndpointSource::Client(client)),
            (None, Some(address)) => Some(EndpointSource::Address(address)),
            (None, None) => None,
        }
    }

    pub fn has_source(&self) -> bool {
        self.source().is_some()
    }

    /// A human readable name for diagnostics
    pub fn label(&self) -> String {
        self.address()
            .or_else(|| self.client.as_ref().and_then(|client| client.address()))
            .unwrap_or("<pre-built client>")
            .to_string()
    }
}

impl fmt::Debug for EndpointDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointDescriptor")
            .field("address", &self.address)
            .field("client", &self.client.is_some())
            .field("caller", &self.caller.is_some())
            .field("type_resolver", &self.type_resolver.is_some())
            .field("debug", &self.debug)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::Value;
    use soap_schema::{EnumOverride, OperationPath, ServiceDescription};

    use super::*;
    use crate::client::ClientError;

    struct NamedClient;

    #[async_trait]
    impl ServiceClient for NamedClient {
        fn address(&self) -> Option<&str> {
            Some("memory://calculator")
        }

        async fn describe(&self) -> Result<ServiceDescription, ClientError> {
            Err(ClientError::Other("unused".to_string()))
        }

        async fn invoke(&self, _: &OperationPath, _: Value) -> Result<Value, ClientError> {
            Err(ClientError::Other("unused".to_string()))
        }
    }

    #[test]
    fn client_takes_precedence() {
        let descriptor = EndpointDescriptor::from_address("http://calculator.test/wsdl")
            .with_client(Arc::new(NamedClient));

        assert!(matches!(descriptor.source(), Some(EndpointSource::Client(_))));
        assert_eq!(descriptor.label(), "http://calculator.test/wsdl");
    }

    #[test]
    fn blank_address_is_no_source() {
        let descriptor = EndpointDescriptor::from_address("  ");

        assert!(!descriptor.has_source());
        assert_eq!(descriptor.label(), "<pre-built client>");
    }

    #[test]
    fn client_labels_endpoint() {
        let descriptor = EndpointDescriptor::from_client(Arc::new(NamedClient));

        assert_eq!(descriptor.label(), "memory://calculator");
    }

    #[test]
    fn overrides_layer_in_order() {
        let descriptor = EndpointDescriptor::new()
            .with_type_override(Arc::new(EnumOverride::exact("Digits", "string|one,two")))
            .with_type_override(Arc::new(EnumOverride::exact("Pair", "string|one,two")));

        let resolver = descriptor.type_resolver().unwrap();
        assert_eq!(resolver.input_type("string|one,two").name.as_str(), "Pair");
        assert_eq!(resolver.input_type("s:int").name.as_str(), "Int");
    }
}
