// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use soap_schema::type_normalization::is_valid_name;

use crate::{
    descriptor::EndpointDescriptor, error::ConfigurationError, request::CompositionRequest,
    serving::ListenOptions,
};

#[derive(Debug, Clone)]
pub enum PlanKind {
    /// One endpoint whose schema is served as is
    Direct(EndpointDescriptor),
    /// Several endpoints merged under their names, in configuration order
    Federated(Vec<(String, EndpointDescriptor)>),
}

/// A validated composition request. Resolution is a pure function of the request.
#[derive(Debug, Clone)]
pub struct CompositionPlan {
    kind: PlanKind,
    listen: ListenOptions,
}

impl CompositionPlan {
    pub fn resolve(request: &CompositionRequest) -> Result<Self, ConfigurationError> {
        let listen = request.server_options().listen_options();

        let kind = match request {
            CompositionRequest::Address(address) => {
                let descriptor = EndpointDescriptor::from_address(address.clone());
                require_source(&descriptor, address)?;
                PlanKind::Direct(descriptor)
            }
            CompositionRequest::Single(descriptor, _) => {
                require_source(descriptor, &descriptor.label())?;
                PlanKind::Direct(descriptor.clone())
            }
            CompositionRequest::Endpoints(endpoints, _) => {
                if endpoints.is_empty() {
                    return Err(ConfigurationError::NoEndpoints);
                }

                let endpoints = endpoints
                    .iter()
                    .map(|(name, descriptor)| {
                        if !is_valid_name(name) {
                            return Err(ConfigurationError::InvalidEndpointName(name.clone()));
                        }
                        require_source(descriptor, name)?;
                        Ok((name.clone(), descriptor.clone()))
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                PlanKind::Federated(endpoints)
            }
        };

        Ok(Self { kind, listen })
    }

    pub fn kind(&self) -> &PlanKind {
        &self.kind
    }

    pub fn listen_options(&self) -> &ListenOptions {
        &self.listen
    }

    pub fn is_direct(&self) -> bool {
        matches!(self.kind, PlanKind::Direct(_))
    }

    pub fn endpoint_names(&self) -> Vec<&str> {
        match &self.kind {
            PlanKind::Direct(_) => vec![],
            PlanKind::Federated(endpoints) => {
                endpoints.iter().map(|(name, _)| name.as_str()).collect()
            }
        }
    }
}

fn require_source(descriptor: &EndpointDescriptor, name: &str) -> Result<(), ConfigurationError> {
    if descriptor.has_source() {
        Ok(())
    } else {
        Err(ConfigurationError::MissingEndpointSource(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;
    use serde_json::json;

    use super::*;
    use crate::request::ServerOptions;

    fn resolve(value: serde_json::Value) -> Result<CompositionPlan, ConfigurationError> {
        CompositionPlan::resolve(&CompositionRequest::from_json(value).unwrap())
    }

    #[test]
    fn address_is_direct() {
        let plan = resolve(json!("http://weather.test/wsdl")).unwrap();

        assert!(plan.is_direct());
        assert_eq!(plan.listen_options(), &ListenOptions::default());
    }

    #[test]
    fn descriptor_is_direct() {
        let plan = resolve(json!({ "url": "http://weather.test/wsdl", "port": 4100 })).unwrap();

        assert!(plan.is_direct());
        assert_eq!(plan.listen_options().port(), 4100);
    }

    #[test]
    fn endpoints_are_federated() {
        let plan = resolve(json!({
            "endpoints": {
                "weather": "http://weather.test/wsdl",
                "currency": { "url": "http://currency.test/wsdl" }
            },
            "path": "/soap/"
        }))
        .unwrap();

        assert!(!plan.is_direct());
        assert_eq!(plan.endpoint_names(), vec!["weather", "currency"]);
        assert_eq!(plan.listen_options().path(), "/soap");
    }

    #[test]
    fn resolution_is_deterministic() {
        let config = json!({
            "endpoints": { "b": "b.json", "a": "a.json" },
            "port": 5000
        });

        let first = resolve(config.clone()).unwrap();
        let second = resolve(config).unwrap();

        assert_eq!(first.endpoint_names(), second.endpoint_names());
        assert_eq!(first.listen_options(), second.listen_options());
    }

    #[test]
    fn single_endpoint_mapping_is_still_federated() {
        let plan = resolve(json!({ "endpoints": { "weather": "weather.json" } })).unwrap();

        assert!(!plan.is_direct());
        assert_eq!(plan.endpoint_names(), vec!["weather"]);
    }

    #[test]
    fn rejects_empty_endpoints() {
        let result = resolve(json!({ "endpoints": {} }));

        assert_eq!(result.unwrap_err(), ConfigurationError::NoEndpoints);
    }

    #[test]
    fn rejects_invalid_endpoint_names() {
        let result = resolve(json!({ "endpoints": { "global-weather": "weather.json" } }));

        assert_eq!(
            result.unwrap_err(),
            ConfigurationError::InvalidEndpointName("global-weather".to_string())
        );
    }

    #[test]
    fn rejects_endpoints_without_source() {
        let result = resolve(json!({ "endpoints": { "weather": { "debug": true } } }));
        assert_eq!(
            result.unwrap_err(),
            ConfigurationError::MissingEndpointSource("weather".to_string())
        );

        let mut endpoints = IndexMap::new();
        endpoints.insert("blank".to_string(), EndpointDescriptor::from_address(""));
        let request = CompositionRequest::Endpoints(endpoints, ServerOptions::default());
        assert!(matches!(
            CompositionPlan::resolve(&request),
            Err(ConfigurationError::MissingEndpointSource(_))
        ));

        let request = CompositionRequest::Address(String::new());
        assert!(matches!(
            CompositionPlan::resolve(&request),
            Err(ConfigurationError::MissingEndpointSource(_))
        ));
    }
}
