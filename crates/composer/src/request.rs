// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Composition requests and their JSON configuration form.
//!
//! A request has one of three shapes, told apart by structure:
//!
//! - a bare string is the address of a single service
//! - an object with `url` or `createClient` describes a single endpoint
//! - an object with `endpoints` maps namespace names to endpoints (addresses or descriptors)
//!
//! The server settings `port` and `path` may accompany either object shape.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};
use soap_schema::{EnumOverride, Signature, type_normalization::is_valid_name};

use crate::{
    descriptor::{DebugFlags, EndpointDescriptor},
    error::ConfigurationError,
    serving::{DEFAULT_PATH, DEFAULT_PORT, ListenOptions},
};

#[derive(Debug, Clone)]
pub enum CompositionRequest {
    Address(String),
    Single(EndpointDescriptor, ServerOptions),
    Endpoints(IndexMap<String, EndpointDescriptor>, ServerOptions),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerOptions {
    pub port: Option<u16>,
    pub path: Option<String>,
}

impl ServerOptions {
    /// Fill settings missing from `self` from `fallback`
    pub fn or(self, fallback: ServerOptions) -> ServerOptions {
        ServerOptions {
            port: self.port.or(fallback.port),
            path: self.path.or(fallback.path),
        }
    }

    pub fn listen_options(&self) -> ListenOptions {
        ListenOptions::new(
            self.port.unwrap_or(DEFAULT_PORT),
            self.path.as_deref().unwrap_or(DEFAULT_PATH),
        )
    }
}

impl CompositionRequest {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigurationError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| ConfigurationError::Invalid(e.to_string()))?;
        Self::from_json(value)
    }

    pub fn from_json(value: Value) -> Result<Self, ConfigurationError> {
        match value {
            Value::String(address) => Ok(CompositionRequest::Address(address)),
            Value::Object(mut object) => {
                let server = take_server_options(&mut object)?;

                if let Some(endpoints) = object.remove("endpoints") {
                    if let Some(key) = object.keys().next() {
                        return Err(ConfigurationError::Invalid(format!(
                            "unknown field '{key}' next to 'endpoints'"
                        )));
                    }
                    Ok(CompositionRequest::Endpoints(
                        parse_endpoints(endpoints)?,
                        server,
                    ))
                } else if object.contains_key("url") || object.contains_key("createClient") {
                    let descriptor = parse_descriptor(Value::Object(object))?;
                    Ok(CompositionRequest::Single(descriptor, server))
                } else {
                    Err(ConfigurationError::UnrecognizedShape(
                        "expected 'url', 'createClient', or 'endpoints'".to_string(),
                    ))
                }
            }
            other => Err(ConfigurationError::UnrecognizedShape(format!(
                "expected a string or an object, found {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn server_options(&self) -> ServerOptions {
        match self {
            CompositionRequest::Address(_) => ServerOptions::default(),
            CompositionRequest::Single(_, server) | CompositionRequest::Endpoints(_, server) => {
                server.clone()
            }
        }
    }

    /// Replace the server settings. A bare address becomes a single endpoint request.
    pub fn with_server_options(self, server: ServerOptions) -> Self {
        match self {
            CompositionRequest::Address(address) => {
                CompositionRequest::Single(EndpointDescriptor::from_address(address), server)
            }
            CompositionRequest::Single(descriptor, _) => {
                CompositionRequest::Single(descriptor, server)
            }
            CompositionRequest::Endpoints(endpoints, _) => {
                CompositionRequest::Endpoints(endpoints, server)
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ServerOptionsSer {
    port: Option<u16>,
    path: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct EndpointDescriptorSer {
    url: Option<String>,
    create_client: Option<CreateClientSer>,
    #[serde(default)]
    debug: bool,
    #[serde(default)]
    warnings: bool,
    #[serde(default)]
    type_overrides: Vec<TypeOverrideSer>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CreateClientSer {
    url: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TypeOverrideSer {
    #[serde(rename = "enum")]
    enum_name: String,
    signature: String,
    #[serde(default, rename = "match")]
    match_kind: MatchKindSer,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "lowercase")]
enum MatchKindSer {
    #[default]
    Exact,
    Prefix,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EndpointEntrySer {
    Address(String),
    Descriptor(EndpointDescriptorSer),
}

fn take_server_options(object: &mut Map<String, Value>) -> Result<ServerOptions, ConfigurationError> {
    let mut server = Map::new();
    for key in ["port", "path"] {
        if let Some(value) = object.remove(key) {
            server.insert(key.to_string(), value);
        }
    }

    let server: ServerOptionsSer = serde_json::from_value(Value::Object(server))
        .map_err(|e| ConfigurationError::Invalid(e.to_string()))?;

    Ok(ServerOptions {
        port: server.port,
        path: server.path,
    })
}

fn parse_endpoints(
    endpoints: Value,
) -> Result<IndexMap<String, EndpointDescriptor>, ConfigurationError> {
    let Value::Object(entries) = endpoints else {
        return Err(ConfigurationError::Invalid(
            "'endpoints' must be an object".to_string(),
        ));
    };

    entries
        .into_iter()
        .map(|(name, entry)| -> Result<_, ConfigurationError> {
            let entry: EndpointEntrySer = serde_json::from_value(entry).map_err(|_| {
                ConfigurationError::Invalid(format!(
                    "endpoint '{name}' must be an address or an endpoint object"
                ))
            })?;

            let descriptor = match entry {
                EndpointEntrySer::Address(address) => EndpointDescriptor::from_address(address),
                EndpointEntrySer::Descriptor(ser) => ser.try_into()?,
            };
            Ok((name, descriptor))
        })
        .collect()
}

fn parse_descriptor(value: Value) -> Result<EndpointDescriptor, ConfigurationError> {
    let ser: EndpointDescriptorSer =
        serde_json::from_value(value).map_err(|e| ConfigurationError::Invalid(e.to_string()))?;
    ser.try_into()
}

impl TryFrom<EndpointDescriptorSer> for EndpointDescriptor {
    type Error = ConfigurationError;

    fn try_from(ser: EndpointDescriptorSer) -> Result<Self, Self::Error> {
        let address = match (ser.url, ser.create_client) {
            (Some(url), Some(create_client)) if url != create_client.url => {
                return Err(ConfigurationError::Invalid(format!(
                    "'url' ({url}) and 'createClient.url' ({}) disagree",
                    create_client.url
                )));
            }
            (Some(url), _) => Some(url),
            (None, create_client) => create_client.map(|create_client| create_client.url),
        };

        let mut descriptor = EndpointDescriptor::new().with_debug(DebugFlags {
            debug: ser.debug,
            warnings: ser.warnings,
        });

        if let Some(address) = address {
            descriptor = descriptor.with_address(address);
        }

        for type_override in ser.type_overrides {
            if !is_valid_name(&type_override.enum_name) {
                return Err(ConfigurationError::Invalid(format!(
                    "'{}' is not a valid enum name",
                    type_override.enum_name
                )));
            }

            let signature = match type_override.match_kind {
                MatchKindSer::Exact => Signature::Exact(type_override.signature),
                MatchKindSer::Prefix => Signature::Prefix(type_override.signature),
            };
            descriptor = descriptor.with_type_override(Arc::new(EnumOverride::new(
                type_override.enum_name,
                signature,
            )));
        }

        Ok(descriptor)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn bare_address() {
        let request = CompositionRequest::from_json(json!("http://weather.test/wsdl")).unwrap();

        assert!(matches!(request, CompositionRequest::Address(ref a) if a == "http://weather.test/wsdl"));
        assert_eq!(request.server_options(), ServerOptions::default());
    }

    #[test]
    fn single_descriptor() {
        let request = CompositionRequest::from_json(json!({
            "createClient": { "url": "http://currency.test/wsdl" },
            "warnings": true,
            "typeOverrides": [
                { "enum": "Currency", "signature": "string|AFA,ALL", "match": "prefix" }
            ],
            "port": 4100,
            "path": "currency"
        }))
        .unwrap();

        let CompositionRequest::Single(descriptor, server) = request else {
            panic!("expected a single endpoint");
        };
        assert_eq!(descriptor.address(), Some("http://currency.test/wsdl"));
        assert!(descriptor.debug().warnings);
        assert_eq!(
            descriptor
                .type_resolver()
                .unwrap()
                .input_type("string|AFA,ALL,DZD")
                .name
                .as_str(),
            "Currency"
        );
        assert_eq!(server.port, Some(4100));
        assert_eq!(server.listen_options().path(), "/currency");
    }

    #[test]
    fn endpoints_mapping_keeps_order() {
        let request = CompositionRequest::from_json_str(
            r#"{
                "endpoints": {
                    "weather": "http://weather.test/wsdl",
                    "currency": { "url": "http://currency.test/wsdl", "debug": true },
                    "calculator": { "createClient": { "url": "calculator.json" } }
                }
            }"#,
        )
        .unwrap();

        let CompositionRequest::Endpoints(endpoints, server) = request else {
            panic!("expected an endpoints mapping");
        };
        assert_eq!(
            endpoints.keys().collect::<Vec<_>>(),
            vec!["weather", "currency", "calculator"]
        );
        assert!(endpoints["currency"].debug().debug);
        assert_eq!(endpoints["calculator"].address(), Some("calculator.json"));
        assert_eq!(server, ServerOptions::default());
    }

    #[test]
    fn unrecognized_shapes() {
        for value in [json!(42), json!(null), json!(["a"]), json!({ "port": 4000 })] {
            assert!(matches!(
                CompositionRequest::from_json(value),
                Err(ConfigurationError::UnrecognizedShape(_))
            ));
        }
    }

    #[test]
    fn invalid_values() {
        for value in [
            json!({ "url": "a", "createClient": { "url": "b" } }),
            json!({ "url": "a", "port": "not a port" }),
            json!({ "url": "a", "color": "blue" }),
            json!({ "endpoints": { "weather": 7 } }),
            json!({ "endpoints": ["weather"] }),
            json!({ "endpoints": {}, "extra": true }),
            json!({ "url": "a", "typeOverrides": [{ "enum": "not-valid", "signature": "string|a" }] }),
        ] {
            assert!(
                matches!(
                    CompositionRequest::from_json(value.clone()),
                    Err(ConfigurationError::Invalid(_))
                ),
                "{value}"
            );
        }
    }

    #[test]
    fn server_options_promote_address() {
        let request = CompositionRequest::Address("http://weather.test/wsdl".to_string())
            .with_server_options(ServerOptions {
                port: Some(9000),
                path: None,
            });

        assert!(matches!(request, CompositionRequest::Single(_, _)));
        assert_eq!(request.server_options().listen_options().port(), 9000);
    }

    #[test]
    fn server_options_fallback() {
        let flags = ServerOptions {
            port: Some(9000),
            path: None,
        };
        let file = ServerOptions {
            port: Some(8000),
            path: Some("/soap".to_string()),
        };

        assert_eq!(
            flags.or(file),
            ServerOptions {
                port: Some(9000),
                path: Some("/soap".to_string())
            }
        );
    }
}
