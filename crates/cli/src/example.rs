// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The example server: a variety of openly available SOAP services composed best effort.

use std::sync::Arc;

use composer::{
    ClientFactory, CompositionRequest, DefaultSoapCaller, DiagnosticsSink, EndpointDescriptor,
    LayeredCaller, ResultPath, ServerOptions, converter::EndpointConversionError,
};
use indexmap::IndexMap;
use soap_schema::EnumOverride;

const ADDRESS_ENDPOINTS: [(&str, &str); 6] = [
    (
        "geoipservice",
        "http://www.webservicex.net/geoipservice.asmx?WSDL",
    ),
    ("ip2geo", "http://ws.cdyne.com/ip2geo/ip2geo.asmx?wsdl"),
    (
        "globalweather",
        "http://www.webservicex.net/globalweather.asmx?WSDL",
    ),
    (
        "periodictable",
        "http://www.webservicex.net/periodictable.asmx?WSDL",
    ),
    (
        "countryinfo",
        "http://webservices.oorsprong.org/websamples.countryinfo/CountryInfoService.wso?WSDL",
    ),
    (
        "numberconversion",
        "http://www.dataaccess.com/webservicesserver/numberconversion.wso?WSDL",
    ),
];

const CURRENCY_URL: &str = "http://www.webservicex.net/CurrencyConvertor.asmx?WSDL";
const CURRENCY_SIGNATURE_PREFIX: &str = "string|AFA,ALL,DZD,ARS,AWG,AUD,BSD,BHD,BDT,BBD";

const CALCULATOR_URL: &str = "http://soatest.parasoft.com/calculator.wsdl";

const ASTRONOMICAL_URL: &str = "http://www.webservicex.net/Astronomical.asmx?WSDL";
const ASTRONOMICAL_SIGNATURE: &str =
    "string|meters,kilometers,miles,AstronmicalunitAU,lightyear,parsec";

/// The example endpoints, in a fixed order. The calculator endpoint needs a connected client
/// up front; when connecting fails it is reported to `diagnostics` and left out.
///
/// These endpoints publish WSDL documents. [`composer::DocumentClientFactory`] only reads the
/// JSON description form, so serving them needs a WSDL-capable [`ClientFactory`] and a
/// [`composer::SchemaConverter`] built over it. With the document factory every endpoint fails
/// conversion and composition ends with no endpoints available.
pub async fn example_request(
    factory: &dyn ClientFactory,
    diagnostics: &dyn DiagnosticsSink,
    server: ServerOptions,
) -> CompositionRequest {
    let mut endpoints: IndexMap<String, EndpointDescriptor> = ADDRESS_ENDPOINTS
        .iter()
        .map(|(name, address)| (name.to_string(), EndpointDescriptor::from_address(*address)))
        .collect();

    endpoints.insert("currency".to_string(), currency_endpoint());

    match calculator_endpoint(factory).await {
        Ok(descriptor) => {
            endpoints.insert("calculator".to_string(), descriptor);
        }
        Err(error) => diagnostics.endpoint_failed("calculator", CALCULATOR_URL, &error),
    }

    endpoints.insert("astronomical".to_string(), astronomical_endpoint());

    CompositionRequest::Endpoints(endpoints, server)
}

fn currency_endpoint() -> EndpointDescriptor {
    EndpointDescriptor::from_address(CURRENCY_URL).with_type_override(Arc::new(
        EnumOverride::prefix("Currency", CURRENCY_SIGNATURE_PREFIX),
    ))
}

async fn calculator_endpoint(
    factory: &dyn ClientFactory,
) -> Result<EndpointDescriptor, EndpointConversionError> {
    let client = factory.connect(CALCULATOR_URL).await?;
    let caller = LayeredCaller::new(
        Arc::new(ResultPath::new(["Result", "$value"])),
        Arc::new(DefaultSoapCaller::new(client.clone())),
    );

    Ok(EndpointDescriptor::from_client(client)
        .with_address(CALCULATOR_URL)
        .with_caller(Arc::new(caller)))
}

fn astronomical_endpoint() -> EndpointDescriptor {
    EndpointDescriptor::from_address(ASTRONOMICAL_URL).with_type_override(Arc::new(
        EnumOverride::exact("AstronomicalUnit", ASTRONOMICAL_SIGNATURE),
    ))
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use composer::{
        RecordingDiagnostics, ServiceClient, client::ClientError, plan::CompositionPlan,
    };
    use serde_json::Value;
    use soap_schema::{OperationPath, ServiceDescription};

    use super::*;

    struct Unreachable;

    #[async_trait]
    impl ClientFactory for Unreachable {
        async fn connect(&self, address: &str) -> Result<Arc<dyn ServiceClient>, ClientError> {
            Err(ClientError::Other(format!("{address} is unreachable")))
        }
    }

    struct EmptyClient;

    #[async_trait]
    impl ServiceClient for EmptyClient {
        async fn describe(&self) -> Result<ServiceDescription, ClientError> {
            Ok(ServiceDescription {
                documentation: None,
                services: vec![],
            })
        }

        async fn invoke(&self, _: &OperationPath, _: Value) -> Result<Value, ClientError> {
            Ok(Value::Null)
        }
    }

    struct Reachable;

    #[async_trait]
    impl ClientFactory for Reachable {
        async fn connect(&self, _: &str) -> Result<Arc<dyn ServiceClient>, ClientError> {
            Ok(Arc::new(EmptyClient))
        }
    }

    fn names(request: &CompositionRequest) -> Vec<String> {
        CompositionPlan::resolve(request)
            .unwrap()
            .endpoint_names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    #[tokio::test]
    async fn includes_all_examples() {
        let diagnostics = RecordingDiagnostics::new();
        let request = example_request(&Reachable, &diagnostics, ServerOptions::default()).await;

        assert_eq!(
            names(&request),
            vec![
                "geoipservice",
                "ip2geo",
                "globalweather",
                "periodictable",
                "countryinfo",
                "numberconversion",
                "currency",
                "calculator",
                "astronomical",
            ]
        );
        assert!(diagnostics.events().is_empty());

        let CompositionRequest::Endpoints(endpoints, _) = &request else {
            panic!("expected endpoints");
        };
        let calculator = &endpoints["calculator"];
        assert!(calculator.client().is_some());
        assert!(calculator.caller().is_some());
        assert_eq!(calculator.label(), CALCULATOR_URL);
    }

    #[tokio::test]
    async fn unreachable_calculator_is_reported() {
        let diagnostics = RecordingDiagnostics::new();
        let request = example_request(&Unreachable, &diagnostics, ServerOptions::default()).await;

        assert!(!names(&request).contains(&"calculator".to_string()));
        assert_eq!(names(&request).len(), 8);
        assert_eq!(diagnostics.failed_endpoints(), vec!["calculator"]);
    }

    #[tokio::test]
    async fn enum_overrides() {
        let diagnostics = RecordingDiagnostics::new();
        let request = example_request(&Unreachable, &diagnostics, ServerOptions::default()).await;
        let CompositionRequest::Endpoints(endpoints, _) = &request else {
            panic!("expected endpoints");
        };

        let currency = endpoints["currency"].type_resolver().unwrap();
        let codes = format!("{CURRENCY_SIGNATURE_PREFIX},BYR,BZD");
        assert_eq!(currency.input_type(&codes).name.as_str(), "Currency");

        let astronomical = endpoints["astronomical"].type_resolver().unwrap();
        assert_eq!(
            astronomical.input_type(ASTRONOMICAL_SIGNATURE).name.as_str(),
            "AstronomicalUnit"
        );
        assert_eq!(
            astronomical.input_type("string|meters,miles").name.as_str(),
            "String"
        );
    }
}
