// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{ArgMatches, Command};
use common::env_const::get_server_host;
use composer::{
    Composer, CompositionRequest, DocumentClientFactory, RecordingDiagnostics, ServerOptions,
};
use server_actix::{ActixSchemaServer, ListenerHandle};
use soapql_env::Environment;
use tracing::{info, warn};

use crate::{
    commands::command::{CommandDefinition, address_arg, config_arg, get, path_arg, port_arg},
    config::{env_server_options, load_request, resolve_server_options},
    example::example_request,
};

/// Serve SOAP services as a GraphQL schema
pub struct ServeCommandDefinition;

#[async_trait]
impl CommandDefinition for ServeCommandDefinition {
    fn command(&self) -> Command {
        Command::new("soap-graphql-server")
            .about("Publish SOAP services as a GraphQL schema")
            .arg(address_arg())
            .arg(config_arg())
            .arg(port_arg())
            .arg(path_arg())
    }

    async fn execute(&self, matches: &ArgMatches, env: &dyn Environment) -> Result<()> {
        let flags = ServerOptions {
            port: get(matches, "port"),
            path: get(matches, "path"),
        };
        let server = ActixSchemaServer::new(get_server_host(env));

        let address = get::<String>(matches, "address");
        let config = get::<PathBuf>(matches, "config");

        let handle = match (address, config) {
            (_, Some(config)) => {
                info!("start server from config in '{}'", config.display());
                let request = load_request(&config)?;
                serve(request, flags, env, &server)
                    .await
                    .with_context(|| {
                        format!("could not start server from config in '{}'", config.display())
                    })?
            }
            (Some(address), None) => {
                info!("start server from '{}'", address);
                serve(CompositionRequest::Address(address.clone()), flags, env, &server)
                    .await
                    .with_context(|| format!("could not start server from '{address}'"))?
            }
            (None, None) => {
                info!("start example server");
                serve_example(flags, env, &server)
                    .await
                    .context("could not start example server")?
            }
        };

        handle.wait().await?;
        Ok(())
    }
}

async fn serve(
    request: CompositionRequest,
    flags: ServerOptions,
    env: &dyn Environment,
    server: &ActixSchemaServer,
) -> Result<ListenerHandle> {
    let server_options = resolve_server_options(flags, &request, env)?;
    let request = request.with_server_options(server_options);

    Ok(Composer::default().compose_and_serve(&request, server).await?)
}

async fn serve_example(
    flags: ServerOptions,
    env: &dyn Environment,
    server: &ActixSchemaServer,
) -> Result<ListenerHandle> {
    let diagnostics = Arc::new(RecordingDiagnostics::new());
    let server_options = flags.or(env_server_options(env)?);

    let request = example_request(
        &DocumentClientFactory::default(),
        diagnostics.as_ref(),
        server_options,
    )
    .await;

    let handle = Composer::default()
        .with_diagnostics(diagnostics.clone())
        .compose_and_serve(&request, server)
        .await?;

    let failed = diagnostics.failed_endpoints();
    if !failed.is_empty() {
        warn!(
            "{} example endpoint(s) are not available: {}",
            failed.len(),
            failed.join(", ")
        );
    }

    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ArgMatches {
        ServeCommandDefinition
            .command()
            .try_get_matches_from(
                std::iter::once("soap-graphql-server").chain(args.iter().copied()),
            )
            .unwrap()
    }

    #[test]
    fn parses_address_and_flags() {
        let matches = parse(&["http://weather.test/wsdl", "-p", "4100", "--path", "soap"]);

        assert_eq!(
            get::<String>(&matches, "address").as_deref(),
            Some("http://weather.test/wsdl")
        );
        assert_eq!(get::<u16>(&matches, "port"), Some(4100));
        assert_eq!(get::<String>(&matches, "path").as_deref(), Some("soap"));
    }

    #[test]
    fn parses_config() {
        let matches = parse(&["--config", "soapql.json"]);

        assert_eq!(
            get::<PathBuf>(&matches, "config"),
            Some(PathBuf::from("soapql.json"))
        );
        assert_eq!(get::<String>(&matches, "address"), None);
    }

    #[test]
    fn address_conflicts_with_config() {
        let result = ServeCommandDefinition.command().try_get_matches_from([
            "soap-graphql-server",
            "weather.json",
            "--config",
            "soapql.json",
        ]);

        assert!(result.is_err());
    }

    #[test]
    fn no_arguments_is_example_mode() {
        let matches = parse(&[]);

        assert_eq!(get::<String>(&matches, "address"), None);
        assert_eq!(get::<PathBuf>(&matches, "config"), None);
    }
}
