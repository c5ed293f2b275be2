// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;
use clap::{Arg, ArgMatches, Command};
use soapql_env::Environment;

#[async_trait]
pub trait CommandDefinition {
    fn command(&self) -> Command;

    async fn execute(&self, matches: &ArgMatches, env: &dyn Environment) -> Result<()>;
}

pub fn get<T: Clone + Send + Sync + 'static>(matches: &ArgMatches, arg_id: &str) -> Option<T> {
    matches.get_one::<T>(arg_id).cloned()
}

pub fn address_arg() -> Arg {
    Arg::new("address")
        .help("URL or file path of a service description")
        .long_help(
            "URL or file path of the service description to publish. \
             Without an address or a config file, an example server is started.",
        )
        .required(false)
        .index(1)
}

pub fn config_arg() -> Arg {
    Arg::new("config")
        .help("Path to a JSON configuration file")
        .long("config")
        .required(false)
        .value_parser(clap::value_parser!(PathBuf))
        .conflicts_with("address")
        .num_args(1)
}

pub fn port_arg() -> Arg {
    Arg::new("port")
        .help("Listen port")
        .long_help("The port the server should listen for HTTP requests on.")
        .short('p')
        .long("port")
        .required(false)
        .value_parser(clap::value_parser!(u16))
        .num_args(1)
}

pub fn path_arg() -> Arg {
    Arg::new("path")
        .help("HTTP path of the GraphQL endpoint")
        .long("path")
        .required(false)
        .num_args(1)
}
