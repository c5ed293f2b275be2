// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use anyhow::Result;
use common::logging_tracing;
use soapql_env::SystemEnvironment;

use commands::{command::CommandDefinition, serve::ServeCommandDefinition};

mod commands;
mod config;
mod example;

#[tokio::main]
async fn main() -> Result<()> {
    logging_tracing::init();

    let definition = ServeCommandDefinition;
    let matches = definition
        .command()
        .version(env!("CARGO_PKG_VERSION"))
        .get_matches();

    definition.execute(&matches, &SystemEnvironment).await
}
