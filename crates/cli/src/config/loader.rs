// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::path::Path;

use anyhow::{Context, Result};
use common::env_const::{get_graphql_http_path, get_server_port};
use composer::{CompositionRequest, ServerOptions};
use soapql_env::Environment;

/// Read a composition request from a JSON configuration file
pub fn load_request(path: &Path) -> Result<CompositionRequest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;

    CompositionRequest::from_json_str(&content)
        .with_context(|| format!("Invalid config file '{}'", path.display()))
}

pub fn env_server_options(env: &dyn Environment) -> Result<ServerOptions> {
    Ok(ServerOptions {
        port: get_server_port(env)?,
        path: get_graphql_http_path(env),
    })
}

/// Command line flags win over the request's own settings, which win over the environment
pub fn resolve_server_options(
    flags: ServerOptions,
    request: &CompositionRequest,
    env: &dyn Environment,
) -> Result<ServerOptions> {
    Ok(flags
        .or(request.server_options())
        .or(env_server_options(env)?))
}
