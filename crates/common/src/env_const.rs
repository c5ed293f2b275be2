// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use soapql_env::{EnvError, Environment, get_parsed};

pub const SOAPQL_SERVER_PORT: &str = "SOAPQL_SERVER_PORT";
pub const SOAPQL_SERVER_HOST: &str = "SOAPQL_SERVER_HOST";
pub const SOAPQL_GRAPHQL_HTTP_PATH: &str = "SOAPQL_GRAPHQL_HTTP_PATH";

pub const DEFAULT_SERVER_HOST: &str = "localhost";

/// The port from the environment, if one is set.
pub fn get_server_port(env: &dyn Environment) -> Result<Option<u16>, EnvError> {
    get_parsed(env, SOAPQL_SERVER_PORT)
}

pub fn get_graphql_http_path(env: &dyn Environment) -> Option<String> {
    env.get(SOAPQL_GRAPHQL_HTTP_PATH)
        .filter(|path| !path.trim().is_empty())
}

pub fn get_server_host(env: &dyn Environment) -> String {
    env.get(SOAPQL_SERVER_HOST)
        .unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string())
}

#[cfg(test)]
mod tests {
    use soapql_env::MapEnvironment;

    use super::*;

    #[test]
    fn reads_server_settings() {
        let env = MapEnvironment::from([
            (SOAPQL_SERVER_PORT, "9000"),
            (SOAPQL_GRAPHQL_HTTP_PATH, "soap"),
        ]);

        assert_eq!(get_server_port(&env).unwrap(), Some(9000));
        assert_eq!(get_graphql_http_path(&env), Some("soap".to_string()));
        assert_eq!(get_server_host(&env), DEFAULT_SERVER_HOST);
    }

    #[test]
    fn unset_values() {
        let env = MapEnvironment::from([(SOAPQL_GRAPHQL_HTTP_PATH, " ")]);

        assert_eq!(get_server_port(&env).unwrap(), None);
        assert_eq!(get_graphql_http_path(&env), None);
    }
}
