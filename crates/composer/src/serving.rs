// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::composition::ComposedSchema;

pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_PATH: &str = "/graphql";

/// Where a composed schema is served. The path is always normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenOptions {
    port: u16,
    path: String,
}

impl ListenOptions {
    pub fn new(port: u16, path: &str) -> Self {
        Self {
            port,
            path: normalize_path(path),
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Default for ListenOptions {
    fn default() -> Self {
        Self::new(DEFAULT_PORT, DEFAULT_PATH)
    }
}

/// A path with exactly one leading slash and no trailing slash (`/` stays `/`)
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_matches('/');
    format!("/{trimmed}")
}

#[derive(Error, Debug)]
pub enum ListenError {
    #[error("Port {0} is already in use")]
    PortInUse(u16),

    #[error("Failed to listen on {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Serves a composed schema over HTTP
#[async_trait]
pub trait SchemaServer: Sync {
    type Handle: Send;

    async fn listen(
        &self,
        schema: Arc<ComposedSchema>,
        options: &ListenOptions,
    ) -> Result<Self::Handle, ListenError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_paths() {
        for (path, expected) in [
            ("/graphql", "/graphql"),
            ("graphql", "/graphql"),
            ("/graphql/", "/graphql"),
            ("  graphql/ ", "/graphql"),
            ("/soap/graphql", "/soap/graphql"),
            ("/", "/"),
            ("", "/"),
        ] {
            assert_eq!(normalize_path(path), expected, "{path:?}");
        }
    }

    #[test]
    fn equivalent_paths_give_equal_options() {
        assert_eq!(
            ListenOptions::new(4000, "graphql"),
            ListenOptions::new(4000, "/graphql/")
        );
        assert_eq!(ListenOptions::default().path(), DEFAULT_PATH);
        assert_eq!(ListenOptions::default().port(), DEFAULT_PORT);
    }
}
