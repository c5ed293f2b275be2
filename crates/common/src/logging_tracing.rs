// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! # Tracing configuration setup.
//!
//! The server code is instrumented with Rust's `tracing` framework.
//!
//! Calling the `init` function will initialize a global tracing subscriber based on the values of
//! the `SOAPQL_LOG` environment variable which follows the same conventions as `RUST_LOG`. This
//! will provide console logging.
//!
//! Endpoint conversions run in an `endpoint` span, so a filter such as
//! `SOAPQL_LOG=composer=debug` shows the progress of each endpoint separately.

use tracing_subscriber::{EnvFilter, filter::LevelFilter, prelude::*};

const SOAPQL_LOG: &str = "SOAPQL_LOG";

/// Initialize the tracing subscriber with a compact `tracing_subscriber::fmt` layer.
pub fn init() {
    let fmt_layer = tracing_subscriber::fmt::layer().compact();
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var(SOAPQL_LOG)
        .from_env_lossy()
        .add_directive(
            "h2=warn"
                .parse()
                .expect("Hard coded directive shouldn't fail"),
        );

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
