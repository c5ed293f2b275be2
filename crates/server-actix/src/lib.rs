// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Serves composed schemas over HTTP with actix-web.
//!
//! `GET <path>` returns the schema in SDL form. `POST <path>` executes an operation when the
//! server has an [`OperationExecutor`], and otherwise answers `501 Not Implemented`.

mod execution;

use std::{io::ErrorKind, net::SocketAddr, sync::Arc};

use actix_web::{
    App, HttpResponse, HttpServer, middleware,
    dev::ServerHandle,
    web::{self, ServiceConfig},
};
use async_trait::async_trait;
use composer::{
    ComposedSchema, SchemaServer,
    serving::{ListenError, ListenOptions},
};
use tokio::task::JoinHandle;
use tracing::{error, info};
use tracing_actix_web::TracingLogger;

pub use execution::{ExecutionError, GraphQLRequest, OperationExecutor};

macro_rules! error_msg {
    ($msg:literal) => {
        concat!("{\"errors\": [{\"message\":\"", $msg, "\"}]}").as_bytes()
    };
}

type Executor = Option<Arc<dyn OperationExecutor>>;

pub fn configure_router(
    schema: Arc<ComposedSchema>,
    executor: Executor,
    path: &str,
) -> impl FnOnce(&mut ServiceConfig) {
    let path = path.to_string();

    move |app| {
        app.app_data(web::Data::from(schema))
            .app_data(web::Data::new(executor))
            .route(&path, web::get().to(serve_schema))
            .route(&path, web::post().to(execute));
    }
}

async fn serve_schema(schema: web::Data<ComposedSchema>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(schema.sdl())
}

async fn execute(
    request: web::Json<GraphQLRequest>,
    schema: web::Data<ComposedSchema>,
    executor: web::Data<Executor>,
) -> HttpResponse {
    let Some(executor) = executor.get_ref() else {
        return HttpResponse::NotImplemented()
            .content_type("application/json")
            .body(error_msg!("Operation execution is not supported by this server"));
    };

    match executor.execute(&schema, request.into_inner()).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(err) => {
            error!("Error executing operation: {}", err);
            HttpResponse::BadRequest().json(serde_json::json!({
                "errors": [{ "message": err.to_string() }]
            }))
        }
    }
}

pub struct ActixSchemaServer {
    host: String,
    workers: Option<usize>,
    executor: Executor,
}

impl ActixSchemaServer {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            workers: None,
            executor: None,
        }
    }

    pub fn with_executor(mut self, executor: Arc<dyn OperationExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }
}

#[async_trait]
impl SchemaServer for ActixSchemaServer {
    type Handle = ListenerHandle;

    async fn listen(
        &self,
        schema: Arc<ComposedSchema>,
        options: &ListenOptions,
    ) -> Result<ListenerHandle, ListenError> {
        let executor = self.executor.clone();
        let path = options.path().to_string();

        let server = HttpServer::new(move || {
            App::new()
                .wrap(TracingLogger::default())
                .wrap(middleware::NormalizePath::new(
                    middleware::TrailingSlash::Trim,
                ))
                .configure(configure_router(schema.clone(), executor.clone(), &path))
        });

        let server = match self.workers {
            Some(workers) => server.workers(workers),
            None => server,
        };

        let port = options.port();
        let server = server
            .bind((self.host.as_str(), port))
            .map_err(|e| match e.kind() {
                ErrorKind::AddrInUse => ListenError::PortInUse(port),
                _ => ListenError::Bind {
                    address: format!("{}:{}", self.host, port),
                    source: e,
                },
            })?;

        let addrs = server.addrs();
        info!("Started server on {}", pretty_addr(&addrs));
        info!("- GraphQL schema hosted at:");
        info!("\thttp://{}{}", pretty_addr(&addrs), options.path());

        let server = server.run();
        let server_handle = server.handle();
        let task = tokio::spawn(server);

        Ok(ListenerHandle {
            addrs,
            server_handle,
            task,
        })
    }
}

/// A running listener
pub struct ListenerHandle {
    addrs: Vec<SocketAddr>,
    server_handle: ServerHandle,
    task: JoinHandle<std::io::Result<()>>,
}

impl ListenerHandle {
    pub fn addrs(&self) -> &[SocketAddr] {
        &self.addrs
    }

    pub fn port(&self) -> Option<u16> {
        self.addrs.first().map(SocketAddr::port)
    }

    /// Stop accepting connections and wait for in-flight requests
    pub async fn stop(self) -> std::io::Result<()> {
        self.server_handle.stop(true).await;
        self.wait().await
    }

    /// Wait until the server exits
    pub async fn wait(self) -> std::io::Result<()> {
        match self.task.await {
            Ok(result) => result,
            Err(join_error) => Err(std::io::Error::other(join_error)),
        }
    }
}

pub fn pretty_addr(addrs: &[SocketAddr]) -> String {
    let loopback_addr = addrs.iter().find(|addr| addr.ip().is_loopback());

    match loopback_addr {
        Some(addr) => format!("localhost:{}", addr.port()),
        None => match addrs {
            [addr] => format!("{addr}"),
            _ => format!("{addrs:?}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test as actix_test};
    use composer::{
        CallInput, EndpointSchema, SoapCaller, caller::CallError, serving::DEFAULT_PATH,
    };
    use serde_json::{Value, json};
    use soap_schema::GraphQLSchema;

    use super::*;

    const SDL: &str = "type Query { rate(from: String!): Float }";

    struct NullCaller;

    #[async_trait]
    impl SoapCaller for NullCaller {
        async fn call(&self, _: &CallInput) -> Result<Value, CallError> {
            Ok(Value::Null)
        }
    }

    struct EchoExecutor;

    #[async_trait]
    impl OperationExecutor for EchoExecutor {
        async fn execute(
            &self,
            schema: &ComposedSchema,
            request: GraphQLRequest,
        ) -> Result<Value, ExecutionError> {
            if request.query.is_empty() {
                return Err(ExecutionError::InvalidRequest("empty query".to_string()));
            }
            Ok(json!({ "data": { "fields": schema.schema().query_field_names() } }))
        }
    }

    fn schema() -> Arc<ComposedSchema> {
        Arc::new(ComposedSchema::direct(
            EndpointSchema {
                schema: GraphQLSchema::from_sdl(SDL).unwrap(),
                caller: Arc::new(NullCaller),
            },
            "currency.json".to_string(),
        ))
    }

    macro_rules! app {
        ($executor:expr) => {
            actix_test::init_service(
                App::new()
                    .wrap(middleware::NormalizePath::new(
                        middleware::TrailingSlash::Trim,
                    ))
                    .configure(configure_router(schema(), $executor, DEFAULT_PATH)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn serves_sdl() {
        let app = app!(None);

        for uri in ["/graphql", "/graphql/"] {
            let request = actix_test::TestRequest::get().uri(uri).to_request();
            let response = actix_test::call_service(&app, request).await;
            assert_eq!(response.status(), StatusCode::OK, "{uri}");

            let body = actix_test::read_body(response).await;
            assert_eq!(body, schema().sdl().as_bytes(), "{uri}");
        }
    }

    #[actix_web::test]
    async fn unknown_path() {
        let app = app!(None);

        let request = actix_test::TestRequest::get().uri("/other").to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn post_without_executor() {
        let app = app!(None);

        let request = actix_test::TestRequest::post()
            .uri("/graphql")
            .set_json(json!({ "query": "{ rate(from: \"EUR\") }" }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    }

    #[actix_web::test]
    async fn post_with_executor() {
        let app = app!(Some(Arc::new(EchoExecutor) as Arc<dyn OperationExecutor>));

        let request = actix_test::TestRequest::post()
            .uri("/graphql")
            .set_json(json!({ "query": "{ rate(from: \"EUR\") }", "operationName": null }))
            .to_request();
        let response: Value = actix_test::call_and_read_body_json(&app, request).await;
        assert_eq!(response, json!({ "data": { "fields": ["rate"] } }));

        let request = actix_test::TestRequest::post()
            .uri("/graphql")
            .set_json(json!({ "query": "" }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn listens_on_normalized_path() {
        let server = ActixSchemaServer::new("127.0.0.1").with_workers(1);
        let handle = server
            .listen(schema(), &ListenOptions::new(0, "graphql/"))
            .await
            .unwrap();
        let port = handle.port().unwrap();

        let body = reqwest::get(format!("http://127.0.0.1:{port}/graphql"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, schema().sdl());

        handle.stop().await.unwrap();
    }

    #[actix_web::test]
    async fn reports_port_in_use() {
        let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = occupied.local_addr().unwrap().port();

        let result = ActixSchemaServer::new("127.0.0.1")
            .with_workers(1)
            .listen(schema(), &ListenOptions::new(port, DEFAULT_PATH))
            .await;

        assert!(matches!(result, Err(ListenError::PortInUse(p)) if p == port));
    }

    #[test]
    fn pretty_addresses() {
        let loopback: SocketAddr = "127.0.0.1:4000".parse().unwrap();
        let any: SocketAddr = "0.0.0.0:4000".parse().unwrap();

        assert_eq!(pretty_addr(&[loopback]), "localhost:4000");
        assert_eq!(pretty_addr(&[any]), "0.0.0.0:4000");
    }
}
