use std::{sync::Arc, time::Duration};

use axum::body::Body;
use http::{Request, StatusCode, header};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};
use tower::ServiceExt;
use waypost::{
    adapters::{AxumServer, HttpHandler, app},
    config::ServerConfig,
    core::Router,
    resources,
    utils::{GracefulShutdown, ShutdownReason},
};

fn bundled_router() -> Arc<Router> {
    Arc::new(
        Router::builder()
            .resources(resources::bundled())
            .build()
            .expect("bundled resources register"),
    )
}

async fn body_string(response: http::Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_app_serves_bundled_resources() {
    let app = app(Arc::new(HttpHandler::new(bundled_router(), 1024)));

    let response = app
        .clone()
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "Hello World!");

    let response = app
        .clone()
        .oneshot(Request::get("/users/7/profile").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    assert_eq!(body_string(response).await, r#"{"id":"7"}"#);

    let response = app
        .clone()
        .oneshot(Request::get("/users/a%20b").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(body_string(response).await, r#"{"id":"a b"}"#);

    let response = app
        .oneshot(Request::put("/users/7").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers()[header::ALLOW], "GET");
}

#[tokio::test]
async fn test_server_answers_over_tcp_and_shuts_down() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = GracefulShutdown::new();
    let server = AxumServer::new(
        Arc::new(ServerConfig::default()),
        bundled_router(),
        shutdown.clone(),
    );
    let server_task = tokio::spawn(async move { server.run_with_listener(listener).await });

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /missing HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut raw = String::new();
    stream.read_to_string(&mut raw).await.unwrap();

    assert!(raw.starts_with("HTTP/1.1 404"), "unexpected response: {raw}");
    assert!(raw.ends_with("Not Found"), "unexpected body: {raw}");

    assert!(shutdown.trigger_shutdown(ShutdownReason::Requested));
    let result = tokio::time::timeout(Duration::from_secs(5), server_task)
        .await
        .expect("server stops after shutdown")
        .unwrap();
    assert!(result.is_ok());
}
