use std::sync::Arc;

use axum::body::Body as AxumBody;
use bytes::Bytes;
use http::{HeaderName, HeaderValue, Request, Response, StatusCode, header};
use http_body_util::LengthLimitError;
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use uuid::Uuid;

use crate::{core::Router, ports::ResponseSink, tracing_setup};

const PAYLOAD_TOO_LARGE_MESSAGE: &str = "Payload Too Large";
const BAD_REQUEST_MESSAGE: &str = "Bad Request";

/// Bridges axum requests into the waypost [`Router`].
pub struct HttpHandler {
    router: Arc<Router>,
    max_body_bytes: usize,
}

impl HttpHandler {
    pub fn new(router: Arc<Router>, max_body_bytes: usize) -> Self {
        Self {
            router,
            max_body_bytes,
        }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Main request handler: buffer the body, dispatch, write the response.
    pub async fn handle_request(&self, req: Request<AxumBody>) -> Response<AxumBody> {
        let request_id = Uuid::new_v4().to_string();
        let span = tracing_setup::create_request_span(
            req.method().as_str(),
            req.uri().path(),
            &request_id,
        );

        async move {
            let response = self.dispatch(req).await;
            tracing::Span::current().record("http.status_code", response.status().as_u16());
            response
        }
        .instrument(span)
        .await
    }

    async fn dispatch(&self, req: Request<AxumBody>) -> Response<AxumBody> {
        let (parts, body) = req.into_parts();
        let path = match urlencoding::decode(parts.uri.path()) {
            Ok(path) => path.into_owned(),
            Err(e) => {
                tracing::warn!("Decoded request path is not valid UTF-8: {}", e);
                let mut ctx = self.router.context(parts.method.as_str(), parts.uri.path());
                ctx.send_error(StatusCode::BAD_REQUEST.as_u16(), BAD_REQUEST_MESSAGE);
                return write(ctx.into_response());
            }
        };
        let mut ctx = self
            .router
            .context(parts.method.as_str(), path)
            .with_query(parts.uri.query().map(str::to_string));

        if declared_length(&parts.headers).is_some_and(|len| len > self.max_body_bytes) {
            tracing::warn!(limit = self.max_body_bytes, "Declared body exceeds limit");
            ctx.send_error(StatusCode::PAYLOAD_TOO_LARGE.as_u16(), PAYLOAD_TOO_LARGE_MESSAGE);
            return write(ctx.into_response());
        }

        match axum::body::to_bytes(body, self.max_body_bytes).await {
            Ok(bytes) => {
                tracing::debug!(len = bytes.len(), "Request body buffered");
                self.router.serve(ctx.with_body(bytes), AxumResponseSink)
            }
            Err(e) if is_length_limit(&e) => {
                tracing::warn!(limit = self.max_body_bytes, "Request body exceeds limit");
                ctx.send_error(StatusCode::PAYLOAD_TOO_LARGE.as_u16(), PAYLOAD_TOO_LARGE_MESSAGE);
                write(ctx.into_response())
            }
            Err(e) => {
                tracing::warn!("Failed to read request body: {}", e);
                ctx.send_error(StatusCode::BAD_REQUEST.as_u16(), BAD_REQUEST_MESSAGE);
                write(ctx.into_response())
            }
        }
    }
}

/// Writes a dispatched response as an axum/http response.
pub struct AxumResponseSink;

impl ResponseSink for AxumResponseSink {
    type Output = Response<AxumBody>;

    fn send(
        self,
        status: u16,
        content_type: &str,
        headers: &[(String, String)],
        body: Bytes,
    ) -> Self::Output {
        let mut response = Response::new(AxumBody::from(body));
        *response.status_mut() = StatusCode::from_u16(status).unwrap_or_else(|_| {
            tracing::error!(status, "Handler produced an invalid status code");
            StatusCode::INTERNAL_SERVER_ERROR
        });

        match HeaderValue::from_str(content_type) {
            Ok(value) => {
                response.headers_mut().insert(header::CONTENT_TYPE, value);
            }
            Err(_) => {
                tracing::error!(content_type, "Dropping unencodable Content-Type header");
            }
        }

        for (name, value) in headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    response.headers_mut().insert(name, value);
                }
                _ => tracing::error!(header = %name, "Dropping unencodable response header"),
            }
        }
        response
    }
}

fn write(response: crate::core::Response) -> Response<AxumBody> {
    let (status, content_type, headers, body) = response.into_parts();
    AxumResponseSink.send(status, &content_type, &headers, body)
}

fn declared_length(headers: &http::HeaderMap) -> Option<usize> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

fn is_length_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}

/// Build the axum application: every path falls through to the waypost router.
pub fn app(handler: Arc<HttpHandler>) -> axum::Router {
    axum::Router::new()
        .fallback(move |req: Request<AxumBody>| {
            let handler = handler.clone();
            async move { handler.handle_request(req).await }
        })
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use tower::ServiceExt;

    use super::*;
    use crate::core::{HandlerError, RequestContext, Resource};

    fn create_test_handler(max_body_bytes: usize) -> Arc<HttpHandler> {
        let router = Router::builder()
            .resource(
                Resource::builder("Echo")
                    .uri("/echo")
                    .post(|ctx: &mut RequestContext| {
                        let body = ctx.body().clone();
                        ctx.set_content_type("text/plain");
                        ctx.set_body(body);
                    })
                    .get(|ctx: &mut RequestContext| {
                        let query = ctx.query().unwrap_or_default().to_string();
                        ctx.set_body(query);
                    }),
            )
            .resource(
                Resource::builder("Files")
                    .uri("/files/:name")
                    .get(|ctx: &mut RequestContext| {
                        let name = ctx.param("name").unwrap_or_default().to_string();
                        ctx.set_body(name);
                    }),
            )
            .resource(
                Resource::builder("Teapot")
                    .uri("/teapot")
                    .get(|_: &mut RequestContext| -> Result<(), HandlerError> {
                        Err(HandlerError::new(418, "short and stout"))
                    }),
            )
            .build()
            .unwrap();
        Arc::new(HttpHandler::new(Arc::new(router), max_body_bytes))
    }

    async fn body_string(response: Response<AxumBody>) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_sink_sets_status_and_content_type() {
        let response = AxumResponseSink.send(
            201,
            "text/plain",
            &[("Location".to_string(), "/items/1".to_string())],
            Bytes::from_static(b"made"),
        );
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
        assert_eq!(response.headers()[header::LOCATION], "/items/1");
    }

    #[test]
    fn test_sink_rejects_out_of_range_status() {
        let response = AxumResponseSink.send(1000, "text/plain", &[], Bytes::new());
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_body_reaches_handler() {
        let handler = create_test_handler(1024);
        let req = Request::post("/echo").body(AxumBody::from("ping")).unwrap();

        let response = handler.handle_request(req).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "ping");
    }

    #[tokio::test]
    async fn test_query_reaches_handler() {
        let handler = create_test_handler(1024);
        let req = Request::get("/echo?page=2").body(AxumBody::empty()).unwrap();

        let response = handler.handle_request(req).await;
        assert_eq!(body_string(response).await, "page=2");
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let handler = create_test_handler(4);
        let req = Request::post("/echo")
            .body(AxumBody::from("far too long"))
            .unwrap();

        let response = handler.handle_request(req).await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(body_string(response).await, "Payload Too Large");
    }

    #[tokio::test]
    async fn test_handler_error_status_is_kept() {
        let handler = create_test_handler(1024);
        let req = Request::get("/teapot").body(AxumBody::empty()).unwrap();

        let response = handler.handle_request(req).await;
        assert_eq!(response.status().as_u16(), 418);
        assert_eq!(body_string(response).await, "short and stout");
    }

    #[tokio::test]
    async fn test_app_falls_back_to_router() {
        let app = app(create_test_handler(1024));

        let response = app
            .clone()
            .oneshot(Request::get("/nowhere").body(AxumBody::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(Request::delete("/echo").body(AxumBody::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "GET, POST");
        assert_eq!(body_string(response).await, "Method Not Allowed");
    }

    #[tokio::test]
    async fn test_path_is_percent_decoded_before_matching() {
        let handler = create_test_handler(1024);
        let req = Request::get("/files/read%20me.txt")
            .body(AxumBody::empty())
            .unwrap();

        let response = handler.handle_request(req).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "read me.txt");
    }

    #[tokio::test]
    async fn test_undecodable_path_is_bad_request() {
        let handler = create_test_handler(1024);
        let req = Request::get("/files/%FF").body(AxumBody::empty()).unwrap();

        let response = handler.handle_request(req).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_string(response).await, "Bad Request");
    }
}
