//! Per-request state handed to resource handlers.
use bytes::Bytes;
use serde::Serialize;

use crate::core::{error::HandlerError, pattern::Params};

/// Status, content type and body written back to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    content_type: String,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl Response {
    /// Empty response with the given status and content type.
    pub fn new(status: u16, content_type: impl Into<String>) -> Self {
        Self {
            status,
            content_type: content_type.into(),
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    /// `200` plain-text response.
    pub fn text(body: impl Into<Bytes>) -> Self {
        Self::new(200, "text/plain; charset=utf-8").with_body(body)
    }

    /// `200` response with `value` serialized as JSON.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, HandlerError> {
        let body = serde_json::to_vec(value)
            .map_err(|e| HandlerError::internal(format!("Failed to serialize response: {e}")))?;
        Ok(Self::new(200, "application/json").with_body(body))
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Headers besides `Content-Type`, in insertion order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Set `name`, replacing an earlier value (names compare case-insensitively).
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(&name))
        {
            Some(slot) => slot.1 = value,
            None => self.headers.push((name, value)),
        }
    }

    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.content_type = content_type.into();
    }

    pub fn set_body(&mut self, body: impl Into<Bytes>) {
        self.body = body.into();
    }

    pub fn into_parts(self) -> (u16, String, Vec<(String, String)>, Bytes) {
        (self.status, self.content_type, self.headers, self.body)
    }
}

/// Everything a handler sees about the request, plus the response it fills in.
///
/// The response starts as `200` with the router's default content type and an
/// empty body.
#[derive(Debug, Clone)]
pub struct RequestContext {
    method: String,
    path: String,
    query: Option<String>,
    body: Bytes,
    params: Params,
    default_content_type: String,
    response: Response,
}

impl RequestContext {
    pub fn new(
        method: impl AsRef<str>,
        path: impl Into<String>,
        default_content_type: impl Into<String>,
    ) -> Self {
        let default_content_type = default_content_type.into();
        Self {
            method: method.as_ref().to_ascii_uppercase(),
            path: path.into(),
            query: None,
            body: Bytes::new(),
            params: Params::default(),
            response: Response::new(200, default_content_type.clone()),
            default_content_type,
        }
    }

    pub fn with_query(mut self, query: Option<String>) -> Self {
        self.query = query;
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Upper-cased request verb.
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Raw request body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Value of a path parameter declared in the matched template.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn response_mut(&mut self) -> &mut Response {
        &mut self.response
    }

    pub fn set_status(&mut self, status: u16) {
        self.response.set_status(status);
    }

    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.response.set_content_type(content_type);
    }

    pub fn set_body(&mut self, body: impl Into<Bytes>) {
        self.response.set_body(body);
    }

    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.response.set_header(name, value);
    }

    /// Overwrite status, content type, headers and body in one step.
    pub fn send_error(&mut self, status: u16, message: impl Into<String>) {
        let message: String = message.into();
        self.response = Response::new(status, self.default_content_type.clone()).with_body(message);
    }

    pub(crate) fn set_params(&mut self, params: Params) {
        self.params = params;
    }

    pub(crate) fn replace_response(&mut self, response: Response) {
        self.response = response;
    }

    pub fn into_response(self) -> Response {
        self.response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_response() {
        let ctx = RequestContext::new("get", "/", "application/json");
        assert_eq!(ctx.method(), "GET");
        assert_eq!(ctx.response().status(), 200);
        assert_eq!(ctx.response().content_type(), "application/json");
        assert!(ctx.response().body().is_empty());
    }

    #[test]
    fn test_send_error_overwrites_everything() {
        let mut ctx = RequestContext::new("GET", "/", "application/json");
        ctx.set_status(201);
        ctx.set_content_type("text/html");
        ctx.set_body("partial");
        ctx.set_header("X-Partial", "yes");

        ctx.send_error(404, "Not Found");

        let response = ctx.into_response();
        assert!(response.headers().is_empty());
        assert_eq!(response.status(), 404);
        assert_eq!(response.content_type(), "application/json");
        assert_eq!(response.body().as_ref(), b"Not Found");
    }

    #[test]
    fn test_json_response() {
        let response = Response::json(&serde_json::json!({ "id": "7" })).unwrap();
        assert_eq!(response.content_type(), "application/json");
        assert_eq!(response.body().as_ref(), br#"{"id":"7"}"#);
    }

    #[test]
    fn test_set_header_replaces_case_insensitively() {
        let mut response = Response::text("ok").with_header("Cache-Control", "no-store");
        response.set_header("cache-control", "max-age=60");

        assert_eq!(response.headers().len(), 1);
        assert_eq!(response.header("CACHE-CONTROL"), Some("max-age=60"));
    }

    #[test]
    fn test_request_data_accessors() {
        let ctx = RequestContext::new("POST", "/items", "application/json")
            .with_query(Some("page=2".to_string()))
            .with_body("payload");
        assert_eq!(ctx.query(), Some("page=2"));
        assert_eq!(ctx.body().as_ref(), b"payload");
        assert!(ctx.params().is_empty());
        assert_eq!(ctx.param("id"), None);
    }
}
