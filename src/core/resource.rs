//! Resources: URI templates bundled with per-verb handlers.
use std::{fmt, sync::Arc};

use crate::core::{
    context::{RequestContext, Response},
    error::HandlerError,
    method::{METHOD_COUNT, Method},
    pattern::{Params, RoutePattern},
};

/// Stable identifier assigned at registration, in registration order from 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(usize);

impl ResourceId {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a handler produced: `None` when it filled in the context's response
/// itself, `Some` when it built a response for the dispatcher to install.
pub type HandlerResult = Result<Option<Response>, HandlerError>;

/// Type-erased handler stored in a resource's method table.
pub type Handler = Arc<dyn Fn(&mut RequestContext) -> HandlerResult + Send + Sync>;

/// Return types accepted from handler closures.
pub trait IntoHandlerResult {
    fn into_handler_result(self) -> HandlerResult;
}

impl IntoHandlerResult for () {
    fn into_handler_result(self) -> HandlerResult {
        Ok(None)
    }
}

impl IntoHandlerResult for Response {
    fn into_handler_result(self) -> HandlerResult {
        Ok(Some(self))
    }
}

impl IntoHandlerResult for Result<(), HandlerError> {
    fn into_handler_result(self) -> HandlerResult {
        self.map(|()| None)
    }
}

impl IntoHandlerResult for Result<Response, HandlerError> {
    fn into_handler_result(self) -> HandlerResult {
        self.map(Some)
    }
}

fn erase<F, R>(f: F) -> Handler
where
    F: Fn(&mut RequestContext) -> R + Send + Sync + 'static,
    R: IntoHandlerResult,
{
    Arc::new(move |ctx: &mut RequestContext| f(ctx).into_handler_result())
}

/// One optional handler per [`Method`].
#[derive(Clone, Default)]
pub struct MethodMap {
    slots: [Option<Handler>; METHOD_COUNT],
}

impl MethodMap {
    pub fn get(&self, method: Method) -> Option<&Handler> {
        self.slots[method.index()].as_ref()
    }

    pub fn insert(&mut self, method: Method, handler: Handler) -> Option<Handler> {
        self.slots[method.index()].replace(handler)
    }

    pub fn contains(&self, method: Method) -> bool {
        self.slots[method.index()].is_some()
    }

    /// Verbs with a bound handler, in [`Method::ALL`] order.
    pub fn methods(&self) -> impl Iterator<Item = Method> + '_ {
        Method::ALL.into_iter().filter(|m| self.contains(*m))
    }
}

impl fmt::Debug for MethodMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.methods()).finish()
    }
}

/// Declaration of a resource prior to registration.
///
/// ```
/// use waypost::core::{Resource, RequestContext};
///
/// let home = Resource::builder("home")
///     .uri("/")
///     .get(|ctx: &mut RequestContext| ctx.set_body("Hello World!"));
/// assert_eq!(home.uris(), ["/"]);
/// ```
#[derive(Clone, Debug)]
pub struct ResourceDefinition {
    name: String,
    uris: Vec<String>,
    handlers: MethodMap,
}

impl ResourceDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uris: Vec::new(),
            handlers: MethodMap::default(),
        }
    }

    /// Add a URI template.
    pub fn uri(mut self, template: impl Into<String>) -> Self {
        self.uris.push(template.into());
        self
    }

    pub fn uris(&self) -> &[String] {
        &self.uris
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bind a handler to `method`, replacing any earlier one.
    pub fn on<F, R>(mut self, method: Method, handler: F) -> Self
    where
        F: Fn(&mut RequestContext) -> R + Send + Sync + 'static,
        R: IntoHandlerResult,
    {
        self.handlers.insert(method, erase(handler));
        self
    }

    pub fn get<F, R>(self, handler: F) -> Self
    where
        F: Fn(&mut RequestContext) -> R + Send + Sync + 'static,
        R: IntoHandlerResult,
    {
        self.on(Method::Get, handler)
    }

    pub fn post<F, R>(self, handler: F) -> Self
    where
        F: Fn(&mut RequestContext) -> R + Send + Sync + 'static,
        R: IntoHandlerResult,
    {
        self.on(Method::Post, handler)
    }

    pub fn put<F, R>(self, handler: F) -> Self
    where
        F: Fn(&mut RequestContext) -> R + Send + Sync + 'static,
        R: IntoHandlerResult,
    {
        self.on(Method::Put, handler)
    }

    pub fn delete<F, R>(self, handler: F) -> Self
    where
        F: Fn(&mut RequestContext) -> R + Send + Sync + 'static,
        R: IntoHandlerResult,
    {
        self.on(Method::Delete, handler)
    }

    pub fn patch<F, R>(self, handler: F) -> Self
    where
        F: Fn(&mut RequestContext) -> R + Send + Sync + 'static,
        R: IntoHandlerResult,
    {
        self.on(Method::Patch, handler)
    }

    pub(crate) fn into_parts(self) -> (String, Vec<String>, MethodMap) {
        (self.name, self.uris, self.handlers)
    }
}

/// A registered resource. Owned by the resource table for the router's lifetime.
#[derive(Debug)]
pub struct Resource {
    id: ResourceId,
    name: String,
    patterns: Vec<RoutePattern>,
    handlers: MethodMap,
}

impl Resource {
    /// Start declaring a resource.
    pub fn builder(name: impl Into<String>) -> ResourceDefinition {
        ResourceDefinition::new(name)
    }

    pub(crate) fn new(
        id: ResourceId,
        name: String,
        patterns: Vec<RoutePattern>,
        handlers: MethodMap,
    ) -> Self {
        Self {
            id,
            name,
            patterns,
            handlers,
        }
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn patterns(&self) -> &[RoutePattern] {
        &self.patterns
    }

    pub fn handler(&self, method: Method) -> Option<&Handler> {
        self.handlers.get(method)
    }

    pub fn allowed_methods(&self) -> impl Iterator<Item = Method> + '_ {
        self.handlers.methods()
    }

    /// Parameters from the first of this resource's patterns that accepts `path`.
    pub fn match_params(&self, path: &str) -> Option<Params> {
        self.patterns.iter().find_map(|p| p.captures(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pattern::compile;

    #[test]
    fn test_definition_collects_uris_and_handlers() {
        let def = Resource::builder("users")
            .uri("/users")
            .uri("/users/:id")
            .get(|_: &mut RequestContext| {})
            .post(|_: &mut RequestContext| Response::text("created").with_status(201));

        assert_eq!(def.uris(), ["/users", "/users/:id"]);
        let (_, _, handlers) = def.into_parts();
        assert_eq!(
            handlers.methods().collect::<Vec<_>>(),
            vec![Method::Get, Method::Post]
        );
        assert!(!handlers.contains(Method::Delete));
    }

    #[test]
    fn test_handler_styles() {
        let in_place = erase(|ctx: &mut RequestContext| ctx.set_body("mutated"));
        let returned = erase(|_: &mut RequestContext| Response::text("built"));
        let failing =
            erase(|_: &mut RequestContext| -> Result<(), HandlerError> { Err(HandlerError::bad_request("nope")) });

        let mut ctx = RequestContext::new("GET", "/", "application/json");
        assert_eq!(in_place(&mut ctx), Ok(None));
        assert_eq!(ctx.response().body().as_ref(), b"mutated");

        let built = returned(&mut ctx).unwrap().unwrap();
        assert_eq!(built.body().as_ref(), b"built");

        assert_eq!(failing(&mut ctx), Err(HandlerError::bad_request("nope")));
    }

    #[test]
    fn test_match_params_uses_first_matching_pattern() {
        let resource = Resource::new(
            ResourceId::new(0),
            "users".to_string(),
            vec![
                compile("/users/:id").unwrap(),
                compile("/people/{name}").unwrap(),
            ],
            MethodMap::default(),
        );

        let params = resource.match_params("/people/ada").unwrap();
        assert_eq!(params.get("name"), Some("ada"));
        assert!(resource.match_params("/nowhere").is_none());
    }

    #[test]
    fn test_replacing_a_handler() {
        let mut map = MethodMap::default();
        assert!(map.insert(Method::Get, erase(|_: &mut RequestContext| {})).is_none());
        assert!(map.insert(Method::Get, erase(|_: &mut RequestContext| {})).is_some());
        assert_eq!(format!("{map:?}"), "[Get]");
    }
}
