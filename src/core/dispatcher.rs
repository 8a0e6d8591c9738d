//! Per-request resolution and handler invocation.
//!
//! A request moves through `Received -> Resolved -> Invoked -> Sent`. Any
//! failure jumps straight to `Sent` with an error response written through
//! [`RequestContext::send_error`], so the caller always receives a complete
//! [`Response`] and never an error value.
use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::{
    core::{
        context::{RequestContext, Response},
        error::DispatchError,
        method::Method,
        resource::{Resource, ResourceId},
        resource_table::ResourceTable,
        search_index::SearchIndex,
    },
    metrics::{self, DispatchTimer},
};

/// Sent with every `405` response.
pub const ALLOW_HEADER: &str = "Allow";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Received,
    Resolved,
    Invoked,
    Sent,
}

/// Borrowed view over a frozen resource table and its index.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'a> {
    table: &'a ResourceTable,
    index: &'a SearchIndex,
}

impl<'a> Dispatcher<'a> {
    pub fn new(table: &'a ResourceTable, index: &'a SearchIndex) -> Self {
        Self { table, index }
    }

    /// Route `ctx` to a handler and return the finished response.
    pub fn dispatch(&self, mut ctx: RequestContext) -> Response {
        let method = ctx.method().to_string();
        let _timer = DispatchTimer::new(&method);
        let mut state = DispatchState::Received;

        if let Err(err) = self.run(&mut ctx, &mut state) {
            match &err {
                DispatchError::RouteNotFound { .. } | DispatchError::MethodNotAllowed { .. } => {
                    tracing::warn!(error = %err, ?state, "Request not routed")
                }
                DispatchError::HandlerFailed(inner) if inner.status() < 500 => {
                    tracing::warn!(error = %err, ?state, "Handler reported an error")
                }
                _ => tracing::error!(error = %err, ?state, "Dispatch failed"),
            }
            ctx.send_error(err.status_code(), err.public_message());
            if let DispatchError::MethodNotAllowed { resource, .. } = &err
                && let Some(allow) = self.allow_header(*resource)
            {
                ctx.set_header(ALLOW_HEADER, allow);
            }
        }
        state = DispatchState::Sent;

        let response = ctx.into_response();
        tracing::debug!(status = response.status(), ?state, "Dispatch complete");
        metrics::increment_request_total(&method, response.status());
        response
    }

    fn run(
        &self,
        ctx: &mut RequestContext,
        state: &mut DispatchState,
    ) -> Result<(), DispatchError> {
        let resource = self.resolve(ctx.path())?;
        *state = DispatchState::Resolved;

        let method = ctx.method().to_string();
        let handler = method
            .parse::<Method>()
            .ok()
            .and_then(|verb| resource.handler(verb))
            .ok_or_else(|| DispatchError::MethodNotAllowed {
                resource: resource.id(),
                method: method.clone(),
                path: ctx.path().to_string(),
            })?;

        if let Some(params) = resource.match_params(ctx.path()) {
            ctx.set_params(params);
        }
        *state = DispatchState::Invoked;
        tracing::debug!(resource = resource.name(), id = %resource.id(), %method, "Invoking handler");

        let outcome = catch_unwind(AssertUnwindSafe(|| handler(ctx))).map_err(|_| {
            DispatchError::HandlerPanicked {
                resource: resource.id(),
                method,
            }
        })?;

        if let Some(response) = outcome? {
            ctx.replace_response(response);
        }
        Ok(())
    }

    /// Comma-separated verbs `id` has handlers for.
    fn allow_header(&self, id: ResourceId) -> Option<String> {
        let resource = self.table.get(id)?;
        Some(
            resource
                .allowed_methods()
                .map(Method::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        )
    }

    /// First resource in index order whose pattern accepts `path`.
    fn resolve(&self, path: &str) -> Result<&'a Resource, DispatchError> {
        let ids = self.index.search(path);
        let id = *ids.first().ok_or_else(|| DispatchError::RouteNotFound {
            path: path.to_string(),
        })?;
        if ids.len() > 1 {
            tracing::trace!(path, candidates = ids.len(), chosen = %id, "Multiple resources match");
        }
        self.table
            .get(id)
            .ok_or(DispatchError::UnknownResource(id))
    }
}
