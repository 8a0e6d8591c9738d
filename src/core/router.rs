//! Registration phase ([`RouterBuilder`]) and serving phase ([`Router`]).
//!
//! Resources can only be added through the builder. [`RouterBuilder::build`]
//! consumes it, so once a `Router` exists its table and index terms are
//! read-only and may be shared across request tasks without locking.
use thiserror::Error;

use crate::{
    config::{CachePolicy, ServerConfig},
    core::{
        context::{RequestContext, Response},
        dispatcher::Dispatcher,
        pattern::PatternError,
        resource::{Resource, ResourceDefinition, ResourceId},
        resource_table::ResourceTable,
        search_index::SearchIndex,
    },
    ports::response_sink::ResponseSink,
};

pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Failure while registering a resource.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RegistrationError {
    #[error("Failed to register resource '{resource}': {source}")]
    InvalidPattern {
        resource: String,
        #[source]
        source: PatternError,
    },
}

pub struct RouterBuilder {
    definitions: Vec<ResourceDefinition>,
    default_content_type: String,
    cache_policy: CachePolicy,
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self {
            definitions: Vec::new(),
            default_content_type: DEFAULT_CONTENT_TYPE.to_string(),
            cache_policy: CachePolicy::default(),
        }
    }
}

impl RouterBuilder {
    /// Builder preloaded with the router-related settings of `config`.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::default()
            .default_content_type(config.default_content_type.clone())
            .cache_policy(config.cache.clone())
    }

    /// Queue a resource. Registration order is match priority.
    pub fn resource(mut self, definition: ResourceDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    pub fn resources(mut self, definitions: impl IntoIterator<Item = ResourceDefinition>) -> Self {
        self.definitions.extend(definitions);
        self
    }

    /// Content type every response starts with, and the one error responses use.
    pub fn default_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.default_content_type = content_type.into();
        self
    }

    pub fn cache_policy(mut self, policy: CachePolicy) -> Self {
        self.cache_policy = policy;
        self
    }

    /// Compile and index every queued resource, ending the registration phase.
    pub fn build(self) -> Result<Router, RegistrationError> {
        let mut table = ResourceTable::new();
        let mut index = SearchIndex::new(&self.cache_policy);

        for definition in self.definitions {
            let name = definition.name().to_string();
            table
                .register(definition, &mut index)
                .map_err(|source| RegistrationError::InvalidPattern {
                    resource: name,
                    source,
                })?;
        }

        tracing::info!(
            resources = table.len(),
            terms = index.term_count(),
            cache = ?self.cache_policy,
            default_content_type = %self.default_content_type,
            "Route table built"
        );

        Ok(Router {
            table,
            index,
            default_content_type: self.default_content_type,
        })
    }
}

/// Immutable route table plus its search index.
#[derive(Debug)]
pub struct Router {
    table: ResourceTable,
    index: SearchIndex,
    default_content_type: String,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::default()
    }

    /// Fresh context carrying this router's default content type.
    pub fn context(&self, method: impl AsRef<str>, path: impl Into<String>) -> RequestContext {
        RequestContext::new(method, path, self.default_content_type.clone())
    }

    /// Dispatch a request given only its verb and path.
    pub fn dispatch(&self, method: &str, path: &str) -> Response {
        self.dispatch_context(self.context(method, path))
    }

    pub fn dispatch_context(&self, ctx: RequestContext) -> Response {
        Dispatcher::new(&self.table, &self.index).dispatch(ctx)
    }

    /// Dispatch `ctx` and write the result to `sink` exactly once.
    pub fn serve<S: ResponseSink>(&self, ctx: RequestContext, sink: S) -> S::Output {
        let (status, content_type, headers, body) = self.dispatch_context(ctx).into_parts();
        sink.send(status, &content_type, &headers, body)
    }

    /// Ids of every resource matching `path`, highest priority first.
    pub fn search(&self, path: &str) -> std::sync::Arc<[ResourceId]> {
        self.index.search(path)
    }

    pub fn resource(&self, id: ResourceId) -> Option<&Resource> {
        self.table.get(id)
    }

    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.table.iter()
    }

    pub fn resource_count(&self) -> usize {
        self.table.len()
    }

    pub fn index(&self) -> &SearchIndex {
        &self.index
    }

    pub fn default_content_type(&self) -> &str {
        &self.default_content_type
    }
}
