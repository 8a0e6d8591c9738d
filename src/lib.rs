//! Waypost - a minimal resource-oriented HTTP request router.
//!
//! A **resource** groups one or more URI templates with per-method handlers.
//! Templates are compiled into anchored regular expressions whose capture
//! groups become named path parameters. Lookups go through a search index
//! that remembers the result for every path it has seen, so repeated requests
//! skip the scan over registered patterns.
//!
//! # Features
//! - Path templates with `:name` and `{name}` placeholders, optional trailing `/`
//! - First-registered-wins resolution when several resources match
//! - `404` / `405` / `500` error responses in the configured default content type
//! - Bounded (LRU) or unbounded path cache backed by `scc`
//! - Axum adapter, graceful shutdown, structured tracing and `metrics` counters
//!
//! # Quick Example
//! ```
//! use waypost::core::{RequestContext, Resource, Router};
//!
//! let router = Router::builder()
//!     .resource(
//!         Resource::builder("Users")
//!             .uri("/users/:id")
//!             .get(|ctx: &mut RequestContext| {
//!                 let id = ctx.param("id").unwrap_or_default().to_string();
//!                 ctx.set_body(id);
//!             }),
//!     )
//!     .build()?;
//!
//! let response = router.dispatch("GET", "/users/42");
//! assert_eq!(response.status(), 200);
//! assert_eq!(response.body().as_ref(), b"42");
//! assert_eq!(router.dispatch("POST", "/users/42").status(), 405);
//! assert_eq!(router.dispatch("GET", "/nope").status(), 404);
//! # Ok::<(), waypost::core::RegistrationError>(())
//! ```
//!
//! # Architecture
//! Routing logic lives in `core` and never touches a socket. Responses leave
//! the core through the [`ports::ResponseSink`] port; the axum implementation
//! lives in `adapters`.
//!
//! # Error Handling
//! Dispatch never fails from the caller's point of view: every
//! [`core::DispatchError`] is turned into a response. Bootstrap code returns
//! `eyre::Result<T>` with context attached via `WrapErr`.
//!
//! # Concurrency & Data Structures
//! Registration happens on a [`core::RouterBuilder`] that is consumed by
//! `build()`. The resulting [`core::Router`] is immutable apart from its path
//! cache, which is an `scc` map safe for concurrent readers and writers.
pub mod config;
pub mod metrics;
pub mod ports;
pub mod resources;
pub mod tracing_setup;
pub mod utils;

pub mod adapters;
pub mod core;

// Re-export the specific types needed by the binary crate
pub use crate::{
    adapters::{AxumServer, HttpHandler},
    core::{RequestContext, Resource, Router, RouterBuilder},
    utils::GracefulShutdown,
};
