//! Synchronous client for the hosting control panel's resource API.
//!
//! # Overview
//! One generic client manages both virtual dedicated servers (`vds`) and
//! virtual hosting accounts (`vhost`). Every operation is a single
//! stateless request/response exchange: build a URL, attach the bearer and
//! JSON headers, send, decode the JSON envelope.
//!
//! # Design
//! - `ResourceClient` builds `HttpRequest` values and decodes `HttpResponse`
//!   values without touching the network.
//! - `Transport` performs the round-trip; `UreqTransport` is the blocking
//!   default.
//! - `ResourceApiClient` combines both and exposes the named operations
//!   (`list`, `delete`, `su_login`, `set_filter`, `suspend`, `resume`,
//!   `edit`, `open`).
//! - Transport faults are `Err`; HTTP error statuses are `None` / `false`
//!   from the named operations and keep their code in `ResponseEnvelope`.

pub mod api;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod query;
pub mod transport;
pub mod types;

pub use api::ResourceApiClient;
pub use client::ResourceClient;
pub use config::ClientConfig;
pub use envelope::ResponseEnvelope;
pub use error::{ApiError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Transport, UreqTransport};
pub use types::{Params, ResourceId, ResourceKind};
