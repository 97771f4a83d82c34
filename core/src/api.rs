//! Named panel operations over a `Transport`.
//!
//! # Design
//! Each operation builds its request with `ResourceClient`, runs it through
//! the transport once and narrows the decoded envelope to the operation's
//! result: the `data` payload (`None` on failure) or the `success` flag.
//! `Err` is reserved for exchanges that never completed; an HTTP error status
//! is an ordinary `None` / `false`. Use `send` to see the full envelope,
//! including the status code.

use std::fmt::Display;

use serde_json::Value;
use tracing::{debug, warn};

use crate::client::ResourceClient;
use crate::config::ClientConfig;
use crate::envelope::ResponseEnvelope;
use crate::error::Result;
use crate::http::{HttpMethod, HttpRequest};
use crate::transport::{Transport, UreqTransport};
use crate::types::{Params, ResourceId, ResourceKind};

/// Client for one resource kind (`vds` or `vhost`).
///
/// Holds only read-only state; calls are independent and may be issued from
/// several threads when the transport allows it.
#[derive(Debug, Clone)]
pub struct ResourceApiClient<T = UreqTransport> {
    client: ResourceClient,
    transport: T,
}

impl ResourceApiClient<UreqTransport> {
    pub fn new(config: ClientConfig, kind: ResourceKind) -> Self {
        let transport = UreqTransport::new(config.timeout());
        Self::with_transport(config, kind, transport)
    }

    /// Client for virtual dedicated servers.
    pub fn vds(config: ClientConfig) -> Self {
        Self::new(config, ResourceKind::Vds)
    }

    /// Client for virtual hosting accounts.
    pub fn vhost(config: ClientConfig) -> Self {
        Self::new(config, ResourceKind::Vhost)
    }
}

impl<T: Transport> ResourceApiClient<T> {
    pub fn with_transport(config: ClientConfig, kind: ResourceKind, transport: T) -> Self {
        Self {
            client: ResourceClient::new(config, kind),
            transport,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.client.kind()
    }

    pub fn config(&self) -> &ClientConfig {
        self.client.config()
    }

    /// Request builder used by the named operations.
    pub fn requests(&self) -> &ResourceClient {
        &self.client
    }

    /// Generic round-trip against an absolute `url`.
    ///
    /// # Errors
    /// `ApiError::Transport` when no response was received,
    /// `ApiError::Serialization` when a POST body cannot be encoded.
    pub fn send(&self, method: HttpMethod, url: &str, params: Option<&Params>) -> Result<ResponseEnvelope> {
        let request = self.client.build_request(method, url, params)?;
        self.exchange(&request)
    }

    /// List services, narrowed by `filters` (empty for all).
    ///
    /// # Errors
    /// `ApiError::Transport` when no response was received.
    pub fn list(&self, filters: &Params) -> Result<Option<Value>> {
        let request = self.client.build_list(filters);
        Ok(self.exchange(&request)?.into_data())
    }

    /// # Errors
    /// `ApiError::Transport` when no response was received.
    pub fn delete(&self, elid: impl Into<ResourceId>) -> Result<bool> {
        let request = self.client.build_delete(&elid.into())?;
        Ok(self.exchange(&request)?.success())
    }

    /// Log in to the panel as `user_id`. The returned payload is passed
    /// through untouched.
    ///
    /// # Errors
    /// `ApiError::Transport` when no response was received.
    pub fn su_login(&self, user_id: impl Display) -> Result<Option<Value>> {
        let request = self.client.build_su_login(&user_id.to_string());
        Ok(self.exchange(&request)?.into_data())
    }

    /// # Errors
    /// `ApiError::Transport` when no response was received.
    pub fn set_filter(&self, filter: &Params) -> Result<bool> {
        let request = self.client.build_set_filter(filter)?;
        Ok(self.exchange(&request)?.success())
    }

    /// # Errors
    /// `ApiError::Transport` when no response was received.
    pub fn suspend(&self, elid: impl Into<ResourceId>) -> Result<bool> {
        let request = self.client.build_suspend(&elid.into())?;
        Ok(self.exchange(&request)?.success())
    }

    /// # Errors
    /// `ApiError::Transport` when no response was received.
    pub fn resume(&self, elid: impl Into<ResourceId>) -> Result<bool> {
        let request = self.client.build_resume(&elid.into())?;
        Ok(self.exchange(&request)?.success())
    }

    /// Create a service (no `elid`) or change an existing one.
    ///
    /// # Errors
    /// `ApiError::Transport` when no response was received.
    pub fn edit(&self, params: Params) -> Result<Option<Value>> {
        let request = self.client.build_edit(params)?;
        Ok(self.exchange(&request)?.into_data())
    }

    /// # Errors
    /// `ApiError::Transport` when no response was received.
    pub fn open(&self, params: Params) -> Result<Option<Value>> {
        let request = self.client.build_open(params)?;
        Ok(self.exchange(&request)?.into_data())
    }

    fn exchange(&self, request: &HttpRequest) -> Result<ResponseEnvelope> {
        debug!(method = %request.method, url = %request.url, "sending panel request");
        let response = self.transport.execute(request).inspect_err(|e| {
            warn!(method = %request.method, url = %request.url, error = %e, "panel request failed");
        })?;
        debug!(status = response.status, "panel response received");
        Ok(self.client.decode(&response))
    }
}
