//! Stateless request builder and response decoder for one resource kind.
//!
//! # Design
//! `ResourceClient` holds only the immutable `ClientConfig` and the
//! resource kind. Each named operation has a `build_*` method producing an
//! `HttpRequest`; responses go through `decode` / `parse_data` /
//! `parse_success`. No I/O happens here, so the exact wire shape of every
//! operation can be checked without a server.

use serde_json::Value;
use tracing::warn;

use crate::config::ClientConfig;
use crate::envelope::ResponseEnvelope;
use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::query::{append_query, encode_query};
use crate::types::{Params, ResourceId, ResourceKind};

/// Confirmation flag the panel needs to commit edit/open forms.
pub const CONFIRM_KEY: &str = "sok";
pub const CONFIRM_VALUE: &str = "ok";

#[derive(Debug, Clone)]
pub struct ResourceClient {
    config: ClientConfig,
    kind: ResourceKind,
}

impl ResourceClient {
    pub fn new(config: ClientConfig, kind: ResourceKind) -> Self {
        Self { config, kind }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// `<base>/<resource>` or `<base>/<resource>/<action>`.
    pub fn resource_url(&self, action: Option<&str>) -> String {
        match action {
            Some(action) => format!("{}/{}/{action}", self.config.base_url(), self.kind.path()),
            None => format!("{}/{}", self.config.base_url(), self.kind.path()),
        }
    }

    /// Generic request shaping: GET carries `params` as a query string, POST
    /// carries them as a JSON body (`{}` when absent). Both get the fixed
    /// header set.
    ///
    /// # Errors
    /// `ApiError::Serialization` if the POST body cannot be encoded.
    pub fn build_request(&self, method: HttpMethod, url: &str, params: Option<&Params>) -> Result<HttpRequest> {
        match method {
            HttpMethod::Get => Ok(self.get(url, params)),
            HttpMethod::Post => self.post(url, params),
        }
    }

    pub fn build_list(&self, filters: &Params) -> HttpRequest {
        self.get(&self.resource_url(None), Some(filters))
    }

    pub fn build_delete(&self, elid: &ResourceId) -> Result<HttpRequest> {
        self.post(&self.elid_url("delete", elid), None)
    }

    pub fn build_su_login(&self, user_id: &str) -> HttpRequest {
        let url = format!("{}?user_id={}", self.resource_url(Some("su")), urlencoding::encode(user_id));
        self.get(&url, None)
    }

    pub fn build_set_filter(&self, filter: &Params) -> Result<HttpRequest> {
        self.post(&self.resource_url(Some("filter")), Some(filter))
    }

    pub fn build_suspend(&self, elid: &ResourceId) -> Result<HttpRequest> {
        self.post(&self.elid_url("suspend", elid), None)
    }

    pub fn build_resume(&self, elid: &ResourceId) -> Result<HttpRequest> {
        self.post(&self.elid_url("resume", elid), None)
    }

    pub fn build_edit(&self, params: Params) -> Result<HttpRequest> {
        self.post(&self.resource_url(Some("edit")), Some(&with_confirmation(params)))
    }

    pub fn build_open(&self, params: Params) -> Result<HttpRequest> {
        self.post(&self.resource_url(Some("open")), Some(&with_confirmation(params)))
    }

    pub fn decode(&self, response: &HttpResponse) -> ResponseEnvelope {
        let envelope = ResponseEnvelope::from_response(response);
        if let ResponseEnvelope::HttpError { status } = envelope {
            warn!(resource = %self.kind, status, "panel returned error status");
        }
        envelope
    }

    /// `data` of a successful response; `None` for error statuses and for a
    /// missing or null `data` field.
    pub fn parse_data(&self, response: &HttpResponse) -> Option<Value> {
        self.decode(response).into_data()
    }

    /// True only for a 2xx response whose body has `"success": true`.
    pub fn parse_success(&self, response: &HttpResponse) -> bool {
        self.decode(response).success()
    }

    fn elid_url(&self, action: &str, elid: &ResourceId) -> String {
        format!(
            "{}?elid={}",
            self.resource_url(Some(action)),
            urlencoding::encode(&elid.to_query_value())
        )
    }

    fn get(&self, url: &str, params: Option<&Params>) -> HttpRequest {
        let query = params.map(encode_query).unwrap_or_default();
        HttpRequest {
            method: HttpMethod::Get,
            url: append_query(url, &query),
            headers: self.config.headers().to_vec(),
            body: None,
        }
    }

    fn post(&self, url: &str, params: Option<&Params>) -> Result<HttpRequest> {
        let body = match params {
            Some(params) => serde_json::to_string(params),
            None => serde_json::to_string(&Params::new()),
        }
        .map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: url.to_string(),
            headers: self.config.headers().to_vec(),
            body: Some(body),
        })
    }
}

/// Add `sok = "ok"` unless the caller already set a non-null `sok`.
pub fn with_confirmation(mut params: Params) -> Params {
    let confirmed = params.get(CONFIRM_KEY).is_some_and(|value| !value.is_null());
    if !confirmed {
        params.insert(CONFIRM_KEY.to_string(), Value::String(CONFIRM_VALUE.to_string()));
    }
    params
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const BASE: &str = "http://localhost:3000";

    fn client() -> ResourceClient {
        ResourceClient::new(ClientConfig::new(BASE, "key"), ResourceKind::Vds)
    }

    fn params(value: Value) -> Params {
        match value {
            Value::Object(map) => map,
            _ => panic!("test params must be an object"),
        }
    }

    fn body_json(req: &HttpRequest) -> Value {
        serde_json::from_str(req.body.as_deref().unwrap()).unwrap()
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_list_without_filters_has_no_query() {
        let req = client().build_list(&Params::new());
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/vds");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_list_appends_filters() {
        let req = client().build_list(&params(json!({"status": "active", "user": "john doe"})));
        assert_eq!(req.url, "http://localhost:3000/vds?status=active&user=john%20doe");
    }

    #[test]
    fn every_request_carries_fixed_headers() {
        let c = client();
        let expected = vec![
            ("Authorization".to_string(), "Bearer key".to_string()),
            ("Content-Type".to_string(), "application/json".to_string()),
        ];
        assert_eq!(c.build_list(&Params::new()).headers, expected);
        assert_eq!(c.build_su_login("1").headers, expected);
        assert_eq!(c.build_delete(&"1".into()).unwrap().headers, expected);
        assert_eq!(c.build_edit(Params::new()).unwrap().headers, expected);
    }

    #[test]
    fn build_delete_joins_ids_into_elid() {
        let req = client().build_delete(&ResourceId::from(vec!["123", "456"])).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/vds/delete?elid=123%2C%20456");
        assert_eq!(body_json(&req), json!({}));
    }

    #[test]
    fn build_suspend_and_resume_paths() {
        let c = client();
        let ids = ResourceId::from(7u64);
        assert_eq!(c.build_suspend(&ids).unwrap().url, "http://localhost:3000/vds/suspend?elid=7");
        assert_eq!(c.build_resume(&ids).unwrap().url, "http://localhost:3000/vds/resume?elid=7");
    }

    #[test]
    fn build_su_login_encodes_user_id() {
        let req = client().build_su_login("a b");
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/vds/su?user_id=a%20b");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_set_filter_posts_mapping() {
        let req = client().build_set_filter(&params(json!({"status": "2"}))).unwrap();
        assert_eq!(req.url, "http://localhost:3000/vds/filter");
        assert_eq!(body_json(&req), json!({"status": "2"}));
    }

    #[test]
    fn build_edit_adds_confirmation() {
        let req = client().build_edit(params(json!({"elid": 789, "note": "x"}))).unwrap();
        assert_eq!(req.url, "http://localhost:3000/vds/edit");
        assert_eq!(body_json(&req), json!({"elid": 789, "note": "x", "sok": "ok"}));
    }

    #[test]
    fn build_open_keeps_caller_confirmation() {
        let req = client().build_open(params(json!({"elid": 1, "sok": "yes"}))).unwrap();
        assert_eq!(req.url, "http://localhost:3000/vds/open");
        assert_eq!(body_json(&req), json!({"elid": 1, "sok": "yes"}));
    }

    #[test]
    fn null_confirmation_is_replaced() {
        let sent = with_confirmation(params(json!({"sok": null})));
        assert_eq!(Value::Object(sent), json!({"sok": "ok"}));
    }

    #[test]
    fn vhost_client_uses_its_own_path() {
        let c = ResourceClient::new(ClientConfig::new(BASE, "key"), ResourceKind::Vhost);
        assert_eq!(c.resource_url(Some("open")), "http://localhost:3000/vhost/open");
        assert_eq!(c.build_list(&Params::new()).url, "http://localhost:3000/vhost");
    }

    #[test]
    fn generic_get_with_empty_params_is_unchanged() {
        let c = client();
        let req = c.build_request(HttpMethod::Get, "http://localhost:3000/vds", Some(&Params::new())).unwrap();
        assert_eq!(req.url, "http://localhost:3000/vds");
        let req = c.build_request(HttpMethod::Get, "http://localhost:3000/vds", None).unwrap();
        assert_eq!(req.url, "http://localhost:3000/vds");
    }

    #[test]
    fn generic_post_without_params_sends_empty_object() {
        let req = client().build_request(HttpMethod::Post, "http://localhost:3000/vds/x", None).unwrap();
        assert_eq!(req.body.as_deref(), Some("{}"));
    }

    #[test]
    fn parse_data_returns_payload() {
        let data = client().parse_data(&response(200, r#"{"data":[{"id":"1"}]}"#));
        assert_eq!(data, Some(json!([{"id": "1"}])));
    }

    #[test]
    fn parse_data_error_status_is_none() {
        assert_eq!(client().parse_data(&response(404, r#"{"data":[1]}"#)), None);
    }

    #[test]
    fn parse_data_empty_body_is_none() {
        assert_eq!(client().parse_data(&response(200, "")), None);
    }

    #[test]
    fn parse_success_variants() {
        let c = client();
        assert!(c.parse_success(&response(200, r#"{"success":true}"#)));
        assert!(!c.parse_success(&response(200, r#"{"success":false}"#)));
        assert!(!c.parse_success(&response(200, "{}")));
        assert!(!c.parse_success(&response(500, r#"{"success":true}"#)));
    }
}
