//! Decoded panel responses.
//!
//! # Design
//! A 2xx response is decoded into its JSON body. An empty, `null` or
//! unparseable 2xx body is replaced by the canonical `{"data": null}`.
//! Any other status is never decoded: the envelope only records the status
//! code, which renders as the `{"error": "HTTP Error: <code>"}` shape.

use serde_json::{json, Value};
use tracing::debug;

use crate::error::{ApiError, Result};
use crate::http::HttpResponse;

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseEnvelope {
    /// Decoded body of a 2xx response.
    Body(Value),
    /// Synthesized for a status outside 200..300.
    HttpError { status: u16 },
}

impl ResponseEnvelope {
    /// The `{"data": null}` stand-in for an empty or undecodable body.
    pub fn empty() -> Self {
        ResponseEnvelope::Body(json!({ "data": null }))
    }

    pub fn from_response(response: &HttpResponse) -> Self {
        if !response.is_success() {
            return ResponseEnvelope::HttpError {
                status: response.status,
            };
        }
        match decode_body(&response.body) {
            Some(body) => ResponseEnvelope::Body(body),
            None => {
                debug!(status = response.status, "empty or undecodable body, using null data");
                Self::empty()
            }
        }
    }

    /// The `data` field, treating an explicit `null` as absent.
    pub fn data(&self) -> Option<&Value> {
        match self {
            ResponseEnvelope::Body(body) => body.get("data").filter(|data| !data.is_null()),
            ResponseEnvelope::HttpError { .. } => None,
        }
    }

    pub fn into_data(self) -> Option<Value> {
        match self {
            ResponseEnvelope::Body(Value::Object(mut body)) => {
                body.remove("data").filter(|data| !data.is_null())
            }
            _ => None,
        }
    }

    /// True only when the body carries `"success": true`.
    pub fn success(&self) -> bool {
        match self {
            ResponseEnvelope::Body(body) => body.get("success") == Some(&Value::Bool(true)),
            ResponseEnvelope::HttpError { .. } => false,
        }
    }

    /// `"HTTP Error: <code>"` for a synthesized error envelope.
    pub fn error(&self) -> Option<String> {
        match self {
            ResponseEnvelope::HttpError { status } => Some(format!("HTTP Error: {status}")),
            ResponseEnvelope::Body(_) => None,
        }
    }

    pub fn status_error(&self) -> Option<u16> {
        match self {
            ResponseEnvelope::HttpError { status } => Some(*status),
            ResponseEnvelope::Body(_) => None,
        }
    }

    /// Borrow the decoded body, or fail with the HTTP status.
    ///
    /// # Errors
    /// `ApiError::HttpStatus` when the response status was outside 200..300.
    pub fn check(&self) -> Result<&Value> {
        match self {
            ResponseEnvelope::Body(body) => Ok(body),
            ResponseEnvelope::HttpError { status } => Err(ApiError::HttpStatus { status: *status }),
        }
    }

    /// Owned variant of [`ResponseEnvelope::check`].
    ///
    /// # Errors
    /// `ApiError::HttpStatus` when the response status was outside 200..300.
    pub fn into_result(self) -> Result<Value> {
        match self {
            ResponseEnvelope::Body(body) => Ok(body),
            ResponseEnvelope::HttpError { status } => Err(ApiError::HttpStatus { status }),
        }
    }

    /// JSON rendering of the envelope, including the synthesized error shape.
    pub fn to_value(&self) -> Value {
        match self {
            ResponseEnvelope::Body(body) => body.clone(),
            ResponseEnvelope::HttpError { status } => json!({ "error": format!("HTTP Error: {status}") }),
        }
    }
}

/// A 2xx body as JSON; `None` when it is blank, `null` or not JSON at all.
fn decode_body(body: &str) -> Option<Value> {
    if body.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Null) | Err(_) => None,
        Ok(body) => Some(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn empty_body_becomes_null_data() {
        for body in ["", "   ", "\n", "null", "not json", "{\"data\":"] {
            let envelope = ResponseEnvelope::from_response(&response(200, body));
            assert_eq!(envelope.to_value(), json!({ "data": null }), "body {body:?}");
            assert_eq!(envelope.data(), None);
        }
    }

    #[test]
    fn explicit_null_data_is_a_decoded_body() {
        for body in ["", "null", "not json"] {
            assert_eq!(decode_body(body), None, "body {body:?}");
        }
        // The server's own `{"data":null}` is decoded, not substituted.
        assert_eq!(decode_body(r#"{"data":null}"#), Some(json!({ "data": null })));
        let envelope = ResponseEnvelope::from_response(&response(200, r#"{"data":null}"#));
        assert_eq!(envelope.data(), None);
        assert!(!envelope.success());
    }

    #[test]
    fn any_2xx_status_is_decoded() {
        let envelope = ResponseEnvelope::from_response(&response(204, ""));
        assert_eq!(envelope, ResponseEnvelope::empty());
        let envelope = ResponseEnvelope::from_response(&response(299, r#"{"success":true}"#));
        assert!(envelope.success());
    }

    #[test]
    fn error_status_is_never_decoded() {
        let envelope = ResponseEnvelope::from_response(&response(500, r#"{"data":[1],"success":true}"#));
        assert_eq!(envelope, ResponseEnvelope::HttpError { status: 500 });
        assert_eq!(envelope.data(), None);
        assert!(!envelope.success());
        assert_eq!(envelope.error().as_deref(), Some("HTTP Error: 500"));
        assert_eq!(envelope.to_value(), json!({ "error": "HTTP Error: 500" }));
    }

    #[test]
    fn redirect_and_informational_statuses_are_errors() {
        assert_eq!(ResponseEnvelope::from_response(&response(302, "")).status_error(), Some(302));
        assert_eq!(ResponseEnvelope::from_response(&response(199, "")).status_error(), Some(199));
        assert_eq!(ResponseEnvelope::from_response(&response(300, "")).status_error(), Some(300));
    }

    #[test]
    fn data_field_is_returned() {
        let envelope = ResponseEnvelope::from_response(&response(200, r#"{"data":{"elid":"5"}}"#));
        assert_eq!(envelope.data(), Some(&json!({ "elid": "5" })));
        assert_eq!(envelope.into_data(), Some(json!({ "elid": "5" })));
    }

    #[test]
    fn success_requires_literal_true() {
        let cases = [
            (r#"{"success":true}"#, true),
            (r#"{"success":false}"#, false),
            (r#"{"success":1}"#, false),
            (r#"{"success":"true"}"#, false),
            (r#"{"data":null}"#, false),
            (r#"[true]"#, false),
        ];
        for (body, expected) in cases {
            let envelope = ResponseEnvelope::from_response(&response(200, body));
            assert_eq!(envelope.success(), expected, "body {body}");
        }
    }

    #[test]
    fn check_preserves_status_code() {
        let err = ResponseEnvelope::HttpError { status: 403 }.into_result().unwrap_err();
        assert!(matches!(err, ApiError::HttpStatus { status: 403 }));
        assert!(ResponseEnvelope::empty().check().is_ok());
    }
}
