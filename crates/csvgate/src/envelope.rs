//! Upload event envelope.
//!
//! An event either carries a `body` (a JSON string or an object) or is the
//! body itself. The body holds base64 `file_content` and an optional
//! `filename`. Responses mirror an HTTP reply: a status code plus a JSON
//! string body.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use csvgate_detect::{ClassificationDetail, ClassificationVerdict, Classifier, UNKNOWN_FILENAME};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{info, warn};

pub type Result<T> = std::result::Result<T, EnvelopeError>;

/// Reasons an event cannot be turned into an upload.
#[derive(Error, Debug)]
pub enum EnvelopeError {
    #[error("Missing file_content in request")]
    MissingContent,

    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error("invalid base64 in file_content: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

impl EnvelopeError {
    pub fn status_code(&self) -> u16 {
        match self {
            EnvelopeError::MissingContent => 400,
            EnvelopeError::InvalidBody(_) | EnvelopeError::InvalidBase64(_) => 500,
        }
    }

    /// Message placed in the response body.
    pub fn response_message(&self) -> String {
        match self {
            EnvelopeError::MissingContent => self.to_string(),
            other => format!("Error processing file: {}", other),
        }
    }
}

/// Decoded upload ready for classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub content: Vec<u8>,
    pub filename: String,
}

/// HTTP-style reply to an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    /// JSON-encoded [`ResponseBody`].
    pub body: String,
}

impl EventResponse {
    pub fn parse_body(&self) -> serde_json::Result<ResponseBody> {
        serde_json::from_str(&self.body)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseBody {
    pub success: bool,
    pub message: String,
    pub mimetype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ClassificationDetail>,
}

impl ResponseBody {
    fn from_verdict(verdict: ClassificationVerdict, filename: String) -> Self {
        Self {
            success: verdict.is_csv,
            message: verdict.message,
            mimetype: Some(verdict.mimetype),
            filename: Some(filename),
            details: Some(verdict.detail),
        }
    }

    fn from_error(err: &EnvelopeError) -> Self {
        Self {
            success: false,
            message: err.response_message(),
            mimetype: None,
            filename: None,
            details: None,
        }
    }
}

/// Pick the request body out of an event.
pub fn extract_body(event: &Value) -> Result<Value> {
    match event.get("body") {
        Some(Value::String(raw)) => {
            serde_json::from_str(raw).map_err(|e| EnvelopeError::InvalidBody(e.to_string()))
        }
        Some(body) => Ok(body.clone()),
        None => Ok(event.clone()),
    }
}

/// Validate the body and decode its content.
pub fn decode_upload(event: &Value) -> Result<Upload> {
    let body = extract_body(event)?;
    let fields = body
        .as_object()
        .ok_or_else(|| EnvelopeError::InvalidBody("expected a JSON object".to_string()))?;

    let encoded = match fields.get("file_content") {
        None => return Err(EnvelopeError::MissingContent),
        Some(Value::String(encoded)) => encoded,
        Some(_) => {
            return Err(EnvelopeError::InvalidBody(
                "file_content must be a base64 string".to_string(),
            ))
        }
    };

    let filename = match fields.get("filename") {
        None | Some(Value::Null) => UNKNOWN_FILENAME.to_string(),
        Some(Value::String(name)) => name.clone(),
        Some(_) => {
            return Err(EnvelopeError::InvalidBody(
                "filename must be a string".to_string(),
            ))
        }
    };

    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let content = STANDARD.decode(compact)?;

    Ok(Upload { content, filename })
}

/// Build a direct-invocation event for `content`.
pub fn encode_event(content: &[u8], filename: Option<&str>) -> Value {
    let mut event = json!({ "file_content": STANDARD.encode(content) });
    if let Some(name) = filename {
        event["filename"] = Value::String(name.to_string());
    }
    event
}

/// Answer one upload event. Never fails; problems become 4xx/5xx responses.
pub fn handle_event(classifier: &Classifier, event: &Value) -> EventResponse {
    let (status_code, body) = match decode_upload(event) {
        Ok(upload) => {
            let verdict = classifier.classify(&upload.content, Some(&upload.filename));
            info!(
                filename = %upload.filename,
                bytes = upload.content.len(),
                is_csv = verdict.is_csv,
                mimetype = %verdict.mimetype,
                "Upload classified"
            );
            (200, ResponseBody::from_verdict(verdict, upload.filename))
        }
        Err(err) => {
            warn!(status = err.status_code(), error = %err, "Rejected upload event");
            (err.status_code(), ResponseBody::from_error(&err))
        }
    };

    EventResponse {
        status_code,
        body: serialize_body(&body),
    }
}

fn serialize_body(body: &ResponseBody) -> String {
    serde_json::to_string(body).unwrap_or_else(|e| {
        json!({
            "success": false,
            "message": format!("Error processing file: {}", e),
            "mimetype": null,
        })
        .to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> Classifier {
        Classifier::default()
    }

    #[test]
    fn test_direct_invocation() {
        let event = encode_event(b"name,age,city\nJohn,30,NYC\nJane,25,LA", Some("test.csv"));
        let response = handle_event(&classifier(), &event);
        assert_eq!(response.status_code, 200);

        let body = response.parse_body().unwrap();
        assert!(body.success);
        assert_eq!(body.message, "File is a valid CSV");
        assert_eq!(body.mimetype.as_deref(), Some("text/csv"));
        assert_eq!(body.filename.as_deref(), Some("test.csv"));
        assert!(body.details.is_some());
    }

    #[test]
    fn test_api_gateway_string_body() {
        let inner = encode_event(b"%PDF-1.4\n", Some("doc.pdf"));
        let event = json!({ "body": inner.to_string() });
        let response = handle_event(&classifier(), &event);
        assert_eq!(response.status_code, 200);

        let body = response.parse_body().unwrap();
        assert!(!body.success);
        assert_eq!(body.message, "File is not a valid CSV");
        assert_eq!(body.mimetype.as_deref(), Some("application/pdf"));
    }

    #[test]
    fn test_object_body() {
        let event = json!({ "body": encode_event(b"id,value\n1,2\n", None) });
        let body = handle_event(&classifier(), &event).parse_body().unwrap();
        assert!(body.success);
        assert_eq!(body.filename.as_deref(), Some("unknown"));
    }

    #[test]
    fn test_missing_file_content_is_400() {
        let response = handle_event(&classifier(), &json!({ "filename": "x.csv" }));
        assert_eq!(response.status_code, 400);

        let raw: Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(raw["success"], false);
        assert_eq!(raw["message"], "Missing file_content in request");
        assert!(raw["mimetype"].is_null());
        assert!(raw.get("filename").is_none());
    }

    #[test]
    fn test_invalid_base64_is_500() {
        let event = json!({ "file_content": "!!!not base64!!!", "filename": "x.csv" });
        let response = handle_event(&classifier(), &event);
        assert_eq!(response.status_code, 500);

        let body = response.parse_body().unwrap();
        assert!(body.message.starts_with("Error processing file:"));
        assert!(body.mimetype.is_none());
    }

    #[test]
    fn test_malformed_string_body_is_500() {
        let response = handle_event(&classifier(), &json!({ "body": "{not json" }));
        assert_eq!(response.status_code, 500);
        assert!(response
            .parse_body()
            .unwrap()
            .message
            .starts_with("Error processing file: invalid request body"));
    }

    #[test]
    fn test_decode_upload_rejects_wrong_types() {
        assert!(matches!(
            decode_upload(&json!({ "file_content": 42 })),
            Err(EnvelopeError::InvalidBody(_))
        ));
        assert!(matches!(
            decode_upload(&json!({ "file_content": "", "filename": 7 })),
            Err(EnvelopeError::InvalidBody(_))
        ));
        assert!(matches!(
            decode_upload(&json!(["file_content"])),
            Err(EnvelopeError::InvalidBody(_))
        ));
    }

    #[test]
    fn test_decode_upload_tolerates_wrapped_base64() {
        let upload = decode_upload(&json!({ "file_content": "bmFtZSxh\nZ2UK", "filename": null }))
            .unwrap();
        assert_eq!(upload.content, b"name,age\n");
        assert_eq!(upload.filename, "unknown");
    }

    #[test]
    fn test_empty_content_is_not_csv() {
        let body = handle_event(&classifier(), &encode_event(b"", Some("empty.csv")))
            .parse_body()
            .unwrap();
        assert!(!body.success);
        assert_eq!(body.mimetype.as_deref(), Some("application/octet-stream"));
    }

    #[test]
    fn test_response_serializes_status_code_key() {
        let response = EventResponse {
            status_code: 200,
            body: "{}".to_string(),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["statusCode"], 200);
    }
}
