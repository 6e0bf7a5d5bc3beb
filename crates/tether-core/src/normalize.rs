//! Response normalization.
//!
//! Turns a raw transport response into either a success body or a
//! structured [`Failure`]. Never fails itself: unparseable bodies are
//! replaced with a synthetic one.

use serde_json::json;

use crate::classify::classify_status;
use crate::response::{Failure, NormalizedResult, ResponseBody};
use crate::types::RawResponse;

/// Message placed in the synthetic body when a JSON body does not parse.
pub const UNPROCESSABLE_MESSAGE: &str = "response could not be processed";

/// Normalize a raw response.
pub fn normalize(raw: &RawResponse) -> NormalizedResult {
    let body = parse_body(raw);

    let Some(kind) = classify_status(raw.status) else {
        return Ok(body);
    };

    let (message, code) = failure_message(raw, &body);

    Err(Failure::new(kind, Some(raw.status), message)
        .with_code(code)
        .with_raw_body(body))
}

/// Parse the body according to the response content type.
pub fn parse_body(raw: &RawResponse) -> ResponseBody {
    if !is_json(raw.content_type.as_deref()) {
        return ResponseBody::Text(String::from_utf8_lossy(&raw.body).into_owned());
    }

    if raw.body.iter().all(u8::is_ascii_whitespace) {
        return ResponseBody::Json(serde_json::Value::Null);
    }

    match serde_json::from_slice(&raw.body) {
        Ok(value) => ResponseBody::Json(value),
        Err(e) => {
            tracing::debug!(error = %e, status = raw.status, "Unparseable JSON body");
            ResponseBody::Json(json!({
                "success": false,
                "message": UNPROCESSABLE_MESSAGE,
            }))
        }
    }
}

fn is_json(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("json"))
}

fn failure_message(raw: &RawResponse, body: &ResponseBody) -> (String, Option<String>) {
    // An HTML error page can arrive under any content type, including JSON.
    if looks_like_html(&raw.body) {
        return (
            format!("Internal server error (status {})", raw.status),
            None,
        );
    }

    match body {
        ResponseBody::Json(value) => {
            let code = value.get("code").and_then(|c| match c {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            });
            match value.get("message").and_then(|m| m.as_str()) {
                Some(message) if !message.is_empty() => (message.to_string(), code),
                _ => (generic_message(raw.status), code),
            }
        }
        ResponseBody::Text(text) if !text.trim().is_empty() => (text.trim().to_string(), None),
        ResponseBody::Text(_) => (generic_message(raw.status), None),
    }
}

fn looks_like_html(body: &[u8]) -> bool {
    let start = body
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(body.len());
    let head = body[start..].get(..14).unwrap_or(&body[start..]);
    let head = head.to_ascii_lowercase();
    head.starts_with(b"<!doctype html") || head.starts_with(b"<html")
}

fn generic_message(status: u16) -> String {
    format!("Request failed with status {}", status)
}
