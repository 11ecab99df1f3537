use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use model::TextSubmission;
use serde_json::Value;

/// Why a request body was rejected before any execution started.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Request has no body")]
    MissingBody,
    #[error("Body is not valid JSON: {0}")]
    NotJson(#[from] serde_json::Error),
    #[error("Body is not a JSON object")]
    NotAnObject,
    #[error("Missing required field {0}")]
    MissingField(String),
    #[error("Field {0} must be a string")]
    NotAString(String),
}

/// Pull the text out of a `{"<field>": "<text>"}` body.
///
/// Other fields are ignored.
pub fn parse_submission(
    body: Option<&str>,
    text_field_name: &str,
) -> Result<TextSubmission, ValidationError> {
    let body: &str = body.ok_or(ValidationError::MissingBody)?;
    let value: Value = serde_json::from_str(body)?;
    let fields = value.as_object().ok_or(ValidationError::NotAnObject)?;

    match fields.get(text_field_name) {
        None => Err(ValidationError::MissingField(text_field_name.to_string())),
        Some(Value::String(text)) => Ok(TextSubmission { text: text.clone() }),
        Some(_) => Err(ValidationError::NotAString(text_field_name.to_string())),
    }
}

/// Name an execution after the request body.
///
/// The hash is taken over the base64 of the JavaScript-escaped body, the
/// same value API Gateway mapping templates produce with
/// `$util.base64Encode($util.escapeJavaScript($input.body))`. The same body
/// always produces the same prefix; the start time keeps re-submissions of
/// the same text apart.
pub fn execution_name(pipeline_name: &str, body: &str, start_date: DateTime<Utc>) -> String {
    let hash: i32 = java_hash_code(&STANDARD.encode(escape_javascript(body)));

    format!("{pipeline_name}-{hash}-{}", start_date.timestamp_millis())
}

/// Escape `value` with JavaScript string rules, as `$util.escapeJavaScript`.
///
/// Quotes, backslashes and `/` get a backslash. Control characters use their
/// short escape where one exists. Everything else outside ASCII
/// becomes `\uXXXX` per UTF-16 code unit.
fn escape_javascript(value: &str) -> String {
    let mut escaped: String = String::with_capacity(value.len());

    for unit in value.encode_utf16() {
        match unit {
            0x08 => escaped.push_str("\\b"),
            0x09 => escaped.push_str("\\t"),
            0x0A => escaped.push_str("\\n"),
            0x0C => escaped.push_str("\\f"),
            0x0D => escaped.push_str("\\r"),
            0x22 => escaped.push_str("\\\""),
            0x27 => escaped.push_str("\\'"),
            0x2F => escaped.push_str("\\/"),
            0x5C => escaped.push_str("\\\\"),
            0x20..=0x7F => escaped.push(char::from(unit as u8)),
            _ => escaped.push_str(&format!("\\u{unit:04X}")),
        }
    }

    escaped
}

/// `java.lang.String#hashCode` over the UTF-16 code units of `value`.
fn java_hash_code(value: &str) -> i32 {
    value
        .encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(i32::from(unit)))
}
