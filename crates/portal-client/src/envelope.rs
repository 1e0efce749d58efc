//! Response envelope handling.
//!
//! The backend wraps most responses as
//! `{ "success": bool, "message": string, "data": T, "errors": [..] }`.
//! [`Payload::classify`] decides what a decoded body means before it is
//! deserialized into the caller's type.

use serde_json::{Map, Value};

use crate::error::{ApiError, GENERIC_ERROR_MESSAGE};

/// A response body after envelope inspection.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Successful envelope; holds `data`, or the whole envelope when it has
    /// no `data` key.
    Data(Value),
    /// Envelope with `success: false`. Its `data` is ignored.
    Rejected {
        /// Envelope message.
        message: String,
        /// Envelope errors.
        errors: Vec<String>,
    },
    /// Not an envelope; passed through verbatim.
    Raw(Value),
}

impl Payload {
    /// Classify a decoded body.
    ///
    /// An object carrying a `success` key is an envelope. A `success` value
    /// other than `false` counts as success.
    pub fn classify(body: Value) -> Self {
        let Value::Object(mut object) = body else {
            return Payload::Raw(body);
        };
        let Some(success) = object.get("success") else {
            return Payload::Raw(Value::Object(object));
        };

        if success.as_bool() == Some(false) {
            return Payload::Rejected {
                message: message_of(&object).unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string()),
                errors: object.get("errors").map(collect_errors).unwrap_or_default(),
            };
        }

        match object.remove("data") {
            Some(data) => Payload::Data(data),
            None => Payload::Data(Value::Object(object)),
        }
    }

    /// The value to hand to the caller, or the rejection as an error.
    pub fn into_result(self, status: u16) -> Result<Value, ApiError> {
        match self {
            Payload::Data(value) | Payload::Raw(value) => Ok(value),
            Payload::Rejected { message, errors } => Err(ApiError::Rejected {
                status,
                message,
                errors,
            }),
        }
    }
}

/// Decode a body; empty (or whitespace) is `null`, non-JSON text is a string.
pub fn parse_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

/// Message of an error body: `message`, then ProblemDetails `title`/`detail`.
pub fn message_of(object: &Map<String, Value>) -> Option<String> {
    ["message", "title", "detail"]
        .iter()
        .filter_map(|key| object.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Flatten `errors` into display strings.
///
/// Accepts a list of strings or a validation map of `field: [messages]`,
/// which is rendered as `"field: message"` entries.
pub fn collect_errors(errors: &Value) -> Vec<String> {
    match errors {
        Value::Array(items) => items.iter().filter_map(render_error).collect(),
        Value::Object(fields) => fields
            .iter()
            .flat_map(|(field, messages)| {
                let messages = match messages {
                    Value::Array(items) => items.iter().filter_map(render_error).collect(),
                    other => render_error(other).into_iter().collect::<Vec<_>>(),
                };
                messages.into_iter().map(move |m| format!("{}: {}", field, m))
            })
            .collect(),
        Value::String(s) if !s.is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

fn render_error(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_with_data_unwraps() {
        let payload = Payload::classify(json!({"success": true, "message": "ok", "data": {"id": 4}}));
        assert_eq!(payload, Payload::Data(json!({"id": 4})));
    }

    #[test]
    fn test_success_with_null_data_is_null() {
        let payload = Payload::classify(json!({"success": true, "data": null}));
        assert_eq!(payload, Payload::Data(Value::Null));
    }

    #[test]
    fn test_success_without_data_returns_envelope() {
        let body = json!({"success": true, "message": "Deleted"});
        assert_eq!(Payload::classify(body.clone()), Payload::Data(body));
    }

    #[test]
    fn test_failure_ignores_data() {
        let payload = Payload::classify(json!({
            "success": false,
            "message": "Department name already exists",
            "data": {"id": 1},
            "errors": ["name"]
        }));
        assert_eq!(
            payload,
            Payload::Rejected {
                message: "Department name already exists".into(),
                errors: vec!["name".into()],
            }
        );

        let err = payload.into_result(200).unwrap_err();
        assert_eq!(err.status(), 200);
        assert_eq!(err.message(), "Department name already exists");
    }

    #[test]
    fn test_failure_without_message_uses_fallback() {
        let payload = Payload::classify(json!({"success": false}));
        assert!(matches!(payload, Payload::Rejected { ref message, .. } if message == GENERIC_ERROR_MESSAGE));
    }

    #[test]
    fn test_non_envelopes_are_raw() {
        assert_eq!(Payload::classify(json!([1, 2])), Payload::Raw(json!([1, 2])));
        assert_eq!(Payload::classify(json!({"id": 1})), Payload::Raw(json!({"id": 1})));
        assert_eq!(Payload::classify(Value::Null), Payload::Raw(Value::Null));
    }

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(b""), Value::Null);
        assert_eq!(parse_body(b"  \n"), Value::Null);
        assert_eq!(parse_body(b"{\"a\":1}"), json!({"a": 1}));
        assert_eq!(parse_body(b"Bad Gateway"), json!("Bad Gateway"));
    }

    #[test]
    fn test_collect_validation_errors() {
        let errors = collect_errors(&json!({"Name": ["is required"], "Email": ["is invalid", "is taken"]}));
        assert_eq!(
            errors,
            vec!["Email: is invalid", "Email: is taken", "Name: is required"]
        );
        assert_eq!(collect_errors(&json!(["a", null, ""])), vec!["a"]);
        assert!(collect_errors(&Value::Null).is_empty());
    }

    #[test]
    fn test_message_precedence() {
        let body = json!({"title": "One or more validation errors occurred.", "message": " "});
        assert_eq!(
            message_of(body.as_object().unwrap()).as_deref(),
            Some("One or more validation errors occurred.")
        );
    }
}
