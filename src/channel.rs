//! Bridge channel codec.
//!
//! Requests arrive as a method name plus a JSON argument bag, the shape a
//! Flutter `MethodChannel` hands to its platform handler. Responses are
//! encoded as one of:
//!
//! - `{"success": <value>}`
//! - `{"errorCode": "<CODE>", "message": "<text>"}`
//! - `{"notImplemented": true}`

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{ErrorCode, OverlayError};
use crate::overlay::style::{Argb, OverlayStyle};

/// A decoded method call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default, deserialize_with = "args_or_empty")]
    pub args: Map<String, Value>,
}

fn args_or_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(map) => map,
        _ => Map::new(),
    })
}

impl MethodCall {
    pub fn new(method: impl Into<String>, args: Value) -> Self {
        Self {
            method: method.into(),
            args: match args {
                Value::Object(map) => map,
                _ => Map::new(),
            },
        }
    }

    /// Decode `{"method": ..., "args": {...}}`.
    pub fn from_json(payload: &str) -> Result<Self, OverlayError> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Decode a method name and a separately encoded argument bag.
    ///
    /// An empty string or `null` means "no arguments".
    pub fn from_parts(method: &str, args_json: &str) -> Result<Self, OverlayError> {
        let trimmed = args_json.trim();
        let args = if trimmed.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(trimmed)?
        };
        Ok(Self::new(method, args))
    }

    /// String argument; values of another type count as absent.
    pub fn arg_str(&self, key: &str) -> Option<&str> {
        self.args.get(key).and_then(Value::as_str)
    }

    /// Numeric argument; integers and floats are both accepted.
    pub fn arg_f32(&self, key: &str) -> Option<f32> {
        self.args.get(key).and_then(Value::as_f64).map(|v| v as f32)
    }

    /// Color argument: a 64-bit integer whose low 32 bits are ARGB.
    pub fn arg_color(&self, key: &str) -> Option<Argb> {
        let value = self.args.get(key)?;
        if let Some(v) = value.as_i64() {
            return Some(Argb::from_wire(v));
        }
        if let Some(v) = value.as_u64() {
            return Some(Argb::from_wire(v as i64));
        }
        value.as_f64().map(|v| Argb::from_wire(v as i64))
    }

    /// Sparse style from the style keys present in the bag.
    pub fn style(&self) -> OverlayStyle {
        OverlayStyle {
            font_size: self.arg_f32("fontSize"),
            text_color: self.arg_color("textColor"),
            background_color: self.arg_color("backgroundColor"),
            corner_radius: self.arg_f32("cornerRadius"),
            padding_horizontal: self.arg_f32("paddingHorizontal"),
            padding_vertical: self.arg_f32("paddingVertical"),
        }
    }
}

/// Commands understood by the router.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayCommand {
    Show {
        text: Option<String>,
        style: OverlayStyle,
    },
    Hide,
    UpdateText {
        text: Option<String>,
    },
    UpdateStyle {
        style: OverlayStyle,
    },
    HasPermission,
    RequestPermission,
}

impl OverlayCommand {
    pub fn name(&self) -> &'static str {
        match self {
            OverlayCommand::Show { .. } => "show",
            OverlayCommand::Hide => "hide",
            OverlayCommand::UpdateText { .. } => "updateText",
            OverlayCommand::UpdateStyle { .. } => "updateStyle",
            OverlayCommand::HasPermission => "hasPermission",
            OverlayCommand::RequestPermission => "requestPermission",
        }
    }
}

impl TryFrom<&MethodCall> for OverlayCommand {
    type Error = OverlayError;

    fn try_from(call: &MethodCall) -> Result<Self, Self::Error> {
        let text = || call.arg_str("text").map(str::to_string);
        match call.method.as_str() {
            "show" => Ok(OverlayCommand::Show {
                text: text(),
                style: call.style(),
            }),
            "hide" => Ok(OverlayCommand::Hide),
            "updateText" => Ok(OverlayCommand::UpdateText { text: text() }),
            "updateStyle" => Ok(OverlayCommand::UpdateStyle {
                style: call.style(),
            }),
            "hasPermission" => Ok(OverlayCommand::HasPermission),
            "requestPermission" => Ok(OverlayCommand::RequestPermission),
            other => Err(OverlayError::NotImplemented {
                method: other.to_string(),
            }),
        }
    }
}

/// Encoded reply to a [`MethodCall`].
#[derive(Debug, Clone, PartialEq)]
pub enum MethodResponse {
    Success(Value),
    Error { code: String, message: String },
    NotImplemented,
}

impl MethodResponse {
    pub fn from_result(result: Result<bool, OverlayError>) -> Self {
        match result {
            Ok(value) => MethodResponse::Success(Value::Bool(value)),
            Err(OverlayError::NotImplemented { .. }) => MethodResponse::NotImplemented,
            Err(err) => MethodResponse::Error {
                code: err.code().to_string(),
                message: err.message(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, MethodResponse::Success(_))
    }

    /// Success payload as a bool, if this is a boolean success.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MethodResponse::Success(value) => value.as_bool(),
            _ => None,
        }
    }

    pub fn error_code(&self) -> Option<&str> {
        match self {
            MethodResponse::Error { code, .. } => Some(code),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            MethodResponse::Success(value) => json!({ "success": value }),
            MethodResponse::Error { code, message } => {
                json!({ "errorCode": code, "message": message })
            }
            MethodResponse::NotImplemented => json!({ "notImplemented": true }),
        }
    }

    pub fn to_json_string(&self) -> String {
        self.to_json().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_args_decode() {
        let call = MethodCall::from_json(
            r#"{"method":"show","args":{"text":"Track A","fontSize":18,"textColor":4294901760,"cornerRadius":12.5}}"#,
        )
        .unwrap();
        let command = OverlayCommand::try_from(&call).unwrap();
        match command {
            OverlayCommand::Show { text, style } => {
                assert_eq!(text.as_deref(), Some("Track A"));
                assert_eq!(style.font_size, Some(18.0));
                assert_eq!(style.text_color, Some(Argb(0xFFFF_0000)));
                assert_eq!(style.corner_radius, Some(12.5));
                assert_eq!(style.background_color, None);
            }
            other => panic!("Expected Show, got {:?}", other),
        }
    }

    #[test]
    fn test_null_args_are_empty() {
        let call = MethodCall::from_json(r#"{"method":"hide","args":null}"#).unwrap();
        assert!(call.args.is_empty());
        let call = MethodCall::from_parts("hide", "").unwrap();
        assert!(call.args.is_empty());
    }

    #[test]
    fn test_non_string_text_is_absent() {
        let call = MethodCall::new("updateText", json!({ "text": 42 }));
        assert_eq!(
            OverlayCommand::try_from(&call).unwrap(),
            OverlayCommand::UpdateText { text: None }
        );
    }

    #[test]
    fn test_negative_color_keeps_bits() {
        let call = MethodCall::new("updateStyle", json!({ "backgroundColor": -15_654_349 }));
        // -15654349 == 0xFF112233 as i32
        assert_eq!(call.style().background_color, Some(Argb(0xFF11_2233)));
    }

    #[test]
    fn test_unknown_method() {
        let call = MethodCall::new("explode", Value::Null);
        let err = OverlayCommand::try_from(&call).unwrap_err();
        assert_eq!(
            MethodResponse::from_result(Err(err)),
            MethodResponse::NotImplemented
        );
    }

    #[test]
    fn test_response_encoding() {
        assert_eq!(
            MethodResponse::from_result(Ok(true)).to_json_string(),
            r#"{"success":true}"#
        );
        let response = MethodResponse::from_result(Err(OverlayError::NoPermission));
        assert_eq!(response.error_code(), Some("NO_PERMISSION"));
        assert_eq!(response.to_json()["errorCode"], "NO_PERMISSION");
        assert_eq!(
            MethodResponse::NotImplemented.to_json_string(),
            r#"{"notImplemented":true}"#
        );
    }

    #[test]
    fn test_malformed_args_json() {
        let err = MethodCall::from_parts("show", "{text:").unwrap_err();
        assert_eq!(err.code(), "INVALID_ARGUMENTS");
    }
}
