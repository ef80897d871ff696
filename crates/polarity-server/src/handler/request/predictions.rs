use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::handler::{ErrorKind, Result};

/// Body of `POST /predict`.
///
/// `text` is kept as a raw JSON value so a missing field and a field of the
/// wrong type can be told apart and reported separately.
#[must_use]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    /// The text to score.
    #[serde(default)]
    pub text: Option<Value>,
}

impl PredictionRequest {
    /// Creates a request for `text`.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(Value::String(text.into())),
        }
    }

    /// Returns the text to score.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::MissingParam`] when `text` is absent or null and
    /// [`ErrorKind::InvalidParam`] when it is not a string.
    pub fn text(&self) -> Result<&str> {
        match &self.text {
            None | Some(Value::Null) => Err(ErrorKind::MissingParam
                .with_message("text is required")
                .with_resource("text")),
            Some(Value::String(text)) => Ok(text),
            Some(other) => Err(ErrorKind::InvalidParam
                .with_message(format!("expected a string, got a {}", json_type_name(other)))
                .with_resource("text")),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn parse(value: Value) -> PredictionRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn string_text_is_accepted() {
        let request = parse(json!({ "text": "hello world" }));
        assert_eq!(request.text().unwrap(), "hello world");
        assert_eq!(PredictionRequest::new("").text().unwrap(), "");
    }

    #[test]
    fn absent_or_null_text_is_missing() {
        for body in [json!({}), json!({ "text": null })] {
            let error = parse(body).text().unwrap_err();
            assert_eq!(error.kind(), ErrorKind::MissingParam);
            assert_eq!(error.resource(), Some("text"));
        }
    }

    #[test]
    fn wrong_type_names_the_type() {
        let cases = [
            (json!({ "text": 5 }), "number"),
            (json!({ "text": true }), "boolean"),
            (json!({ "text": ["a"] }), "array"),
            (json!({ "text": { "a": 1 } }), "object"),
        ];

        for (body, type_name) in cases {
            let error = parse(body).text().unwrap_err();
            assert_eq!(error.kind(), ErrorKind::InvalidParam);
            assert_eq!(error.message(), Some(format!("expected a string, got a {type_name}").as_str()));
        }
    }
}
