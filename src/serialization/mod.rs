//! JSON text rendering for event payloads.
//!
//! Aspects never abort an event because a value cannot be rendered. The
//! helpers here return `Result` for callers that care; the `render_*`
//! variants fold failures into a fixed placeholder string instead.
//!
//! # Placeholders
//!
//! ```text
//! parameters  ->  "Failed to serialize parameters: <reason>"
//! response    ->  "Failed to serialize response: <reason>"
//! ```
//!
//! # Example
//!
//! ```rust
//! use aspect_kit::serialization::{render_response, to_text};
//!
//! # fn main() -> aspect_kit::Result<()> {
//! assert_eq!(to_text(&vec![1, 2])?, "[1,2]");
//! assert_eq!(render_response(&Option::<u8>::None), "null");
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use serde::Serialize;
use serde_json::Value;

/// Rendering used when a call has no arguments.
pub const EMPTY_PARAMETERS: &str = "[]";

/// Prefix of the placeholder for an argument list that could not be rendered.
pub const PARAMETERS_PLACEHOLDER: &str = "Failed to serialize parameters: ";

/// Prefix of the placeholder for a result that could not be rendered.
pub const RESPONSE_PLACEHOLDER: &str = "Failed to serialize response: ";

/// Serialize any value to compact JSON text.
///
/// # Errors
///
/// Returns `Error::SerializationError` if the value's `Serialize` impl fails.
pub fn to_text<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| {
        warn!("JSON serialization failed: {}", e);
        Error::SerializationError(e.to_string())
    })
}

/// Serialize any value to a JSON tree.
///
/// # Errors
///
/// Returns `Error::SerializationError` if the value's `Serialize` impl fails.
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(Error::from)
}

/// Render a list of already-captured argument values.
///
/// Each item is either the argument's JSON tree or the reason it could not
/// be produced. The first failure wins and becomes the placeholder.
pub fn render_parameters<'a, I>(values: I) -> String
where
    I: IntoIterator<Item = std::result::Result<&'a Value, &'a str>>,
{
    let mut rendered = Vec::new();
    for value in values {
        match value {
            Ok(v) => rendered.push(v.clone()),
            Err(reason) => return format!("{}{}", PARAMETERS_PLACEHOLDER, reason),
        }
    }

    if rendered.is_empty() {
        return EMPTY_PARAMETERS.to_string();
    }

    match to_text(&rendered) {
        Ok(text) => text,
        Err(e) => format!("{}{}", PARAMETERS_PLACEHOLDER, e),
    }
}

/// Render a call's result. A JSON `null` renders as the literal `"null"`.
pub fn render_response<T: Serialize + ?Sized>(result: &T) -> String {
    match to_text(result) {
        Ok(text) => text,
        Err(e) => format!("{}{}", RESPONSE_PLACEHOLDER, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::Error as _;
    use serde::Serializer;
    use serde_json::json;

    struct Unrenderable;

    impl Serialize for Unrenderable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> std::result::Result<S::Ok, S::Error> {
            Err(S::Error::custom("socket handle"))
        }
    }

    #[test]
    fn test_to_text() {
        let text = to_text(&json!({"id": 1})).expect("serialize");
        assert_eq!(text, r#"{"id":1}"#);
    }

    #[test]
    fn test_to_text_failure() {
        let err = to_text(&Unrenderable).unwrap_err();
        assert!(matches!(err, Error::SerializationError(_)));
    }

    #[test]
    fn test_render_parameters_empty() {
        let values: Vec<std::result::Result<&Value, &str>> = vec![];
        assert_eq!(render_parameters(values), "[]");
    }

    #[test]
    fn test_render_parameters() {
        let a = json!(42);
        let b = json!({"name": "Alice"});
        let text = render_parameters(vec![Ok(&a), Ok(&b)]);
        assert_eq!(text, r#"[42,{"name":"Alice"}]"#);
    }

    #[test]
    fn test_render_parameters_placeholder() {
        let a = json!(42);
        let text = render_parameters(vec![Ok(&a), Err("socket handle")]);
        assert_eq!(text, "Failed to serialize parameters: socket handle");
    }

    #[test]
    fn test_render_response() {
        assert_eq!(render_response(&"ok"), r#""ok""#);
        assert_eq!(render_response(&()), "null");
        assert!(render_response(&Unrenderable).starts_with(RESPONSE_PLACEHOLDER));
    }
}
