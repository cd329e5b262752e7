//! # Dynamic responses
//!
//! The structured message body the board UI understands: a title, either one
//! `error` or a list of `errors`, and a redirect back to safety. Success
//! mirrors the shape with `message`/`messages`.

use serde::Serialize;
use services::pipeline::Rejection;

#[derive(Debug, Clone, Serialize)]
pub struct DynamicMessage {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<String>>,
    pub redirect: String,
}

impl DynamicMessage {
    pub fn failure(title: &str, error: impl Into<String>, redirect: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            error: Some(error.into()),
            errors: None,
            message: None,
            messages: None,
            redirect: redirect.into(),
        }
    }

    pub fn success(messages: Vec<String>, redirect: String) -> Self {
        let (message, messages) = match messages.len() {
            1 => (messages.into_iter().next(), None),
            _ => (None, Some(messages)),
        };
        Self {
            title: "Success".to_string(),
            error: None,
            errors: None,
            message,
            messages,
            redirect,
        }
    }
}

impl From<Rejection> for DynamicMessage {
    fn from(rejection: Rejection) -> Self {
        let (error, errors) = match rejection.errors.len() {
            1 => (rejection.errors.into_iter().next(), None),
            _ => (None, Some(rejection.errors)),
        };
        Self {
            title: rejection.title,
            error,
            errors,
            message: None,
            messages: None,
            redirect: rejection.redirect,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_error_serializes_as_error() {
        let message: DynamicMessage = Rejection {
            title: "Not found".into(),
            errors: vec!["Selected posts not found".into()],
            redirect: "/b/".into(),
        }
        .into();
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["error"], "Selected posts not found");
        assert!(value.get("errors").is_none());
        assert_eq!(value["redirect"], "/b/");
    }

    #[test]
    fn several_errors_serialize_as_errors() {
        let message: DynamicMessage = Rejection {
            title: "Bad request".into(),
            errors: vec!["one".into(), "two".into()],
            redirect: "/b/".into(),
        }
        .into();
        let value = serde_json::to_value(&message).unwrap();
        assert!(value.get("error").is_none());
        assert_eq!(value["errors"].as_array().unwrap().len(), 2);
    }
}
