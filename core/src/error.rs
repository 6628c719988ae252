//! Error types for the resource client and its controllers.
//!
//! # Design
//! `NotFound` keeps its own variant because controllers distinguish "the
//! record is gone" from other failures. Server-side validation failures
//! (non-2xx with a JSON body on create/update) become `Rejected` so the
//! field-level messages reach the user verbatim. Everything that fails before
//! a request is sent (`Validation`, `MissingId`, `Unsupported`) never touches
//! the network.

use thiserror::Error;

/// Errors returned by client parse methods, transports and controllers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// Non-2xx status whose body is not a JSON error document.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// Non-2xx status carrying a JSON error document, kept verbatim.
    #[error("{detail}")]
    Rejected {
        status: u16,
        detail: serde_json::Value,
    },

    /// The request never produced a response.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body could not be deserialized into the expected shape.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// A local check failed before any request was built.
    #[error("{0}")]
    Validation(String),

    /// The record carries no usable value in the resource's id field.
    #[error("record has no `{field}` identifier")]
    MissingId { field: String },

    /// An exported file could not be written.
    #[error("could not save download: {0}")]
    Download(#[from] std::io::Error),

    /// The resource does not offer this operation.
    #[error("`{operation}` is not supported by resource `{resource}`")]
    Unsupported {
        resource: String,
        operation: &'static str,
    },
}

impl ApiError {
    /// HTTP status for errors that came back from the server.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound => Some(404),
            ApiError::HttpError { status, .. } | ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the failure was detected locally and no request was sent.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ApiError::Validation(_) | ApiError::MissingId { .. } | ApiError::Unsupported { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejected_displays_the_json_document() {
        let err = ApiError::Rejected {
            status: 400,
            detail: json!({"nombre": ["This field is required."]}),
        };
        assert_eq!(err.to_string(), r#"{"nombre":["This field is required."]}"#);
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn local_errors_have_no_status() {
        let err = ApiError::MissingId { field: "id".into() };
        assert!(err.is_local());
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "record has no `id` identifier");
    }
}
