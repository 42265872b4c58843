use serde::Serialize;
use thiserror::Error;

/// Error kinds surfaced to callers, per the three-kind error model: a
/// malformed template, an unknown template id, or an unexpected internal
/// failure during geometry/regex evaluation.
#[derive(Error, Debug)]
pub enum Error {
    #[error("validation error at {path}: {message}")]
    Validation { path: String, message: String },

    #[error("template '{0}' not found")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn validation(path: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation { .. } => "validation",
            Error::NotFound(_) => "not_found",
            Error::Internal(_) => "internal",
        }
    }
}

/// JSON-compatible error envelope returned to the caller, matching
/// `{ kind, message, detail? }`.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub kind: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,
}

impl From<&Error> for ErrorEnvelope {
    fn from(err: &Error) -> Self {
        let detail = match err {
            Error::Validation { path, .. } => {
                Some(serde_json::json!({ "path": path }))
            }
            Error::NotFound(id) => Some(serde_json::json!({ "id": id })),
            Error::Internal(_) => None,
        };
        ErrorEnvelope {
            kind: err.kind(),
            message: err.to_string(),
            detail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_carries_path_for_validation() {
        let err = Error::validation("meta.pages[2].anchors[1].searchBox", "w must be > 0");
        let envelope: ErrorEnvelope = (&err).into();
        assert_eq!(envelope.kind, "validation");
        assert_eq!(
            envelope.detail.unwrap()["path"],
            "meta.pages[2].anchors[1].searchBox"
        );
    }

    #[test]
    fn not_found_kind() {
        let err = Error::NotFound("inv-2025".into());
        assert_eq!(err.kind(), "not_found");
    }
}
