use serde::{Deserialize, Serialize};

/// Uniform response wrapper returned by every backend endpoint.
///
/// Errors carry `success = false` and a human-readable message. A missing
/// `result` is a valid success state (e.g. delete endpoints).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    pub message: String,
    #[serde(default)]
    pub result: Option<T>,
    pub success: bool,
}

impl<T> Envelope<T> {
    pub fn success(message: impl Into<String>, result: Option<T>) -> Self {
        Self {
            message: message.into(),
            result,
            success: true,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            result: None,
            success: false,
        }
    }
}
