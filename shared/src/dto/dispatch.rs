use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DispatchStatus {
    InProgress,
    Completed,
}

/// A dispatch run: one server-side routing pass over the pending orders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResponse {
    pub id: String,
    pub status: DispatchStatus,
    pub completed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}
