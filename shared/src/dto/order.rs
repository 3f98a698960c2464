use serde::{Deserialize, Serialize};

/// Waste category of a pickup. Drives depot selection and vehicle matching
/// on the server side.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrashCategory {
    General,
    Organic,
    Recyclable,
    Hazardous,
    Electronic,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Reassigned,
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

/// Order creation request. Sent as the JSON-encoded `request` part of a
/// multipart body; an optional photo travels in the `file` part.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreateRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub weight: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: TrashCategory,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdateRequest {
    pub status: OrderStatus,
}

/// A collection order as the backend reports it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: String,
    /// Position within the assigned route, when routed.
    pub index: Option<i64>,
    pub user_id: String,
    pub route_id: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub category: TrashCategory,
    pub weight: f64,
    pub status: OrderStatus,
    pub completed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}
