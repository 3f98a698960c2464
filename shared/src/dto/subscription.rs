use serde::{Deserialize, Serialize};

/// Recurring pickup subscription request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionCreateRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub estimated_weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    pub id: String,
    pub user_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub estimated_weight: f64,
    pub created_at: String,
    pub updated_at: String,
}
