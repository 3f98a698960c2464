use serde::{Deserialize, Serialize};

use super::order::TrashCategory;
use super::vehicle::VehicleResponse;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DepotCreateRequest {
    pub latitude: f64,
    pub longitude: f64,
    /// When absent the backend reverse-geocodes the coordinates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub category: TrashCategory,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DepotUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<TrashCategory>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DepotResponse {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub vehicles: Vec<VehicleResponse>,
    pub category: TrashCategory,
    pub created_at: String,
    pub updated_at: String,
}
