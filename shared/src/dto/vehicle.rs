use serde::{Deserialize, Serialize};

use super::order::TrashCategory;
use super::user::UserResponse;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleType {
    ThreeWheeler,
    CompactorTruck,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleStatus {
    Idle,
    Active,
    Repair,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VehicleCreateRequest {
    pub driver_id: String,
    pub depot_id: String,
    pub license_plate: String,
    #[serde(rename = "type")]
    pub vehicle_type: VehicleType,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VehicleUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depot_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<VehicleStatus>,
}

/// A fleet vehicle. The `current_*` fields are the last positions the
/// backend persisted; the realtime feed is authoritative while a vehicle
/// is on the road.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VehicleResponse {
    pub id: String,
    pub driver: UserResponse,
    pub depot_id: String,
    pub license_plate: String,
    pub capacity: f64,
    pub current_latitude: f64,
    pub current_longitude: f64,
    pub current_load: f64,
    #[serde(rename = "type")]
    pub vehicle_type: VehicleType,
    pub category: TrashCategory,
    pub status: VehicleStatus,
    pub created_at: String,
    pub updated_at: String,
}
