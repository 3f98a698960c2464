use serde::{Deserialize, Serialize};

use super::order::OrderResponse;
use super::vehicle::VehicleResponse;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteStatus {
    InProgress,
    Completed,
}

/// A computed collection route for one vehicle within a dispatch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteResponse {
    pub id: String,
    pub vehicle: VehicleResponse,
    pub dispatch_id: String,
    pub distance: f64,
    pub status: RouteStatus,
    pub orders: Vec<OrderResponse>,
    pub completed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub duration: f64,
    /// Polyline as `[lat, lon]` pairs, precise enough to draw the route.
    pub coordinates: Vec<[f64; 2]>,
}
