use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Wire record at `vehicles/{vehicleId}` in the realtime database.
///
/// Older driver builds wrote `lat`/`lon`, current ones write the full
/// names; both spellings are accepted on read.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct VehicleTelemetry {
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lon")]
    pub longitude: f64,
    #[serde(default)]
    pub load: f64,
}

/// One observed position/load sample for a vehicle. Ephemeral: kept only
/// as the latest value per vehicle, never cached alongside REST resources.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySample {
    pub vehicle_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub load: f64,
    pub observed_at: DateTime<Utc>,
}

/// Partial update a driver client pushes upstream. Only the fields that are
/// set overwrite the remote record.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct TelemetryUpdate {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub load: Option<f64>,
}

impl TelemetryUpdate {
    /// The fields actually present, keyed by their wire names.
    pub fn into_fields(self) -> Map<String, Value> {
        let mut fields = Map::new();
        if let Some(latitude) = self.latitude {
            fields.insert("latitude".to_string(), Value::from(latitude));
        }
        if let Some(longitude) = self.longitude {
            fields.insert("longitude".to_string(), Value::from(longitude));
        }
        if let Some(load) = self.load {
            fields.insert("load".to_string(), Value::from(load));
        }
        fields
    }

    pub fn is_empty(&self) -> bool {
        self.latitude.is_none() && self.longitude.is_none() && self.load.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_telemetry_accepts_short_field_names() {
        let telemetry: VehicleTelemetry =
            serde_json::from_value(serde_json::json!({"lat": 10.5, "lon": 106.7})).unwrap();
        assert_eq!(telemetry.latitude, 10.5);
        assert_eq!(telemetry.longitude, 106.7);
        assert_eq!(telemetry.load, 0.0);
    }

    #[test]
    fn test_update_into_fields_skips_unset() {
        let update = TelemetryUpdate {
            latitude: Some(1.0),
            longitude: None,
            load: Some(40.0),
        };
        let fields = update.into_fields();
        assert_eq!(fields.len(), 2);
        assert!(fields.contains_key("latitude"));
        assert!(fields.contains_key("load"));
        assert!(!fields.contains_key("longitude"));
    }
}
