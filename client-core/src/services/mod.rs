//! # External Service Integrations
//!
//! - `api`: typed wrappers over the backend REST endpoints, bound to their
//!   cache keys and mutation invalidation sets
//! - `telemetry`: the realtime vehicle position/load channel

pub mod api;
pub mod telemetry;
