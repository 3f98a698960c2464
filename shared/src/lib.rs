//! # Shared Data Transfer Objects Library
//!
//! This library defines the contract between the dispatch clients (mobile,
//! web, desktop) and the backend API. All DTOs use JSON serialization via
//! `serde` for API communication.
//!
//! ## Structure
//!
//! - **[`dto`]**: Data Transfer Objects for API communication
//!   - **[`dto::envelope`]**: The uniform response envelope every endpoint returns
//!   - **[`dto::auth`]**: Authentication and account DTOs
//!   - **[`dto::order`]**: Collection order DTOs
//!   - **[`dto::route`]**: Computed route DTOs
//!   - **[`dto::vehicle`]**: Fleet vehicle DTOs
//!   - **[`dto::depot`]**: Depot DTOs
//!   - **[`dto::dispatch`]**: Dispatch run DTOs
//!   - **[`dto::notification`]**: Persisted notification DTOs
//!   - **[`dto::subscription`]**: Recurring pickup subscription DTOs
//!   - **[`dto::telemetry`]**: Realtime vehicle telemetry records
//!
//! ## Wire Format
//!
//! The backend is a JVM service, so field names map to **camelCase** on the
//! wire (`#[serde(rename_all = "camelCase")]`) and enums serialize as their
//! **SCREAMING_SNAKE_CASE** names. Optional request fields are omitted when
//! `None`. Every response body is an [`dto::envelope::Envelope`].

pub mod dto;

// Re-export commonly used types for convenience
pub use dto::*;
