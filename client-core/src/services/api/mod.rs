//! # Backend API
//!
//! One module per resource family, in the shape of the REST surface. Each
//! module owns its cache key constructors and declares the invalidation
//! prefixes of its mutations, so no call site has to enumerate derived
//! views.

pub mod auth;
pub mod client;
pub mod depots;
pub mod dispatches;
pub mod notifications;
pub mod orders;
pub mod routes;
pub mod subscriptions;
pub mod users;
pub mod vehicles;

pub use client::{FilePart, Gateway};
