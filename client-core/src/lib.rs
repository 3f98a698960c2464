//! # Dispatch Client Core
//!
//! The state-synchronization core shared by the dispatch product's client
//! applications (customer, driver, dispatcher). Everything a screen needs
//! from the backend flows through here; the embedding application owns
//! rendering, navigation, and the runtime.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 client-core (this crate)                 │
//! ├──────────────────────────────────────────────────────────┤
//! │  session     - identity + bearer token, persisted        │
//! │  cache       - keyed resources, prefix invalidation      │
//! │  services    - REST gateway + endpoint wrappers,         │
//! │                realtime telemetry channel                │
//! │  push        - notification event routing                │
//! │  feedback    - toast outcomes for the UI to drain        │
//! └──────────────────────────────────────────────────────────┘
//!        │ HTTP (Envelope<T>)          │ websocket
//!        ▼                             ▼
//! ┌─────────────────┐        ┌──────────────────────┐
//! │  Backend API    │        │  Realtime telemetry  │
//! └─────────────────┘        └──────────────────────┘
//! ```
//!
//! Reads go UI → cache → gateway (on miss or staleness) → backend, with
//! the bearer token re-read from the session store per call. Push events
//! flow backend → [`push::NotificationRouter`] → cache invalidation and an
//! optional navigation intent. Vehicle telemetry bypasses the cache
//! entirely: it is a latest-sample-wins stream delivered straight to
//! subscribers.
//!
//! ## Entry point
//!
//! [`core::Core::bootstrap`] wires the production defaults and restores
//! the persisted session; [`core::Core::init`] takes the seams
//! ([`core::service::SessionStorage`], [`core::service::RealtimeBackend`],
//! [`core::service::FeedbackSink`]) explicitly.

pub mod cache;
pub mod config;
pub mod core;
pub mod feedback;
pub mod logging;
pub mod push;
pub mod services;
pub mod session;

pub use crate::cache::{CacheConfig, CacheEntry, Mutation, MutationKind, ResourceCache, ResourceKey};
pub use crate::config::CoreConfig;
pub use crate::core::error::{CoreError, Result};
pub use crate::core::Core;
pub use crate::feedback::{ChannelFeedback, Feedback, FeedbackLevel, NullFeedback};
pub use crate::push::{DeliveryContext, NavigationIntent, NotificationEvent, NotificationRouter};
pub use crate::services::api::{FilePart, Gateway};
pub use crate::services::telemetry::{Subscription, TelemetryChannel};
pub use crate::session::{Session, SessionStore};
