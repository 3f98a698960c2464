//! Data Transfer Objects for backend API communication.

pub mod auth;
pub mod depot;
pub mod dispatch;
pub mod envelope;
pub mod notification;
pub mod order;
pub mod route;
pub mod subscription;
pub mod telemetry;
pub mod user;
pub mod vehicle;

pub use auth::*;
pub use depot::*;
pub use dispatch::*;
pub use envelope::*;
pub use notification::*;
pub use order::*;
pub use route::*;
pub use subscription::*;
pub use telemetry::*;
pub use user::*;
pub use vehicle::*;
