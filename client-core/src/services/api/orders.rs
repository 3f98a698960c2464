//! # Order Endpoints
//!
//! Collection orders: list views for dispatchers and drivers, user-scoped
//! lists for customers, creation with an optional photo, and the status
//! transitions drivers apply on the road.

use shared::dto::order::{OrderCreateRequest, OrderResponse, OrderUpdateRequest};

use crate::cache::{Mutation, ResourceKey};
use crate::core::error::Result;
use crate::core::Core;
use crate::services::api::client::FilePart;
use crate::services::api::users::users_key;

pub fn orders_key() -> ResourceKey {
    ResourceKey::from(["orders"])
}

pub fn order_key(order_id: &str) -> ResourceKey {
    ResourceKey::from(["orders", order_id])
}

pub fn pending_orders_key() -> ResourceKey {
    ResourceKey::from(["orders", "pending"])
}

pub fn ongoing_orders_key() -> ResourceKey {
    ResourceKey::from(["orders", "in-progress"])
}

pub fn user_orders_key(user_id: &str) -> ResourceKey {
    ResourceKey::from(["users", user_id, "orders"])
}

pub async fn get_orders(core: &Core) -> Result<Vec<OrderResponse>> {
    let gateway = core.gateway();
    core.cache()
        .fetch(orders_key(), move || async move {
            gateway.get("/orders").await
        })
        .await
}

pub async fn get_pending_orders(core: &Core) -> Result<Vec<OrderResponse>> {
    let gateway = core.gateway();
    core.cache()
        .fetch(pending_orders_key(), move || async move {
            gateway.get("/orders/pending").await
        })
        .await
}

pub async fn get_ongoing_orders(core: &Core) -> Result<Vec<OrderResponse>> {
    let gateway = core.gateway();
    core.cache()
        .fetch(ongoing_orders_key(), move || async move {
            gateway.get("/orders/in-progress").await
        })
        .await
}

pub async fn get_order(core: &Core, order_id: &str) -> Result<OrderResponse> {
    let gateway = core.gateway();
    let path = format!("/orders/{order_id}");
    core.cache()
        .fetch(order_key(order_id), move || async move {
            gateway.get(&path).await
        })
        .await
}

pub async fn get_orders_by_user(core: &Core, user_id: &str) -> Result<Vec<OrderResponse>> {
    let gateway = core.gateway();
    let path = format!("/users/{user_id}/orders");
    core.cache()
        .fetch(user_orders_key(user_id), move || async move {
            gateway.get(&path).await
        })
        .await
}

/// Create an order. The only multipart endpoint: the request rides in a
/// JSON-encoded `request` part, the optional photo in a `file` part.
#[tracing::instrument(skip(core, request, photo))]
pub async fn create_order(
    core: &Core,
    request: OrderCreateRequest,
    photo: Option<FilePart>,
) -> Result<OrderResponse> {
    let gateway = core.gateway().clone();
    core.cache()
        .mutate(
            Mutation::create("orders").invalidating([orders_key(), users_key()]),
            move || async move { gateway.post_multipart("/orders", &request, photo).await },
        )
        .await
}

pub async fn update_order(
    core: &Core,
    order_id: &str,
    request: OrderUpdateRequest,
) -> Result<OrderResponse> {
    let gateway = core.gateway().clone();
    let path = format!("/orders/{order_id}");
    core.cache()
        .mutate(
            Mutation::update("orders").invalidating([orders_key(), users_key()]),
            move || async move { gateway.post(&path, &request).await },
        )
        .await
}

/// Driver marks a stop as collected. User-scoped order lists live under
/// `users/{id}/orders`, hence the `users` prefix in the invalidation set.
#[tracing::instrument(skip(core))]
pub async fn mark_order_done(core: &Core, order_id: &str) -> Result<OrderResponse> {
    let gateway = core.gateway().clone();
    let path = format!("/orders/{order_id}/done");
    core.cache()
        .mutate(
            Mutation::update("orders").invalidating([orders_key(), users_key()]),
            move || async move { gateway.post_empty(&path).await },
        )
        .await
}

#[tracing::instrument(skip(core))]
pub async fn mark_order_cancelled(core: &Core, order_id: &str) -> Result<OrderResponse> {
    let gateway = core.gateway().clone();
    let path = format!("/orders/{order_id}/cancel");
    core.cache()
        .mutate(
            Mutation::update("orders").invalidating([orders_key(), users_key()]),
            move || async move { gateway.post_empty(&path).await },
        )
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_keys_share_the_orders_prefix() {
        let prefix = orders_key();
        assert!(order_key("42").starts_with(&prefix));
        assert!(pending_orders_key().starts_with(&prefix));
        assert!(ongoing_orders_key().starts_with(&prefix));
        // User-scoped lists live under `users`, covered by that prefix
        // in the mutation declarations instead.
        assert!(!user_orders_key("u1").starts_with(&prefix));
        assert!(user_orders_key("u1").starts_with(&users_key()));
    }
}
