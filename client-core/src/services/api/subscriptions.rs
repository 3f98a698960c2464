//! # Pickup Subscription Endpoints

use shared::dto::subscription::{SubscriptionCreateRequest, SubscriptionResponse};

use crate::cache::{Mutation, ResourceKey};
use crate::core::error::Result;
use crate::core::Core;
use crate::services::api::users::users_key;

pub fn subscriptions_key() -> ResourceKey {
    ResourceKey::from(["subscriptions"])
}

pub fn user_subscription_key(user_id: &str) -> ResourceKey {
    ResourceKey::from(["users", user_id, "subscription"])
}

pub async fn get_subscriptions(core: &Core) -> Result<Vec<SubscriptionResponse>> {
    let gateway = core.gateway();
    core.cache()
        .fetch(subscriptions_key(), move || async move {
            gateway.get("/subscriptions").await
        })
        .await
}

pub async fn get_subscription_by_user(
    core: &Core,
    user_id: &str,
) -> Result<SubscriptionResponse> {
    let gateway = core.gateway();
    let path = format!("/subscriptions/users/{user_id}");
    core.cache()
        .fetch(user_subscription_key(user_id), move || async move {
            gateway.get(&path).await
        })
        .await
}

pub async fn create_subscription(
    core: &Core,
    request: SubscriptionCreateRequest,
) -> Result<SubscriptionResponse> {
    let gateway = core.gateway().clone();
    core.cache()
        .mutate(
            Mutation::create("subscriptions").invalidating([subscriptions_key(), users_key()]),
            move || async move { gateway.post("/subscriptions", &request).await },
        )
        .await
}
