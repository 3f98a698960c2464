//! # Notification Feed Endpoints
//!
//! The persisted notification list shown in the notification dropdown,
//! distinct from the live push events the router handles.

use shared::dto::notification::NotificationResponse;

use crate::cache::{Mutation, ResourceKey};
use crate::core::error::Result;
use crate::core::Core;

pub fn notifications_key() -> ResourceKey {
    ResourceKey::from(["notifications"])
}

pub async fn get_notifications(core: &Core, user_id: &str) -> Result<Vec<NotificationResponse>> {
    let gateway = core.gateway();
    let path = format!("/users/{user_id}/notifications");
    core.cache()
        .fetch(notifications_key(), move || async move {
            gateway.get(&path).await
        })
        .await
}

pub async fn mark_notification_read(core: &Core, notification_id: &str) -> Result<()> {
    let gateway = core.gateway().clone();
    let path = format!("/notifications/{notification_id}/read");
    core.cache()
        .mutate(
            Mutation::update("notifications").invalidating([notifications_key()]),
            move || async move { gateway.post_unit(&path).await },
        )
        .await
}
