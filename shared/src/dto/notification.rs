use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    Order,
    Route,
    Dispatch,
    System,
}

/// A persisted notification record, as listed in the notification feed.
/// `ref_id` points at the resource the notification is about.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: String,
    pub content: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub ref_id: String,
    pub is_read: bool,
    pub created_at: String,
    pub updated_at: String,
}
