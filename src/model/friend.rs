use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::FriendId;

/// Someone the user watches things with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friend {
    pub id: FriendId,
    pub name: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateFriendRequest {
    pub name: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateFriendRequest {
    pub id: FriendId,
    pub name: String,
    pub image_url: Option<String>,
}
