use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{EntryId, FriendId, SessionId, TagId};

/// One sitting in which the user watched (part of) a library entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchSession {
    pub id: SessionId,
    pub entry_id: EntryId,
    pub watched_on: NaiveDate,
    pub friends: Vec<FriendId>,
    pub tags: Vec<TagId>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSessionRequest {
    pub entry_id: EntryId,
    pub watched_on: NaiveDate,
    pub friends: Vec<FriendId>,
    pub tags: Vec<TagId>,
    pub notes: Option<String>,
}
