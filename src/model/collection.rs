use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{CollectionId, EntryId};

/// A named, ordered group of library entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: CollectionId,
    pub name: String,
    pub description: Option<String>,
    pub entries: Vec<EntryId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCollectionRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCollectionRequest {
    pub id: CollectionId,
    pub name: String,
    pub description: Option<String>,
}
