//! Persistence collaborator interfaces.
//!
//! Screens depend on these traits only, never on a concrete store. Each trait
//! groups the operations of one entity so a screen can be handed exactly the
//! capabilities it uses. [`Services`] bundles one handle per trait and is built
//! once at startup.

mod error;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;

pub use error::{ApiError, ApiResult};

use crate::model::{
    AddEntryRequest, CacheEntry, CacheStats, Collection, CollectionId, Contributor,
    CreateCollectionRequest, CreateFriendRequest, CreateSessionRequest, CreateTagRequest, EntryId,
    Friend, FriendId, LibraryEntry, LibraryStats, SessionId, Tag, TagId, UpdateCollectionRequest,
    UpdateEntryRequest, UpdateFriendRequest, UpdateTagRequest, WatchSession, WatchStatus,
};

#[async_trait]
pub trait FriendApi: Send + Sync {
    async fn list_friends(&self) -> ApiResult<Vec<Friend>>;
    async fn get_friend(&self, id: FriendId) -> ApiResult<Friend>;
    async fn create_friend(&self, request: CreateFriendRequest) -> ApiResult<Friend>;
    async fn update_friend(&self, request: UpdateFriendRequest) -> ApiResult<Friend>;
    async fn delete_friend(&self, id: FriendId) -> ApiResult<()>;
}

#[async_trait]
pub trait TagApi: Send + Sync {
    async fn list_tags(&self) -> ApiResult<Vec<Tag>>;
    async fn create_tag(&self, request: CreateTagRequest) -> ApiResult<Tag>;
    async fn update_tag(&self, request: UpdateTagRequest) -> ApiResult<Tag>;
    async fn delete_tag(&self, id: TagId) -> ApiResult<()>;
}

#[async_trait]
pub trait CollectionApi: Send + Sync {
    async fn list_collections(&self) -> ApiResult<Vec<Collection>>;
    async fn create_collection(&self, request: CreateCollectionRequest) -> ApiResult<Collection>;
    async fn update_collection(&self, request: UpdateCollectionRequest) -> ApiResult<Collection>;
    async fn delete_collection(&self, id: CollectionId) -> ApiResult<()>;
    async fn add_to_collection(&self, id: CollectionId, entry: EntryId) -> ApiResult<Collection>;
    async fn remove_from_collection(
        &self,
        id: CollectionId,
        entry: EntryId,
    ) -> ApiResult<Collection>;
}

#[async_trait]
pub trait LibraryApi: Send + Sync {
    async fn list_entries(&self) -> ApiResult<Vec<LibraryEntry>>;
    async fn get_entry(&self, id: EntryId) -> ApiResult<LibraryEntry>;
    async fn add_entry(&self, request: AddEntryRequest) -> ApiResult<LibraryEntry>;
    async fn update_entry(&self, request: UpdateEntryRequest) -> ApiResult<LibraryEntry>;
    async fn set_status(&self, id: EntryId, status: WatchStatus) -> ApiResult<LibraryEntry>;
    /// `None` clears the rating.
    async fn set_rating(&self, id: EntryId, rating: Option<u8>) -> ApiResult<LibraryEntry>;
    async fn toggle_favorite(&self, id: EntryId) -> ApiResult<LibraryEntry>;
    /// Marks one more episode of a series as watched.
    async fn record_episode(&self, id: EntryId) -> ApiResult<LibraryEntry>;
    /// Removes the entry together with its sessions and collection memberships.
    async fn untrack_entry(&self, id: EntryId) -> ApiResult<()>;
}

#[async_trait]
pub trait SessionApi: Send + Sync {
    async fn list_sessions(&self, entry: EntryId) -> ApiResult<Vec<WatchSession>>;
    async fn create_session(&self, request: CreateSessionRequest) -> ApiResult<WatchSession>;
    async fn delete_session(&self, id: SessionId) -> ApiResult<()>;
}

#[async_trait]
pub trait ContributorApi: Send + Sync {
    async fn list_contributors(&self) -> ApiResult<Vec<Contributor>>;
}

#[async_trait]
pub trait StatsApi: Send + Sync {
    async fn library_stats(&self) -> ApiResult<LibraryStats>;
}

/// Housekeeping operations surfaced on the maintenance page.
#[async_trait]
pub trait MaintenanceApi: Send + Sync {
    async fn cache_stats(&self) -> ApiResult<CacheStats>;
    /// Drops expired metadata cache entries, returning how many were removed.
    async fn clear_expired_cache(&self) -> ApiResult<usize>;
    /// Re-derives the status of every series from its episode counts,
    /// returning how many entries changed.
    async fn recalculate_series_watch_status(&self) -> ApiResult<usize>;
}

/// TTL cache for metadata provider responses.
#[async_trait]
pub trait MetadataCache: Send + Sync {
    /// Returns the cached entry unless it is missing or expired.
    async fn get_cached(&self, key: &str) -> ApiResult<Option<CacheEntry>>;
    async fn put_cached(&self, key: &str, payload: String, ttl: Duration) -> ApiResult<()>;
}

/// Every collaborator handle the application needs, built once in `main`.
#[derive(Clone)]
pub struct Services {
    pub friends: Arc<dyn FriendApi>,
    pub tags: Arc<dyn TagApi>,
    pub collections: Arc<dyn CollectionApi>,
    pub library: Arc<dyn LibraryApi>,
    pub sessions: Arc<dyn SessionApi>,
    pub contributors: Arc<dyn ContributorApi>,
    pub stats: Arc<dyn StatsApi>,
    pub maintenance: Arc<dyn MaintenanceApi>,
    pub cache: Arc<dyn MetadataCache>,
}

impl Services {
    /// Uses one backend for every capability.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: FriendApi
            + TagApi
            + CollectionApi
            + LibraryApi
            + SessionApi
            + ContributorApi
            + StatsApi
            + MaintenanceApi
            + MetadataCache
            + 'static,
    {
        Self {
            friends: backend.clone(),
            tags: backend.clone(),
            collections: backend.clone(),
            library: backend.clone(),
            sessions: backend.clone(),
            contributors: backend.clone(),
            stats: backend.clone(),
            maintenance: backend.clone(),
            cache: backend,
        }
    }
}
