//! Local-first implementation of every [`crate::api`] trait.
//!
//! [`MemoryStore`] keeps the whole catalogue behind one async lock and, when a
//! snapshot path is configured, writes it back to disk after each mutation.

mod catalog;
mod seed;
mod snapshot;

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

pub use catalog::Catalog;
pub use seed::demo_catalog;

use crate::api::{
    ApiResult, CollectionApi, ContributorApi, FriendApi, LibraryApi, MaintenanceApi,
    MetadataCache, SessionApi, StatsApi, TagApi,
};
use crate::model::{
    AddEntryRequest, CacheEntry, CacheStats, Collection, CollectionId, Contributor,
    CreateCollectionRequest, CreateFriendRequest, CreateSessionRequest, CreateTagRequest, EntryId,
    Friend, FriendId, LibraryEntry, LibraryStats, SessionId, Tag, TagId, UpdateCollectionRequest,
    UpdateEntryRequest, UpdateFriendRequest, UpdateTagRequest, WatchSession, WatchStatus,
};

pub struct MemoryStore {
    catalog: RwLock<Catalog>,
    snapshot: Option<PathBuf>,
}

impl MemoryStore {
    /// A store that lives only as long as the process.
    pub fn in_memory(catalog: Catalog) -> Self {
        Self {
            catalog: RwLock::new(catalog),
            snapshot: None,
        }
    }

    /// Opens the snapshot at `path`, creating an empty catalogue when it does
    /// not exist yet.
    pub async fn open(path: PathBuf) -> ApiResult<Self> {
        let catalog = snapshot::load(&path).await?;
        info!(
            "Opened library at {:?} ({} entries)",
            path,
            catalog.entries.len()
        );
        Ok(Self {
            catalog: RwLock::new(catalog),
            snapshot: Some(path),
        })
    }

    /// Replaces the catalogue with demo data when it is empty.
    pub async fn seed_if_empty(&self) -> ApiResult<bool> {
        let mut catalog = self.catalog.write().await;
        if !catalog.entries.is_empty() || !catalog.friends.is_empty() {
            return Ok(false);
        }
        let seeded = demo_catalog(Utc::now())?;
        self.persist(&seeded).await?;
        *catalog = seeded;
        info!("Seeded demo library");
        Ok(true)
    }

    async fn read<T>(&self, f: impl FnOnce(&Catalog) -> T) -> T {
        let catalog = self.catalog.read().await;
        f(&*catalog)
    }

    /// Applies a mutation to a copy of the catalogue and swaps it in once the
    /// snapshot is written. The write lock is held throughout, so snapshots
    /// land in mutation order and a failed save leaves memory untouched.
    async fn write<T>(&self, f: impl FnOnce(&mut Catalog) -> ApiResult<T>) -> ApiResult<T> {
        let mut catalog = self.catalog.write().await;
        let mut next = catalog.clone();
        let value = f(&mut next)?;
        self.persist(&next).await?;
        *catalog = next;
        Ok(value)
    }

    async fn persist(&self, catalog: &Catalog) -> ApiResult<()> {
        match &self.snapshot {
            Some(path) => snapshot::save(path, catalog).await,
            None => Ok(()),
        }
    }
}

#[async_trait]
impl FriendApi for MemoryStore {
    async fn list_friends(&self) -> ApiResult<Vec<Friend>> {
        Ok(self.read(Catalog::sorted_friends).await)
    }

    async fn get_friend(&self, id: FriendId) -> ApiResult<Friend> {
        self.read(|c| c.friend(id).cloned()).await
    }

    async fn create_friend(&self, request: CreateFriendRequest) -> ApiResult<Friend> {
        self.write(|c| c.create_friend(request, Utc::now())).await
    }

    async fn update_friend(&self, request: UpdateFriendRequest) -> ApiResult<Friend> {
        self.write(|c| c.update_friend(request)).await
    }

    async fn delete_friend(&self, id: FriendId) -> ApiResult<()> {
        self.write(|c| c.delete_friend(id)).await
    }
}

#[async_trait]
impl TagApi for MemoryStore {
    async fn list_tags(&self) -> ApiResult<Vec<Tag>> {
        Ok(self.read(Catalog::sorted_tags).await)
    }

    async fn create_tag(&self, request: CreateTagRequest) -> ApiResult<Tag> {
        self.write(|c| c.create_tag(request, Utc::now())).await
    }

    async fn update_tag(&self, request: UpdateTagRequest) -> ApiResult<Tag> {
        self.write(|c| c.update_tag(request)).await
    }

    async fn delete_tag(&self, id: TagId) -> ApiResult<()> {
        self.write(|c| c.delete_tag(id)).await
    }
}

#[async_trait]
impl CollectionApi for MemoryStore {
    async fn list_collections(&self) -> ApiResult<Vec<Collection>> {
        Ok(self.read(Catalog::sorted_collections).await)
    }

    async fn create_collection(&self, request: CreateCollectionRequest) -> ApiResult<Collection> {
        self.write(|c| c.create_collection(request, Utc::now())).await
    }

    async fn update_collection(&self, request: UpdateCollectionRequest) -> ApiResult<Collection> {
        self.write(|c| c.update_collection(request, Utc::now())).await
    }

    async fn delete_collection(&self, id: CollectionId) -> ApiResult<()> {
        self.write(|c| c.delete_collection(id)).await
    }

    async fn add_to_collection(&self, id: CollectionId, entry: EntryId) -> ApiResult<Collection> {
        self.write(|c| c.add_to_collection(id, entry, Utc::now())).await
    }

    async fn remove_from_collection(
        &self,
        id: CollectionId,
        entry: EntryId,
    ) -> ApiResult<Collection> {
        self.write(|c| c.remove_from_collection(id, entry, Utc::now()))
            .await
    }
}

#[async_trait]
impl LibraryApi for MemoryStore {
    async fn list_entries(&self) -> ApiResult<Vec<LibraryEntry>> {
        Ok(self.read(Catalog::sorted_entries).await)
    }

    async fn get_entry(&self, id: EntryId) -> ApiResult<LibraryEntry> {
        self.read(|c| c.entry(id).cloned()).await
    }

    async fn add_entry(&self, request: AddEntryRequest) -> ApiResult<LibraryEntry> {
        self.write(|c| c.add_entry(request, Utc::now())).await
    }

    async fn update_entry(&self, request: UpdateEntryRequest) -> ApiResult<LibraryEntry> {
        self.write(|c| c.update_entry(request)).await
    }

    async fn set_status(&self, id: EntryId, status: WatchStatus) -> ApiResult<LibraryEntry> {
        self.write(|c| c.set_status(id, status)).await
    }

    async fn set_rating(&self, id: EntryId, rating: Option<u8>) -> ApiResult<LibraryEntry> {
        self.write(|c| c.set_rating(id, rating)).await
    }

    async fn toggle_favorite(&self, id: EntryId) -> ApiResult<LibraryEntry> {
        self.write(|c| c.toggle_favorite(id)).await
    }

    async fn record_episode(&self, id: EntryId) -> ApiResult<LibraryEntry> {
        self.write(|c| c.record_episode(id)).await
    }

    async fn untrack_entry(&self, id: EntryId) -> ApiResult<()> {
        self.write(|c| c.untrack_entry(id, Utc::now())).await
    }
}

#[async_trait]
impl SessionApi for MemoryStore {
    async fn list_sessions(&self, entry: EntryId) -> ApiResult<Vec<WatchSession>> {
        Ok(self.read(|c| c.sessions_for(entry)).await)
    }

    async fn create_session(&self, request: CreateSessionRequest) -> ApiResult<WatchSession> {
        self.write(|c| c.create_session(request)).await
    }

    async fn delete_session(&self, id: SessionId) -> ApiResult<()> {
        self.write(|c| c.delete_session(id)).await
    }
}

#[async_trait]
impl ContributorApi for MemoryStore {
    async fn list_contributors(&self) -> ApiResult<Vec<Contributor>> {
        Ok(self.read(Catalog::ranked_contributors).await)
    }
}

#[async_trait]
impl StatsApi for MemoryStore {
    async fn library_stats(&self) -> ApiResult<LibraryStats> {
        Ok(self.read(Catalog::stats).await)
    }
}

#[async_trait]
impl MaintenanceApi for MemoryStore {
    async fn cache_stats(&self) -> ApiResult<CacheStats> {
        Ok(self.read(|c| c.cache_stats(Utc::now())).await)
    }

    async fn clear_expired_cache(&self) -> ApiResult<usize> {
        let removed = self.write(|c| Ok(c.clear_expired(Utc::now()))).await?;
        debug!("Cleared {removed} expired cache entries");
        Ok(removed)
    }

    async fn recalculate_series_watch_status(&self) -> ApiResult<usize> {
        let changed = self.write(|c| Ok(c.recalculate_series())).await?;
        debug!("Recalculated series status, {changed} changed");
        Ok(changed)
    }
}

#[async_trait]
impl MetadataCache for MemoryStore {
    async fn get_cached(&self, key: &str) -> ApiResult<Option<CacheEntry>> {
        Ok(self.read(|c| c.cached(key, Utc::now())).await)
    }

    async fn put_cached(&self, key: &str, payload: String, ttl: Duration) -> ApiResult<()> {
        self.write(|c| {
            c.put_cached(key, payload, ttl, Utc::now());
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mutations_are_written_to_the_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.json");

        let store = MemoryStore::open(path.clone()).await.unwrap();
        store
            .create_friend(CreateFriendRequest {
                name: "Alice".to_string(),
                image_url: None,
            })
            .await
            .unwrap();

        let reopened = MemoryStore::open(path).await.unwrap();
        let friends = reopened.list_friends().await.unwrap();
        assert_eq!(friends.len(), 1);
        assert_eq!(friends[0].name, "Alice");
    }

    #[tokio::test]
    async fn failed_mutations_do_not_touch_the_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.json");

        let store = MemoryStore::open(path.clone()).await.unwrap();
        let result = store
            .create_friend(CreateFriendRequest {
                name: "   ".to_string(),
                image_url: None,
            })
            .await;
        assert!(result.is_err());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn failed_saves_leave_the_catalogue_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let parent = dir.path().join("nested");
        let path = parent.join("library.json");
        let store = MemoryStore::open(path.clone()).await.unwrap();

        // A plain file where the snapshot directory should go makes every save fail.
        std::fs::write(&parent, b"").unwrap();
        let alice = || CreateFriendRequest {
            name: "Alice".to_string(),
            image_url: None,
        };
        assert!(store.create_friend(alice()).await.is_err());
        assert!(store.list_friends().await.unwrap().is_empty());
        assert!(store.seed_if_empty().await.is_err());
        assert!(store.list_entries().await.unwrap().is_empty());

        std::fs::remove_file(&parent).unwrap();
        let friend = store.create_friend(alice()).await.unwrap();
        assert_eq!(friend.name, "Alice");
        assert_eq!(store.list_friends().await.unwrap().len(), 1);
        assert!(path.exists());
    }

    #[tokio::test]
    async fn seeding_only_happens_once() {
        let store = MemoryStore::in_memory(Catalog::default());
        assert!(store.seed_if_empty().await.unwrap());
        assert!(!store.seed_if_empty().await.unwrap());
        assert!(!store.list_entries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn metadata_cache_respects_ttl() {
        let store = MemoryStore::in_memory(Catalog::default());
        store
            .put_cached("movie/1", "{}".to_string(), Duration::hours(1))
            .await
            .unwrap();
        store
            .put_cached("movie/2", "{}".to_string(), Duration::seconds(-5))
            .await
            .unwrap();

        assert!(store.get_cached("movie/1").await.unwrap().is_some());
        assert!(store.get_cached("movie/2").await.unwrap().is_none());
        assert_eq!(store.clear_expired_cache().await.unwrap(), 1);
        assert_eq!(store.cache_stats().await.unwrap().entries, 1);
    }
}
