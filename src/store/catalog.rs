//! The in-memory data set behind [`super::MemoryStore`].
//!
//! All mutation rules live here as synchronous methods so they can be tested
//! without a runtime.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, ApiResult};
use crate::model::tag::is_hex_color;
use crate::model::{
    AddEntryRequest, CacheEntry, CacheStats, Collection, CollectionId, Contributor,
    CreateCollectionRequest, CreateFriendRequest, CreateSessionRequest, CreateTagRequest,
    EntryId, EpisodeProgress, Friend, FriendId, LibraryEntry, LibraryStats, MediaKind, RankedName,
    SessionId, Tag, TagId, UpdateCollectionRequest, UpdateEntryRequest, UpdateFriendRequest,
    UpdateTagRequest, WatchSession, WatchStatus,
};

const TOP_RANKED: usize = 5;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    next_id: u64,
    pub friends: Vec<Friend>,
    pub tags: Vec<Tag>,
    pub collections: Vec<Collection>,
    pub entries: Vec<LibraryEntry>,
    pub sessions: Vec<WatchSession>,
    pub contributors: Vec<Contributor>,
    #[serde(default)]
    pub cache: Vec<CacheEntry>,
}

fn required(value: &str, what: &str) -> ApiResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::Invalid(format!("{what} is required")));
    }
    Ok(trimmed.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn by_name(a: &str, b: &str) -> std::cmp::Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn rank(counts: HashMap<String, usize>) -> Vec<RankedName> {
    let mut ranked: Vec<RankedName> = counts
        .into_iter()
        .map(|(name, count)| RankedName { name, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| by_name(&a.name, &b.name)));
    ranked.truncate(TOP_RANKED);
    ranked
}

impl Catalog {
    pub(crate) fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    // === Friends ===

    pub fn sorted_friends(&self) -> Vec<Friend> {
        let mut friends = self.friends.clone();
        friends.sort_by(|a, b| by_name(&a.name, &b.name));
        friends
    }

    pub fn friend(&self, id: FriendId) -> ApiResult<&Friend> {
        self.friends
            .iter()
            .find(|f| f.id == id)
            .ok_or_else(|| ApiError::not_found("friend", id.get()))
    }

    fn ensure_unique_friend(&self, name: &str, except: Option<FriendId>) -> ApiResult<()> {
        let taken = self
            .friends
            .iter()
            .any(|f| Some(f.id) != except && f.name.eq_ignore_ascii_case(name));
        if taken {
            return Err(ApiError::Conflict(format!("A friend named \"{name}\" already exists")));
        }
        Ok(())
    }

    pub fn create_friend(&mut self, request: CreateFriendRequest, now: DateTime<Utc>) -> ApiResult<Friend> {
        let name = required(&request.name, "Name")?;
        self.ensure_unique_friend(&name, None)?;
        let friend = Friend {
            id: FriendId::new(self.allocate_id()),
            name,
            image_url: optional(request.image_url),
            created_at: now,
        };
        self.friends.push(friend.clone());
        Ok(friend)
    }

    pub fn update_friend(&mut self, request: UpdateFriendRequest) -> ApiResult<Friend> {
        let name = required(&request.name, "Name")?;
        self.ensure_unique_friend(&name, Some(request.id))?;
        let friend = self
            .friends
            .iter_mut()
            .find(|f| f.id == request.id)
            .ok_or_else(|| ApiError::not_found("friend", request.id.get()))?;
        friend.name = name;
        friend.image_url = optional(request.image_url);
        Ok(friend.clone())
    }

    pub fn delete_friend(&mut self, id: FriendId) -> ApiResult<()> {
        let before = self.friends.len();
        self.friends.retain(|f| f.id != id);
        if self.friends.len() == before {
            return Err(ApiError::not_found("friend", id.get()));
        }
        for session in &mut self.sessions {
            session.friends.retain(|f| *f != id);
        }
        Ok(())
    }

    // === Tags ===

    pub fn sorted_tags(&self) -> Vec<Tag> {
        let mut tags = self.tags.clone();
        tags.sort_by(|a, b| by_name(&a.name, &b.name));
        tags
    }

    fn ensure_unique_tag(&self, name: &str, except: Option<TagId>) -> ApiResult<()> {
        let taken = self
            .tags
            .iter()
            .any(|t| Some(t.id) != except && t.name.eq_ignore_ascii_case(name));
        if taken {
            return Err(ApiError::Conflict(format!("A tag named \"{name}\" already exists")));
        }
        Ok(())
    }

    fn valid_color(color: &str) -> ApiResult<String> {
        let color = color.trim();
        if !is_hex_color(color) {
            return Err(ApiError::Invalid(format!("\"{color}\" is not a #rrggbb color")));
        }
        Ok(color.to_lowercase())
    }

    pub fn create_tag(&mut self, request: CreateTagRequest, now: DateTime<Utc>) -> ApiResult<Tag> {
        let name = required(&request.name, "Name")?;
        let color = Self::valid_color(&request.color)?;
        self.ensure_unique_tag(&name, None)?;
        let tag = Tag {
            id: TagId::new(self.allocate_id()),
            name,
            color,
            description: optional(request.description),
            created_at: now,
        };
        self.tags.push(tag.clone());
        Ok(tag)
    }

    pub fn update_tag(&mut self, request: UpdateTagRequest) -> ApiResult<Tag> {
        let name = required(&request.name, "Name")?;
        let color = Self::valid_color(&request.color)?;
        self.ensure_unique_tag(&name, Some(request.id))?;
        let tag = self
            .tags
            .iter_mut()
            .find(|t| t.id == request.id)
            .ok_or_else(|| ApiError::not_found("tag", request.id.get()))?;
        tag.name = name;
        tag.color = color;
        tag.description = optional(request.description);
        Ok(tag.clone())
    }

    pub fn delete_tag(&mut self, id: TagId) -> ApiResult<()> {
        let before = self.tags.len();
        self.tags.retain(|t| t.id != id);
        if self.tags.len() == before {
            return Err(ApiError::not_found("tag", id.get()));
        }
        for session in &mut self.sessions {
            session.tags.retain(|t| *t != id);
        }
        Ok(())
    }

    // === Collections ===

    pub fn sorted_collections(&self) -> Vec<Collection> {
        let mut collections = self.collections.clone();
        collections.sort_by(|a, b| by_name(&a.name, &b.name));
        collections
    }

    fn ensure_unique_collection(&self, name: &str, except: Option<CollectionId>) -> ApiResult<()> {
        let taken = self
            .collections
            .iter()
            .any(|c| Some(c.id) != except && c.name.eq_ignore_ascii_case(name));
        if taken {
            return Err(ApiError::Conflict(format!(
                "A collection named \"{name}\" already exists"
            )));
        }
        Ok(())
    }

    fn collection_mut(&mut self, id: CollectionId) -> ApiResult<&mut Collection> {
        self.collections
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ApiError::not_found("collection", id.get()))
    }

    pub fn create_collection(
        &mut self,
        request: CreateCollectionRequest,
        now: DateTime<Utc>,
    ) -> ApiResult<Collection> {
        let name = required(&request.name, "Name")?;
        self.ensure_unique_collection(&name, None)?;
        let collection = Collection {
            id: CollectionId::new(self.allocate_id()),
            name,
            description: optional(request.description),
            entries: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.collections.push(collection.clone());
        Ok(collection)
    }

    pub fn update_collection(
        &mut self,
        request: UpdateCollectionRequest,
        now: DateTime<Utc>,
    ) -> ApiResult<Collection> {
        let name = required(&request.name, "Name")?;
        self.ensure_unique_collection(&name, Some(request.id))?;
        let collection = self.collection_mut(request.id)?;
        collection.name = name;
        collection.description = optional(request.description);
        collection.updated_at = now;
        Ok(collection.clone())
    }

    pub fn delete_collection(&mut self, id: CollectionId) -> ApiResult<()> {
        let before = self.collections.len();
        self.collections.retain(|c| c.id != id);
        if self.collections.len() == before {
            return Err(ApiError::not_found("collection", id.get()));
        }
        Ok(())
    }

    pub fn add_to_collection(
        &mut self,
        id: CollectionId,
        entry: EntryId,
        now: DateTime<Utc>,
    ) -> ApiResult<Collection> {
        self.entry(entry)?;
        let collection = self.collection_mut(id)?;
        if !collection.entries.contains(&entry) {
            collection.entries.push(entry);
            collection.updated_at = now;
        }
        Ok(collection.clone())
    }

    pub fn remove_from_collection(
        &mut self,
        id: CollectionId,
        entry: EntryId,
        now: DateTime<Utc>,
    ) -> ApiResult<Collection> {
        let collection = self.collection_mut(id)?;
        collection.entries.retain(|e| *e != entry);
        collection.updated_at = now;
        Ok(collection.clone())
    }

    // === Library ===

    pub fn sorted_entries(&self) -> Vec<LibraryEntry> {
        let mut entries = self.entries.clone();
        entries.sort_by(|a, b| by_name(&a.title, &b.title).then(a.year.cmp(&b.year)));
        entries
    }

    pub fn entry(&self, id: EntryId) -> ApiResult<&LibraryEntry> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| ApiError::not_found("entry", id.get()))
    }

    fn entry_mut(&mut self, id: EntryId) -> ApiResult<&mut LibraryEntry> {
        self.entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| ApiError::not_found("entry", id.get()))
    }

    pub fn add_entry(&mut self, request: AddEntryRequest, now: DateTime<Utc>) -> ApiResult<LibraryEntry> {
        let title = required(&request.title, "Title")?;
        if let Some(tmdb_id) = request.tmdb_id {
            if self.entries.iter().any(|e| e.tmdb_id == Some(tmdb_id)) {
                return Err(ApiError::Conflict(format!("\"{title}\" is already tracked")));
            }
        }
        let entry = LibraryEntry {
            id: EntryId::new(self.allocate_id()),
            tmdb_id: request.tmdb_id,
            kind: request.kind,
            title,
            year: request.year,
            overview: None,
            status: WatchStatus::NotStarted,
            rating: None,
            is_favorite: false,
            progress: EpisodeProgress {
                watched: 0,
                total: request.total_episodes,
            },
            added_at: now,
        };
        self.entries.push(entry.clone());
        Ok(entry)
    }

    pub fn update_entry(&mut self, request: UpdateEntryRequest) -> ApiResult<LibraryEntry> {
        let title = required(&request.title, "Title")?;
        let entry = self.entry_mut(request.id)?;
        entry.title = title;
        entry.kind = request.kind;
        entry.year = request.year;
        entry.progress.total = request.total_episodes;
        Ok(entry.clone())
    }

    pub fn set_status(&mut self, id: EntryId, status: WatchStatus) -> ApiResult<LibraryEntry> {
        let entry = self.entry_mut(id)?;
        entry.status = status;
        Ok(entry.clone())
    }

    pub fn set_rating(&mut self, id: EntryId, rating: Option<u8>) -> ApiResult<LibraryEntry> {
        if let Some(value) = rating {
            if !(1..=10).contains(&value) {
                return Err(ApiError::Invalid(format!("Rating must be between 1 and 10, got {value}")));
            }
        }
        let entry = self.entry_mut(id)?;
        entry.rating = rating;
        Ok(entry.clone())
    }

    pub fn toggle_favorite(&mut self, id: EntryId) -> ApiResult<LibraryEntry> {
        let entry = self.entry_mut(id)?;
        entry.is_favorite = !entry.is_favorite;
        Ok(entry.clone())
    }

    pub fn record_episode(&mut self, id: EntryId) -> ApiResult<LibraryEntry> {
        let entry = self.entry_mut(id)?;
        if entry.kind != MediaKind::Series {
            return Err(ApiError::Invalid(format!("\"{}\" is not a series", entry.title)));
        }
        if entry.progress.total.is_some_and(|total| entry.progress.watched >= total) {
            return Err(ApiError::Invalid(format!(
                "Every episode of \"{}\" is already watched",
                entry.title
            )));
        }
        entry.progress.watched += 1;
        if let Some(status) = entry.recalculated_status() {
            entry.status = status;
        } else if entry.progress.total.is_none() && entry.status == WatchStatus::NotStarted {
            entry.status = WatchStatus::InProgress;
        }
        Ok(entry.clone())
    }

    pub fn untrack_entry(&mut self, id: EntryId, now: DateTime<Utc>) -> ApiResult<()> {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        if self.entries.len() == before {
            return Err(ApiError::not_found("entry", id.get()));
        }
        self.sessions.retain(|s| s.entry_id != id);
        for collection in &mut self.collections {
            if collection.entries.contains(&id) {
                collection.entries.retain(|e| *e != id);
                collection.updated_at = now;
            }
        }
        Ok(())
    }

    // === Sessions ===

    pub fn sessions_for(&self, entry: EntryId) -> Vec<WatchSession> {
        let mut sessions: Vec<WatchSession> = self
            .sessions
            .iter()
            .filter(|s| s.entry_id == entry)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.watched_on.cmp(&a.watched_on).then(b.id.cmp(&a.id)));
        sessions
    }

    pub fn create_session(&mut self, request: CreateSessionRequest) -> ApiResult<WatchSession> {
        self.entry(request.entry_id)?;
        for friend in &request.friends {
            self.friend(*friend)?;
        }
        for tag in &request.tags {
            if !self.tags.iter().any(|t| t.id == *tag) {
                return Err(ApiError::not_found("tag", tag.get()));
            }
        }
        let session = WatchSession {
            id: SessionId::new(self.allocate_id()),
            entry_id: request.entry_id,
            watched_on: request.watched_on,
            friends: request.friends,
            tags: request.tags,
            notes: optional(request.notes),
        };
        self.sessions.push(session.clone());
        Ok(session)
    }

    pub fn delete_session(&mut self, id: SessionId) -> ApiResult<()> {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.id != id);
        if self.sessions.len() == before {
            return Err(ApiError::not_found("session", id.get()));
        }
        Ok(())
    }

    // === Contributors ===

    pub fn ranked_contributors(&self) -> Vec<Contributor> {
        let mut contributors = self.contributors.clone();
        contributors.sort_by(|a, b| b.credits.cmp(&a.credits).then_with(|| by_name(&a.name, &b.name)));
        contributors
    }

    // === Statistics ===

    pub fn stats(&self) -> LibraryStats {
        let count = |status: WatchStatus| self.entries.iter().filter(|e| e.status == status).count();
        let ratings: Vec<f32> = self
            .entries
            .iter()
            .filter_map(|e| e.rating.map(f32::from))
            .collect();

        let mut friend_counts: HashMap<String, usize> = HashMap::new();
        let mut tag_counts: HashMap<String, usize> = HashMap::new();
        for session in &self.sessions {
            for id in &session.friends {
                if let Some(friend) = self.friends.iter().find(|f| f.id == *id) {
                    *friend_counts.entry(friend.name.clone()).or_default() += 1;
                }
            }
            for id in &session.tags {
                if let Some(tag) = self.tags.iter().find(|t| t.id == *id) {
                    *tag_counts.entry(tag.name.clone()).or_default() += 1;
                }
            }
        }

        #[allow(clippy::cast_precision_loss)]
        let average_rating = (!ratings.is_empty())
            .then(|| ratings.iter().sum::<f32>() / ratings.len() as f32);

        LibraryStats {
            total_entries: self.entries.len(),
            movies: self.entries.iter().filter(|e| e.kind == MediaKind::Movie).count(),
            series: self.entries.iter().filter(|e| e.kind == MediaKind::Series).count(),
            completed: count(WatchStatus::Completed),
            in_progress: count(WatchStatus::InProgress),
            not_started: count(WatchStatus::NotStarted),
            favorites: self.entries.iter().filter(|e| e.is_favorite).count(),
            total_sessions: self.sessions.len(),
            episodes_watched: self.entries.iter().map(|e| e.progress.watched).sum(),
            average_rating,
            top_friends: rank(friend_counts),
            top_tags: rank(tag_counts),
        }
    }

    // === Maintenance ===

    pub fn cache_stats(&self, now: DateTime<Utc>) -> CacheStats {
        CacheStats {
            entries: self.cache.len(),
            expired: self.cache.iter().filter(|c| c.is_expired(now)).count(),
        }
    }

    pub fn cached(&self, key: &str, now: DateTime<Utc>) -> Option<CacheEntry> {
        self.cache
            .iter()
            .find(|c| c.key == key && !c.is_expired(now))
            .cloned()
    }

    pub fn put_cached(&mut self, key: &str, payload: String, ttl: Duration, now: DateTime<Utc>) {
        self.cache.retain(|c| c.key != key);
        self.cache.push(CacheEntry {
            key: key.to_string(),
            payload,
            fetched_at: now,
            expires_at: now + ttl,
        });
    }

    pub fn clear_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.cache.len();
        self.cache.retain(|c| !c.is_expired(now));
        before - self.cache.len()
    }

    pub fn recalculate_series(&mut self) -> usize {
        let mut changed = 0;
        for entry in &mut self.entries {
            if let Some(status) = entry.recalculated_status() {
                entry.status = status;
                changed += 1;
            }
        }
        changed
    }
}
