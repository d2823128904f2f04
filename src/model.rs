//! Domain models for watchlog.
//!
//! Entities are plain value records owned by the persistence layer. Every
//! entity is keyed by its own identifier newtype so a [`FriendId`] can never be
//! passed where a [`TagId`] is expected.

pub mod cache;
pub mod collection;
pub mod contributor;
pub mod friend;
pub mod ids;
pub mod library;
pub mod session;
pub mod stats;
pub mod tag;

pub use cache::{CacheEntry, CacheStats};
pub use collection::{Collection, CreateCollectionRequest, UpdateCollectionRequest};
pub use contributor::Contributor;
pub use friend::{CreateFriendRequest, Friend, UpdateFriendRequest};
pub use ids::{CollectionId, ContributorId, EntryId, FriendId, SessionId, TagId, TmdbId};
pub use library::{
    AddEntryRequest, EpisodeProgress, LibraryEntry, MediaKind, UpdateEntryRequest, WatchStatus,
};
pub use session::{CreateSessionRequest, WatchSession};
pub use stats::{LibraryStats, RankedName};
pub use tag::{CreateTagRequest, DEFAULT_TAG_COLOR, Tag, UpdateTagRequest, is_hex_color};
