use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{EntryId, TmdbId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    Movie,
    Series,
}

impl MediaKind {
    pub const fn toggled(self) -> Self {
        match self {
            Self::Movie => Self::Series,
            Self::Series => Self::Movie,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Movie => write!(f, "Movie"),
            Self::Series => write!(f, "Series"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WatchStatus {
    NotStarted,
    InProgress,
    Completed,
    OnHold,
    Abandoned,
}

impl WatchStatus {
    pub const ALL: [Self; 5] = [
        Self::NotStarted,
        Self::InProgress,
        Self::Completed,
        Self::OnHold,
        Self::Abandoned,
    ];

    /// The status that follows this one when cycling through them.
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    /// Statuses the user sets by hand and that recalculation must not touch.
    pub const fn is_manual(self) -> bool {
        matches!(self, Self::OnHold | Self::Abandoned)
    }
}

impl fmt::Display for WatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotStarted => "Not started",
            Self::InProgress => "In progress",
            Self::Completed => "Completed",
            Self::OnHold => "On hold",
            Self::Abandoned => "Abandoned",
        };
        write!(f, "{label}")
    }
}

/// Episode counts for a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EpisodeProgress {
    pub watched: u32,
    /// Unknown until the metadata provider reports it.
    pub total: Option<u32>,
}

impl EpisodeProgress {
    /// The status implied by the episode counts alone, when it can be derived.
    pub const fn implied_status(self) -> Option<WatchStatus> {
        match self.total {
            None | Some(0) => None,
            Some(total) if self.watched >= total => Some(WatchStatus::Completed),
            Some(_) if self.watched == 0 => Some(WatchStatus::NotStarted),
            Some(_) => Some(WatchStatus::InProgress),
        }
    }
}

/// A movie or series the user tracks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryEntry {
    pub id: EntryId,
    pub tmdb_id: Option<TmdbId>,
    pub kind: MediaKind,
    pub title: String,
    pub year: Option<i32>,
    pub overview: Option<String>,
    pub status: WatchStatus,
    /// 1 to 10.
    pub rating: Option<u8>,
    pub is_favorite: bool,
    /// Only meaningful for series.
    pub progress: EpisodeProgress,
    pub added_at: DateTime<Utc>,
}

impl LibraryEntry {
    /// Status after applying the series recalculation rule, or `None` when the
    /// current status already holds.
    pub fn recalculated_status(&self) -> Option<WatchStatus> {
        if self.kind != MediaKind::Series || self.status.is_manual() {
            return None;
        }
        self.progress
            .implied_status()
            .filter(|implied| *implied != self.status)
    }

    pub fn display_title(&self) -> String {
        self.year.map_or_else(
            || self.title.clone(),
            |year| format!("{} ({year})", self.title),
        )
    }
}

impl fmt::Display for LibraryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddEntryRequest {
    pub kind: MediaKind,
    pub title: String,
    pub year: Option<i32>,
    pub tmdb_id: Option<TmdbId>,
    pub total_episodes: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateEntryRequest {
    pub id: EntryId,
    pub kind: MediaKind,
    pub title: String,
    pub year: Option<i32>,
    pub total_episodes: Option<u32>,
}
