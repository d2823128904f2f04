/// A name with an occurrence count, used for "top friends" style rankings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedName {
    pub name: String,
    pub count: usize,
}

/// Aggregate numbers shown on the statistics page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LibraryStats {
    pub total_entries: usize,
    pub movies: usize,
    pub series: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub not_started: usize,
    pub favorites: usize,
    pub total_sessions: usize,
    pub episodes_watched: u32,
    pub average_rating: Option<f32>,
    pub top_friends: Vec<RankedName>,
    pub top_tags: Vec<RankedName>,
}
