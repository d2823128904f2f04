use serde::{Deserialize, Serialize};

use crate::model::{ContributorId, TmdbId};

/// A cast or crew member credited on at least one library entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    pub id: ContributorId,
    pub tmdb_id: Option<TmdbId>,
    pub name: String,
    /// "Acting", "Directing", "Writing", ...
    pub department: String,
    /// Number of library entries this person is credited on.
    pub credits: u32,
}
