//! Demo data for first runs.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::api::ApiResult;
use crate::model::{
    AddEntryRequest, Contributor, ContributorId, CreateCollectionRequest, CreateFriendRequest,
    CreateSessionRequest, CreateTagRequest, MediaKind, TmdbId, WatchStatus,
};
use crate::store::Catalog;

struct Title {
    kind: MediaKind,
    title: &'static str,
    year: i32,
    tmdb: u64,
    episodes: Option<u32>,
}

const TITLES: &[Title] = &[
    Title { kind: MediaKind::Movie, title: "Heat", year: 1995, tmdb: 949, episodes: None },
    Title { kind: MediaKind::Movie, title: "Arrival", year: 2016, tmdb: 329_865, episodes: None },
    Title { kind: MediaKind::Movie, title: "Spirited Away", year: 2001, tmdb: 129, episodes: None },
    Title { kind: MediaKind::Series, title: "Dark", year: 2017, tmdb: 70_523, episodes: Some(26) },
    Title { kind: MediaKind::Series, title: "Chernobyl", year: 2019, tmdb: 87_108, episodes: Some(5) },
    Title { kind: MediaKind::Series, title: "The Bear", year: 2022, tmdb: 136_315, episodes: None },
];

const CONTRIBUTORS: &[(&str, &str, u32)] = &[
    ("Denis Villeneuve", "Directing", 1),
    ("Amy Adams", "Acting", 1),
    ("Michael Mann", "Directing", 1),
    ("Hayao Miyazaki", "Directing", 1),
    ("Jared Harris", "Acting", 1),
    ("Baran bo Odar", "Directing", 1),
];

/// Builds a small catalogue exercising every page.
pub fn demo_catalog(now: DateTime<Utc>) -> ApiResult<Catalog> {
    let mut catalog = Catalog::default();
    seed(&mut catalog, now)?;
    Ok(catalog)
}

fn seed(catalog: &mut Catalog, now: DateTime<Utc>) -> ApiResult<()> {
    let alice = catalog.create_friend(
        CreateFriendRequest { name: "Alice".to_string(), image_url: None },
        now,
    )?;
    let bob = catalog.create_friend(
        CreateFriendRequest { name: "Bob".to_string(), image_url: None },
        now,
    )?;

    let cinema = catalog.create_tag(
        CreateTagRequest {
            name: "cinema".to_string(),
            color: "#f9e2af".to_string(),
            description: Some("Watched on the big screen".to_string()),
        },
        now,
    )?;
    let rewatch = catalog.create_tag(
        CreateTagRequest { name: "rewatch".to_string(), color: "#a6e3a1".to_string(), description: None },
        now,
    )?;

    let mut ids = Vec::new();
    for title in TITLES {
        let entry = catalog.add_entry(
            AddEntryRequest {
                kind: title.kind,
                title: title.title.to_string(),
                year: Some(title.year),
                tmdb_id: Some(TmdbId::new(title.tmdb)),
                total_episodes: title.episodes,
            },
            now,
        )?;
        ids.push(entry.id);
    }

    catalog.set_status(ids[0], WatchStatus::Completed)?;
    catalog.set_rating(ids[0], Some(9))?;
    catalog.set_status(ids[1], WatchStatus::Completed)?;
    catalog.set_rating(ids[1], Some(8))?;
    catalog.toggle_favorite(ids[1])?;
    for _ in 0..5 {
        catalog.record_episode(ids[4])?;
    }
    catalog.set_rating(ids[4], Some(10))?;
    for _ in 0..7 {
        catalog.record_episode(ids[3])?;
    }

    let day = |offset: i64| (now - Duration::days(offset)).date_naive();
    let sessions: [(usize, NaiveDate, Vec<_>, Vec<_>); 4] = [
        (0, day(120), vec![bob.id], vec![rewatch.id]),
        (1, day(40), vec![alice.id, bob.id], vec![cinema.id]),
        (4, day(12), vec![alice.id], vec![]),
        (3, day(2), vec![], vec![]),
    ];
    for (index, watched_on, friends, tags) in sessions {
        catalog.create_session(CreateSessionRequest {
            entry_id: ids[index],
            watched_on,
            friends,
            tags,
            notes: None,
        })?;
    }

    let sci_fi = catalog.create_collection(
        CreateCollectionRequest {
            name: "Slow sci-fi".to_string(),
            description: Some("Quiet, patient science fiction".to_string()),
        },
        now,
    )?;
    catalog.add_to_collection(sci_fi.id, ids[1], now)?;
    catalog.add_to_collection(sci_fi.id, ids[3], now)?;

    for (tmdb, (name, department, credits)) in (10_000..).zip(CONTRIBUTORS) {
        let id = ContributorId::new(catalog.allocate_id());
        catalog.contributors.push(Contributor {
            id,
            tmdb_id: Some(TmdbId::new(tmdb)),
            name: (*name).to_string(),
            department: (*department).to_string(),
            credits: *credits,
        });
    }

    catalog.put_cached("movie/949", "{\"id\":949}".to_string(), Duration::days(7), now);
    catalog.put_cached("search/heat", "{\"results\":[]}".to_string(), Duration::days(-1), now);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_catalog_is_consistent() {
        let now = Utc::now();
        let catalog = demo_catalog(now).unwrap();
        assert_eq!(catalog.entries.len(), TITLES.len());
        assert_eq!(catalog.friends.len(), 2);
        assert_eq!(catalog.cache_stats(now).expired, 1);
        let chernobyl = catalog.entries.iter().find(|e| e.title == "Chernobyl").unwrap();
        assert_eq!(chernobyl.status, WatchStatus::Completed);
    }
}
