//! Fuzzy filtering for list pages.

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

/// Case-insensitive fuzzy matcher over the searchable text of list rows.
pub struct Matcher {
    inner: SkimMatcherV2,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Matcher {
    pub fn new() -> Self {
        Self {
            inner: SkimMatcherV2::default().ignore_case(),
        }
    }

    pub fn score(&self, text: &str, pattern: &str) -> Option<i64> {
        self.inner.fuzzy_match(text, pattern)
    }

    pub fn matches(&self, text: &str, pattern: &str) -> bool {
        self.score(text, pattern).is_some()
    }

    /// Best score of `pattern` against any of `texts`.
    pub fn best_score<'a>(&self, texts: impl IntoIterator<Item = &'a str>, pattern: &str) -> Option<i64> {
        texts.into_iter().filter_map(|text| self.score(text, pattern)).max()
    }
}

/// Items whose searchable text matches `query`.
///
/// An empty query keeps every item in its original order. Otherwise items
/// are ordered by descending score; ties keep their original order.
pub fn filter<'a, T>(
    items: &'a [T],
    query: &str,
    fields: impl Fn(&T) -> Vec<&str>,
) -> Vec<&'a T> {
    let query = query.trim();
    if query.is_empty() {
        return items.iter().collect();
    }

    let matcher = Matcher::new();
    let mut scored: Vec<(i64, &T)> = items
        .iter()
        .filter_map(|item| matcher.best_score(fields(item), query).map(|score| (score, item)))
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, item)| item).collect()
}
