use std::fmt;
use std::str::FromStr;

use crate::model::EntryId;

/// A navigable location in the application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Route {
    #[default]
    Library,
    Entry(EntryId),
    Friends,
    Tags,
    Collections,
    Contributors,
    Stats,
    Maintenance,
}

impl Route {
    /// Top-level pages in tab order. Number keys select them by position.
    pub const TABS: [Self; 7] = [
        Self::Library,
        Self::Friends,
        Self::Tags,
        Self::Collections,
        Self::Contributors,
        Self::Stats,
        Self::Maintenance,
    ];

    /// Position of the tab to highlight. Detail pages highlight their parent.
    #[must_use]
    pub const fn tab_index(self) -> usize {
        match self {
            Self::Library | Self::Entry(_) => 0,
            Self::Friends => 1,
            Self::Tags => 2,
            Self::Collections => 3,
            Self::Contributors => 4,
            Self::Stats => 5,
            Self::Maintenance => 6,
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Library => "Library",
            Self::Entry(_) => "Entry",
            Self::Friends => "Friends",
            Self::Tags => "Tags",
            Self::Collections => "Collections",
            Self::Contributors => "Contributors",
            Self::Stats => "Stats",
            Self::Maintenance => "Maintenance",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entry(id) => write!(f, "entry/{id}"),
            other => f.write_str(&other.title().to_lowercase()),
        }
    }
}

impl FromStr for Route {
    type Err = String;

    /// Parses top-level page names (`library`, `friends`, ...) and `entry/<id>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        if let Some(id) = s.strip_prefix("entry/") {
            return id
                .parse::<u64>()
                .map(|id| Self::Entry(EntryId::new(id)))
                .map_err(|_| format!("Invalid entry id: {id}"));
        }
        Self::TABS
            .into_iter()
            .find(|route| route.title().eq_ignore_ascii_case(&s))
            .ok_or_else(|| format!("Unknown page: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_page_names() {
        assert_eq!("friends".parse::<Route>(), Ok(Route::Friends));
        assert_eq!(" Stats ".parse::<Route>(), Ok(Route::Stats));
        assert_eq!(
            "entry/12".parse::<Route>(),
            Ok(Route::Entry(EntryId::new(12)))
        );
        assert!("entry/abc".parse::<Route>().is_err());
        assert!("settings".parse::<Route>().is_err());
    }

    #[test]
    fn display_parses_back() {
        for route in Route::TABS.into_iter().chain([Route::Entry(EntryId::new(4))]) {
            assert_eq!(route.to_string().parse::<Route>(), Ok(route));
        }
    }

    #[test]
    fn entry_highlights_library_tab() {
        assert_eq!(Route::Entry(EntryId::new(1)).tab_index(), Route::Library.tab_index());
        for (index, route) in Route::TABS.into_iter().enumerate() {
            assert_eq!(route.tab_index(), index);
        }
    }
}
