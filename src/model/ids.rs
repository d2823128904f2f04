use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Identifier of a [`crate::model::Friend`].
    FriendId
);
entity_id!(
    /// Identifier of a [`crate::model::Tag`].
    TagId
);
entity_id!(
    /// Identifier of a [`crate::model::Collection`].
    CollectionId
);
entity_id!(
    /// Identifier of a [`crate::model::LibraryEntry`].
    EntryId
);
entity_id!(
    /// Identifier of a [`crate::model::WatchSession`].
    SessionId
);
entity_id!(
    /// Identifier of a [`crate::model::Contributor`].
    ContributorId
);
entity_id!(
    /// Identifier assigned by TMDB to a movie, series or person.
    TmdbId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_as_bare_numbers() {
        let json = serde_json::to_string(&FriendId::new(7)).unwrap();
        assert_eq!(json, "7");
        let back: TagId = serde_json::from_str("12").unwrap();
        assert_eq!(back.get(), 12);
    }
}
