use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::TagId;

/// Default color assigned to tags created without one.
pub const DEFAULT_TAG_COLOR: &str = "#89b4fa";

/// A user-defined label attached to watch sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    /// Hex color in `#rrggbb` form.
    pub color: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTagRequest {
    pub name: String,
    pub color: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTagRequest {
    pub id: TagId,
    pub name: String,
    pub color: String,
    pub description: Option<String>,
}

/// Returns true for colors of the form `#rrggbb`.
pub fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors() {
        assert!(is_hex_color("#89b4fa"));
        assert!(is_hex_color("#FFFFFF"));
        assert!(!is_hex_color("89b4fa"));
        assert!(!is_hex_color("#89b4f"));
        assert!(!is_hex_color("#89b4fz"));
    }
}
