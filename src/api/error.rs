use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Failure reported by the persistence collaborator.
///
/// Screens never match on these variants; the command layer turns them into
/// their display string.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Invalid(String),

    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl ApiError {
    pub const fn not_found(entity: &'static str, id: u64) -> Self {
        Self::NotFound { entity, id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_human_readable() {
        assert_eq!(ApiError::not_found("friend", 3).to_string(), "friend 3 not found");
        assert_eq!(
            ApiError::Conflict("A tag named \"horror\" already exists".to_string()).to_string(),
            "A tag named \"horror\" already exists"
        );
    }
}
