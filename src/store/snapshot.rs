//! JSON snapshot persistence for the catalogue.

use std::path::Path;

use tracing::debug;

use crate::api::ApiResult;
use crate::store::Catalog;

/// Reads a snapshot, treating a missing file as an empty catalogue.
pub async fn load(path: &Path) -> ApiResult<Catalog> {
    match tokio::fs::read(path).await {
        Ok(bytes) => {
            let catalog = serde_json::from_slice(&bytes)?;
            debug!("Loaded snapshot from {:?}", path);
            Ok(catalog)
        }
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            debug!("No snapshot at {:?}, starting empty", path);
            Ok(Catalog::default())
        }
        Err(error) => Err(error.into()),
    }
}

/// Writes the snapshot through a sibling temporary file so a crash mid-write
/// never leaves a truncated file behind.
pub async fn save(path: &Path, catalog: &Catalog) -> ApiResult<()> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }
    let bytes = serde_json::to_vec_pretty(catalog)?;
    let temporary = path.with_extension("json.tmp");
    tokio::fs::write(&temporary, bytes).await?;
    tokio::fs::rename(&temporary, path).await?;
    debug!("Saved snapshot to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::model::CreateFriendRequest;

    #[tokio::test]
    async fn missing_snapshot_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = load(&dir.path().join("library.json")).await.unwrap();
        assert!(catalog.friends.is_empty());
    }

    #[tokio::test]
    async fn snapshot_survives_a_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("library.json");

        let mut catalog = Catalog::default();
        catalog
            .create_friend(
                CreateFriendRequest {
                    name: "Alice".to_string(),
                    image_url: None,
                },
                Utc::now(),
            )
            .unwrap();
        save(&path, &catalog).await.unwrap();

        let mut loaded = load(&path).await.unwrap();
        assert_eq!(loaded.friends, catalog.friends);

        // The id counter must survive too, or new ids would collide.
        let bob = loaded
            .create_friend(
                CreateFriendRequest {
                    name: "Bob".to_string(),
                    image_url: None,
                },
                Utc::now(),
            )
            .unwrap();
        assert_ne!(bob.id, catalog.friends[0].id);
    }

    #[tokio::test]
    async fn corrupt_snapshot_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.json");
        tokio::fs::write(&path, b"not json").await.unwrap();
        assert!(load(&path).await.is_err());
    }
}
