//! Test database creation

use super::constants::*;
use anyhow::{Context, Result};
use std::path::PathBuf;
use streaming_server::artist::{auth::hash_password, ArtistStore};
use streaming_server::catalog::CatalogStore;
use streaming_server::SqliteStore;
use tempfile::TempDir;

/// Creates a temporary database with two artists and two genres, no tracks.
/// Returns (temp_dir, db_path)
pub fn create_test_db() -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let db_path = dir.path().join("streaming.db");

    let store = SqliteStore::new(&db_path)?;
    for (name, password) in [(TEST_ARTIST, TEST_PASS), (OTHER_ARTIST, OTHER_PASS)] {
        store
            .create_artist(name, &hash_password(password)?)?
            .with_context(|| format!("Artist {} already seeded", name))?;
    }
    store.insert_genre(GENRE_ROCK)?;
    store.insert_genre(GENRE_JAZZ)?;

    Ok((dir, db_path))
}
