use super::schema::VERSIONED_SCHEMAS;
use crate::artist::{
    ArtistCredentials, ArtistId, ArtistIdentity, ArtistStore, SessionStore, SessionToken,
    SessionTokenValue,
};
use crate::catalog::{
    CatalogStore, DurationStats, Genre, GenreId, NewTrack, TitleAndLength, Track, TrackId,
    TrackListing,
};
use crate::sqlite_persistence::open_versioned_db;
use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::{
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, SystemTime},
};
use tracing::{debug, info};

/// Single SQLite connection shared by every store trait. Each operation
/// holds the lock for its own duration only.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

fn system_time_from_column_result(value: i64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(value.max(0) as u64)
}

fn system_time_to_column(time: SystemTime) -> i64 {
    time.duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => {
            failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        }
        _ => false,
    }
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = open_versioned_db(&db_path, VERSIONED_SCHEMAS)?;
        info!("Opened store at {:?}", db_path.as_ref());
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("Store connection lock is poisoned"))
    }

    fn count(&self, sql: &str, params: impl rusqlite::Params) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(sql, params, |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl ArtistStore for SqliteStore {
    fn create_artist(&self, name: &str, password_hash: &str) -> Result<Option<ArtistId>> {
        let conn = self.conn()?;
        match conn.execute(
            "INSERT INTO artist (name, password_hash) VALUES (?1, ?2)",
            params![name, password_hash],
        ) {
            Ok(_) => Ok(Some(ArtistId(conn.last_insert_rowid()))),
            Err(err) if is_unique_violation(&err) => Ok(None),
            Err(err) => Err(err).context("Failed to insert artist"),
        }
    }

    fn get_artist_credentials(&self, name: &str) -> Result<Option<ArtistCredentials>> {
        let conn = self.conn()?;
        let credentials = conn
            .query_row(
                "SELECT id, name, password_hash FROM artist WHERE name = ?1",
                params![name],
                |row| {
                    Ok(ArtistCredentials {
                        id: ArtistId(row.get(0)?),
                        name: row.get(1)?,
                        password_hash: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(credentials)
    }

    fn get_artist(&self, id: ArtistId) -> Result<Option<ArtistIdentity>> {
        let conn = self.conn()?;
        let artist = conn
            .query_row(
                "SELECT id, name FROM artist WHERE id = ?1",
                params![id.0],
                |row| {
                    Ok(ArtistIdentity {
                        id: ArtistId(row.get(0)?),
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(artist)
    }
}

impl SessionStore for SqliteStore {
    fn add_session(&self, token: &SessionToken) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO session (value, artist_id, created, last_used) VALUES (?1, ?2, ?3, ?4)",
            params![
                token.value.0,
                token.artist_id.0,
                system_time_to_column(token.created),
                token.last_used.map(system_time_to_column),
            ],
        )?;
        Ok(())
    }

    fn get_session(&self, value: &SessionTokenValue) -> Result<Option<SessionToken>> {
        let conn = self.conn()?;
        let token = conn
            .query_row(
                "SELECT value, artist_id, created, last_used FROM session WHERE value = ?1",
                params![value.0],
                |row| {
                    Ok(SessionToken {
                        value: SessionTokenValue(row.get(0)?),
                        artist_id: ArtistId(row.get(1)?),
                        created: system_time_from_column_result(row.get(2)?),
                        last_used: row
                            .get::<usize, Option<i64>>(3)?
                            .map(system_time_from_column_result),
                    })
                },
            )
            .optional()?;
        Ok(token)
    }

    fn delete_session(&self, value: &SessionTokenValue) -> Result<Option<SessionToken>> {
        let token = self.get_session(value)?;
        if token.is_some() {
            let conn = self.conn()?;
            conn.execute("DELETE FROM session WHERE value = ?1", params![value.0])?;
        }
        Ok(token)
    }

    fn touch_session(&self, value: &SessionTokenValue) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE session SET last_used = ?1 WHERE value = ?2",
            params![system_time_to_column(SystemTime::now()), value.0],
        )?;
        Ok(())
    }

    fn prune_sessions_created_before(&self, cutoff: SystemTime) -> Result<usize> {
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM session WHERE created < ?1",
            params![system_time_to_column(cutoff)],
        )?;
        debug!("Pruned {} sessions", removed);
        Ok(removed)
    }
}

impl CatalogStore for SqliteStore {
    fn insert_genre(&self, title: &str) -> Result<GenreId> {
        let conn = self.conn()?;
        conn.execute("INSERT INTO genres (title) VALUES (?1)", params![title])?;
        Ok(GenreId(conn.last_insert_rowid()))
    }

    fn genre_exists(&self, id: GenreId) -> Result<bool> {
        Ok(self.count("SELECT COUNT(*) FROM genres WHERE id = ?1", params![id.0])? > 0)
    }

    fn list_genres(&self) -> Result<Vec<Genre>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, title FROM genres ORDER BY id")?;
        let genres = stmt
            .query_map([], |row| {
                Ok(Genre {
                    id: GenreId(row.get(0)?),
                    title: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(genres)
    }

    fn insert_track(&self, owner: ArtistId, track: &NewTrack) -> Result<TrackId> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO tracks (title, artist_id, length, genre_id) VALUES (?1, ?2, ?3, ?4)",
            params![track.title, owner.0, track.length, track.genre_id.0],
        )?;
        Ok(TrackId(conn.last_insert_rowid()))
    }

    fn get_track(&self, id: TrackId) -> Result<Option<Track>> {
        let conn = self.conn()?;
        let track = conn
            .query_row(
                "SELECT id, title, artist_id, length, genre_id FROM tracks WHERE id = ?1",
                params![id.0],
                |row| {
                    Ok(Track {
                        id: TrackId(row.get(0)?),
                        title: row.get(1)?,
                        artist_id: ArtistId(row.get(2)?),
                        length: row.get(3)?,
                        genre_id: GenreId(row.get(4)?),
                    })
                },
            )
            .optional()?;
        Ok(track)
    }

    fn update_track(&self, id: TrackId, track: &NewTrack) -> Result<bool> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE tracks SET title = ?1, length = ?2, genre_id = ?3 WHERE id = ?4",
            params![track.title, track.length, track.genre_id.0, id.0],
        )?;
        Ok(updated > 0)
    }

    fn delete_track(&self, id: TrackId) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM tracks WHERE id = ?1", params![id.0])?;
        Ok(deleted > 0)
    }

    fn list_tracks(&self) -> Result<Vec<TrackListing>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT t.id, t.title, a.name, t.length, g.title
             FROM tracks t
             JOIN artist a ON a.id = t.artist_id
             JOIN genres g ON g.id = t.genre_id
             ORDER BY a.name DESC, t.id ASC",
        )?;
        let tracks = stmt
            .query_map([], |row| {
                Ok(TrackListing {
                    id: TrackId(row.get(0)?),
                    title: row.get(1)?,
                    artist_name: row.get(2)?,
                    length: row.get(3)?,
                    genre_title: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tracks)
    }

    fn count_track_owners(&self) -> Result<usize> {
        self.count("SELECT COUNT(DISTINCT artist_id) FROM tracks", [])
    }

    fn count_tracks(&self) -> Result<usize> {
        self.count("SELECT COUNT(*) FROM tracks", [])
    }

    fn count_tracks_by_genre_title(&self, title: &str) -> Result<usize> {
        self.count(
            "SELECT COUNT(*) FROM tracks t JOIN genres g ON g.id = t.genre_id WHERE g.title = ?1",
            params![title],
        )
    }

    fn list_titles_and_lengths(&self) -> Result<Vec<TitleAndLength>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT title, length FROM tracks ORDER BY id")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(TitleAndLength {
                    title: row.get(0)?,
                    length: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn duration_stats(&self) -> Result<DurationStats> {
        let conn = self.conn()?;
        let stats = conn.query_row(
            "SELECT AVG(length), COALESCE(SUM(length), 0) FROM tracks",
            [],
            |row| {
                Ok(DurationStats {
                    average: row.get(0)?,
                    total: row.get(1)?,
                })
            },
        )?;
        Ok(stats)
    }
}
