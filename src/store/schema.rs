use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP,
};
use rusqlite::Connection;

const ARTIST_FK: ForeignKey = ForeignKey {
    foreign_table: "artist",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Cascade,
};

const GENRE_FK: ForeignKey = ForeignKey {
    foreign_table: "genres",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Restrict,
};

/// V 0
const ARTIST_TABLE_V_0: Table = Table {
    name: "artist",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            is_unique = true
        ),
        sqlite_column!("name", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!("password_hash", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_artist_name", "name")],
};
const GENRES_TABLE_V_0: Table = Table {
    name: "genres",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            is_unique = true
        ),
        sqlite_column!("title", &SqlType::Text, non_null = true),
    ],
    indices: &[("idx_genres_title", "title")],
};
const TRACKS_TABLE_V_0: Table = Table {
    name: "tracks",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            is_unique = true
        ),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!(
            "artist_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ARTIST_FK)
        ),
        sqlite_column!("length", &SqlType::Integer, non_null = true),
        sqlite_column!(
            "genre_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&GENRE_FK)
        ),
    ],
    indices: &[("idx_tracks_artist_id", "artist_id")],
};

/// V 1
const SESSION_TABLE_V_1: Table = Table {
    name: "session",
    columns: &[
        sqlite_column!("value", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!(
            "artist_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ARTIST_FK)
        ),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!("last_used", &SqlType::Integer),
    ],
    indices: &[("idx_session_value", "value")],
};

pub const VERSIONED_SCHEMAS: &[VersionedSchema] = &[
    VersionedSchema {
        version: 0,
        tables: &[ARTIST_TABLE_V_0, GENRES_TABLE_V_0, TRACKS_TABLE_V_0],
        migration: None,
    },
    VersionedSchema {
        version: 1,
        tables: &[
            ARTIST_TABLE_V_0,
            GENRES_TABLE_V_0,
            TRACKS_TABLE_V_0,
            SESSION_TABLE_V_1,
        ],
        migration: Some(|conn: &Connection| {
            SESSION_TABLE_V_1.create(conn)?;
            Ok(())
        }),
    },
];
