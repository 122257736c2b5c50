use anyhow::{bail, Context, Result};
use rusqlite::{params, types::Type, Connection, OpenFlags, OptionalExtension};
use std::path::Path;
use tracing::info;

pub const DEFAULT_TIMESTAMP: &str = "(cast(strftime('%s','now') as int))";

/// Every schema version is stored as `BASE_DB_VERSION + version` in
/// `PRAGMA user_version`, so a database that was never touched by us (0)
/// is told apart from version 0 of our schema.
pub const BASE_DB_VERSION: usize = 99999;

#[macro_export]
macro_rules! sqlite_column {
    ($name:expr, $sql_type:expr $(, $field:ident = $value:expr)*) => {
        {
            #[allow(unused_mut)]
            let mut column = Column {
                name: $name,
                sql_type: $sql_type,
                is_primary_key: false,
                non_null: false,
                is_unique: false,
                default_value: None,
                foreign_key: None,
            };
            $(
                column.$field = $value;
            )*
            column
        }
    };
}

#[derive(Debug, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Integer,
}

impl SqlType {
    fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer => "INTEGER",
        }
    }

    fn from_sql(s: &str) -> Option<&'static SqlType> {
        match s {
            "TEXT" => Some(&SqlType::Text),
            "INTEGER" => Some(&SqlType::Integer),
            _ => None,
        }
    }
}

pub enum ForeignKeyOnChange {
    Restrict,
    Cascade,
}

impl ForeignKeyOnChange {
    fn as_sql(&self) -> &'static str {
        match self {
            ForeignKeyOnChange::Restrict => "RESTRICT",
            ForeignKeyOnChange::Cascade => "CASCADE",
        }
    }
}

pub struct ForeignKey {
    pub foreign_table: &'static str,
    pub foreign_column: &'static str,
    pub on_delete: ForeignKeyOnChange,
}

pub struct Column<'a, S: AsRef<str>> {
    pub name: S,
    pub sql_type: &'a SqlType,
    pub is_primary_key: bool,
    pub non_null: bool,
    pub is_unique: bool,
    pub default_value: Option<S>,
    pub foreign_key: Option<&'a ForeignKey>,
}

impl Column<'_, &'static str> {
    fn definition(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.sql_type.as_sql());
        if self.is_primary_key {
            sql.push_str(" PRIMARY KEY");
        }
        if self.non_null {
            sql.push_str(" NOT NULL");
        }
        if self.is_unique {
            sql.push_str(" UNIQUE");
        }
        if let Some(default_value) = self.default_value {
            sql.push_str(&format!(" DEFAULT {}", default_value));
        }
        if let Some(foreign_key) = self.foreign_key {
            sql.push_str(&format!(
                " REFERENCES {}({}) ON DELETE {}",
                foreign_key.foreign_table,
                foreign_key.foreign_column,
                foreign_key.on_delete.as_sql()
            ));
        }
        sql
    }
}

pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column<'static, &'static str>],
    pub indices: &'static [(&'static str, &'static str)],
}

impl Table {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        let columns = self
            .columns
            .iter()
            .map(|c| c.definition())
            .collect::<Vec<_>>()
            .join(", ");
        conn.execute(&format!("CREATE TABLE {} ({});", self.name, columns), [])
            .with_context(|| format!("Failed to create table {}", self.name))?;

        for (index_name, column_name) in self.indices {
            conn.execute(
                &format!(
                    "CREATE INDEX {} ON {}({});",
                    index_name, self.name, column_name
                ),
                [],
            )?;
        }
        Ok(())
    }

    fn actual_columns(&self, conn: &Connection) -> Result<Vec<Column<'static, String>>> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", self.name))?;
        let columns = stmt
            .query_map([], |row| {
                let sql_type_name = row.get::<_, String>(2)?;
                let sql_type = SqlType::from_sql(&sql_type_name).ok_or_else(|| {
                    rusqlite::Error::InvalidColumnType(2, sql_type_name.clone(), Type::Text)
                })?;
                Ok(Column {
                    name: row.get::<_, String>(1)?,
                    sql_type,
                    non_null: row.get::<_, i32>(3)? == 1,
                    default_value: row.get::<_, Option<String>>(4)?,
                    is_primary_key: row.get::<_, i32>(5)? == 1,
                    is_unique: false,
                    foreign_key: None,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Failed to read columns of table {}", self.name))?;
        Ok(columns)
    }

    fn validate_columns(&self, conn: &Connection) -> Result<()> {
        let actual_columns = self.actual_columns(conn)?;
        if actual_columns.len() != self.columns.len() {
            bail!(
                "Table {} has {} columns, expected {}. Found column names: {}, expected: {}",
                self.name,
                actual_columns.len(),
                self.columns.len(),
                actual_columns
                    .iter()
                    .map(|c| c.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
                self.columns
                    .iter()
                    .map(|c| c.name)
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        for (actual, expected) in actual_columns.iter().zip(self.columns.iter()) {
            if actual.name != expected.name {
                bail!(
                    "Table {} Column name mismatch: expected {}, got {}",
                    self.name,
                    expected.name,
                    actual.name
                );
            }
            if actual.sql_type != expected.sql_type {
                bail!(
                    "Table {} Column {} type mismatch: expected {:?}, got {:?}",
                    self.name,
                    expected.name,
                    expected.sql_type,
                    actual.sql_type
                );
            }
            if actual.non_null != expected.non_null {
                bail!(
                    "Table {} Column {} non-null mismatch: expected {}, got {}",
                    self.name,
                    expected.name,
                    expected.non_null,
                    actual.non_null
                );
            }
            // sqlite may report the default wrapped in parentheses
            let actual_default = actual
                .default_value
                .as_deref()
                .map(strip_leading_and_trailing_parentheses);
            let expected_default = expected
                .default_value
                .map(strip_leading_and_trailing_parentheses);
            if actual_default != expected_default {
                bail!(
                    "Table {} Column {} default value mismatch: expected {:?}, got {:?}",
                    self.name,
                    expected.name,
                    expected.default_value,
                    actual.default_value
                );
            }
            if actual.is_primary_key != expected.is_primary_key {
                bail!(
                    "Table {} Column {} primary key mismatch: expected {}, got {}",
                    self.name,
                    expected.name,
                    expected.is_primary_key,
                    actual.is_primary_key
                );
            }
        }
        Ok(())
    }

    fn validate_indices(&self, conn: &Connection) -> Result<()> {
        for (index_name, _) in self.indices {
            let exists = conn
                .query_row(
                    "SELECT 1 FROM sqlite_master WHERE type='index' AND name=?1 AND tbl_name=?2",
                    params![index_name, self.name],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();
            if !exists {
                bail!("Table {} is missing index '{}'", self.name, index_name);
            }
        }
        Ok(())
    }

    fn validate_foreign_keys(&self, conn: &Connection) -> Result<()> {
        // id, seq, table, from, to, on_update, on_delete, match
        let mut stmt = conn.prepare(&format!("PRAGMA foreign_key_list({})", self.name))?;
        let actual_fks: Vec<(String, String, String, String)> = stmt
            .query_map([], |row| Ok((row.get(3)?, row.get(2)?, row.get(4)?, row.get(6)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        for column in self.columns {
            let Some(expected) = column.foreign_key else {
                continue;
            };
            let expected_on_delete = expected.on_delete.as_sql();
            let found = actual_fks.iter().find(|(from, ..)| from == column.name);
            match found {
                Some((_, to_table, to_column, on_delete))
                    if to_table == expected.foreign_table
                        && to_column == expected.foreign_column
                        && on_delete == expected_on_delete => {}
                Some((_, to_table, to_column, on_delete)) => bail!(
                    "Table {} column {} has foreign key mismatch: expected REFERENCES {}({}) ON DELETE {}, got REFERENCES {}({}) ON DELETE {}",
                    self.name,
                    column.name,
                    expected.foreign_table,
                    expected.foreign_column,
                    expected_on_delete,
                    to_table,
                    to_column,
                    on_delete
                ),
                None => bail!(
                    "Table {} column {} is missing foreign key: expected REFERENCES {}({}) ON DELETE {}",
                    self.name,
                    column.name,
                    expected.foreign_table,
                    expected.foreign_column,
                    expected_on_delete
                ),
            }
        }
        Ok(())
    }
}

pub struct VersionedSchema {
    pub version: usize,
    pub tables: &'static [Table],
    pub migration: Option<fn(&Connection) -> Result<()>>,
}

fn strip_leading_and_trailing_parentheses<S: AsRef<str>>(s: S) -> String {
    let s = s.as_ref();
    if s.starts_with('(') && s.ends_with(')') {
        s[1..s.len() - 1].to_string()
    } else {
        s.to_string()
    }
}

impl VersionedSchema {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        for table in self.tables {
            table.create(conn)?;
        }
        conn.pragma_update(None, "user_version", BASE_DB_VERSION + self.version)?;
        Ok(())
    }

    pub fn validate(&self, conn: &Connection) -> Result<()> {
        for table in self.tables {
            table.validate_columns(conn)?;
            table.validate_indices(conn)?;
            table.validate_foreign_keys(conn)?;
        }
        Ok(())
    }
}

/// Opens (or creates) a database file and brings it to the latest of
/// `schemas`. A fresh file gets the latest schema directly, an existing
/// one is validated against its recorded version and then migrated forward.
pub fn open_versioned_db<P: AsRef<Path>>(
    db_path: P,
    schemas: &'static [VersionedSchema],
) -> Result<Connection> {
    let db_path = db_path.as_ref();
    let latest = schemas.last().context("No schema versions defined")?;

    let conn = if db_path.exists() {
        Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open database {:?}", db_path))?
    } else {
        info!("Creating database at {:?}, schema version {}", db_path, latest.version);
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to create database {:?}", db_path))?;
        latest.create(&conn)?;
        conn
    };

    // Off by default in sqlite and scoped to the connection.
    conn.pragma_update(None, "foreign_keys", "ON")?;

    let db_version = conn
        .query_row("PRAGMA user_version;", [], |row| row.get::<_, i64>(0))
        .context("Failed to read database version")?
        - BASE_DB_VERSION as i64;

    if db_version < 0 {
        bail!(
            "Database version {} is too old, does not contain base db version {}",
            db_version,
            BASE_DB_VERSION
        );
    }
    if db_version >= schemas.len() as i64 {
        bail!("Database version {} is too new", db_version);
    }
    let version = db_version as usize;
    schemas[version].validate(&conn)?;

    migrate_if_needed(&conn, schemas, version)?;
    Ok(conn)
}

fn migrate_if_needed(
    conn: &Connection,
    schemas: &'static [VersionedSchema],
    version: usize,
) -> Result<()> {
    let mut latest_from = version;
    for schema in schemas.iter().skip(version + 1) {
        if let Some(migration_fn) = schema.migration {
            info!(
                "Migrating db from version {} to {}",
                latest_from, schema.version
            );
            migration_fn(conn)?;
        }
        latest_from = schema.version;
    }
    if latest_from != version {
        conn.pragma_update(None, "user_version", BASE_DB_VERSION + latest_from)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const OWNER_FK: ForeignKey = ForeignKey {
        foreign_table: "owner",
        foreign_column: "id",
        on_delete: ForeignKeyOnChange::Cascade,
    };

    const OWNER_TABLE: Table = Table {
        name: "owner",
        columns: &[
            sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
            sqlite_column!("name", &SqlType::Text, non_null = true, is_unique = true),
        ],
        indices: &[],
    };

    const ITEM_TABLE: Table = Table {
        name: "item",
        columns: &[
            sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
            sqlite_column!(
                "owner_id",
                &SqlType::Integer,
                non_null = true,
                foreign_key = Some(&OWNER_FK)
            ),
            sqlite_column!(
                "created",
                &SqlType::Integer,
                default_value = Some(DEFAULT_TIMESTAMP)
            ),
        ],
        indices: &[("idx_item_owner_id", "owner_id")],
    };

    const ITEM_NOTE_TABLE: Table = Table {
        name: "item_note",
        columns: &[
            sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
            sqlite_column!("body", &SqlType::Text),
        ],
        indices: &[],
    };

    static TEST_SCHEMAS: &[VersionedSchema] = &[
        VersionedSchema {
            version: 0,
            tables: &[OWNER_TABLE, ITEM_TABLE],
            migration: None,
        },
        VersionedSchema {
            version: 1,
            tables: &[OWNER_TABLE, ITEM_TABLE, ITEM_NOTE_TABLE],
            migration: Some(|conn: &Connection| ITEM_NOTE_TABLE.create(conn)),
        },
    ];

    fn user_version(conn: &Connection) -> i64 {
        conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn created_schema_validates() {
        let conn = Connection::open_in_memory().unwrap();
        TEST_SCHEMAS[1].create(&conn).unwrap();
        TEST_SCHEMAS[1].validate(&conn).unwrap();
        assert_eq!(user_version(&conn), BASE_DB_VERSION as i64 + 1);
    }

    #[test]
    fn validate_detects_missing_index() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(
            "CREATE TABLE owner (id INTEGER PRIMARY KEY, name TEXT NOT NULL UNIQUE)",
            [],
        )
        .unwrap();
        conn.execute(
            "CREATE TABLE item (
                id INTEGER PRIMARY KEY,
                owner_id INTEGER NOT NULL REFERENCES owner(id) ON DELETE CASCADE,
                created INTEGER DEFAULT (cast(strftime('%s','now') as int))
            )",
            [],
        )
        .unwrap();

        let err = TEST_SCHEMAS[0].validate(&conn).unwrap_err().to_string();
        assert!(err.contains("missing index"));
        assert!(err.contains("idx_item_owner_id"));
    }

    #[test]
    fn index_lookup_failure_is_not_reported_as_missing_index() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("locked.db");
        let writer = Connection::open(&path).unwrap();
        TEST_SCHEMAS[0].create(&writer).unwrap();

        let reader = Connection::open(&path).unwrap();
        reader.busy_timeout(std::time::Duration::ZERO).unwrap();
        writer.execute_batch("BEGIN EXCLUSIVE;").unwrap();

        let err = ITEM_TABLE.validate_indices(&reader).unwrap_err();
        let message = format!("{:#}", err);
        assert!(!message.contains("missing index"), "{}", message);
        assert!(message.contains("locked"), "{}", message);

        writer.execute_batch("ROLLBACK;").unwrap();
        ITEM_TABLE.validate_indices(&reader).unwrap();
    }

    #[test]
    fn validate_detects_wrong_on_delete_action() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(
            "CREATE TABLE owner (id INTEGER PRIMARY KEY, name TEXT NOT NULL UNIQUE)",
            [],
        )
        .unwrap();
        conn.execute(
            "CREATE TABLE item (
                id INTEGER PRIMARY KEY,
                owner_id INTEGER NOT NULL REFERENCES owner(id) ON DELETE RESTRICT,
                created INTEGER DEFAULT (cast(strftime('%s','now') as int))
            )",
            [],
        )
        .unwrap();
        conn.execute("CREATE INDEX idx_item_owner_id ON item(owner_id)", [])
            .unwrap();

        let err = TEST_SCHEMAS[0].validate(&conn).unwrap_err().to_string();
        assert!(err.contains("foreign key mismatch"));
        assert!(err.contains("CASCADE"));
        assert!(err.contains("RESTRICT"));
    }

    #[test]
    fn validate_detects_extra_column() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(
            "CREATE TABLE owner (id INTEGER PRIMARY KEY, name TEXT NOT NULL UNIQUE, nickname TEXT)",
            [],
        )
        .unwrap();

        let err = TEST_SCHEMAS[0].validate(&conn).unwrap_err().to_string();
        assert!(err.contains("Table owner has 3 columns, expected 2"));
    }

    #[test]
    fn opens_fresh_db_at_latest_version() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("fresh.db");

        let conn = open_versioned_db(&path, TEST_SCHEMAS).unwrap();
        assert_eq!(user_version(&conn), BASE_DB_VERSION as i64 + 1);
        let fk_enabled: i64 = conn
            .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk_enabled, 1);
    }

    #[test]
    fn migrates_old_db_forward() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("old.db");
        {
            let conn = Connection::open(&path).unwrap();
            TEST_SCHEMAS[0].create(&conn).unwrap();
            conn.execute("INSERT INTO owner (name) VALUES ('amy')", [])
                .unwrap();
        }

        let conn = open_versioned_db(&path, TEST_SCHEMAS).unwrap();
        assert_eq!(user_version(&conn), BASE_DB_VERSION as i64 + 1);
        TEST_SCHEMAS[1].validate(&conn).unwrap();

        let name: String = conn
            .query_row("SELECT name FROM owner WHERE id = 1", [], |row| row.get(0))
            .unwrap();
        assert_eq!(name, "amy");
    }

    #[test]
    fn refuses_foreign_db() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("foreign.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute("CREATE TABLE something (id INTEGER)", [])
                .unwrap();
        }

        let err = open_versioned_db(&path, TEST_SCHEMAS)
            .unwrap_err()
            .to_string();
        assert!(err.contains("too old"));
    }
}
