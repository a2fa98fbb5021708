// src/db/models/repository.rs

//! Repository model - upstream package sources and their mirroring state

use crate::error::{Error, Result};
use rusqlite::{Connection, OptionalExtension, Row, params};

const SELECT_COLUMNS: &str = "SELECT id, external_id, name, url, auth_token, mirroring_enabled,
        last_mirrored_at, created_at
     FROM repositories";

/// Repository represents an upstream package source that can be mirrored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub id: Option<i64>,
    /// Upstream identifier, unique within the store
    pub external_id: i64,
    pub name: String,
    pub url: String,
    /// Opaque credential appended to upstream requests
    pub auth_token: Option<String>,
    pub mirroring_enabled: bool,
    /// RFC 3339 timestamp of the last successful mirror
    pub last_mirrored_at: Option<String>,
    pub created_at: Option<String>,
}

impl Repository {
    /// Create a new Repository (mirroring disabled until enabled explicitly)
    pub fn new(external_id: i64, name: String, url: String) -> Self {
        Self {
            id: None,
            external_id,
            name,
            url,
            auth_token: None,
            mirroring_enabled: false,
            last_mirrored_at: None,
            created_at: None,
        }
    }

    /// Internal ID, or an error for a repository that was never stored
    pub fn require_id(&self) -> Result<i64> {
        self.id.ok_or_else(|| {
            Error::InitError(format!("Repository '{}' has no ID", self.name))
        })
    }

    /// Insert this repository into the database
    pub fn insert(&mut self, conn: &Connection) -> Result<i64> {
        conn.execute(
            "INSERT INTO repositories (external_id, name, url, auth_token, mirroring_enabled, last_mirrored_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                self.external_id,
                &self.name,
                &self.url,
                &self.auth_token,
                self.mirroring_enabled as i32,
                &self.last_mirrored_at,
            ],
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(ref f, _)
                if f.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Error::ConflictError(format!(
                    "Repository with ID {} already exists",
                    self.external_id
                ))
            }
            other => other.into(),
        })?;

        let id = conn.last_insert_rowid();
        self.id = Some(id);
        Ok(id)
    }

    /// Insert or refresh upstream data for this repository
    ///
    /// Name, URL and token follow the upstream; the mirroring flag and
    /// timestamp of an existing row are left alone.
    pub fn upsert(&mut self, conn: &Connection) -> Result<i64> {
        let id: i64 = conn.query_row(
            "INSERT INTO repositories (external_id, name, url, auth_token, mirroring_enabled)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(external_id) DO UPDATE SET
                name = excluded.name,
                url = excluded.url,
                auth_token = excluded.auth_token
             RETURNING id",
            params![
                self.external_id,
                &self.name,
                &self.url,
                &self.auth_token,
                self.mirroring_enabled as i32,
            ],
            |row| row.get(0),
        )?;

        self.id = Some(id);
        Ok(id)
    }

    /// Find a repository by internal ID
    pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} WHERE id = ?1"))?;
        let repo = stmt.query_row([id], Self::from_row).optional()?;
        Ok(repo)
    }

    /// Find a repository by its upstream ID
    pub fn find_by_external_id(conn: &Connection, external_id: i64) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} WHERE external_id = ?1"))?;
        let repo = stmt.query_row([external_id], Self::from_row).optional()?;
        Ok(repo)
    }

    /// List all repositories
    pub fn list_all(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY id"))?;

        let repos = stmt
            .query_map([], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(repos)
    }

    /// List repositories marked for mirroring
    pub fn list_mirroring_enabled(conn: &Connection) -> Result<Vec<Self>> {
        Self::list_mirroring_enabled_excluding(conn, &[])
    }

    /// List repositories marked for mirroring whose internal ID is not in `exclude`
    ///
    /// The exclusion list is bound as a single JSON array parameter so its
    /// size is not limited by SQLite's host parameter cap.
    pub fn list_mirroring_enabled_excluding(conn: &Connection, exclude: &[i64]) -> Result<Vec<Self>> {
        let excluded = serde_json::to_string(exclude)
            .map_err(|e| Error::ParseError(format!("Failed to encode exclusion list: {e}")))?;

        let mut stmt = conn.prepare(&format!(
            "{SELECT_COLUMNS}
             WHERE mirroring_enabled = 1
               AND id NOT IN (SELECT value FROM json_each(?1))
             ORDER BY id"
        ))?;

        let repos = stmt
            .query_map([excluded], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(repos)
    }

    /// Enable or disable mirroring for a repository by upstream ID
    pub fn set_mirroring_enabled(conn: &Connection, external_id: i64, enabled: bool) -> Result<()> {
        let changed = conn.execute(
            "UPDATE repositories SET mirroring_enabled = ?1 WHERE external_id = ?2",
            params![enabled as i32, external_id],
        )?;

        if changed == 0 {
            return Err(Error::NotFoundError(format!(
                "Repository with ID {external_id} not found"
            )));
        }
        Ok(())
    }

    /// Record a successful mirror
    pub fn refresh_timestamp(conn: &Connection, id: i64, timestamp: &str) -> Result<()> {
        conn.execute(
            "UPDATE repositories SET last_mirrored_at = ?1 WHERE id = ?2",
            params![timestamp, id],
        )?;
        Ok(())
    }

    /// Convert a database row to a Repository
    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            external_id: row.get(1)?,
            name: row.get(2)?,
            url: row.get(3)?,
            auth_token: row.get(4)?,
            mirroring_enabled: row.get::<_, i32>(5)? != 0,
            last_mirrored_at: row.get(6)?,
            created_at: row.get(7)?,
        })
    }
}
