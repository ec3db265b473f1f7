//! Storage boundary: site directory, settings stores, page relations.
//!
//! One SQLite connection shared behind a mutex, the same shape the host
//! platform hands us. Values in the settings tables are stored as JSON.
//! Page relations are undirected edges stored canonically as
//! `(min(id), max(id))`; the primary key on the pair is the last line of
//! defense against a duplicate-insert race.

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, info};

/// Storage-level failures, kept distinguishable so callers can treat a
/// missing referent differently from a broken store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("site '{0}' does not exist")]
    SiteNotFound(String),

    #[error("storage error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("corrupt value for setting '{key}': {source}")]
    Corrupt {
        key: String,
        source: serde_json::Error,
    },

    #[error("failed to encode value for setting '{key}': {source}")]
    Encode {
        key: String,
        source: serde_json::Error,
    },
}

/// A canonical undirected page relation: `first < second` by id.
pub type Edge = (i64, i64);

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database at `path` and ensure the schema.
    pub fn new(path: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// In-memory database, mainly for tests and embedding hosts.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn init_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS site (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                slug TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS setting (
                id TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS site_setting (
                id TEXT NOT NULL,
                site_id INTEGER NOT NULL,
                value TEXT NOT NULL,
                PRIMARY KEY (id, site_id),
                FOREIGN KEY (site_id) REFERENCES site (id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS site_page_relation (
                page_id INTEGER NOT NULL,
                related_page_id INTEGER NOT NULL,
                PRIMARY KEY (page_id, related_page_id)
            );",
        )?;
        Ok(())
    }

    // ==================== Site directory ====================

    /// All site slugs, sorted ascending.
    pub fn list_site_slugs(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT slug FROM site ORDER BY slug ASC")?;
        let slugs = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(slugs)
    }

    /// Register a site. Returns its id; registering an existing slug is a
    /// no-op that returns the existing id.
    pub fn insert_site(&self, slug: &str) -> Result<i64, StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO site (slug) VALUES (?1)",
            params![slug],
        )?;
        let id = conn.query_row(
            "SELECT id FROM site WHERE slug = ?1",
            params![slug],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Delete a site. Its settings rows cascade; its pages' relations are
    /// the host's cascade, not ours. Returns whether a row was deleted.
    pub fn delete_site(&self, slug: &str) -> Result<bool, StoreError> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute("DELETE FROM site WHERE slug = ?1", params![slug])?;
        if deleted > 0 {
            info!(slug, "deleted site");
        }
        Ok(deleted > 0)
    }

    fn site_id(conn: &Connection, slug: &str) -> Result<i64, StoreError> {
        conn.query_row(
            "SELECT id FROM site WHERE slug = ?1",
            params![slug],
            |row| row.get(0),
        )
        .optional()?
        .ok_or_else(|| StoreError::SiteNotFound(slug.to_string()))
    }

    // ==================== Settings ====================

    /// Read a global setting, deserialized from its stored JSON.
    pub fn get_setting<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let raw: Option<String> = conn
            .query_row(
                "SELECT value FROM setting WHERE id = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        raw.map(|json| {
            serde_json::from_str(&json).map_err(|source| StoreError::Corrupt {
                key: key.to_string(),
                source,
            })
        })
        .transpose()
    }

    /// Write a global setting as JSON, replacing any previous value.
    pub fn set_setting<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(value).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO setting (id, value) VALUES (?1, ?2)
             ON CONFLICT (id) DO UPDATE SET value = excluded.value",
            params![key, json],
        )?;
        Ok(())
    }

    /// Remove a global setting. Returns whether it existed.
    pub fn delete_setting(&self, key: &str) -> Result<bool, StoreError> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute("DELETE FROM setting WHERE id = ?1", params![key])?;
        Ok(deleted > 0)
    }

    /// Read a per-site setting. Fails with `SiteNotFound` for an unknown
    /// slug: the operation depended on a referent that no longer exists.
    pub fn get_site_setting<T: DeserializeOwned>(
        &self,
        slug: &str,
        key: &str,
    ) -> Result<Option<T>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let site_id = Self::site_id(&conn, slug)?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT value FROM site_setting WHERE id = ?1 AND site_id = ?2",
                params![key, site_id],
                |row| row.get(0),
            )
            .optional()?;
        raw.map(|json| {
            serde_json::from_str(&json).map_err(|source| StoreError::Corrupt {
                key: key.to_string(),
                source,
            })
        })
        .transpose()
    }

    /// Write a per-site setting as JSON.
    pub fn set_site_setting<T: Serialize>(
        &self,
        slug: &str,
        key: &str,
        value: &T,
    ) -> Result<(), StoreError> {
        let json = serde_json::to_string(value).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;
        let conn = self.conn.lock().unwrap();
        let site_id = Self::site_id(&conn, slug)?;
        conn.execute(
            "INSERT INTO site_setting (id, site_id, value) VALUES (?1, ?2, ?3)
             ON CONFLICT (id, site_id) DO UPDATE SET value = excluded.value",
            params![key, site_id, json],
        )?;
        Ok(())
    }

    // ==================== Page relations ====================

    /// Replace every relation touching `page_id` with the complete graph
    /// over `{page_id} ∪ selected`.
    ///
    /// The page is removed from its own selection and duplicates are
    /// dropped before anything happens. Delete and insert run in one
    /// transaction, so a reader never observes the page with a partial
    /// edge set; the insert is `OR IGNORE`, so replaying the same
    /// replacement is harmless.
    pub fn replace_relations(&self, page_id: i64, selected: &[i64]) -> Result<(), StoreError> {
        let mut related: Vec<i64> = selected.iter().copied().filter(|id| *id != page_id).collect();
        related.sort_unstable();
        related.dedup();

        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        // Full replace, not an incremental diff: simpler, and idempotent
        // under retries.
        tx.execute(
            "DELETE FROM site_page_relation WHERE page_id = ?1 OR related_page_id = ?1",
            params![page_id],
        )?;

        if !related.is_empty() {
            let mut vertices = related.clone();
            vertices.push(page_id);
            vertices.sort_unstable();

            let mut insert = tx.prepare(
                "INSERT OR IGNORE INTO site_page_relation (page_id, related_page_id)
                 VALUES (?1, ?2)",
            )?;
            for (i, a) in vertices.iter().enumerate() {
                for b in &vertices[i + 1..] {
                    insert.execute(params![a, b])?;
                }
            }
            drop(insert);
        }

        tx.commit()?;
        debug!(page_id, relations = related.len(), "replaced page relations");
        Ok(())
    }

    /// The pages related to `page_id`, i.e. the other end of every edge
    /// touching it, sorted ascending.
    pub fn related_pages(&self, page_id: i64) -> Result<Vec<i64>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT CASE WHEN page_id = ?1 THEN related_page_id ELSE page_id END
             FROM site_page_relation
             WHERE page_id = ?1 OR related_page_id = ?1
             ORDER BY 1 ASC",
        )?;
        let pages = stmt
            .query_map(params![page_id], |row| row.get(0))?
            .collect::<Result<Vec<i64>, _>>()?;
        Ok(pages)
    }

    /// Every stored edge touching `page_id`, in canonical order.
    pub fn edges_touching(&self, page_id: i64) -> Result<Vec<Edge>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT page_id, related_page_id FROM site_page_relation
             WHERE page_id = ?1 OR related_page_id = ?1
             ORDER BY page_id, related_page_id",
        )?;
        let edges = stmt
            .query_map(params![page_id], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<Edge>, _>>()?;
        Ok(edges)
    }

    #[cfg(test)]
    fn all_edges(&self) -> Result<Vec<Edge>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT page_id, related_page_id FROM site_page_relation
             ORDER BY page_id, related_page_id",
        )?;
        let edges = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<Edge>, _>>()?;
        Ok(edges)
    }
}
