use anyhow::Result;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use r2d2_sqlite::rusqlite::{params, OpenFlags};

use crate::storage::area::StorageArea;

/// SQLite-based local storage implementation.
///
/// Several independent areas may live in one database file; each is
/// addressed by its `namespace`.
pub struct SqliteLocalStore {
    pool: Pool<SqliteConnectionManager>,
    namespace: String,
}

impl SqliteLocalStore {
    /// Opens (or creates) the database at `path` and binds the store to `namespace`.
    pub fn new(path: &str, namespace: &str) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path)
            .with_flags(
                OpenFlags::SQLITE_OPEN_READ_WRITE |
                    OpenFlags::SQLITE_OPEN_CREATE |
                    OpenFlags::SQLITE_OPEN_URI
            )
            .with_init(|c| {
                c.busy_timeout(std::time::Duration::from_millis(500))?;
                c.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
                c.execute_batch(
                    "CREATE TABLE IF NOT EXISTS local_storage (
                        namespace TEXT NOT NULL,
                        key TEXT NOT NULL,
                        value TEXT NOT NULL,
                        updated_at INTEGER NOT NULL DEFAULT (strftime('%s','now')),
                        PRIMARY KEY(namespace, key)
                    );"
                )?;
                Ok(())
            });

        let pool = Pool::builder()
            .max_size(4)
            .connection_timeout(std::time::Duration::from_secs(5))
            .build(manager)?;

        log::debug!("opened sqlite local store {path} (namespace '{namespace}')");

        Ok(Self { pool, namespace: namespace.to_string() })
    }

    /// Returns another area backed by the same database under a different namespace.
    pub fn namespace(&self, namespace: &str) -> Self {
        Self { pool: self.pool.clone(), namespace: namespace.to_string() }
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }
}

impl StorageArea for SqliteLocalStore {
    fn get_item(&self, key: &str) -> Option<String> {
        let conn = self.conn().ok()?;
        conn.query_row(
            "SELECT value FROM local_storage WHERE namespace=?1 AND key=?2",
            params![self.namespace, key],
            |row| row.get::<_, String>(0),
        ).ok()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO local_storage(namespace,key,value) VALUES (?1,?2,?3)
             ON CONFLICT(namespace,key) DO UPDATE
             SET value=excluded.value, updated_at=strftime('%s','now')",
            params![self.namespace, key, value],
        )?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "DELETE FROM local_storage WHERE namespace=?1 AND key=?2",
            params![self.namespace, key],
        )?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "DELETE FROM local_storage WHERE namespace=?1",
            params![self.namespace],
        )?;
        Ok(())
    }

    fn len(&self) -> usize {
        let conn = match self.conn() { Ok(c) => c, Err(_) => return 0 };
        conn.query_row::<u32, _, _>(
            "SELECT COUNT(*) FROM local_storage WHERE namespace=?1",
            params![self.namespace],
            |row| row.get(0),
        ).unwrap_or(0) as usize
    }

    fn keys(&self) -> Vec<String> {
        let conn = match self.conn() { Ok(c) => c, Err(_) => return vec![] };
        let mut stmt = match conn.prepare(
            "SELECT key FROM local_storage WHERE namespace=?1 ORDER BY key",
        ) { Ok(s) => s, Err(_) => return vec![] };

        let rows = match stmt.query_map(
            params![self.namespace],
            |row| row.get::<_, String>(0),
        ) { Ok(r) => r, Err(_) => return vec![] };

        rows.filter_map(|r| r.ok()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(dir: &tempfile::TempDir, ns: &str) -> SqliteLocalStore {
        let path = dir.path().join("local.db");
        SqliteLocalStore::new(path.to_str().unwrap(), ns).unwrap()
    }

    #[test]
    fn area_contract() {
        let dir = tempfile::tempdir().unwrap();
        let area = open(&dir, "app");

        assert_eq!(area.len(), 0);
        assert!(area.get_item("missing").is_none());

        area.set_item("b", "2").unwrap();
        area.set_item("a", "1").unwrap();
        area.set_item("a", "ONE").unwrap();
        assert_eq!(area.len(), 2);
        assert_eq!(area.get_item("a").as_deref(), Some("ONE"));
        assert_eq!(area.keys(), vec!["a", "b"]);

        area.remove_item("b").unwrap();
        assert!(area.get_item("b").is_none());

        area.clear().unwrap();
        assert_eq!(area.len(), 0);
    }

    #[test]
    fn data_survives_reopening() {
        let dir = tempfile::tempdir().unwrap();
        {
            let area = open(&dir, "app");
            area.set_item("theme", "dark").unwrap();
        }

        let area = open(&dir, "app");
        assert_eq!(area.get_item("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn namespaces_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let a = open(&dir, "a");
        let b = a.namespace("b");

        a.set_item("k", "v").unwrap();
        assert!(b.get_item("k").is_none());
        assert_eq!(b.len(), 0);

        b.clear().unwrap();
        assert_eq!(a.get_item("k").as_deref(), Some("v"));
    }
}
