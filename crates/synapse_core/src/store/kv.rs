//! String-keyed durable entries.
//!
//! This is the storage seam for everything the capture client keeps locally.
//! `SqliteKvStore` is the production backend; `MemoryKvStore` backs tests and
//! throwaway sessions.

use super::StoreResult;
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::RefCell;
use std::collections::BTreeMap;

/// Minimal key-value contract.
pub trait KvStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
    fn remove(&self, key: &str) -> StoreResult<()>;
}

impl<K: KvStore + ?Sized> KvStore for &K {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        (**self).remove(key)
    }
}

/// SQLite-backed entries in the `kv_entries` table.
///
/// Borrows a migrated connection from [`crate::db::open_db`].
#[derive(Clone, Copy)]
pub struct SqliteKvStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKvStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl KvStore for SqliteKvStore<'_> {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.conn.execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(())
    }
}

/// Process-local entries.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{KvStore, MemoryKvStore, SqliteKvStore};
    use crate::db::open_db_in_memory;

    #[test]
    fn sqlite_store_upserts_and_removes() {
        let conn = open_db_in_memory().expect("in-memory db should open");
        let kv = SqliteKvStore::new(&conn);

        assert_eq!(kv.get("missing").expect("get should succeed"), None);
        kv.set("k", "one").expect("insert should succeed");
        kv.set("k", "two").expect("upsert should succeed");
        assert_eq!(kv.get("k").expect("get").as_deref(), Some("two"));

        kv.remove("k").expect("remove should succeed");
        assert_eq!(kv.get("k").expect("get"), None);
    }

    #[test]
    fn references_share_the_same_entries() {
        let kv = MemoryKvStore::new();
        let first = &kv;
        let second = &kv;
        first.set("a", "1").expect("set");
        assert_eq!(second.get("a").expect("get").as_deref(), Some("1"));
        assert_eq!(kv.len(), 1);
    }
}
