//! Workspace trait implementation for SqliteStore.

use crate::{SqliteStore, sql};
use anyhow::Result;
use rcore::{ConfigKey, Document, Workspace};
use rusqlite::{OptionalExtension, params};

impl Workspace for SqliteStore {
    fn set(&self, session: &str, key: ConfigKey, value: &str) -> Result<i64> {
        let conn = self.conn.lock();
        let id = conn.query_row(
            sql::UPSERT_SETTING,
            params![session, key.as_str(), value],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    fn get(&self, session: &str, key: ConfigKey) -> Result<Option<String>> {
        let conn = self.conn.lock();
        let value = conn
            .query_row(sql::SELECT_SETTING, params![session, key.as_str()], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn add_document(&self, session: &str, path: &str, content: &str) -> Result<i64> {
        let conn = self.conn.lock();
        let id = conn.query_row(
            sql::INSERT_DOCUMENT,
            params![session, path, content],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    fn documents(&self, session: &str) -> Result<Vec<Document>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(sql::SELECT_DOCUMENTS)?;
        let docs = stmt
            .query_map([session], |row| {
                Ok(Document {
                    path: row.get(0)?,
                    content: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(docs)
    }

    fn reset(&self, session: &str) -> Result<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        tx.execute(sql::DELETE_SETTINGS, [session])?;
        tx.execute(sql::DELETE_DOCUMENTS, [session])?;
        tx.commit()?;
        Ok(())
    }
}
