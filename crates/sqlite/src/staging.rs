//! Staging trait implementation for SqliteStore.

use crate::{SqliteStore, sql};
use anyhow::{Context, Result};
use rcore::{Fragment, FragmentKind, Role, Staging};
use rusqlite::params;

impl Staging for SqliteStore {
    fn append(
        &self,
        session: &str,
        kind: FragmentKind,
        role: Option<Role>,
        content: &str,
    ) -> Result<Fragment> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let sequence: i64 = tx.query_row(sql::NEXT_SEQUENCE, [session], |row| row.get(0))?;
        tx.execute(
            sql::INSERT_FRAGMENT,
            params![session, sequence, kind.as_str(), role.map(|r| r.as_str()), content],
        )?;
        tx.commit()?;

        Ok(Fragment {
            kind,
            sequence: sequence as u64,
            role,
            content: content.to_owned(),
        })
    }

    fn fragments(&self, session: &str) -> Result<Vec<Fragment>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(sql::SELECT_FRAGMENTS)?;
        let rows = stmt
            .query_map([session], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(kind, sequence, role, content)| -> Result<Fragment> {
                let role = match role {
                    Some(label) => Some(
                        Role::parse(&label).with_context(|| format!("stored role {label:?}"))?,
                    ),
                    None => None,
                };
                Ok(Fragment {
                    kind: kind.parse()?,
                    sequence: sequence as u64,
                    role,
                    content,
                })
            })
            .collect()
    }

    fn clear(&self, session: &str, through: Option<u64>) -> Result<usize> {
        let conn = self.conn.lock();
        let removed = match through {
            Some(hw) => conn.execute(sql::DELETE_FRAGMENTS_THROUGH, params![session, hw as i64])?,
            None => conn.execute(sql::DELETE_FRAGMENTS, [session])?,
        };
        Ok(removed)
    }
}
