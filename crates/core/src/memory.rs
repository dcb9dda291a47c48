//! In-memory implementation of the store traits.

use crate::{
    conversation::Document,
    fragment::{Fragment, FragmentKind, Role},
    staging::Staging,
    workspace::{ConfigKey, Workspace},
};
use anyhow::Result;
use parking_lot::Mutex;
use std::collections::BTreeMap;

#[derive(Default, Debug)]
struct Session {
    next: u64,
    fragments: Vec<Fragment>,
    settings: BTreeMap<&'static str, (i64, String)>,
    documents: Vec<(i64, Document)>,
}

/// In-memory store backed by `Mutex<BTreeMap<String, Session>>`.
///
/// Sequence counters survive [`Staging::clear`], matching the SQLite store.
#[derive(Default, Debug)]
pub struct InMemory {
    sessions: Mutex<BTreeMap<String, Session>>,
    rows: Mutex<i64>,
}

impl InMemory {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn next_row(&self) -> i64 {
        let mut rows = self.rows.lock();
        *rows += 1;
        *rows
    }
}

impl Staging for InMemory {
    fn append(
        &self,
        session: &str,
        kind: FragmentKind,
        role: Option<Role>,
        content: &str,
    ) -> Result<Fragment> {
        let mut sessions = self.sessions.lock();
        let state = sessions.entry(session.to_owned()).or_default();
        state.next += 1;
        let fragment = Fragment {
            kind,
            sequence: state.next,
            role,
            content: content.to_owned(),
        };
        state.fragments.push(fragment.clone());
        Ok(fragment)
    }

    fn fragments(&self, session: &str) -> Result<Vec<Fragment>> {
        Ok(self
            .sessions
            .lock()
            .get(session)
            .map(|s| s.fragments.clone())
            .unwrap_or_default())
    }

    fn clear(&self, session: &str, through: Option<u64>) -> Result<usize> {
        let mut sessions = self.sessions.lock();
        let Some(state) = sessions.get_mut(session) else {
            return Ok(0);
        };
        let before = state.fragments.len();
        match through {
            Some(hw) => state.fragments.retain(|f| f.sequence > hw),
            None => state.fragments.clear(),
        }
        Ok(before - state.fragments.len())
    }
}

impl Workspace for InMemory {
    fn set(&self, session: &str, key: ConfigKey, value: &str) -> Result<i64> {
        let row = self.next_row();
        self.sessions
            .lock()
            .entry(session.to_owned())
            .or_default()
            .settings
            .insert(key.as_str(), (row, value.to_owned()));
        Ok(row)
    }

    fn get(&self, session: &str, key: ConfigKey) -> Result<Option<String>> {
        Ok(self
            .sessions
            .lock()
            .get(session)
            .and_then(|s| s.settings.get(key.as_str()))
            .map(|(_, v)| v.clone()))
    }

    fn add_document(&self, session: &str, path: &str, content: &str) -> Result<i64> {
        let row = self.next_row();
        self.sessions
            .lock()
            .entry(session.to_owned())
            .or_default()
            .documents
            .push((
                row,
                Document {
                    path: path.to_owned(),
                    content: content.to_owned(),
                },
            ));
        Ok(row)
    }

    fn documents(&self, session: &str) -> Result<Vec<Document>> {
        Ok(self
            .sessions
            .lock()
            .get(session)
            .map(|s| s.documents.iter().map(|(_, d)| d.clone()).collect())
            .unwrap_or_default())
    }

    fn reset(&self, session: &str) -> Result<()> {
        if let Some(state) = self.sessions.lock().get_mut(session) {
            state.settings.clear();
            state.documents.clear();
        }
        Ok(())
    }
}
