//! Staging store abstraction and conversation assembly.

use crate::{
    conversation::{Conversation, Turn},
    fragment::{Fragment, FragmentKind, Role},
};
use anyhow::Result;

/// Durable per-session fragment staging.
///
/// Implementations assign sequence numbers from a per-session counter and
/// are read-after-write consistent.
pub trait Staging: Send + Sync {
    /// Append a fragment and return it with its assigned sequence number.
    fn append(
        &self,
        session: &str,
        kind: FragmentKind,
        role: Option<Role>,
        content: &str,
    ) -> Result<Fragment>;

    /// Every fragment of a session, ordered by sequence.
    fn fragments(&self, session: &str) -> Result<Vec<Fragment>>;

    /// Remove fragments with `sequence <= through`, or all of them when
    /// `through` is `None`. Returns the number of removed fragments.
    fn clear(&self, session: &str, through: Option<u64>) -> Result<usize>;
}

/// A conversation read back from the staging store.
#[derive(Debug, Clone, Default)]
pub struct Staged {
    /// The assembled conversation.
    pub conversation: Conversation,
    /// Credential staged in the session, if any.
    pub api_key: Option<String>,
    /// Highest sequence observed; clearing through it leaves later writes.
    pub high_water: u64,
}

impl Staged {
    /// Whether nothing at all was staged.
    pub fn is_empty(&self) -> bool {
        self.high_water == 0
    }
}

/// Assemble the staged conversation of a session from one snapshot.
///
/// Scalars resolve to their most recent value and messages replay in
/// sequence order. Numeric scalars that fail to parse are dropped.
pub fn assemble<S: Staging + ?Sized>(store: &S, session: &str) -> Result<Staged> {
    let fragments = store.fragments(session)?;
    let high_water = fragments.iter().map(|f| f.sequence).max().unwrap_or(0);
    let latest = |kind: FragmentKind| {
        fragments
            .iter()
            .rev()
            .find(|f| f.kind == kind)
            .map(|f| f.content.clone())
            .filter(|c| !c.is_empty())
    };

    let model = latest(FragmentKind::ModelToUse).unwrap_or_default();
    let system_instruction = latest(FragmentKind::SystemInstruction).unwrap_or_default();
    let turns = fragments
        .iter()
        .filter(|f| f.kind == FragmentKind::Message)
        .filter_map(|f| match f.role {
            Some(role) => Some(Turn {
                role,
                content: f.content.clone(),
            }),
            None => {
                tracing::warn!(session, sequence = f.sequence, "message fragment without role");
                None
            }
        })
        .collect::<Vec<_>>();
    let temperature = latest(FragmentKind::Temperature).and_then(|v| parse_float(session, "temperature", &v));
    let top_p = latest(FragmentKind::TopP).and_then(|v| parse_float(session, "top_p", &v));
    let api_key = latest(FragmentKind::ApiKey);

    tracing::debug!(
        session,
        high_water,
        turns = turns.len(),
        model = %model,
        "assembled staged conversation"
    );

    Ok(Staged {
        conversation: Conversation {
            model,
            system_instruction,
            turns,
            temperature,
            top_p,
            ..Default::default()
        },
        api_key,
        high_water,
    })
}

fn parse_float(session: &str, field: &str, raw: &str) -> Option<f64> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => {
            tracing::warn!(session, field, value = raw, "ignoring non-numeric sampling value");
            None
        }
    }
}
