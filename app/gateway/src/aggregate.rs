//! Incremental fragment staging and the completion cycle.
//!
//! Callers describe a conversation one field per request. An empty body
//! signals completion: the session is read back after a quiescence delay,
//! dispatched, and cleared through the highest sequence that was read.

use crate::{
    error::ApiError,
    router::resolve,
    state::{AppState, InFlight},
};
use anyhow::anyhow;
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
};
use rcore::{FragmentKind, ProviderKind, Role, Staging, assemble};
use serde_json::{Map, Value, json};
use std::time::Duration;

/// A validated fragment waiting to be appended.
#[derive(Debug, Clone, PartialEq)]
pub struct Pending {
    /// Fragment kind.
    pub kind: FragmentKind,
    /// Turn author, for messages.
    pub role: Option<Role>,
    /// Stored text.
    pub content: String,
}

/// The stored text of a field, or `None` when the field counts as absent.
///
/// Null, `false` and the empty string are absent. Numbers keep their JSON
/// text, so `0` is present. `true` carries no text and is rejected.
pub fn present(field: &str, value: Option<&Value>) -> Result<Option<String>, ApiError> {
    Ok(match value {
        None | Some(Value::Null | Value::Bool(false)) => None,
        Some(Value::Bool(true)) => {
            return Err(ApiError::bad_request(format!("{field} must not be a boolean")));
        }
        Some(Value::String(s)) if s.is_empty() => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    })
}

/// Collect the fragments a request body describes.
///
/// Scalars come first in [`FragmentKind::SCALARS`] order, then the message.
/// A message needs both `role` and `content`.
pub fn collect(fields: &Map<String, Value>) -> Result<Vec<Pending>, ApiError> {
    let mut pending = Vec::new();
    for kind in FragmentKind::SCALARS {
        if let Some(content) = present(kind.as_str(), fields.get(kind.as_str()))? {
            pending.push(Pending {
                kind,
                role: None,
                content,
            });
        }
    }

    let role = present("role", fields.get("role"))?;
    let content = present("content", fields.get("content"))?;
    if let (Some(role), Some(content)) = (role, content) {
        pending.push(message(&role, content)?);
    }
    Ok(pending)
}

fn message(role: &str, content: String) -> Result<Pending, ApiError> {
    let role = Role::parse(role).ok_or_else(|| ApiError::bad_request(format!("unknown role: {role}")))?;
    Ok(Pending {
        kind: FragmentKind::Message,
        role: Some(role),
        content,
    })
}

/// Collect the `messages` array of a batch body.
fn collect_messages(fields: &Map<String, Value>) -> Result<Vec<Pending>, ApiError> {
    let Some(messages) = fields.get("messages") else {
        return Ok(Vec::new());
    };
    let Value::Array(messages) = messages else {
        return Err(ApiError::bad_request("messages must be an array"));
    };

    messages
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let role = present("role", m.get("role"))?
                .ok_or_else(|| ApiError::bad_request(format!("messages[{i}]: missing role")))?;
            let content = present("content", m.get("content"))?
                .ok_or_else(|| ApiError::bad_request(format!("messages[{i}]: missing content")))?;
            message(&role, content)
        })
        .collect()
}

fn write<S: Staging + ?Sized>(
    store: &S,
    kind: ProviderKind,
    pending: &[Pending],
) -> anyhow::Result<()> {
    for p in pending {
        let fragment = store.append(kind.session(), p.kind, p.role, &p.content)?;
        tracing::debug!(
            provider = %kind,
            kind = %fragment.kind,
            sequence = fragment.sequence,
            "fragment staged"
        );
    }
    Ok(())
}

/// Parse a request body. `None` is the completion signal.
fn parse_body(body: &[u8]) -> Result<Option<Map<String, Value>>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::bad_request(format!("invalid JSON body: {e}")))?;
    match value {
        Value::Object(map) if map.is_empty() => Ok(None),
        Value::Array(items) if items.is_empty() => Ok(None),
        Value::Object(map) => Ok(Some(map)),
        _ => Err(ApiError::bad_request("request body must be a JSON object")),
    }
}

/// `POST /{provider}`: stage fields, or run a completion on an empty body.
pub async fn post(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let kind = resolve(&provider)?;
    let Some(fields) = parse_body(&body)? else {
        let guard = state.begin(kind)?;
        tracing::info!(provider = %kind, "completion signal");
        let delay = state.quiescence;
        return complete(state, kind, guard, delay).await.map(Json);
    };

    let pending = collect(&fields)?;
    if pending.is_empty() {
        let names: Vec<&str> = fields.keys().map(String::as_str).collect();
        tracing::warn!(provider = %kind, ?names, "no recognized fields in body");
    }
    write(&*state.store, kind, &pending)?;
    Ok(Json(json!({})))
}

/// `POST /{provider}/batch`: stage every fragment and complete in one call.
pub async fn batch(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let kind = resolve(&provider)?;
    let fields = parse_body(&body)?.unwrap_or_default();

    let mut pending = collect(&fields)?;
    pending.extend(collect_messages(&fields)?);

    let guard = state.begin(kind)?;
    tracing::info!(provider = %kind, fragments = pending.len(), "batch completion");
    if let Err(e) = write(&*state.store, kind, &pending) {
        discard(&state, kind, None);
        return Err(e.into());
    }
    complete(state, kind, guard, Duration::ZERO).await.map(Json)
}

/// `GET /{provider}/clear`: purge the staged session.
pub async fn clear(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let kind = resolve(&provider)?;
    let removed = state.store.clear(kind.session(), None)?;
    tracing::info!(provider = %kind, removed, "session cleared");
    Ok(Json(json!({})))
}

/// Run one completion cycle on a spawned task.
///
/// The task owns the in-flight guard, so a dropped caller neither aborts the
/// cycle nor leaves the session claimed.
async fn complete(
    state: AppState,
    kind: ProviderKind,
    guard: InFlight,
    delay: Duration,
) -> Result<Value, ApiError> {
    let worker = state.clone();
    let task = tokio::spawn(async move {
        let _guard = guard;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        cycle(&worker, kind).await
    });

    match task.await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(provider = %kind, "completion task failed: {e}");
            discard(&state, kind, None);
            Err(ApiError::Internal(anyhow!("completion task failed: {e}")))
        }
    }
}

async fn cycle(state: &AppState, kind: ProviderKind) -> Result<Value, ApiError> {
    let staged = match assemble(&*state.store, kind.session()) {
        Ok(staged) => staged,
        Err(e) => {
            discard(state, kind, None);
            return Err(e.into());
        }
    };
    tracing::debug!(
        provider = %kind,
        high_water = staged.high_water,
        turns = staged.conversation.turns.len(),
        "session assembled"
    );

    let result = if staged.conversation.model.is_empty() {
        Err(ApiError::MissingConfig("model"))
    } else {
        let credential = state.credential(kind, staged.api_key.clone());
        Ok(state
            .dispatcher
            .complete(kind, &staged.conversation, credential.as_deref())
            .await)
    };

    if !staged.is_empty() {
        discard(state, kind, Some(staged.high_water));
    }
    result
}

/// Clear a session after a cycle. Failures are logged, never surfaced.
fn discard(state: &AppState, kind: ProviderKind, through: Option<u64>) {
    match state.store.clear(kind.session(), through) {
        Ok(removed) => tracing::debug!(provider = %kind, removed, "session cleared"),
        Err(e) => tracing::error!(provider = %kind, "failed to clear session: {e:#}"),
    }
}
