//! Project workspace endpoint.
//!
//! Settings and documents persist per provider; a prompt builds the project
//! scaffold from them and dispatches synchronously.

use crate::{error::ApiError, router::resolve, state::AppState};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
};
use rcore::{ConfigKey, Conversation, ProviderKind, Workspace};
use serde::Deserialize;
use serde_json::{Value, json};

/// Body of `POST /{provider}/project`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProjectRequest {
    /// `api key`, `system instructions`, `model`, `file` or `prompt`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Setting value or prompt text.
    pub text: Option<String>,
    /// Document path, for `file`.
    pub filename: Option<String>,
    /// Document content, for `file`.
    pub content: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn stored(what: &str, row_id: i64) -> Json<Value> {
    Json(json!({
        "message": format!("{what} stored successfully"),
        "rowId": row_id,
    }))
}

/// `POST /{provider}/project`.
pub async fn post(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let kind = resolve(&provider)?;
    let request: ProjectRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request(format!("invalid JSON body: {e}")))?;
    let session = kind.session();
    let store = &*state.store;

    match request.kind.as_str() {
        "file" => {
            let (Some(path), Some(content)) =
                (non_empty(request.filename), non_empty(request.content))
            else {
                return Err(ApiError::bad_request("Missing filename or content for file"));
            };
            let row_id = store.add_document(session, &path, &content)?;
            tracing::info!(provider = %kind, %path, row_id, "project document stored");
            Ok(stored("File data", row_id))
        }
        "prompt" => {
            let text = non_empty(request.text)
                .ok_or_else(|| ApiError::bad_request("Missing text field for prompt"))?;
            store.set(session, ConfigKey::Prompt, &text)?;
            prompt(&state, kind, text).await.map(Json)
        }
        label => {
            let key = match label.parse::<ConfigKey>() {
                Ok(key @ (ConfigKey::ApiKey | ConfigKey::SystemInstructions | ConfigKey::Model)) => key,
                _ => return Err(ApiError::bad_request(format!("Invalid type specified: {label}"))),
            };
            let text = non_empty(request.text)
                .ok_or_else(|| ApiError::bad_request(format!("Missing text field for {key}")))?;
            if key == ConfigKey::ApiKey {
                store.reset(session)?;
                tracing::info!(provider = %kind, "project workspace reset");
            }
            let row_id = store.set(session, key, &text)?;
            Ok(stored(key.as_str(), row_id))
        }
    }
}

async fn prompt(state: &AppState, kind: ProviderKind, text: String) -> Result<Value, ApiError> {
    let session = kind.session();
    let store = &*state.store;

    let api_key = state
        .credential(kind, store.get(session, ConfigKey::ApiKey)?)
        .ok_or_else(|| ApiError::bad_request("API key not set"))?;
    let model = non_empty(store.get(session, ConfigKey::Model)?)
        .ok_or_else(|| ApiError::bad_request("Model not set"))?;
    let instructions = store
        .get(session, ConfigKey::SystemInstructions)?
        .map(|s| s.trim().to_owned())
        .unwrap_or_default();
    let documents = store.documents(session)?;

    tracing::info!(
        provider = %kind,
        %model,
        documents = documents.len(),
        "project prompt"
    );
    let conv = Conversation::project(model, instructions, documents, Some(text));
    Ok(state.dispatcher.complete(kind, &conv, Some(&api_key)).await)
}
