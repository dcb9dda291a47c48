//! Gateway integration tests against a local fake provider.

use axum::{
    Json, Router,
    http::{HeaderMap, Uri},
};
use model::{DEFAULT_TIMEOUT, Dispatcher};
use rcore::{ConfigKey, FragmentKind, PROCEED_PROMPT, ProviderKind, Staging, Workspace};
use relay_gateway::{AppState, ServeHandle, StoreBackend, serve_with_state};
use serde_json::{Value, json};
use std::{
    collections::BTreeMap,
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Duration,
};

#[derive(Clone, Debug)]
struct Captured {
    uri: String,
    headers: HeaderMap,
    body: Value,
}

type Seen = Arc<Mutex<Vec<Captured>>>;

/// Reply `reply` to every request after `delay`; record what arrived.
async fn upstream(reply: Value, delay: Duration) -> (String, Seen) {
    let seen: Seen = Arc::default();
    let log = seen.clone();
    let app = Router::new().fallback(move |uri: Uri, headers: HeaderMap, Json(body): Json<Value>| {
        let log = log.clone();
        let reply = reply.clone();
        async move {
            log.lock().unwrap().push(Captured {
                uri: uri.to_string(),
                headers,
                body,
            });
            tokio::time::sleep(delay).await;
            Json(reply)
        }
    });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), seen)
}

struct Harness {
    base: String,
    seen: Seen,
    store: Arc<StoreBackend>,
    client: reqwest::Client,
    handle: ServeHandle,
}

struct Options {
    reply: Value,
    upstream_delay: Duration,
    quiescence: Duration,
    credentials: BTreeMap<ProviderKind, String>,
    sqlite: Option<PathBuf>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            reply: json!({ "ok": true }),
            upstream_delay: Duration::ZERO,
            quiescence: Duration::ZERO,
            credentials: ProviderKind::ALL
                .into_iter()
                .map(|kind| (kind, format!("configured-{kind}")))
                .collect(),
            sqlite: None,
        }
    }
}

async fn start(options: Options) -> Harness {
    let (upstream_base, seen) = upstream(options.reply, options.upstream_delay).await;
    let mut dispatcher = Dispatcher::new(DEFAULT_TIMEOUT).unwrap();
    for kind in ProviderKind::ALL {
        let endpoint = match kind {
            ProviderKind::Gemini => format!("{upstream_base}/gemini/{{model}}"),
            other => format!("{upstream_base}/{other}"),
        };
        dispatcher = dispatcher.with_endpoint(kind, endpoint);
    }

    let store = match &options.sqlite {
        Some(path) => StoreBackend::sqlite(path).unwrap(),
        None => StoreBackend::in_memory(),
    };
    let state = AppState::new(store, dispatcher)
        .with_credentials(options.credentials)
        .with_quiescence(options.quiescence);
    let store = state.store.clone();
    let handle = serve_with_state(state, "127.0.0.1:0").await.unwrap();

    Harness {
        base: format!("http://127.0.0.1:{}", handle.port),
        seen,
        store,
        client: reqwest::Client::new(),
        handle,
    }
}

impl Harness {
    async fn post(&self, path: &str, body: Value) -> (u16, Value) {
        let resp = self
            .client
            .post(format!("{}{path}", self.base))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    /// Completion signal with no body at all.
    async fn complete(&self, path: &str) -> (u16, Value) {
        let resp = self
            .client
            .post(format!("{}{path}", self.base))
            .send()
            .await
            .unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    fn calls(&self) -> Vec<Captured> {
        self.seen.lock().unwrap().clone()
    }
}

#[tokio::test]
async fn greeting() {
    let h = start(Options::default()).await;
    let resp = h.client.get(format!("{}/", h.base)).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert!(!resp.text().await.unwrap().is_empty());
    h.handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn incremental_flow_dispatches_and_clears() {
    let h = start(Options::default()).await;

    let (status, body) = h
        .post(
            "/openai",
            json!({ "system_instruction": "be brief", "model_to_use": "gpt-4o", "temperature": 0.7 }),
        )
        .await;
    assert_eq!((status, body), (200, json!({})));
    assert_eq!(
        h.post("/openai", json!({ "role": "user", "content": "hi" })).await,
        (200, json!({}))
    );
    assert!(h.calls().is_empty(), "writes never dispatch");

    let (status, body) = h.post("/openai", json!({})).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({ "ok": true }));

    let calls = h.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].uri, "/openai");
    assert_eq!(calls[0].headers["authorization"], "Bearer configured-openai");
    assert_eq!(
        calls[0].body,
        json!({
            "model": "gpt-4o",
            "messages": [
                { "role": "system", "content": "be brief" },
                { "role": "user", "content": "hi" },
            ],
            "temperature": 0.7,
            "top_p": 0.1,
        })
    );
    assert!(h.store.fragments("openai").unwrap().is_empty());
    h.handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn absent_values_are_not_staged() {
    let h = start(Options::default()).await;
    h.post(
        "/anthropic",
        json!({ "system_instruction": "", "model_to_use": null, "api_key": false, "top_p": 0 }),
    )
    .await;
    let fragments = h.store.fragments("anthropic").unwrap();
    assert_eq!(fragments.len(), 1);
    assert_eq!(fragments[0].kind, FragmentKind::TopP);
    assert_eq!(fragments[0].content, "0");

    // role without content is not a message
    h.post("/anthropic", json!({ "role": "user" })).await;
    assert_eq!(h.store.fragments("anthropic").unwrap().len(), 1);
    h.handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn unrecognized_fields_are_acknowledged() {
    let h = start(Options::default()).await;
    assert_eq!(
        h.post("/openai", json!({ "colour": "blue" })).await,
        (200, json!({}))
    );
    assert!(h.store.fragments("openai").unwrap().is_empty());
    h.handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn unknown_role_is_rejected() {
    let h = start(Options::default()).await;
    let (status, body) = h
        .post("/openai", json!({ "role": "narrator", "content": "x" }))
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "unknown role: narrator");
    assert!(h.store.fragments("openai").unwrap().is_empty());
    h.handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn unknown_provider_is_404() {
    let h = start(Options::default()).await;
    let (status, body) = h.post("/mistral", json!({ "model_to_use": "m" })).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "unknown provider: mistral");
    h.handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn missing_model_is_400_and_session_cleared() {
    let h = start(Options::default()).await;
    h.post("/gemini", json!({ "role": "user", "content": "hi" }))
        .await;

    let (status, body) = h.complete("/gemini").await;
    assert_eq!(status, 400);
    assert_eq!(body, json!({ "error": "configuration missing: model" }));
    assert!(h.calls().is_empty());
    assert!(h.store.fragments("gemini").unwrap().is_empty());
    h.handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn disabled_model_never_dispatches() {
    let h = start(Options::default()).await;
    h.post("/chatgpt", json!({ "model_to_use": "disabled" }))
        .await;
    let (status, body) = h.complete("/chatgpt").await;
    assert_eq!(status, 200);
    assert_eq!(body["model"], "disabled");
    assert_eq!(
        body["choices"][0]["message"]["content"],
        "This model is currently disabled."
    );
    assert!(h.calls().is_empty());
    h.handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn staged_key_wins_over_configured() {
    let h = start(Options::default()).await;
    h.post(
        "/anthropic",
        json!({ "model_to_use": "claude-3-5-haiku", "api_key": "staged-key", "role": "user", "content": "hi" }),
    )
    .await;
    h.complete("/anthropic").await;

    let calls = h.calls();
    assert_eq!(calls[0].headers["x-api-key"], "staged-key");
    assert_eq!(calls[0].body["messages"], json!([{ "role": "user", "content": "hi" }]));
    h.handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn missing_credential_is_normalized_error() {
    let h = start(Options {
        credentials: BTreeMap::new(),
        ..Default::default()
    })
    .await;
    h.post("/github", json!({ "model_to_use": "openai/gpt-4.1" }))
        .await;
    let (status, body) = h.complete("/github").await;
    assert_eq!(status, 200);
    let text = body["choices"][0]["message"]["content"].as_str().unwrap();
    assert!(text.starts_with("GitHub Models API Error: credential missing"));
    assert!(h.calls().is_empty());
    h.handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn gemini_alias_routes_model_into_url() {
    let h = start(Options::default()).await;
    h.post(
        "/googleai",
        json!({ "model_to_use": "gemini-2.5-pro", "role": "model", "content": "hello" }),
    )
    .await;
    h.complete("/googleai").await;

    let calls = h.calls();
    assert_eq!(calls[0].uri, "/gemini/gemini-2.5-pro");
    assert_eq!(calls[0].headers["x-goog-api-key"], "configured-gemini");
    let contents = calls[0].body["contents"].as_array().unwrap();
    assert_eq!(contents[0]["role"], "model");
    assert_eq!(contents[1]["parts"][0]["text"], PROCEED_PROMPT);
    h.handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn batch_matches_incremental_payload() {
    let h = start(Options::default()).await;
    let fields = json!({
        "system_instruction": "sys",
        "model_to_use": "gpt-4.1",
        "temperature": 0.3,
    });

    h.post("/openai", fields.clone()).await;
    h.post("/openai", json!({ "role": "user", "content": "A" }))
        .await;
    h.post("/openai", json!({ "role": "assistant", "content": "B" }))
        .await;
    h.post("/openai", json!({ "role": "user", "content": "C" }))
        .await;
    assert_eq!(h.complete("/openai").await.0, 200);

    let mut batch = fields;
    batch["messages"] = json!([
        { "role": "user", "content": "A" },
        { "role": "assistant", "content": "B" },
        { "role": "user", "content": "C" },
    ]);
    let (status, body) = h.post("/openai/batch", batch).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({ "ok": true }));

    let calls = h.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].body, calls[1].body);
    assert!(h.store.fragments("openai").unwrap().is_empty());
    h.handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn batch_rejects_malformed_messages() {
    let h = start(Options::default()).await;
    let (status, body) = h
        .post(
            "/openai/batch",
            json!({ "model_to_use": "gpt-4o", "messages": [{ "role": "user" }] }),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "messages[0]: missing content");

    let (status, _) = h
        .post("/openai/batch", json!({ "model_to_use": "gpt-4o", "messages": "hi" }))
        .await;
    assert_eq!(status, 400);
    assert!(h.store.fragments("openai").unwrap().is_empty());
    assert!(h.calls().is_empty());
    h.handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn second_completion_is_rejected_while_in_flight() {
    let h = start(Options {
        quiescence: Duration::from_millis(400),
        ..Default::default()
    })
    .await;
    h.post("/openai", json!({ "model_to_use": "gpt-4o", "role": "user", "content": "hi" }))
        .await;

    let client = h.client.clone();
    let url = format!("{}/openai", h.base);
    let first = tokio::spawn(async move { client.post(url).send().await.unwrap().status().as_u16() });

    tokio::time::sleep(Duration::from_millis(100)).await;
    let (status, body) = h.complete("/openai").await;
    assert_eq!(status, 409);
    assert!(body["error"].as_str().unwrap().contains("already in flight"));

    assert_eq!(first.await.unwrap(), 200);
    assert_eq!(h.calls().len(), 1);

    // the slot is released afterwards
    let (status, _) = h.complete("/openai").await;
    assert_eq!(status, 400);
    h.handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn writes_after_assembly_survive_the_clear() {
    let h = start(Options {
        upstream_delay: Duration::from_millis(400),
        ..Default::default()
    })
    .await;
    h.post("/openai", json!({ "model_to_use": "gpt-4o", "role": "user", "content": "one" }))
        .await;

    let client = h.client.clone();
    let url = format!("{}/openai", h.base);
    let first = tokio::spawn(async move { client.post(url).send().await.unwrap().status().as_u16() });

    tokio::time::sleep(Duration::from_millis(150)).await;
    h.post("/openai", json!({ "role": "user", "content": "two" }))
        .await;
    assert_eq!(first.await.unwrap(), 200);

    let remaining = h.store.fragments("openai").unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].content, "two");
    h.handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn clear_endpoint_purges_session() {
    let h = start(Options::default()).await;
    h.post("/responses", json!({ "model_to_use": "gpt-4.1", "role": "user", "content": "x" }))
        .await;
    let resp = h
        .client
        .get(format!("{}/responses/clear", h.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.json::<Value>().await.unwrap(), json!({}));
    assert!(h.store.fragments("responses").unwrap().is_empty());
    h.handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn project_flow_builds_scaffold() {
    let h = start(Options::default()).await;
    let path = "/anthropic/project";

    let (status, body) = h
        .post(path, json!({ "type": "api key", "text": "project-key" }))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "api key stored successfully");
    assert!(body["rowId"].is_i64());

    h.post(path, json!({ "type": "model", "text": "claude-3-5-haiku" }))
        .await;
    h.post(path, json!({ "type": "system instructions", "text": "review" }))
        .await;
    let (_, body) = h
        .post(
            path,
            json!({ "type": "file", "filename": "src/lib.rs", "content": "pub fn a() {}" }),
        )
        .await;
    assert_eq!(body["message"], "File data stored successfully");

    let (status, body) = h
        .post(path, json!({ "type": "prompt", "text": "what does a do?" }))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({ "ok": true }));

    let calls = h.calls();
    assert_eq!(calls[0].headers["x-api-key"], "project-key");
    let sent = &calls[0].body;
    assert_eq!(sent["system"], "review");
    let messages = sent["messages"].as_array().unwrap();
    assert_eq!(messages[0]["content"], "I need your help on this project.");
    assert_eq!(
        messages[1]["content"],
        "Please provide the content of the `src/lib.rs` file."
    );
    assert_eq!(messages[3]["content"], "What would you like to do next?");
    assert_eq!(
        messages[4],
        json!({ "role": "user", "content": "what does a do?" })
    );

    // workspace persists across prompts
    assert_eq!(h.store.documents("anthropic").unwrap().len(), 1);
    assert_eq!(
        h.store.get("anthropic", ConfigKey::Prompt).unwrap().as_deref(),
        Some("what does a do?")
    );
    h.handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn project_api_key_resets_workspace() {
    let h = start(Options::default()).await;
    let path = "/openai/project";
    h.post(path, json!({ "type": "model", "text": "gpt-4o" })).await;
    h.post(path, json!({ "type": "file", "filename": "a", "content": "b" }))
        .await;
    h.post(path, json!({ "type": "api key", "text": "k" })).await;

    assert!(h.store.get("openai", ConfigKey::Model).unwrap().is_none());
    assert!(h.store.documents("openai").unwrap().is_empty());
    assert_eq!(
        h.store.get("openai", ConfigKey::ApiKey).unwrap().as_deref(),
        Some("k")
    );
    h.handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn project_validation_errors() {
    let h = start(Options {
        credentials: BTreeMap::new(),
        ..Default::default()
    })
    .await;
    let path = "/gemini/project";

    let cases = [
        (json!({ "type": "model" }), "Missing text field for model"),
        (json!({ "type": "prompt", "text": "" }), "Missing text field for prompt"),
        (json!({ "type": "file", "filename": "a" }), "Missing filename or content for file"),
        (json!({ "type": "shell", "text": "ls" }), "Invalid type specified: shell"),
        (json!({ "type": "prompt", "text": "go" }), "API key not set"),
    ];
    for (body, expected) in cases {
        let (status, reply) = h.post(path, body).await;
        assert_eq!(status, 400, "{expected}");
        assert_eq!(reply["error"], expected);
    }

    h.post(path, json!({ "type": "api key", "text": "k" })).await;
    let (status, reply) = h.post(path, json!({ "type": "prompt", "text": "go" })).await;
    assert_eq!(status, 400);
    assert_eq!(reply["error"], "Model not set");
    assert!(h.calls().is_empty());
    h.handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn gemini_model_is_escaped_in_url() {
    let h = start(Options::default()).await;
    h.post(
        "/gemini",
        json!({ "model_to_use": "gemini-pro?alt=sse&x=y#frag", "role": "user", "content": "hi" }),
    )
    .await;
    assert_eq!(h.complete("/gemini").await.0, 200);
    assert_eq!(h.calls()[0].uri, "/gemini/gemini-pro%3Falt=sse&x=y%23frag");
    h.handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn boolean_true_is_rejected() {
    let h = start(Options::default()).await;
    let (status, body) = h
        .post("/openai", json!({ "model_to_use": "gpt-4o", "system_instruction": true }))
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "system_instruction must not be a boolean");
    assert!(h.store.fragments("openai").unwrap().is_empty());
    h.handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn writes_during_quiescence_are_assembled() {
    let h = start(Options {
        quiescence: Duration::from_millis(400),
        ..Default::default()
    })
    .await;
    h.post("/openai", json!({ "model_to_use": "gpt-4o", "role": "user", "content": "one" }))
        .await;

    let client = h.client.clone();
    let url = format!("{}/openai", h.base);
    let first = tokio::spawn(async move { client.post(url).send().await.unwrap().status().as_u16() });

    tokio::time::sleep(Duration::from_millis(100)).await;
    h.post("/openai", json!({ "role": "assistant", "content": "late" }))
        .await;
    assert_eq!(first.await.unwrap(), 200);

    let calls = h.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].body["messages"],
        json!([
            { "role": "user", "content": "one" },
            { "role": "assistant", "content": "late" },
            { "role": "user", "content": PROCEED_PROMPT },
        ])
    );
    assert!(h.store.fragments("openai").unwrap().is_empty());
    h.handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn unreadable_session_is_500_and_cleared() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("relay.db");
    let h = start(Options {
        sqlite: Some(path.clone()),
        ..Default::default()
    })
    .await;
    h.post("/openai", json!({ "model_to_use": "gpt-4o", "role": "user", "content": "hi" }))
        .await;

    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute(
        "INSERT INTO fragments (session, sequence, kind, role, content) \
         VALUES ('openai', 99, 'bogus', NULL, 'x')",
        [],
    )
    .unwrap();

    let (status, body) = h.complete("/openai").await;
    assert_eq!(status, 500);
    assert_eq!(body, json!({ "error": "internal error" }));
    assert!(h.calls().is_empty());

    let left: i64 = conn
        .query_row("SELECT COUNT(*) FROM fragments WHERE session = 'openai'", [], |r| r.get(0))
        .unwrap();
    assert_eq!(left, 0);
    h.handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn failed_batch_write_clears_partial_batch() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("relay.db");
    let h = start(Options {
        sqlite: Some(path.clone()),
        ..Default::default()
    })
    .await;

    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TRIGGER reject_boom BEFORE INSERT ON fragments \
         WHEN NEW.content = 'boom' BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
    )
    .unwrap();

    let (status, body) = h
        .post(
            "/openai/batch",
            json!({
                "model_to_use": "gpt-4o",
                "messages": [
                    { "role": "user", "content": "ok" },
                    { "role": "user", "content": "boom" },
                ],
            }),
        )
        .await;
    assert_eq!(status, 500);
    assert_eq!(body, json!({ "error": "internal error" }));
    assert!(h.store.fragments("openai").unwrap().is_empty());
    assert!(h.calls().is_empty());

    // the slot is released and the next round starts clean
    let (status, _) = h
        .post(
            "/openai/batch",
            json!({ "model_to_use": "gpt-4o", "messages": [{ "role": "user", "content": "ok" }] }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(
        h.calls()[0].body["messages"],
        json!([{ "role": "user", "content": "ok" }])
    );
    h.handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn project_blank_instructions_are_omitted() {
    let h = start(Options::default()).await;
    let path = "/anthropic/project";
    h.post(path, json!({ "type": "api key", "text": "k" })).await;
    h.post(path, json!({ "type": "model", "text": "claude-3-5-haiku" }))
        .await;
    h.post(path, json!({ "type": "system instructions", "text": "   " }))
        .await;
    let (status, _) = h.post(path, json!({ "type": "prompt", "text": "go" })).await;
    assert_eq!(status, 200);
    assert!(h.calls()[0].body.get("system").is_none());
    h.handle.shutdown().await.unwrap();
}
