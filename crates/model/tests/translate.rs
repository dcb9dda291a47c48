//! Tests for the per-provider body translators.

use rcore::{Conversation, Document, PROCEED_PROMPT, ProviderKind, Turn};
use relay_model::{openai::Family, translate};
use serde_json::{Value, json};

fn body(kind: ProviderKind, conv: &Conversation) -> Value {
    serde_json::to_value(translate(kind, conv)).unwrap()
}

fn staged(model: &str, system: &str, turns: Vec<Turn>) -> Conversation {
    Conversation {
        model: model.into(),
        system_instruction: system.into(),
        turns,
        ..Default::default()
    }
}

// --- anthropic ---

#[test]
fn anthropic_top_level_system_and_budget() {
    let conv = staged("claude-3-5-haiku", "be brief", vec![Turn::user("hi")]);
    let b = body(ProviderKind::Anthropic, &conv);
    assert_eq!(
        b,
        json!({
            "model": "claude-3-5-haiku",
            "max_tokens": 32000,
            "system": "be brief",
            "messages": [{ "role": "user", "content": "hi" }],
        })
    );
}

#[test]
fn anthropic_omits_empty_system_and_sampling() {
    let mut conv = staged("claude-sonnet-4-5", "", vec![Turn::user("hi")]);
    conv.temperature = Some(0.9);
    let b = body(ProviderKind::Anthropic, &conv);
    assert!(b.get("system").is_none());
    assert!(b.get("temperature").is_none());
    assert!(b.get("top_p").is_none());
}

#[test]
fn anthropic_appends_proceed_after_assistant() {
    let conv = staged("m", "", vec![Turn::user("A"), Turn::assistant("B")]);
    let b = body(ProviderKind::Anthropic, &conv);
    let messages = b["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[2], json!({ "role": "user", "content": PROCEED_PROMPT }));
}

// --- openai chat ---

#[test]
fn openai_standard_defaults_sampling() {
    let conv = staged("gpt-4o", "sys", vec![Turn::user("hi")]);
    let b = body(ProviderKind::OpenAiChat, &conv);
    assert_eq!(b["messages"][0], json!({ "role": "system", "content": "sys" }));
    assert_eq!(b["messages"][1], json!({ "role": "user", "content": "hi" }));
    assert_eq!(b["temperature"], json!(0.2));
    assert_eq!(b["top_p"], json!(0.1));
}

#[test]
fn openai_standard_uses_staged_sampling() {
    let mut conv = staged("gpt-4o", "", vec![Turn::user("hi")]);
    conv.temperature = Some(0.7);
    conv.top_p = Some(0.0);
    let b = body(ProviderKind::OpenAiChat, &conv);
    assert_eq!(b["temperature"], json!(0.7));
    assert_eq!(b["top_p"], json!(0.0));
    assert_eq!(b["messages"].as_array().unwrap().len(), 1);
}

#[test]
fn openai_reasoning_folds_instruction_into_last_message() {
    let conv = staged(
        "o3-mini",
        "S",
        vec![Turn::user("first"), Turn::assistant("ok"), Turn::user("Q")],
    );
    let b = body(ProviderKind::OpenAiChat, &conv);
    let messages = b["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 3);
    assert!(messages.iter().all(|m| m["role"] != "system"));
    assert_eq!(messages[2]["content"], "S\nQ");
    assert_eq!(messages[0]["content"], "first");
    assert!(b.get("temperature").is_none());
    assert!(b.get("top_p").is_none());
}

#[test]
fn openai_reasoning_folds_into_proceed_turn() {
    let conv = staged("o1", "S", vec![Turn::user("a"), Turn::assistant("b")]);
    let b = body(ProviderKind::OpenAiChat, &conv);
    assert_eq!(b["messages"][2]["content"], format!("S\n{PROCEED_PROMPT}"));
}

#[test]
fn openai_gpt5_family_keeps_system_without_sampling() {
    for model in ["gpt-5", "gpt-5-mini", "gpt-5-nano"] {
        let conv = staged(model, "sys", vec![Turn::user("hi")]);
        let b = body(ProviderKind::OpenAiChat, &conv);
        assert_eq!(b["messages"][0]["role"], "system", "model: {model}");
        assert!(b.get("temperature").is_none(), "model: {model}");
        assert!(b.get("top_p").is_none(), "model: {model}");
    }
}

#[test]
fn openai_family_detection() {
    assert_eq!(Family::detect("o4-mini"), Family::Reasoning);
    assert_eq!(Family::detect("gpt-5"), Family::FixedSampling);
    assert_eq!(Family::detect("gpt-5o"), Family::Standard);
    assert_eq!(Family::detect("gpt-4.1"), Family::Standard);
}

// --- responses ---

#[test]
fn responses_staged_single_turn_is_the_prompt() {
    let conv = staged("gpt-4.1", "sys", vec![Turn::user("hello")]);
    let b = body(ProviderKind::OpenAiResponses, &conv);
    assert_eq!(
        b,
        json!({
            "model": "gpt-4.1",
            "instructions": "sys",
            "input": "hello",
            "max_output_tokens": 98304,
        })
    );
}

#[test]
fn responses_staged_multi_turn_has_conversation_section() {
    let conv = staged(
        "gpt-4.1",
        "",
        vec![Turn::user("A"), Turn::assistant("B"), Turn::user("C")],
    );
    let b = body(ProviderKind::OpenAiResponses, &conv);
    assert_eq!(
        b["input"],
        "# Conversation\n\n## User\n\nA\n\n## Assistant\n\nB\n\nC"
    );
}

#[test]
fn responses_project_lists_files() {
    let conv = Conversation::project(
        "gpt-4.1",
        "sys",
        vec![Document {
            path: "a.rs".into(),
            content: "fn a() {}".into(),
        }],
        Some("explain".into()),
    );
    let b = body(ProviderKind::OpenAiResponses, &conv);
    assert_eq!(
        b["input"],
        "# Project Files\n\n## File: a.rs\n\n```\nfn a() {}\n```\n\nexplain"
    );
}

#[test]
fn responses_project_without_files() {
    let conv = Conversation::project("gpt-4.1", "", vec![], None);
    let b = body(ProviderKind::OpenAiResponses, &conv);
    assert_eq!(
        b["input"],
        format!("# Project Files\n\n_No files provided._\n\n{PROCEED_PROMPT}")
    );
}

// --- gemini ---

#[test]
fn gemini_roles_safety_and_generation_config() {
    let conv = staged("gemini-2.5-pro", "sys", vec![Turn::user("A"), Turn::assistant("B")]);
    let b = body(ProviderKind::Gemini, &conv);
    assert_eq!(b["contents"][0], json!({ "role": "user", "parts": [{ "text": "A" }] }));
    assert_eq!(b["contents"][1]["role"], "model");
    assert_eq!(b["contents"][2]["parts"][0]["text"], PROCEED_PROMPT);
    assert_eq!(b["system_instruction"], json!({ "parts": [{ "text": "sys" }] }));
    assert_eq!(
        b["generationConfig"],
        json!({ "temperature": 0.2, "topP": 0.5, "topK": 1 })
    );

    let safety = b["safetySettings"].as_array().unwrap();
    assert_eq!(safety.len(), 4);
    assert!(safety.iter().all(|s| s["threshold"] == "BLOCK_NONE"));
    assert!(b.get("model").is_none());
}

#[test]
fn gemini_staged_sampling_and_empty_system() {
    let mut conv = staged("g", "", vec![Turn::user("A")]);
    conv.temperature = Some(0.0);
    conv.top_p = Some(0.9);
    let b = body(ProviderKind::Gemini, &conv);
    assert!(b.get("system_instruction").is_none());
    assert_eq!(b["generationConfig"]["temperature"], json!(0.0));
    assert_eq!(b["generationConfig"]["topP"], json!(0.9));
}

// --- github ---

#[test]
fn github_project_scaffold_without_sampling() {
    let conv = Conversation::project(
        "openai/gpt-4.1",
        "sys",
        vec![Document {
            path: "x.py".into(),
            content: "print(1)".into(),
        }],
        Some("go".into()),
    );
    let b = body(ProviderKind::GitHub, &conv);
    let messages = b["messages"].as_array().unwrap();
    assert_eq!(messages[0], json!({ "role": "system", "content": "sys" }));
    assert_eq!(messages[1]["content"], "I need your help on this project.");
    assert_eq!(
        messages[2]["content"],
        "Please provide the content of the `x.py` file."
    );
    assert_eq!(messages.last().unwrap(), &json!({ "role": "user", "content": "go" }));
    assert!(b.get("temperature").is_none());
    assert_eq!(b["model"], "openai/gpt-4.1");
}
