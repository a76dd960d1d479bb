use crate::support::stream_fixture::*;
use bytes::Bytes;
use chatflux::prelude::*;
use serde_json::json;

/// Every vendor fixture must produce the same text and thinking however the
/// transport happens to chunk it.
async fn assert_chunking_independent(vendor: &str, name: &str, config: StreamConfig) {
    let chunks = load_sse_fixture_as_bytes(vendor, name).unwrap();
    let baseline = collect_events(chunks.clone(), config.clone()).await;
    for size in [1, 3, 7] {
        let events = collect_events(rechunk(&chunks, size), config.clone()).await;
        assert_terminal_exclusive(&events);
        assert_eq!(text_of(&events), text_of(&baseline), "{vendor}/{name} at {size}");
        assert_eq!(thinking_of(&events), thinking_of(&baseline), "{vendor}/{name} at {size}");
        assert_eq!(events.last(), baseline.last(), "{vendor}/{name} at {size}");
    }
}

#[tokio::test]
async fn openai_text_stream() {
    let chunks = load_sse_fixture_as_bytes("openai", "text.sse").unwrap();
    let events = collect_events(chunks, StreamConfig::new("openai")).await;

    assert_eq!(text_of(&events), "Hello, 世界!");
    assert!(thinking_of(&events).is_empty());
    let response = completion_of(&events);
    assert_eq!(response.finish_reason, Some(FinishReason::Stop));
    assert_eq!(response.usage.as_ref().and_then(|u| u.total_tokens), Some(12));
    assert_eq!(response.metadata.id.as_deref(), Some("chatcmpl-A1"));
    assert_eq!(response.metadata.model.as_deref(), Some("gpt-4o-mini"));
    assert_eq!(response.metadata.provider, "openai");
    assert!(response.thinking.is_none());
}

#[tokio::test]
async fn openai_tool_calls_are_assembled_by_index() {
    let chunks = load_sse_fixture_as_bytes("openai", "tool_calls.sse").unwrap();
    let events = collect_events(chunks, StreamConfig::new("openai")).await;

    let fragments: Vec<&ToolCallFragment> = events
        .iter()
        .filter_map(|e| match e {
            ChatStreamEvent::ToolCallDelta { fragment } => Some(fragment),
            _ => None,
        })
        .collect();
    assert_eq!(fragments.len(), 4);
    // Continuation fragments carry the id resolved from their index.
    assert!(fragments.iter().all(|f| f.id.is_some()));
    assert_eq!(fragments[1].id.as_deref(), Some("call_weather"));

    let response = completion_of(&events);
    assert_eq!(response.finish_reason, Some(FinishReason::ToolCalls));
    assert_eq!(response.tool_calls.len(), 2);
    let weather = &response.tool_calls[0];
    assert_eq!(weather.id, "call_weather");
    assert_eq!(weather.function.name, "get_weather");
    assert_eq!(weather.parsed_arguments().unwrap(), json!({"city": "Paris"}));
    assert_eq!(response.tool_calls[1].function.name, "get_time");
    assert_eq!(response.tool_calls[1].function.arguments, "{}");
}

#[tokio::test]
async fn deepseek_reasoning_content() {
    let chunks = load_sse_fixture_as_bytes("deepseek", "reasoning.sse").unwrap();
    let events = collect_events(chunks, StreamConfig::new("deepseek")).await;

    assert_eq!(
        &events[..3],
        &[
            ChatStreamEvent::thinking("用户问 2+2。"),
            ChatStreamEvent::thinking("答案是 4。"),
            ChatStreamEvent::text("2 + 2 = 4"),
        ]
    );
    let response = completion_of(&events);
    assert_eq!(response.thinking.as_deref(), Some("用户问 2+2。答案是 4。"));
    assert_eq!(response.text, "2 + 2 = 4");

    let usage = response.usage.as_ref().unwrap();
    assert_eq!(usage.total_tokens, Some(52));
    assert_eq!(usage.reasoning_tokens(), Some(30));
    assert_eq!(usage.extra.get("prompt_cache_miss_tokens"), Some(&json!(12)));
    assert_eq!(response.metadata.model.as_deref(), Some("deepseek-reasoner"));
}

#[tokio::test]
async fn xai_keeps_latest_usage() {
    let chunks = load_sse_fixture_as_bytes("xai", "reasoning.sse").unwrap();
    let events = collect_events(chunks, StreamConfig::new("xai")).await;

    assert_eq!(thinking_of(&events), "Check the units.");
    assert_eq!(text_of(&events), "About 9.8 m/s².");
    let response = completion_of(&events);
    assert_eq!(response.usage.as_ref().and_then(|u| u.total_tokens), Some(19));
    assert_eq!(response.metadata.provider, "xai");
}

#[tokio::test]
async fn groq_usage_from_x_groq() {
    let chunks = load_sse_fixture_as_bytes("groq", "x_groq_usage.sse").unwrap();
    let events = collect_events(chunks, StreamConfig::new("groq")).await;

    assert_eq!(thinking_of(&events), "Short question.");
    assert_eq!(text_of(&events), "Yes.");
    let usage = completion_of(&events).usage.clone().unwrap();
    assert_eq!(usage.prompt_tokens, Some(14));
    assert_eq!(usage.completion_tokens, Some(6));
    assert_eq!(usage.total_tokens, Some(20));
}

#[tokio::test]
async fn openrouter_ignores_comment_lines() {
    let chunks = load_sse_fixture_as_bytes("openrouter", "reasoning.sse").unwrap();
    let events = collect_events(chunks, StreamConfig::new("openrouter")).await;

    assert_eq!(
        events[..3],
        [
            ChatStreamEvent::thinking("Think"),
            ChatStreamEvent::thinking("ing..."),
            ChatStreamEvent::text("Done."),
        ]
    );
    let response = completion_of(&events);
    assert_eq!(response.thinking.as_deref(), Some("Thinking..."));
    assert_eq!(response.usage.as_ref().and_then(|u| u.total_tokens), Some(12));
}

#[tokio::test]
async fn ollama_split_think_tags_stay_in_text_per_fragment() {
    let chunks = load_sse_fixture_as_bytes("ollama", "think_tags.sse").unwrap();
    let events = collect_events(chunks, StreamConfig::new("ollama")).await;

    // Tags spread over fragments are not recognized by the per-fragment rule.
    assert!(thinking_of(&events).is_empty());
    let text = text_of(&events);
    assert!(text.starts_with("<think>"), "{text:?}");
    assert!(text.ends_with("Hello!"), "{text:?}");
    completion_of(&events);
}

#[tokio::test]
async fn ollama_split_think_tags_with_streaming_splitter() {
    let chunks = load_sse_fixture_as_bytes("ollama", "think_tags.sse").unwrap();
    let config = StreamConfig::new("ollama").think_tag_mode(ThinkTagMode::Streaming);
    let events = collect_events(chunks, config).await;

    assert_eq!(thinking_of(&events).trim(), "Okay, greet back.");
    assert_eq!(text_of(&events).trim(), "Hello!");
    assert!(!text_of(&events).contains("<think>"));
    let response = completion_of(&events);
    assert_eq!(response.text.trim(), "Hello!");
    assert_eq!(response.metadata.model.as_deref(), Some("deepseek-r1:8b"));
}

#[tokio::test]
async fn ollama_native_json_lines() {
    let body = Bytes::from(std::fs::read(fixture_path("ollama", "native_chat.jsonl")).unwrap());
    let config = StreamConfig::new("ollama").wire_format(WireFormat::JsonLines);

    for size in [body.len(), 1, 5, 64] {
        let events = collect_events(rechunk(&[body.clone()], size), config.clone()).await;

        assert_eq!(thinking_of(&events), "Weather and time, two tools.", "chunk size {size}");
        assert_eq!(text_of(&events), "Checking.", "chunk size {size}");
        let response = completion_of(&events);
        assert_eq!(response.finish_reason, Some(FinishReason::Stop));
        assert_eq!(response.metadata.model.as_deref(), Some("qwen3:8b"));
        let usage = response.usage.as_ref().unwrap();
        assert_eq!(usage.total_tokens, Some(35));

        // Each native call arrives whole in its own line and stays separate.
        let calls: Vec<_> = response
            .tool_calls
            .iter()
            .map(|c| (c.id.as_str(), c.function.name.as_str(), c.function.arguments.as_str()))
            .collect();
        assert_eq!(
            calls,
            vec![
                ("call_0", "get_weather", r#"{"city":"Paris"}"#),
                ("call_1", "get_time", r#"{"tz":"UTC"}"#),
            ]
        );
    }
}

#[tokio::test]
async fn ollama_native_lines_need_json_lines_format() {
    let body = Bytes::from_static(
        b"{\"message\":{\"content\":\"Hello\"},\"done\":false}\n{\"message\":{\"content\":\"\"},\"done\":true}\n",
    );

    let events = collect_events(
        vec![body.clone()],
        StreamConfig::new("ollama").wire_format(WireFormat::JsonLines),
    )
    .await;
    assert_eq!(events[0], ChatStreamEvent::text("Hello"));
    assert_eq!(completion_of(&events).text, "Hello");

    // As SSE there are no data lines at all.
    let events = collect_events(vec![body], StreamConfig::new("ollama")).await;
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], ChatStreamEvent::Error { .. }));
}

#[tokio::test]
async fn unknown_provider_uses_compatible_mapper() {
    let chunks = load_sse_fixture_as_bytes("compatible", "flat_reasoning.sse").unwrap();
    let events = collect_events(chunks, StreamConfig::new("some-local-gateway")).await;

    assert_eq!(thinking_of(&events), "Let me think more");
    assert_eq!(completion_of(&events).metadata.provider, "openai-compatible");
}

#[tokio::test]
async fn fixtures_are_chunking_independent() {
    let cases = [
        ("openai", "text.sse", StreamConfig::new("openai")),
        ("openai", "tool_calls.sse", StreamConfig::new("openai")),
        ("deepseek", "reasoning.sse", StreamConfig::new("deepseek")),
        ("xai", "reasoning.sse", StreamConfig::new("xai")),
        ("groq", "x_groq_usage.sse", StreamConfig::new("groq")),
        ("openrouter", "reasoning.sse", StreamConfig::new("openrouter")),
        (
            "ollama",
            "think_tags.sse",
            StreamConfig::new("ollama").think_tag_mode(ThinkTagMode::Streaming),
        ),
        ("compatible", "flat_reasoning.sse", StreamConfig::default()),
    ];
    for (vendor, name, config) in cases {
        assert_chunking_independent(vendor, name, config).await;
    }
}
