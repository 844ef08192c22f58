//! Sessions persisted through checkpointers, across runner instances.

use std::sync::Arc;

use assistgraph::{
    AgentConfig, AgentRunner, Checkpointer, ConversationState, LlmResponse, MemorySaver,
    MockLlm, MockToolSource, RunnableConfig, SqliteSaver, TOOL_REQUEST_ASSISTANCE,
    TOOL_WEB_SEARCH,
};

use crate::common::{call, calls_turn, transcript};

async fn runner_with(
    llm: Arc<MockLlm>,
    checkpointer: Arc<dyn Checkpointer<ConversationState>>,
) -> AgentRunner {
    AgentRunner::new(
        llm,
        Arc::new(MockToolSource::default()),
        None,
        Some(checkpointer),
        AgentConfig::default().with_ephemeral_sessions(true),
    )
    .await
    .unwrap()
}

/// A paused session stored in SQLite is resumed by a fresh runner over the same file,
/// with message order and flags intact.
#[tokio::test]
async fn sqlite_session_survives_runner_restart() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("sessions").join("checkpoints.db");

    let first = runner_with(
        Arc::new(MockLlm::scripted(vec![calls_turn(vec![call(
            "h1",
            TOOL_REQUEST_ASSISTANCE,
            r#"{"request":"expert please"}"#,
        )])])),
        Arc::new(SqliteSaver::new(&db).unwrap()),
    )
    .await;
    let paused = first.start("s", "I need an expert").await.unwrap();
    assert!(paused.is_interrupted());
    let before = paused.into_state();
    drop(first);

    let second = runner_with(
        Arc::new(MockLlm::scripted(vec![LlmResponse::text("The expert says hi.")])),
        Arc::new(SqliteSaver::new(&db).unwrap()),
    )
    .await;
    let snapshot = second.state("s").await.unwrap().unwrap();
    assert_eq!(snapshot.values, before);
    assert!(snapshot.values.ask_human);
    assert_eq!(snapshot.next.as_deref(), Some("human"));

    let done = second
        .resume("s", Some("hi from the expert".into()))
        .await
        .unwrap()
        .into_state();
    assert_eq!(
        transcript(&done.messages),
        vec![
            ("user", "I need an expert".to_string()),
            ("assistant", String::new()),
            ("tool", "hi from the expert".to_string()),
            ("assistant", "The expert says hi.".to_string()),
        ]
    );
    assert!(!done.ask_human && !done.execute_code);
}

/// Every step of a turn is recorded, newest first, and the last one has nothing pending.
#[tokio::test]
async fn checkpoint_history_records_each_step() {
    let saver = Arc::new(MemorySaver::<ConversationState>::new());
    let runner = runner_with(
        Arc::new(MockLlm::scripted(vec![
            calls_turn(vec![call("s1", TOOL_WEB_SEARCH, r#"{"query":"q"}"#)]),
            LlmResponse::text("answer"),
        ])),
        saver.clone(),
    )
    .await;
    runner.start("t", "question").await.unwrap();

    let history = saver
        .list(&RunnableConfig::for_thread("t"), None)
        .await
        .unwrap();
    // input + chatbot + tools + chatbot
    assert_eq!(history.len(), 4);
    let steps: Vec<u64> = history.iter().map(|h| h.metadata.step).collect();
    let mut sorted = steps.clone();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(steps, sorted);
    assert_eq!(history[0].next, None);
    assert_eq!(history.last().and_then(|h| h.next.as_deref()), Some("chatbot"));

    let latest = saver
        .get_tuple(&RunnableConfig::for_thread("t"))
        .await
        .unwrap()
        .unwrap()
        .0;
    assert_eq!(latest.channel_values.messages.len(), 4);
}

/// Sessions are isolated by id.
#[tokio::test]
async fn sessions_do_not_share_history() {
    let runner = runner_with(
        Arc::new(MockLlm::scripted(vec![
            LlmResponse::text("one"),
            LlmResponse::text("two"),
        ])),
        Arc::new(MemorySaver::<ConversationState>::new()),
    )
    .await;
    runner.start("a", "first").await.unwrap();
    let b = runner.start("b", "second").await.unwrap().into_state();
    assert_eq!(b.messages.len(), 2);
    assert_eq!(b.messages[0].content(), "second");
}
