//! End-to-end turns through the compiled agent graph with scripted collaborators.

use std::sync::Arc;

use assistgraph::{
    AgentConfig, AgentError, AgentRunner, CodeExecutor, LlmResponse, Message, MockLlm,
    MockToolSource, NodeId, RunError, RunOutcome, NO_HUMAN_RESPONSE, TOOL_REQUEST_ASSISTANCE,
    TOOL_RUN_PYTHON_CODE, TOOL_WEB_SEARCH,
};

use crate::common::{call, calls_turn, runner, transcript, FixedExecutor};

/// Search call → tools → chatbot again → end, with the search payload in between.
#[tokio::test]
async fn scenario_search_then_answer() {
    let llm = Arc::new(MockLlm::scripted(vec![
        calls_turn(vec![call("s1", TOOL_WEB_SEARCH, r#"{"query":"weather in Tokyo"}"#)]),
        LlmResponse::text("It is sunny in Tokyo."),
    ]));
    let tools = Arc::new(MockToolSource::default().with_call_result("Sunny, 22C".into()));
    let runner = runner(llm.clone(), tools.clone(), AgentConfig::default()).await;

    let outcome = runner
        .start("tokyo", "What's the weather in Tokyo?")
        .await
        .unwrap();
    let state = match outcome {
        RunOutcome::Completed(state) => state,
        other => panic!("expected completion, got {:?}", other),
    };
    assert_eq!(
        transcript(&state.messages),
        vec![
            ("user", "What's the weather in Tokyo?".to_string()),
            ("assistant", String::new()),
            ("tool", "Sunny, 22C".to_string()),
            ("assistant", "It is sunny in Tokyo.".to_string()),
        ]
    );
    assert_eq!(tools.calls()[0].1["query"], "weather in Tokyo");
    assert_eq!(llm.call_count(), 2);

    let advertised = &llm.seen()[0].1;
    assert!(advertised.contains(&TOOL_WEB_SEARCH.to_string()));
    assert!(advertised.contains(&TOOL_REQUEST_ASSISTANCE.to_string()));
    assert!(!advertised.contains(&TOOL_RUN_PYTHON_CODE.to_string()));
}

/// Escalation pauses before human; the injected answer is kept and the loop ends.
#[tokio::test]
async fn scenario_escalation_with_injected_response() {
    let llm = Arc::new(MockLlm::scripted(vec![
        calls_turn(vec![call("h1", TOOL_REQUEST_ASSISTANCE, r#"{"request":"refund"}"#)]),
        LlmResponse::text("An expert approved your refund."),
    ]));
    let runner = runner(llm.clone(), Arc::new(MockToolSource::default()), AgentConfig::default()).await;

    let paused = runner.start("s", "I want a refund").await.unwrap();
    assert_eq!(paused.interrupted_at(), Some(NodeId::Human.as_str()));
    assert!(paused.state().ask_human);

    let snapshot = runner.state("s").await.unwrap().unwrap();
    assert_eq!(snapshot.next.as_deref(), Some("human"));

    let done = runner
        .resume("s", Some("Refund approved.".into()))
        .await
        .unwrap();
    let state = done.into_state();
    assert!(!state.ask_human);
    let tool_answers: Vec<_> = state.messages.iter().filter(|m| m.is_tool()).collect();
    assert_eq!(tool_answers.len(), 1, "human node must not add a synthetic answer");
    assert_eq!(tool_answers[0].content(), "Refund approved.");
    assert_eq!(
        state.messages.last().map(|m| m.content()),
        Some("An expert approved your refund.")
    );
    assert!(runner.state("s").await.unwrap().unwrap().next.is_none());
}

/// Resume without a response records that nobody answered.
#[tokio::test]
async fn scenario_escalation_resumed_without_response() {
    let llm = Arc::new(MockLlm::scripted(vec![
        calls_turn(vec![call("h1", TOOL_REQUEST_ASSISTANCE, "{}")]),
        LlmResponse::text("Sorry, no expert is available."),
    ]));
    let runner = runner(llm, Arc::new(MockToolSource::default()), AgentConfig::default()).await;
    runner.start("s", "help").await.unwrap();

    let state = runner.resume("s", None).await.unwrap().into_state();
    match &state.messages[2] {
        Message::Tool(t) => {
            assert_eq!(t.call_id, "h1");
            assert_eq!(t.content, NO_HUMAN_RESPONSE);
        }
        other => panic!("expected synthetic tool answer, got {:?}", other),
    }
}

/// Without an interrupt set, escalation runs straight through the human node.
#[tokio::test]
async fn escalation_without_interrupt_runs_through() {
    let llm = Arc::new(MockLlm::scripted(vec![
        calls_turn(vec![call("h1", TOOL_REQUEST_ASSISTANCE, "{}")]),
        LlmResponse::text("ok"),
    ]));
    let config = AgentConfig::default().with_interrupt_before(vec![]);
    let runner = runner(llm, Arc::new(MockToolSource::default()), config).await;
    let outcome = runner.start("s", "help").await.unwrap();
    assert!(!outcome.is_interrupted());
    assert_eq!(outcome.state().messages[2].content(), NO_HUMAN_RESPONSE);
}

/// A failing adapter becomes an error tool message and the chatbot runs again.
#[tokio::test]
async fn scenario_tool_failure_is_absorbed() {
    let llm = Arc::new(MockLlm::scripted(vec![
        calls_turn(vec![call("s1", TOOL_WEB_SEARCH, r#"{"query":"x"}"#)]),
        LlmResponse::text("Search is down, sorry."),
    ]));
    let runner = runner(
        llm.clone(),
        Arc::new(MockToolSource::failing("connection refused")),
        AgentConfig::default(),
    )
    .await;
    let state = runner.start("s", "search x").await.unwrap().into_state();
    match &state.messages[2] {
        Message::Tool(t) => {
            assert!(t.is_error);
            assert!(t.content.starts_with("Error:"));
            assert!(t.content.contains("connection refused"));
        }
        other => panic!("expected error tool message, got {:?}", other),
    }
    assert_eq!(llm.call_count(), 2);
    assert_eq!(state.messages[3].content(), "Search is down, sorry.");
}

/// Code call routes to the code executor and its output goes back to the model.
#[tokio::test]
async fn scenario_code_execution() {
    let llm = Arc::new(MockLlm::scripted(vec![
        calls_turn(vec![call("p1", TOOL_RUN_PYTHON_CODE, r#"{"code":"len(df)"}"#)]),
        LlmResponse::text("There are 891 passengers."),
    ]));
    let exec = Arc::new(FixedExecutor::default());
    let tools = Arc::new(MockToolSource::default());
    let runner = AgentRunner::new(
        llm.clone(),
        tools.clone(),
        Some(exec.clone() as Arc<dyn CodeExecutor>),
        None,
        AgentConfig::default()
            .with_code_execution(true)
            .with_ephemeral_sessions(true),
    )
    .await
    .unwrap();

    let state = runner.start("s", "How many passengers?").await.unwrap().into_state();
    assert_eq!(*exec.ran.lock().unwrap(), vec!["len(df)".to_string()]);
    assert!(tools.calls().is_empty(), "code call must not reach the tool source");
    assert_eq!(state.messages[2].content(), "891");
    assert!(!state.execute_code);
    assert!(llm.seen()[0].1.contains(&TOOL_RUN_PYTHON_CODE.to_string()));
}

/// Code execution enabled without an executor fails at build time.
#[tokio::test]
async fn code_execution_requires_executor() {
    let result = AgentRunner::new(
        Arc::new(MockLlm::with_no_tool_calls("x")),
        Arc::new(MockToolSource::default()),
        None,
        None,
        AgentConfig::default().with_code_execution(true),
    )
    .await;
    assert!(matches!(
        result,
        Err(RunError::Execution(AgentError::InvalidState(_)))
    ));
}

/// Starting a paused session is rejected; resuming a finished one too.
#[tokio::test]
async fn start_while_paused_and_resume_when_done_are_rejected() {
    let llm = Arc::new(MockLlm::scripted(vec![
        calls_turn(vec![call("h1", TOOL_REQUEST_ASSISTANCE, "{}")]),
        LlmResponse::text("done"),
    ]));
    let runner = runner(llm, Arc::new(MockToolSource::default()), AgentConfig::default()).await;
    runner.start("s", "help").await.unwrap();

    let err = runner.start("s", "hello again").await.unwrap_err();
    assert!(matches!(err, RunError::Execution(AgentError::InvalidState(_))));

    runner.resume("s", None).await.unwrap();
    let err = runner.resume("s", None).await.unwrap_err();
    assert!(matches!(err, RunError::Execution(AgentError::InvalidState(_))));
    let err = runner.resume("unknown", None).await.unwrap_err();
    assert!(matches!(err, RunError::Execution(AgentError::InvalidState(_))));
}

/// Model failure aborts the turn and surfaces to the caller as retryable.
#[tokio::test]
async fn model_failure_surfaces() {
    let runner = runner(
        Arc::new(MockLlm::failing("upstream 503")),
        Arc::new(MockToolSource::default()),
        AgentConfig::default(),
    )
    .await;
    let err = runner.start("s", "hi").await.unwrap_err();
    assert!(matches!(err, RunError::Execution(AgentError::ModelInvocation(_))));
    assert!(err.is_retryable());

    let snapshot = runner.state("s").await.unwrap().unwrap();
    assert_eq!(snapshot.values.messages.len(), 1);
    assert_eq!(snapshot.next.as_deref(), Some("chatbot"));
}

/// A model that fails once: the failed turn is retried with the same message and completes.
#[tokio::test]
async fn retry_after_model_failure_completes_turn() {
    let llm = Arc::new(MockLlm::with_no_tool_calls("Hello!").with_failures(1, "upstream 503"));
    let runner = runner(llm.clone(), Arc::new(MockToolSource::default()), AgentConfig::default()).await;

    let err = runner.start("s", "hi").await.unwrap_err();
    assert!(err.is_retryable());

    let outcome = runner.start("s", "hi").await.unwrap();
    assert!(!outcome.is_interrupted());
    assert_eq!(
        transcript(&outcome.state().messages),
        vec![
            ("user", "hi".to_string()),
            ("assistant", "Hello!".to_string()),
        ]
    );
    assert_eq!(llm.call_count(), 2);
    assert!(runner.state("s").await.unwrap().unwrap().next.is_none());
}

/// Retrying a failed turn with a different message keeps both user messages.
#[tokio::test]
async fn retry_with_new_message_appends_it() {
    let llm = Arc::new(MockLlm::with_no_tool_calls("ok").with_failures(1, "timeout"));
    let runner = runner(llm, Arc::new(MockToolSource::default()), AgentConfig::default()).await;
    runner.start("s", "first try").await.unwrap_err();
    let state = runner.start("s", "second try").await.unwrap().into_state();
    assert_eq!(
        transcript(&state.messages),
        vec![
            ("user", "first try".to_string()),
            ("user", "second try".to_string()),
            ("assistant", "ok".to_string()),
        ]
    );
}

/// Pausing before the human node with only an in-memory store is refused
/// unless sessions are explicitly ephemeral; without interrupts it is allowed.
#[tokio::test]
async fn pausing_requires_durable_store() {
    let build = |config: AgentConfig| {
        AgentRunner::new(
            Arc::new(MockLlm::with_no_tool_calls("x")),
            Arc::new(MockToolSource::default()),
            None,
            None,
            config,
        )
    };
    let result = build(AgentConfig::default()).await;
    assert!(matches!(
        result,
        Err(RunError::Execution(AgentError::Persistence(_)))
    ));
    assert!(build(AgentConfig::default().with_interrupt_before(vec![])).await.is_ok());
    assert!(build(AgentConfig::default().with_ephemeral_sessions(true)).await.is_ok());
}

/// A second turn continues the persisted history of the session.
#[tokio::test]
async fn second_turn_continues_history() {
    let llm = Arc::new(MockLlm::scripted(vec![
        LlmResponse::text("Hi!"),
        LlmResponse::text("Still here."),
    ]));
    let runner = runner(llm.clone(), Arc::new(MockToolSource::default()), AgentConfig::default()).await;
    runner.start("s", "hello").await.unwrap();
    let state = runner.start("s", "are you there?").await.unwrap().into_state();
    assert_eq!(state.messages.len(), 4);
    assert_eq!(llm.seen()[1].0, 3, "second turn sees the whole history");
}
