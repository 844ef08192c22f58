//! Agent binary: parse flags, run or resume a session, print the new messages.

use std::io::{BufRead, Write};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use assistgraph::{
    AgentRunner, ConversationState, Message, NodeId, RunError, RunOutcome, ToolChoiceMode,
};
use assistgraph_cli::{build_runner, Error, RunConfig, RunOptions};

#[derive(Parser, Debug)]
#[command(name = "assistgraph")]
#[command(about = "Conversational agent with web search, human escalation and dataset analysis")]
struct Args {
    /// User message (can also be given as positional arguments)
    #[arg(short, long, value_name = "TEXT")]
    message: Option<String>,

    /// Session id (overrides THREAD_ID)
    #[arg(long, value_name = "ID")]
    thread_id: Option<String>,

    /// Resume a session paused before the human node
    #[arg(long)]
    resume: bool,

    /// Human answer injected on --resume
    #[arg(long, value_name = "TEXT", requires = "resume")]
    response: Option<String>,

    /// Read messages from stdin in a loop; escalations are answered at the prompt
    #[arg(short, long)]
    interactive: bool,

    /// Do not pause before the human node
    #[arg(long)]
    no_interrupt: bool,

    /// CSV dataset for code execution (overrides DATA_CSV)
    #[arg(long, value_name = "PATH")]
    data_csv: Option<String>,

    /// SQLite checkpoint database (overrides DB_PATH)
    #[arg(long, value_name = "PATH")]
    db_path: Option<String>,

    /// Sampling temperature 0-2
    #[arg(long)]
    temperature: Option<f32>,

    /// Tool choice: auto, none or required
    #[arg(long, value_name = "MODE")]
    tool_choice: Option<ToolChoiceMode>,

    /// Debug logging and node enter/exit logs
    #[arg(short, long)]
    verbose: bool,

    /// Positional: user message (when -m/--message is not used)
    #[arg(trailing_var_arg = true)]
    rest: Vec<String>,
}

impl Args {
    fn options(&self) -> RunOptions {
        RunOptions {
            temperature: self.temperature,
            tool_choice: self.tool_choice,
            thread_id: self.thread_id.clone(),
            db_path: self.db_path.clone(),
            data_csv: self.data_csv.clone(),
            no_interrupt: self.no_interrupt,
            interactive: self.interactive,
            verbose: self.verbose,
        }
    }

    fn message(&self) -> Option<String> {
        if let Some(ref m) = self.message {
            return Some(m.clone());
        }
        let joined = self.rest.join(" ").trim().to_string();
        (!joined.is_empty()).then_some(joined)
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Prints messages from index `from` on, and a notice when the run paused.
fn print_outcome(outcome: &RunOutcome<ConversationState>, from: usize) {
    for m in outcome.state().messages.iter().skip(from) {
        match m {
            Message::System { content } => println!("[System] {}", content),
            Message::User { content } => println!("[User] {}", content),
            Message::Assistant(a) => {
                if !a.content.is_empty() {
                    println!("[Assistant] {}", a.content);
                }
                for call in &a.tool_calls {
                    println!("[Calling tool: {}] {}", call.name, call.arguments);
                }
            }
            Message::Tool(t) => println!("[Tool] {}", t.content),
        }
    }
    if let Some(node) = outcome.interrupted_at() {
        println!("--- paused before {}; resume with --resume [--response TEXT]", node);
    }
}

/// Index after the turn's user message. A retried turn reuses the stored one.
fn after_last_user(outcome: &RunOutcome<ConversationState>) -> usize {
    outcome
        .state()
        .messages
        .iter()
        .rposition(|m| matches!(m, Message::User { .. }))
        .map_or(0, |i| i + 1)
}

async fn history_len(runner: &AgentRunner, session: &str) -> Result<usize, Error> {
    Ok(runner
        .state(session)
        .await?
        .map(|s| s.values.messages.len())
        .unwrap_or(0))
}

fn prompt(label: &str) -> Result<Option<String>, Error> {
    print!("{}", label);
    std::io::stdout().flush()?;
    let mut line = String::new();
    if std::io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Keeps the loop alive on retryable failures; anything else ends the session.
fn retryable(
    result: Result<RunOutcome<ConversationState>, RunError>,
) -> Result<Option<RunOutcome<ConversationState>>, Error> {
    match result {
        Ok(outcome) => Ok(Some(outcome)),
        Err(e) if e.is_retryable() => {
            eprintln!("error: {}", e);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

async fn pending_node(runner: &AgentRunner, session: &str) -> Result<Option<String>, Error> {
    Ok(runner.state(session).await?.and_then(|s| s.next))
}

async fn interactive(runner: &AgentRunner, session: &str) -> Result<(), Error> {
    loop {
        let Some(input) = prompt("User: ")? else {
            return Ok(());
        };
        if input.is_empty() {
            continue;
        }
        if matches!(input.as_str(), "quit" | "exit" | "q") {
            return Ok(());
        }
        let Some(outcome) = retryable(runner.start(session, &input).await)? else {
            println!("--- turn not completed; send the message again to retry");
            continue;
        };
        print_outcome(&outcome, after_last_user(&outcome));

        let mut pending = outcome.interrupted_at().map(str::to_string);
        while let Some(node) = pending.take() {
            let answer = if node == NodeId::Human.as_str() {
                let Some(line) = prompt("Human: ")? else {
                    return Ok(());
                };
                Some(line).filter(|s| !s.is_empty())
            } else {
                if prompt(&format!("--- paused before {}; press enter to continue ", node))?.is_none() {
                    return Ok(());
                }
                None
            };
            let from = history_len(runner, session).await?;
            match retryable(runner.resume(session, answer).await)? {
                Some(outcome) => {
                    print_outcome(&outcome, from);
                    pending = outcome.interrupted_at().map(str::to_string);
                }
                None => pending = pending_node(runner, session).await?,
            }
        }
    }
}

async fn run(args: Args) -> Result<(), Error> {
    let mut config = RunConfig::from_env()?;
    config.apply_options(&args.options());
    let runner = build_runner(&config).await?;
    let session = config.thread_id.clone();

    if args.interactive {
        return interactive(&runner, &session).await;
    }
    let from = history_len(&runner, &session).await?;
    let outcome = if args.resume {
        runner.resume(&session, args.response.clone()).await?
    } else {
        let input = args
            .message()
            .unwrap_or_else(|| "What's the weather in Tokyo?".to_string());
        println!("User: {}", input);
        println!("---");
        runner.start(&session, &input).await?
    };
    let skip = if args.resume { from } else { after_last_user(&outcome) };
    print_outcome(&outcome, skip);
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args).await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
