//! Code execution over a pre-loaded tabular dataset.
//!
//! [`PythonDataFrameExecutor`] runs each snippet in a fresh Python process that
//! loads the CSV into a pandas DataFrame `df` first. No sandboxing is applied.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::tool_source::ToolSourceError;

/// Runs model-written code against the dataset and returns its printed output.
///
/// **Interaction**: Driven by `CodeExecutorNode` for `run_python_code` calls.
#[async_trait]
pub trait CodeExecutor: Send + Sync {
    async fn run(&self, code: &str) -> Result<String, ToolSourceError>;
}

/// Env var through which the CSV path reaches the interpreter.
const DATA_PATH_ENV: &str = "ASSISTGRAPH_DATA_CSV";

/// Loads `df`, executes the snippet read from stdin and prints the value of a
/// trailing expression, the way an interactive prompt would.
const PRELUDE: &str = r#"import ast, os, sys
import pandas as pd
df = pd.read_csv(os.environ["ASSISTGRAPH_DATA_CSV"], index_col=0)
_src = sys.stdin.read()
_tree = ast.parse(_src)
_last = _tree.body.pop() if _tree.body and isinstance(_tree.body[-1], ast.Expr) else None
exec(compile(_tree, "<code>", "exec"))
if _last is not None:
    _value = eval(compile(ast.Expression(_last.value), "<code>", "eval"))
    if _value is not None:
        print(_value)
"#;

/// Output returned when the snippet printed nothing.
const NO_OUTPUT: &str = "(no output)";

/// Python + pandas executor over one CSV file.
pub struct PythonDataFrameExecutor {
    python_bin: String,
    data_path: PathBuf,
    timeout: Option<Duration>,
}

impl PythonDataFrameExecutor {
    pub fn new(data_path: impl AsRef<Path>) -> Self {
        Self {
            python_bin: "python3".to_string(),
            data_path: data_path.as_ref().to_path_buf(),
            timeout: None,
        }
    }

    pub fn with_python_bin(mut self, python_bin: impl Into<String>) -> Self {
        self.python_bin = python_bin.into();
        self
    }

    /// Kills the interpreter when a snippet runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    async fn execute(&self, code: &str) -> Result<std::process::Output, ToolSourceError> {
        let mut child = Command::new(&self.python_bin)
            .arg("-c")
            .arg(PRELUDE)
            .env(DATA_PATH_ENV, &self.data_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ToolSourceError::Transport(format!("failed to start {}: {}", self.python_bin, e))
            })?;

        let run = async move {
            if let Some(mut stdin) = child.stdin.take() {
                match stdin.write_all(code.as_bytes()).await {
                    Ok(()) => {}
                    // Interpreter exited without reading; its status and stderr say why.
                    Err(e) if e.kind() == ErrorKind::BrokenPipe => {}
                    Err(e) => {
                        return Err(ToolSourceError::Transport(format!(
                            "failed to send code: {}",
                            e
                        )))
                    }
                }
            }
            child.wait_with_output().await.map_err(|e| {
                ToolSourceError::Transport(format!("failed to collect output: {}", e))
            })
        };
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, run).await.map_err(|_| {
                ToolSourceError::Execution(format!("code timed out after {:?}", limit))
            })?,
            None => run.await,
        }
    }
}

#[async_trait]
impl CodeExecutor for PythonDataFrameExecutor {
    async fn run(&self, code: &str) -> Result<String, ToolSourceError> {
        if code.trim().is_empty() {
            return Err(ToolSourceError::InvalidInput("empty code".to_string()));
        }
        let output = self.execute(code).await?;
        let stdout = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr.trim_end().lines().last().unwrap_or("unknown error").to_string();
            tracing::debug!(status = ?output.status, stderr = %stderr, "python snippet failed");
            return Err(ToolSourceError::Execution(detail));
        }
        if stdout.is_empty() {
            Ok(NO_OUTPUT.to_string())
        } else {
            Ok(stdout)
        }
    }
}
