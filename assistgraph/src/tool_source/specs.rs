//! Specs for tools that are advertised to the model but routed to dedicated nodes.

use serde_json::json;

use crate::policy::{TOOL_REQUEST_ASSISTANCE, TOOL_RUN_PYTHON_CODE};

use super::ToolSpec;

/// Escalation tool. Calls are intercepted by the turn policy and answered by
/// the human node; no adapter ever receives them.
pub fn request_assistance_spec() -> ToolSpec {
    ToolSpec {
        name: TOOL_REQUEST_ASSISTANCE.to_string(),
        description: Some(
            "Escalate the conversation to an expert. Use this if you are unable to assist \
             directly or if the user requires support beyond your permissions."
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "request": {
                    "type": "string",
                    "description": "What the expert should help with."
                }
            },
            "required": ["request"]
        }),
    }
}

/// Code execution over the pre-loaded DataFrame `df`.
pub fn run_python_code_spec() -> ToolSpec {
    ToolSpec {
        name: TOOL_RUN_PYTHON_CODE.to_string(),
        description: Some(
            "Run Python code against the pandas DataFrame `df` that is already loaded. \
             Print the values you need; stdout is returned."
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "code": {
                    "type": "string",
                    "description": "Python source to execute. `df` and `pd` are in scope."
                }
            },
            "required": ["code"]
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Routed tool specs use the names the turn policy matches on.
    #[test]
    fn specs_use_policy_names() {
        assert_eq!(request_assistance_spec().name, TOOL_REQUEST_ASSISTANCE);
        let code = run_python_code_spec();
        assert_eq!(code.name, TOOL_RUN_PYTHON_CODE);
        assert_eq!(code.input_schema["required"][0], "code");
    }
}
