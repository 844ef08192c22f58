//! OpenAI Chat Completions client implementing `LlmClient` (ChatOpenAI).
//!
//! Works against any OpenAI-compatible endpoint (OpenAI, Groq, local servers)
//! via `OpenAIConfig::with_api_base`. Tools passed to `invoke` are sent as
//! function tools; tool results and assistant tool calls in the history are
//! converted so the model sees the full exchange.
//!
//! **Interaction**: Implements `LlmClient`; used by ChatbotNode like `MockLlm`.
//! Depends on `async_openai` (feature `openai`).

use async_trait::async_trait;

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmResponse};
use crate::message::{Message, ToolCall};
use crate::tool_source::ToolSpec;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionMessageToolCall, ChatCompletionMessageToolCalls,
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessage, ChatCompletionRequestToolMessageArgs,
        ChatCompletionRequestUserMessage, ChatCompletionTool, ChatCompletionToolChoiceOption,
        ChatCompletionTools, CreateChatCompletionRequestArgs, FunctionCall, FunctionObject,
        ToolChoiceOptions,
    },
    Client,
};

use super::ToolChoiceMode;

/// OpenAI Chat Completions client implementing `LlmClient` (aligns with LangChain ChatOpenAI).
///
/// Uses `OPENAI_API_KEY` from the environment by default; or provide
/// config via `ChatOpenAI::with_config`.
///
/// **Interaction**: Implements `LlmClient`; used by ChatbotNode.
pub struct ChatOpenAI {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: Option<f32>,
    tool_choice: Option<ToolChoiceMode>,
}

impl ChatOpenAI {
    /// Build client with default config (API key from `OPENAI_API_KEY` env).
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_config(OpenAIConfig::new(), model)
    }

    /// Build client with custom config (e.g. custom API key or base URL).
    pub fn with_config(config: OpenAIConfig, model: impl Into<String>) -> Self {
        Self {
            client: Client::with_config(config),
            model: model.into(),
            temperature: None,
            tool_choice: None,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Set temperature (0–2). Lower values are more deterministic.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set tool choice mode (auto, none, required). Overrides API default when tools are present.
    pub fn with_tool_choice(mut self, mode: ToolChoiceMode) -> Self {
        self.tool_choice = Some(mode);
        self
    }

    /// Convert our `Message` list to OpenAI request messages.
    fn messages_to_request(
        messages: &[Message],
    ) -> Result<Vec<ChatCompletionRequestMessage>, AgentError> {
        let build_err =
            |e: async_openai::error::OpenAIError| AgentError::ModelInvocation(format!("OpenAI request build failed: {}", e));
        messages
            .iter()
            .map(|m| match m {
                Message::System { content } => Ok(ChatCompletionRequestMessage::System(
                    ChatCompletionRequestSystemMessage::from(content.as_str()),
                )),
                Message::User { content } => Ok(ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessage::from(content.as_str()),
                )),
                Message::Assistant(a) if a.tool_calls.is_empty() => Ok(
                    ChatCompletionRequestMessage::Assistant(a.content.as_str().into()),
                ),
                Message::Assistant(a) => {
                    let calls: Vec<ChatCompletionMessageToolCalls> = a
                        .tool_calls
                        .iter()
                        .map(|c| {
                            ChatCompletionMessageToolCalls::Function(ChatCompletionMessageToolCall {
                                id: c.id.clone(),
                                function: FunctionCall {
                                    name: c.name.clone(),
                                    arguments: c.arguments.clone(),
                                },
                            })
                        })
                        .collect();
                    let mut args = ChatCompletionRequestAssistantMessageArgs::default();
                    if !a.content.is_empty() {
                        args.content(a.content.as_str());
                    }
                    let msg = args.tool_calls(calls).build().map_err(build_err)?;
                    Ok(ChatCompletionRequestMessage::Assistant(msg))
                }
                Message::Tool(t) => {
                    let msg = ChatCompletionRequestToolMessageArgs::default()
                        .content(t.content.as_str())
                        .tool_call_id(t.call_id.as_str())
                        .build()
                        .map_err(build_err)?;
                    Ok(ChatCompletionRequestMessage::Tool(msg))
                }
            })
            .collect()
    }

    fn tools_to_request(tools: &[ToolSpec]) -> Vec<ChatCompletionTools> {
        tools
            .iter()
            .map(|t| {
                ChatCompletionTools::Function(ChatCompletionTool {
                    function: FunctionObject {
                        name: t.name.clone(),
                        description: t.description.clone(),
                        parameters: Some(t.input_schema.clone()),
                        ..Default::default()
                    },
                })
            })
            .collect()
    }
}

#[async_trait]
impl LlmClient for ChatOpenAI {
    async fn invoke(&self, messages: &[Message], tools: &[ToolSpec]) -> Result<LlmResponse, AgentError> {
        let openai_messages = Self::messages_to_request(messages)?;
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(self.model.clone());
        args.messages(openai_messages);

        if !tools.is_empty() {
            args.tools(Self::tools_to_request(tools));
            if let Some(mode) = self.tool_choice {
                let opt = match mode {
                    ToolChoiceMode::Auto => ToolChoiceOptions::Auto,
                    ToolChoiceMode::None => ToolChoiceOptions::None,
                    ToolChoiceMode::Required => ToolChoiceOptions::Required,
                };
                args.tool_choice(ChatCompletionToolChoiceOption::Mode(opt));
            }
        }

        if let Some(t) = self.temperature {
            args.temperature(t);
        }

        let request = args.build().map_err(|e| {
            AgentError::ModelInvocation(format!("OpenAI request build failed: {}", e))
        })?;

        tracing::debug!(model = %self.model, messages = messages.len(), tools = tools.len(), "chat completion request");
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| AgentError::ModelInvocation(format!("OpenAI API error: {}", e)))?;

        let choice =
            response.choices.into_iter().next().ok_or_else(|| {
                AgentError::ModelInvocation("OpenAI returned no choices".to_string())
            })?;

        let msg = choice.message;
        let content = msg.content.unwrap_or_default();
        let tool_calls: Vec<ToolCall> = msg
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .filter_map(|tc| {
                if let ChatCompletionMessageToolCalls::Function(f) = tc {
                    Some(ToolCall::new(f.id, f.function.name, f.function.arguments))
                } else {
                    None
                }
            })
            .collect();

        Ok(LlmResponse {
            content,
            tool_calls,
        })
    }
}

#[cfg(all(test, feature = "openai"))]
mod tests {
    use super::*;

    /// **Scenario**: ChatOpenAI::with_config uses custom config and model.
    #[test]
    fn chat_openai_with_config_creates_client() {
        let config = OpenAIConfig::new()
            .with_api_key("test-key")
            .with_api_base("https://api.groq.com/openai/v1");
        let llm = ChatOpenAI::with_config(config, "llama-3.1-8b-instant")
            .with_temperature(0.0)
            .with_tool_choice(ToolChoiceMode::Auto);
        assert_eq!(llm.model(), "llama-3.1-8b-instant");
    }

    /// **Scenario**: History with tool calls and tool results converts one-to-one, in order.
    #[test]
    fn messages_with_tool_exchange_convert_in_order() {
        let history = vec![
            Message::system("be brief"),
            Message::user("weather in Tokyo?"),
            Message::assistant_with_calls(
                "",
                vec![ToolCall::new("call_1", "web_search", r#"{"query":"tokyo"}"#)],
            ),
            Message::tool("call_1", "sunny"),
            Message::assistant("It is sunny."),
        ];
        let converted = ChatOpenAI::messages_to_request(&history).unwrap();
        assert_eq!(converted.len(), 5);
        assert!(matches!(converted[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(converted[2], ChatCompletionRequestMessage::Assistant(_)));
        match &converted[3] {
            ChatCompletionRequestMessage::Tool(t) => assert_eq!(t.tool_call_id, "call_1"),
            other => panic!("expected tool message, got {:?}", other),
        }
    }

    /// **Scenario**: Tool specs become function tools with their schema.
    #[test]
    fn tools_convert_to_function_tools() {
        let tools = vec![ToolSpec {
            name: "web_search".into(),
            description: Some("search".into()),
            input_schema: serde_json::json!({"type": "object"}),
        }];
        let converted = ChatOpenAI::tools_to_request(&tools);
        assert_eq!(converted.len(), 1);
        match &converted[0] {
            ChatCompletionTools::Function(f) => assert_eq!(f.function.name, "web_search"),
            #[allow(unreachable_patterns)]
            _ => panic!("expected function tool"),
        }
    }
}
