//! Tool trait and the tool box agents dispatch through.
//!
//! Every vault and token operation is exposed as a tool: a name, a
//! description, a JSON schema for its arguments and an async call. The
//! agent runtime only ever sees [`ToolDefinition`]s and JSON values.
//!
//! # OpenAI API Alignment
//!
//! `ToolDefinition` serializes to the function calling format
//! `{"type": "function", "function": {...}}`.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ToolError;

/// Definition of a tool for LLM function calling.
#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct ToolDefinition {
    /// Name of the tool (e.g., `get_total_assets`).
    pub name: String,

    /// Description of what the tool does.
    pub description: String,

    /// JSON schema for the tool's parameters.
    pub parameters: Value,
}

impl ToolDefinition {
    /// Create a new tool definition.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    /// Names of the required parameters declared by the schema.
    #[must_use]
    pub fn required_params(&self) -> Vec<&str> {
        self.parameters
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

impl Serialize for ToolDefinition {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let mut function = serde_json::Map::new();
        function.insert("name".to_owned(), Value::String(self.name.clone()));
        function.insert(
            "description".to_owned(),
            Value::String(self.description.clone()),
        );
        function.insert("parameters".to_owned(), self.parameters.clone());

        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("type", "function")?;
        map.serialize_entry("function", &function)?;
        map.end()
    }
}

/// A tool with typed arguments and output.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Static name of the tool.
    const NAME: &'static str;

    /// Arguments type for the tool.
    type Args: for<'de> Deserialize<'de> + Send;

    /// Output type of the tool.
    type Output: Serialize + Send;

    /// Error type for tool execution.
    type Error: Into<ToolError> + Send;

    /// Get the name of the tool.
    fn name(&self) -> &'static str {
        Self::NAME
    }

    /// Get the description of the tool.
    fn description(&self) -> String;

    /// Get the JSON schema for the tool's parameters.
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with the given arguments.
    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error>;

    /// Get the tool definition for LLM function calling.
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.parameters_schema())
    }

    /// Call the tool with JSON arguments and return JSON output.
    ///
    /// Accepts both an argument object and a JSON-encoded string, since
    /// some models emit arguments as a string.
    async fn call_json(&self, args: Value) -> Result<Value, ToolError>
    where
        Self::Output: 'static,
    {
        let typed_args: Self::Args = match &args {
            Value::String(s) => {
                serde_json::from_str(s).map_err(|e| ToolError::InvalidArguments(e.to_string()))?
            }
            _ => serde_json::from_value(args)
                .map_err(|e| ToolError::InvalidArguments(e.to_string()))?,
        };

        let result = self.call(typed_args).await.map_err(Into::into)?;
        serde_json::to_value(result).map_err(|e| ToolError::Execution(e.to_string()))
    }
}

/// A boxed dynamic tool that can be used in collections.
pub type BoxedTool = Box<dyn DynTool>;

/// Object-safe version of the [`Tool`] trait for dynamic dispatch.
#[async_trait]
pub trait DynTool: Send + Sync {
    /// Get the name of the tool.
    fn name(&self) -> &str;

    /// Get the description of the tool.
    fn description(&self) -> String;

    /// Get the tool definition.
    fn definition(&self) -> ToolDefinition;

    /// Call the tool with JSON arguments.
    async fn call_json(&self, args: Value) -> Result<Value, ToolError>;
}

#[async_trait]
impl<T: Tool + 'static> DynTool for T
where
    T::Output: 'static,
{
    fn name(&self) -> &str {
        Tool::name(self)
    }

    fn description(&self) -> String {
        Tool::description(self)
    }

    fn definition(&self) -> ToolDefinition {
        Tool::definition(self)
    }

    async fn call_json(&self, args: Value) -> Result<Value, ToolError> {
        Tool::call_json(self, args).await
    }
}

/// Execution policy for a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ToolExecutionPolicy {
    /// Agent can execute the tool autonomously without confirmation.
    #[default]
    Auto,
    /// Requires human confirmation before execution.
    RequireConfirmation,
    /// Tool execution is forbidden.
    Forbidden,
}

impl fmt::Display for ToolExecutionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::RequireConfirmation => write!(f, "require_confirmation"),
            Self::Forbidden => write!(f, "forbidden"),
        }
    }
}

/// Request for human confirmation before tool execution.
#[derive(Debug, Clone)]
pub struct ToolConfirmationRequest {
    /// The tool name.
    pub name: String,
    /// The tool arguments as JSON.
    pub arguments: Value,
    /// Human-readable description of what the tool will do.
    pub description: String,
}

impl ToolConfirmationRequest {
    /// Create a new confirmation request.
    #[must_use]
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        let name = name.into();
        let description = format!("Tool '{name}' wants to execute with arguments: {arguments}");
        Self {
            name,
            arguments,
            description,
        }
    }
}

/// Response to a tool confirmation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolConfirmationResponse {
    /// User approved the tool execution.
    Approved,
    /// User denied the tool execution.
    Denied,
}

impl ToolConfirmationResponse {
    /// Check if the response approves execution.
    #[must_use]
    pub const fn is_approved(&self) -> bool {
        matches!(self, Self::Approved)
    }
}

/// Handler for tool execution confirmation requests.
#[async_trait]
pub trait ConfirmationHandler: Send + Sync {
    /// Request confirmation for a tool execution.
    async fn confirm(&self, request: &ToolConfirmationRequest) -> ToolConfirmationResponse;
}

/// Confirmation handler that approves every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoApproveHandler;

#[async_trait]
impl ConfirmationHandler for AutoApproveHandler {
    async fn confirm(&self, _request: &ToolConfirmationRequest) -> ToolConfirmationResponse {
        ToolConfirmationResponse::Approved
    }
}

/// Confirmation handler that denies every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysDenyHandler;

#[async_trait]
impl ConfirmationHandler for AlwaysDenyHandler {
    async fn confirm(&self, _request: &ToolConfirmationRequest) -> ToolConfirmationResponse {
        ToolConfirmationResponse::Denied
    }
}

/// Outcome of one tool call, as handed back to the model.
#[derive(Debug, Clone)]
pub struct ToolCallResult {
    /// The tool name.
    pub name: String,
    /// The result of execution (success value or error).
    pub result: Result<Value, ToolError>,
}

impl ToolCallResult {
    /// Check if the call was successful.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Render the outcome as text for the LLM.
    #[must_use]
    pub fn to_string_for_llm(&self) -> String {
        match &self.result {
            Ok(Value::String(s)) => s.clone(),
            Ok(value) => value.to_string(),
            Err(e) => format!("Error: {e}"),
        }
    }
}

struct ToolEntry {
    tool: BoxedTool,
    policy: ToolExecutionPolicy,
}

/// The set of tools available to an agent, keyed by name.
#[derive(Default)]
pub struct ToolBox {
    tools: BTreeMap<String, ToolEntry>,
    auto_approved: HashSet<String>,
}

impl ToolBox {
    /// Create a new empty toolbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a typed tool with the default [`ToolExecutionPolicy::Auto`] policy.
    pub fn add<T: Tool + 'static>(&mut self, tool: T)
    where
        T::Output: 'static,
    {
        self.add_boxed(Box::new(tool));
    }

    /// Add a boxed tool with the default policy.
    pub fn add_boxed(&mut self, tool: BoxedTool) {
        self.add_boxed_with_policy(tool, ToolExecutionPolicy::Auto);
    }

    /// Add a boxed tool with an execution policy. Replaces any tool of the same name.
    pub fn add_boxed_with_policy(&mut self, tool: BoxedTool, policy: ToolExecutionPolicy) {
        self.tools
            .insert(tool.name().to_owned(), ToolEntry { tool, policy });
    }

    /// Get a tool by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BoxedTool> {
        self.tools.get(name).map(|entry| &entry.tool)
    }

    /// All tool definitions, ordered by name.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|e| e.tool.definition()).collect()
    }

    /// Tool names, ordered.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    /// Check if the toolbox contains a tool with the given name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Number of tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the toolbox has no tools.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Effective execution policy for a tool.
    #[must_use]
    pub fn policy(&self, name: &str) -> ToolExecutionPolicy {
        match self.tools.get(name) {
            Some(entry)
                if entry.policy == ToolExecutionPolicy::RequireConfirmation
                    && self.auto_approved.contains(name) =>
            {
                ToolExecutionPolicy::Auto
            }
            Some(entry) => entry.policy,
            None => ToolExecutionPolicy::Auto,
        }
    }

    /// Call a tool by name, refusing tools that are forbidden or need confirmation.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::NotFound`] for unknown tools, [`ToolError::Forbidden`]
    /// or [`ToolError::ConfirmationDenied`] when the policy blocks the call, and
    /// the tool's own error otherwise.
    pub async fn call(&self, name: &str, args: Value) -> Result<Value, ToolError> {
        self.call_with(name, args, &AlwaysDenyHandler).await
    }

    /// Call a tool by name, asking `handler` when the policy requires confirmation.
    ///
    /// # Errors
    ///
    /// See [`ToolBox::call`].
    pub async fn call_with(
        &self,
        name: &str,
        args: Value,
        handler: &dyn ConfirmationHandler,
    ) -> Result<Value, ToolError> {
        let entry = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::not_found(name))?;

        match self.policy(name) {
            ToolExecutionPolicy::Forbidden => {
                warn!(tool = name, "tool call blocked by policy");
                return Err(ToolError::forbidden(name));
            }
            ToolExecutionPolicy::RequireConfirmation => {
                let request = ToolConfirmationRequest::new(name, args.clone());
                if !handler.confirm(&request).await.is_approved() {
                    warn!(tool = name, "tool call denied by confirmation");
                    return Err(ToolError::confirmation_denied(name));
                }
            }
            ToolExecutionPolicy::Auto => {}
        }

        debug!(tool = name, %args, "calling tool");
        entry.tool.call_json(args).await
    }

    /// Call a tool and wrap the outcome for the model.
    pub async fn invoke(
        &self,
        name: &str,
        args: Value,
        handler: &dyn ConfirmationHandler,
    ) -> ToolCallResult {
        ToolCallResult {
            name: name.to_owned(),
            result: self.call_with(name, args, handler).await,
        }
    }

    /// Let a confirmation-gated tool run without asking again.
    pub fn mark_auto_approved(&mut self, name: impl Into<String>) {
        self.auto_approved.insert(name.into());
    }
}

impl fmt::Debug for ToolBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolBox")
            .field("tools", &self.names())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    struct EchoTool;

    #[derive(Deserialize)]
    struct EchoArgs {
        message: String,
    }

    #[async_trait]
    impl Tool for EchoTool {
        const NAME: &'static str = "echo";
        type Args = EchoArgs;
        type Output = String;
        type Error = ToolError;

        fn description(&self) -> String {
            "Echoes back the input message.".to_owned()
        }

        fn parameters_schema(&self) -> Value {
            serde_json::json!({
                "type": "object",
                "properties": { "message": { "type": "string" } },
                "required": ["message"]
            })
        }

        async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
            Ok(args.message)
        }
    }

    mod tool_definition {
        use super::*;

        #[test]
        fn serialize_to_openai_format() {
            let def = Tool::definition(&EchoTool);
            let json = serde_json::to_value(&def).unwrap();
            assert_eq!(json["type"], "function");
            assert_eq!(json["function"]["name"], "echo");
            assert_eq!(json["function"]["parameters"]["required"][0], "message");
        }

        #[test]
        fn required_params_reads_schema() {
            let def = Tool::definition(&EchoTool);
            assert_eq!(def.required_params(), vec!["message"]);
        }
    }

    mod toolbox {
        use super::*;

        #[tokio::test]
        async fn calls_tool_with_object_and_string_args() {
            let mut toolbox = ToolBox::new();
            toolbox.add(EchoTool);

            let out = toolbox
                .call("echo", serde_json::json!({"message": "hi"}))
                .await
                .unwrap();
            assert_eq!(out, Value::String("hi".into()));

            let out = toolbox
                .call("echo", Value::String(r#"{"message": "again"}"#.into()))
                .await
                .unwrap();
            assert_eq!(out, Value::String("again".into()));
        }

        #[tokio::test]
        async fn unknown_tool_is_not_found() {
            let toolbox = ToolBox::new();
            let err = toolbox.call("missing", Value::Null).await.unwrap_err();
            assert!(matches!(err, ToolError::NotFound(_)));
        }

        #[tokio::test]
        async fn forbidden_tool_is_refused() {
            let mut toolbox = ToolBox::new();
            toolbox.add_boxed_with_policy(Box::new(EchoTool), ToolExecutionPolicy::Forbidden);
            let err = toolbox
                .call("echo", serde_json::json!({"message": "x"}))
                .await
                .unwrap_err();
            assert!(matches!(err, ToolError::Forbidden(_)));
        }

        #[tokio::test]
        async fn confirmation_gate_respects_handler() {
            let mut toolbox = ToolBox::new();
            toolbox.add_boxed_with_policy(
                Box::new(EchoTool),
                ToolExecutionPolicy::RequireConfirmation,
            );
            let args = serde_json::json!({"message": "x"});

            let denied = toolbox.call("echo", args.clone()).await.unwrap_err();
            assert!(matches!(denied, ToolError::ConfirmationDenied(_)));

            let approved = toolbox
                .call_with("echo", args.clone(), &AutoApproveHandler)
                .await;
            assert!(approved.is_ok());

            toolbox.mark_auto_approved("echo");
            assert_eq!(toolbox.policy("echo"), ToolExecutionPolicy::Auto);
            assert!(toolbox.call("echo", args).await.is_ok());
        }

        #[tokio::test]
        async fn invoke_renders_errors_for_llm() {
            let mut toolbox = ToolBox::new();
            toolbox.add(EchoTool);

            let ok = toolbox
                .invoke("echo", serde_json::json!({"message": "hi"}), &AlwaysDenyHandler)
                .await;
            assert!(ok.is_success());
            assert_eq!(ok.to_string_for_llm(), "hi");

            let bad = toolbox
                .invoke("echo", serde_json::json!({}), &AlwaysDenyHandler)
                .await;
            assert!(!bad.is_success());
            assert!(bad.to_string_for_llm().starts_with("Error: Invalid arguments"));
        }

        #[test]
        fn names_are_sorted() {
            let mut toolbox = ToolBox::new();
            toolbox.add(EchoTool);
            assert_eq!(toolbox.names(), vec!["echo"]);
            assert_eq!(toolbox.len(), 1);
            assert!(!toolbox.is_empty());
        }
    }
}
