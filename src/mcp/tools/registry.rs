//! Tool registry - central routing for MCP tools.
//!
//! Provides `list_tools()` and `call_tool()` for the MCP `tools/*` methods.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ServerConfig;
use crate::mcp::content::ToolResult;
use crate::mcp::conversion::{
    ConversionError, ConversionPipeline, ConvertOutcome, ConvertRequest,
};

use super::give_pdf;
use super::health;
use super::validate;

/// Tool descriptor as returned by `tools/list`.
#[derive(Debug, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Central registry for all MCP tools.
pub struct ToolRegistry {
    owner_number: String,
    pipeline: Arc<ConversionPipeline>,
}

impl ToolRegistry {
    pub fn new(config: &ServerConfig) -> Result<Self, ConversionError> {
        Ok(Self::with_pipeline(
            config.owner_number.clone(),
            Arc::new(ConversionPipeline::from_config(config)?),
        ))
    }

    pub fn with_pipeline(
        owner_number: impl Into<String>,
        pipeline: Arc<ConversionPipeline>,
    ) -> Self {
        Self {
            owner_number: owner_number.into(),
            pipeline,
        }
    }

    pub fn pipeline(&self) -> Arc<ConversionPipeline> {
        Arc::clone(&self.pipeline)
    }

    /// List all available tools.
    pub fn list_tools(&self) -> Vec<ToolDescriptor> {
        vec![
            validate::descriptor(),
            give_pdf::descriptor(),
            health::descriptor(),
        ]
    }

    /// Call a tool by name with the given arguments.
    pub async fn call_tool(&self, name: &str, arguments: Option<Value>) -> ToolResult {
        match name {
            validate::TOOL_NAME => self.call_validate(),
            health::TOOL_NAME => self.call_health().await,
            name if give_pdf::matches(name) => self.call_give_pdf(arguments).await,
            _ => ToolResult::error(format!(
                "Tool '{}' is not available. Available tools: {}, {}, {}",
                name,
                validate::TOOL_NAME,
                give_pdf::TOOL_NAME,
                health::TOOL_NAME,
            )),
        }
    }

    fn call_validate(&self) -> ToolResult {
        ToolResult::success_text(self.owner_number.clone())
    }

    async fn call_give_pdf(&self, arguments: Option<Value>) -> ToolResult {
        let request = match parse_arguments::<ConvertRequest>(arguments) {
            Ok(req) => req,
            Err(err) => return failure(err),
        };

        let outcome = self.pipeline.run(request).await;
        ToolResult::structured(&outcome, !outcome.success)
    }

    async fn call_health(&self) -> ToolResult {
        let report = self.pipeline.health().await;
        ToolResult::structured(&report, false)
    }
}

fn failure(message: String) -> ToolResult {
    let outcome = ConvertOutcome::failure(message);
    ToolResult::structured(&outcome, true)
}

fn parse_arguments<T: for<'de> Deserialize<'de>>(arguments: Option<Value>) -> Result<T, String> {
    let value = match arguments {
        None | Some(Value::Null) => Value::Object(Default::default()),
        Some(value) => value,
    };
    serde_json::from_value(value).map_err(|err| format!("Invalid arguments: {}", err))
}
