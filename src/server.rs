use std::future::ready;

use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{ErrorData, ServerHandler, ServiceExt, transport::stdio};
use serde_json::Value;

use crate::error::{ServiceError, ServiceResult};
use crate::store::TodoStore;
use crate::tools::ToolBox;

const INSTRUCTIONS: &str = "Todo list server. Todos live in named lists; one list is active and \
is used whenever a tool call omits `listName`. Use `list_lists` to discover lists, `read_todos` \
to see items and `add_todo` / `update_todo` to track progress (status: pending, in_progress, \
completed). Item ids must be passed exactly as returned.";

#[derive(Clone)]
pub struct TodoServer {
    store: TodoStore,
}

impl TodoServer {
    pub fn new(store: TodoStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &TodoStore {
        &self.store
    }

    /// Runs one tool call. Failures become error results so a bad call never
    /// ends the session; only an unknown tool name is a protocol error.
    pub async fn handle_call(
        &self,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult, ErrorData> {
        let tool_name = request.name.to_string();
        let tool = match ToolBox::try_from(request) {
            Ok(tool) => tool,
            Err(ServiceError::UnknownTool(name)) => {
                return Err(ErrorData::invalid_params(
                    format!("Unknown tool: {name}"),
                    None,
                ));
            }
            Err(err) => return Ok(error_result(&tool_name, &err)),
        };

        match tool.run(&self.store).await {
            Ok(value) => Ok(success_result(&value)),
            Err(err) => Ok(error_result(&tool_name, &err)),
        }
    }
}

fn success_result(value: &Value) -> CallToolResult {
    let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    CallToolResult::success(vec![Content::text(text)])
}

fn error_result(tool_name: &str, err: &ServiceError) -> CallToolResult {
    tracing::warn!(tool = tool_name, error = %err, "Tool call failed");
    let message = match err {
        ServiceError::Store(store_err) => {
            format!("[{}] {store_err}", store_err.kind().as_str())
        }
        other => other.to_string(),
    };
    CallToolResult::error(vec![Content::text(message)])
}

impl ServerHandler for TodoServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }

    fn ping(
        &self,
        _ctx: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<(), ErrorData>> + Send {
        ready(Ok(()))
    }

    fn list_tools(
        &self,
        _req: Option<PaginatedRequestParam>,
        _ctx: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, ErrorData>> + Send {
        ready(Ok(ListToolsResult {
            tools: ToolBox::tools(),
            next_cursor: None,
        }))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        self.handle_call(request).await
    }
}

/// Serves the MCP protocol over stdin/stdout until the client disconnects.
pub async fn start_server(store: TodoStore) -> ServiceResult<()> {
    tracing::info!(root = %store.root().display(), "Starting todo MCP server on stdio");

    let service = TodoServer::new(store)
        .serve(stdio())
        .await
        .map_err(|e| ServiceError::Other(format!("failed to start MCP service: {e}")))?;
    let reason = service
        .waiting()
        .await
        .map_err(|e| ServiceError::Other(format!("MCP service task failed: {e}")))?;

    tracing::info!(?reason, "MCP server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::borrow::Cow;
    use tempfile::TempDir;

    fn server() -> (TempDir, TodoServer) {
        let dir = TempDir::new().unwrap();
        let store = TodoStore::new(dir.path());
        store.initialize().unwrap();
        (dir, TodoServer::new(store))
    }

    fn request(name: &'static str, arguments: Value) -> CallToolRequestParam {
        CallToolRequestParam {
            name: Cow::Borrowed(name),
            arguments: arguments.as_object().cloned(),
        }
    }

    fn text_of(result: &CallToolResult) -> String {
        result
            .content
            .iter()
            .filter_map(|c| c.as_text().map(|t| t.text.clone()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[tokio::test]
    async fn test_failed_calls_do_not_stop_the_server() {
        let (_dir, server) = server();

        let missing = server
            .handle_call(request("add_todo", json!({})))
            .await
            .unwrap();
        assert_eq!(missing.is_error, Some(true));
        assert!(text_of(&missing).contains("add_todo"));

        let protected = server
            .handle_call(request("delete_list", json!({"name": "default"})))
            .await
            .unwrap();
        assert_eq!(protected.is_error, Some(true));
        assert!(text_of(&protected).starts_with("[protected-resource]"));

        let ok = server
            .handle_call(request("add_todo", json!({"content": "still serving"})))
            .await
            .unwrap();
        assert_eq!(ok.is_error, Some(false));
        let body: Value = serde_json::from_str(&text_of(&ok)).unwrap();
        assert_eq!(body["todo"]["content"], "still serving");
        assert_eq!(server.store().read_todos(None).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_protocol_error() {
        let (_dir, server) = server();
        let err = server
            .handle_call(request("echo", json!({"message": "hi"})))
            .await
            .unwrap_err();
        assert!(err.message.contains("echo"));
    }

    #[tokio::test]
    async fn test_not_found_is_reported() {
        let (_dir, server) = server();
        let result = server
            .handle_call(request("switch_list", json!({"name": "ghost"})))
            .await
            .unwrap();
        assert_eq!(result.is_error, Some(true));
        assert!(text_of(&result).starts_with("[not-found]"));
    }

    #[test]
    fn test_server_info_enables_tools() {
        let (_dir, server) = server();
        let info = server.get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.instructions.unwrap().contains("listName"));
    }
}
