//! Typed tool surface of the MCP server.
//!
//! Incoming calls are parsed into a [`ToolBox`] variant (one per tool) before
//! anything touches the store, so argument problems surface as
//! [`ServiceError::InvalidArguments`] instead of reaching the store layer.

pub mod items;
pub mod lists;

use std::sync::Arc;

use rmcp::model::{CallToolRequestParam, JsonObject, Tool};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use items::*;
pub use lists::*;

use crate::error::{ServiceError, ServiceResult};
use crate::invoke_tools;
use crate::store::TodoStore;

/// Static description of one tool.
pub trait TodoTool {
    const NAME: &'static str;
    const DESCRIPTION: &'static str;
    type Params: DeserializeOwned + JsonSchema;

    fn definition() -> Tool {
        let schema = match serde_json::to_value(schemars::schema_for!(Self::Params)) {
            Ok(Value::Object(map)) => map,
            _ => JsonObject::new(),
        };
        Tool::new(Self::NAME, Self::DESCRIPTION, Arc::new(schema))
    }

    fn parse(arguments: Option<JsonObject>) -> ServiceResult<Self::Params> {
        serde_json::from_value(Value::Object(arguments.unwrap_or_default()))
            .map_err(|e| ServiceError::invalid_arguments(Self::NAME, e.to_string()))
    }
}

#[derive(Debug)]
pub enum ToolBox {
    ReadTodosTool(ReadTodosParams),
    WriteTodosTool(WriteTodosParams),
    AddTodoTool(AddTodoParams),
    UpdateTodoTool(UpdateTodoParams),
    DeleteTodoTool(DeleteTodoParams),
    CreateListTool(CreateListParams),
    DeleteListTool(DeleteListParams),
    SwitchListTool(SwitchListParams),
    ListListsTool(ListListsParams),
}

impl ToolBox {
    pub fn tools() -> Vec<Tool> {
        vec![
            ReadTodosTool::definition(),
            WriteTodosTool::definition(),
            AddTodoTool::definition(),
            UpdateTodoTool::definition(),
            DeleteTodoTool::definition(),
            CreateListTool::definition(),
            DeleteListTool::definition(),
            SwitchListTool::definition(),
            ListListsTool::definition(),
        ]
    }

    pub fn parse(name: &str, arguments: Option<JsonObject>) -> ServiceResult<Self> {
        let tool = match name {
            ReadTodosTool::NAME => ToolBox::ReadTodosTool(ReadTodosTool::parse(arguments)?),
            WriteTodosTool::NAME => ToolBox::WriteTodosTool(WriteTodosTool::parse(arguments)?),
            AddTodoTool::NAME => ToolBox::AddTodoTool(AddTodoTool::parse(arguments)?),
            UpdateTodoTool::NAME => ToolBox::UpdateTodoTool(UpdateTodoTool::parse(arguments)?),
            DeleteTodoTool::NAME => ToolBox::DeleteTodoTool(DeleteTodoTool::parse(arguments)?),
            CreateListTool::NAME => ToolBox::CreateListTool(CreateListTool::parse(arguments)?),
            DeleteListTool::NAME => ToolBox::DeleteListTool(DeleteListTool::parse(arguments)?),
            SwitchListTool::NAME => ToolBox::SwitchListTool(SwitchListTool::parse(arguments)?),
            ListListsTool::NAME => ToolBox::ListListsTool(ListListsTool::parse(arguments)?),
            other => return Err(ServiceError::UnknownTool(other.to_string())),
        };
        Ok(tool)
    }

    pub async fn run(self, store: &TodoStore) -> ServiceResult<Value> {
        invoke_tools!(
            self,
            store,
            ReadTodosTool,
            WriteTodosTool,
            AddTodoTool,
            UpdateTodoTool,
            DeleteTodoTool,
            CreateListTool,
            DeleteListTool,
            SwitchListTool,
            ListListsTool,
        )
    }
}

impl TryFrom<CallToolRequestParam> for ToolBox {
    type Error = ServiceError;

    fn try_from(request: CallToolRequestParam) -> Result<Self, Self::Error> {
        ToolBox::parse(&request.name, request.arguments)
    }
}

/// Treats a blank `listName` argument the same as an absent one.
pub(crate) fn list_arg(list_name: &Option<String>) -> Option<&str> {
    list_name.as_deref().map(str::trim).filter(|n| !n.is_empty())
}
