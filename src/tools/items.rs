use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{TodoTool, list_arg};
use crate::error::ServiceResult;
use crate::store::{StoreError, TodoStore};
use crate::types::{Priority, TodoItem, TodoPatch, TodoStatus};

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReadTodosParams {
    /// List to read; defaults to the active list
    #[serde(default)]
    pub list_name: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WriteTodosParams {
    /// Complete replacement for the list's items
    pub todos: Vec<TodoItem>,
    /// List to overwrite; defaults to the active list
    #[serde(default)]
    pub list_name: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddTodoParams {
    /// Task description
    pub content: String,
    /// Defaults to medium
    #[serde(default)]
    pub priority: Option<Priority>,
    /// Target list; defaults to the active list
    #[serde(default)]
    pub list_name: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateTodoParams {
    /// Exact id of the todo to update
    pub id: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub status: Option<TodoStatus>,
    #[serde(default)]
    pub priority: Option<Priority>,
    /// Target list; defaults to the active list
    #[serde(default)]
    pub list_name: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeleteTodoParams {
    /// Exact id of the todo to delete
    pub id: String,
    /// Target list; defaults to the active list
    #[serde(default)]
    pub list_name: Option<String>,
}

pub struct ReadTodosTool;

impl TodoTool for ReadTodosTool {
    const NAME: &'static str = "read_todos";
    const DESCRIPTION: &'static str = "Read all todos of a list (the active list by default)";
    type Params = ReadTodosParams;
}

impl ReadTodosTool {
    pub async fn run_tool(params: ReadTodosParams, store: &TodoStore) -> ServiceResult<Value> {
        let list_name = store.resolve_list_name(list_arg(&params.list_name))?;
        let todos = store.read_todos(Some(&list_name))?;
        Ok(json!({ "listName": list_name, "todos": todos }))
    }
}

pub struct WriteTodosTool;

impl TodoTool for WriteTodosTool {
    const NAME: &'static str = "write_todos";
    const DESCRIPTION: &'static str =
        "Replace every todo of a list with the given collection (the active list by default)";
    type Params = WriteTodosParams;
}

impl WriteTodosTool {
    pub async fn run_tool(params: WriteTodosParams, store: &TodoStore) -> ServiceResult<Value> {
        let list_name = store.resolve_list_name(list_arg(&params.list_name))?;
        store.write_todos(&params.todos, Some(&list_name))?;
        let completed = params.todos.iter().filter(|t| t.is_completed()).count();
        Ok(json!({
            "listName": list_name,
            "totalTodos": params.todos.len(),
            "completedTodos": completed,
        }))
    }
}

pub struct AddTodoTool;

impl TodoTool for AddTodoTool {
    const NAME: &'static str = "add_todo";
    const DESCRIPTION: &'static str = "Add a pending todo to a list (the active list by default)";
    type Params = AddTodoParams;
}

impl AddTodoTool {
    pub async fn run_tool(params: AddTodoParams, store: &TodoStore) -> ServiceResult<Value> {
        if params.content.trim().is_empty() {
            return Err(StoreError::InvalidInput("content must not be empty".to_string()).into());
        }
        let list_name = store.resolve_list_name(list_arg(&params.list_name))?;
        let todo = store.add_todo(&params.content, params.priority, Some(&list_name))?;
        Ok(json!({ "listName": list_name, "todo": todo }))
    }
}

pub struct UpdateTodoTool;

impl TodoTool for UpdateTodoTool {
    const NAME: &'static str = "update_todo";
    const DESCRIPTION: &'static str =
        "Update the content, status or priority of a todo; omitted fields are left unchanged";
    type Params = UpdateTodoParams;
}

impl UpdateTodoTool {
    pub async fn run_tool(params: UpdateTodoParams, store: &TodoStore) -> ServiceResult<Value> {
        let patch = TodoPatch {
            content: params.content,
            status: params.status,
            priority: params.priority,
        };
        if patch.is_empty() {
            return Err(StoreError::InvalidInput(
                "provide at least one of content, status or priority".to_string(),
            )
            .into());
        }
        if patch.content.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(StoreError::InvalidInput("content must not be empty".to_string()).into());
        }
        let list_name = store.resolve_list_name(list_arg(&params.list_name))?;
        let todo = store.update_todo(&params.id, &patch, Some(&list_name))?;
        Ok(json!({ "listName": list_name, "todo": todo }))
    }
}

pub struct DeleteTodoTool;

impl TodoTool for DeleteTodoTool {
    const NAME: &'static str = "delete_todo";
    const DESCRIPTION: &'static str = "Delete a todo by id";
    type Params = DeleteTodoParams;
}

impl DeleteTodoTool {
    pub async fn run_tool(params: DeleteTodoParams, store: &TodoStore) -> ServiceResult<Value> {
        let list_name = store.resolve_list_name(list_arg(&params.list_name))?;
        let todo = store.delete_todo(&params.id, Some(&list_name))?;
        Ok(json!({ "listName": list_name, "todo": todo }))
    }
}
