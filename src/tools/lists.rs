use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};

use super::TodoTool;
use crate::error::ServiceResult;
use crate::store::TodoStore;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateListParams {
    /// New list name; may not contain '/' or '\'
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DeleteListParams {
    pub name: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SwitchListParams {
    pub name: String,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListListsParams {}

pub struct CreateListTool;

impl TodoTool for CreateListTool {
    const NAME: &'static str = "create_list";
    const DESCRIPTION: &'static str = "Create a new, empty todo list";
    type Params = CreateListParams;
}

impl CreateListTool {
    pub async fn run_tool(params: CreateListParams, store: &TodoStore) -> ServiceResult<Value> {
        let description = params.description.filter(|d| !d.trim().is_empty());
        let list = store.create_list(&params.name, description)?;
        Ok(json!({ "list": list }))
    }
}

pub struct DeleteListTool;

impl TodoTool for DeleteListTool {
    const NAME: &'static str = "delete_list";
    const DESCRIPTION: &'static str =
        "Delete a todo list and its todos; the 'default' list cannot be deleted";
    type Params = DeleteListParams;
}

impl DeleteListTool {
    pub async fn run_tool(params: DeleteListParams, store: &TodoStore) -> ServiceResult<Value> {
        store.delete_list(&params.name)?;
        let active = store.active_list_name()?;
        Ok(json!({ "deleted": params.name, "activeList": active }))
    }
}

pub struct SwitchListTool;

impl TodoTool for SwitchListTool {
    const NAME: &'static str = "switch_list";
    const DESCRIPTION: &'static str = "Make a list the active one";
    type Params = SwitchListParams;
}

impl SwitchListTool {
    pub async fn run_tool(params: SwitchListParams, store: &TodoStore) -> ServiceResult<Value> {
        store.switch_active_list(&params.name)?;
        Ok(json!({ "activeList": params.name }))
    }
}

pub struct ListListsTool;

impl TodoTool for ListListsTool {
    const NAME: &'static str = "list_lists";
    const DESCRIPTION: &'static str = "List every todo list with its counters and the active list";
    type Params = ListListsParams;
}

impl ListListsTool {
    pub async fn run_tool(_params: ListListsParams, store: &TodoStore) -> ServiceResult<Value> {
        let lists = store.list_todo_lists()?;
        let active = store.active_list_name()?;
        Ok(json!({ "activeList": active, "lists": lists }))
    }
}
