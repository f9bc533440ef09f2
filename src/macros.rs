/// Generates a `match` expression dispatching `ToolBox` variants to their tool's `run_tool` function.
///
/// Every listed identifier must name both a variant of the enum and a type with
/// an associated function of the shape:
/// ```ignore
/// async fn run_tool(params: ParamsType, store: &TodoStore) -> ServiceResult<serde_json::Value>
/// ```
///
/// # Example
/// ```ignore
/// invoke_tools!(tool, &store, ReadTodosTool, AddTodoTool)
/// ```
/// expands to
/// ```ignore
/// match tool {
///     ToolBox::ReadTodosTool(params) => ReadTodosTool::run_tool(params, &store).await,
///     ToolBox::AddTodoTool(params) => AddTodoTool::run_tool(params, &store).await,
/// }
/// ```
#[macro_export]
macro_rules! invoke_tools {
    ($params:expr, $store:expr, $($tool:ident),* $(,)?) => {
        match $params {
            $(
                ToolBox::$tool(params) => $tool::run_tool(params, $store).await,
            )*
        }
    };
}
