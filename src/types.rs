use chrono::{SecondsFormat, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Name of the list that always exists and can never be deleted.
pub const DEFAULT_LIST: &str = "default";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TodoStatus {
    pub const ALL: [TodoStatus; 3] = [
        TodoStatus::Pending,
        TodoStatus::InProgress,
        TodoStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TodoStatus::Pending => "pending",
            TodoStatus::InProgress => "in_progress",
            TodoStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TodoStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" | "todo" => Ok(TodoStatus::Pending),
            "in_progress" | "in-progress" | "progress" => Ok(TodoStatus::InProgress),
            "completed" | "done" => Ok(TodoStatus::Completed),
            _ => Err(format!(
                "Unknown status: {s} (expected pending, in_progress or completed)"
            )),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "high" | "h" => Ok(Priority::High),
            "medium" | "med" | "m" => Ok(Priority::Medium),
            "low" | "l" => Ok(Priority::Low),
            _ => Err(format!(
                "Unknown priority: {s} (expected high, medium or low)"
            )),
        }
    }
}

/// A single task. `status` and `priority` fall back to their defaults so
/// that items written by older versions still load.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TodoItem {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub status: TodoStatus,
    #[serde(default)]
    pub priority: Priority,
}

impl TodoItem {
    /// Creates a pending item with a freshly generated id.
    pub fn new(content: impl Into<String>, priority: Priority) -> Self {
        Self {
            id: Ulid::new().to_string(),
            content: content.into(),
            status: TodoStatus::Pending,
            priority,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == TodoStatus::Completed
    }

    /// Applies the supplied fields. The id is never touched.
    pub fn apply(&mut self, patch: &TodoPatch) {
        if let Some(content) = &patch.content {
            self.content = content.clone();
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
    }
}

/// Partial update for a [`TodoItem`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub content: Option<String>,
    pub status: Option<TodoStatus>,
    pub priority: Option<Priority>,
}

impl TodoPatch {
    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.status.is_none() && self.priority.is_none()
    }
}

/// Metadata for one list. The name is the key in [`TodoListsMetadata::lists`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoList {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created: String,
    pub last_modified: String,
    #[serde(default)]
    pub total_todos: usize,
    #[serde(default)]
    pub completed_todos: usize,
}

impl TodoList {
    pub fn new(description: Option<String>) -> Self {
        let now = now_timestamp();
        Self {
            description,
            created: now.clone(),
            last_modified: now,
            total_todos: 0,
            completed_todos: 0,
        }
    }

    /// Recomputes the derived counters from `items` and bumps `last_modified`.
    pub fn record_items(&mut self, items: &[TodoItem]) {
        self.total_todos = items.len();
        self.completed_todos = items.iter().filter(|t| t.is_completed()).count();
        self.last_modified = now_timestamp();
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoListsMetadata {
    pub active_list: String,
    #[serde(default)]
    pub lists: BTreeMap<String, TodoList>,
}

impl TodoListsMetadata {
    /// Metadata holding only the `default` list, described by `items`.
    pub fn with_default_list(items: &[TodoItem]) -> Self {
        let mut list = TodoList::new(Some("Default todo list".to_string()));
        list.record_items(items);
        let mut lists = BTreeMap::new();
        lists.insert(DEFAULT_LIST.to_string(), list);
        Self {
            active_list: DEFAULT_LIST.to_string(),
            lists,
        }
    }
}

/// A list's metadata annotated with its name, as returned when enumerating lists.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoListSummary {
    pub name: String,
    pub active: bool,
    #[serde(flatten)]
    pub list: TodoList,
}

/// How a caller-supplied id is matched against stored ids.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IdMatch {
    #[default]
    Exact,
    /// First item in list order whose id starts with the query.
    Prefix,
}

impl IdMatch {
    pub fn matches(&self, id: &str, query: &str) -> bool {
        match self {
            IdMatch::Exact => id == query,
            IdMatch::Prefix => !query.is_empty() && id.starts_with(query),
        }
    }
}

/// Per-status and per-priority tallies of a list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TodoSummary {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl TodoSummary {
    pub fn from_items(items: &[TodoItem]) -> Self {
        let mut summary = Self {
            total: items.len(),
            ..Self::default()
        };
        for item in items {
            match item.status {
                TodoStatus::Pending => summary.pending += 1,
                TodoStatus::InProgress => summary.in_progress += 1,
                TodoStatus::Completed => summary.completed += 1,
            }
            match item.priority {
                Priority::High => summary.high += 1,
                Priority::Medium => summary.medium += 1,
                Priority::Low => summary.low += 1,
            }
        }
        summary
    }

    pub fn count(&self, status: TodoStatus) -> usize {
        match status {
            TodoStatus::Pending => self.pending,
            TodoStatus::InProgress => self.in_progress,
            TodoStatus::Completed => self.completed,
        }
    }

    /// Completed share in whole percent; an empty list counts as 0%.
    pub fn percent_complete(&self) -> usize {
        if self.total == 0 {
            0
        } else {
            self.completed * 100 / self.total
        }
    }
}

/// ISO-8601 UTC timestamp with millisecond precision, e.g. `2025-01-01T12:00:00.000Z`.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_and_priority_wire_names() {
        let item = TodoItem {
            id: "01J".to_string(),
            content: "write docs".to_string(),
            status: TodoStatus::InProgress,
            priority: Priority::High,
        };
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(
            value,
            json!({"id": "01J", "content": "write docs", "status": "in_progress", "priority": "high"})
        );
    }

    #[test]
    fn test_legacy_item_without_status_or_priority() {
        let item: TodoItem = serde_json::from_value(json!({"id": "a1", "content": "old"})).unwrap();
        assert_eq!(item.status, TodoStatus::Pending);
        assert_eq!(item.priority, Priority::Medium);
    }

    #[test]
    fn test_parse_status_aliases() {
        assert_eq!("done".parse::<TodoStatus>().unwrap(), TodoStatus::Completed);
        assert_eq!("In-Progress".parse::<TodoStatus>().unwrap(), TodoStatus::InProgress);
        assert!("blocked".parse::<TodoStatus>().is_err());
        assert_eq!("H".parse::<Priority>().unwrap(), Priority::High);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_new_item_is_pending() {
        let item = TodoItem::new("buy milk", Priority::Low);
        assert!(!item.id.is_empty());
        assert_eq!(item.status, TodoStatus::Pending);
        assert_eq!(item.priority, Priority::Low);
    }

    #[test]
    fn test_apply_patch_keeps_id_and_untouched_fields() {
        let mut item = TodoItem::new("draft", Priority::Medium);
        let id = item.id.clone();
        item.apply(&TodoPatch {
            status: Some(TodoStatus::Completed),
            ..TodoPatch::default()
        });
        assert_eq!(item.id, id);
        assert_eq!(item.content, "draft");
        assert_eq!(item.priority, Priority::Medium);
        assert!(item.is_completed());
    }

    #[test]
    fn test_metadata_wire_format() {
        let meta = TodoListsMetadata::with_default_list(&[]);
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["activeList"], "default");
        assert_eq!(value["lists"]["default"]["totalTodos"], 0);
        assert_eq!(value["lists"]["default"]["completedTodos"], 0);
        assert!(value["lists"]["default"]["lastModified"].is_string());
        assert!(value["lists"]["default"].get("name").is_none());
    }

    #[test]
    fn test_id_match_policies() {
        assert!(IdMatch::Exact.matches("01ABC", "01ABC"));
        assert!(!IdMatch::Exact.matches("01ABC", "01A"));
        assert!(IdMatch::Prefix.matches("01ABC", "01A"));
        assert!(!IdMatch::Prefix.matches("01ABC", ""));
    }

    #[test]
    fn test_summary_counts() {
        let mut items = vec![
            TodoItem::new("a", Priority::High),
            TodoItem::new("b", Priority::Low),
            TodoItem::new("c", Priority::Low),
        ];
        items[0].status = TodoStatus::Completed;
        items[1].status = TodoStatus::InProgress;
        let summary = TodoSummary::from_items(&items);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.count(TodoStatus::Completed), 1);
        assert_eq!(summary.count(TodoStatus::InProgress), 1);
        assert_eq!(summary.count(TodoStatus::Pending), 1);
        assert_eq!(summary.low, 2);
        assert_eq!(summary.percent_complete(), 33);
        assert_eq!(TodoSummary::default().percent_complete(), 0);
    }
}
