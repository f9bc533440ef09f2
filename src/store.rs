use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::types::{
    DEFAULT_LIST, IdMatch, Priority, TodoItem, TodoList, TodoListSummary, TodoListsMetadata,
    TodoPatch,
};

/// Environment variable overriding the store root.
pub const STORE_DIR_ENV: &str = "MCP_TODO_DIR";

const METADATA_FILE: &str = "metadata.json";
const LISTS_DIR: &str = "lists";
const LEGACY_FILE: &str = "todos.json";

pub type StoreResult<T> = core::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Todo store is not initialized (missing {0})")]
    NotInitialized(PathBuf),
    #[error("List not found: {0}")]
    ListNotFound(String),
    #[error("Todo not found: {0}")]
    TodoNotFound(String),
    #[error("Invalid list name '{0}': names must be non-empty and cannot contain '/' or '\\'")]
    InvalidListName(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("List already exists: {0}")]
    ListExists(String),
    #[error("Cannot delete the 'default' list")]
    ProtectedList,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Coarse classification of [`StoreError`] shown to callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NotInitialized,
    NotFound,
    InvalidInput,
    AlreadyExists,
    ProtectedResource,
    Io,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotInitialized => "not-initialized",
            ErrorKind::NotFound => "not-found",
            ErrorKind::InvalidInput => "invalid-input",
            ErrorKind::AlreadyExists => "already-exists",
            ErrorKind::ProtectedResource => "protected-resource",
            ErrorKind::Io => "io",
        }
    }
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::NotInitialized(_) => ErrorKind::NotInitialized,
            StoreError::ListNotFound(_) | StoreError::TodoNotFound(_) => ErrorKind::NotFound,
            StoreError::InvalidListName(_) | StoreError::InvalidInput(_) => ErrorKind::InvalidInput,
            StoreError::ListExists(_) => ErrorKind::AlreadyExists,
            StoreError::ProtectedList => ErrorKind::ProtectedResource,
            StoreError::Io(_) | StoreError::Json { .. } => ErrorKind::Io,
        }
    }
}

/// Handle to a todo store rooted at a directory.
///
/// Every operation reads the files it needs from disk, applies its change and
/// writes the result back, so several processes may share one root. Nothing
/// is cached between calls; concurrent writers race with last-write-wins.
#[derive(Clone, Debug)]
pub struct TodoStore {
    root: PathBuf,
    id_match: IdMatch,
}

impl TodoStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            id_match: IdMatch::Exact,
        }
    }

    pub fn with_id_match(mut self, id_match: IdMatch) -> Self {
        self.id_match = id_match;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.root.join(METADATA_FILE)
    }

    pub fn lists_dir(&self) -> PathBuf {
        self.root.join(LISTS_DIR)
    }

    pub fn list_path(&self, name: &str) -> PathBuf {
        self.lists_dir().join(format!("{name}.json"))
    }

    fn legacy_path(&self) -> PathBuf {
        self.root.join(LEGACY_FILE)
    }

    /// Creates the directory layout, migrates a legacy `todos.json` and makes
    /// sure a `default` list exists. Safe to call repeatedly.
    pub fn initialize(&self) -> StoreResult<()> {
        fs::create_dir_all(self.lists_dir())?;

        self.migrate_legacy()?;

        if !self.metadata_path().exists() {
            write_json(&self.list_path(DEFAULT_LIST), &Vec::<TodoItem>::new())?;
            self.save_metadata(&TodoListsMetadata::with_default_list(&[]))?;
            tracing::info!(root = %self.root.display(), "Initialized todo store");
        }
        Ok(())
    }

    fn migrate_legacy(&self) -> StoreResult<()> {
        let legacy = self.legacy_path();
        if self.metadata_path().exists() || !legacy.exists() {
            return Ok(());
        }

        let items: Vec<TodoItem> = read_json(&legacy)?;
        write_json(&self.list_path(DEFAULT_LIST), &items)?;
        self.save_metadata(&TodoListsMetadata::with_default_list(&items))?;
        fs::remove_file(&legacy)?;

        tracing::info!(
            count = items.len(),
            from = %legacy.display(),
            "Migrated legacy todos into the default list"
        );
        Ok(())
    }

    pub fn metadata(&self) -> StoreResult<TodoListsMetadata> {
        let path = self.metadata_path();
        if !path.exists() {
            return Err(StoreError::NotInitialized(path));
        }
        read_json(&path)
    }

    fn save_metadata(&self, metadata: &TodoListsMetadata) -> StoreResult<()> {
        write_json(&self.metadata_path(), metadata)
    }

    pub fn active_list_name(&self) -> StoreResult<String> {
        Ok(self.metadata()?.active_list)
    }

    /// Resolves an optional list name to the list an operation targets.
    /// Explicit names are validated since they become file names.
    pub fn resolve_list_name(&self, list_name: Option<&str>) -> StoreResult<String> {
        match list_name {
            Some(name) => {
                validate_list_name(name)?;
                Ok(name.to_string())
            }
            None => self.active_list_name(),
        }
    }

    pub fn list_todo_lists(&self) -> StoreResult<Vec<TodoListSummary>> {
        let metadata = self.metadata()?;
        Ok(metadata
            .lists
            .into_iter()
            .map(|(name, list)| TodoListSummary {
                active: name == metadata.active_list,
                name,
                list,
            })
            .collect())
    }

    pub fn create_list(
        &self,
        name: &str,
        description: Option<String>,
    ) -> StoreResult<TodoListSummary> {
        validate_list_name(name)?;

        let mut metadata = self.metadata()?;
        if metadata.lists.contains_key(name) {
            return Err(StoreError::ListExists(name.to_string()));
        }

        let list = TodoList::new(description);
        write_json(&self.list_path(name), &Vec::<TodoItem>::new())?;
        metadata.lists.insert(name.to_string(), list.clone());
        self.save_metadata(&metadata)?;

        tracing::debug!(list = name, "Created list");
        Ok(TodoListSummary {
            name: name.to_string(),
            active: metadata.active_list == name,
            list,
        })
    }

    pub fn delete_list(&self, name: &str) -> StoreResult<()> {
        if name == DEFAULT_LIST {
            return Err(StoreError::ProtectedList);
        }

        let mut metadata = self.metadata()?;
        if metadata.lists.remove(name).is_none() {
            return Err(StoreError::ListNotFound(name.to_string()));
        }
        if metadata.active_list == name {
            metadata.active_list = DEFAULT_LIST.to_string();
        }
        self.save_metadata(&metadata)?;

        let path = self.list_path(name);
        if path.exists() {
            fs::remove_file(path)?;
        }

        tracing::debug!(list = name, "Deleted list");
        Ok(())
    }

    pub fn switch_active_list(&self, name: &str) -> StoreResult<()> {
        let mut metadata = self.metadata()?;
        if !metadata.lists.contains_key(name) {
            return Err(StoreError::ListNotFound(name.to_string()));
        }
        metadata.active_list = name.to_string();
        self.save_metadata(&metadata)?;

        tracing::debug!(list = name, "Switched active list");
        Ok(())
    }

    pub fn read_todos(&self, list_name: Option<&str>) -> StoreResult<Vec<TodoItem>> {
        let name = self.resolve_list_name(list_name)?;
        self.read_list_file(&name)
    }

    fn read_list_file(&self, name: &str) -> StoreResult<Vec<TodoItem>> {
        let path = self.list_path(name);
        if !self.metadata()?.lists.contains_key(name) || !path.exists() {
            return Err(StoreError::ListNotFound(name.to_string()));
        }
        read_json(&path)
    }

    /// Replaces the list's items wholesale and refreshes its counters.
    pub fn write_todos(&self, items: &[TodoItem], list_name: Option<&str>) -> StoreResult<()> {
        let name = self.resolve_list_name(list_name)?;
        self.persist_items(&name, items)
    }

    /// Writes items only for lists registered in the metadata, so the counters
    /// are refreshed together with every item write.
    fn persist_items(&self, name: &str, items: &[TodoItem]) -> StoreResult<()> {
        if !self.metadata()?.lists.contains_key(name) {
            return Err(StoreError::ListNotFound(name.to_string()));
        }
        write_json(&self.list_path(name), items)?;

        // Re-read after the item write so another process' metadata change
        // (a new list, a switch) is not clobbered.
        let mut metadata = self.metadata()?;
        let list = metadata
            .lists
            .get_mut(name)
            .ok_or_else(|| StoreError::ListNotFound(name.to_string()))?;
        list.record_items(items);
        self.save_metadata(&metadata)?;

        tracing::debug!(list = name, count = items.len(), "Saved todos");
        Ok(())
    }

    pub fn add_todo(
        &self,
        content: &str,
        priority: Option<Priority>,
        list_name: Option<&str>,
    ) -> StoreResult<TodoItem> {
        let name = self.resolve_list_name(list_name)?;
        let mut items = self.read_list_file(&name)?;

        let item = TodoItem::new(content, priority.unwrap_or_default());
        items.push(item.clone());
        self.persist_items(&name, &items)?;
        Ok(item)
    }

    pub fn update_todo(
        &self,
        id: &str,
        patch: &TodoPatch,
        list_name: Option<&str>,
    ) -> StoreResult<TodoItem> {
        let name = self.resolve_list_name(list_name)?;
        let mut items = self.read_list_file(&name)?;

        let index = self
            .find_todo(&items, id)
            .ok_or_else(|| StoreError::TodoNotFound(id.to_string()))?;
        items[index].apply(patch);
        let updated = items[index].clone();

        self.persist_items(&name, &items)?;
        Ok(updated)
    }

    pub fn delete_todo(&self, id: &str, list_name: Option<&str>) -> StoreResult<TodoItem> {
        let name = self.resolve_list_name(list_name)?;
        let mut items = self.read_list_file(&name)?;

        let index = self
            .find_todo(&items, id)
            .ok_or_else(|| StoreError::TodoNotFound(id.to_string()))?;
        let removed = items.remove(index);

        self.persist_items(&name, &items)?;
        Ok(removed)
    }

    fn find_todo(&self, items: &[TodoItem], id: &str) -> Option<usize> {
        items.iter().position(|t| self.id_match.matches(&t.id, id))
    }
}

/// Store root: explicit override, else `$MCP_TODO_DIR`, else `~/.mcp-todo`.
pub fn resolve_store_root(explicit: Option<PathBuf>) -> StoreResult<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    if let Some(dir) = std::env::var_os(STORE_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".mcp-todo"))
        .ok_or_else(|| {
            StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("couldn't find home dir; set {STORE_DIR_ENV}"),
            ))
        })
}

pub fn validate_list_name(name: &str) -> StoreResult<()> {
    if name.trim().is_empty() || name.contains(['/', '\\']) {
        return Err(StoreError::InvalidListName(name.to_string()));
    }
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> StoreResult<T> {
    let contents = fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes pretty JSON through a sibling temporary file and an atomic rename
/// to avoid partial writes.
fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(value).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let temp = path.with_extension("json.tmp");
    let mut f = File::create(&temp)?;
    f.write_all(content.as_bytes())?;
    f.sync_all()?;
    fs::rename(temp, path)?;
    Ok(())
}
