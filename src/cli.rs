use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::metadata::{PKG_DESCRIPTION, PKG_NAME, PKG_VERSION};
use crate::store::validate_list_name;
use crate::types::{IdMatch, Priority, TodoStatus};

#[derive(Parser, Debug, Clone)]
#[command(name = PKG_NAME)]
#[command(version = PKG_VERSION)]
#[command(about = PKG_DESCRIPTION, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub store: StoreArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// Directory holding metadata.json and lists/ (defaults to ~/.mcp-todo)
    #[arg(long, global = true, env = "MCP_TODO_DIR")]
    pub store_dir: Option<PathBuf>,

    /// Match todo ids exactly instead of by prefix
    #[arg(long, global = true, env = "MCP_TODO_EXACT_IDS", default_value_t = false)]
    pub exact_ids: bool,
}

impl StoreArgs {
    /// Id matching used by interactive commands. The server always matches exactly.
    pub fn id_match(&self) -> IdMatch {
        if self.exact_ids {
            IdMatch::Exact
        } else {
            IdMatch::Prefix
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Start the MCP server on stdio
    Serve,
    /// Create the store (and migrate legacy todos) if needed
    Init,
    /// Add a todo
    Add {
        /// Task description
        #[arg(required = true, num_args = 1..)]
        content: Vec<String>,
        /// high, medium or low
        #[arg(short, long)]
        priority: Option<Priority>,
        /// Target list (defaults to the active list)
        #[arg(short, long)]
        list: Option<String>,
    },
    /// Show todos as a table
    List {
        #[arg(short, long)]
        list: Option<String>,
        /// Only show todos with this status
        #[arg(short, long)]
        status: Option<TodoStatus>,
        /// Only show todos with this priority
        #[arg(short, long)]
        priority: Option<Priority>,
    },
    /// Show the dashboard of a list
    Show {
        #[arg(short, long)]
        list: Option<String>,
    },
    /// Show the dashboard and refresh it whenever the list changes
    Watch {
        #[arg(short, long)]
        list: Option<String>,
    },
    /// Update a todo (ids may be shortened to a unique prefix)
    Update {
        id: String,
        #[arg(short, long)]
        content: Option<String>,
        #[arg(short, long)]
        status: Option<TodoStatus>,
        #[arg(short, long)]
        priority: Option<Priority>,
        #[arg(short, long)]
        list: Option<String>,
    },
    /// Delete a todo
    Delete {
        id: String,
        #[arg(short, long)]
        list: Option<String>,
    },
    /// Summarize progress of a list
    Status {
        #[arg(short, long)]
        list: Option<String>,
    },
    /// Create a new list
    Create {
        name: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Show all lists
    Lists,
    /// Make a list the active one
    Switch { name: String },
    /// Delete a list and its todos
    DeleteList {
        name: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Print version information
    Version,
}

impl Cli {
    /// Validate arguments clap cannot check on its own.
    pub fn validate(&self) -> Result<(), String> {
        match &self.command {
            Command::Add { content, .. } if content.join(" ").trim().is_empty() => {
                Err("Todo content cannot be empty".to_string())
            }
            Command::Update {
                content,
                status,
                priority,
                ..
            } => {
                if content.is_none() && status.is_none() && priority.is_none() {
                    return Err(
                        "Nothing to update: pass --content, --status or --priority".to_string(),
                    );
                }
                if content.as_deref().is_some_and(|c| c.trim().is_empty()) {
                    return Err("Todo content cannot be empty".to_string());
                }
                Ok(())
            }
            Command::Create { name, .. } => validate_list_name(name).map_err(|e| e.to_string()),
            _ => Ok(()),
        }
    }

    /// Log filter used when `RUST_LOG` is unset.
    pub fn default_log_filter(&self) -> &'static str {
        match self.command {
            Command::Serve => "info",
            _ => "warn",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("mcp-todo").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_add_joins_words() {
        let cli = parse(&["add", "buy", "milk", "-p", "low", "--list", "home"]);
        match cli.command {
            Command::Add {
                content,
                priority,
                list,
            } => {
                assert_eq!(content.join(" "), "buy milk");
                assert_eq!(priority, Some(Priority::Low));
                assert_eq!(list.as_deref(), Some("home"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_update_parses_status() {
        let cli = parse(&["update", "01J", "--status", "done"]);
        assert!(matches!(
            cli.command,
            Command::Update {
                status: Some(TodoStatus::Completed),
                ..
            }
        ));
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_update_without_fields_is_rejected() {
        let cli = parse(&["update", "01J"]);
        assert!(cli.validate().unwrap_err().contains("Nothing to update"));
    }

    #[test]
    fn test_create_rejects_separator() {
        let cli = parse(&["create", "a/b"]);
        assert!(cli.validate().is_err());
        assert!(parse(&["create", "work"]).validate().is_ok());
    }

    #[test]
    fn test_bad_priority_is_a_parse_error() {
        let result =
            Cli::try_parse_from(["mcp-todo", "add", "x", "--priority", "urgent"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_store_flags() {
        let cli = parse(&["lists", "--store-dir", "/tmp/todos", "--exact-ids"]);
        assert_eq!(cli.store.store_dir, Some(PathBuf::from("/tmp/todos")));
        assert_eq!(cli.store.id_match(), IdMatch::Exact);
        assert_eq!(cli.default_log_filter(), "warn");
        assert_eq!(parse(&["serve"]).default_log_filter(), "info");
    }
}
