use colored::Colorize;
use dialoguer::Confirm;

use crate::cli::Command;
use crate::error::ServiceResult;
use crate::metadata::{PKG_NAME, PKG_VERSION};
use crate::render::{render_dashboard, render_lists, render_status, render_table};
use crate::server::start_server;
use crate::store::TodoStore;
use crate::types::{DEFAULT_LIST, IdMatch, TodoPatch, TodoSummary};
use crate::watch::watch_list;

fn success(message: impl AsRef<str>) {
    println!("{} {}", "✓".green().bold(), message.as_ref());
}

/// Runs one CLI command against an initialized store.
pub async fn run(command: Command, store: &TodoStore) -> ServiceResult<()> {
    match command {
        Command::Serve => start_server(store.clone().with_id_match(IdMatch::Exact)).await?,
        Command::Init => {
            let active = store.active_list_name()?;
            success(format!(
                "Todo store ready at {}",
                store.root().display().to_string().bold()
            ));
            println!("  Active list: {}", active.cyan());
        }
        Command::Add {
            content,
            priority,
            list,
        } => {
            let list_name = store.resolve_list_name(list.as_deref())?;
            let todo = store.add_todo(&content.join(" "), priority, Some(&list_name))?;
            success(format!(
                "Added todo {} to '{}'",
                todo.id.dimmed(),
                list_name.cyan()
            ));
            println!("  {} [{}]", todo.content, todo.priority);
        }
        Command::List {
            list,
            status,
            priority,
        } => {
            let list_name = store.resolve_list_name(list.as_deref())?;
            let todos: Vec<_> = store
                .read_todos(Some(&list_name))?
                .into_iter()
                .filter(|t| status.is_none_or(|s| t.status == s))
                .filter(|t| priority.is_none_or(|p| t.priority == p))
                .collect();
            println!("{} {}\n", "Todos in".bold(), list_name.cyan().bold());
            print!("{}", render_table(&todos));
        }
        Command::Show { list } => {
            let list_name = store.resolve_list_name(list.as_deref())?;
            let todos = store.read_todos(Some(&list_name))?;
            let metadata = store.metadata()?;
            print!(
                "{}",
                render_dashboard(&list_name, metadata.lists.get(&list_name), &todos)
            );
        }
        Command::Watch { list } => watch_list(store, list.as_deref()).await?,
        Command::Update {
            id,
            content,
            status,
            priority,
            list,
        } => {
            let patch = TodoPatch {
                content,
                status,
                priority,
            };
            let todo = store.update_todo(&id, &patch, list.as_deref())?;
            success(format!("Updated todo {}", todo.id.dimmed()));
            println!("  {} [{}] {}", todo.status, todo.priority, todo.content);
        }
        Command::Delete { id, list } => {
            let todo = store.delete_todo(&id, list.as_deref())?;
            success(format!("Deleted todo {}: {}", todo.id.dimmed(), todo.content));
        }
        Command::Status { list } => {
            let list_name = store.resolve_list_name(list.as_deref())?;
            let todos = store.read_todos(Some(&list_name))?;
            print!(
                "{}",
                render_status(&list_name, &TodoSummary::from_items(&todos))
            );
        }
        Command::Create { name, description } => {
            let created = store.create_list(&name, description)?;
            success(format!("Created list '{}'", created.name.cyan()));
            println!("  Switch to it with: {PKG_NAME} switch {}", created.name);
        }
        Command::Lists => {
            let lists = store.list_todo_lists()?;
            print!("{}", render_lists(&lists));
        }
        Command::Switch { name } => {
            store.switch_active_list(&name)?;
            success(format!("Switched to list '{}'", name.cyan()));
        }
        Command::DeleteList { name, yes } => {
            let exists = store.metadata()?.lists.contains_key(&name);
            if exists && name != DEFAULT_LIST && !yes {
                let confirmed = Confirm::new()
                    .with_prompt(format!("Delete list '{name}' and all of its todos?"))
                    .default(false)
                    .interact()?;
                if !confirmed {
                    println!("Cancelled.");
                    return Ok(());
                }
            }
            let was_active = store.active_list_name()? == name;
            store.delete_list(&name)?;
            success(format!("Deleted list '{}'", name.cyan()));
            if was_active {
                println!("  Active list is now '{}'", DEFAULT_LIST.cyan());
            }
        }
        Command::Version => println!("{PKG_NAME} {PKG_VERSION}"),
    }
    Ok(())
}
