use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::error::ServiceResult;
use crate::render::render_dashboard;
use crate::store::{StoreError, TodoStore};

const DEBOUNCE: Duration = Duration::from_millis(150);

/// Live dashboard for one list. Re-renders whenever the list file changes and
/// returns once Ctrl-C is received. Never writes to the store.
pub async fn watch_list(store: &TodoStore, list_name: Option<&str>) -> ServiceResult<()> {
    let list_name = store.resolve_list_name(list_name)?;
    // Fails early when the list does not exist.
    store.read_todos(Some(&list_name))?;

    let target = store.list_path(&list_name);
    let (tx, mut rx) = mpsc::channel::<()>(16);
    let watcher = create_list_watcher(&store.lists_dir(), target.clone(), tx)?;

    refresh(store, &list_name);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::debug!("Interrupt received, leaving watch mode");
                break;
            }
            changed = rx.recv() => {
                if changed.is_none() {
                    break;
                }
                // Coalesce the burst of events a single save produces.
                tokio::time::sleep(DEBOUNCE).await;
                while rx.try_recv().is_ok() {}
                refresh(store, &list_name);
            }
        }
    }

    drop(watcher);
    tracing::debug!(path = %target.display(), "Released file watch");
    Ok(())
}

fn create_list_watcher(
    lists_dir: &Path,
    target: PathBuf,
    tx: mpsc::Sender<()>,
) -> ServiceResult<RecommendedWatcher> {
    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| match res {
            Ok(event) => {
                if is_relevant(&event, &target) {
                    // A full channel already has a refresh queued.
                    let _ = tx.try_send(());
                }
            }
            Err(e) => tracing::error!(error = %e, "File watcher error"),
        },
        Config::default(),
    )?;

    watcher.watch(lists_dir, RecursiveMode::NonRecursive)?;
    tracing::debug!(dir = %lists_dir.display(), "Started watching list files");
    Ok(watcher)
}

/// The watch is on the lists directory only, so a file name match identifies
/// the target even when the platform reports a differently prefixed path.
fn is_relevant(event: &Event, target: &Path) -> bool {
    matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) && event
        .paths
        .iter()
        .any(|p| p.file_name() == target.file_name())
}

fn refresh(store: &TodoStore, list_name: &str) {
    let Some(frame) = render_frame(store, list_name) else {
        return;
    };
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, Clear(ClearType::All), MoveTo(0, 0)) {
        tracing::warn!(error = %e, "Failed to clear the terminal");
    }
    let _ = write!(stdout, "{frame}");
    let _ = stdout.flush();
}

/// Builds the screen for the current state of the list. `None` means the
/// previous frame should stay up.
fn render_frame(store: &TodoStore, list_name: &str) -> Option<String> {
    let items = match store.read_todos(Some(list_name)) {
        Ok(items) => items,
        Err(StoreError::Json { path, source }) => {
            // A writer may be mid-save; the next event brings a stable file.
            tracing::debug!(path = %path.display(), error = %source, "Skipping refresh");
            return None;
        }
        Err(StoreError::ListNotFound(name)) => {
            return Some(format!(
                "List '{name}' no longer exists. Waiting for changes (Ctrl-C to exit)...\n"
            ));
        }
        Err(err) => {
            tracing::warn!(error = %err, "Failed to reload list");
            return None;
        }
    };
    let metadata = store.metadata().ok();
    let list = metadata.as_ref().and_then(|m| m.lists.get(list_name));

    Some(format!(
        "{}Watching for changes (Ctrl-C to exit)...\n",
        render_dashboard(list_name, list, &items)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};
    use tempfile::TempDir;

    fn store() -> (TempDir, TodoStore) {
        let dir = TempDir::new().unwrap();
        let store = TodoStore::new(dir.path());
        store.initialize().unwrap();
        (dir, store)
    }

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn test_only_target_file_events_are_relevant() {
        let target = Path::new("/store/lists/work.json");
        assert!(is_relevant(
            &event(EventKind::Modify(ModifyKind::Any), "/store/lists/work.json"),
            target
        ));
        assert!(is_relevant(
            &event(EventKind::Create(CreateKind::File), "/store/lists/work.json"),
            target
        ));
        assert!(is_relevant(
            &event(EventKind::Remove(RemoveKind::File), "/store/lists/work.json"),
            target
        ));
        assert!(!is_relevant(
            &event(EventKind::Modify(ModifyKind::Any), "/store/lists/home.json"),
            target
        ));
        assert!(!is_relevant(
            &event(EventKind::Access(notify::event::AccessKind::Any), "/store/lists/work.json"),
            target
        ));
    }

    #[test]
    fn test_frame_shows_current_items() {
        colored::control::set_override(false);
        let (_dir, store) = store();
        store.add_todo("water plants", None, None).unwrap();

        let frame = render_frame(&store, "default").unwrap();

        assert!(frame.contains("Todo list: default"));
        assert!(frame.contains("water plants"));
        assert!(frame.ends_with("Watching for changes (Ctrl-C to exit)...\n"));
    }

    #[test]
    fn test_half_written_file_keeps_previous_frame() {
        let (_dir, store) = store();
        std::fs::write(store.list_path("default"), "[{").unwrap();

        assert!(render_frame(&store, "default").is_none());
    }

    #[test]
    fn test_deleted_list_shows_notice() {
        let (_dir, store) = store();
        store.create_list("work", None).unwrap();
        store.delete_list("work").unwrap();

        let frame = render_frame(&store, "work").unwrap();

        assert!(frame.contains("List 'work' no longer exists"));
    }
}
