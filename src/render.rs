//! Terminal rendering for the CLI: the todo table, the list overview and the
//! boxed dashboard used by `show` and `watch`. Everything renders to a
//! `String`; callers decide where it goes.

use colored::{ColoredString, Colorize};

use crate::types::{Priority, TodoItem, TodoList, TodoListSummary, TodoStatus, TodoSummary};

const MAX_CONTENT_WIDTH: usize = 60;
const DASHBOARD_WIDTH: usize = 64;
const PROGRESS_WIDTH: usize = 30;

pub fn status_icon(status: TodoStatus) -> &'static str {
    match status {
        TodoStatus::Pending => "○",
        TodoStatus::InProgress => "◐",
        TodoStatus::Completed => "●",
    }
}

fn status_heading(status: TodoStatus) -> &'static str {
    match status {
        TodoStatus::Pending => "Pending",
        TodoStatus::InProgress => "In progress",
        TodoStatus::Completed => "Completed",
    }
}

fn paint_status(text: &str, status: TodoStatus) -> ColoredString {
    match status {
        TodoStatus::Pending => text.yellow(),
        TodoStatus::InProgress => text.cyan(),
        TodoStatus::Completed => text.green(),
    }
}

fn paint_priority(text: &str, priority: Priority) -> ColoredString {
    match priority {
        Priority::High => text.red().bold(),
        Priority::Medium => text.yellow(),
        Priority::Low => text.dimmed(),
    }
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        text.to_string()
    } else {
        format!("{text}{}", " ".repeat(width - len))
    }
}

fn truncate(text: &str, width: usize) -> String {
    // Newlines would break the row layout.
    let flat: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    if flat.chars().count() <= width {
        return flat;
    }
    let kept: String = flat.chars().take(width.saturating_sub(1)).collect();
    format!("{kept}…")
}

/// Renders items as an aligned table with a header row.
pub fn render_table(items: &[TodoItem]) -> String {
    if items.is_empty() {
        return format!("{}\n", "No todos.".dimmed());
    }

    let id_width = items
        .iter()
        .map(|t| t.id.chars().count())
        .max()
        .unwrap_or(0)
        .max(2);
    let status_width = "in_progress".len() + 2;
    let priority_width = "priority".len();

    let mut out = String::new();
    out.push_str(&format!(
        "{}  {}  {}  {}\n",
        pad("ID", id_width).bold(),
        pad("STATUS", status_width).bold(),
        pad("PRIORITY", priority_width).bold(),
        "CONTENT".bold()
    ));
    out.push_str(&format!(
        "{}\n",
        "─"
            .repeat(id_width + status_width + priority_width + MAX_CONTENT_WIDTH.min(40) + 6)
            .dimmed()
    ));

    for item in items {
        let status = format!("{} {}", status_icon(item.status), item.status);
        let content = truncate(&item.content, MAX_CONTENT_WIDTH);
        let content = if item.is_completed() {
            content.dimmed()
        } else {
            content.normal()
        };
        out.push_str(&format!(
            "{}  {}  {}  {}\n",
            pad(&item.id, id_width).dimmed(),
            paint_status(&pad(&status, status_width), item.status),
            paint_priority(&pad(item.priority.as_str(), priority_width), item.priority),
            content
        ));
    }
    out
}

/// Renders the overview of every list, marking the active one.
pub fn render_lists(lists: &[TodoListSummary]) -> String {
    let name_width = lists
        .iter()
        .map(|l| l.name.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for summary in lists {
        let marker = if summary.active { "*" } else { " " };
        let name = pad(&summary.name, name_width);
        let name = if summary.active {
            name.green().bold()
        } else {
            name.normal()
        };
        let counts = format!(
            "{}/{} completed",
            summary.list.completed_todos, summary.list.total_todos
        );
        let description = summary.list.description.as_deref().unwrap_or("");
        out.push_str(&format!(
            "{} {}  {}  {}\n",
            marker.green(),
            name,
            pad(&counts, 16),
            description.dimmed()
        ));
    }
    out
}

/// Renders per-status and per-priority counts of a list.
pub fn render_status(list_name: &str, summary: &TodoSummary) -> String {
    let mut out = format!(
        "{} {}\n",
        "List:".bold(),
        list_name.cyan().bold()
    );
    out.push_str(&format!(
        "  {} {}\n",
        progress_bar(summary),
        format!(
            "{}/{} ({}%)",
            summary.completed,
            summary.total,
            summary.percent_complete()
        )
        .bold()
    ));
    for status in TodoStatus::ALL {
        out.push_str(&format!(
            "  {} {}\n",
            paint_status(&pad(status_heading(status), 12), status),
            summary.count(status)
        ));
    }
    out.push_str(&format!(
        "  {} {}  {} {}  {} {}\n",
        "high".red().bold(),
        summary.high,
        "medium".yellow(),
        summary.medium,
        "low".dimmed(),
        summary.low
    ));
    out
}

fn filled_cells(summary: &TodoSummary) -> usize {
    if summary.total == 0 {
        0
    } else {
        summary.completed * PROGRESS_WIDTH / summary.total
    }
}

fn progress_bar(summary: &TodoSummary) -> String {
    let filled = filled_cells(summary);
    format!(
        "{}{}",
        "█".repeat(filled).green(),
        "░".repeat(PROGRESS_WIDTH - filled).dimmed()
    )
}

fn boxed_line(text: &str, paint: impl Fn(&str) -> ColoredString) -> String {
    let inner = DASHBOARD_WIDTH - 4;
    let content = pad(&truncate(text, inner), inner);
    format!("{} {} {}\n", "│".blue(), paint(&content), "│".blue())
}

/// Renders the boxed dashboard for one list.
pub fn render_dashboard(list_name: &str, list: Option<&TodoList>, items: &[TodoItem]) -> String {
    let summary = TodoSummary::from_items(items);
    let rule = "─".repeat(DASHBOARD_WIDTH - 2);
    let mut out = String::new();

    out.push_str(&format!("{}\n", format!("╭{rule}╮").blue()));
    out.push_str(&boxed_line(&format!("Todo list: {list_name}"), |s| {
        s.cyan().bold()
    }));
    if let Some(description) = list.and_then(|l| l.description.as_deref()) {
        out.push_str(&boxed_line(description, |s| s.dimmed()));
    }
    out.push_str(&format!("{}\n", format!("├{rule}┤").blue()));

    let filled = filled_cells(&summary);
    let progress = format!(
        "{}{} {}/{} done ({}%)",
        "█".repeat(filled),
        "░".repeat(PROGRESS_WIDTH - filled),
        summary.completed,
        summary.total,
        summary.percent_complete()
    );
    out.push_str(&boxed_line(&progress, |s| s.green()));
    let counts = format!(
        "{} pending  {} in progress  {} completed",
        summary.pending, summary.in_progress, summary.completed
    );
    out.push_str(&boxed_line(&counts, |s| s.normal()));

    for status in [TodoStatus::InProgress, TodoStatus::Pending, TodoStatus::Completed] {
        let group: Vec<&TodoItem> = items.iter().filter(|t| t.status == status).collect();
        if group.is_empty() {
            continue;
        }
        out.push_str(&format!("{}\n", format!("├{rule}┤").blue()));
        out.push_str(&boxed_line(
            &format!("{} ({})", status_heading(status), group.len()),
            |s| paint_status(s, status).bold(),
        ));
        for item in group {
            let line = format!(
                "{} [{}] {}",
                status_icon(item.status),
                item.priority,
                item.content
            );
            let priority = item.priority;
            let completed = item.is_completed();
            out.push_str(&boxed_line(&line, move |s| {
                if completed {
                    s.dimmed()
                } else {
                    paint_priority(s, priority)
                }
            }));
        }
    }

    if items.is_empty() {
        out.push_str(&boxed_line("No todos yet.", |s| s.dimmed()));
    }

    if let Some(list) = list {
        out.push_str(&format!("{}\n", format!("├{rule}┤").blue()));
        out.push_str(&boxed_line(
            &format!("Last modified: {}", list.last_modified),
            |s| s.dimmed(),
        ));
    }
    out.push_str(&format!("{}\n", format!("╰{rule}╯").blue()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() {
        colored::control::set_override(false);
    }

    fn item(id: &str, content: &str, status: TodoStatus, priority: Priority) -> TodoItem {
        TodoItem {
            id: id.to_string(),
            content: content.to_string(),
            status,
            priority,
        }
    }

    #[test]
    fn test_table_rows_are_aligned() {
        plain();
        let items = vec![
            item("a1", "write tests", TodoStatus::InProgress, Priority::High),
            item("b22", "ship", TodoStatus::Completed, Priority::Low),
        ];
        let table = render_table(&items);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("ID "));
        let content_col = lines[0].find("CONTENT").unwrap();
        let row: String = lines[2].chars().skip(content_col).collect();
        assert_eq!(row, "write tests");
        assert_eq!(&lines[3][..3], "b22");
        assert!(lines[2].contains("◐ in_progress"));
    }

    #[test]
    fn test_empty_table() {
        plain();
        assert_eq!(render_table(&[]), "No todos.\n");
    }

    #[test]
    fn test_long_content_is_truncated() {
        let long = "x".repeat(100);
        let cut = truncate(&long, 10);
        assert_eq!(cut.chars().count(), 10);
        assert!(cut.ends_with('…'));
        assert_eq!(truncate("a\nb", 10), "a b");
    }

    #[test]
    fn test_dashboard_lines_have_constant_width() {
        plain();
        let items = vec![
            item("1", "pending thing", TodoStatus::Pending, Priority::Medium),
            item("2", &"long ".repeat(40), TodoStatus::InProgress, Priority::High),
            item("3", "done thing", TodoStatus::Completed, Priority::Low),
        ];
        let list = TodoList::new(Some("day job".to_string()));
        let dashboard = render_dashboard("work", Some(&list), &items);

        for line in dashboard.lines() {
            assert_eq!(line.chars().count(), DASHBOARD_WIDTH, "{line:?}");
        }
        assert!(dashboard.contains("Todo list: work"));
        assert!(dashboard.contains("day job"));
        assert!(dashboard.contains("1/3 done (33%)"));
        assert!(dashboard.contains("In progress (1)"));
    }

    #[test]
    fn test_dashboard_for_empty_list() {
        plain();
        let dashboard = render_dashboard("default", None, &[]);
        assert!(dashboard.contains("No todos yet."));
        assert!(dashboard.contains("0/0 done (0%)"));
    }

    #[test]
    fn test_lists_overview_marks_active() {
        plain();
        let mut list = TodoList::new(None);
        list.total_todos = 4;
        list.completed_todos = 1;
        let lists = vec![
            TodoListSummary {
                name: "default".to_string(),
                active: false,
                list: TodoList::new(None),
            },
            TodoListSummary {
                name: "work".to_string(),
                active: true,
                list,
            },
        ];
        let out = render_lists(&lists);
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("  default"));
        assert!(lines[1].starts_with("* work"));
        assert!(lines[1].contains("1/4 completed"));
    }

    #[test]
    fn test_status_summary() {
        plain();
        let items = vec![
            item("1", "a", TodoStatus::Completed, Priority::High),
            item("2", "b", TodoStatus::Pending, Priority::High),
        ];
        let out = render_status("default", &TodoSummary::from_items(&items));
        assert!(out.contains("1/2 (50%)"));
        assert!(out.contains("high 2"));
    }
}
