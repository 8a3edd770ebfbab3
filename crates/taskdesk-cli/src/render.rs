//! Plain-text rendering of tasks and views.

use std::fmt::Write as _;

use chrono::DateTime;

use taskdesk_core::{Category, Page, Task, TaskStats, category_label};

/// `2024-01-15T10:30:00Z` → `2024-01-15 10:30`. Unparseable input is shown
/// as-is.
pub fn format_timestamp(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// One-line summary.
pub fn task_line(task: &Task) -> String {
    format!(
        "#{:<5} {:<14} {}",
        task.id.get(),
        category_label(&task.category),
        task.title
    )
}

/// Multi-line detail view.
pub fn task_detail(task: &Task) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Task #{}", task.id);
    let _ = writeln!(out, "  Title:    {}", task.title);
    let _ = writeln!(out, "  Category: {}", category_label(&task.category));
    if let Some(created) = &task.created_at {
        let _ = writeln!(out, "  Created:  {}", format_timestamp(created));
    }
    if let Some(updated) = &task.updated_at {
        let _ = writeln!(out, "  Updated:  {}", format_timestamp(updated));
    }
    out
}

/// A page of tasks with a position footer.
pub fn page(page: &Page, category: Option<&str>) -> String {
    if page.total == 0 {
        return match category {
            Some(c) => format!("No tasks in {}.\n", category_label(c)),
            None => "No tasks yet.\n".to_string(),
        };
    }

    let mut out = String::new();
    for task in &page.items {
        let _ = writeln!(out, "{}", task_line(task));
    }
    let _ = writeln!(
        out,
        "\nPage {} of {} ({} tasks)",
        page.page, page.total_pages, page.total
    );
    out
}

/// Totals and per-category distribution.
pub fn stats(stats: &TaskStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total tasks:  {}", stats.total);
    let _ = writeln!(out, "Categories:   {}", stats.categories);
    match &stats.most_active {
        Some((category, count)) => {
            let _ = writeln!(out, "Most active:  {} ({count})", category_label(category));
        }
        None => {
            let _ = writeln!(out, "Most active:  -");
        }
    }
    if !stats.distribution.is_empty() {
        let _ = writeln!(out);
        for (category, count) in &stats.distribution {
            let _ = writeln!(out, "  {:<14} {count}", category_label(category));
        }
    }
    out
}

/// Category catalogue as `value  Label` rows.
pub fn categories(catalogue: &[Category]) -> String {
    let mut out = String::new();
    for category in catalogue {
        let _ = writeln!(out, "{:<14} {}", category.value, category.label);
    }
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
