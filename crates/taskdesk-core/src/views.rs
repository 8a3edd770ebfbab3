//! Pure derived views over a task list.
//!
//! Nothing here owns state. Every function recomputes from the slice it is
//! given, so callers can derive views on each read without caching them.

use indexmap::IndexMap;
use serde::Serialize;

use crate::task::Task;

/// Group tasks by category.
///
/// Categories appear in order of first occurrence and tasks keep their input
/// order within a group. Categories without tasks are absent.
pub fn group_tasks_by_category(tasks: &[Task]) -> IndexMap<String, Vec<Task>> {
    let mut groups: IndexMap<String, Vec<Task>> = IndexMap::new();
    for task in tasks {
        groups
            .entry(task.category.clone())
            .or_default()
            .push(task.clone());
    }
    groups
}

/// Summary figures for a task list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    /// Number of tasks.
    pub total: usize,
    /// Number of distinct categories.
    pub categories: usize,
    /// Category with the most tasks and its count. Ties go to the category
    /// seen first.
    pub most_active: Option<(String, usize)>,
    /// Per-category counts in first-occurrence order.
    pub distribution: Vec<(String, usize)>,
}

/// Compute [`TaskStats`] for a task list.
pub fn task_stats(tasks: &[Task]) -> TaskStats {
    let distribution: Vec<(String, usize)> = group_tasks_by_category(tasks)
        .into_iter()
        .map(|(category, group)| (category, group.len()))
        .collect();

    let most_active = distribution
        .iter()
        .fold(None::<&(String, usize)>, |best, entry| match best {
            Some(b) if b.1 >= entry.1 => Some(b),
            _ => Some(entry),
        })
        .cloned();

    TaskStats {
        total: tasks.len(),
        categories: distribution.len(),
        most_active,
        distribution,
    }
}

/// Default page size for task listings.
pub const DEFAULT_PER_PAGE: usize = 6;

/// One client-side page of tasks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Page {
    /// 1-based page number actually returned (clamped into range).
    pub page: usize,
    /// Page size used.
    pub per_page: usize,
    /// Total number of pages (at least 1).
    pub total_pages: usize,
    /// Total number of tasks across all pages.
    pub total: usize,
    /// Tasks on this page.
    pub items: Vec<Task>,
}

/// Slice a task list into a page.
///
/// `page` is 1-based and clamped into `1..=total_pages`; a `per_page` of zero
/// falls back to [`DEFAULT_PER_PAGE`].
pub fn paginate(tasks: &[Task], page: usize, per_page: usize) -> Page {
    let per_page = if per_page == 0 { DEFAULT_PER_PAGE } else { per_page };
    let total_pages = tasks.len().div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);
    let items = tasks
        .iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .cloned()
        .collect();

    Page {
        page,
        per_page,
        total_pages,
        total: tasks.len(),
        items,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
