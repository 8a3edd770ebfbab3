//! Category catalogue.
//!
//! Categories are free-form strings on the wire. The catalogue only supplies
//! the values offered to users and their display labels.

/// A selectable category.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Category {
    /// Display label.
    pub label: &'static str,
    /// Wire value.
    pub value: &'static str,
}

/// Known categories in display order.
pub const TASK_CATEGORIES: &[Category] = &[
    Category { label: "Work", value: "work" },
    Category { label: "Personal", value: "personal" },
    Category { label: "Study", value: "study" },
    Category { label: "Home", value: "home" },
    Category { label: "Health", value: "health" },
    Category { label: "Shopping", value: "shopping" },
    Category { label: "Travel", value: "travel" },
    Category { label: "Finance", value: "finance" },
    Category { label: "Exercise", value: "exercise" },
    Category { label: "Entertainment", value: "entertainment" },
    Category { label: "Others", value: "others" },
];

/// Look up a catalogue entry by wire value.
pub fn find_category(value: &str) -> Option<&'static Category> {
    TASK_CATEGORIES.iter().find(|c| c.value == value)
}

/// Display label for a category value.
///
/// Unknown values are shown with their first character upper-cased.
pub fn category_label(value: &str) -> String {
    if let Some(category) = find_category(value) {
        return category.label.to_string();
    }
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
