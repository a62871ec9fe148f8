//! Grouped task views.
//!
//! [`build_view`] is pure: it borrows the task and category slices and
//! returns groups of references in display order.

use std::collections::HashMap;

use super::types::{Category, CategoryId, Priority, Task};

// ============================================================================
// Modes
// ============================================================================

/// How tasks are partitioned into groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupingMode {
    #[default]
    Category,
    Priority,
}

impl GroupingMode {
    /// Parse a mode name (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "category" => Some(Self::Category),
            "priority" => Some(Self::Priority),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Priority => "priority",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Self::Category => Self::Priority,
            Self::Priority => Self::Category,
        }
    }

    /// Label for the grouping indicator.
    pub fn label(self) -> &'static str {
        match self {
            Self::Category => "By category",
            Self::Priority => "By priority",
        }
    }
}

/// Which tasks a view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionFilter {
    /// Open tasks.
    Active,
    /// Completed tasks.
    Completed,
}

impl CompletionFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::Active => !task.completed(),
            Self::Completed => task.completed(),
        }
    }

    /// Placeholder shown when the view has no groups.
    pub fn empty_message(self) -> &'static str {
        match self {
            Self::Active => "No active tasks",
            Self::Completed => "No completed tasks yet",
        }
    }
}

// ============================================================================
// Groups
// ============================================================================

/// Identity of a group; also the target of a task move.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Category(CategoryId),
    Priority(Priority),
}

/// Resolved display data for a group header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupHeader<'a> {
    Category(&'a Category),
    Priority(Priority),
}

impl GroupHeader<'_> {
    pub fn title(&self) -> &str {
        match self {
            Self::Category(c) => &c.name,
            Self::Priority(p) => p.label(),
        }
    }

    pub fn subtitle(&self) -> Option<&'static str> {
        match self {
            Self::Category(_) => None,
            Self::Priority(p) => Some(p.description()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskGroup<'a> {
    pub key: GroupKey,
    pub header: GroupHeader<'a>,
    pub tasks: Vec<&'a Task>,
}

/// Build the grouped view for one tab.
///
/// Tasks whose category does not resolve are never shown. The result is
/// empty when no task passes the filter. In priority mode all three buckets
/// are present (possibly empty) otherwise.
pub fn build_view<'a>(
    tasks: &'a [Task],
    categories: &'a [Category],
    filter: CompletionFilter,
    mode: GroupingMode,
) -> Vec<TaskGroup<'a>> {
    let by_id: HashMap<&CategoryId, &Category> = categories.iter().map(|c| (&c.id, c)).collect();

    let visible: Vec<&Task> = tasks
        .iter()
        .filter(|t| filter.matches(t) && by_id.contains_key(&t.category_id))
        .collect();

    if visible.is_empty() {
        return Vec::new();
    }

    let mut groups = match mode {
        GroupingMode::Category => group_by_category(&visible, &by_id),
        GroupingMode::Priority => group_by_priority(&visible),
    };

    for group in &mut groups {
        group.tasks.sort_by_key(|t| t.priority.rank());
    }
    groups
}

fn group_by_category<'a>(
    visible: &[&'a Task],
    by_id: &HashMap<&CategoryId, &'a Category>,
) -> Vec<TaskGroup<'a>> {
    let mut groups: Vec<TaskGroup<'a>> = Vec::new();
    let mut index: HashMap<&CategoryId, usize> = HashMap::new();

    for &task in visible {
        let Some(&category) = by_id.get(&task.category_id) else {
            continue;
        };
        match index.get(&task.category_id) {
            Some(&i) => groups[i].tasks.push(task),
            None => {
                index.insert(&task.category_id, groups.len());
                groups.push(TaskGroup {
                    key: GroupKey::Category(category.id.clone()),
                    header: GroupHeader::Category(category),
                    tasks: vec![task],
                });
            }
        }
    }

    groups.sort_by(|a, b| a.header.title().cmp(b.header.title()));
    groups
}

fn group_by_priority<'a>(visible: &[&'a Task]) -> Vec<TaskGroup<'a>> {
    Priority::ALL
        .into_iter()
        .map(|priority| TaskGroup {
            key: GroupKey::Priority(priority),
            header: GroupHeader::Priority(priority),
            tasks: visible
                .iter()
                .copied()
                .filter(|t| t.priority == priority)
                .collect(),
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
