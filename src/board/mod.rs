//! The task board: categories, tasks and everything derived from them.
//!
//! [`Board`] owns both registries and is the only place where an operation
//! touches both (cascade delete, category-existence checks). The view and
//! summary builders are pure functions over borrowed slices.

mod categories;
pub mod summary;
mod tasks;
mod types;
pub mod view;

pub use categories::{pick_color, CategoryRegistry};
pub use summary::{build_summary, render_text, start_of_week, SummaryGroup, WeeklySummary};
pub use tasks::TaskRegistry;
pub use types::{Category, CategoryColor, CategoryId, Priority, Task, TaskId, ValidationError};
pub use view::{build_view, CompletionFilter, GroupHeader, GroupKey, GroupingMode, TaskGroup};

pub(crate) use types::clean_text;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Combined category and task store.
pub struct Board {
    categories: CategoryRegistry,
    tasks: TaskRegistry,
}

impl Board {
    pub fn new() -> Self {
        Self::from_parts(Vec::new(), Vec::new(), StdRng::from_entropy())
    }

    /// Rebuild a board from persisted records.
    ///
    /// Tasks with an inconsistent completion pair are repaired. Tasks whose
    /// category no longer exists are kept but never shown.
    pub fn from_parts(categories: Vec<Category>, tasks: Vec<Task>, rng: StdRng) -> Self {
        let categories = CategoryRegistry::with_rng(categories, rng);
        let (tasks, repaired) = TaskRegistry::from_loaded(tasks);
        if repaired > 0 {
            tracing::warn!(repaired, "Repaired tasks with inconsistent completion state");
        }

        let orphans = tasks
            .iter()
            .filter(|t| !categories.contains(&t.category_id))
            .count();
        if orphans > 0 {
            tracing::warn!(orphans, "Tasks reference missing categories");
        }

        Self { categories, tasks }
    }

    pub fn categories(&self) -> &CategoryRegistry {
        &self.categories
    }

    pub fn tasks(&self) -> &TaskRegistry {
        &self.tasks
    }

    pub fn category(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.get(id)
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    // ========================================================================
    // Categories
    // ========================================================================

    pub fn add_category(&mut self, name: &str) -> Result<Category, ValidationError> {
        self.categories.add(name)
    }

    pub fn add_category_with_color(
        &mut self,
        name: &str,
        color: CategoryColor,
    ) -> Result<Category, ValidationError> {
        self.categories.add_with_color(name, color)
    }

    /// Color the next category would be assigned, for previewing in a form.
    pub fn next_category_color(&mut self) -> CategoryColor {
        self.categories.next_color()
    }

    /// Delete a category and every task in it.
    ///
    /// Returns the number of tasks removed, or `None` if the category did
    /// not exist (in which case nothing changes).
    pub fn delete_category(&mut self, id: &CategoryId) -> Option<usize> {
        self.categories.delete(id)?;
        let removed = self.tasks.delete_by_category(id);
        tracing::info!(category_id = %id, removed_tasks = removed, "Category deleted");
        Some(removed)
    }

    // ========================================================================
    // Tasks
    // ========================================================================

    pub fn add_task(
        &mut self,
        title: &str,
        category_id: &CategoryId,
        priority: Priority,
    ) -> Result<Task, ValidationError> {
        self.add_task_at(title, category_id, priority, Utc::now())
    }

    pub fn add_task_at(
        &mut self,
        title: &str,
        category_id: &CategoryId,
        priority: Priority,
        now: DateTime<Utc>,
    ) -> Result<Task, ValidationError> {
        self.resolve_category(category_id)?;
        self.tasks.add_at(title, category_id.clone(), priority, now)
    }

    /// Flip a task's completion. Returns the new state, `None` if absent.
    pub fn toggle_complete(&mut self, id: &TaskId) -> Option<bool> {
        self.toggle_complete_at(id, Utc::now())
    }

    pub fn toggle_complete_at(&mut self, id: &TaskId, now: DateTime<Utc>) -> Option<bool> {
        self.tasks.toggle_complete_at(id, now)
    }

    pub fn delete_task(&mut self, id: &TaskId) -> bool {
        self.tasks.delete(id)
    }

    pub fn set_priority(&mut self, id: &TaskId, priority: Priority) -> bool {
        self.tasks.set_priority(id, priority)
    }

    /// Advance a task's priority one step (today → soon → later → today).
    pub fn cycle_priority(&mut self, id: &TaskId) -> Option<Priority> {
        let next = self.tasks.get(id)?.priority.next();
        self.tasks.set_priority(id, next);
        Some(next)
    }

    /// Move a task to another category.
    ///
    /// `Ok(false)` if the task does not exist. Fails if the category does
    /// not resolve, leaving the task untouched.
    pub fn set_category(
        &mut self,
        id: &TaskId,
        category_id: &CategoryId,
    ) -> Result<bool, ValidationError> {
        if self.tasks.get(id).is_none() {
            return Ok(false);
        }
        self.resolve_category(category_id)?;
        Ok(self.tasks.set_category(id, category_id.clone()))
    }

    fn resolve_category(&self, id: &CategoryId) -> Result<(), ValidationError> {
        if self.categories.is_empty() {
            return Err(ValidationError::NoCategories);
        }
        if !self.categories.contains(id) {
            return Err(ValidationError::UnknownCategory(id.to_string()));
        }
        Ok(())
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn seeded_board() -> Board {
        Board::from_parts(Vec::new(), Vec::new(), StdRng::seed_from_u64(42))
    }

    #[test]
    fn test_ship_report_lifecycle() {
        let work = Category {
            id: CategoryId::from("c1"),
            name: "Work".to_string(),
            color: CategoryColor::Blue,
        };
        let mut board = Board::from_parts(vec![work], Vec::new(), StdRng::seed_from_u64(1));

        let task = board
            .add_task_at("Ship report", &CategoryId::from("c1"), Priority::Today, ts(10))
            .unwrap();
        assert!(!task.completed());
        assert_eq!(task.completed_at(), None);

        assert_eq!(board.toggle_complete_at(&task.id, ts(20)), Some(true));
        assert_eq!(board.task(&task.id).unwrap().completed_at(), Some(ts(20)));

        assert_eq!(board.toggle_complete_at(&task.id, ts(30)), Some(false));
        let task = board.task(&task.id).unwrap();
        assert!(!task.completed());
        assert_eq!(task.completed_at(), None);
    }

    #[test]
    fn test_add_task_without_categories() {
        let mut board = seeded_board();
        assert_eq!(
            board.add_task("A", &CategoryId::from("c1"), Priority::Soon),
            Err(ValidationError::NoCategories)
        );
    }

    #[test]
    fn test_add_task_unknown_category() {
        let mut board = seeded_board();
        board.add_category("Work").unwrap();
        assert_eq!(
            board.add_task("A", &CategoryId::from("missing"), Priority::Soon),
            Err(ValidationError::UnknownCategory("missing".to_string()))
        );
        assert!(board.tasks().is_empty());
    }

    #[test]
    fn test_delete_category_cascades() {
        let mut board = seeded_board();
        let work = board.add_category("Work").unwrap();
        let home = board.add_category("Home").unwrap();
        board.add_task("A", &work.id, Priority::Today).unwrap();
        board.add_task("B", &work.id, Priority::Later).unwrap();
        let kept = board.add_task("C", &home.id, Priority::Soon).unwrap();

        assert_eq!(board.delete_category(&work.id), Some(2));
        assert_eq!(board.categories().len(), 1);
        assert_eq!(board.tasks().len(), 1);
        assert!(board.task(&kept.id).is_some());
        assert!(board
            .tasks()
            .iter()
            .all(|t| board.category(&t.category_id).is_some()));
    }

    #[test]
    fn test_delete_missing_category_is_noop() {
        let mut board = seeded_board();
        let work = board.add_category("Work").unwrap();
        board.add_task("A", &work.id, Priority::Today).unwrap();
        assert_eq!(board.delete_category(&CategoryId::from("missing")), None);
        assert_eq!(board.tasks().len(), 1);
    }

    #[test]
    fn test_set_category_validates_target() {
        let mut board = seeded_board();
        let work = board.add_category("Work").unwrap();
        let home = board.add_category("Home").unwrap();
        let task = board.add_task("A", &work.id, Priority::Today).unwrap();

        assert_eq!(
            board.set_category(&task.id, &CategoryId::from("missing")),
            Err(ValidationError::UnknownCategory("missing".to_string()))
        );
        assert_eq!(board.task(&task.id).unwrap().category_id, work.id);

        assert_eq!(board.set_category(&task.id, &home.id), Ok(true));
        assert_eq!(board.task(&task.id).unwrap().category_id, home.id);

        assert_eq!(board.set_category(&TaskId::from("nope"), &home.id), Ok(false));
    }

    #[test]
    fn test_cycle_priority_wraps() {
        let mut board = seeded_board();
        let work = board.add_category("Work").unwrap();
        let task = board.add_task("A", &work.id, Priority::Soon).unwrap();

        assert_eq!(board.cycle_priority(&task.id), Some(Priority::Later));
        assert_eq!(board.cycle_priority(&task.id), Some(Priority::Today));
        assert_eq!(board.cycle_priority(&task.id), Some(Priority::Soon));
        assert_eq!(board.cycle_priority(&TaskId::from("nope")), None);
    }
}
