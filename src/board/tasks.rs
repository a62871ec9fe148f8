//! Task registry.
//!
//! Mutations that need to know about categories (existence checks on add or
//! reassign) go through [`crate::board::Board`], which validates the
//! category before calling in here.

use chrono::{DateTime, Utc};

use super::types::{clean_text, CategoryId, Priority, Task, TaskId, ValidationError};

/// In-memory list of tasks, in creation order.
#[derive(Debug, Default, Clone)]
pub struct TaskRegistry {
    tasks: Vec<Task>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap loaded tasks, repairing any whose completion pair disagrees.
    ///
    /// Returns the registry and the number of records repaired.
    pub fn from_loaded(mut tasks: Vec<Task>) -> (Self, usize) {
        let repaired = tasks.iter_mut().map(Task::normalize).filter(|&changed| changed).count();
        (Self { tasks }, repaired)
    }

    /// Append a new open task. The caller has already resolved `category_id`.
    pub(crate) fn add_at(
        &mut self,
        title: &str,
        category_id: CategoryId,
        priority: Priority,
        now: DateTime<Utc>,
    ) -> Result<Task, ValidationError> {
        let title = clean_text(title);
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }

        let task = Task::new(title, category_id, priority, now);
        tracing::debug!(task_id = %task.id, category_id = %task.category_id, priority = %task.priority, "Task added");
        self.tasks.push(task.clone());
        Ok(task)
    }

    /// Flip completion. Returns the new `completed` value, or `None` if absent.
    pub fn toggle_complete_at(&mut self, id: &TaskId, now: DateTime<Utc>) -> Option<bool> {
        let task = self.get_mut(id)?;
        task.toggle(now);
        Some(task.completed())
    }

    /// Remove a task. Returns true if something was removed.
    pub fn delete(&mut self, id: &TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| &t.id != id);
        self.tasks.len() != before
    }

    /// Overwrite a task's priority. Returns false if the task is absent.
    pub fn set_priority(&mut self, id: &TaskId, priority: Priority) -> bool {
        match self.get_mut(id) {
            Some(task) => {
                task.priority = priority;
                true
            }
            None => false,
        }
    }

    /// Overwrite a task's category. The caller has already resolved it.
    pub(crate) fn set_category(&mut self, id: &TaskId, category_id: CategoryId) -> bool {
        match self.get_mut(id) {
            Some(task) => {
                task.category_id = category_id;
                true
            }
            None => false,
        }
    }

    /// Remove every task in a category, returning how many went.
    pub(crate) fn delete_by_category(&mut self, category_id: &CategoryId) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| &t.category_id != category_id);
        before - self.tasks.len()
    }

    /// Number of tasks in a category.
    pub fn count_in_category(&self, category_id: &CategoryId) -> usize {
        self.tasks
            .iter()
            .filter(|t| &t.category_id == category_id)
            .count()
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    fn get_mut(&mut self, id: &TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| &t.id == id)
    }

    pub fn as_slice(&self) -> &[Task] {
        &self.tasks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
