//! Application state and the intents the UI dispatches into it.
//!
//! Every intent mutates the [`Board`] synchronously, then awaits a save of
//! both storage slots. A failed save only produces a status notice; the
//! in-memory board stays authoritative.

use crate::board::{
    build_summary, build_view, render_text, Board, Category, CategoryColor, CategoryId,
    CompletionFilter, GroupKey, GroupingMode, Priority, Task, TaskGroup, TaskId, ValidationError,
};
use crate::clipboard::Clipboard;
use crate::keybindings::KeybindingRegistry;
use crate::preferences::{PreferenceManager, GROUPING_KEY, THEME_KEY};
use crate::storage::{Database, LoadedBoard};
use crate::theme::{StyleMap, ThemeVariant};
use chrono::{DateTime, Local, TimeZone};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::style::Style;
use std::borrow::Cow;
use std::collections::HashSet;
use tokio::time::Instant;

/// Longest text accepted by a dialog input field, in characters.
pub const MAX_INPUT_CHARS: usize = 200;

// ============================================================================
// Tabs and Focus
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Active,
    Done,
    Summary,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Active, Tab::Done, Tab::Summary];

    pub fn next(self) -> Self {
        match self {
            Self::Active => Self::Done,
            Self::Done => Self::Summary,
            Self::Summary => Self::Active,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Active => Self::Summary,
            Self::Done => Self::Active,
            Self::Summary => Self::Done,
        }
    }

    /// Completion filter for the task-list tabs; `None` for the summary.
    pub fn filter(self) -> Option<CompletionFilter> {
        match self {
            Self::Active => Some(CompletionFilter::Active),
            Self::Done => Some(CompletionFilter::Completed),
            Self::Summary => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Done => "Done",
            Self::Summary => "Summary",
        }
    }
}

/// Which panel has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Tasks,
    Categories,
}

/// Progress of the initial load from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    /// Mutations stay disabled so the empty in-memory board never
    /// overwrites data that failed to load.
    Failed(String),
}

// ============================================================================
// Flattened Task List
// ============================================================================

/// One visible line of the task list.
#[derive(Debug, Clone, Copy)]
pub enum ListRow<'a> {
    Header {
        group: &'a TaskGroup<'a>,
        collapsed: bool,
    },
    Task {
        group: &'a TaskGroup<'a>,
        task: &'a Task,
    },
}

/// Flatten groups into rows, skipping the tasks of collapsed groups.
pub fn flatten_groups<'a>(
    groups: &'a [TaskGroup<'a>],
    collapsed: &HashSet<GroupKey>,
) -> Vec<ListRow<'a>> {
    let mut rows = Vec::with_capacity(groups.iter().map(|g| g.tasks.len() + 1).sum());
    for group in groups {
        let is_collapsed = collapsed.contains(&group.key);
        rows.push(ListRow::Header {
            group,
            collapsed: is_collapsed,
        });
        if !is_collapsed {
            rows.extend(group.tasks.iter().map(|&task| ListRow::Task { group, task }));
        }
    }
    rows
}

/// Owned identity of the selected row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowTarget {
    Header(GroupKey),
    Task { id: TaskId, group: GroupKey },
}

// ============================================================================
// Dialogs
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Category,
    Priority,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            Self::Title => Self::Category,
            Self::Category => Self::Priority,
            Self::Priority => Self::Title,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Title => Self::Priority,
            Self::Category => Self::Title,
            Self::Priority => Self::Category,
        }
    }
}

/// New-task form. `category` indexes the board's category list.
#[derive(Debug, Clone)]
pub struct TaskForm {
    pub title: String,
    pub category: usize,
    pub priority: Priority,
    pub field: FormField,
    pub error: Option<String>,
}

/// New-category form with the color it will be saved with.
#[derive(Debug, Clone)]
pub struct CategoryForm {
    pub name: String,
    pub color: CategoryColor,
    pub error: Option<String>,
}

pub enum Dialog {
    AddCategory(CategoryForm),
    AddTask(TaskForm),
}

/// Pending confirmation for destructive operations.
pub enum ConfirmAction {
    /// Delete a category and every task in it.
    DeleteCategory {
        id: CategoryId,
        name: String,
        task_count: usize,
    },
}

/// Events from background tasks
pub enum AppEvent {
    BoardLoaded(LoadedBoard),
    LoadFailed(String),
}

// ============================================================================
// Application State
// ============================================================================

/// Central application state
pub struct App {
    pub db: Database,
    pub prefs: PreferenceManager,
    pub board: Board,
    pub load_state: LoadState,

    // Theme
    pub theme_variant: ThemeVariant,
    pub theme: StyleMap,

    pub keybindings: KeybindingRegistry,

    // UI State
    pub tab: Tab,
    pub focus: Focus,
    pub grouping: GroupingMode,
    /// Collapsed groups, keyed across grouping modes.
    pub collapsed: HashSet<GroupKey>,
    /// Index into the flattened rows of the current tab.
    pub selected_row: usize,
    /// Index into the category strip.
    pub selected_category: usize,
    pub summary_scroll: usize,

    /// Task picked up by the move key, waiting for a drop target.
    pub pending_move: Option<TaskId>,

    pub dialog: Option<Dialog>,
    pub pending_confirm: Option<ConfirmAction>,
    pub show_help: bool,
    pub help_scroll_offset: usize,

    pub status_message: Option<(Cow<'static, str>, Instant)>,

    /// Skip frame renders while nothing changed.
    pub needs_redraw: bool,
}

impl App {
    pub fn new(db: Database, prefs: PreferenceManager, keybindings: KeybindingRegistry) -> Self {
        let theme_variant = prefs.theme_variant();
        let grouping = prefs.grouping_mode();
        Self {
            db,
            prefs,
            board: Board::new(),
            load_state: LoadState::Loading,
            theme_variant,
            theme: StyleMap::from_palette(&theme_variant.palette()),
            keybindings,
            tab: Tab::Active,
            focus: Focus::Tasks,
            grouping,
            collapsed: HashSet::new(),
            selected_row: 0,
            selected_category: 0,
            summary_scroll: 0,
            pending_move: None,
            dialog: None,
            pending_confirm: None,
            show_help: false,
            help_scroll_offset: 0,
            status_message: None,
            needs_redraw: true,
        }
    }

    /// Resolve a semantic role name to its `Style`.
    pub fn style(&self, role: &str) -> Style {
        self.theme.resolve(role)
    }

    pub fn set_theme(&mut self, variant: ThemeVariant) {
        self.theme_variant = variant;
        self.theme = StyleMap::from_palette(&variant.palette());
        self.needs_redraw = true;
    }

    /// Set status message (will auto-expire after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear status message if expired (older than 3 seconds)
    /// Returns true if a message was actually cleared
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= 3 {
                self.status_message = None;
                return true;
            }
        }
        false
    }

    // ========================================================================
    // Loading
    // ========================================================================

    pub fn apply_loaded(&mut self, loaded: LoadedBoard) {
        let categories = loaded.categories.len();
        let tasks = loaded.tasks.len();
        self.board = Board::from_parts(loaded.categories, loaded.tasks, StdRng::from_entropy());
        self.load_state = LoadState::Ready;
        self.clamp_selection();
        tracing::info!(categories, tasks, "Board loaded");
    }

    pub fn load_failed(&mut self, error: String) {
        tracing::error!(error = %error, "Failed to load board");
        self.set_status(format!("Failed to load data: {}", error));
        self.load_state = LoadState::Failed(error);
    }

    fn require_loaded(&mut self) -> bool {
        match self.load_state {
            LoadState::Ready => true,
            LoadState::Loading => {
                self.set_status("Still loading...");
                false
            }
            LoadState::Failed(_) => {
                self.set_status("Data failed to load; changes are disabled");
                false
            }
        }
    }

    async fn persist(&mut self) -> bool {
        let result = self
            .db
            .save_board(
                self.board.categories().as_slice(),
                self.board.tasks().as_slice(),
            )
            .await;
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "Failed to save board");
                self.set_status(format!("Save failed: {}", e));
                false
            }
        }
    }

    // ========================================================================
    // Derived Views
    // ========================================================================

    /// Groups for the current tab; empty on the summary tab.
    pub fn task_groups(&self) -> Vec<TaskGroup<'_>> {
        match self.tab.filter() {
            Some(filter) => build_view(
                self.board.tasks().as_slice(),
                self.board.categories().as_slice(),
                filter,
                self.grouping,
            ),
            None => Vec::new(),
        }
    }

    /// Visible task count for a tab title, `None` for the summary tab.
    pub fn tab_count(&self, tab: Tab) -> Option<usize> {
        let filter = tab.filter()?;
        let count = self
            .board
            .tasks()
            .iter()
            .filter(|t| filter.matches(t) && self.board.category(&t.category_id).is_some())
            .count();
        Some(count)
    }

    pub fn row_count(&self) -> usize {
        let groups = self.task_groups();
        flatten_groups(&groups, &self.collapsed).len()
    }

    pub fn selected_target(&self) -> Option<RowTarget> {
        let groups = self.task_groups();
        let rows = flatten_groups(&groups, &self.collapsed);
        let target = rows.get(self.selected_row).map(|row| match *row {
            ListRow::Header { group, .. } => RowTarget::Header(group.key.clone()),
            ListRow::Task { group, task } => RowTarget::Task {
                id: task.id.clone(),
                group: group.key.clone(),
            },
        });
        target
    }

    pub fn selected_task_id(&self) -> Option<TaskId> {
        match self.selected_target()? {
            RowTarget::Task { id, .. } => Some(id),
            RowTarget::Header(_) => None,
        }
    }

    pub fn selected_category(&self) -> Option<&Category> {
        self.board
            .categories()
            .as_slice()
            .get(self.selected_category)
    }

    pub fn summary_text_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> String {
        let summary = build_summary(
            self.board.tasks().as_slice(),
            self.board.categories().as_slice(),
            now,
        );
        render_text(&summary, self.prefs.date_format())
    }

    /// Lines the summary panel renders, for scroll clamping.
    fn summary_line_count(&self) -> usize {
        let summary = build_summary(
            self.board.tasks().as_slice(),
            self.board.categories().as_slice(),
            &Local::now(),
        );
        summary.line_count()
    }

    fn clamp_selection(&mut self) {
        let rows = self.row_count();
        self.selected_row = self.selected_row.min(rows.saturating_sub(1));
        let categories = self.board.categories().len();
        self.selected_category = self.selected_category.min(categories.saturating_sub(1));
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    pub fn nav_down(&mut self) {
        match (self.focus, self.tab) {
            (Focus::Categories, _) => {
                let len = self.board.categories().len();
                if len > 0 {
                    self.selected_category = self.selected_category.saturating_add(1).min(len - 1);
                }
            }
            (Focus::Tasks, Tab::Summary) => {
                let max = self.summary_line_count().saturating_sub(1);
                self.summary_scroll = self.summary_scroll.saturating_add(1).min(max);
            }
            (Focus::Tasks, _) => {
                let len = self.row_count();
                if len > 0 {
                    self.selected_row = self.selected_row.saturating_add(1).min(len - 1);
                }
            }
        }
    }

    pub fn nav_up(&mut self) {
        match (self.focus, self.tab) {
            (Focus::Categories, _) => {
                self.selected_category = self.selected_category.saturating_sub(1);
            }
            (Focus::Tasks, Tab::Summary) => {
                self.summary_scroll = self.summary_scroll.saturating_sub(1);
            }
            (Focus::Tasks, _) => {
                self.selected_row = self.selected_row.saturating_sub(1);
            }
        }
    }

    pub fn set_tab(&mut self, tab: Tab) {
        if self.tab != tab {
            self.tab = tab;
            self.selected_row = 0;
            self.summary_scroll = 0;
        }
    }

    pub fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Tasks => Focus::Categories,
            Focus::Categories => Focus::Tasks,
        };
    }

    /// Esc: cancel a pending move, else return focus to the task list.
    pub fn back(&mut self) {
        if self.pending_move.take().is_some() {
            self.set_status("Move cancelled");
        } else if self.focus == Focus::Categories {
            self.focus = Focus::Tasks;
        }
    }

    pub fn toggle_collapse(&mut self, key: GroupKey) {
        if !self.collapsed.remove(&key) {
            self.collapsed.insert(key);
        }
        self.clamp_selection();
    }

    /// Collapse every visible group, or expand them all if all are collapsed.
    pub fn toggle_collapse_all(&mut self) {
        let keys: Vec<GroupKey> = self.task_groups().into_iter().map(|g| g.key).collect();
        if keys.iter().any(|k| !self.collapsed.contains(k)) {
            self.collapsed.extend(keys);
        } else {
            for key in &keys {
                self.collapsed.remove(key);
            }
        }
        self.clamp_selection();
    }

    // ========================================================================
    // Task Intents
    // ========================================================================

    /// Enter: drop a pending move, toggle a group, or toggle a task.
    pub async fn activate_selected(&mut self) {
        if self.focus == Focus::Categories {
            let selected = self.selected_category().map(|c| c.id.clone());
            match selected {
                Some(id) if self.pending_move.is_some() => {
                    self.drop_move(GroupKey::Category(id)).await
                }
                Some(_) => self.open_add_task(),
                None => {}
            }
            return;
        }

        let Some(target) = self.selected_target() else {
            return;
        };
        match target {
            RowTarget::Header(key) | RowTarget::Task { group: key, .. }
                if self.pending_move.is_some() =>
            {
                self.drop_move(key).await
            }
            RowTarget::Header(key) => self.toggle_collapse(key),
            RowTarget::Task { .. } => self.toggle_selected().await,
        }
    }

    pub async fn toggle_selected(&mut self) {
        if !self.require_loaded() {
            return;
        }
        let Some(id) = self.selected_task_id() else {
            return;
        };
        let Some(completed) = self.board.toggle_complete(&id) else {
            return;
        };
        tracing::info!(task_id = %id, completed, "Toggled task");
        self.clamp_selection();
        if self.persist().await {
            self.set_status(if completed {
                "Task completed"
            } else {
                "Task reopened"
            });
        }
    }

    pub async fn delete_selected_task(&mut self) {
        if !self.require_loaded() {
            return;
        }
        let Some(id) = self.selected_task_id() else {
            return;
        };
        if !self.board.delete_task(&id) {
            return;
        }
        tracing::info!(task_id = %id, "Deleted task");
        if self.pending_move.as_ref() == Some(&id) {
            self.pending_move = None;
        }
        self.clamp_selection();
        if self.persist().await {
            self.set_status("Task deleted");
        }
    }

    pub async fn cycle_selected_priority(&mut self) {
        if !self.require_loaded() {
            return;
        }
        let Some(id) = self.selected_task_id() else {
            return;
        };
        let Some(priority) = self.board.cycle_priority(&id) else {
            return;
        };
        tracing::debug!(task_id = %id, priority = %priority, "Cycled priority");
        if self.persist().await {
            self.set_status(format!("Priority: {}", priority.label()));
        }
    }

    /// Pick up the selected task; pressing the key again drops it back.
    pub fn start_move(&mut self) {
        if !self.require_loaded() {
            return;
        }
        let Some(id) = self.selected_task_id() else {
            return;
        };
        if self.pending_move.as_ref() == Some(&id) {
            self.pending_move = None;
            self.set_status("Move cancelled");
        } else {
            self.pending_move = Some(id);
        }
    }

    /// Reassign the pending task to a group's category or priority.
    pub async fn drop_move(&mut self, key: GroupKey) {
        if !self.require_loaded() {
            return;
        }
        let Some(id) = self.pending_move.take() else {
            return;
        };

        let (changed, label) = match &key {
            GroupKey::Category(category_id) => {
                let label = self
                    .board
                    .category(category_id)
                    .map(|c| c.name.clone())
                    .unwrap_or_default();
                match self.board.set_category(&id, category_id) {
                    Ok(changed) => (changed, label),
                    Err(e) => {
                        self.set_status(e.to_string());
                        return;
                    }
                }
            }
            GroupKey::Priority(priority) => (
                self.board.set_priority(&id, *priority),
                priority.label().to_string(),
            ),
        };
        if !changed {
            return;
        }

        tracing::info!(task_id = %id, target = ?key, "Moved task");
        self.clamp_selection();
        if self.persist().await {
            self.set_status(format!("Moved to {}", label));
        }
    }

    // ========================================================================
    // Task Form
    // ========================================================================

    pub fn open_add_task(&mut self) {
        if !self.require_loaded() {
            return;
        }
        if self.board.categories().is_empty() {
            self.set_status(ValidationError::NoCategories.to_string());
            return;
        }

        let category = match self.focus {
            Focus::Categories => self.selected_category,
            Focus::Tasks => self
                .selected_task_id()
                .and_then(|id| self.board.task(&id).map(|t| t.category_id.clone()))
                .and_then(|cid| self.board.categories().iter().position(|c| c.id == cid))
                .unwrap_or(0),
        };

        self.dialog = Some(Dialog::AddTask(TaskForm {
            title: String::new(),
            category,
            priority: self.prefs.default_priority(),
            field: FormField::Title,
            error: None,
        }));
    }

    pub async fn submit_task(&mut self) {
        let Some(Dialog::AddTask(form)) = &self.dialog else {
            return;
        };
        let title = form.title.clone();
        let priority = form.priority;
        let category_id = self
            .board
            .categories()
            .as_slice()
            .get(form.category)
            .map(|c| c.id.clone());

        let result = match category_id {
            Some(category_id) => self.board.add_task(&title, &category_id, priority),
            None => Err(ValidationError::NoCategories),
        };

        match result {
            Ok(task) => {
                self.dialog = None;
                tracing::info!(task_id = %task.id, priority = %task.priority, "Task added");
                if self.persist().await {
                    self.set_status(format!("Added '{}'", task.title));
                }
            }
            Err(e) => self.set_form_error(e),
        }
    }

    fn set_form_error(&mut self, error: ValidationError) {
        let message = Some(error.to_string());
        match &mut self.dialog {
            Some(Dialog::AddTask(form)) => form.error = message,
            Some(Dialog::AddCategory(form)) => form.error = message,
            None => {}
        }
    }

    // ========================================================================
    // Category Intents
    // ========================================================================

    pub fn open_add_category(&mut self) {
        if !self.require_loaded() {
            return;
        }
        let color = self.board.next_category_color();
        self.dialog = Some(Dialog::AddCategory(CategoryForm {
            name: String::new(),
            color,
            error: None,
        }));
    }

    pub async fn submit_category(&mut self) {
        let Some(Dialog::AddCategory(form)) = &self.dialog else {
            return;
        };
        let name = form.name.clone();
        let color = form.color;

        match self.board.add_category_with_color(&name, color) {
            Ok(category) => {
                self.dialog = None;
                self.selected_category = self.board.categories().len().saturating_sub(1);
                tracing::info!(category_id = %category.id, color = category.color.hex(), "Category added");
                if self.persist().await {
                    self.set_status(format!("Added category '{}'", category.name));
                }
            }
            Err(e) => self.set_form_error(e),
        }
    }

    /// Delete the selected category, asking first unless disabled in config.
    pub async fn request_delete_category(&mut self) {
        if !self.require_loaded() {
            return;
        }
        let Some(category) = self.selected_category() else {
            return;
        };
        let id = category.id.clone();
        let name = category.name.clone();
        let task_count = self.board.tasks().count_in_category(&id);

        if self.prefs.confirm_delete_category() {
            self.pending_confirm = Some(ConfirmAction::DeleteCategory {
                id,
                name,
                task_count,
            });
        } else {
            self.delete_category(&id, &name).await;
        }
    }

    pub async fn confirm_pending(&mut self) {
        match self.pending_confirm.take() {
            Some(ConfirmAction::DeleteCategory { id, name, .. }) => {
                self.delete_category(&id, &name).await
            }
            None => {}
        }
    }

    async fn delete_category(&mut self, id: &CategoryId, name: &str) {
        let Some(removed) = self.board.delete_category(id) else {
            return;
        };
        self.collapsed.remove(&GroupKey::Category(id.clone()));
        if self
            .pending_move
            .as_ref()
            .is_some_and(|task| self.board.task(task).is_none())
        {
            self.pending_move = None;
        }
        self.clamp_selection();
        if self.persist().await {
            let plural = if removed == 1 { "" } else { "s" };
            self.set_status(format!("Deleted '{}' and {} task{}", name, removed, plural));
        }
    }

    // ========================================================================
    // Preferences
    // ========================================================================

    pub async fn toggle_grouping(&mut self) {
        if self.tab == Tab::Summary {
            return;
        }
        self.grouping = self.grouping.toggle();
        self.selected_row = 0;
        match self
            .prefs
            .set(&self.db, GROUPING_KEY, self.grouping.as_str())
            .await
        {
            Ok(()) => self.set_status(self.grouping.label()),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to persist grouping preference");
                self.set_status(format!("Could not save preference: {}", e));
            }
        }
    }

    /// Cycle to the next theme variant and remember it.
    pub async fn cycle_theme(&mut self) {
        let next = self.theme_variant.next();
        self.set_theme(next);
        match self.prefs.set(&self.db, THEME_KEY, next.as_str()).await {
            Ok(()) => self.set_status(format!("Theme: {}", next.name())),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to persist theme preference");
                self.set_status(format!("Could not save preference: {}", e));
            }
        }
    }

    // ========================================================================
    // Summary Export
    // ========================================================================

    pub fn copy_summary(&mut self, clipboard: &mut dyn Clipboard) {
        self.copy_summary_at(clipboard, &Local::now());
    }

    pub fn copy_summary_at<Tz: TimeZone>(
        &mut self,
        clipboard: &mut dyn Clipboard,
        now: &DateTime<Tz>,
    ) {
        if !self.require_loaded() {
            return;
        }
        let text = self.summary_text_at(now);
        match clipboard.write_text(&text) {
            Ok(()) => {
                tracing::info!(bytes = text.len(), "Summary copied");
                self.set_status("Summary copied to clipboard");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Summary copy failed");
                self.set_status(format!("Copy failed: {}", e));
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use crate::config::Config;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use tokio::time::{self, Duration};

    async fn test_app() -> App {
        let db = Database::open(":memory:").await.unwrap();
        let prefs = PreferenceManager::from_config(&Config::default());
        App::new(db, prefs, KeybindingRegistry::new())
    }

    async fn loaded_app() -> App {
        let mut app = test_app().await;
        app.apply_loaded(LoadedBoard::default());
        app
    }

    fn status(app: &App) -> &str {
        app.status_message
            .as_ref()
            .map(|(m, _)| &**m)
            .unwrap_or("")
    }

    #[tokio::test]
    async fn test_status_expires_after_3_seconds() {
        // Create app before pausing time to avoid DB connection timeout
        let mut app = test_app().await;
        time::pause();
        app.set_status("Test message");

        time::advance(Duration::from_secs(2)).await;
        assert!(!app.clear_expired_status());
        assert!(app.status_message.is_some());

        time::advance(Duration::from_secs(2)).await;
        assert!(app.clear_expired_status());
        assert!(app.status_message.is_none());
    }

    #[tokio::test]
    async fn test_mutations_refused_until_loaded() {
        let mut app = test_app().await;
        app.open_add_category();
        assert!(app.dialog.is_none());
        assert_eq!(status(&app), "Still loading...");

        app.load_failed("disk on fire".to_string());
        app.open_add_category();
        assert!(app.dialog.is_none());
        assert_eq!(status(&app), "Data failed to load; changes are disabled");
    }

    #[tokio::test]
    async fn test_add_task_without_categories_shows_notice() {
        let mut app = loaded_app().await;
        app.open_add_task();
        assert!(app.dialog.is_none());
        assert_eq!(
            status(&app),
            "Please create at least one category before adding tasks"
        );
    }

    #[tokio::test]
    async fn test_category_dialog_rejects_blank_name() {
        let mut app = loaded_app().await;
        app.open_add_category();
        if let Some(Dialog::AddCategory(form)) = &mut app.dialog {
            form.name = "   ".to_string();
        }
        app.submit_category().await;

        match &app.dialog {
            Some(Dialog::AddCategory(form)) => assert!(form.error.is_some()),
            _ => panic!("dialog should stay open"),
        }
        assert!(app.board.categories().is_empty());
    }

    #[tokio::test]
    async fn test_dialog_flow_persists_board() {
        let mut app = loaded_app().await;

        app.open_add_category();
        let previewed = match &mut app.dialog {
            Some(Dialog::AddCategory(form)) => {
                form.name = "Work".to_string();
                form.color
            }
            _ => panic!("category dialog expected"),
        };
        app.submit_category().await;
        assert!(app.dialog.is_none());
        assert_eq!(app.board.categories().as_slice()[0].color, previewed);

        app.open_add_task();
        match &mut app.dialog {
            Some(Dialog::AddTask(form)) => {
                assert_eq!(form.priority, Priority::Soon);
                form.title = "Ship report".to_string();
                form.priority = Priority::Today;
            }
            _ => panic!("task dialog expected"),
        }
        app.submit_task().await;
        assert_eq!(status(&app), "Added 'Ship report'");
        assert_eq!(app.tab_count(Tab::Active), Some(1));

        // Row 0 is the "Work" header, row 1 the task.
        app.selected_row = 1;
        app.toggle_selected().await;
        assert_eq!(app.tab_count(Tab::Active), Some(0));
        assert_eq!(app.tab_count(Tab::Done), Some(1));

        let stored = app.db.load_board().await.unwrap();
        assert_eq!(stored.categories.len(), 1);
        assert_eq!(stored.tasks.len(), 1);
        assert!(stored.tasks[0].completed());
    }

    #[tokio::test]
    async fn test_move_task_between_category_groups() {
        let mut app = loaded_app().await;
        let home = app.board.add_category("Home").unwrap();
        let work = app.board.add_category("Work").unwrap();
        app.board.add_task("B", &home.id, Priority::Soon).unwrap();
        let a = app.board.add_task("A", &work.id, Priority::Soon).unwrap();

        // Home header, B, Work header, A
        app.selected_row = 3;
        app.start_move();
        assert_eq!(app.pending_move, Some(a.id.clone()));

        app.selected_row = 0;
        app.activate_selected().await;
        assert!(app.pending_move.is_none());
        assert_eq!(app.board.task(&a.id).unwrap().category_id, home.id);
        assert_eq!(status(&app), "Moved to Home");
    }

    #[tokio::test]
    async fn test_move_task_between_priority_groups() {
        let mut app = loaded_app().await;
        app.grouping = GroupingMode::Priority;
        let work = app.board.add_category("Work").unwrap();
        let task = app.board.add_task("A", &work.id, Priority::Later).unwrap();

        // Today header, Soon header, Later header, A
        app.selected_row = 3;
        app.start_move();
        app.selected_row = 0;
        app.activate_selected().await;

        assert_eq!(app.board.task(&task.id).unwrap().priority, Priority::Today);
    }

    #[tokio::test]
    async fn test_back_cancels_move() {
        let mut app = loaded_app().await;
        let work = app.board.add_category("Work").unwrap();
        app.board.add_task("A", &work.id, Priority::Soon).unwrap();
        app.selected_row = 1;
        app.start_move();

        app.back();
        assert!(app.pending_move.is_none());
        assert_eq!(status(&app), "Move cancelled");
    }

    #[tokio::test]
    async fn test_header_activation_toggles_collapse() {
        let mut app = loaded_app().await;
        let work = app.board.add_category("Work").unwrap();
        app.board.add_task("A", &work.id, Priority::Soon).unwrap();
        app.board.add_task("B", &work.id, Priority::Soon).unwrap();
        assert_eq!(app.row_count(), 3);

        app.selected_row = 0;
        app.activate_selected().await;
        assert_eq!(app.row_count(), 1);

        // Collapse state follows the key, not the mode.
        app.grouping = GroupingMode::Priority;
        assert_eq!(app.row_count(), 5);
        app.grouping = GroupingMode::Category;
        assert_eq!(app.row_count(), 1);

        app.toggle_collapse_all();
        assert_eq!(app.row_count(), 3);
    }

    #[tokio::test]
    async fn test_delete_category_confirms_with_task_count() {
        let mut app = loaded_app().await;
        let work = app.board.add_category("Work").unwrap();
        app.board.add_task("A", &work.id, Priority::Soon).unwrap();
        app.board.add_task("B", &work.id, Priority::Today).unwrap();

        app.focus = Focus::Categories;
        app.request_delete_category().await;
        match &app.pending_confirm {
            Some(ConfirmAction::DeleteCategory {
                name, task_count, ..
            }) => {
                assert_eq!(name, "Work");
                assert_eq!(*task_count, 2);
            }
            None => panic!("confirmation expected"),
        }
        assert_eq!(app.board.tasks().len(), 2);

        app.confirm_pending().await;
        assert!(app.board.categories().is_empty());
        assert!(app.board.tasks().is_empty());
        assert_eq!(status(&app), "Deleted 'Work' and 2 tasks");
    }

    #[tokio::test]
    async fn test_delete_category_without_confirmation() {
        let db = Database::open(":memory:").await.unwrap();
        let config = Config {
            confirm_delete_category: false,
            ..Config::default()
        };
        let mut app = App::new(
            db,
            PreferenceManager::from_config(&config),
            KeybindingRegistry::new(),
        );
        app.apply_loaded(LoadedBoard::default());
        app.board.add_category("Work").unwrap();

        app.request_delete_category().await;
        assert!(app.pending_confirm.is_none());
        assert!(app.board.categories().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_grouping_persists_preference() {
        let mut app = loaded_app().await;
        app.toggle_grouping().await;
        assert_eq!(app.grouping, GroupingMode::Priority);
        assert_eq!(
            app.db.get_preference(GROUPING_KEY).await.unwrap(),
            Some("priority".to_string())
        );
    }

    #[tokio::test]
    async fn test_cycle_theme_persists_preference() {
        let mut app = loaded_app().await;
        app.cycle_theme().await;
        assert_eq!(app.theme_variant, ThemeVariant::Light);
        assert_eq!(status(&app), "Theme: Light");
        assert_eq!(
            app.db.get_preference(THEME_KEY).await.unwrap(),
            Some("light".to_string())
        );
    }

    #[tokio::test]
    async fn test_copy_summary_reports_outcome() {
        let mut app = loaded_app().await;
        let work = app.board.add_category("Work").unwrap();
        let task = app.board.add_task("A", &work.id, Priority::Soon).unwrap();
        app.board.toggle_complete(&task.id);

        let mut clipboard = MemoryClipboard::default();
        app.copy_summary_at(&mut clipboard, &Utc::now());
        assert_eq!(status(&app), "Summary copied to clipboard");
        let copied = clipboard.contents.unwrap();
        assert!(copied.starts_with("# Weekly Summary - Week of "));
        assert!(copied.ends_with("- Work\n  - A\n"));

        let mut broken = MemoryClipboard {
            fail_with: Some(std::io::ErrorKind::BrokenPipe),
            ..Default::default()
        };
        app.copy_summary_at(&mut broken, &Utc::now());
        assert!(status(&app).starts_with("Copy failed: "));
        assert_eq!(app.board.tasks().len(), 1);
    }

    #[tokio::test]
    async fn test_nav_clamps_to_rows() {
        let mut app = loaded_app().await;
        app.nav_down();
        assert_eq!(app.selected_row, 0);

        let work = app.board.add_category("Work").unwrap();
        app.board.add_task("A", &work.id, Priority::Soon).unwrap();
        app.nav_down();
        app.nav_down();
        assert_eq!(app.selected_row, 1);
        app.nav_up();
        app.nav_up();
        assert_eq!(app.selected_row, 0);
    }

    #[tokio::test]
    async fn test_summary_scroll_reaches_empty_week_message() {
        let mut app = loaded_app().await;
        app.set_tab(Tab::Summary);
        for _ in 0..10 {
            app.nav_down();
        }
        // two week headers, a blank, then the empty-week message
        assert_eq!(app.summary_scroll, 3);
    }
}
