//! Weekly summary of completed work and its plain-text export.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use std::collections::HashMap;
use std::fmt::Write as _;

use super::types::{Category, CategoryId, Task};

/// en-US short date, e.g. `1/8/2024`.
pub const DEFAULT_DATE_FORMAT: &str = "%-m/%-d/%Y";

/// Completed tasks for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryGroup<'a> {
    pub category: &'a Category,
    pub tasks: Vec<&'a Task>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklySummary<'a> {
    /// Local calendar date of the Monday the week starts on.
    pub week_start_date: NaiveDate,
    /// The same instant in UTC, the inclusive lower bound for `completed_at`.
    pub week_start: DateTime<Utc>,
    /// Every task completed this week, including ones in deleted categories.
    pub total_count: usize,
    pub groups: Vec<SummaryGroup<'a>>,
}

impl WeeklySummary<'_> {
    /// No task was completed this week, counting deleted categories.
    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }

    /// Rows the summary panel renders: three header rows, the empty
    /// message when there is nothing to show, then each group's heading,
    /// tasks and trailing blank.
    pub fn line_count(&self) -> usize {
        let groups: usize = self.groups.iter().map(|g| g.tasks.len() + 2).sum();
        3 + usize::from(self.is_empty()) + groups
    }
}

/// Most recent Monday at local midnight.
///
/// If midnight does not exist on that day (a DST gap), the first valid
/// instant after it is used. Ambiguous midnights resolve to the earlier one.
pub fn start_of_week<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    let days_back = i64::from(now.weekday().num_days_from_monday());
    let monday = now.date_naive() - Duration::days(days_back);
    earliest_on(&now.timezone(), monday).unwrap_or_else(|| now.clone())
}

/// First instant of `date` in `tz`, scanning forward a minute at a time
/// across a skipped range.
fn earliest_on<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Option<DateTime<Tz>> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..24 * 60).find_map(|minute| {
        tz.from_local_datetime(&(midnight + Duration::minutes(minute)))
            .earliest()
    })
}

/// Collect this week's completed tasks, grouped by category in
/// first-encounter order.
pub fn build_summary<'a, Tz: TimeZone>(
    tasks: &'a [Task],
    categories: &'a [Category],
    now: &DateTime<Tz>,
) -> WeeklySummary<'a> {
    let start = start_of_week(now);
    let week_start_date = start.date_naive();
    let week_start = start.with_timezone(&Utc);

    let selected: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.completed() && t.completed_at().is_some_and(|at| at >= week_start))
        .collect();

    let by_id: HashMap<&CategoryId, &Category> = categories.iter().map(|c| (&c.id, c)).collect();
    let mut groups: Vec<SummaryGroup<'a>> = Vec::new();
    let mut index: HashMap<&CategoryId, usize> = HashMap::new();

    for &task in &selected {
        let Some(&category) = by_id.get(&task.category_id) else {
            continue;
        };
        match index.get(&task.category_id) {
            Some(&i) => groups[i].tasks.push(task),
            None => {
                index.insert(&task.category_id, groups.len());
                groups.push(SummaryGroup {
                    category,
                    tasks: vec![task],
                });
            }
        }
    }

    WeeklySummary {
        week_start_date,
        week_start,
        total_count: selected.len(),
        groups,
    }
}

/// Format a date with a strftime pattern, falling back to
/// [`DEFAULT_DATE_FORMAT`] if the pattern cannot render a date.
pub fn format_date(date: NaiveDate, format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(format)).is_err() {
        out.clear();
        let _ = write!(out, "{}", date.format(DEFAULT_DATE_FORMAT));
    }
    out
}

/// True if `format` renders a plain date without error.
pub fn is_valid_date_format(format: &str) -> bool {
    let mut out = String::new();
    let sample = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap_or_default();
    write!(out, "{}", sample.format(format)).is_ok()
}

/// Plain-text export suitable for pasting into notes or chat.
pub fn render_text(summary: &WeeklySummary<'_>, date_format: &str) -> String {
    let mut out = format!(
        "# Weekly Summary - Week of {}\n",
        format_date(summary.week_start_date, date_format)
    );
    for group in &summary.groups {
        out.push_str("- ");
        out.push_str(&group.category.name);
        out.push('\n');
        for task in &group.tasks {
            out.push_str("  - ");
            out.push_str(&task.title);
            out.push('\n');
        }
    }
    out
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::types::{CategoryColor, Priority};
    use chrono::FixedOffset;
    use pretty_assertions::assert_eq;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn cat(id: &str, name: &str) -> Category {
        Category {
            id: CategoryId::from(id),
            name: name.to_string(),
            color: CategoryColor::Emerald,
        }
    }

    fn done(title: &str, category: &str, at: DateTime<Utc>) -> Task {
        let mut t = Task::new(
            title.to_string(),
            CategoryId::from(category),
            Priority::Soon,
            utc(2024, 1, 1, 0, 0, 0),
        );
        t.toggle(at);
        t
    }

    #[test]
    fn test_start_of_week_midweek() {
        // Wednesday 2024-01-10
        let start = start_of_week(&utc(2024, 1, 10, 15, 30, 0));
        assert_eq!(start, utc(2024, 1, 8, 0, 0, 0));
    }

    #[test]
    fn test_start_of_week_sunday_goes_back_six_days() {
        let start = start_of_week(&utc(2024, 1, 14, 23, 59, 59));
        assert_eq!(start, utc(2024, 1, 8, 0, 0, 0));
    }

    #[test]
    fn test_start_of_week_monday_midnight_is_itself() {
        let monday = utc(2024, 1, 8, 0, 0, 0);
        assert_eq!(start_of_week(&monday), monday);
    }

    #[test]
    fn test_start_of_week_uses_local_calendar() {
        // 2024-01-08 02:00 UTC is still Sunday evening at UTC-5.
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let now = utc(2024, 1, 8, 2, 0, 0).with_timezone(&tz);
        let start = start_of_week(&now);
        assert_eq!(start.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(start.with_timezone(&Utc), utc(2024, 1, 1, 5, 0, 0));
    }

    #[test]
    fn test_week_boundary_is_inclusive() {
        let categories = vec![cat("c1", "Work")];
        let start = utc(2024, 1, 8, 0, 0, 0);
        let tasks = vec![
            done("before", "c1", start - Duration::seconds(1)),
            done("at", "c1", start),
            done("after", "c1", start + Duration::seconds(1)),
        ];

        let summary = build_summary(&tasks, &categories, &utc(2024, 1, 10, 12, 0, 0));
        let titles: Vec<&str> = summary.groups[0].tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["at", "after"]);
        assert_eq!(summary.total_count, 2);
    }

    #[test]
    fn test_groups_in_first_encounter_order() {
        let categories = vec![cat("c1", "Work"), cat("c2", "Home")];
        let at = utc(2024, 1, 9, 9, 0, 0);
        let tasks = vec![
            done("h1", "c2", at),
            done("w1", "c1", at),
            done("h2", "c2", at),
        ];
        let summary = build_summary(&tasks, &categories, &utc(2024, 1, 10, 0, 0, 0));
        let names: Vec<&str> = summary.groups.iter().map(|g| g.category.name.as_str()).collect();
        assert_eq!(names, vec!["Home", "Work"]);
        assert_eq!(summary.groups[0].tasks.len(), 2);
    }

    #[test]
    fn test_dangling_group_dropped_but_counted() {
        let categories = vec![cat("c1", "Work")];
        let at = utc(2024, 1, 9, 9, 0, 0);
        let tasks = vec![done("w1", "c1", at), done("lost", "gone", at)];
        let summary = build_summary(&tasks, &categories, &utc(2024, 1, 10, 0, 0, 0));
        assert_eq!(summary.groups.len(), 1);
        assert_eq!(summary.total_count, 2);
    }

    #[test]
    fn test_dangling_only_week_is_not_empty() {
        let tasks = vec![done("lost", "gone", utc(2024, 1, 9, 9, 0, 0))];
        let summary = build_summary(&tasks, &[], &utc(2024, 1, 10, 0, 0, 0));
        assert!(summary.groups.is_empty());
        assert!(!summary.is_empty());
        // header rows only, no empty-week message
        assert_eq!(summary.line_count(), 3);
    }

    #[test]
    fn test_line_count_matches_panel_rows() {
        let empty = build_summary(&[], &[], &utc(2024, 1, 10, 0, 0, 0));
        assert_eq!(empty.line_count(), 4);

        let categories = vec![cat("c1", "Work"), cat("c2", "Home")];
        let at = utc(2024, 1, 9, 9, 0, 0);
        let tasks = vec![
            done("A", "c1", at),
            done("B", "c2", at),
            done("C", "c1", at),
        ];
        let summary = build_summary(&tasks, &categories, &utc(2024, 1, 10, 0, 0, 0));
        // 3 header rows, Work heading + 2 tasks + blank, Home heading + 1 task + blank
        assert_eq!(summary.line_count(), 3 + 4 + 3);
    }

    #[test]
    fn test_open_tasks_excluded() {
        let categories = vec![cat("c1", "Work")];
        let open = Task::new(
            "open".to_string(),
            CategoryId::from("c1"),
            Priority::Today,
            utc(2024, 1, 9, 0, 0, 0),
        );
        let summary = build_summary(
            std::slice::from_ref(&open),
            &categories,
            &utc(2024, 1, 10, 0, 0, 0),
        );
        assert!(summary.is_empty());
        assert_eq!(summary.total_count, 0);
    }

    #[test]
    fn test_render_text_exact() {
        let categories = vec![cat("c1", "Work")];
        let at = utc(2024, 1, 9, 9, 0, 0);
        let tasks = vec![done("A", "c1", at), done("B", "c1", at)];
        let summary = build_summary(&tasks, &categories, &utc(2024, 1, 10, 0, 0, 0));

        assert_eq!(
            render_text(&summary, DEFAULT_DATE_FORMAT),
            "# Weekly Summary - Week of 1/8/2024\n- Work\n  - A\n  - B\n"
        );
    }

    #[test]
    fn test_render_text_empty_week() {
        let summary = build_summary(&[], &[], &utc(2024, 1, 10, 0, 0, 0));
        assert_eq!(
            render_text(&summary, "%Y-%m-%d"),
            "# Weekly Summary - Week of 2024-01-08\n"
        );
    }

    #[test]
    fn test_format_date_falls_back_on_time_specifiers() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        assert_eq!(format_date(date, "%d.%m.%Y"), "08.01.2024");
        assert_eq!(format_date(date, "%H:%M"), "1/8/2024");
        assert!(is_valid_date_format("%Y-%m-%d"));
        assert!(!is_valid_date_format("%H:%M"));
    }
}
