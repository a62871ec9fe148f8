use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Rejected user input. Always recoverable: the board is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Category name cannot be empty")]
    EmptyName,

    #[error("Task title cannot be empty")]
    EmptyTitle,

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Invalid priority '{0}' (expected today, soon or later)")]
    InvalidPriority(String),

    #[error("Please create at least one category before adding tasks")]
    NoCategories,
}

// ============================================================================
// Identifiers
// ============================================================================

/// Opaque category identifier (UUID v4 text).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(String);

impl CategoryId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CategoryId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque task identifier (UUID v4 text).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Priority
// ============================================================================

/// Ordinal urgency bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Today,
    Soon,
    Later,
}

impl Priority {
    /// All buckets in rank order.
    pub const ALL: [Priority; 3] = [Priority::Today, Priority::Soon, Priority::Later];

    /// Sort rank: today = 1, soon = 2, later = 3.
    pub fn rank(self) -> u8 {
        match self {
            Self::Today => 1,
            Self::Soon => 2,
            Self::Later => 3,
        }
    }

    /// Short label shown on badges and group headers.
    pub fn label(self) -> &'static str {
        match self {
            Self::Today => "Today",
            Self::Soon => "Soon",
            Self::Later => "Later",
        }
    }

    /// Longer description used in the task form and priority group headers.
    pub fn description(self) -> &'static str {
        match self {
            Self::Today => "Must do today",
            Self::Soon => "Next few days",
            Self::Later => "Future/someday",
        }
    }

    /// Storage / config name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Soon => "soon",
            Self::Later => "later",
        }
    }

    /// Cycle: today → soon → later → today.
    pub fn next(self) -> Self {
        match self {
            Self::Today => Self::Soon,
            Self::Soon => Self::Later,
            Self::Later => Self::Today,
        }
    }

    /// Reverse cycle: today → later → soon → today.
    pub fn prev(self) -> Self {
        match self {
            Self::Today => Self::Later,
            Self::Soon => Self::Today,
            Self::Later => Self::Soon,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::Soon
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(Self::Today),
            "soon" => Ok(Self::Soon),
            "later" => Ok(Self::Later),
            _ => Err(ValidationError::InvalidPriority(s.to_owned())),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Category Color
// ============================================================================

/// One of the eight preset category colors.
///
/// Serialized as its `#RRGGBB` hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CategoryColor {
    Red,
    Amber,
    Emerald,
    Blue,
    Violet,
    Pink,
    Indigo,
    Teal,
}

impl CategoryColor {
    /// The palette, in its fixed order.
    pub const PALETTE: [CategoryColor; 8] = [
        CategoryColor::Red,
        CategoryColor::Amber,
        CategoryColor::Emerald,
        CategoryColor::Blue,
        CategoryColor::Violet,
        CategoryColor::Pink,
        CategoryColor::Indigo,
        CategoryColor::Teal,
    ];

    pub fn hex(self) -> &'static str {
        match self {
            Self::Red => "#EF4444",
            Self::Amber => "#F59E0B",
            Self::Emerald => "#10B981",
            Self::Blue => "#3B82F6",
            Self::Violet => "#8B5CF6",
            Self::Pink => "#EC4899",
            Self::Indigo => "#6366F1",
            Self::Teal => "#14B8A6",
        }
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Red => (0xEF, 0x44, 0x44),
            Self::Amber => (0xF5, 0x9E, 0x0B),
            Self::Emerald => (0x10, 0xB9, 0x81),
            Self::Blue => (0x3B, 0x82, 0xF6),
            Self::Violet => (0x8B, 0x5C, 0xF6),
            Self::Pink => (0xEC, 0x48, 0x99),
            Self::Indigo => (0x63, 0x66, 0xF1),
            Self::Teal => (0x14, 0xB8, 0xA6),
        }
    }

    /// Parse a hex string (case-insensitive, leading `#` required).
    pub fn from_hex(s: &str) -> Option<Self> {
        Self::PALETTE
            .into_iter()
            .find(|c| c.hex().eq_ignore_ascii_case(s.trim()))
    }
}

impl TryFrom<String> for CategoryColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value).ok_or_else(|| format!("'{}' is not a palette color", value))
    }
}

impl From<CategoryColor> for String {
    fn from(c: CategoryColor) -> Self {
        c.hex().to_owned()
    }
}

// ============================================================================
// Data Structures
// ============================================================================

/// A named, colored label tasks are grouped under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub color: CategoryColor,
}

/// A titled unit of work.
///
/// `completed` and `completed_at` are private so the pair can only change
/// together: `completed_at.is_some()` iff `completed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub category_id: CategoryId,
    pub priority: Priority,
    completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub(crate) fn new(
        title: String,
        category_id: CategoryId,
        priority: Priority,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TaskId::generate(),
            title,
            category_id,
            priority,
            completed: false,
            completed_at: None,
            created_at: now,
        }
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Flip completion, stamping or clearing `completed_at`.
    pub(crate) fn toggle(&mut self, now: DateTime<Utc>) {
        self.completed = !self.completed;
        self.completed_at = self.completed.then_some(now);
    }

    /// Repair a record whose completion pair disagrees (hand-edited or
    /// written by an older build). Returns true if anything changed.
    ///
    /// Completed without a timestamp keeps its completion and is stamped
    /// with `created_at`; a stray timestamp on an open task is dropped.
    pub(crate) fn normalize(&mut self) -> bool {
        match (self.completed, self.completed_at) {
            (true, None) => {
                self.completed_at = Some(self.created_at);
                true
            }
            (false, Some(_)) => {
                self.completed_at = None;
                true
            }
            _ => false,
        }
    }
}

/// Strip control characters and surrounding whitespace from user text.
pub(crate) fn clean_text(input: &str) -> String {
    crate::util::sanitize_single_line(input).trim().to_owned()
}

// ============================================================================
// Tests
// ============================================================================
