//! Task keyword groups and keyword resolution.
//!
//! Every task line carries a state keyword (`TODO`, `DOING`, `DONE`, ...).
//! Keywords are classified into five [`KeywordGroup`]s. The built-in
//! keywords of each group can be extended, re-ordered, moved between groups,
//! or removed through [`KeywordSettings`]:
//!
//! - a plain entry (`"REVIEW"`) adds a keyword to the group
//! - a `-`-prefixed entry (`"-LATER"`) removes a built-in keyword of that group
//!
//! [`KeywordManager`] turns those settings into the effective keyword set once,
//! reporting problems through a [`KeywordValidationResult`] instead of failing.
//!
//! # Example
//!
//! ```
//! use todoseq::keywords::{KeywordGroup, KeywordManager, KeywordSettings};
//!
//! let settings = KeywordSettings {
//!     active: vec!["REVIEW".to_string()],
//!     inactive: vec!["-LATER".to_string()],
//!     ..Default::default()
//! };
//! let manager = KeywordManager::new(&settings);
//!
//! assert!(manager.is_active("REVIEW"));
//! assert!(!manager.is_known_keyword("LATER"));
//! assert_eq!(manager.group_of("TODO"), Some(KeywordGroup::Inactive));
//! ```

mod manager;
mod validation;

pub use manager::KeywordManager;
pub use validation::{KeywordIssue, KeywordIssueKind, KeywordValidationResult};

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Keyword Groups
// ============================================================================

/// Semantic group a keyword belongs to.
///
/// The group decides how a keyword behaves in the task lifecycle: which
/// default transition applies, whether the task counts as completed, and
/// whether it can advance at all (archived keywords never do).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordGroup {
    /// Work currently in progress
    Active,
    /// Work not started yet
    Inactive,
    /// Work blocked on something external
    Waiting,
    /// Finished or abandoned work
    Completed,
    /// Work kept for reference only
    Archived,
}

/// Static array of all groups, in resolution order
static ALL_GROUPS: &[KeywordGroup] = &[
    KeywordGroup::Active,
    KeywordGroup::Inactive,
    KeywordGroup::Waiting,
    KeywordGroup::Completed,
    KeywordGroup::Archived,
];

impl KeywordGroup {
    /// Number of keyword groups.
    pub const COUNT: usize = 5;

    /// Returns all groups in resolution order.
    pub fn all() -> &'static [KeywordGroup] {
        ALL_GROUPS
    }

    /// Returns the built-in keywords of this group, in their fixed order.
    ///
    /// ```
    /// use todoseq::keywords::KeywordGroup;
    ///
    /// assert_eq!(KeywordGroup::Inactive.builtin_keywords(), &["TODO", "LATER"]);
    /// ```
    pub fn builtin_keywords(&self) -> &'static [&'static str] {
        match self {
            KeywordGroup::Active => &["NOW", "DOING", "IN-PROGRESS"],
            KeywordGroup::Inactive => &["TODO", "LATER"],
            KeywordGroup::Waiting => &["WAIT", "WAITING"],
            KeywordGroup::Completed => &["DONE", "CANCELED", "CANCELLED"],
            KeywordGroup::Archived => &["ARCHIVED"],
        }
    }

    /// Returns the group a keyword belongs to by default, if it is built in.
    pub fn of_builtin(keyword: &str) -> Option<KeywordGroup> {
        ALL_GROUPS
            .iter()
            .copied()
            .find(|group| group.builtin_keywords().contains(&keyword))
    }

    /// Returns true if the keyword is one of the built-in keywords of any group.
    pub fn is_builtin(keyword: &str) -> bool {
        Self::of_builtin(keyword).is_some()
    }

    /// Stable index of this group, used for per-group storage.
    pub(crate) fn index(&self) -> usize {
        match self {
            KeywordGroup::Active => 0,
            KeywordGroup::Inactive => 1,
            KeywordGroup::Waiting => 2,
            KeywordGroup::Completed => 3,
            KeywordGroup::Archived => 4,
        }
    }

    /// Lowercase label used in messages and settings keys.
    pub fn label(&self) -> &'static str {
        match self {
            KeywordGroup::Active => "active",
            KeywordGroup::Inactive => "inactive",
            KeywordGroup::Waiting => "waiting",
            KeywordGroup::Completed => "completed",
            KeywordGroup::Archived => "archived",
        }
    }
}

impl fmt::Display for KeywordGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// Keyword Tokens
// ============================================================================

/// A single change requested by a settings entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeywordChange {
    /// Add the keyword to the group (or move / re-order a built-in)
    Add(String),
    /// Remove a built-in keyword from the group
    Remove(String),
}

impl KeywordChange {
    /// The normalized keyword this change refers to.
    pub fn keyword(&self) -> &str {
        match self {
            KeywordChange::Add(keyword) | KeywordChange::Remove(keyword) => keyword,
        }
    }

    /// Returns true for removals.
    pub fn is_removal(&self) -> bool {
        matches!(self, KeywordChange::Remove(_))
    }
}

/// A parsed settings entry: what changes, and in which group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeywordToken {
    /// The requested change
    pub change: KeywordChange,
    /// The group whose settings list held the entry
    pub group: KeywordGroup,
}

impl KeywordToken {
    /// Parse a raw settings entry.
    ///
    /// Surrounding whitespace is trimmed, a leading `-` marks a removal, and
    /// the keyword is upper-cased. Entries that are empty after stripping
    /// return `None`.
    ///
    /// ```
    /// use todoseq::keywords::{KeywordChange, KeywordGroup, KeywordToken};
    ///
    /// let token = KeywordToken::parse(" -later ", KeywordGroup::Inactive).unwrap();
    /// assert_eq!(token.change, KeywordChange::Remove("LATER".to_string()));
    /// assert!(KeywordToken::parse("-", KeywordGroup::Inactive).is_none());
    /// ```
    pub fn parse(raw: &str, group: KeywordGroup) -> Option<Self> {
        let trimmed = raw.trim();
        let (removal, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest.trim()),
            None => (false, trimmed),
        };
        if body.is_empty() {
            return None;
        }
        let keyword = body.to_uppercase();
        let change = if removal {
            KeywordChange::Remove(keyword)
        } else {
            KeywordChange::Add(keyword)
        };
        Some(Self { change, group })
    }

    /// The normalized keyword of this token.
    pub fn keyword(&self) -> &str {
        self.change.keyword()
    }
}

// ============================================================================
// Keyword Settings
// ============================================================================

/// Raw per-group keyword settings, as written by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordSettings {
    /// Additions / removals for the active group
    pub active: Vec<String>,
    /// Additions / removals for the inactive group
    pub inactive: Vec<String>,
    /// Additions / removals for the waiting group
    pub waiting: Vec<String>,
    /// Additions / removals for the completed group
    pub completed: Vec<String>,
    /// Additions / removals for the archived group
    pub archived: Vec<String>,
}

impl KeywordSettings {
    /// Returns the raw entries for a group.
    pub fn entries(&self, group: KeywordGroup) -> &[String] {
        match group {
            KeywordGroup::Active => &self.active,
            KeywordGroup::Inactive => &self.inactive,
            KeywordGroup::Waiting => &self.waiting,
            KeywordGroup::Completed => &self.completed,
            KeywordGroup::Archived => &self.archived,
        }
    }

    /// Parse every entry into tokens, group by group in resolution order.
    pub fn tokens(&self) -> Vec<KeywordToken> {
        KeywordGroup::all()
            .iter()
            .flat_map(|group| {
                self.entries(*group)
                    .iter()
                    .filter_map(move |raw| KeywordToken::parse(raw, *group))
            })
            .collect()
    }

    /// Returns true if no group has any entry.
    pub fn is_empty(&self) -> bool {
        KeywordGroup::all()
            .iter()
            .all(|group| self.entries(*group).is_empty())
    }
}
