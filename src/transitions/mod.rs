//! Task state transitions.
//!
//! Transitions are declared in a small line-oriented language:
//!
//! ```text
//! TODO -> DOING -> DONE           chain: TODO→DOING, DOING→DONE
//! (WAIT | WAITING) -> IN-PROGRESS group alternation, expanded to every member
//! LATER -> NOW -> [DONE]          terminal shorthand: NOW→DONE and DONE→DONE
//! ```
//!
//! [`TransitionParser`] turns statements into edges, validating every keyword
//! against a [`KeywordManager`](crate::keywords::KeywordManager).
//! [`TaskStateTransitionManager`] answers "what comes next" using those edges
//! first and per-group defaults second.

mod manager;
mod parser;

pub use manager::TaskStateTransitionManager;
pub use parser::{TransitionParseResult, TransitionParser};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Statements used when the settings declare none.
pub const DEFAULT_TRANSITIONS: &[&str] = &[
    "TODO -> DOING -> DONE",
    "(WAIT | WAITING) -> IN-PROGRESS",
    "LATER -> NOW -> DONE",
];

/// Built-in fallback for the "default inactive" keyword.
pub const DEFAULT_INACTIVE: &str = "TODO";
/// Built-in fallback for the "default active" keyword.
pub const DEFAULT_ACTIVE: &str = "DOING";
/// Built-in fallback for the "default completed" keyword.
pub const DEFAULT_COMPLETED: &str = "DONE";

/// Transition settings as written by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransitionSettings {
    /// Transition statements, one per entry
    pub statements: Vec<String>,
    /// Keyword a task gets when it is reset or (re)created
    pub default_inactive: Option<String>,
    /// Keyword a task gets when work starts
    pub default_active: Option<String>,
    /// Keyword a task gets when work finishes
    pub default_completed: Option<String>,
}

/// Kind of transition statement problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionErrorKind {
    /// Statement references a keyword that is not effective
    InvalidKeyword,
    /// Statement gives a keyword a second, different outgoing edge
    Conflict,
    /// Statement cannot be parsed
    SyntaxError,
}

impl fmt::Display for TransitionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionErrorKind::InvalidKeyword => write!(f, "invalid-keyword"),
            TransitionErrorKind::Conflict => write!(f, "conflict"),
            TransitionErrorKind::SyntaxError => write!(f, "syntax-error"),
        }
    }
}

/// A problem found in one transition statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionError {
    /// 1-based index of the statement
    pub line: usize,
    /// Human-readable description
    pub message: String,
    /// Kind of problem
    #[serde(rename = "type")]
    pub kind: TransitionErrorKind,
}

impl TransitionError {
    pub(crate) fn new(line: usize, kind: TransitionErrorKind, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
            kind,
        }
    }
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} ({})", self.line, self.message, self.kind)
    }
}
