//! Task records extracted from text.
//!
//! A [`Task`] is one line carrying a state keyword, split into the parts
//! needed to display it and to rewrite it with a different keyword.
//! [`TaskParser`] finds tasks in prose, in Markdown documents with fenced
//! code blocks, and in source code.

mod parser;

pub use parser::TaskParser;

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::keywords::KeywordGroup;

// ============================================================================
// Priority
// ============================================================================

/// Task priority, written `[#A]`, `[#B]` or `[#C]` before the task text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    #[serde(rename = "A")]
    High,
    #[serde(rename = "B")]
    Medium,
    #[serde(rename = "C")]
    Low,
}

impl Priority {
    pub fn letter(&self) -> char {
        match self {
            Priority::High => 'A',
            Priority::Medium => 'B',
            Priority::Low => 'C',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'A' => Some(Priority::High),
            'B' => Some(Priority::Medium),
            'C' => Some(Priority::Low),
            _ => None,
        }
    }

    /// Split a leading `[#X]` cookie off task text.
    ///
    /// ```
    /// use todoseq::task::Priority;
    ///
    /// assert_eq!(
    ///     Priority::strip("[#A] ship it"),
    ///     (Some(Priority::High), "ship it")
    /// );
    /// assert_eq!(Priority::strip("ship it"), (None, "ship it"));
    /// ```
    pub fn strip(text: &str) -> (Option<Self>, &str) {
        let Some(rest) = text.strip_prefix("[#") else {
            return (None, text);
        };
        let mut chars = rest.chars();
        let (Some(letter), Some(']')) = (chars.next(), chars.next()) else {
            return (None, text);
        };
        match Self::from_letter(letter) {
            Some(priority) => (Some(priority), chars.as_str().trim_start()),
            None => (None, text),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[#{}]", self.letter())
    }
}

// ============================================================================
// Dates
// ============================================================================

/// Kind of date line following a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateKind {
    Scheduled,
    Deadline,
}

/// A date, with optional time, from a `SCHEDULED:` or `DEADLINE:` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskDate {
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
}

impl TaskDate {
    pub fn new(date: NaiveDate) -> Self {
        Self { date, time: None }
    }

    #[must_use]
    pub fn with_time(mut self, time: NaiveTime) -> Self {
        self.time = Some(time);
        self
    }
}

impl FromStr for TaskDate {
    type Err = chrono::ParseError;

    /// Parse the inside of `<...>`: `YYYY-MM-DD`, an optional weekday name,
    /// and an optional `HH:MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let date = NaiveDate::parse_from_str(parts.next().unwrap_or_default(), "%Y-%m-%d")?;
        let mut parsed = TaskDate::new(date);
        for part in parts {
            if part.contains(':') {
                parsed.time = Some(NaiveTime::parse_from_str(part, "%H:%M")?);
            }
        }
        Ok(parsed)
    }
}

impl fmt::Display for TaskDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.date.format("%Y-%m-%d %a"))?;
        if let Some(time) = self.time {
            write!(f, " {}", time.format("%H:%M"))?;
        }
        Ok(())
    }
}

/// Recognizes `SCHEDULED: <...>` and `DEADLINE: <...>` anywhere in a line.
pub(crate) fn date_line_regex() -> std::result::Result<Regex, regex::Error> {
    Regex::new(r"\b(SCHEDULED|DEADLINE):[ \t]*<([^<>]+)>")
}

// ============================================================================
// Task
// ============================================================================

/// A task line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    /// 0-based line number in the scanned text
    pub line: usize,
    /// The full source line
    pub raw_text: String,
    pub indent: String,
    /// Comment marker before the keyword, for tasks in code
    pub comment_prefix: Option<String>,
    /// List marker or checkbox before the keyword
    pub list_marker: Option<String>,
    /// The state keyword
    pub state: String,
    pub group: KeywordGroup,
    /// Text after the keyword, without priority cookie or closer
    pub text: String,
    /// Block comment closer after the text
    pub tail: Option<String>,
    pub completed: bool,
    pub priority: Option<Priority>,
    /// Language of the code the task was found in
    pub language: Option<String>,
    /// Indent of the line opening the surrounding block comment
    pub block_comment_indent: Option<String>,
    pub scheduled: Option<TaskDate>,
    pub deadline: Option<TaskDate>,
    #[serde(skip)]
    pub(crate) keyword_span: Range<usize>,
}

impl Task {
    /// The source line with the keyword replaced by `state`.
    ///
    /// An empty `state` removes the keyword together with the space after it.
    ///
    /// ```
    /// use todoseq::task::TaskParser;
    ///
    /// let parser = TaskParser::builtin().unwrap();
    /// let task = parser.parse_line("- TODO write docs").unwrap().unwrap();
    ///
    /// assert_eq!(task.render_with_state("DOING"), "- DOING write docs");
    /// assert_eq!(task.render_with_state(""), "- write docs");
    /// ```
    pub fn render_with_state(&self, state: &str) -> String {
        let before = &self.raw_text[..self.keyword_span.start];
        let after = &self.raw_text[self.keyword_span.end..];
        if state.is_empty() {
            let mut rest = after.chars();
            rest.next();
            format!("{}{}", before, rest.as_str())
        } else {
            format!("{}{}{}", before, state, after)
        }
    }

    /// Returns true if the task sits in source code rather than prose.
    pub fn is_code(&self) -> bool {
        self.language.is_some()
    }

    pub(crate) fn set_date(&mut self, kind: DateKind, date: TaskDate) {
        match kind {
            DateKind::Scheduled => self.scheduled = Some(date),
            DateKind::Deadline => self.deadline = Some(date),
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.state)?;
        if let Some(priority) = self.priority {
            write!(f, " {}", priority)?;
        }
        if !self.text.is_empty() {
            write!(f, " {}", self.text)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_strip() {
        assert_eq!(Priority::strip("[#b] later"), (Some(Priority::Medium), "later"));
        assert_eq!(Priority::strip("[#C]"), (Some(Priority::Low), ""));
        assert_eq!(Priority::strip("[#D] nope"), (None, "[#D] nope"));
        assert_eq!(Priority::strip("[#A nope"), (None, "[#A nope"));
        assert_eq!(Priority::High.to_string(), "[#A]");
    }

    #[test]
    fn test_priority_serializes_as_letter() {
        assert_eq!(serde_json::to_string(&Priority::Low).unwrap(), "\"C\"");
    }

    #[test]
    fn test_task_date_parsing() {
        let date: TaskDate = "2024-03-01".parse().unwrap();
        assert_eq!(date.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(date.time, None);

        let date: TaskDate = "2024-03-01 Fri 09:30".parse().unwrap();
        assert_eq!(date.time, NaiveTime::from_hms_opt(9, 30, 0));
        assert_eq!(date.to_string(), "2024-03-01 Fri 09:30");

        assert!("2024-13-01".parse::<TaskDate>().is_err());
        assert!("2024-03-01 25:00".parse::<TaskDate>().is_err());
        assert!("".parse::<TaskDate>().is_err());
    }

    #[test]
    fn test_date_line_regex() {
        let re = date_line_regex().unwrap();
        let caps = re.captures("   SCHEDULED: <2024-03-01 Fri>").unwrap();
        assert_eq!(&caps[1], "SCHEDULED");
        assert_eq!(&caps[2], "2024-03-01 Fri");
        assert!(re.is_match("// DEADLINE: <2024-03-01>"));
        assert!(!re.is_match("SCHEDULED 2024-03-01"));
    }
}
