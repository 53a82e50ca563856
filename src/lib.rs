//! todoseq - task keyword extraction and state transitions
//!
//! Finds task lines (`TODO write docs`, `// DOING refactor`) in prose and in
//! source code of ~30 languages, and computes how a task's state keyword
//! moves through a configurable lifecycle.
//!
//! # Architecture
//!
//! - [`keywords`] - Keyword groups and resolution of user keyword settings
//! - [`transitions`] - Transition statement parser and next-state computation
//! - [`language`] - Comment grammars and the language registry
//! - [`pattern`] - Composition of task regexes from keywords and comment grammars
//! - [`multiline`] - Block comment tracking while scanning
//! - [`task`] - Task records and the document/code scanner
//! - [`config`] - Settings loading and validation
//! - [`error`] - Custom error types
//!
//! # Example
//!
//! ```
//! use todoseq::config::Settings;
//! use todoseq::language::LanguageRegistry;
//! use todoseq::task::TaskParser;
//! use std::sync::Arc;
//!
//! let settings = Settings::default();
//! let keywords = settings.keyword_manager();
//! let transitions = settings.transition_manager(Arc::clone(&keywords));
//! let parser = TaskParser::new(
//!     keywords,
//!     Arc::new(LanguageRegistry::builtin().unwrap()),
//!     settings.parser,
//! )
//! .unwrap();
//!
//! let task = parser.parse_line("- TODO write docs").unwrap().unwrap();
//! let next = transitions.next_state(&task.state);
//! assert_eq!(task.render_with_state(next), "- DOING write docs");
//! ```

pub mod config;
pub mod error;
pub mod keywords;
pub mod language;
pub mod multiline;
pub mod pattern;
pub mod task;
pub mod transitions;

// Re-export commonly used types
pub use error::{Result, TodoseqError};

pub use config::{ParserSettings, Settings, SettingsReport};
pub use keywords::{KeywordGroup, KeywordManager, KeywordSettings, KeywordValidationResult};
pub use language::{CommentFragment, FragmentRole, LanguageDefinition, LanguageRegistry};
pub use multiline::{CommentState, MultilineCommentState};
pub use pattern::{LanguageAwareRegexBuilder, PatternCache, RegexPair};
pub use task::{Priority, Task, TaskDate, TaskParser};
pub use transitions::{
    TaskStateTransitionManager, TransitionError, TransitionErrorKind, TransitionParser,
    TransitionSettings,
};
