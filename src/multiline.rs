//! Block comment tracking across lines.
//!
//! A task line such as ` * TODO refactor` is only a task when it sits inside
//! a block comment. [`MultilineCommentState`] follows one scan of one
//! document line by line and answers whether the current line is inside an
//! unterminated block comment, remembering the indent of the line that
//! opened it.
//!
//! The state machine is mutated on every line and belongs to a single scan;
//! concurrent scans each need their own instance.

use crate::language::{FragmentRole, LanguageDefinition};

/// Whether the scan is inside a block comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CommentState {
    #[default]
    Outside,
    /// Inside a block comment opened by a line with this leading indent
    Inside { indent: String },
}

impl CommentState {
    pub fn is_inside(&self) -> bool {
        matches!(self, CommentState::Inside { .. })
    }

    /// Indent of the opening line, when inside a comment.
    pub fn indent(&self) -> Option<&str> {
        match self {
            CommentState::Inside { indent } => Some(indent),
            CommentState::Outside => None,
        }
    }
}

/// Per-scan block comment state machine.
///
/// ```
/// use todoseq::language::LanguageRegistry;
/// use todoseq::multiline::{CommentState, MultilineCommentState};
///
/// let registry = LanguageRegistry::builtin().unwrap();
/// let mut state = MultilineCommentState::new(registry.get("c"));
///
/// assert!(state.handle_line("  /* TODO x").is_inside());
/// assert_eq!(state.handle_line("done */"), &CommentState::Outside);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MultilineCommentState<'a> {
    language: Option<&'a LanguageDefinition>,
    state: CommentState,
}

impl<'a> MultilineCommentState<'a> {
    pub fn new(language: Option<&'a LanguageDefinition>) -> Self {
        Self {
            language,
            state: CommentState::Outside,
        }
    }

    /// Switch language, e.g. at a code fence. Resets the state.
    pub fn set_language(&mut self, language: Option<&'a LanguageDefinition>) {
        self.language = language;
        self.reset();
    }

    pub fn language(&self) -> Option<&'a LanguageDefinition> {
        self.language
    }

    /// Force the state back to outside.
    pub fn reset(&mut self) {
        self.state = CommentState::Outside;
    }

    /// State after the most recent line.
    pub fn state(&self) -> &CommentState {
        &self.state
    }

    /// Feed the next line and return the state after it.
    ///
    /// A line opens a comment when the block-start fragment matches and the
    /// block-end fragment does not match after it. A line closes the comment
    /// when the block-end fragment matches anywhere. Without a language the
    /// state is always outside.
    pub fn handle_line(&mut self, line: &str) -> &CommentState {
        let Some(language) = self.language else {
            self.state = CommentState::Outside;
            return &self.state;
        };
        let start = language.fragment(FragmentRole::BlockStart);
        let end = language.fragment(FragmentRole::BlockEnd);

        if self.state.is_inside() {
            if end.is_some_and(|end| end.pattern().is_match(line)) {
                self.state = CommentState::Outside;
            }
        } else {
            let opened = start
                .and_then(|start| start.pattern().find(line))
                .is_some_and(|found| {
                    let rest = &line[found.end()..];
                    !end.is_some_and(|end| end.pattern().is_match(rest))
                });
            if opened {
                let indent_len = line.len() - line.trim_start_matches([' ', '\t']).len();
                self.state = CommentState::Inside {
                    indent: line[..indent_len].to_string(),
                };
            }
        }
        &self.state
    }
}
