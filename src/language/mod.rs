//! Comment syntax of programming languages.
//!
//! A [`LanguageDefinition`] describes how comments look in one language as up
//! to five [`CommentFragment`]s, one per [`FragmentRole`]. Any role may be
//! missing, meaning that comment style does not exist in the language.
//!
//! Fragments are *bare markers*: they describe the comment opener itself
//! (`//`, `/*`, `#`) and never the whitespace that follows it. Whitespace
//! rules are added when fragments are composed into task patterns, see
//! [`crate::pattern`].
//!
//! # Example
//!
//! ```
//! use todoseq::language::{FragmentRole, LanguageRegistry};
//!
//! let registry = LanguageRegistry::builtin().unwrap();
//! let rust = registry.get("RS").unwrap();
//!
//! assert_eq!(rust.name(), "rust");
//! assert!(rust.fragment(FragmentRole::BlockStart).is_some());
//! assert!(registry.get("python").unwrap().fragment(FragmentRole::BlockContinuation).is_none());
//! ```

mod registry;

pub use registry::LanguageRegistry;

use regex::Regex;
use std::fmt;

use crate::error::{Result, TodoseqError};

/// Role of a comment fragment within a language's comment grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FragmentRole {
    /// Opens a comment running to end of line (`//`, `#`)
    SingleLine,
    /// Opens a block comment (`/*`, `"""`)
    BlockStart,
    /// Closes a block comment (`*/`)
    BlockEnd,
    /// Leads a line inside a block comment (` * `)
    BlockContinuation,
    /// Code followed by a trailing comment on the same line
    Inline,
}

impl FragmentRole {
    /// All roles, in the order the test pattern tries them.
    pub fn all() -> &'static [FragmentRole] {
        &[
            FragmentRole::SingleLine,
            FragmentRole::BlockStart,
            FragmentRole::BlockEnd,
            FragmentRole::BlockContinuation,
            FragmentRole::Inline,
        ]
    }

    /// Returns true for roles that can precede a task keyword.
    pub fn is_prefix(&self) -> bool {
        !matches!(self, FragmentRole::BlockEnd)
    }

    pub fn label(&self) -> &'static str {
        match self {
            FragmentRole::SingleLine => "single-line",
            FragmentRole::BlockStart => "block-start",
            FragmentRole::BlockEnd => "block-end",
            FragmentRole::BlockContinuation => "block-continuation",
            FragmentRole::Inline => "inline",
        }
    }
}

impl fmt::Display for FragmentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A compiled comment-syntax fragment.
#[derive(Debug, Clone)]
pub struct CommentFragment {
    role: FragmentRole,
    pattern: Regex,
}

impl CommentFragment {
    /// Compile a fragment from regex source.
    pub fn new(role: FragmentRole, pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern)
            .map_err(|e| TodoseqError::pattern(format!("{} fragment '{}'", role, pattern), e))?;
        Ok(Self { role, pattern })
    }

    pub fn role(&self) -> FragmentRole {
        self.role
    }

    /// The compiled pattern, unanchored.
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// The regex source of this fragment.
    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}

impl PartialEq for CommentFragment {
    fn eq(&self, other: &Self) -> bool {
        self.role == other.role && self.as_str() == other.as_str()
    }
}

impl Eq for CommentFragment {}

/// Comment grammar of one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageDefinition {
    name: String,
    aliases: Vec<String>,
    fragments: Vec<CommentFragment>,
}

impl LanguageDefinition {
    /// A language with no comment syntax yet.
    ///
    /// Names and aliases are stored lower-cased.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_lowercase(),
            aliases: Vec::new(),
            fragments: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        let alias = alias.into().to_lowercase();
        if alias != self.name && !self.aliases.contains(&alias) {
            self.aliases.push(alias);
        }
        self
    }

    /// Set the fragment for a role, replacing any previous one.
    pub fn with_fragment(mut self, role: FragmentRole, pattern: &str) -> Result<Self> {
        let fragment = CommentFragment::new(role, pattern)?;
        self.fragments.retain(|existing| existing.role != role);
        self.fragments.push(fragment);
        self.fragments.sort_by_key(|f| f.role);
        Ok(self)
    }

    /// Canonical, lower-cased name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Fragment for a role, if the language has that comment style.
    pub fn fragment(&self, role: FragmentRole) -> Option<&CommentFragment> {
        self.fragments.iter().find(|f| f.role == role)
    }

    /// All fragments, ordered by role.
    pub fn fragments(&self) -> &[CommentFragment] {
        &self.fragments
    }

    /// Fragments that can precede a task keyword, in test-pattern order.
    pub fn prefix_fragments(&self) -> impl Iterator<Item = &CommentFragment> {
        self.fragments.iter().filter(|f| f.role.is_prefix())
    }

    /// Returns true if the language has both block delimiters.
    pub fn has_block_comments(&self) -> bool {
        self.fragment(FragmentRole::BlockStart).is_some()
            && self.fragment(FragmentRole::BlockEnd).is_some()
    }

    /// Case-insensitive match against the name and aliases.
    pub fn matches_name(&self, name: &str) -> bool {
        let name = name.trim().to_lowercase();
        self.name == name || self.aliases.contains(&name)
    }
}

impl fmt::Display for LanguageDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
