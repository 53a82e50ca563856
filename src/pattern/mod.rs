//! Language-aware task line patterns.
//!
//! [`LanguageAwareRegexBuilder`] combines a keyword set with a language's
//! comment fragments into a [`RegexPair`]:
//!
//! - the *test* pattern answers "is this a task line" cheaply
//! - the *capture* pattern splits a task line into indent, comment prefix,
//!   list marker, keyword, text and trailing block-comment closer
//!
//! A space is always required between the comment marker and the keyword,
//! and between the keyword and the text, so `//TODO` and `TODO:` are never
//! tasks.
//!
//! ```
//! use todoseq::language::LanguageRegistry;
//! use todoseq::pattern::LanguageAwareRegexBuilder;
//!
//! let registry = LanguageRegistry::builtin().unwrap();
//! let pair = LanguageAwareRegexBuilder::build_regex(&["TODO"], registry.get("rust")).unwrap();
//!
//! let task = pair.captures("    // TODO fix this").unwrap();
//! assert_eq!(task.indent, "    ");
//! assert_eq!(task.prefix, Some("// "));
//! assert_eq!(task.keyword, "TODO");
//! assert_eq!(task.text, "fix this");
//! assert!(!pair.is_match("//TODO fix this"));
//! ```

mod cache;
mod composer;

pub use cache::PatternCache;
pub use composer::{
    compose, keyword_alternation, ComposedPattern, Layout, ARRAY_CLOSE, LIST_MARKER,
};

use regex::Regex;
use tracing::trace;

use crate::error::{Result, TodoseqError};
use crate::language::{CommentFragment, FragmentRole, LanguageDefinition};

/// Decomposed task line. Empty optional parts are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskMatch<'t> {
    /// Leading whitespace
    pub indent: &'t str,
    /// Comment marker (or code plus marker, for inline comments) with its
    /// trailing whitespace
    pub prefix: Option<&'t str>,
    /// List marker or checkbox with its trailing whitespace
    pub list_marker: Option<&'t str>,
    pub keyword: &'t str,
    /// Byte offset of the keyword in the line
    pub keyword_start: usize,
    /// Text after the keyword, without trailing whitespace or closer
    pub text: &'t str,
    /// Block comment closer at end of line, with its leading whitespace
    pub tail: Option<&'t str>,
}

/// Compiled test and capture patterns for one keyword set and language.
#[derive(Debug, Clone)]
pub struct RegexPair {
    test: Regex,
    capture: Regex,
    roles: Vec<(FragmentRole, Regex)>,
}

impl RegexPair {
    fn compile(composed: &ComposedPattern, prefixes: &[&CommentFragment]) -> Result<Self> {
        let test = Regex::new(&composed.test)
            .map_err(|e| TodoseqError::pattern("task test pattern", e))?;
        let capture = Regex::new(&composed.capture)
            .map_err(|e| TodoseqError::pattern("task capture pattern", e))?;
        let roles = prefixes
            .iter()
            .map(|fragment| {
                let source = format!(
                    r"^(?:{})[ \t]+$",
                    composer::strip_leading_whitespace(fragment.as_str())
                );
                Regex::new(&source)
                    .map(|re| (fragment.role(), re))
                    .map_err(|e| TodoseqError::pattern(format!("{} classifier", fragment.role()), e))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            test,
            capture,
            roles,
        })
    }

    /// The existence test pattern.
    pub fn test(&self) -> &Regex {
        &self.test
    }

    /// The decomposition pattern (multi-line mode).
    pub fn capture(&self) -> &Regex {
        &self.capture
    }

    /// Returns true if the line is a task line.
    pub fn is_match(&self, line: &str) -> bool {
        self.test.is_match(line)
    }

    /// Decompose a task line.
    ///
    /// Returns `None` unless the test pattern also accepts the line.
    pub fn captures<'t>(&self, line: &'t str) -> Option<TaskMatch<'t>> {
        if !self.test.is_match(line) {
            return None;
        }
        let caps = self.capture.captures(line)?;
        let part = |name: &str| {
            caps.name(name)
                .map(|m| m.as_str())
                .filter(|s| !s.is_empty())
        };
        let keyword = caps.name("keyword")?;
        let found = TaskMatch {
            indent: part("indent").unwrap_or(""),
            prefix: part("prefix"),
            list_marker: part("marker"),
            keyword: keyword.as_str(),
            keyword_start: keyword.start(),
            text: part("text").unwrap_or(""),
            tail: part("tail"),
        };
        trace!(keyword = found.keyword, "Matched task line");
        Some(found)
    }

    /// Which fragment role produced a captured prefix.
    ///
    /// Roles are tried in the same order as the capture alternation.
    pub fn prefix_role(&self, prefix: &str) -> Option<FragmentRole> {
        self.roles
            .iter()
            .find(|(_, re)| re.is_match(prefix))
            .map(|(role, _)| *role)
    }
}

/// Builds [`RegexPair`]s. Stateless; cache results with [`PatternCache`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LanguageAwareRegexBuilder;

impl LanguageAwareRegexBuilder {
    /// Patterns for task lines of `language`.
    ///
    /// With no language the pattern matches plain prose: an optional list
    /// marker, the keyword, and whitespace.
    pub fn build_regex<S: AsRef<str>>(
        keywords: &[S],
        language: Option<&LanguageDefinition>,
    ) -> Result<RegexPair> {
        let prefixes: Vec<&CommentFragment> = language
            .map(|lang| lang.prefix_fragments().collect())
            .unwrap_or_default();
        let closer = language.and_then(|lang| lang.fragment(FragmentRole::BlockEnd));
        let composed = compose(
            keywords,
            Layout {
                prefixes: &prefixes,
                closer,
            },
        );
        RegexPair::compile(&composed, &prefixes)
    }

    /// Patterns for bare lines inside a block comment of `language`.
    ///
    /// No comment marker precedes the keyword, but the line may end with the
    /// language's block closer.
    pub fn build_comment_body_regex<S: AsRef<str>>(
        keywords: &[S],
        language: &LanguageDefinition,
    ) -> Result<RegexPair> {
        let composed = compose(
            keywords,
            Layout {
                prefixes: &[],
                closer: language.fragment(FragmentRole::BlockEnd),
            },
        );
        RegexPair::compile(&composed, &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::LanguageRegistry;

    const KEYWORDS: &[&str] = &["TODO", "DOING", "DONE", "IN-PROGRESS", "LATER", "NOW"];

    fn pair(language: &str) -> RegexPair {
        let registry = LanguageRegistry::builtin().unwrap();
        LanguageAwareRegexBuilder::build_regex(KEYWORDS, registry.get(language)).unwrap()
    }

    fn prose() -> RegexPair {
        LanguageAwareRegexBuilder::build_regex(KEYWORDS, None).unwrap()
    }

    // ========================================================================
    // C-style comments
    // ========================================================================

    #[test]
    fn test_line_comment_decomposes() {
        let pair = pair("c");
        assert!(pair.is_match("// TODO fix this"));
        let task = pair.captures("// TODO fix this").unwrap();
        assert_eq!(
            task,
            TaskMatch {
                indent: "",
                prefix: Some("// "),
                list_marker: None,
                keyword: "TODO",
                keyword_start: 3,
                text: "fix this",
                tail: None,
            }
        );
    }

    #[test]
    fn test_keyword_glued_to_marker_is_not_a_task() {
        let pair = pair("c");
        assert!(!pair.is_match("//TODO fix this"));
        assert!(pair.captures("//TODO fix this").is_none());
    }

    #[test]
    fn test_keyword_glued_to_text_is_not_a_task() {
        let pair = pair("c");
        assert!(!pair.is_match("// TODO: fix this"));
        assert!(!pair.is_match("// TODOS fix this"));
        assert!(!pair.is_match("// TODO"));
    }

    #[test]
    fn test_multiple_spaces_after_marker() {
        let task = pair("rust").captures("\t//    DOING  refactor  ").unwrap();
        assert_eq!(task.indent, "\t");
        assert_eq!(task.prefix, Some("//    "));
        assert_eq!(task.keyword, "DOING");
        assert_eq!(task.text, "refactor");
    }

    #[test]
    fn test_doc_comments() {
        let pair = pair("rust");
        assert_eq!(pair.captures("/// TODO doc").unwrap().prefix, Some("/// "));
        assert_eq!(pair.captures("//! TODO doc").unwrap().prefix, Some("//! "));
        assert_eq!(pair.captures("/** TODO doc */").unwrap().prefix, Some("/** "));
        assert!(!pair.is_match("//// TODO doc"));
    }

    #[test]
    fn test_block_comment_closer_is_split_off() {
        let task = pair("c").captures("  /* TODO tidy up */").unwrap();
        assert_eq!(task.indent, "  ");
        assert_eq!(task.prefix, Some("/* "));
        assert_eq!(task.text, "tidy up");
        assert_eq!(task.tail, Some(" */"));
    }

    #[test]
    fn test_continuation_line() {
        let pair = pair("java");
        let task = pair.captures("   * TODO document").unwrap();
        assert_eq!(task.indent, "   ");
        assert_eq!(task.prefix, Some("* "));
        assert_eq!(pair.prefix_role("* "), Some(FragmentRole::BlockContinuation));
    }

    #[test]
    fn test_inline_comment_after_code() {
        let pair = pair("javascript");
        let task = pair.captures("let x = 1; // TODO remove").unwrap();
        assert_eq!(task.prefix, Some("let x = 1; // "));
        assert_eq!(task.keyword, "TODO");
        assert_eq!(task.text, "remove");
        assert_eq!(pair.prefix_role("let x = 1; // "), Some(FragmentRole::Inline));
        assert_eq!(pair.prefix_role("// "), Some(FragmentRole::SingleLine));
    }

    #[test]
    fn test_list_marker_inside_comment() {
        let task = pair("c").captures("// - [ ] TODO item").unwrap();
        assert_eq!(task.list_marker, Some("- [ ] "));
        assert_eq!(task.keyword, "TODO");
        assert_eq!(task.text, "item");
    }

    #[test]
    fn test_code_without_comment_is_not_a_task() {
        let pair = pair("c");
        assert!(!pair.is_match("TODO fix this"));
        assert!(!pair.is_match("int TODO = 1;"));
    }

    // ========================================================================
    // Other grammars
    // ========================================================================

    #[test]
    fn test_hash_comments() {
        let pair = pair("python");
        assert_eq!(pair.captures("# TODO x").unwrap().prefix, Some("# "));
        assert_eq!(pair.captures("x = 1  # LATER y").unwrap().keyword, "LATER");
        let task = pair.captures(r#"""" TODO docstring""""#).unwrap();
        assert_eq!(task.prefix, Some(r#"""" "#));
        assert_eq!(task.text, "docstring");
        assert_eq!(task.tail, Some(r#"""""#));
    }

    #[test]
    fn test_powershell_block() {
        let task = pair("powershell").captures("<# TODO check #>").unwrap();
        assert_eq!(task.prefix, Some("<# "));
        assert_eq!(task.tail, Some(" #>"));
    }

    #[test]
    fn test_dash_comments() {
        assert!(pair("sql").is_match("-- TODO index"));
        assert!(pair("lua").is_match("--[[ TODO rewrite ]]"));
        assert_eq!(pair("lua").captures("--[[ TODO rewrite ]]").unwrap().tail, Some(" ]]"));
        assert!(pair("haskell").is_match("{- TODO types -}"));
    }

    #[test]
    fn test_html_comment() {
        let task = pair("html").captures("<!-- TODO fix layout -->").unwrap();
        assert_eq!(task.prefix, Some("<!-- "));
        assert_eq!(task.text, "fix layout");
        assert_eq!(task.tail, Some(" -->"));
    }

    #[test]
    fn test_every_language_requires_space_after_marker() {
        let registry = LanguageRegistry::builtin().unwrap();
        for language in registry.iter() {
            let pair = LanguageAwareRegexBuilder::build_regex(KEYWORDS, Some(language)).unwrap();
            for fragment in language.fragments() {
                if fragment.role() == FragmentRole::SingleLine {
                    let marker = match language.name() {
                        "ini" => ";",
                        "php" => "//",
                        _ => fragment.as_str().trim_end_matches(['+', '?']).trim_end_matches("[/!]"),
                    };
                    let glued = format!("{}TODO x", marker);
                    assert!(!pair.is_match(&glued), "{}: {}", language, glued);
                    let spaced = format!("{} TODO x", marker);
                    assert!(pair.is_match(&spaced), "{}: {}", language, spaced);
                }
            }
        }
    }

    // ========================================================================
    // Prose and comment bodies
    // ========================================================================

    #[test]
    fn test_prose_line() {
        let pair = prose();
        let task = pair.captures("  1. [x] DONE ship it").unwrap();
        assert_eq!(task.indent, "  ");
        assert_eq!(task.prefix, None);
        assert_eq!(task.list_marker, Some("1. [x] "));
        assert_eq!(task.keyword, "DONE");
        assert_eq!(task.text, "ship it");
        assert_eq!(task.tail, None);
    }

    #[test]
    fn test_array_close_is_split_into_tail() {
        let task = prose().captures("TODO rename the field`];").unwrap();
        assert_eq!(task.text, "rename the field");
        assert_eq!(task.tail, Some("`];"));

        let task = prose().captures(r#"  DONE drop v1" ],"#).unwrap();
        assert_eq!(task.text, "drop v1");
        assert_eq!(task.tail, Some(r#"" ],"#));

        // brackets without a closing quote stay in the text
        let task = prose().captures("TODO read [the docs]").unwrap();
        assert_eq!(task.text, "read [the docs]");
        assert_eq!(task.tail, None);

        let task = pair("javascript").captures("// TODO keep order`],").unwrap();
        assert_eq!(task.prefix, Some("// "));
        assert_eq!(task.text, "keep order");
        assert_eq!(task.tail, Some("`],"));
    }

    #[test]
    fn test_prose_list_markers() {
        let pair = prose();
        for line in [
            "- TODO a",
            "* TODO a",
            "+ TODO a",
            "2) TODO a",
            "b. TODO a",
            "(A1) TODO a",
            "[ ] TODO a",
        ] {
            assert!(pair.is_match(line), "{}", line);
        }
        assert!(!pair.is_match("-TODO a"));
    }

    #[test]
    fn test_longest_keyword_wins() {
        let task = prose().captures("IN-PROGRESS review").unwrap();
        assert_eq!(task.keyword, "IN-PROGRESS");
    }

    #[test]
    fn test_comment_body_pattern() {
        let registry = LanguageRegistry::builtin().unwrap();
        let body =
            LanguageAwareRegexBuilder::build_comment_body_regex(KEYWORDS, registry.get("c").unwrap())
                .unwrap();
        let task = body.captures("   TODO wrap up */").unwrap();
        assert_eq!(task.indent, "   ");
        assert_eq!(task.prefix, None);
        assert_eq!(task.text, "wrap up");
        assert_eq!(task.tail, Some(" */"));
        assert_eq!(body.prefix_role(""), None);
    }

    #[test]
    fn test_capture_runs_over_whole_block() {
        let pair = pair("c");
        let block = "// TODO one\nint x;\n// DONE two\n";
        let keywords: Vec<&str> = pair
            .capture()
            .captures_iter(block)
            .filter_map(|c| c.name("keyword").map(|m| m.as_str()))
            .collect();
        assert_eq!(keywords, vec!["TODO", "DONE"]);
    }
}
