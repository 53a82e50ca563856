//! Parser for transition statements.

use std::collections::HashMap;

use tracing::debug;

use super::{TransitionError, TransitionErrorKind};
use crate::keywords::KeywordManager;

const ARROW: &str = "->";

/// One position in a transition chain.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    /// One keyword, or every member of a `(A | B)` group
    Keywords(Vec<String>),
    /// `[FINAL]`: the chain ends in a terminal keyword
    Terminal(String),
}

impl Step {
    fn keywords(&self) -> &[String] {
        match self {
            Step::Keywords(keywords) => keywords,
            Step::Terminal(keyword) => std::slice::from_ref(keyword),
        }
    }
}

/// Edges and problems produced by parsing a list of statements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionParseResult {
    /// Outgoing edge per source keyword
    pub transitions: HashMap<String, String>,
    /// Problems, one or more per offending statement
    pub errors: Vec<TransitionError>,
    /// Statements that parsed but have no effect
    pub warnings: Vec<String>,
}

impl TransitionParseResult {
    /// Returns true if no statement produced an error.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Target of the edge leaving `source`, if any.
    pub fn target(&self, source: &str) -> Option<&str> {
        self.transitions.get(source).map(String::as_str)
    }

    /// Returns true if `keyword` has a self-loop edge.
    pub fn is_terminal(&self, keyword: &str) -> bool {
        self.target(keyword) == Some(keyword)
    }

    /// Errors of one kind.
    pub fn errors_of(&self, kind: TransitionErrorKind) -> impl Iterator<Item = &TransitionError> {
        self.errors.iter().filter(move |err| err.kind == kind)
    }
}

/// Parses transition statements against an effective keyword set.
///
/// # Example
///
/// ```
/// use todoseq::keywords::KeywordManager;
/// use todoseq::transitions::TransitionParser;
///
/// let keywords = KeywordManager::builtin();
/// let result = TransitionParser::new(&keywords).parse(&["TODO -> [DONE]"]);
///
/// assert_eq!(result.target("TODO"), Some("DONE"));
/// assert!(result.is_terminal("DONE"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TransitionParser<'a> {
    keywords: &'a KeywordManager,
}

impl<'a> TransitionParser<'a> {
    /// Create a parser validating against the given keywords.
    pub fn new(keywords: &'a KeywordManager) -> Self {
        Self { keywords }
    }

    /// Parse every statement.
    ///
    /// Blank statements are skipped. A statement with a syntax error, an
    /// unknown keyword or a conflict contributes no edges. An edge conflicts
    /// when it gives a source a different target than an earlier edge; the
    /// earlier edge is kept and each conflicting edge is reported.
    pub fn parse<S: AsRef<str>>(&self, statements: &[S]) -> TransitionParseResult {
        let mut result = TransitionParseResult::default();

        for (index, statement) in statements.iter().enumerate() {
            let line = index + 1;
            let statement = statement.as_ref();
            if statement.trim().is_empty() {
                continue;
            }

            let edges = match self.parse_statement(statement, line) {
                Ok(edges) => edges,
                Err(err) => {
                    result.errors.push(err);
                    continue;
                }
            };

            let mut accepted: Vec<(String, String)> = Vec::new();
            let mut conflicts: Vec<TransitionError> = Vec::new();
            for (source, target) in edges {
                let existing = result.transitions.get(&source).cloned().or_else(|| {
                    accepted
                        .iter()
                        .find(|(s, _)| *s == source)
                        .map(|(_, t)| t.clone())
                });
                match existing {
                    Some(existing) if existing != target => {
                        let message = format!(
                            "'{}' already transitions to '{}'; ignoring '{} -> {}'",
                            source, existing, source, target
                        );
                        conflicts.push(TransitionError::new(
                            line,
                            TransitionErrorKind::Conflict,
                            message,
                        ));
                    }
                    Some(_) => {}
                    None => accepted.push((source, target)),
                }
            }
            if !conflicts.is_empty() {
                result.errors.extend(conflicts);
                continue;
            }

            for (source, target) in accepted {
                if self.keywords.is_archived(&source) {
                    result.warnings.push(format!(
                        "line {}: '{}' is archived and never advances; '{} -> {}' has no effect",
                        line, source, source, target
                    ));
                }
                result.transitions.insert(source, target);
            }
        }

        debug!(
            edges = result.transitions.len(),
            errors = result.errors.len(),
            "Parsed transition statements"
        );

        result
    }

    /// Parse a single statement into its edges.
    ///
    /// `line` is only used to label errors.
    pub fn parse_statement(
        &self,
        statement: &str,
        line: usize,
    ) -> Result<Vec<(String, String)>, TransitionError> {
        if !statement.contains(ARROW) {
            return Err(TransitionError::new(
                line,
                TransitionErrorKind::SyntaxError,
                format!("Missing '{}' in '{}'", ARROW, statement.trim()),
            ));
        }

        let parts: Vec<&str> = statement.split(ARROW).collect();
        let last = parts.len() - 1;
        let steps = parts
            .iter()
            .enumerate()
            .map(|(i, part)| parse_step(part, i == last, line))
            .collect::<Result<Vec<_>, _>>()?;

        let mut unknown: Vec<&str> = Vec::new();
        for keyword in steps.iter().flat_map(Step::keywords) {
            if !self.keywords.is_known_keyword(keyword) && !unknown.contains(&keyword.as_str()) {
                unknown.push(keyword);
            }
        }
        if !unknown.is_empty() {
            return Err(TransitionError::new(
                line,
                TransitionErrorKind::InvalidKeyword,
                format!("Unknown keyword(s): {}", unknown.join(", ")),
            ));
        }

        let mut edges = Vec::new();
        for pair in steps.windows(2) {
            for source in pair[0].keywords() {
                for target in pair[1].keywords() {
                    edges.push((source.clone(), target.clone()));
                }
            }
        }
        if let Some(Step::Terminal(terminal)) = steps.last() {
            edges.push((terminal.clone(), terminal.clone()));
        }

        Ok(edges)
    }
}

fn syntax_error(line: usize, message: impl Into<String>) -> TransitionError {
    TransitionError::new(line, TransitionErrorKind::SyntaxError, message)
}

/// A bare keyword: non-empty, no whitespace, no grammar characters.
fn bare_keyword(raw: &str, line: usize) -> Result<String, TransitionError> {
    let keyword = raw.trim();
    if keyword.is_empty() {
        return Err(syntax_error(line, "Empty keyword"));
    }
    if keyword
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '(' | ')' | '[' | ']' | '|'))
    {
        return Err(syntax_error(
            line,
            format!("Expected a single keyword, found '{}'", keyword),
        ));
    }
    Ok(keyword.to_uppercase())
}

fn parse_step(raw: &str, is_last: bool, line: usize) -> Result<Step, TransitionError> {
    let part = raw.trim();
    if part.is_empty() {
        return Err(syntax_error(line, "Empty step in transition chain"));
    }

    if let Some(rest) = part.strip_prefix('(') {
        let inner = rest
            .strip_suffix(')')
            .ok_or_else(|| syntax_error(line, format!("Unclosed group '{}'", part)))?;
        let keywords = inner
            .split('|')
            .map(|member| bare_keyword(member, line))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Step::Keywords(keywords));
    }

    if let Some(rest) = part.strip_prefix('[') {
        let inner = rest
            .strip_suffix(']')
            .ok_or_else(|| syntax_error(line, format!("Unclosed terminal '{}'", part)))?;
        if !is_last {
            return Err(syntax_error(
                line,
                format!("Terminal state '{}' must be the last step", part),
            ));
        }
        return Ok(Step::Terminal(bare_keyword(inner, line)?));
    }

    Ok(Step::Keywords(vec![bare_keyword(part, line)?]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::KeywordSettings;

    fn parse(statements: &[&str]) -> TransitionParseResult {
        TransitionParser::new(&KeywordManager::builtin()).parse(statements)
    }

    fn edges(result: &TransitionParseResult) -> Vec<(String, String)> {
        let mut edges: Vec<_> = result
            .transitions
            .iter()
            .map(|(s, t)| (s.clone(), t.clone()))
            .collect();
        edges.sort();
        edges
    }

    fn edge(source: &str, target: &str) -> (String, String) {
        (source.to_string(), target.to_string())
    }

    // ========================================================================
    // Grammar
    // ========================================================================

    #[test]
    fn test_chain() {
        let result = parse(&["TODO -> DOING -> DONE"]);
        assert!(result.is_valid());
        assert_eq!(edges(&result), vec![edge("DOING", "DONE"), edge("TODO", "DOING")]);
    }

    #[test]
    fn test_group_alternation_source() {
        let result = parse(&["(WAIT | WAITING) -> IN-PROGRESS"]);
        assert_eq!(
            edges(&result),
            vec![edge("WAIT", "IN-PROGRESS"), edge("WAITING", "IN-PROGRESS")]
        );
    }

    #[test]
    fn test_group_alternation_in_middle_of_chain() {
        let result = parse(&["TODO -> (NOW|DOING) -> DONE"]);
        // TODO fans out to two targets, so the statement conflicts with itself
        assert!(result.transitions.is_empty());
        assert_eq!(result.errors_of(TransitionErrorKind::Conflict).count(), 1);

        let result = parse(&["(NOW|DOING) -> DONE"]);
        assert_eq!(edges(&result), vec![edge("DOING", "DONE"), edge("NOW", "DONE")]);
    }

    #[test]
    fn test_terminal_shorthand() {
        let result = parse(&["TODO -> [DONE]"]);
        assert_eq!(edges(&result), vec![edge("DONE", "DONE"), edge("TODO", "DONE")]);
        assert!(result.is_terminal("DONE"));
        assert!(!result.is_terminal("TODO"));
    }

    #[test]
    fn test_self_terminal() {
        let result = parse(&["CANCELED -> [CANCELED]"]);
        assert!(result.is_valid());
        assert_eq!(edges(&result), vec![edge("CANCELED", "CANCELED")]);
    }

    #[test]
    fn test_whitespace_and_case_are_insignificant() {
        let result = parse(&["  todo->doing   ->  [ done ]  "]);
        assert!(result.is_valid());
        assert_eq!(result.target("TODO"), Some("DOING"));
        assert_eq!(result.target("DOING"), Some("DONE"));
        assert!(result.is_terminal("DONE"));
    }

    // ========================================================================
    // Errors
    // ========================================================================

    #[test]
    fn test_blank_statements_are_skipped() {
        let result = parse(&["", "   ", "TODO -> DONE"]);
        assert!(result.is_valid());
        assert_eq!(result.transitions.len(), 1);
    }

    #[test]
    fn test_missing_arrow_is_syntax_error() {
        let result = parse(&["TODO DONE"]);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, TransitionErrorKind::SyntaxError);
        assert_eq!(result.errors[0].line, 1);
    }

    #[test]
    fn test_malformed_steps_are_syntax_errors() {
        for statement in [
            "TODO ->",
            "-> DONE",
            "(TODO | LATER -> DONE",
            "TODO -> [DONE] -> LATER",
            "TODO -> (DOING | ) ",
            "TODO LATER -> DONE",
        ] {
            let result = parse(&[statement]);
            assert_eq!(result.errors.len(), 1, "{}", statement);
            assert_eq!(result.errors[0].kind, TransitionErrorKind::SyntaxError, "{}", statement);
            assert!(result.transitions.is_empty(), "{}", statement);
        }
    }

    #[test]
    fn test_unknown_keyword_discards_whole_statement() {
        let result = parse(&["TODO -> REVIEW -> DONE", "LATER -> NOW"]);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, TransitionErrorKind::InvalidKeyword);
        assert!(result.errors[0].message.contains("REVIEW"));
        assert_eq!(result.target("TODO"), None);
        assert_eq!(result.target("LATER"), Some("NOW"));
    }

    #[test]
    fn test_custom_keywords_are_accepted() {
        let keywords = KeywordManager::new(&KeywordSettings {
            active: vec!["REVIEW".to_string()],
            ..Default::default()
        });
        let result = TransitionParser::new(&keywords).parse(&["TODO -> REVIEW -> DONE"]);
        assert!(result.is_valid());
        assert_eq!(result.target("REVIEW"), Some("DONE"));
    }

    #[test]
    fn test_conflict_keeps_first_edge() {
        let result = parse(&["TODO -> DOING -> DONE", "TODO -> NOW"]);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, TransitionErrorKind::Conflict);
        assert_eq!(result.errors[0].line, 2);
        assert_eq!(result.target("TODO"), Some("DOING"));
    }

    #[test]
    fn test_conflicting_statement_contributes_no_edges() {
        let result = parse(&["TODO -> DOING", "TODO -> NOW -> [CANCELED]", "LATER -> NOW"]);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, TransitionErrorKind::Conflict);
        assert_eq!(result.errors[0].line, 2);
        assert_eq!(result.target("TODO"), Some("DOING"));
        assert_eq!(result.target("NOW"), None);
        assert_eq!(result.target("CANCELED"), None);
        assert_eq!(result.target("LATER"), Some("NOW"));
    }

    #[test]
    fn test_repeated_identical_edge_is_not_a_conflict() {
        let result = parse(&["TODO -> DOING", "TODO -> DOING -> DONE"]);
        assert!(result.is_valid());
        assert_eq!(result.target("DOING"), Some("DONE"));
    }

    #[test]
    fn test_archived_source_warns() {
        let result = parse(&["ARCHIVED -> TODO"]);
        assert!(result.is_valid());
        assert_eq!(result.warnings.len(), 1);
    }
}
