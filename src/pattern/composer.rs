//! Assembles pattern sources from keywords and comment fragments.

use crate::language::CommentFragment;

/// Matches no input; stands in for an empty keyword alternation.
const NEVER: &str = r"\b\B";

/// Optional list marker before a keyword, including its trailing whitespace.
///
/// Bullets (`-`, `*`, `+`), numbers (`1.`, `2)`), letters (`a.`, `B)`),
/// parenthesized labels (`(A1)`), each optionally followed by a checkbox;
/// or a checkbox (`[ ]`, `[x]`) on its own.
pub const LIST_MARKER: &str = r"(?:(?:[-*+]|\d+[.)]|[A-Za-z][.)]|\([A-Za-z0-9]+\))[ \t]+(?:\[[ xX]\][ \t]+)?|\[[ xX]\][ \t]+)";

/// Closing quote of a string literal followed by the `]` closing its array,
/// as on the last line of a multi-line string inside an array literal.
pub const ARRAY_CLOSE: &str = r#"["'`]+[ \t]*\][ \t]*[,;]?"#;

/// Pattern sources for one keyword set and one comment grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPattern {
    /// Existence test, anchored at line start
    pub test: String,
    /// Decomposition pattern with named groups `indent`, `prefix`,
    /// `marker`, `keyword`, `text` and `tail`
    pub capture: String,
}

/// What may precede and follow the keyword on a line.
#[derive(Debug, Clone, Copy, Default)]
pub struct Layout<'a> {
    /// Comment openers, in alternation order; empty means no prefix at all
    pub prefixes: &'a [&'a CommentFragment],
    /// Block comment closer allowed at end of line
    pub closer: Option<&'a CommentFragment>,
}

/// Escaped keyword alternation, longest keyword first so that `DONE` never
/// shadows a longer keyword sharing its prefix.
pub fn keyword_alternation<S: AsRef<str>>(keywords: &[S]) -> String {
    let mut escaped: Vec<&str> = keywords
        .iter()
        .map(AsRef::as_ref)
        .filter(|keyword| !keyword.is_empty())
        .collect();
    if escaped.is_empty() {
        return NEVER.to_string();
    }
    escaped.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    escaped.dedup();
    escaped
        .iter()
        .map(|keyword| regex::escape(keyword))
        .collect::<Vec<_>>()
        .join("|")
}

/// Fragment source without its own leading whitespace matcher.
///
/// The capture pattern's `indent` group already consumes leading
/// whitespace; a fragment starting with `\s*` would steal it.
pub fn strip_leading_whitespace(source: &str) -> &str {
    for lead in [r"\s*", r"[ \t]*", r"\s+", r"[ \t]+"] {
        if let Some(rest) = source.strip_prefix(lead) {
            return rest;
        }
    }
    source
}

fn fragment_alternation<'f>(
    fragments: &[&'f CommentFragment],
    map: impl Fn(&'f str) -> &'f str,
) -> String {
    fragments
        .iter()
        .map(|&fragment| format!("(?:{})", map(fragment.as_str())))
        .collect::<Vec<_>>()
        .join("|")
}

/// Build test and capture sources.
pub fn compose<S: AsRef<str>>(keywords: &[S], layout: Layout<'_>) -> ComposedPattern {
    let keywords = keyword_alternation(keywords);

    let test = if layout.prefixes.is_empty() {
        format!(r"^[ \t]*{}?(?:{})[ \t]+", LIST_MARKER, keywords)
    } else {
        format!(
            r"^[ \t]*(?:{})[ \t]+{}?(?:{})[ \t]+",
            fragment_alternation(layout.prefixes, |s| s),
            LIST_MARKER,
            keywords
        )
    };

    let prefix = if layout.prefixes.is_empty() {
        String::new()
    } else {
        format!(
            r"(?P<prefix>(?:{})[ \t]+)",
            fragment_alternation(layout.prefixes, strip_leading_whitespace)
        )
    };
    let tail = match layout.closer {
        Some(closer) => format!(
            r"(?P<tail>[ \t]*(?:(?:{})|{}))?",
            strip_leading_whitespace(closer.as_str()),
            ARRAY_CLOSE
        ),
        None => format!(r"(?P<tail>[ \t]*{})?", ARRAY_CLOSE),
    };

    let capture = format!(
        r"(?m)^(?P<indent>[ \t]*){}(?P<marker>{})?(?P<keyword>{})[ \t]+(?P<text>.*?){}[ \t]*$",
        prefix, LIST_MARKER, keywords, tail
    );

    ComposedPattern { test, capture }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::FragmentRole;

    #[test]
    fn test_keyword_alternation_orders_longest_first() {
        let alternation = keyword_alternation(&["DONE", "IN-PROGRESS", "TODO", "NOW"]);
        let branches: Vec<&str> = alternation.split('|').collect();
        assert_eq!(branches.len(), 4);
        assert_eq!(branches[0], regex::escape("IN-PROGRESS"));
        assert_eq!(&branches[1..], &["DONE", "TODO", "NOW"]);
    }

    #[test]
    fn test_keyword_alternation_escapes_and_dedups() {
        assert_eq!(keyword_alternation(&["A.B", "A.B"]), r"A\.B");
    }

    #[test]
    fn test_empty_keywords_never_match() {
        let empty: [&str; 0] = [];
        assert_eq!(keyword_alternation(&empty), NEVER);
        let composed = compose(&empty, Layout::default());
        let test = regex::Regex::new(&composed.test).unwrap();
        assert!(!test.is_match("TODO something"));
    }

    #[test]
    fn test_strip_leading_whitespace() {
        assert_eq!(strip_leading_whitespace(r"\s*\*"), r"\*");
        assert_eq!(strip_leading_whitespace(r"[ \t]*#"), "#");
        assert_eq!(strip_leading_whitespace("//"), "//");
    }

    #[test]
    fn test_capture_strips_fragment_whitespace_but_test_keeps_it() {
        let continuation = CommentFragment::new(FragmentRole::BlockContinuation, r"\s*\*").unwrap();
        let composed = compose(
            &["TODO"],
            Layout {
                prefixes: &[&continuation],
                closer: None,
            },
        );
        assert!(composed.test.contains(r"(?:\s*\*)"));
        assert!(composed.capture.contains(r"(?:\*)"));
        assert!(!composed.capture.contains(r"\s*\*"));
    }

    #[test]
    fn test_no_prefix_layout_has_no_prefix_group() {
        let composed = compose(&["TODO"], Layout::default());
        assert!(!composed.capture.contains("?P<prefix>"));
        assert!(composed.capture.contains("?P<tail>"));
    }

    #[test]
    fn test_array_close() {
        let re = regex::Regex::new(&format!("^{}$", ARRAY_CLOSE)).unwrap();
        for closer in ["\"]", "\"],", "'] ;", "`];", "\"\"\"]"] {
            assert!(re.is_match(closer), "{}", closer);
        }
        assert!(!re.is_match("]"));
        assert!(!re.is_match("\""));
    }
}
