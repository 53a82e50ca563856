//! Line, document and source code scanning.

use std::sync::Arc;

use regex::Regex;
use tracing::{debug, trace};

use super::{date_line_regex, DateKind, Priority, Task, TaskDate};
use crate::config::ParserSettings;
use crate::error::{Result, TodoseqError};
use crate::keywords::KeywordManager;
use crate::language::{FragmentRole, LanguageDefinition, LanguageRegistry};
use crate::multiline::MultilineCommentState;
use crate::pattern::{PatternCache, RegexPair, TaskMatch};

/// Date lines looked at after each task.
const MAX_DATE_LINES: usize = 2;

/// An open fenced code block.
#[derive(Debug, Clone)]
struct Fence {
    marker: char,
    width: usize,
    /// Language name, canonical when registered
    info: Option<String>,
}

/// Opening fence: three or more backticks or tildes, then an info string.
fn open_fence(line: &str) -> Option<(char, usize, &str)> {
    let trimmed = line.trim_start();
    let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let width = trimmed.chars().take_while(|c| *c == marker).count();
    if width < 3 {
        return None;
    }
    let info = trimmed[width..].trim();
    if marker == '`' && info.contains('`') {
        return None;
    }
    Some((marker, width, info))
}

/// Language name from a fence info string: `rust,ignore` and
/// `python {.class}` both name their first word.
fn info_language(info: &str) -> Option<&str> {
    info.split(|c: char| c.is_whitespace() || c == ',' || c == '{')
        .next()
        .filter(|word| !word.is_empty())
}

fn closes_fence(line: &str, fence: &Fence) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= fence.width && trimmed.chars().all(|c| c == fence.marker)
}

fn leading_width(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}

/// Finds tasks in text.
///
/// Holds the resolved keywords, the language registry, and compiled patterns
/// for the keyword set. Patterns are compiled lazily, once per language.
///
/// # Example
///
/// ```
/// use todoseq::task::TaskParser;
///
/// let parser = TaskParser::builtin().unwrap();
/// let tasks = parser.parse_code("fn main() {}\n// TODO handle args\n", "rust").unwrap();
///
/// assert_eq!(tasks.len(), 1);
/// assert_eq!(tasks[0].line, 1);
/// assert_eq!(tasks[0].comment_prefix.as_deref(), Some("// "));
/// ```
#[derive(Debug)]
pub struct TaskParser {
    keywords: Arc<KeywordManager>,
    languages: Arc<LanguageRegistry>,
    patterns: PatternCache,
    settings: ParserSettings,
    dates: Regex,
}

impl TaskParser {
    pub fn new(
        keywords: Arc<KeywordManager>,
        languages: Arc<LanguageRegistry>,
        settings: ParserSettings,
    ) -> Result<Self> {
        let patterns = PatternCache::new(keywords.all_keywords().to_vec());
        let dates =
            date_line_regex().map_err(|e| TodoseqError::pattern("date line pattern", e))?;
        Ok(Self {
            keywords,
            languages,
            patterns,
            settings,
            dates,
        })
    }

    /// Parser over built-in keywords and languages with default settings.
    pub fn builtin() -> Result<Self> {
        Self::new(
            Arc::new(KeywordManager::builtin()),
            Arc::new(LanguageRegistry::builtin()?),
            ParserSettings::default(),
        )
    }

    pub fn keywords(&self) -> &Arc<KeywordManager> {
        &self.keywords
    }

    pub fn languages(&self) -> &Arc<LanguageRegistry> {
        &self.languages
    }

    pub fn settings(&self) -> ParserSettings {
        self.settings
    }

    /// Parse a single prose line. The task's line number is 0.
    pub fn parse_line(&self, line: &str) -> Result<Option<Task>> {
        let prose = self.patterns.pair(None)?;
        Ok(prose
            .captures(line)
            .and_then(|found| self.build_task(0, line, found, None, None)))
    }

    /// Parse a Markdown-like document.
    ///
    /// Lines outside fenced code blocks are prose. Code blocks are skipped
    /// unless `include_code_blocks` is set; then a block in a registered
    /// language only yields tasks from its comments (with
    /// `language_comment_support`), any other block is read as prose.
    pub fn parse_document(&self, text: &str) -> Result<Vec<Task>> {
        let lines: Vec<&str> = text.lines().collect();
        let prose = self.patterns.pair(None)?;
        let mut tasks = Vec::new();
        let mut fence: Option<Fence> = None;
        let mut scanner: Option<CodeScanner<'_>> = None;

        for (index, line) in lines.iter().enumerate() {
            if let Some(open) = &fence {
                if closes_fence(line, open) {
                    trace!(line = index, info = ?open.info, "Leaving code block");
                    fence = None;
                    scanner = None;
                    continue;
                }
                if !self.settings.include_code_blocks {
                    continue;
                }
                let found = match scanner.as_mut() {
                    Some(scanner) => scanner.scan(self, index, line),
                    None => prose.captures(line).and_then(|found| {
                        self.build_task(index, line, found, open.info.clone(), None)
                    }),
                };
                tasks.extend(found);
                continue;
            }

            if let Some((marker, width, info)) = open_fence(line) {
                let name = info_language(info);
                let language = name.and_then(|name| self.languages.get(name));
                trace!(line = index, info, "Entering code block");
                if self.settings.include_code_blocks && self.settings.language_comment_support {
                    scanner = language
                        .map(|language| CodeScanner::new(&self.patterns, language))
                        .transpose()?;
                }
                fence = Some(Fence {
                    marker,
                    width,
                    info: language
                        .map(|l| l.name().to_string())
                        .or_else(|| name.map(str::to_lowercase)),
                });
                continue;
            }

            if let Some(mut task) = prose
                .captures(line)
                .and_then(|found| self.build_task(index, line, found, None, None))
            {
                self.attach_dates(&mut task, &lines[index + 1..]);
                tasks.push(task);
            }
        }

        debug!(tasks = tasks.len(), lines = lines.len(), "Parsed document");
        Ok(tasks)
    }

    /// Parse source code in one language.
    ///
    /// Fails with [`TodoseqError::UnknownLanguage`] if `language` is not
    /// registered.
    pub fn parse_code(&self, text: &str, language: &str) -> Result<Vec<Task>> {
        let definition = self.languages.resolve(language)?;
        let lines: Vec<&str> = text.lines().collect();
        let mut scanner = CodeScanner::new(&self.patterns, definition)?;

        let mut tasks = Vec::new();
        for (index, line) in lines.iter().enumerate() {
            if let Some(mut task) = scanner.scan(self, index, line) {
                self.attach_dates(&mut task, &lines[index + 1..]);
                tasks.push(task);
            }
        }

        debug!(
            tasks = tasks.len(),
            language = definition.name(),
            "Parsed source code"
        );
        Ok(tasks)
    }

    fn build_task(
        &self,
        index: usize,
        line: &str,
        found: TaskMatch<'_>,
        language: Option<String>,
        block_comment_indent: Option<String>,
    ) -> Option<Task> {
        let group = self.keywords.group_of(found.keyword)?;
        let (priority, text) = Priority::strip(found.text);
        Some(Task {
            line: index,
            raw_text: line.to_string(),
            indent: found.indent.to_string(),
            comment_prefix: found.prefix.map(str::to_string),
            list_marker: found.list_marker.map(str::to_string),
            state: found.keyword.to_string(),
            group,
            text: text.to_string(),
            tail: found.tail.map(str::to_string),
            completed: self.keywords.is_completed(found.keyword),
            priority,
            language,
            block_comment_indent,
            scheduled: None,
            deadline: None,
            keyword_span: found.keyword_start..found.keyword_start + found.keyword.len(),
        })
    }

    /// Attach dates from the lines right after a task.
    ///
    /// Only the first lines that are date lines count, and each must be
    /// indented at least as deep as the task.
    fn attach_dates(&self, task: &mut Task, following: &[&str]) {
        let task_width = leading_width(&task.raw_text);
        for line in following.iter().take(MAX_DATE_LINES) {
            let Some(caps) = self.dates.captures(line) else {
                break;
            };
            let Some(whole) = caps.get(0) else {
                break;
            };
            let lead = &line[..whole.start()];
            if leading_width(line) < task_width || lead.chars().any(char::is_alphanumeric) {
                break;
            }
            let kind = if &caps[1] == "SCHEDULED" {
                DateKind::Scheduled
            } else {
                DateKind::Deadline
            };
            match caps[2].parse::<TaskDate>() {
                Ok(date) => task.set_date(kind, date),
                Err(err) => debug!(line = %line, error = %err, "Ignoring malformed date"),
            }
        }
    }
}

/// Scan state for one run of source code in one language.
struct CodeScanner<'a> {
    language: &'a LanguageDefinition,
    pair: Arc<RegexPair>,
    body: Option<Arc<RegexPair>>,
    comments: MultilineCommentState<'a>,
}

impl<'a> CodeScanner<'a> {
    fn new(patterns: &PatternCache, language: &'a LanguageDefinition) -> Result<Self> {
        let pair = patterns.pair(Some(language))?;
        let body = if language.has_block_comments() {
            Some(patterns.comment_body_pair(language)?)
        } else {
            None
        };
        Ok(Self {
            language,
            pair,
            body,
            comments: MultilineCommentState::new(Some(language)),
        })
    }

    /// Feed one line; returns the task on it, if any.
    ///
    /// Continuation lines (` * TODO`) count only inside a block comment, and
    /// inside one a bare `TODO` line counts too.
    fn scan(&mut self, parser: &TaskParser, index: usize, line: &str) -> Option<Task> {
        let before = self.comments.state().clone();
        let after = self.comments.handle_line(line).clone();
        let block_indent = before
            .indent()
            .or_else(|| after.indent())
            .map(str::to_string);

        let found = if before.is_inside() {
            self.pair
                .captures(line)
                .or_else(|| self.body.as_ref().and_then(|body| body.captures(line)))
        } else {
            self.pair.captures(line).filter(|found| {
                found.prefix.and_then(|prefix| self.pair.prefix_role(prefix))
                    != Some(FragmentRole::BlockContinuation)
            })
        }?;

        parser.build_task(
            index,
            line,
            found,
            Some(self.language.name().to_string()),
            block_indent,
        )
    }
}
