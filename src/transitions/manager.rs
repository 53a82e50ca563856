//! Next-state computation.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use super::{
    TransitionError, TransitionParseResult, TransitionParser, TransitionSettings, DEFAULT_ACTIVE,
    DEFAULT_COMPLETED, DEFAULT_INACTIVE, DEFAULT_TRANSITIONS,
};
use crate::keywords::{KeywordGroup, KeywordManager};

/// Computes the next state of a task keyword.
///
/// Explicit transition edges win. A keyword without an edge falls back on
/// its group's default: inactive and waiting keywords start work, active
/// keywords finish it, completed keywords reopen. Archived and unknown
/// keywords never move.
///
/// The manager is immutable; rebuild it when keyword or transition settings
/// change.
#[derive(Debug, Clone)]
pub struct TaskStateTransitionManager {
    keywords: Arc<KeywordManager>,
    parsed: TransitionParseResult,
    default_inactive: String,
    default_active: String,
    default_completed: String,
    warnings: Vec<String>,
}

impl TaskStateTransitionManager {
    /// Build the manager from settings.
    ///
    /// Empty `statements` select [`DEFAULT_TRANSITIONS`]. Statement errors are
    /// collected, never raised: the manager always works with whatever edges
    /// were valid.
    pub fn new(keywords: Arc<KeywordManager>, settings: &TransitionSettings) -> Self {
        let parsed = if settings.statements.is_empty() {
            TransitionParser::new(&keywords).parse(DEFAULT_TRANSITIONS)
        } else {
            TransitionParser::new(&keywords).parse(&settings.statements)
        };

        for err in &parsed.errors {
            warn!("Transition configuration error: {}", err);
        }

        let mut warnings = parsed.warnings.clone();
        let default_inactive = resolve_default(
            &keywords,
            settings.default_inactive.as_deref(),
            DEFAULT_INACTIVE,
            KeywordGroup::Inactive,
            &mut warnings,
        );
        let default_active = resolve_default(
            &keywords,
            settings.default_active.as_deref(),
            DEFAULT_ACTIVE,
            KeywordGroup::Active,
            &mut warnings,
        );
        let default_completed = resolve_default(
            &keywords,
            settings.default_completed.as_deref(),
            DEFAULT_COMPLETED,
            KeywordGroup::Completed,
            &mut warnings,
        );

        debug!(
            edges = parsed.transitions.len(),
            %default_inactive,
            %default_active,
            %default_completed,
            "Built transition manager"
        );

        Self {
            keywords,
            parsed,
            default_inactive,
            default_active,
            default_completed,
            warnings,
        }
    }

    /// Manager over the built-in keywords and default statements.
    pub fn builtin() -> Self {
        Self::new(
            Arc::new(KeywordManager::builtin()),
            &TransitionSettings::default(),
        )
    }

    /// Next state of `current`.
    ///
    /// Returns `current` itself for archived keywords, unknown keywords, and
    /// terminal keywords.
    ///
    /// ```
    /// use todoseq::transitions::TaskStateTransitionManager;
    ///
    /// let transitions = TaskStateTransitionManager::builtin();
    /// assert_eq!(transitions.next_state("TODO"), "DOING");
    /// assert_eq!(transitions.next_state("DONE"), "TODO");
    /// assert_eq!(transitions.next_state("ARCHIVED"), "ARCHIVED");
    /// ```
    pub fn next_state<'a>(&'a self, current: &'a str) -> &'a str {
        self.advance(current, false)
    }

    /// Next state when cycling through states by repeated toggling.
    ///
    /// Differs from [`next_state`](Self::next_state) in two places: an empty
    /// state starts at the default inactive keyword, and a completed keyword
    /// without an explicit edge clears the state (returns `""`).
    pub fn cycle_state<'a>(&'a self, current: &'a str) -> &'a str {
        if current.is_empty() {
            return &self.default_inactive;
        }
        self.advance(current, true)
    }

    fn advance<'a>(&'a self, current: &'a str, cycling: bool) -> &'a str {
        let Some(group) = self.keywords.group_of(current) else {
            return current;
        };
        if group == KeywordGroup::Archived {
            return current;
        }

        if let Some(target) = self.parsed.target(current) {
            return target;
        }

        match group {
            KeywordGroup::Inactive | KeywordGroup::Waiting => &self.default_active,
            KeywordGroup::Active => &self.default_completed,
            KeywordGroup::Completed if cycling => "",
            KeywordGroup::Completed => &self.default_inactive,
            KeywordGroup::Archived => current,
        }
    }

    /// Returns true if `keyword` transitions to itself.
    pub fn is_terminal_state(&self, keyword: &str) -> bool {
        self.parsed.is_terminal(keyword)
    }

    /// Returns true if a single step takes `from` to `to`.
    pub fn can_transition(&self, from: &str, to: &str) -> bool {
        if self.is_archived_state(from) || !self.keywords.is_known_keyword(from) {
            return false;
        }
        self.next_state(from) == to
    }

    /// Returns true if `keyword` is archived and so never advances.
    pub fn is_archived_state(&self, keyword: &str) -> bool {
        self.keywords.is_archived(keyword)
    }

    /// Explicit edges, by source keyword.
    pub fn transitions(&self) -> &HashMap<String, String> {
        &self.parsed.transitions
    }

    /// Errors from the transition statements, in statement order.
    pub fn validation_errors(&self) -> &[TransitionError] {
        &self.parsed.errors
    }

    /// Returns true if any statement was rejected.
    pub fn has_validation_errors(&self) -> bool {
        !self.parsed.errors.is_empty()
    }

    /// Non-fatal problems: no-op statements and replaced defaults.
    pub fn validation_warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Keyword an empty or reopened task gets.
    pub fn default_inactive(&self) -> &str {
        &self.default_inactive
    }

    /// Keyword an inactive or waiting task moves to without an explicit edge.
    pub fn default_active(&self) -> &str {
        &self.default_active
    }

    /// Keyword an active task moves to without an explicit edge.
    pub fn default_completed(&self) -> &str {
        &self.default_completed
    }

    /// The keywords the transitions were validated against.
    pub fn keyword_manager(&self) -> &Arc<KeywordManager> {
        &self.keywords
    }
}

impl Default for TaskStateTransitionManager {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Pick the configured default when it is an effective keyword of `group`;
/// otherwise the built-in, otherwise the first keyword of the group.
fn resolve_default(
    keywords: &KeywordManager,
    configured: Option<&str>,
    builtin: &str,
    group: KeywordGroup,
    warnings: &mut Vec<String>,
) -> String {
    let fallback = if keywords.is_in_group(builtin, group) {
        builtin.to_string()
    } else {
        keywords
            .keywords(group)
            .first()
            .cloned()
            .unwrap_or_else(|| builtin.to_string())
    };

    match configured.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => {
            let normalized = raw.to_uppercase();
            let problem = match keywords.group_of(&normalized) {
                Some(found) if found == group => return normalized,
                Some(found) => format!("belongs to the {} group", found),
                None => "is not a known keyword".to_string(),
            };
            let message = format!(
                "Default {} keyword '{}' {}; using '{}'",
                group, normalized, problem, fallback
            );
            warn!("{}", message);
            warnings.push(message);
            fallback
        }
        None => fallback,
    }
}
