//! Validation of keyword settings.
//!
//! Every check runs over the full token list on its own. A keyword that
//! fails a check is recorded in [`KeywordValidationResult::invalid_keywords`]
//! and left out of every group, while all other keywords keep resolving.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use super::{KeywordChange, KeywordGroup, KeywordToken};

/// Characters a keyword may not contain; they are reserved by the transition
/// grammar or would never match on a task line.
const RESERVED_CHARS: &[char] = &['(', ')', '[', ']', '|', '>', ','];

// ============================================================================
// Issues
// ============================================================================

/// What a validation issue is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordIssueKind {
    /// Keyword contains whitespace or reserved characters (error)
    InvalidFormat,
    /// Custom keyword declared twice in the same group (error)
    DuplicateInGroup,
    /// Custom keyword declared in two or more groups (error)
    DuplicateAcrossGroups,
    /// Removal of a keyword that is not a built-in of that group (error)
    InvalidRemoval,
    /// Built-in keyword both added and removed (error)
    AddRemoveConflict,
    /// Built-in keyword added to two or more groups (error)
    BuiltinInMultipleGroups,
    /// Built-in keyword removed from its group (warning)
    BuiltinRemoved,
    /// Built-in keyword re-declared in its own group to change its order (warning)
    SortOrderOverride,
    /// Built-in keyword moved to a different group (warning)
    GroupOverride,
}

impl KeywordIssueKind {
    /// Returns true if issues of this kind invalidate configuration.
    pub fn is_error(&self) -> bool {
        !matches!(
            self,
            Self::BuiltinRemoved | Self::SortOrderOverride | Self::GroupOverride
        )
    }
}

/// A single validation finding, attached to the group whose settings caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordIssue {
    /// Kind of issue
    pub kind: KeywordIssueKind,
    /// Normalized keyword the issue refers to
    pub keyword: String,
    /// Group whose settings list produced the issue
    pub group: KeywordGroup,
    /// Human-readable description
    pub message: String,
}

impl KeywordIssue {
    fn new(
        kind: KeywordIssueKind,
        keyword: &str,
        group: KeywordGroup,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            keyword: keyword.to_string(),
            group,
            message: message.into(),
        }
    }
}

impl fmt::Display for KeywordIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.group, self.message)
    }
}

/// Outcome of validating keyword settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordValidationResult {
    /// Problems that excluded (or dropped) a keyword
    pub errors: Vec<KeywordIssue>,
    /// Informational findings; the keyword stays effective
    pub warnings: Vec<KeywordIssue>,
    /// Keywords excluded from every group
    pub invalid_keywords: BTreeSet<String>,
}

impl KeywordValidationResult {
    /// Returns true if there are no errors. Warnings do not affect validity.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns true if the keyword was excluded by validation.
    #[must_use]
    pub fn is_invalid(&self, keyword: &str) -> bool {
        self.invalid_keywords.contains(keyword)
    }

    /// Errors reported against one group.
    pub fn errors_for(&self, group: KeywordGroup) -> impl Iterator<Item = &KeywordIssue> {
        self.errors.iter().filter(move |issue| issue.group == group)
    }

    /// Warnings reported against one group.
    pub fn warnings_for(&self, group: KeywordGroup) -> impl Iterator<Item = &KeywordIssue> {
        self.warnings.iter().filter(move |issue| issue.group == group)
    }

    fn error(&mut self, issue: KeywordIssue) {
        self.errors.push(issue);
    }

    fn warning(&mut self, issue: KeywordIssue) {
        self.warnings.push(issue);
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Token lists that survived validation, ready for resolution.
#[derive(Debug, Default)]
pub(crate) struct ValidatedChanges {
    /// Additions in declaration order, one per (keyword, group)
    pub additions: Vec<(String, KeywordGroup)>,
    /// Removals of built-ins from their own group
    pub removals: Vec<(String, KeywordGroup)>,
}

/// Returns true if the keyword can appear on a task line and in transitions.
pub(crate) fn is_valid_format(keyword: &str) -> bool {
    !keyword.is_empty()
        && !keyword.starts_with('-')
        && !keyword
            .chars()
            .any(|c| c.is_whitespace() || RESERVED_CHARS.contains(&c))
}

fn join_groups(groups: &[KeywordGroup]) -> String {
    groups
        .iter()
        .map(KeywordGroup::label)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Run every keyword check over the parsed tokens.
pub(crate) fn validate(tokens: &[KeywordToken]) -> (KeywordValidationResult, ValidatedChanges) {
    let mut result = KeywordValidationResult::default();

    // Format
    for token in tokens {
        let keyword = token.keyword();
        if !is_valid_format(keyword) {
            result.error(KeywordIssue::new(
                KeywordIssueKind::InvalidFormat,
                keyword,
                token.group,
                format!(
                    "Keyword '{}' contains whitespace or reserved characters",
                    keyword
                ),
            ));
            result.invalid_keywords.insert(keyword.to_string());
        }
    }

    // Duplicate additions within one group; later occurrences are ignored
    let mut seen_adds: HashSet<(&str, KeywordGroup)> = HashSet::new();
    let mut additions: Vec<(&str, KeywordGroup)> = Vec::new();
    for token in tokens {
        let KeywordChange::Add(keyword) = &token.change else {
            continue;
        };
        if !seen_adds.insert((keyword.as_str(), token.group)) {
            if !KeywordGroup::is_builtin(keyword) {
                result.error(KeywordIssue::new(
                    KeywordIssueKind::DuplicateInGroup,
                    keyword,
                    token.group,
                    format!(
                        "Keyword '{}' is declared more than once in the {} group",
                        keyword, token.group
                    ),
                ));
            }
            continue;
        }
        additions.push((keyword.as_str(), token.group));
    }

    // Distinct groups each keyword is added to, in first-seen order
    let mut add_groups: HashMap<&str, Vec<KeywordGroup>> = HashMap::new();
    let mut add_order: Vec<&str> = Vec::new();
    for &(keyword, group) in &additions {
        let groups = add_groups.entry(keyword).or_insert_with(|| {
            add_order.push(keyword);
            Vec::new()
        });
        groups.push(group);
    }

    for keyword in &add_order {
        let groups = &add_groups[keyword];
        if groups.len() < 2 {
            continue;
        }
        let (kind, message) = if KeywordGroup::is_builtin(keyword) {
            (
                KeywordIssueKind::BuiltinInMultipleGroups,
                format!(
                    "Built-in keyword '{}' is added to multiple groups ({})",
                    keyword,
                    join_groups(groups)
                ),
            )
        } else {
            (
                KeywordIssueKind::DuplicateAcrossGroups,
                format!(
                    "Keyword '{}' is declared in multiple groups ({})",
                    keyword,
                    join_groups(groups)
                ),
            )
        };
        for group in groups {
            result.error(KeywordIssue::new(kind, keyword, *group, message.clone()));
        }
        result.invalid_keywords.insert((*keyword).to_string());
    }

    // Removals must name a built-in of the same group
    let mut seen_removals: HashSet<(&str, KeywordGroup)> = HashSet::new();
    let mut removals: Vec<(&str, KeywordGroup)> = Vec::new();
    let mut remove_groups: HashMap<&str, Vec<KeywordGroup>> = HashMap::new();
    let mut remove_order: Vec<&str> = Vec::new();
    for token in tokens {
        let KeywordChange::Remove(keyword) = &token.change else {
            continue;
        };
        if !seen_removals.insert((keyword.as_str(), token.group)) {
            continue;
        }
        remove_groups
            .entry(keyword.as_str())
            .or_insert_with(|| {
                remove_order.push(keyword.as_str());
                Vec::new()
            })
            .push(token.group);
        if KeywordGroup::of_builtin(keyword) != Some(token.group) {
            result.error(KeywordIssue::new(
                KeywordIssueKind::InvalidRemoval,
                keyword,
                token.group,
                format!(
                    "Cannot remove '{}' from the {} group: it is not a built-in {} keyword",
                    keyword, token.group, token.group
                ),
            ));
            continue;
        }
        removals.push((keyword.as_str(), token.group));
    }

    // Built-ins both added and removed, whether or not the removal was valid
    for keyword in &remove_order {
        if !KeywordGroup::is_builtin(keyword) {
            continue;
        }
        let Some(added_to) = add_groups.get(keyword) else {
            continue;
        };
        let mut touched: Vec<KeywordGroup> = added_to.clone();
        for group in &remove_groups[keyword] {
            if !touched.contains(group) {
                touched.push(*group);
            }
        }
        let message = format!(
            "Built-in keyword '{}' is both added and removed ({})",
            keyword,
            join_groups(&touched)
        );
        for group in &touched {
            result.error(KeywordIssue::new(
                KeywordIssueKind::AddRemoveConflict,
                keyword,
                *group,
                message.clone(),
            ));
        }
        result.invalid_keywords.insert((*keyword).to_string());
    }

    // Warnings for the surviving built-in overrides
    for (keyword, group) in &removals {
        if result.is_invalid(keyword) {
            continue;
        }
        result.warning(KeywordIssue::new(
            KeywordIssueKind::BuiltinRemoved,
            keyword,
            *group,
            format!("Built-in keyword '{}' removed from the {} group", keyword, group),
        ));
    }
    for (keyword, group) in &additions {
        if result.is_invalid(keyword) {
            continue;
        }
        let Some(home) = KeywordGroup::of_builtin(keyword) else {
            continue;
        };
        let issue = if home == *group {
            KeywordIssue::new(
                KeywordIssueKind::SortOrderOverride,
                keyword,
                *group,
                format!(
                    "Built-in keyword '{}' re-declared in its default {} group (sort order override)",
                    keyword, group
                ),
            )
        } else {
            KeywordIssue::new(
                KeywordIssueKind::GroupOverride,
                keyword,
                *group,
                format!(
                    "Built-in keyword '{}' moved from the {} group to the {} group",
                    keyword, home, group
                ),
            )
        };
        result.warning(issue);
    }

    let changes = ValidatedChanges {
        additions: additions
            .into_iter()
            .filter(|(keyword, _)| !result.is_invalid(keyword))
            .map(|(keyword, group)| (keyword.to_string(), group))
            .collect(),
        removals: removals
            .into_iter()
            .filter(|(keyword, _)| !result.is_invalid(keyword))
            .map(|(keyword, group)| (keyword.to_string(), group))
            .collect(),
    };

    (result, changes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(entries: &[(&str, KeywordGroup)]) -> Vec<KeywordToken> {
        entries
            .iter()
            .filter_map(|(raw, group)| KeywordToken::parse(raw, *group))
            .collect()
    }

    fn kinds(issues: &[KeywordIssue]) -> Vec<KeywordIssueKind> {
        issues.iter().map(|issue| issue.kind).collect()
    }

    // ========================================================================
    // Format
    // ========================================================================

    #[test]
    fn test_format_rules() {
        assert!(is_valid_format("IN-PROGRESS"));
        assert!(is_valid_format("FIXME"));
        assert!(!is_valid_format("TWO WORDS"));
        assert!(!is_valid_format("A|B"));
        assert!(!is_valid_format("-X"));
        assert!(!is_valid_format(""));
    }

    #[test]
    fn test_invalid_format_is_excluded() {
        let (result, changes) = validate(&tokens(&[
            ("ok", KeywordGroup::Active),
            ("(bad)", KeywordGroup::Active),
        ]));
        assert_eq!(kinds(&result.errors), vec![KeywordIssueKind::InvalidFormat]);
        assert!(result.is_invalid("(BAD)"));
        assert_eq!(changes.additions, vec![("OK".to_string(), KeywordGroup::Active)]);
    }

    // ========================================================================
    // Duplicates
    // ========================================================================

    #[test]
    fn test_duplicate_custom_in_group_keeps_first() {
        let (result, changes) = validate(&tokens(&[
            ("REVIEW", KeywordGroup::Active),
            ("review", KeywordGroup::Active),
            ("REVIEW", KeywordGroup::Active),
        ]));
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors.iter().all(|e| e.kind == KeywordIssueKind::DuplicateInGroup));
        assert!(!result.is_invalid("REVIEW"));
        assert_eq!(changes.additions.len(), 1);
    }

    #[test]
    fn test_duplicate_builtin_in_own_group_is_silent() {
        let (result, changes) = validate(&tokens(&[
            ("TODO", KeywordGroup::Inactive),
            ("TODO", KeywordGroup::Inactive),
        ]));
        assert!(result.is_valid());
        assert_eq!(kinds(&result.warnings), vec![KeywordIssueKind::SortOrderOverride]);
        assert_eq!(changes.additions.len(), 1);
    }

    #[test]
    fn test_duplicate_custom_across_groups_errors_everywhere() {
        let (result, changes) = validate(&tokens(&[
            ("BLOCKED", KeywordGroup::Waiting),
            ("BLOCKED", KeywordGroup::Archived),
        ]));
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.errors_for(KeywordGroup::Waiting).count(), 1);
        assert_eq!(result.errors_for(KeywordGroup::Archived).count(), 1);
        assert!(result.is_invalid("BLOCKED"));
        assert!(changes.additions.is_empty());
    }

    #[test]
    fn test_builtin_in_two_custom_groups_errors_per_group() {
        let (result, changes) = validate(&tokens(&[
            ("TODO", KeywordGroup::Active),
            ("TODO", KeywordGroup::Waiting),
        ]));
        assert_eq!(
            kinds(&result.errors),
            vec![
                KeywordIssueKind::BuiltinInMultipleGroups,
                KeywordIssueKind::BuiltinInMultipleGroups
            ]
        );
        assert!(result.is_invalid("TODO"));
        assert!(result.warnings.is_empty());
        assert!(changes.additions.is_empty());
    }

    // ========================================================================
    // Removals
    // ========================================================================

    #[test]
    fn test_removal_of_foreign_keyword_is_dropped() {
        let (result, changes) = validate(&tokens(&[("-TODO", KeywordGroup::Active)]));
        assert_eq!(kinds(&result.errors), vec![KeywordIssueKind::InvalidRemoval]);
        assert!(!result.is_invalid("TODO"));
        assert!(changes.removals.is_empty());
    }

    #[test]
    fn test_valid_removal_warns() {
        let (result, changes) = validate(&tokens(&[("-LATER", KeywordGroup::Inactive)]));
        assert!(result.is_valid());
        assert_eq!(kinds(&result.warnings), vec![KeywordIssueKind::BuiltinRemoved]);
        assert_eq!(changes.removals, vec![("LATER".to_string(), KeywordGroup::Inactive)]);
    }

    #[test]
    fn test_add_remove_conflict_touches_both_groups() {
        let (result, changes) = validate(&tokens(&[
            ("LATER", KeywordGroup::Waiting),
            ("-LATER", KeywordGroup::Inactive),
        ]));
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors.iter().all(|e| e.kind == KeywordIssueKind::AddRemoveConflict));
        assert_eq!(result.errors_for(KeywordGroup::Waiting).count(), 1);
        assert_eq!(result.errors_for(KeywordGroup::Inactive).count(), 1);
        assert!(result.is_invalid("LATER"));
        assert!(changes.additions.is_empty());
        assert!(changes.removals.is_empty());
    }

    #[test]
    fn test_add_remove_conflict_in_same_group_reports_once() {
        let (result, _) = validate(&tokens(&[
            ("LATER", KeywordGroup::Inactive),
            ("-LATER", KeywordGroup::Inactive),
        ]));
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, KeywordIssueKind::AddRemoveConflict);
    }

    #[test]
    fn test_add_remove_conflict_with_invalid_removal() {
        let (result, changes) = validate(&tokens(&[
            ("TODO", KeywordGroup::Active),
            ("-TODO", KeywordGroup::Waiting),
        ]));
        assert_eq!(
            kinds(&result.errors),
            vec![
                KeywordIssueKind::InvalidRemoval,
                KeywordIssueKind::AddRemoveConflict,
                KeywordIssueKind::AddRemoveConflict
            ]
        );
        assert_eq!(result.errors_for(KeywordGroup::Active).count(), 1);
        assert_eq!(result.errors_for(KeywordGroup::Waiting).count(), 2);
        assert!(result.is_invalid("TODO"));
        assert!(result.warnings.is_empty());
        assert!(changes.additions.is_empty());
        assert!(changes.removals.is_empty());
    }

    #[test]
    fn test_removals_from_several_groups_report_conflict_once_per_group() {
        let (result, _) = validate(&tokens(&[
            ("DONE", KeywordGroup::Completed),
            ("-DONE", KeywordGroup::Completed),
            ("-DONE", KeywordGroup::Archived),
        ]));
        let conflicts: Vec<KeywordGroup> = result
            .errors
            .iter()
            .filter(|e| e.kind == KeywordIssueKind::AddRemoveConflict)
            .map(|e| e.group)
            .collect();
        assert_eq!(conflicts, vec![KeywordGroup::Completed, KeywordGroup::Archived]);
    }

    // ========================================================================
    // Warnings
    // ========================================================================

    #[test]
    fn test_group_override_warns() {
        let (result, changes) = validate(&tokens(&[("WAIT", KeywordGroup::Active)]));
        assert!(result.is_valid());
        assert_eq!(kinds(&result.warnings), vec![KeywordIssueKind::GroupOverride]);
        assert_eq!(result.warnings_for(KeywordGroup::Active).count(), 1);
        assert_eq!(changes.additions, vec![("WAIT".to_string(), KeywordGroup::Active)]);
    }

    #[test]
    fn test_issue_display_includes_group() {
        let (result, _) = validate(&tokens(&[("-NOPE", KeywordGroup::Completed)]));
        assert!(result.errors[0].to_string().starts_with("[completed] "));
    }
}
