//! Effective keyword resolution.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use super::validation::{validate, ValidatedChanges};
use super::{KeywordGroup, KeywordSettings, KeywordValidationResult};

/// Resolved keyword configuration.
///
/// Built once from [`KeywordSettings`]; every query afterwards is a lookup
/// into precomputed containers. Rebuild the manager when settings change.
///
/// Resolution starts from each group's built-in keywords, drops keywords
/// that failed validation, applies removals, then applies additions in
/// declaration order. An addition first strips the keyword from whichever
/// group holds it, so re-declaring a built-in moves it (or, in its own group,
/// moves it to the end of that group's order).
#[derive(Debug, Clone)]
pub struct KeywordManager {
    ordered: [Vec<String>; KeywordGroup::COUNT],
    sets: [HashSet<String>; KeywordGroup::COUNT],
    custom: [Vec<String>; KeywordGroup::COUNT],
    lookup: HashMap<String, KeywordGroup>,
    all: Vec<String>,
    validation: KeywordValidationResult,
}

impl KeywordManager {
    /// Resolve the effective keywords for the given settings.
    pub fn new(settings: &KeywordSettings) -> Self {
        let tokens = settings.tokens();
        let (validation, changes) = validate(&tokens);

        for issue in &validation.errors {
            warn!("Keyword configuration error: {}", issue);
        }

        let ordered = resolve(&validation, &changes);
        let sets: [HashSet<String>; KeywordGroup::COUNT] =
            std::array::from_fn(|i| ordered[i].iter().cloned().collect());
        let custom: [Vec<String>; KeywordGroup::COUNT] = std::array::from_fn(|i| {
            ordered[i]
                .iter()
                .filter(|keyword| !KeywordGroup::is_builtin(keyword))
                .cloned()
                .collect()
        });

        let mut lookup = HashMap::new();
        let mut all = Vec::new();
        for group in KeywordGroup::all() {
            for keyword in &ordered[group.index()] {
                lookup.insert(keyword.clone(), *group);
                all.push(keyword.clone());
            }
        }

        debug!(
            keywords = all.len(),
            errors = validation.errors.len(),
            warnings = validation.warnings.len(),
            "Resolved task keywords"
        );

        Self {
            ordered,
            sets,
            custom,
            lookup,
            all,
            validation,
        }
    }

    /// Manager with only the built-in keywords.
    pub fn builtin() -> Self {
        Self::new(&KeywordSettings::default())
    }

    /// Validation report produced while resolving.
    pub fn validation(&self) -> &KeywordValidationResult {
        &self.validation
    }

    // ------------------------------------------------------------------
    // Classification
    // ------------------------------------------------------------------

    /// Group of a keyword, or `None` if it is not an effective keyword.
    pub fn group_of(&self, keyword: &str) -> Option<KeywordGroup> {
        self.lookup.get(keyword).copied()
    }

    /// Returns true if the keyword belongs to any group.
    pub fn is_known_keyword(&self, keyword: &str) -> bool {
        self.lookup.contains_key(keyword)
    }

    /// Returns true if the keyword belongs to the given group.
    pub fn is_in_group(&self, keyword: &str, group: KeywordGroup) -> bool {
        self.group_of(keyword) == Some(group)
    }

    /// Returns true for keywords of work in progress.
    pub fn is_active(&self, keyword: &str) -> bool {
        self.is_in_group(keyword, KeywordGroup::Active)
    }

    /// Returns true for keywords of work not started yet.
    pub fn is_inactive(&self, keyword: &str) -> bool {
        self.is_in_group(keyword, KeywordGroup::Inactive)
    }

    /// Returns true for keywords of blocked work.
    pub fn is_waiting(&self, keyword: &str) -> bool {
        self.is_in_group(keyword, KeywordGroup::Waiting)
    }

    /// Returns true for keywords of finished or abandoned work.
    pub fn is_completed(&self, keyword: &str) -> bool {
        self.is_in_group(keyword, KeywordGroup::Completed)
    }

    /// Returns true for keywords that never advance.
    pub fn is_archived(&self, keyword: &str) -> bool {
        self.is_in_group(keyword, KeywordGroup::Archived)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Effective keywords of a group, in resolution order.
    pub fn keywords(&self, group: KeywordGroup) -> &[String] {
        &self.ordered[group.index()]
    }

    /// Effective keywords of a group as a set.
    pub fn keyword_set(&self, group: KeywordGroup) -> &HashSet<String> {
        &self.sets[group.index()]
    }

    /// Effective keywords of a group that are not built-in.
    pub fn custom_keywords(&self, group: KeywordGroup) -> &[String] {
        &self.custom[group.index()]
    }

    /// Built-in keywords of a group, regardless of settings.
    pub fn builtin_keywords(group: KeywordGroup) -> &'static [&'static str] {
        group.builtin_keywords()
    }

    /// Every effective keyword, grouped in resolution order.
    pub fn all_keywords(&self) -> &[String] {
        &self.all
    }
}

impl Default for KeywordManager {
    fn default() -> Self {
        Self::builtin()
    }
}

fn resolve(
    validation: &KeywordValidationResult,
    changes: &ValidatedChanges,
) -> [Vec<String>; KeywordGroup::COUNT] {
    let mut ordered: [Vec<String>; KeywordGroup::COUNT] = std::array::from_fn(|i| {
        KeywordGroup::all()[i]
            .builtin_keywords()
            .iter()
            .filter(|keyword| !validation.is_invalid(keyword))
            .map(|keyword| (*keyword).to_string())
            .collect()
    });

    for (keyword, group) in &changes.removals {
        ordered[group.index()].retain(|existing| existing != keyword);
    }

    for (keyword, group) in &changes.additions {
        for keywords in ordered.iter_mut() {
            keywords.retain(|existing| existing != keyword);
        }
        ordered[group.index()].push(keyword.clone());
    }

    ordered
}
