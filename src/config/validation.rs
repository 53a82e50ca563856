//! Settings validation report.
//!
//! # Example
//!
//! ```
//! use todoseq::config::Settings;
//!
//! let mut settings = Settings::default();
//! settings.transitions.statements = vec!["TODO -> NOPE".to_string()];
//!
//! let report = settings.validate();
//! assert!(!report.is_valid());
//! assert_eq!(report.exit_code(), 1);
//! ```

use crate::transitions::TaskStateTransitionManager;

/// Every problem found while resolving keyword and transition settings.
///
/// Errors mean part of the settings was ignored; warnings mean the settings
/// took effect but probably not the way they read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsReport {
    /// Problems that caused keywords or statements to be dropped.
    pub errors: Vec<String>,
    /// Problems that did not change what was applied.
    pub warnings: Vec<String>,
    /// Number of effective keywords.
    pub keyword_count: usize,
    /// Number of explicit transition edges.
    pub transition_count: usize,
}

impl SettingsReport {
    /// An empty, valid report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the problems recorded by built managers.
    #[must_use]
    pub fn from_managers(transitions: &TaskStateTransitionManager) -> Self {
        let keywords = transitions.keyword_manager();
        let validation = keywords.validation();

        let mut errors: Vec<String> = validation
            .errors
            .iter()
            .map(|issue| format!("keywords {}", issue))
            .collect();
        errors.extend(
            transitions
                .validation_errors()
                .iter()
                .map(|err| format!("transitions {}", err)),
        );

        let mut warnings: Vec<String> = validation
            .warnings
            .iter()
            .map(|issue| format!("keywords {}", issue))
            .collect();
        warnings.extend(
            transitions
                .validation_warnings()
                .iter()
                .map(|warning| format!("transitions {}", warning)),
        );

        Self {
            errors,
            warnings,
            keyword_count: keywords.all_keywords().len(),
            transition_count: transitions.transitions().len(),
        }
    }

    /// Returns true if nothing was dropped. Warnings do not affect validity.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// 0 if valid, 1 otherwise.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        if self.is_valid() {
            0
        } else {
            1
        }
    }

    #[must_use]
    pub fn summary(&self) -> String {
        if self.is_valid() {
            if self.warnings.is_empty() {
                "Settings are valid.".to_string()
            } else {
                format!("Settings are valid with {} warning(s).", self.warnings.len())
            }
        } else {
            format!("Settings are invalid with {} error(s).", self.errors.len())
        }
    }

    /// Multi-line report listing every error and warning.
    #[must_use]
    pub fn verbose_report(&self) -> String {
        let mut lines = vec![
            "Settings Validation Report".to_string(),
            "\u{2500}".repeat(50),
            String::new(),
            format!("Effective keywords: {}", self.keyword_count),
            format!("Transition edges:   {}", self.transition_count),
        ];

        if !self.errors.is_empty() {
            lines.push(String::new());
            lines.push(format!("Errors ({}):", self.errors.len()));
            for error in &self.errors {
                lines.push(format!("  \u{2717} {}", error));
            }
        }

        if !self.warnings.is_empty() {
            lines.push(String::new());
            lines.push(format!("Warnings ({}):", self.warnings.len()));
            for warning in &self.warnings {
                lines.push(format!("  \u{26a0} {}", warning));
            }
        }

        lines.push(String::new());
        lines.push(format!("Status: {}", self.summary()));

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::keywords::KeywordSettings;
    use crate::transitions::TransitionSettings;

    #[test]
    fn test_empty_report_is_valid() {
        let report = SettingsReport::new();
        assert!(report.is_valid());
        assert_eq!(report.exit_code(), 0);
        assert_eq!(report.summary(), "Settings are valid.");
    }

    #[test]
    fn test_default_settings_report() {
        let report = Settings::default().validate();
        assert!(report.is_valid());
        assert!(report.warnings.is_empty());
        assert_eq!(report.keyword_count, 11);
        assert_eq!(report.transition_count, 6);
    }

    #[test]
    fn test_collects_keyword_and_transition_problems() {
        let settings = Settings {
            keywords: KeywordSettings {
                active: vec!["TODO".to_string()],
                waiting: vec!["TODO".to_string()],
                inactive: vec!["-LATER".to_string()],
                ..Default::default()
            },
            transitions: TransitionSettings {
                statements: vec!["LATER -> DONE".to_string(), "DOING DONE".to_string()],
                default_active: Some("STARTED".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let report = settings.validate();

        // TODO in two groups (2), LATER unknown (1), missing arrow (1)
        assert_eq!(report.errors.len(), 4);
        assert_eq!(
            report.errors.iter().filter(|e| e.starts_with("keywords")).count(),
            2
        );
        // LATER removed (1), unknown default (1)
        assert_eq!(report.warnings.len(), 2);
        assert_eq!(report.exit_code(), 1);
        assert_eq!(report.summary(), "Settings are invalid with 4 error(s).");
    }

    #[test]
    fn test_valid_with_warnings_summary() {
        let report = SettingsReport {
            warnings: vec!["something".to_string()],
            ..Default::default()
        };
        assert!(report.is_valid());
        assert_eq!(report.summary(), "Settings are valid with 1 warning(s).");
    }

    #[test]
    fn test_verbose_report_sections() {
        let report = SettingsReport {
            errors: vec!["bad".to_string()],
            warnings: vec!["odd".to_string()],
            keyword_count: 3,
            transition_count: 1,
        };
        let text = report.verbose_report();
        assert!(text.contains("Settings Validation Report"));
        assert!(text.contains("Effective keywords: 3"));
        assert!(text.contains("Errors (1):"));
        assert!(text.contains("\u{2717} bad"));
        assert!(text.contains("Warnings (1):"));
        assert!(text.contains("Status: Settings are invalid with 1 error(s)."));
    }
}
