//! Settings for todoseq.
//!
//! Settings are read from a JSON or TOML file with three sections:
//!
//! ```json
//! {
//!   "keywords": { "active": ["REVIEW"], "inactive": ["-LATER"] },
//!   "transitions": {
//!     "statements": ["TODO -> REVIEW -> [DONE]"],
//!     "defaultActive": "REVIEW"
//!   },
//!   "parser": { "includeCodeBlocks": true }
//! }
//! ```
//!
//! Every section and field is optional; [`Settings::default`] reproduces the
//! built-in behavior. Problems inside the keyword and transition sections do
//! not fail loading; they are collected in a [`SettingsReport`].

mod validation;

pub use validation::SettingsReport;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TodoseqError};
use crate::keywords::{KeywordManager, KeywordSettings};
use crate::transitions::{TaskStateTransitionManager, TransitionSettings};

/// File names searched by [`Settings::discover`], in order.
pub const SETTINGS_FILE_NAMES: &[&str] = &[".todoseq.json", ".todoseq.toml"];

/// Task extraction switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParserSettings {
    /// Look for tasks inside fenced code blocks
    pub include_code_blocks: bool,
    /// Inside code blocks of a known language, only accept tasks in comments
    pub language_comment_support: bool,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            include_code_blocks: false,
            language_comment_support: true,
        }
    }
}

/// All user settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub keywords: KeywordSettings,
    pub transitions: TransitionSettings,
    pub parser: ParserSettings,
}

impl Settings {
    /// Load settings from a file.
    ///
    /// Files ending in `.toml` are read as TOML, anything else as JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings = Self::parse(&content, path)?;
        debug!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }

    /// Parse settings text; the extension of `path` selects the format.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        let settings = if is_toml {
            toml::from_str::<Self>(content)?
        } else {
            serde_json::from_str::<Self>(content)?
        };
        Ok(settings)
    }

    /// First settings file found in `dir`, if any.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        SETTINGS_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    }

    /// Load the settings file found in `dir`, or the defaults.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        match Self::discover(dir) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Resolve the effective keywords.
    pub fn keyword_manager(&self) -> Arc<KeywordManager> {
        Arc::new(KeywordManager::new(&self.keywords))
    }

    /// Build the transition manager over already resolved keywords.
    pub fn transition_manager(&self, keywords: Arc<KeywordManager>) -> TaskStateTransitionManager {
        TaskStateTransitionManager::new(keywords, &self.transitions)
    }

    /// Resolve everything and report every problem found.
    pub fn validate(&self) -> SettingsReport {
        let keywords = self.keyword_manager();
        let transitions = self.transition_manager(keywords);
        SettingsReport::from_managers(&transitions)
    }
}
