//! Per-language pattern cache.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use super::{LanguageAwareRegexBuilder, RegexPair};
use crate::error::Result;
use crate::language::LanguageDefinition;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CacheKey {
    Prose,
    Language(String),
    CommentBody(String),
}

/// Compiled patterns for one keyword set, built on first use per language.
///
/// Safe to share between threads; compilation happens at most once per
/// language unless two threads miss at the same time, in which case the
/// first insert wins.
#[derive(Debug, Default)]
pub struct PatternCache {
    keywords: Vec<String>,
    entries: RwLock<HashMap<CacheKey, Arc<RegexPair>>>,
}

impl PatternCache {
    /// Cache for the given keyword set.
    pub fn new(keywords: Vec<String>) -> Self {
        Self {
            keywords,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// The keyword set every pattern in this cache is built from.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Patterns for task lines of `language`, or for prose with `None`.
    pub fn pair(&self, language: Option<&LanguageDefinition>) -> Result<Arc<RegexPair>> {
        let key = match language {
            Some(lang) => CacheKey::Language(lang.name().to_string()),
            None => CacheKey::Prose,
        };
        self.get_or_build(key, || {
            LanguageAwareRegexBuilder::build_regex(&self.keywords, language)
        })
    }

    /// Patterns for bare lines inside a block comment of `language`.
    pub fn comment_body_pair(&self, language: &LanguageDefinition) -> Result<Arc<RegexPair>> {
        self.get_or_build(CacheKey::CommentBody(language.name().to_string()), || {
            LanguageAwareRegexBuilder::build_comment_body_regex(&self.keywords, language)
        })
    }

    /// Number of compiled entries.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every compiled entry.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn get_or_build(
        &self,
        key: CacheKey,
        build: impl FnOnce() -> Result<RegexPair>,
    ) -> Result<Arc<RegexPair>> {
        if let Some(pair) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(Arc::clone(pair));
        }

        debug!(?key, keywords = self.keywords.len(), "Compiling task patterns");
        let pair = Arc::new(build()?);

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(entries.entry(key).or_insert(pair)))
    }
}
