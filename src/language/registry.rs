//! Catalog of known languages.

use std::collections::HashMap;

use tracing::debug;

use super::{FragmentRole, LanguageDefinition};
use crate::error::{Result, TodoseqError};

/// Comment grammar of a built-in language, as regex sources.
struct Syntax {
    name: &'static str,
    aliases: &'static [&'static str],
    single_line: Option<&'static str>,
    block_start: Option<&'static str>,
    block_end: Option<&'static str>,
    continuation: Option<&'static str>,
    inline: Option<&'static str>,
}

impl Syntax {
    const fn hash(name: &'static str, aliases: &'static [&'static str]) -> Self {
        Self {
            name,
            aliases,
            single_line: Some("#"),
            block_start: None,
            block_end: None,
            continuation: None,
            inline: Some(r"\S.*?[ \t]#"),
        }
    }

    const fn c_style(name: &'static str, aliases: &'static [&'static str]) -> Self {
        Self {
            name,
            aliases,
            single_line: Some("//[/!]?"),
            block_start: Some(r"/\*[*!]?"),
            block_end: Some(r"\*/"),
            continuation: Some(r"\s*\*"),
            inline: Some(r"\S.*?[ \t](?://[/!]?|/\*[*!]?)"),
        }
    }

    const fn blocks(mut self, start: &'static str, end: &'static str) -> Self {
        self.block_start = Some(start);
        self.block_end = Some(end);
        self
    }

    fn entries(&self) -> [(FragmentRole, Option<&'static str>); 5] {
        [
            (FragmentRole::SingleLine, self.single_line),
            (FragmentRole::BlockStart, self.block_start),
            (FragmentRole::BlockEnd, self.block_end),
            (FragmentRole::BlockContinuation, self.continuation),
            (FragmentRole::Inline, self.inline),
        ]
    }

    fn definition(&self) -> Result<LanguageDefinition> {
        let mut definition = LanguageDefinition::new(self.name);
        for alias in self.aliases {
            definition = definition.with_alias(*alias);
        }
        for (role, pattern) in self.entries() {
            if let Some(pattern) = pattern {
                definition = definition.with_fragment(role, pattern)?;
            }
        }
        Ok(definition)
    }
}

const BUILTIN_LANGUAGES: &[Syntax] = &[
    // C family
    Syntax::c_style("c", &["h"]),
    Syntax::c_style("cpp", &["c++", "cc", "cxx", "hpp"]),
    Syntax::c_style("csharp", &["c#", "cs"]),
    Syntax::c_style("java", &[]),
    Syntax::c_style("javascript", &["js", "jsx", "mjs", "cjs"]),
    Syntax::c_style("typescript", &["ts", "tsx"]),
    Syntax::c_style("go", &["golang"]),
    Syntax::c_style("rust", &["rs"]),
    Syntax::c_style("swift", &[]),
    Syntax::c_style("kotlin", &["kt", "kts"]),
    Syntax::c_style("scala", &[]),
    Syntax::c_style("dart", &[]),
    Syntax::c_style("objective-c", &["objc", "objectivec"]),
    Syntax {
        single_line: Some("(?://|#)"),
        inline: Some(r"\S.*?[ \t](?://|#|/\*[*!]?)"),
        ..Syntax::c_style("php", &[])
    },
    Syntax {
        single_line: None,
        inline: Some(r"\S.*?[ \t]/\*[*!]?"),
        ..Syntax::c_style("css", &["scss", "less"])
    },
    // Hash comments
    Syntax::hash("python", &["py"]).blocks(r#"(?:"""|''')"#, r#"(?:"""|''')"#),
    Syntax::hash("ruby", &["rb"]).blocks("=begin", "=end"),
    Syntax::hash("shell", &["sh", "bash", "zsh", "fish"]),
    Syntax::hash("powershell", &["ps1", "pwsh", "ps"]).blocks("<#", "#>"),
    Syntax::hash("perl", &["pl"]).blocks("=(?:pod|begin|head[1-4])", "=cut"),
    Syntax::hash("julia", &["jl"]).blocks("#=", "=#"),
    Syntax::hash("r", &[]),
    Syntax::hash("elixir", &["ex", "exs"]),
    Syntax::hash("yaml", &["yml"]),
    Syntax::hash("toml", &[]),
    Syntax::hash("dockerfile", &["docker"]),
    Syntax::hash("makefile", &["make", "mk"]),
    // Dash comments
    Syntax {
        single_line: Some("--"),
        inline: Some(r"\S.*?[ \t](?:--|/\*)"),
        ..Syntax::c_style("sql", &["mysql", "postgresql", "psql", "sqlite"])
    },
    Syntax {
        single_line: Some("--"),
        block_start: Some(r"--\[\["),
        block_end: Some(r"\]\]"),
        continuation: None,
        inline: Some(r"\S.*?[ \t]--"),
        ..Syntax::c_style("lua", &[])
    },
    Syntax {
        single_line: Some("--"),
        block_start: Some(r"\{-"),
        block_end: Some(r"-\}"),
        continuation: None,
        inline: Some(r"\S.*?[ \t]--"),
        ..Syntax::c_style("haskell", &["hs"])
    },
    // Percent and semicolon comments
    Syntax {
        single_line: Some("%+"),
        block_start: None,
        block_end: None,
        continuation: None,
        inline: Some(r"\S.*?[ \t]%+"),
        ..Syntax::c_style("erlang", &["erl"])
    },
    Syntax {
        single_line: Some("%"),
        block_start: Some(r"%\{"),
        block_end: Some(r"%\}"),
        continuation: None,
        inline: Some(r"\S.*?[ \t]%"),
        ..Syntax::c_style("matlab", &["octave"])
    },
    Syntax {
        single_line: Some(";+"),
        block_start: None,
        block_end: None,
        continuation: None,
        inline: Some(r"\S.*?[ \t];+"),
        ..Syntax::c_style("clojure", &["clj", "cljs", "lisp", "scheme"])
    },
    Syntax {
        single_line: Some("[;#]"),
        block_start: None,
        block_end: None,
        continuation: None,
        inline: None,
        ..Syntax::c_style("ini", &["cfg", "conf"])
    },
    // Markup
    Syntax {
        single_line: None,
        block_start: Some("<!--"),
        block_end: Some("-->"),
        continuation: None,
        inline: Some(r"\S.*?[ \t]<!--"),
        ..Syntax::c_style("html", &["htm", "xml", "svg", "vue"])
    },
];

/// Lookup table from language names and aliases to definitions.
///
/// The registry is an ordinary value: build it once with
/// [`LanguageRegistry::builtin`], share it (for example behind an `Arc`),
/// and [`register`](Self::register) extra or replacement definitions where
/// needed. Lookups are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct LanguageRegistry {
    languages: Vec<LanguageDefinition>,
    index: HashMap<String, usize>,
}

impl LanguageRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in language.
    pub fn builtin() -> Result<Self> {
        let mut registry = Self::new();
        for syntax in BUILTIN_LANGUAGES {
            registry.register(syntax.definition()?);
        }
        debug!(languages = registry.len(), "Loaded built-in languages");
        Ok(registry)
    }

    /// Add a definition.
    ///
    /// A definition whose name is already registered replaces the old one.
    /// Its name and aliases take precedence over aliases of other languages.
    pub fn register(&mut self, definition: LanguageDefinition) {
        let slot = match self.index.get(definition.name()) {
            Some(&slot) if self.languages[slot].name() == definition.name() => {
                let previous = &self.languages[slot];
                let stale: Vec<String> = previous.aliases().to_vec();
                for alias in stale {
                    if self.index.get(&alias) == Some(&slot) {
                        self.index.remove(&alias);
                    }
                }
                self.languages[slot] = definition;
                slot
            }
            _ => {
                self.languages.push(definition);
                self.languages.len() - 1
            }
        };

        let definition = &self.languages[slot];
        self.index.insert(definition.name().to_string(), slot);
        for alias in definition.aliases() {
            self.index.insert(alias.clone(), slot);
        }
    }

    /// Look up a language by name or alias.
    pub fn get(&self, name: &str) -> Option<&LanguageDefinition> {
        let key = name.trim().to_lowercase();
        self.index.get(&key).map(|&slot| &self.languages[slot])
    }

    /// Look up a language, failing with [`TodoseqError::UnknownLanguage`].
    pub fn resolve(&self, name: &str) -> Result<&LanguageDefinition> {
        self.get(name)
            .ok_or_else(|| TodoseqError::unknown_language(name.trim()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &LanguageDefinition> {
        self.languages.iter()
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}
