//! Syntax highlighting lexers
//!
//! Lexers are registered into a [`LexerRegistry`] that the caller owns and passes
//! around; there is no process-wide registry. The registry extends syntect's
//! default syntaxes with every registered lexer.

use indexmap::IndexMap;
use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use syntect::highlighting::{Theme as SyntectTheme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::{SyntaxDefinition, SyntaxReference, SyntaxSet};

use crate::error::{ConfError, Result};
use crate::matching::{Pattern, PatternSet};

const SOLIDITY_SYNTAX: &str = include_str!("../assets/syntaxes/Solidity.sublime-syntax");

/// A syntax-highlighting lexer.
pub trait Lexer: Send + Sync {
    /// Human-readable name, also the syntect syntax name.
    fn name(&self) -> &str;

    /// Short names usable as a code block language.
    fn aliases(&self) -> &[&str];

    /// Filename globs handled by this lexer.
    fn filenames(&self) -> &[&str];

    fn mimetypes(&self) -> &[&str] {
        &[]
    }

    /// The syntect definition used to tokenize source text.
    fn syntax_definition(&self) -> Result<SyntaxDefinition>;
}

/// Lexer for Solidity smart contracts.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolidityLexer;

impl Lexer for SolidityLexer {
    fn name(&self) -> &str {
        "Solidity"
    }

    fn aliases(&self) -> &[&str] {
        &["solidity"]
    }

    fn filenames(&self) -> &[&str] {
        &["*.sol"]
    }

    fn syntax_definition(&self) -> Result<SyntaxDefinition> {
        SyntaxDefinition::load_from_str(SOLIDITY_SYNTAX, true, Some(self.name())).map_err(|e| {
            ConfError::Lexer {
                name: self.name().to_string(),
                message: e.to_string(),
            }
        })
    }
}

/// Lexers by the key used to request them.
#[derive(Default, Clone)]
pub struct LexerRegistry {
    lexers: IndexMap<String, Arc<dyn Lexer>>,
    /// Filename globs per key, compiled on insert
    filename_patterns: IndexMap<String, PatternSet>,
}

impl fmt::Debug for LexerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.lexers.iter().map(|(k, v)| (k, v.name())))
            .finish()
    }
}

impl LexerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `lexer` under `key`, replacing and returning any lexer that
    /// was registered there before.
    pub fn insert<L: Lexer + 'static>(
        &mut self,
        key: impl Into<String>,
        lexer: L,
    ) -> Option<Arc<dyn Lexer>> {
        let key = key.into();
        debug!("Registering lexer '{}' as '{}'", lexer.name(), key);

        let patterns = lexer
            .filenames()
            .iter()
            .filter_map(|glob| match Pattern::new(glob) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    warn!("Ignoring filename glob of lexer '{}': {}", lexer.name(), e);
                    None
                }
            })
            .collect();
        self.filename_patterns.insert(key.clone(), patterns);
        self.lexers.insert(key, Arc::new(lexer))
    }

    pub fn get(&self, key: &str) -> Option<&dyn Lexer> {
        self.lexers.get(key).map(|l| l.as_ref())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lexers.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.lexers.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.lexers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lexers.is_empty()
    }

    /// The first lexer whose filename globs match the file name of `path`.
    pub fn find_for_filename(&self, path: &Path) -> Option<(&str, &dyn Lexer)> {
        let file_name = path.file_name()?.to_str()?;
        let (key, _) = self
            .filename_patterns
            .iter()
            .find(|(_, patterns)| patterns.is_match(file_name))?;
        self.lexers
            .get_key_value(key)
            .map(|(key, lexer)| (key.as_str(), lexer.as_ref()))
    }

    /// syntect's default syntaxes plus one syntax per registered lexer.
    pub fn syntax_set(&self) -> Result<SyntaxSet> {
        let mut builder = SyntaxSet::load_defaults_newlines().into_builder();
        let mut added = HashSet::new();

        for lexer in self.lexers.values() {
            // The same lexer may be registered under several keys.
            if !added.insert(lexer.name().to_string()) {
                continue;
            }
            builder.add(lexer.syntax_definition()?);
        }

        Ok(builder.build())
    }
}

/// Register the lexers the XBR documentation needs.
pub fn register_lexers(registry: &mut LexerRegistry) {
    registry.insert("solidity", SolidityLexer);
}

/// Map a Pygments style name onto one of syntect's bundled themes.
pub fn syntect_theme_name(pygments_style: &str) -> &'static str {
    match pygments_style {
        "sphinx" | "default" | "friendly" | "tango" => "InspiredGitHub",
        "monokai" | "native" | "fruity" => "base16-ocean.dark",
        "solarized-light" => "Solarized (light)",
        "solarized-dark" => "Solarized (dark)",
        other => {
            debug!("No syntect theme for Pygments style '{}'", other);
            "InspiredGitHub"
        }
    }
}

/// Renders code blocks to HTML using the registered lexers.
pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme: SyntectTheme,
    /// Registry key or alias -> syntax name
    languages: HashMap<String, String>,
}

impl Highlighter {
    pub fn new(registry: &LexerRegistry, pygments_style: &str) -> Result<Self> {
        let syntax_set = registry.syntax_set()?;

        let theme_name = syntect_theme_name(pygments_style);
        let mut themes = ThemeSet::load_defaults();
        let theme = themes
            .themes
            .remove(theme_name)
            .ok_or_else(|| ConfError::Highlight(format!("theme '{}' is not bundled", theme_name)))?;

        let mut languages = HashMap::new();
        for (key, lexer) in &registry.lexers {
            languages.insert(key.clone(), lexer.name().to_string());
            for alias in lexer.aliases() {
                languages
                    .entry(alias.to_string())
                    .or_insert_with(|| lexer.name().to_string());
            }
        }

        Ok(Self {
            syntax_set,
            theme,
            languages,
        })
    }

    fn find_syntax(&self, language: &str) -> Option<&SyntaxReference> {
        if let Some(name) = self.languages.get(language) {
            if let Some(syntax) = self.syntax_set.find_syntax_by_name(name) {
                return Some(syntax);
            }
        }
        self.syntax_set.find_syntax_by_token(language)
    }

    pub fn supports(&self, language: &str) -> bool {
        self.find_syntax(language).is_some()
    }

    /// Highlight code, falling back to an escaped plain block if the language
    /// is unknown or highlighting fails.
    pub fn highlight(&self, code: &str, language: Option<&str>) -> String {
        let Some(syntax) = language.and_then(|l| self.find_syntax(l)) else {
            return plain_block(code, language);
        };

        match highlighted_html_for_string(code, &self.syntax_set, syntax, &self.theme) {
            Ok(html) => html,
            Err(e) => {
                warn!("Failed to highlight {} code: {}", syntax.name, e);
                plain_block(code, language)
            }
        }
    }

    /// Highlight a file, picking the language from its name.
    pub fn highlight_file(&self, path: &Path, code: &str) -> String {
        let language = path
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| self.supports(ext));
        self.highlight(code, language)
    }
}

fn plain_block(code: &str, language: Option<&str>) -> String {
    let class = language
        .map(|l| format!(" class=\"language-{}\"", html_escape::encode_double_quoted_attribute(l)))
        .unwrap_or_default();
    format!(
        "<pre><code{}>{}</code></pre>\n",
        class,
        html_escape::encode_text(code)
    )
}
