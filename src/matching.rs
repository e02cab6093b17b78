//! Pattern matching utilities for file filtering.
//!
//! Glob patterns follow Sphinx's `exclude_patterns` rules:
//! - `**` matches any files and zero or more directories
//! - `*` matches everything except a directory separator
//! - `?` matches any single character except a directory separator
//! - `[seq]` / `[!seq]` match any character in / not in seq
//!
//! Paths are compared relative to the docs directory with forward slashes.

use log::debug;
use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::{DocsConfig, SourceKind};
use crate::error::{ConfError, Result};

/// Translates a shell-style glob pattern to an anchored regex pattern.
pub fn translate_pattern(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2 + 2);
    out.push('^');

    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' if chars.get(i + 1) == Some(&'*') => {
                if chars.get(i + 2) == Some(&'/') {
                    out.push_str("(?:[^/]+/)*");
                    i += 3;
                } else {
                    out.push_str(".*");
                    i += 2;
                }
            }
            '*' => {
                out.push_str("[^/]*");
                i += 1;
            }
            '?' => {
                out.push_str("[^/]");
                i += 1;
            }
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    push_class(&mut out, &chars[i + 1..end]);
                    i = end + 1;
                }
                // No closing bracket: literal '['
                None => {
                    out.push_str("\\[");
                    i += 1;
                }
            },
            c => {
                if "\\.^$+{}|()".contains(c) {
                    out.push('\\');
                }
                out.push(c);
                i += 1;
            }
        }
    }

    out.push('$');
    out
}

/// Index of the `]` closing the class opened at `open`.
fn class_end(chars: &[char], open: usize) -> Option<usize> {
    let mut j = open + 1;
    if matches!(chars.get(j), Some('!') | Some('^')) {
        j += 1;
    }
    // A leading ']' is part of the class.
    if chars.get(j) == Some(&']') {
        j += 1;
    }
    while j < chars.len() && chars[j] != ']' {
        j += 1;
    }
    (j < chars.len()).then_some(j)
}

fn push_class(out: &mut String, body: &[char]) {
    out.push('[');
    let body = match body.split_first() {
        Some((&('!' | '^'), rest)) => {
            out.push('^');
            rest
        }
        _ => body,
    };

    // Only `x-y` between two plain characters is a range; every other `-`,
    // and any `&`, `~` or `[`, is literal.
    let mut can_start_range = false;
    let mut k = 0;
    while k < body.len() {
        match body[k] {
            '\\' if k + 1 < body.len() => {
                out.push('\\');
                out.push(body[k + 1]);
                k += 2;
                can_start_range = true;
            }
            '-' if can_start_range && k + 1 < body.len() && body[k + 1] != '-' => {
                out.push('-');
                push_class_char(out, body[k + 1]);
                k += 2;
                can_start_range = false;
            }
            c => {
                push_class_char(out, c);
                k += 1;
                can_start_range = c != '-';
            }
        }
    }
    out.push(']');
}

fn push_class_char(out: &mut String, c: char) {
    // The regex crate reads `&&`, `--`, `~~` and `[` as set syntax.
    if matches!(c, '[' | ']' | '&' | '~' | '-' | '^' | '\\') {
        out.push('\\');
    }
    out.push(c);
}

/// A compiled glob pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(&translate_pattern(pattern)).map_err(|source| ConfError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }
}

/// Tests if a name matches a glob pattern.
pub fn pattern_match(name: &str, pattern: &str) -> Result<bool> {
    Ok(Pattern::new(pattern)?.matches(name))
}

/// A list of patterns compiled once; matches if any pattern does.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| Pattern::new(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(path))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl FromIterator<Pattern> for PatternSet {
    fn from_iter<I: IntoIterator<Item = Pattern>>(iter: I) -> Self {
        Self {
            patterns: iter.into_iter().collect(),
        }
    }
}

/// Normalizes a path to use forward slashes for pattern matching.
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// A source document found in the docs directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub path: PathBuf,
    /// Path relative to the docs directory, without suffix.
    pub docname: String,
    pub kind: SourceKind,
}

/// Finds the source documents below `conf_dir`.
///
/// Directories matching `exclude_patterns` are not descended into; files are
/// kept when they are not excluded and their suffix is in `source_suffix`.
pub fn discover_sources(conf_dir: &Path, config: &DocsConfig) -> Result<Vec<SourceDocument>> {
    let excludes = PatternSet::new(config.general.exclude_patterns.as_slice())?;
    let relative = |path: &Path| path.strip_prefix(conf_dir).ok().map(normalize_path);

    let walker = WalkDir::new(conf_dir)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| match relative(entry.path()) {
            Some(rel) => !excludes.is_match(&rel),
            None => true,
        });

    let mut documents = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|source| ConfError::Walk {
            path: conf_dir.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(kind) = config.source_kind(entry.path()) else {
            continue;
        };
        let Some(rel) = relative(entry.path()) else {
            continue;
        };

        let docname = config
            .general
            .source_suffix
            .keys()
            .find_map(|suffix| rel.strip_suffix(suffix.as_str()))
            .unwrap_or(rel.as_str())
            .to_string();

        documents.push(SourceDocument {
            path: entry.into_path(),
            docname,
            kind,
        });
    }

    documents.sort_by(|a, b| a.docname.cmp(&b.docname));
    debug!(
        "Discovered {} source documents in {}",
        documents.len(),
        conf_dir.display()
    );
    Ok(documents)
}
