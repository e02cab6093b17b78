//! Consistency checks between a configuration and the docs directory it is
//! used with.

use log::debug;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use crate::config::DocsConfig;
use crate::error::Result;
use crate::intersphinx::is_http_url;
use crate::manifest::VERSION_PLACEHOLDER;
use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueSeverity::Info => write!(f, "info"),
            IssueSeverity::Warning => write!(f, "warning"),
            IssueSeverity::Error => write!(f, "error"),
        }
    }
}

/// A problem found in the configuration, attributed to a setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigIssue {
    pub severity: IssueSeverity,
    pub key: String,
    pub message: String,
}

impl ConfigIssue {
    fn new(severity: IssueSeverity, key: &str, message: impl Into<String>) -> Self {
        Self {
            severity,
            key: key.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.key, self.message)
    }
}

pub fn has_errors(issues: &[ConfigIssue]) -> bool {
    issues.iter().any(|i| i.severity == IssueSeverity::Error)
}

/// Check `config` against the docs directory `conf_dir`.
pub fn check_config(conf_dir: &Path, config: &DocsConfig) -> Result<Vec<ConfigIssue>> {
    use IssueSeverity::*;
    let mut issues = Vec::new();

    for key in config.missing_keys()? {
        issues.push(ConfigIssue::new(Error, key, "required setting is missing"));
    }

    if config.project.version == VERSION_PLACEHOLDER {
        issues.push(ConfigIssue::new(
            Warning,
            "version",
            "manifest declares no version, the placeholder will be published",
        ));
    }

    let mut seen = HashSet::new();
    for extension in &config.general.extensions {
        if !seen.insert(extension.as_str()) {
            issues.push(ConfigIssue::new(
                Error,
                "extensions",
                format!("extension '{}' is listed twice", extension),
            ));
        }
    }

    for path in config.resolved_extension_paths(conf_dir) {
        if !path.is_dir() {
            issues.push(ConfigIssue::new(
                Error,
                "extension_paths",
                format!("extension directory {} does not exist", path.display()),
            ));
        }
    }

    let master_found = config
        .general
        .source_suffix
        .keys()
        .any(|suffix| conf_dir.join(format!("{}{}", config.general.master_doc, suffix)).is_file());
    if !master_found {
        issues.push(ConfigIssue::new(
            Error,
            "master_doc",
            format!(
                "no source file for master document '{}'",
                config.general.master_doc
            ),
        ));
    }

    for static_path in &config.html.html_static_path {
        if !conf_dir.join(static_path).is_dir() {
            issues.push(ConfigIssue::new(
                Warning,
                "html_static_path",
                format!("entry '{}' does not exist", static_path),
            ));
        }
    }

    for (key, value) in [
        ("html_logo", &config.html.html_logo),
        ("html_favicon", &config.html.html_favicon),
    ] {
        if !is_http_url(value) && !conf_dir.join(value).is_file() {
            issues.push(ConfigIssue::new(
                Warning,
                key,
                format!("file '{}' does not exist", value),
            ));
        }
    }

    let wordlist = &config.spelling.spelling_word_list_filename;
    if !conf_dir.join(wordlist).is_file() {
        issues.push(ConfigIssue::new(
            Warning,
            "spelling_word_list_filename",
            format!("word list '{}' does not exist", wordlist),
        ));
    }

    for message in config.intersphinx.intersphinx_mapping.validate() {
        issues.push(ConfigIssue::new(Error, "intersphinx_mapping", message));
    }

    match Theme::builtin(&config.html.html_theme) {
        Some(theme) => {
            let options = config.html.html_theme_options.to_value()?;
            if let Err(e) = theme.validate_options(&options) {
                issues.push(ConfigIssue::new(Error, "html_theme_options", e.to_string()));
            }
        }
        None => issues.push(ConfigIssue::new(
            Info,
            "html_theme",
            format!(
                "no option schema for theme '{}', options not checked",
                config.html.html_theme
            ),
        )),
    }

    issues.sort_by(|a, b| b.severity.cmp(&a.severity));
    debug!(
        "Checked configuration against {}: {} issues",
        conf_dir.display(),
        issues.len()
    );
    Ok(issues)
}
