//! Documentation build configuration
//!
//! [`DocsConfig`] holds every setting of the XBR documentation build. It is
//! assembled by a pure function of the manifest content and the copyright year,
//! and serializes to a flat mapping keyed by the names the builder consumes.

use chrono::Datelike;
use indexmap::IndexMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfError, Result};
use crate::intersphinx::IntersphinxMapping;
use crate::manifest::{Manifest, VersionPolicy};
use crate::theme::FuroOptions;

/// Keys the builder cannot run without.
pub const REQUIRED_KEYS: &[&str] = &[
    "project",
    "version",
    "release",
    "extensions",
    "master_doc",
    "source_suffix",
    "html_theme",
    "html_static_path",
];

/// First year of the copyright range.
pub const COPYRIGHT_START_YEAR: i32 = 2017;

const COPYRIGHT_HOLDER: &str = "typedef int GmbH (Germany)";

/// Parser used for a source file suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    RestructuredText,
    Markdown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectInfo {
    pub project: String,
    pub author: String,
    pub copyright: String,
    pub language: String,
    pub version: String,
    pub release: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneralConfig {
    pub extensions: Vec<String>,
    pub source_suffix: IndexMap<String, SourceKind>,
    pub master_doc: String,
    pub exclude_patterns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MystConfig {
    pub myst_enable_extensions: Vec<String>,
    pub myst_heading_anchors: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntersphinxConfig {
    pub intersphinx_mapping: IntersphinxMapping,
    /// Days a fetched inventory stays cached.
    pub intersphinx_cache_limit: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HtmlConfig {
    pub html_theme: String,
    pub html_title: String,
    pub html_theme_options: FuroOptions,
    pub html_logo: String,
    pub html_favicon: String,
    pub html_static_path: Vec<String>,
    pub html_css_files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImagesConfig {
    pub override_image_directive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpellingConfig {
    pub spelling_lang: String,
    pub spelling_word_list_filename: String,
    pub spelling_show_suggestions: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutodocConfig {
    pub todo_include_todos: bool,
    pub add_module_names: bool,
    pub autosectionlabel_prefix_document: bool,
    pub autoclass_content: String,
    pub autodoc_member_order: String,
}

/// The complete documentation build configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocsConfig {
    #[serde(flatten)]
    pub project: ProjectInfo,
    #[serde(flatten)]
    pub general: GeneralConfig,
    #[serde(flatten)]
    pub myst: MystConfig,
    #[serde(flatten)]
    pub intersphinx: IntersphinxConfig,
    #[serde(flatten)]
    pub html: HtmlConfig,
    pub images_config: ImagesConfig,
    #[serde(flatten)]
    pub spelling: SpellingConfig,
    pub ogp_site_url: String,
    pub pygments_style: String,
    #[serde(flatten)]
    pub autodoc: AutodocConfig,
    /// Directories prepended to the extension search path, relative to the
    /// docs directory.
    #[serde(skip)]
    pub extension_paths: Vec<PathBuf>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl DocsConfig {
    /// Assemble the configuration from an already-parsed manifest.
    ///
    /// Same manifest content and year always give the same configuration.
    pub fn resolve(manifest: &Manifest, policy: VersionPolicy, year: i32) -> Result<Self> {
        let version = manifest.version(policy)?;
        let release = version.clone();
        let project = "xbr".to_string();
        let html_title = format!("{} {}", project, release);

        debug!(
            "Resolved version {} from {}",
            version,
            manifest.path().display()
        );

        Ok(Self {
            project: ProjectInfo {
                project,
                author: "The WAMP/Autobahn/Crossbar.io OSS Project".to_string(),
                copyright: format!("{}-{}, {}", COPYRIGHT_START_YEAR, year, COPYRIGHT_HOLDER),
                language: "en".to_string(),
                version,
                release,
            },
            general: GeneralConfig {
                extensions: strings(&[
                    "myst_parser",
                    "sphinx.ext.autodoc",
                    "sphinx.ext.napoleon",
                    "sphinx.ext.intersphinx",
                    "sphinx.ext.autosectionlabel",
                    "sphinx.ext.todo",
                    "sphinx.ext.viewcode",
                    "sphinx.ext.ifconfig",
                    "sphinx.ext.doctest",
                    "sphinx_design",
                    "sphinx_copybutton",
                    "sphinxext.opengraph",
                    "sphinxcontrib.images",
                    "sphinxcontrib.spelling",
                    "sphinxcontrib.soliditydomain",
                    "autoapi.extension",
                ]),
                source_suffix: [
                    (".rst".to_string(), SourceKind::RestructuredText),
                    (".md".to_string(), SourceKind::Markdown),
                ]
                .into_iter()
                .collect(),
                master_doc: "index".to_string(),
                exclude_patterns: strings(&["_build", "Thumbs.db", ".DS_Store", "_work", "_vendor"]),
            },
            myst: MystConfig {
                myst_enable_extensions: strings(&[
                    "colon_fence",
                    "deflist",
                    "tasklist",
                    "attrs_block",
                    "attrs_inline",
                    "smartquotes",
                    "linkify",
                ]),
                myst_heading_anchors: 3,
            },
            intersphinx: IntersphinxConfig {
                intersphinx_mapping: IntersphinxMapping::xbr_defaults(),
                intersphinx_cache_limit: 5,
            },
            html: HtmlConfig {
                html_theme: "furo".to_string(),
                html_title,
                html_theme_options: FuroOptions::xbr_defaults(),
                html_logo: "_static/img/xbr.svg".to_string(),
                html_favicon: "_static/img/favicon.ico".to_string(),
                html_static_path: strings(&["_static"]),
                html_css_files: strings(&[
                    "https://fonts.googleapis.com/css2?family=Noto+Sans:wght@400;500;600;700&family=Noto+Sans+Mono:wght@400;500&display=swap",
                ]),
            },
            images_config: ImagesConfig {
                override_image_directive: false,
            },
            spelling: SpellingConfig {
                spelling_lang: "en_US".to_string(),
                spelling_word_list_filename: "spelling_wordlist.txt".to_string(),
                spelling_show_suggestions: true,
            },
            ogp_site_url: "https://xbr.network/docs/".to_string(),
            pygments_style: "sphinx".to_string(),
            autodoc: AutodocConfig {
                todo_include_todos: true,
                add_module_names: false,
                autosectionlabel_prefix_document: true,
                autoclass_content: "both".to_string(),
                autodoc_member_order: "bysource".to_string(),
            },
            extension_paths: vec![PathBuf::from("_vendor/sphinxcontrib-soliditydomain")],
        })
    }

    /// Read the manifest at `manifest_path` and assemble the configuration for
    /// the given copyright year.
    pub fn from_manifest(manifest_path: &Path, policy: VersionPolicy, year: i32) -> Result<Self> {
        let manifest = Manifest::from_path(manifest_path)?;
        Self::resolve(&manifest, policy, year)
    }

    /// Like [`DocsConfig::from_manifest`], using the current local year.
    pub fn load(manifest_path: &Path, policy: VersionPolicy) -> Result<Self> {
        let year = chrono::Local::now().year();
        let config = Self::from_manifest(manifest_path, policy, year)?;
        info!(
            "Loaded docs configuration for {} {}",
            config.project.project, config.project.release
        );
        Ok(config)
    }

    /// Flat `key -> value` mapping, in declaration order.
    pub fn settings(&self) -> Result<serde_json::Map<String, serde_json::Value>> {
        into_settings_map(serde_json::to_value(self)?)
    }

    /// Required keys absent from [`DocsConfig::settings`].
    pub fn missing_keys(&self) -> Result<Vec<&'static str>> {
        let settings = self.settings()?;
        Ok(REQUIRED_KEYS
            .iter()
            .copied()
            .filter(|key| !settings.contains_key(*key))
            .collect())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.settings()?)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.settings()?)?)
    }

    /// Parser for `path`, based on `source_suffix`.
    pub fn source_kind(&self, path: &Path) -> Option<SourceKind> {
        let name = path.file_name()?.to_str()?;
        self.general
            .source_suffix
            .iter()
            .find(|(suffix, _)| name.ends_with(suffix.as_str()) && name.len() > suffix.len())
            .map(|(_, kind)| *kind)
    }

    /// Extension search paths made absolute against the docs directory.
    pub fn resolved_extension_paths(&self, conf_dir: &Path) -> Vec<PathBuf> {
        self.extension_paths
            .iter()
            .map(|p| if p.is_absolute() { p.clone() } else { conf_dir.join(p) })
            .collect()
    }
}

fn into_settings_map(value: serde_json::Value) -> Result<serde_json::Map<String, serde_json::Value>> {
    match value {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(ConfError::Json(serde::ser::Error::custom(format!(
            "configuration serialized to {} instead of a mapping",
            other
        )))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::VERSION_PLACEHOLDER;

    fn manifest(content: &str) -> Manifest {
        Manifest::parse_str(Path::new("package.json"), content).unwrap()
    }

    fn config(content: &str) -> DocsConfig {
        DocsConfig::resolve(&manifest(content), VersionPolicy::Placeholder, 2025).unwrap()
    }

    #[test]
    fn test_version_and_release() {
        let config = config(r#"{"version": "1.2.3"}"#);
        assert_eq!(config.project.version, "1.2.3");
        assert_eq!(config.project.release, "1.2.3");
        assert_eq!(config.html.html_title, "xbr 1.2.3");
    }

    #[test]
    fn test_placeholder_in_title() {
        let config = config("{}");
        assert_eq!(config.project.version, VERSION_PLACEHOLDER);
        assert_eq!(config.html.html_title, format!("xbr {}", VERSION_PLACEHOLDER));
    }

    #[test]
    fn test_copyright_year() {
        let config = config(r#"{"version": "1.0.0"}"#);
        assert_eq!(
            config.project.copyright,
            "2017-2025, typedef int GmbH (Germany)"
        );
    }

    #[test]
    fn test_no_missing_keys() {
        let config = config(r#"{"version": "1.0.0"}"#);
        assert!(config.missing_keys().unwrap().is_empty());
    }

    #[test]
    fn test_settings_are_flat() {
        let settings = config(r#"{"version": "1.0.0"}"#).settings().unwrap();

        assert_eq!(settings["html_theme"], "furo");
        assert_eq!(settings["master_doc"], "index");
        assert_eq!(settings["myst_heading_anchors"], 3);
        assert_eq!(settings["intersphinx_cache_limit"], 5);
        assert_eq!(settings["source_suffix"][".md"], "markdown");
        assert_eq!(settings["source_suffix"][".rst"], "restructuredtext");
        assert_eq!(settings["images_config"]["override_image_directive"], false);
        assert_eq!(
            settings["html_theme_options"]["source_branch"],
            "master"
        );
        assert!(!settings.contains_key("extension_paths"));
        assert!(!settings.contains_key("project_info"));
    }

    #[test]
    fn test_non_mapping_settings_is_an_error() {
        let err = into_settings_map(serde_json::json!(["furo"])).unwrap_err();
        assert!(matches!(err, ConfError::Json(_)));
        assert!(err.to_string().contains("instead of a mapping"));

        let map = into_settings_map(serde_json::json!({"html_theme": "furo"})).unwrap();
        assert_eq!(map["html_theme"], "furo");
    }

    #[test]
    fn test_source_kind() {
        let config = config("{}");
        assert_eq!(
            config.source_kind(Path::new("api/index.rst")),
            Some(SourceKind::RestructuredText)
        );
        assert_eq!(
            config.source_kind(Path::new("README.md")),
            Some(SourceKind::Markdown)
        );
        assert_eq!(config.source_kind(Path::new("logo.svg")), None);
        assert_eq!(config.source_kind(Path::new(".md")), None);
    }

    #[test]
    fn test_solidity_domain_extension_path() {
        let config = config("{}");
        assert!(config
            .general
            .extensions
            .contains(&"sphinxcontrib.soliditydomain".to_string()));

        let paths = config.resolved_extension_paths(Path::new("/srv/docs"));
        assert_eq!(
            paths,
            vec![PathBuf::from("/srv/docs/_vendor/sphinxcontrib-soliditydomain")]
        );
    }

    #[test]
    fn test_yaml_output() {
        let yaml = config(r#"{"version": "2.0.0"}"#).to_yaml().unwrap();
        assert!(yaml.contains("html_theme: furo"));
        assert!(yaml.contains("release: 2.0.0"));
    }
}
