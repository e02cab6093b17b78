//! Package manifest reading.
//!
//! The documentation version comes from the package manifest that sits next to
//! the docs directory (`../package.json` for the XBR contracts). TOML manifests
//! (`Cargo.toml`, `pyproject.toml`) are understood as well.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfError, Result};

/// Version used when the manifest does not declare one.
pub const VERSION_PLACEHOLDER: &str = "?.?.?";

/// What to do when the manifest has no usable version field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionPolicy {
    /// Fall back to [`VERSION_PLACEHOLDER`] and log a warning.
    #[default]
    Placeholder,
    /// Fail with [`ConfError::MissingVersion`].
    Require,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ManifestFormat {
    Json,
    Toml,
}

impl ManifestFormat {
    fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(ManifestFormat::Json),
            Some("toml") => Ok(ManifestFormat::Toml),
            _ => Err(ConfError::UnsupportedManifest(path.to_path_buf())),
        }
    }
}

/// The raw version field, before the policy is applied.
#[derive(Debug, Clone, PartialEq)]
enum RawVersion {
    Missing,
    Text(String),
    NotAString(String),
}

/// A parsed package manifest.
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    version: RawVersion,
}

impl Manifest {
    /// Read and parse a manifest. Missing files and malformed content are errors.
    pub fn from_path(path: &Path) -> Result<Self> {
        let format = ManifestFormat::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|source| ConfError::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Read manifest {} ({} bytes)", path.display(), content.len());
        Self::parse(path, &content, format)
    }

    /// Parse manifest content that was already loaded. The format follows the
    /// extension of `path`.
    pub fn parse_str(path: &Path, content: &str) -> Result<Self> {
        let format = ManifestFormat::from_path(path)?;
        Self::parse(path, content, format)
    }

    fn parse(path: &Path, content: &str, format: ManifestFormat) -> Result<Self> {
        let parse_error = |message: String| ConfError::ManifestParse {
            path: path.to_path_buf(),
            message,
        };

        let version = match format {
            ManifestFormat::Json => {
                let value: serde_json::Value =
                    serde_json::from_str(content).map_err(|e| parse_error(e.to_string()))?;
                let object = value
                    .as_object()
                    .ok_or_else(|| parse_error("top-level value is not an object".to_string()))?;
                match object.get("version") {
                    None => RawVersion::Missing,
                    Some(serde_json::Value::String(s)) => RawVersion::Text(s.clone()),
                    Some(other) => RawVersion::NotAString(other.to_string()),
                }
            }
            ManifestFormat::Toml => {
                let value: toml::Table =
                    toml::from_str(content).map_err(|e| parse_error(e.to_string()))?;
                toml_version(&value)
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            version,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve the version string under the given policy.
    ///
    /// A blank version counts as missing, so the result is never empty.
    pub fn version(&self, policy: VersionPolicy) -> Result<String> {
        match &self.version {
            RawVersion::Text(s) if !s.trim().is_empty() => Ok(s.clone()),
            RawVersion::NotAString(found) => Err(ConfError::InvalidVersion {
                path: self.path.clone(),
                found: found.clone(),
            }),
            RawVersion::Missing | RawVersion::Text(_) => match policy {
                VersionPolicy::Placeholder => {
                    warn!(
                        "Manifest {} declares no version, using '{}'",
                        self.path.display(),
                        VERSION_PLACEHOLDER
                    );
                    Ok(VERSION_PLACEHOLDER.to_string())
                }
                VersionPolicy::Require => Err(ConfError::MissingVersion {
                    path: self.path.clone(),
                }),
            },
        }
    }
}

// Cargo.toml, then PEP 621, then poetry.
fn toml_version(table: &toml::Table) -> RawVersion {
    const LOCATIONS: [&[&str]; 3] = [
        &["package", "version"],
        &["project", "version"],
        &["tool", "poetry", "version"],
    ];

    for location in LOCATIONS {
        let mut current = table;
        let (last, parents) = match location.split_last() {
            Some(split) => split,
            None => continue,
        };

        let mut found_parents = true;
        for key in parents {
            match current.get(*key).and_then(|v| v.as_table()) {
                Some(t) => current = t,
                None => {
                    found_parents = false;
                    break;
                }
            }
        }
        if !found_parents {
            continue;
        }

        match current.get(*last) {
            Some(toml::Value::String(s)) => return RawVersion::Text(s.clone()),
            // `version.workspace = true` and friends
            Some(other) => return RawVersion::NotAString(other.to_string()),
            None => continue,
        }
    }

    RawVersion::Missing
}

/// Read `path` and resolve its version in one step.
pub fn resolve_version(path: &Path, policy: VersionPolicy) -> Result<String> {
    Manifest::from_path(path)?.version(policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_package_json_version() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "package.json", r#"{"name": "xbr", "version": "1.2.3"}"#);

        let version = resolve_version(&path, VersionPolicy::Placeholder).unwrap();
        assert_eq!(version, "1.2.3");
    }

    #[test]
    fn test_missing_version_uses_placeholder() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "package.json", r#"{"name": "xbr"}"#);

        let version = resolve_version(&path, VersionPolicy::Placeholder).unwrap();
        assert_eq!(version, VERSION_PLACEHOLDER);
        assert!(!version.is_empty());
    }

    #[test]
    fn test_missing_version_with_require_policy() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "package.json", r#"{"name": "xbr"}"#);

        let err = resolve_version(&path, VersionPolicy::Require).unwrap_err();
        assert!(matches!(err, ConfError::MissingVersion { .. }));
    }

    #[test]
    fn test_blank_version_counts_as_missing() {
        let manifest =
            Manifest::parse_str(Path::new("package.json"), r#"{"version": "  "}"#).unwrap();
        assert_eq!(
            manifest.version(VersionPolicy::Placeholder).unwrap(),
            VERSION_PLACEHOLDER
        );
    }

    #[test]
    fn test_non_string_version_is_rejected() {
        let manifest = Manifest::parse_str(Path::new("package.json"), r#"{"version": 2}"#).unwrap();
        let err = manifest.version(VersionPolicy::Placeholder).unwrap_err();
        assert!(matches!(err, ConfError::InvalidVersion { ref found, .. } if found == "2"));
    }

    #[test]
    fn test_null_version_is_rejected() {
        let manifest =
            Manifest::parse_str(Path::new("package.json"), r#"{"version": null}"#).unwrap();
        for policy in [VersionPolicy::Placeholder, VersionPolicy::Require] {
            let err = manifest.version(policy).unwrap_err();
            assert!(matches!(err, ConfError::InvalidVersion { ref found, .. } if found == "null"));
        }
    }

    #[test]
    fn test_missing_file_names_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("package.json");

        let err = Manifest::from_path(&path).unwrap_err();
        assert!(matches!(err, ConfError::ManifestRead { .. }));
        assert!(err.to_string().contains("package.json"));
    }

    #[test]
    fn test_malformed_json_names_path() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "package.json", "{ version: ");

        let err = Manifest::from_path(&path).unwrap_err();
        assert!(matches!(err, ConfError::ManifestParse { .. }));
        assert!(err.to_string().contains("package.json"));
    }

    #[test]
    fn test_json_array_is_malformed() {
        let err = Manifest::parse_str(Path::new("package.json"), "[1, 2]").unwrap_err();
        assert!(matches!(err, ConfError::ManifestParse { .. }));
    }

    #[test]
    fn test_toml_manifests() {
        let cargo = Manifest::parse_str(
            Path::new("Cargo.toml"),
            "[package]\nname = \"xbr\"\nversion = \"0.4.0\"\n",
        )
        .unwrap();
        assert_eq!(cargo.version(VersionPolicy::Require).unwrap(), "0.4.0");

        let pep621 = Manifest::parse_str(
            Path::new("pyproject.toml"),
            "[project]\nname = \"xbr\"\nversion = \"25.1.1\"\n",
        )
        .unwrap();
        assert_eq!(pep621.version(VersionPolicy::Require).unwrap(), "25.1.1");

        let poetry = Manifest::parse_str(
            Path::new("pyproject.toml"),
            "[tool.poetry]\nversion = \"3.0.0\"\n",
        )
        .unwrap();
        assert_eq!(poetry.version(VersionPolicy::Require).unwrap(), "3.0.0");
    }

    #[test]
    fn test_workspace_inherited_version_is_not_a_string() {
        let manifest = Manifest::parse_str(
            Path::new("Cargo.toml"),
            "[package]\nversion = { workspace = true }\n",
        )
        .unwrap();
        assert!(manifest.version(VersionPolicy::Placeholder).is_err());
    }

    #[test]
    fn test_unsupported_extension() {
        let err = Manifest::parse_str(Path::new("setup.cfg"), "").unwrap_err();
        assert!(matches!(err, ConfError::UnsupportedManifest(_)));
    }
}
