use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfError>;

#[derive(Error, Debug)]
pub enum ConfError {
    #[error("Failed to read manifest {}: {source}", path.display())]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse manifest {}: {message}", path.display())]
    ManifestParse { path: PathBuf, message: String },

    #[error("Unsupported manifest format: {}", .0.display())]
    UnsupportedManifest(PathBuf),

    #[error("Manifest {} has no version field", path.display())]
    MissingVersion { path: PathBuf },

    #[error("Manifest {} has a non-string version field: {found}", path.display())]
    InvalidVersion { path: PathBuf, found: String },

    #[error("Invalid theme option '{key}': {message}")]
    ThemeOption { key: String, message: String },

    #[error("Lexer '{name}' failed: {message}")]
    Lexer { name: String, message: String },

    #[error("Highlighting error: {0}")]
    Highlight(String),

    #[error("Invalid file pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Failed to walk {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
