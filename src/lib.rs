//! XBR documentation configuration
//!
//! Resolves the documentation build configuration of the XBR project: version
//! from the package manifest, builder settings, intersphinx targets, theme
//! options and the Solidity lexer used for code highlighting.

pub mod check;
pub mod config;
pub mod error;
pub mod highlighting;
pub mod intersphinx;
pub mod manifest;
pub mod matching;
pub mod theme;

pub use check::{check_config, ConfigIssue, IssueSeverity};
pub use config::{DocsConfig, SourceKind};
pub use error::{ConfError, Result};
pub use highlighting::{register_lexers, Highlighter, Lexer, LexerRegistry, SolidityLexer};
pub use intersphinx::{IntersphinxMapping, IntersphinxTarget};
pub use manifest::{Manifest, VersionPolicy, VERSION_PLACEHOLDER};
pub use matching::{discover_sources, SourceDocument};
pub use theme::{FuroOptions, Theme};
