//! # xbr-docs-conf CLI
//!
//! - `xbr-docs-conf show` - Print the resolved configuration
//! - `xbr-docs-conf check` - Check the docs directory against the configuration
//! - `xbr-docs-conf sources` - List the source documents that will be built
//! - `xbr-docs-conf highlight FILE` - Render a file with the registered lexers

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info, warn};
use std::path::{Path, PathBuf};

use xbr_docs_conf::check::{check_config, has_errors, IssueSeverity};
use xbr_docs_conf::highlighting::{register_lexers, Highlighter, LexerRegistry};
use xbr_docs_conf::matching::discover_sources;
use xbr_docs_conf::{DocsConfig, VersionPolicy};

/// xbr-docs-conf - documentation build configuration for XBR
#[derive(Parser)]
#[command(name = "xbr-docs-conf")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Resolve and check the XBR documentation build configuration")]
struct Cli {
    /// Documentation directory
    #[arg(short = 'C', long, default_value = ".")]
    conf_dir: PathBuf,

    /// Package manifest (default: <conf-dir>/../package.json)
    #[arg(short, long)]
    manifest: Option<PathBuf>,

    /// Fail instead of using a placeholder when the manifest has no version
    #[arg(long)]
    require_version: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved configuration
    Show {
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Check the docs directory against the configuration
    Check,

    /// List the source documents that will be built
    Sources,

    /// Render a source file to HTML with the registered lexers
    Highlight {
        file: PathBuf,

        /// Language to use instead of guessing from the file name
        #[arg(short, long)]
        language: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

fn load_config(cli: &Cli) -> Result<DocsConfig> {
    let manifest = cli
        .manifest
        .clone()
        .unwrap_or_else(|| cli.conf_dir.join("..").join("package.json"));
    let policy = if cli.require_version {
        VersionPolicy::Require
    } else {
        VersionPolicy::Placeholder
    };

    DocsConfig::load(&manifest, policy)
        .with_context(|| format!("Failed to resolve configuration from {}", manifest.display()))
}

fn show(config: &DocsConfig, format: OutputFormat) -> Result<()> {
    let rendered = match format {
        OutputFormat::Json => config.to_json()?,
        OutputFormat::Yaml => config.to_yaml()?,
    };
    println!("{}", rendered);
    Ok(())
}

fn check(conf_dir: &Path, config: &DocsConfig) -> Result<bool> {
    let issues = check_config(conf_dir, config)?;

    for issue in &issues {
        match issue.severity {
            IssueSeverity::Error => error!("{}: {}", issue.key, issue.message),
            IssueSeverity::Warning => warn!("{}: {}", issue.key, issue.message),
            IssueSeverity::Info => info!("{}: {}", issue.key, issue.message),
        }
    }

    if issues.is_empty() {
        println!("Configuration OK");
    } else {
        println!("{} issue(s) found", issues.len());
    }
    Ok(!has_errors(&issues))
}

fn sources(conf_dir: &Path, config: &DocsConfig) -> Result<()> {
    for document in discover_sources(conf_dir, config)? {
        println!("{}\t{:?}", document.docname, document.kind);
    }
    Ok(())
}

fn highlight(config: &DocsConfig, file: &Path, language: Option<&str>) -> Result<()> {
    let mut registry = LexerRegistry::new();
    register_lexers(&mut registry);

    let highlighter = Highlighter::new(&registry, &config.pygments_style)?;
    let code = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let html = match language {
        Some(language) => highlighter.highlight(&code, Some(language)),
        None => highlighter.highlight_file(file, &code),
    };
    print!("{}", html);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Show { format } => show(&config, *format)?,
        Commands::Check => {
            if !check(&cli.conf_dir, &config)? {
                std::process::exit(1);
            }
        }
        Commands::Sources => sources(&cli.conf_dir, &config)?,
        Commands::Highlight { file, language } => {
            highlight(&config, file, language.as_deref())?
        }
    }

    Ok(())
}
