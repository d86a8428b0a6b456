//! # Chemsketch CLI
//!
//! Command-line host for Chemsketch. Replays recorded pen or touch input
//! onto the drawing surface, sends the sketch and/or a typed compound name
//! for analysis, prints the result and exports it as a paginated PDF.
//!
//! ## Usage
//!
//! ```bash
//! GEMINI_API_KEY=... chemsketch analyze --text Benzene --level board --pdf out/
//! chemsketch sketch --strokes ring.json --out ring.jpg
//! chemsketch render --result benzene.json --out benzene.pdf
//! chemsketch theme toggle
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - command-line arguments parsed with clap
//! - `CliConfig` - analyzer, preference and theme settings
//! - `Session` - owns the controller, drawing surface, backend and exporter

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod session;

pub use session::{
    export_result, load_result, load_strokes, ExportFailed, Session, SessionError, StrokeScript,
};

use std::path::PathBuf;
use std::time::Duration;

use chem_ai::AnalyzerConfig;
use chem_core::{CurriculumLevel, Theme};
use clap::{Parser, Subcommand};

/// Default preference file, relative to the working directory.
pub const DEFAULT_PREFS_PATH: &str = ".chemsketch/preferences.json";

/// Command-line arguments for chemsketch.
#[derive(Debug, Clone, Parser)]
#[command(name = "chemsketch")]
#[command(about = "Sketch a molecule, get a curriculum-aware explanation")]
#[command(version)]
pub struct CliArgs {
    /// API key for the generative-language service
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Model name
    #[arg(long, env = "CHEMSKETCH_MODEL", default_value = chem_ai::client::DEFAULT_MODEL, global = true)]
    pub model: String,

    /// Service root URL
    #[arg(long, env = "CHEMSKETCH_ENDPOINT", default_value = chem_ai::client::DEFAULT_ENDPOINT, global = true)]
    pub endpoint: String,

    /// Request timeout in seconds
    #[arg(long, env = "CHEMSKETCH_TIMEOUT_SECS", default_value = "60", global = true)]
    pub timeout_secs: u64,

    /// Preference file holding the theme choice
    #[arg(long, env = "CHEMSKETCH_PREFS", default_value = DEFAULT_PREFS_PATH, global = true)]
    pub prefs: PathBuf,

    /// System colour scheme, used when no theme has been stored
    #[arg(long, env = "CHEMSKETCH_SYSTEM_THEME", global = true)]
    pub system_theme: Option<Theme>,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Analyse a sketch and/or a compound name
    Analyze {
        /// Compound name typed by the student
        #[arg(long)]
        text: Option<String>,

        /// Existing JPEG or PNG to send instead of the replayed sketch
        #[arg(long)]
        image: Option<PathBuf>,

        /// Recorded input events to replay onto the drawing surface
        #[arg(long)]
        strokes: Option<PathBuf>,

        /// Curriculum level: foundation, board, competitive or undergraduate
        #[arg(long, default_value = "board")]
        level: CurriculumLevel,

        /// Export the result as PDF to this file or directory
        #[arg(long)]
        pdf: Option<PathBuf>,

        /// Write a PNG preview of the result in the active theme
        #[arg(long)]
        preview: Option<PathBuf>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Drawing surface width in pixels
        #[arg(long, default_value = "600")]
        width: u32,

        /// Drawing surface height in pixels
        #[arg(long, default_value = "400")]
        height: u32,
    },

    /// Replay recorded input and write the exported still
    Sketch {
        /// Recorded input events
        #[arg(long)]
        strokes: PathBuf,

        /// Output image: PNG when the name ends in `.png`, JPEG otherwise
        #[arg(long)]
        out: PathBuf,

        /// Drawing surface width in pixels
        #[arg(long, default_value = "600")]
        width: u32,

        /// Drawing surface height in pixels
        #[arg(long, default_value = "400")]
        height: u32,
    },

    /// Export a saved result as PDF
    Render {
        /// Result JSON as printed by `analyze --json`
        #[arg(long)]
        result: PathBuf,

        /// Output file or directory
        #[arg(long)]
        out: PathBuf,
    },

    /// Show or toggle the colour theme
    Theme {
        /// Action
        #[command(subcommand)]
        action: Option<ThemeAction>,
    },
}

/// Theme subcommands.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ThemeAction {
    /// Print the active theme
    Show,
    /// Switch between light and dark and remember the choice
    Toggle,
}

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Analyzer client settings.
    pub analyzer: AnalyzerConfig,
    /// Preference file.
    pub prefs_path: PathBuf,
    /// System colour scheme, if known.
    pub system_theme: Option<Theme>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            analyzer: AnalyzerConfig::default(),
            prefs_path: PathBuf::from(DEFAULT_PREFS_PATH),
            system_theme: None,
        }
    }
}

impl From<&CliArgs> for CliConfig {
    fn from(args: &CliArgs) -> Self {
        Self {
            analyzer: AnalyzerConfig {
                api_key: args.api_key.clone(),
                model: args.model.clone(),
                endpoint: args.endpoint.clone(),
                timeout: Duration::from_secs(args.timeout_secs),
            },
            prefs_path: args.prefs.clone(),
            system_theme: args.system_theme,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_args() {
        let args = CliArgs::parse_from([
            "chemsketch",
            "--api-key",
            "k",
            "analyze",
            "--text",
            "Benzene",
            "--level",
            "Competitive",
        ]);
        match &args.command {
            Command::Analyze { text, level, json, .. } => {
                assert_eq!(text.as_deref(), Some("Benzene"));
                assert_eq!(*level, CurriculumLevel::Competitive);
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let config = CliConfig::from(&args);
        assert_eq!(config.analyzer.api_key.as_deref(), Some("k"));
        assert_eq!(config.analyzer.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = CliArgs::parse_from([
            "chemsketch",
            "theme",
            "toggle",
            "--prefs",
            "/tmp/p.json",
            "--system-theme",
            "dark",
        ]);
        assert!(matches!(
            args.command,
            Command::Theme {
                action: Some(ThemeAction::Toggle)
            }
        ));
        let config = CliConfig::from(&args);
        assert_eq!(config.prefs_path, PathBuf::from("/tmp/p.json"));
        assert_eq!(config.system_theme, Some(Theme::Dark));
    }

    #[test]
    fn test_bad_level_rejected() {
        let parsed = CliArgs::try_parse_from(["chemsketch", "analyze", "--level", "phd"]);
        assert!(parsed.is_err());
    }
}
