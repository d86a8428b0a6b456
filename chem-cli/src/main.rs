//! # chemsketch
//!
//! Command-line entry point.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use chem_ai::GeminiClient;
use chem_cli::{
    export_result, load_result, load_strokes, CliArgs, CliConfig, Command, ExportFailed, Session,
    ThemeAction,
};
use chem_core::{AnalysisOutcome, FilePreferenceStore, StillImage, ThemeManager};
use chem_renderer::{ResultView, StrokeCanvas, SurfaceConfig};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,chem_cli=debug,chem_ai=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true);

    // JSON logs with RUST_LOG_FORMAT=json
    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_tracing();

    let args = CliArgs::parse();
    let config = CliConfig::from(&args);
    tracing::debug!("Configuration: {:?}", config);

    let theme = ThemeManager::initialise(
        Box::new(FilePreferenceStore::new(&config.prefs_path)),
        config.system_theme,
    );

    match args.command {
        Command::Analyze {
            text,
            image,
            strokes,
            level,
            pdf,
            preview,
            json,
            width,
            height,
        } => {
            let backend = GeminiClient::new(config.analyzer.clone())
                .context("Failed to create analysis client")?;
            let mut session = Session::new(Arc::new(backend), theme, width, height)?;
            session.set_level(level);

            if let Some(path) = strokes {
                let script = load_strokes(&path)
                    .with_context(|| format!("Failed to read strokes from {}", path.display()))?;
                session.replay(&script);
            }
            if let Some(text) = text {
                session.set_query(&text);
            }
            let image = match image {
                Some(path) => Some(StillImage::from_bytes(
                    fs::read(&path)
                        .with_context(|| format!("Failed to read image {}", path.display()))?,
                )),
                None => None,
            };

            let outcome = session.submit_with(image).await.clone();
            match outcome {
                AnalysisOutcome::Succeeded(result) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(result.as_ref())?);
                    } else {
                        println!("{}", ResultView::from_result(&result).to_text());
                    }
                }
                AnalysisOutcome::Failed(category) => {
                    eprintln!("{}", category.user_message());
                    return Ok(ExitCode::FAILURE);
                }
                AnalysisOutcome::Idle | AnalysisOutcome::Pending => {
                    tracing::warn!("Analysis did not complete");
                    return Ok(ExitCode::FAILURE);
                }
            }

            if let Some(path) = preview {
                let png = session.preview_png()?;
                fs::write(&path, png)
                    .with_context(|| format!("Failed to write preview {}", path.display()))?;
            }
            if let Some(target) = pdf {
                return Ok(report_export(session.export_document(&target)));
            }
        }

        Command::Sketch {
            strokes,
            out,
            width,
            height,
        } => {
            let script = load_strokes(&strokes)
                .with_context(|| format!("Failed to read strokes from {}", strokes.display()))?;
            let mut canvas = StrokeCanvas::new(width, height, SurfaceConfig::default())?;
            for event in &script.events {
                canvas.handle_event(event, &script.rect);
            }
            if !canvas.has_ink() {
                println!("No content: nothing was drawn.");
                return Ok(ExitCode::FAILURE);
            }
            let wants_png = out
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
            let bytes = if wants_png {
                canvas.export_png()?
            } else {
                canvas
                    .export_still()?
                    .map(StillImage::into_bytes)
                    .unwrap_or_default()
            };
            fs::write(&out, &bytes)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            println!("{} ({} bytes)", out.display(), bytes.len());
        }

        Command::Render { result, out } => {
            let result = load_result(&result)
                .with_context(|| format!("Failed to read result {}", result.display()))?;
            return Ok(report_export(export_result(&result, &out)));
        }

        Command::Theme { action } => {
            let mut theme = theme;
            match action.unwrap_or(ThemeAction::Show) {
                ThemeAction::Show => println!("{}", theme.current()),
                ThemeAction::Toggle => {
                    let now = theme.toggle().context("Failed to save theme preference")?;
                    println!("{now}");
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn report_export(saved: Result<PathBuf, ExportFailed>) -> ExitCode {
    match saved {
        Ok(path) => {
            println!("Saved {}", path.display());
            ExitCode::SUCCESS
        }
        Err(notice) => {
            eprintln!("{notice}");
            ExitCode::FAILURE
        }
    }
}
