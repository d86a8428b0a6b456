//! One student's working session.
//!
//! Wires the controller to the drawing surface, the analysis backend, the
//! document exporter and the theme. All methods run on the caller's task;
//! the only suspension point is the outbound analysis call.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chem_ai::AnalysisBackend;
use chem_core::{
    AnalysisOutcome, AnalysisRequest, AnalysisResult, AppController, BoundingRect, CoreError,
    CurriculumLevel, ErrorCategory, InputEvent, StillImage, Theme, ThemeManager,
};
use chem_renderer::{
    DocumentExporter, RenderError, ResultView, StrokeCanvas, SurfaceConfig, ViewRenderer,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors from session setup and file handling.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Surface or rendering failure.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Controller or preference failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// File could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File contents are not the expected JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The only thing the student is told when an export fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Could not generate the PDF. Please try again.")]
pub struct ExportFailed;

/// Recorded input for the drawing surface.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrokeScript {
    /// Where the surface sat in the viewport when the events were recorded.
    #[serde(default)]
    pub rect: BoundingRect,
    /// Events in arrival order.
    pub events: Vec<InputEvent>,
}

/// Read a [`StrokeScript`] from disk. A bare JSON array of events is accepted too.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_strokes(path: &Path) -> Result<StrokeScript, SessionError> {
    let raw = fs::read_to_string(path)?;
    if raw.trim_start().starts_with('[') {
        let events: Vec<InputEvent> = serde_json::from_str(&raw)?;
        return Ok(StrokeScript {
            rect: BoundingRect::default(),
            events,
        });
    }
    Ok(serde_json::from_str(&raw)?)
}

/// Read a saved [`AnalysisResult`].
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not hold all
/// required fields.
pub fn load_result(path: &Path) -> Result<AnalysisResult, SessionError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// A working session.
pub struct Session {
    controller: AppController,
    canvas: StrokeCanvas,
    backend: Arc<dyn AnalysisBackend>,
    exporter: DocumentExporter,
    theme: ThemeManager,
    export_notice: Option<ExportFailed>,
}

impl Session {
    /// Create a session with a blank surface of the given size.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot be allocated.
    pub fn new(
        backend: Arc<dyn AnalysisBackend>,
        theme: ThemeManager,
        width: u32,
        height: u32,
    ) -> Result<Self, SessionError> {
        Ok(Self {
            controller: AppController::default(),
            canvas: StrokeCanvas::new(width, height, SurfaceConfig::default())?,
            backend,
            exporter: DocumentExporter::with_defaults(),
            theme,
            export_notice: None,
        })
    }

    /// Controller state.
    #[must_use]
    pub fn controller(&self) -> &AppController {
        &self.controller
    }

    /// Current outcome.
    #[must_use]
    pub fn outcome(&self) -> &AnalysisOutcome {
        self.controller.outcome()
    }

    /// Drawing surface.
    #[must_use]
    pub fn canvas(&self) -> &StrokeCanvas {
        &self.canvas
    }

    /// Mutable drawing surface, e.g. for clearing or resizing.
    pub fn canvas_mut(&mut self) -> &mut StrokeCanvas {
        &mut self.canvas
    }

    /// Update the typed compound name. Clears an active error.
    pub fn set_query(&mut self, query: &str) {
        self.controller.set_query(query);
    }

    /// Select the curriculum level.
    pub fn set_level(&mut self, level: CurriculumLevel) {
        self.controller.set_level(level);
    }

    /// Dismiss the active error, if any.
    pub fn dismiss_error(&mut self) {
        self.controller.dismiss_error();
    }

    /// Feed recorded input to the surface. Ignored while an analysis runs.
    pub fn replay(&mut self, script: &StrokeScript) {
        if !self.controller.input_enabled() {
            debug!("Input disabled; dropping {} events", script.events.len());
            return;
        }
        for event in &script.events {
            self.canvas.handle_event(event, &script.rect);
        }
        debug!(
            events = script.events.len(),
            has_ink = self.canvas.has_ink(),
            "Replayed strokes"
        );
    }

    /// Submit the sketch and the typed name.
    pub async fn submit(&mut self) -> &AnalysisOutcome {
        self.submit_with(None).await
    }

    /// Submit, sending `image` instead of the sketch when given.
    ///
    /// Empty input is rejected before anything is dispatched. While the
    /// request is in flight the surface ignores input.
    pub async fn submit_with(&mut self, image: Option<StillImage>) -> &AnalysisOutcome {
        if self.controller.is_processing() {
            warn!("Analysis already running; ignoring submit");
            return self.controller.outcome();
        }

        let image = match image {
            Some(image) => Some(image),
            None => match self.canvas.export_still() {
                Ok(still) => still,
                Err(e) => {
                    warn!("Could not export the sketch: {}", e);
                    self.controller.reject(ErrorCategory::Unknown(format!(
                        "Could not capture the drawing: {e}"
                    )));
                    return self.controller.outcome();
                }
            },
        };
        let query = self.controller.query().to_string();
        let text = Some(query.as_str()).filter(|q| !q.trim().is_empty());

        let request = match AnalysisRequest::new(image, text, self.controller.level()) {
            Ok(request) => request,
            Err(e) => {
                info!("Nothing to analyse: {}", e);
                self.controller.reject(ErrorCategory::from(&e));
                return self.controller.outcome();
            }
        };

        if let Err(e) = self.controller.begin_analysis() {
            warn!("{}", e);
            return self.controller.outcome();
        }
        self.canvas.set_enabled(false);
        info!(request_id = %request.id(), level = %request.level(), "Analysis started");

        let backend = Arc::clone(&self.backend);
        let result = backend
            .analyze(&request)
            .await
            .map_err(|e| e.category());

        self.controller.finish_analysis(result);
        self.canvas.set_enabled(true);
        self.controller.outcome()
    }

    /// Show a previously saved result as if it had just been analysed.
    pub fn restore(&mut self, result: AnalysisResult) {
        if self.controller.begin_analysis().is_ok() {
            self.controller.finish_analysis(Ok(result));
        }
    }

    /// View model of the current result.
    #[must_use]
    pub fn view(&self) -> Option<ResultView> {
        self.controller
            .outcome()
            .result()
            .map(|result| ResultView::from_result(result.as_ref()))
    }

    /// Active theme.
    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme.current()
    }

    /// Switch theme and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the preference cannot be written.
    pub fn toggle_theme(&mut self) -> Result<Theme, SessionError> {
        Ok(self.theme.toggle()?)
    }

    /// PNG preview of the current result in the active theme.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no result or rendering fails.
    pub fn preview_png(&self) -> Result<Vec<u8>, SessionError> {
        let view = self
            .view()
            .ok_or_else(|| CoreError::InvalidValue("no result to preview".to_string()))?;
        let renderer = ViewRenderer {
            theme: self.theme.current(),
            ..ViewRenderer::default()
        };
        Ok(renderer.render_png(&view)?)
    }

    /// The notice from the last failed export, if any.
    #[must_use]
    pub fn export_notice(&self) -> Option<ExportFailed> {
        self.export_notice
    }

    /// Export the current result as PDF.
    ///
    /// `target` is a directory (the file is named after the compound) or a
    /// file path. The document is written next to the target first and
    /// moved into place, so a failure never leaves a partial file.
    ///
    /// # Errors
    ///
    /// Every failure is logged and reduced to [`ExportFailed`].
    pub fn export_document(&mut self, target: &Path) -> Result<PathBuf, ExportFailed> {
        self.export_notice = None;

        let ticket = match self.controller.begin_export() {
            Ok(ticket) => ticket,
            Err(e) => {
                warn!("Export not started: {}", e);
                self.export_notice = Some(ExportFailed);
                return Err(ExportFailed);
            }
        };

        let view = ResultView::from_result(ticket.result());
        let written = write_document(&self.exporter, &view, target);
        self.controller.finish_export();

        match written {
            Ok(path) => {
                info!("Saved {}", path.display());
                Ok(path)
            }
            Err(e) => {
                warn!("Document export failed: {}", e);
                self.export_notice = Some(ExportFailed);
                Err(ExportFailed)
            }
        }
    }
}

/// Export a saved result as PDF without a session.
///
/// Used for results that are only reviewed, never analysed, so no backend
/// or drawing surface is involved. `target` follows the same rules as
/// [`Session::export_document`].
///
/// # Errors
///
/// Every failure is logged and reduced to [`ExportFailed`].
pub fn export_result(result: &AnalysisResult, target: &Path) -> Result<PathBuf, ExportFailed> {
    let view = ResultView::from_result(result);
    write_document(&DocumentExporter::with_defaults(), &view, target).map_err(|e| {
        warn!("Document export failed: {}", e);
        ExportFailed
    })
}

fn write_document(
    exporter: &DocumentExporter,
    view: &ResultView,
    target: &Path,
) -> Result<PathBuf, SessionError> {
    let document = exporter.export(view)?;
    let path = if target.is_dir() {
        target.join(&document.filename)
    } else {
        target.to_path_buf()
    };

    let mut partial = path.clone().into_os_string();
    partial.push(".part");
    let partial = PathBuf::from(partial);

    let saved = fs::write(&partial, &document.bytes).and_then(|()| fs::rename(&partial, &path));
    if let Err(e) = saved {
        let _ = fs::remove_file(&partial);
        return Err(e.into());
    }
    debug!(
        pages = document.page_count,
        bytes = document.bytes.len(),
        "Document written"
    );
    Ok(path)
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("controller", &self.controller)
            .field("theme", &self.theme)
            .field("has_ink", &self.canvas.has_ink())
            .finish_non_exhaustive()
    }
}
