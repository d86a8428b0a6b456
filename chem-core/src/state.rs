//! Application controller state.
//!
//! The controller is the single owner of the analysis outcome. Every
//! transition replaces the outcome wholesale; nothing is merged in place.

use std::sync::Arc;

use crate::analysis::{AnalysisOutcome, AnalysisResult, ErrorCategory};
use crate::error::{CoreError, CoreResult};
use crate::level::CurriculumLevel;

/// Permission to run one document export for a specific result.
#[derive(Debug, Clone)]
pub struct ExportTicket {
    result: Arc<AnalysisResult>,
}

impl ExportTicket {
    /// The result being exported.
    #[must_use]
    pub fn result(&self) -> &AnalysisResult {
        &self.result
    }
}

/// Top-level controller owning the outcome and the busy flags.
#[derive(Debug, Clone, Default)]
pub struct AppController {
    outcome: AnalysisOutcome,
    processing: bool,
    generating: bool,
    level: CurriculumLevel,
    query: String,
}

impl AppController {
    /// Create a controller with the given starting level.
    #[must_use]
    pub fn new(level: CurriculumLevel) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }

    /// Current outcome.
    #[must_use]
    pub fn outcome(&self) -> &AnalysisOutcome {
        &self.outcome
    }

    /// Selected curriculum level.
    #[must_use]
    pub fn level(&self) -> CurriculumLevel {
        self.level
    }

    /// Change the curriculum level.
    pub fn set_level(&mut self, level: CurriculumLevel) {
        self.level = level;
    }

    /// Current typed query.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Update the typed query. Typing clears an active error.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.dismiss_error();
    }

    /// Clear an active error, returning to idle.
    pub fn dismiss_error(&mut self) {
        if matches!(self.outcome, AnalysisOutcome::Failed(_)) {
            self.outcome = AnalysisOutcome::Idle;
        }
    }

    /// Whether an analysis is in flight.
    #[must_use]
    pub fn is_processing(&self) -> bool {
        self.processing
    }

    /// Whether a document export is in flight.
    #[must_use]
    pub fn is_generating(&self) -> bool {
        self.generating
    }

    /// Whether the drawing surface and submit controls accept input.
    #[must_use]
    pub fn input_enabled(&self) -> bool {
        !self.processing
    }

    /// Mark an analysis as dispatched.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Busy`] if another analysis is still pending.
    pub fn begin_analysis(&mut self) -> CoreResult<()> {
        if self.processing {
            return Err(CoreError::Busy("an analysis is already running".to_string()));
        }
        self.processing = true;
        self.outcome = AnalysisOutcome::Pending;
        Ok(())
    }

    /// Record the result of the in-flight analysis.
    pub fn finish_analysis(&mut self, result: Result<AnalysisResult, ErrorCategory>) {
        if !self.processing {
            tracing::warn!("analysis finished while none was pending; ignoring");
            return;
        }
        self.processing = false;
        self.outcome = match result {
            Ok(result) => AnalysisOutcome::Succeeded(Arc::new(result)),
            Err(category) => AnalysisOutcome::Failed(category),
        };
    }

    /// Record a failure caught before dispatch (e.g. empty input).
    pub fn reject(&mut self, category: ErrorCategory) {
        if self.processing {
            tracing::warn!("rejecting input while an analysis is pending; ignoring");
            return;
        }
        self.outcome = AnalysisOutcome::Failed(category);
    }

    /// Start a document export of the current result.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Busy`] if an export is already running and
    /// [`CoreError::InvalidValue`] if there is no result to export.
    pub fn begin_export(&mut self) -> CoreResult<ExportTicket> {
        if self.generating {
            return Err(CoreError::Busy("an export is already running".to_string()));
        }
        let result = self
            .outcome
            .result()
            .cloned()
            .ok_or_else(|| CoreError::InvalidValue("no result to export".to_string()))?;
        self.generating = true;
        Ok(ExportTicket { result })
    }

    /// Release the export slot.
    pub fn finish_export(&mut self) {
        self.generating = false;
    }
}
