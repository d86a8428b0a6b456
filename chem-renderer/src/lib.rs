//! # Chemsketch Renderer
//!
//! Raster side of Chemsketch: the freehand drawing surface the student
//! sketches on, and the presentation of analysis results.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐  export_still   ┌──────────────┐
//! │ StrokeCanvas │ ──────────────> │  StillImage  │ ──> analysis request
//! └──────────────┘                 └──────────────┘
//!
//! ┌──────────────┐  render_svg     ┌──────────────┐  paginate  ┌─────┐
//! │  ResultView  │ ──────────────> │  resvg pixmap│ ─────────> │ PDF │
//! └──────────────┘                 └──────────────┘            └─────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
#[cfg(feature = "export")]
pub mod export;
pub mod surface;
pub mod view;

pub use error::{RenderError, RenderResult};
#[cfg(feature = "export")]
pub use export::{DocumentExporter, ExportConfig, ExportedDocument, PageBand};
pub use surface::{StrokeCanvas, SurfaceConfig, Tool};
pub use view::{Palette, ResultView, Section, SectionBody, SectionKind, ViewRenderer};
