//! # Chemsketch Core
//!
//! Data model shared by every Chemsketch front-end.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 chem-core                   │
//! ├─────────────────────────────────────────────┤
//! │  Analysis model   │  Interaction            │
//! │  - Levels         │  - Pointer/touch events │
//! │  - Request/Result │  - Coordinate mapping   │
//! │  - Error taxonomy │  - Controller state     │
//! ├─────────────────────────────────────────────┤
//! │  Still images     │  Preferences            │
//! │  - Format sniff   │  - Theme resolution     │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod analysis;
pub mod error;
pub mod event;
pub mod level;
pub mod state;
pub mod still;
pub mod theme;

pub use analysis::{AnalysisOutcome, AnalysisRequest, AnalysisResult, ErrorCategory, RequestId};
pub use error::{CoreError, CoreResult};
pub use event::{BoundingRect, InputEvent, Point, PointerPhase, TouchEvent, TouchPhase, TouchPoint};
pub use level::CurriculumLevel;
pub use state::{AppController, ExportTicket};
pub use still::{ImageFormat, StillImage};
pub use theme::{
    FilePreferenceStore, MemoryPreferenceStore, PreferenceStore, Theme, ThemeManager, THEME_KEY,
};

/// Chemsketch core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
