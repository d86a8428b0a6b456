//! # Chemsketch AI
//!
//! Builds and dispatches analysis requests to a hosted generative-language
//! service and turns the reply into an [`AnalysisResult`](chem_core::AnalysisResult).
//!
//! ## Request flow
//!
//! ```text
//! AnalysisRequest ──> build_prompt(level) ──┐
//!        │                                  ├──> GenerateContentRequest ──POST──> backend
//!        └──> StillImage (base64, sniffed) ─┘                                       │
//!                                                                                   v
//! AnalysisResult <── parse_response <── status + body ───────────────────────────────┘
//! ```
//!
//! Each call issues exactly one request. Nothing is retried.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod classify;
pub mod client;
pub mod error;
pub mod prompt;
pub mod schema;
pub mod wire;

pub use classify::{classify, classify_status};
pub use client::{parse_response, AnalysisBackend, AnalyzerConfig, GeminiClient};
pub use error::{AiResult, AnalysisError};
pub use prompt::build_prompt;
pub use schema::response_schema;
