//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - fit inputs (`Sample`) and parameters (`RationalParams`)
//! - fit outputs (`FitResult`, `CurveFile`)
//! - video rows before and after reshaping (`VideoRecord`, `ProcessedVideo`)
//! - the run configuration (`FitConfig`)

pub mod types;

pub use types::*;
