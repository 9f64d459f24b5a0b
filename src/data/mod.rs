//! Data acquisition and reshaping.
//!
//! - `youtube`: video metadata from the YouTube Data API
//! - `duration`: duration string parsing
//! - `views`: views-per-month derivation
//! - `synth`: seeded synthetic samples

pub mod duration;
pub mod synth;
pub mod views;
pub mod youtube;

pub use duration::*;
pub use synth::*;
pub use views::*;
pub use youtube::{YouTubeClient, YouTubeConfig};
