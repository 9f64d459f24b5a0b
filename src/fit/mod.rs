//! Curve fitting.
//!
//! Responsibilities:
//!
//! - run Levenberg–Marquardt on the rational model (`lm`, `fitter`)
//! - retry over a grid of initial guesses (`guess_grid`, `multistart`)
//! - classify failures (`error`)

pub mod error;
pub mod fitter;
pub mod guess_grid;
pub mod lm;
pub mod multistart;

pub use error::*;
pub use fitter::*;
pub use guess_grid::*;
pub use lm::*;
pub use multistart::*;
