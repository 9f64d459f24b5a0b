//! Response-curve model implementation.
//!
//! The model is a small set of pure functions so that fitting, reporting, and
//! plotting code all evaluate it the same way.

pub mod rational;

pub use rational::*;
