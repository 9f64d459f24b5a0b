//! `viewfit` library crate.
//!
//! Fits `y = (a + b·x) / (1 + c·x)` to YouTube view rate against video
//! duration. The binary (`viewfit`) is a thin wrapper around this library so
//! that core logic is testable without spawning processes.

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
