//! Threshold relaxation (verb)
//!
//! When a query matches nothing, numeric thresholds are loosened a little at
//! a time until something matches or the round budget runs out.

mod strategy;

pub use strategy::{eligible_thresholds, relax, widen, Relaxed, RelaxationEntry};
