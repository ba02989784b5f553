//! Axes shortcut parsing (verb)
//!
//! Recognises "revenue against segment" style requests and turns them into
//! a query plus a chart without going through a planner.

mod shortcut;

pub use shortcut::{split_axes, AxesShortcut};
