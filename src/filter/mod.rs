//! Filter evaluation (verb)
//!
//! Applies ANDed predicates to a dataset, widening numeric text literals
//! on numeric columns.

mod error;
mod eval;
mod literal;

pub use error::FilterError;
pub use eval::{apply, apply_with, bind, BoundPredicate};
pub use literal::{numeric_literal, parse_numeric_text};
