//! Shared utilities for comorbidity crates.
//!
//! Frames coming back from the external scorer are loosely typed: category
//! flags may arrive as booleans, integers, floats or `"TRUE"` strings, and
//! patient ids may be read as numbers. These helpers normalize single cells.

pub mod cells;

pub use cells::{
    any_to_count, any_to_f64, any_to_string, format_numeric, parse_count, parse_f64,
};
