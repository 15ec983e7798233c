//! Output of finished crawls.
//!
//! - [`json`]: writes the league tree to a dated JSON file

pub mod json;
