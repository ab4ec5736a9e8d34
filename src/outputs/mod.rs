//! Output generation for search results.
//!
//! # Submodules
//!
//! - [`json`]: Writes a `SearchResult` to a JSON file
//! - [`listing`]: Renders results as a labelled plain-text list
//! - [`script`]: Builds the short video script from the findings

pub mod json;
pub mod listing;
pub mod script;
