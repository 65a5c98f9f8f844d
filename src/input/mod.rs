//! Input handling: document discovery, span extraction, analysis input spec

pub mod manager;
pub mod span_extractor;
pub mod spec;
