//! Core processing components

pub mod analyzer;
pub mod classifier;
pub mod document;
pub mod embeddings;
pub mod ranker;
pub mod scorer;
pub mod segmenter;
