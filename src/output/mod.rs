//! Output report structures and writers

pub mod report;
