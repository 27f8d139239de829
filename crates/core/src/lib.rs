//! Shared leaf types for the audiofetch backend.
//!
//! This crate holds the pieces every other component agrees on: which source
//! URLs are acceptable ([`source::SourcePattern`]) and what a finished audio
//! artifact looks like on disk ([`format::AudioFormat`]).

pub mod format;
pub mod source;

pub use format::AudioFormat;
pub use source::{SourcePattern, SourcePatternError};
