//! Farkle combination rules.
//!
//! This crate is the single authoritative implementation of the scoring
//! rules. The turn engine commits a Keep through [`selection_score`], the
//! roll pipeline checks a fresh roll through [`is_farkle`], and any
//! client-side "is this die worth selecting" preview goes through
//! [`is_scoring_face`] — all three share one set of combination checks,
//! so a selection that previews as legal always commits at the same value.
//!
//! Faces are plain `u8` values in `1..=6`; callers own face generation
//! and range enforcement.

mod farkle;
mod scoring;

pub use farkle::is_farkle;
pub use scoring::{is_scoring_face, selection_score};
