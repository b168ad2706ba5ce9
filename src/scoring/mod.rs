//! Multi-criteria compatibility scoring.
//!
//! Turns crossmatch verdicts plus blood groups into a per-group
//! [`scorer::DetailedScore`] and a scalar total per donor-recipient edge.
//! The group-score mapping is a configurable strategy
//! ([`crate::core::config::ScoringWeights`]); the default awards 3/2/1
//! points per donor antigen matched in the recipient typing at
//! high-res/split/broad specificity.

pub mod scorer;

pub use scorer::{CompatibilityScorer, DetailedScore, GroupScore};
