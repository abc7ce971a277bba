//! Race-series scoring for a running club
//!
//! Finisher names are resolved to roster members by [`race_series_common`];
//! this crate loads the CSV inputs, scores races, accumulates the series and
//! writes the standings files.

pub mod age_grading;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod matcher;
pub mod race;
pub mod roster;
pub mod runner;
pub mod scoring;
