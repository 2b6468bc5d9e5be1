//! Directory engine for Zimbabwean health facilities.
//!
//! Loads a facility dataset from an ordered list of sources (falling back to
//! a compiled-in snapshot), classifies facilities into tiers, and answers
//! filter / sort queries for the desktop presenter in `main.rs`.

pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod location;
pub mod state;
