//! veo-studio library crate.
//!
//! Generates videos from text prompts (and optional reference images) with
//! Google Veo, then saves and shares the results.

pub mod cli;
pub mod config;
pub mod presenter;
pub mod session;
pub mod studio;
pub mod theme;
pub mod veo;
