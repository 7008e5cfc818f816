//! Voice Ledger - single-session expense logger with voice-filled descriptions
//!
//! The [`ledger`] module is the core: records, validation, filtering and
//! per-category summaries. Everything else feeds it or presents it.

/// Configuration management
pub mod config;
/// Expense records, filters and summaries
pub mod ledger;
/// Text rendering of summaries and listings
pub mod render;
/// Interactive command session
pub mod session;
/// Logging setup
pub mod telemetry;
/// Speech-to-text for expense descriptions
pub mod transcription;
