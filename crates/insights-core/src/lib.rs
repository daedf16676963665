//! Core domain types for jira-insights.
//!
//! Holds the issue model, the shared error type, settings/configuration
//! handling, and the elapsed-day calculator used by the aggregation layer.

pub mod duration;
pub mod error;
pub mod models;
pub mod settings;
