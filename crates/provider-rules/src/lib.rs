//! Credentialing rule engine for healthcare provider records.
//!
//! The [`rules`] module evaluates a fixed registry of business rules against a
//! provider fact set; [`providers`] holds the fact model and the registry-side
//! collaborators (storage, normalisation, duplicate matching) the engine leans on.

pub mod config;
pub mod error;
pub mod providers;
pub mod roster;
pub mod rules;
pub mod telemetry;
