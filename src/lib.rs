//! Emergency reporting and triage service.
//!
//! Free-text emergency reports are classified into `low`, `medium` or
//! `high` priority by a rule-based classifier ([`triage`]), stored
//! ([`state`]), and served to reporters and responders over HTTP ([`api`]).

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod processing;
pub mod state;
pub mod triage;

pub use error::{AppError, Result};
