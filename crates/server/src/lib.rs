//! Insurance cost prediction server
//!
//! Serves the prediction form page backed by a single estimator loaded at
//! startup, plus health and metrics endpoints.

pub mod api;
pub mod config;
pub mod form;
