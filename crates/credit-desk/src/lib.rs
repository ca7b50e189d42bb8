//! Core library for the credit dispute drafting service.
//!
//! The two load-bearing pieces are the tri-bureau tradeline comparator
//! ([`disputes::comparator`]) and the dispute wizard state machine
//! ([`disputes::wizard`]), which drives an external AI text-generation
//! collaborator ([`disputes::collaborator`]) through analysis and
//! letter-drafting calls.

pub mod bureaus;
pub mod config;
pub mod disputes;
pub mod error;
pub mod telemetry;
