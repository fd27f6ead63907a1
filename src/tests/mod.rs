//! Scenario tests for the exporter.
//!
//! These tests drive the sampling engine and the HTTP surface against local
//! probe endpoints and in-memory pod listers.

mod cases_concurrency_test;
mod cases_scenario_test;

pub mod support;
