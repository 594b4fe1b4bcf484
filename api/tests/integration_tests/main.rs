//! Integration tests for the Seriesjoin API.
//!
//! These tests drive the complete router: batch parsing, data source
//! resolution, concurrent fetching, alignment and CSV output.

mod common;
mod datasource_tests;
mod export_tests;
mod health_tests;
