//! API route definitions.
//!
//! This module organizes all HTTP routes for the Seriesjoin API server.

mod datasources;
mod export;
mod health;

pub use datasources::datasource_routes;
pub use export::export_routes;
pub use health::health_routes;
