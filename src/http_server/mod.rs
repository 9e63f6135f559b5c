//! # HTTP Server Module
//!
//! JSON API consumed by the browser client.
//!
//! # Endpoints
//!
//! - `/movies` - Create and list movies
//! - `/movies/filter` - Filter by genre or rating
//! - `/movies/:id` - Delete a movie
//! - `/health` - Health check
//! - `/observability/*` - Health and counters

pub mod config;
pub mod movie_routes;
pub mod observability_routes;
pub mod server;

pub use config::HttpServerConfig;
pub use server::HttpServer;
