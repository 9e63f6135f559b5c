//! # HTTP Server
//!
//! Combines the movie, health and observability routers behind one CORS
//! layer and serves them.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use super::config::HttpServerConfig;
use super::movie_routes::movie_routes;
use super::observability_routes::{health_routes, observability_routes};
use crate::catalog::Catalog;
use crate::observability::{log_event, Event, Logger};

pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self::with_config(HttpServerConfig::default(), catalog)
    }

    pub fn with_config(config: HttpServerConfig, catalog: Arc<Catalog>) -> Self {
        let router = Self::build_router(&config, catalog);
        Self { config, router }
    }

    fn build_router(config: &HttpServerConfig, catalog: Arc<Catalog>) -> Router {
        let metrics = catalog.metrics_handle();

        Router::new()
            .merge(health_routes())
            .nest("/observability", observability_routes(metrics))
            .merge(movie_routes(catalog))
            .layer(Self::cors_layer(config))
    }

    fn cors_layer(config: &HttpServerConfig) -> CorsLayer {
        let origin = if config.cors_origins.is_empty() {
            AllowOrigin::any()
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|origin| match origin.parse::<HeaderValue>() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        Logger::warn(
                            Event::ConfigLoaded,
                            &[("ignored_cors_origin", origin.as_str())],
                        );
                        None
                    }
                })
                .collect();
            AllowOrigin::list(origins)
        };

        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any)
    }

    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// The assembled router, for driving requests in tests
    pub fn router(self) -> Router {
        self.router
    }

    pub async fn start(self) -> io::Result<()> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid socket address {}: {}", self.config.socket_addr(), e),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        let bound = listener.local_addr()?.to_string();
        log_event(Event::Serving, &[("addr", bound.as_str())]);

        axum::serve(listener, self.router).await?;

        log_event(Event::Shutdown, &[]);
        Ok(())
    }
}
