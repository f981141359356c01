//! Course catalog search service.
//!
//! Translates catalog search requests into search engine queries and shapes
//! the engine hits into paginated responses. The `data` feature exposes the
//! engine-agnostic core; `server` adds the HTTP API and the Elasticsearch adapter.

#[cfg(feature = "server")]
use std::time::Duration;

#[cfg(feature = "server")]
use actix_cors::Cors;
#[cfg(feature = "server")]
use actix_web::{App, HttpServer, middleware, web};

#[cfg(feature = "server")]
use crate::models::config::ServerConfig;
#[cfg(feature = "server")]
use crate::repository::elasticsearch::ElasticsearchRepository;

pub mod domain;
#[cfg(feature = "server")]
pub mod dto;
mod error_conversions;
#[cfg(feature = "server")]
pub mod forms;
#[cfg(feature = "server")]
pub mod models;
pub mod pagination;
pub mod repository;
#[cfg(feature = "server")]
pub mod routes;
pub mod services;

/// Builds and runs the Actix-Web HTTP server using the provided configuration.
#[cfg(feature = "server")]
pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
    let repo = ElasticsearchRepository::new(
        &server_config.elasticsearch_url,
        &server_config.elasticsearch_index,
        Duration::from_secs(server_config.request_timeout_secs),
    )
    .map_err(|e| std::io::Error::other(format!("Failed to build search engine client: {e}")))?;
    let repo = web::Data::new(repo);

    log::info!(
        "Searching index `{}` at {}",
        server_config.elasticsearch_index,
        server_config.elasticsearch_url
    );

    let bind_address = (server_config.address.clone(), server_config.port);
    log::info!("Listening on {}:{}", bind_address.0, bind_address.1);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .app_data(repo.clone())
            .configure(routes::configure::<ElasticsearchRepository>)
    })
    .bind(bind_address)?
    .run()
    .await
}
