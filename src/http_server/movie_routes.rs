//! Movie HTTP Routes
//!
//! - `POST   /movies`         create, 201 with the stored movie
//! - `GET    /movies`         full list
//! - `GET    /movies/filter`  `?genre=` or `?rating=`
//! - `DELETE /movies/:id`     remove, 200 with a message

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde::Serialize;

use crate::catalog::{Catalog, CatalogError, CreateMovieRequest, FilterQuery, Movie};

pub const REMOVED_MESSAGE: &str = "Filme removido com sucesso.";

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub fn movie_routes(catalog: Arc<Catalog>) -> Router {
    Router::new()
        .route("/movies", get(list_handler).post(create_handler))
        .route("/movies/filter", get(filter_handler))
        .route("/movies/:id", delete(delete_handler))
        .with_state(catalog)
}

async fn create_handler(
    State(catalog): State<Arc<Catalog>>,
    body: Result<Json<CreateMovieRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Movie>), CatalogError> {
    let Json(request) = body.map_err(|_| CatalogError::invalid_body())?;
    let movie = catalog.create(request).await?;
    Ok((StatusCode::CREATED, Json(movie)))
}

async fn list_handler(State(catalog): State<Arc<Catalog>>) -> Json<Vec<Movie>> {
    Json(catalog.list().await)
}

async fn delete_handler(
    State(catalog): State<Arc<Catalog>>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<MessageResponse>, CatalogError> {
    let Path(id) = id.map_err(|_| CatalogError::invalid_params())?;
    catalog.delete(&id).await?;
    Ok(Json(MessageResponse {
        message: REMOVED_MESSAGE.to_string(),
    }))
}

async fn filter_handler(
    State(catalog): State<Arc<Catalog>>,
    query: Result<Query<FilterQuery>, QueryRejection>,
) -> Result<Json<Vec<Movie>>, CatalogError> {
    let Query(query) = query.map_err(|_| CatalogError::invalid_params())?;
    Ok(Json(catalog.filter(&query).await?))
}
