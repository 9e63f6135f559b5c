//! Movie catalog
//!
//! The catalog is the only component that mutates state. It validates
//! requests, writes through to the document store, and keeps the in-memory
//! mirror and its genre/rating index consistent with the store.

mod errors;
mod movie;
mod service;

pub use errors::{CatalogError, CatalogResult, ErrorResponse};
pub use movie::{parse_leading_int, CreateMovieRequest, FilterQuery, Movie, NewMovie, Rating};
pub use service::{Catalog, SharedStore};
