//! Catalog service
//!
//! Owns the store, the in-memory mirror of every movie, and the genre/rating
//! index over that mirror. One instance per process, shared with the HTTP
//! layer behind an `Arc`.
//!
//! # Consistency
//!
//! After a mutation returns `Ok`, mirror and index hold exactly the live
//! documents of the store. The mirror is touched only after the store write
//! succeeded. The whole `store -> mirror -> index` sequence runs under the
//! write lock, so concurrent creates and deletes are serialized and readers
//! never see a mirror that disagrees with its index.
//!
//! Store calls block on fsync, so they run on the blocking pool while the
//! write lock is held.
//!
//! If the startup load fails, the catalog serves empty and refuses every
//! mutation. Nothing is ever appended behind a record the load could not read.

use std::sync::{Arc, Mutex};

use tokio::sync::RwLock;

use crate::index::MovieIndex;
use crate::observability::{log_event, Event, Logger, MetricsRegistry};
use crate::storage::{DocumentStore, StorageError, StorageResult};

use super::errors::{CatalogError, CatalogResult};
use super::movie::{CreateMovieRequest, FilterQuery, Movie, NewMovie, Rating};

/// Store handle as held by the catalog
pub type SharedStore = Box<dyn DocumentStore + Send + Sync>;

struct CatalogState {
    movies: Vec<Movie>,
    index: MovieIndex,
}

impl CatalogState {
    fn rebuild_index(&mut self) {
        self.index.rebuild(&self.movies);
    }

    fn collect(&self, positions: &[usize]) -> Vec<Movie> {
        positions
            .iter()
            .filter_map(|&position| self.movies.get(position).cloned())
            .collect()
    }
}

pub struct Catalog {
    store: Arc<Mutex<SharedStore>>,
    state: RwLock<CatalogState>,
    /// Why the startup load failed; mutations are refused while set
    load_failure: Option<String>,
    metrics: Arc<MetricsRegistry>,
}

impl Catalog {
    /// Loads every movie from `store` and builds the index.
    ///
    /// A failed load is logged and leaves the catalog empty and read-only;
    /// it does not prevent the catalog from serving.
    pub fn load<S>(store: S) -> Self
    where
        S: DocumentStore + Send + Sync + 'static,
    {
        Self::load_boxed(Box::new(store))
    }

    pub fn load_boxed(mut store: SharedStore) -> Self {
        let metrics = Arc::new(MetricsRegistry::new());

        let (movies, load_failure) = match load_movies(store.as_mut()) {
            Ok(movies) => {
                let count = movies.len().to_string();
                log_event(Event::MoviesLoaded, &[("count", count.as_str())]);
                (movies, None)
            }
            Err(e) => {
                metrics.increment_store_failures();
                let message = e.to_string();
                Logger::error(
                    Event::MoviesLoadFailed,
                    &[("code", e.code().code()), ("error", message.as_str())],
                );
                (Vec::new(), Some(message))
            }
        };

        metrics.set_movies(movies.len());
        let index = MovieIndex::build(&movies);

        Self {
            store: Arc::new(Mutex::new(store)),
            state: RwLock::new(CatalogState { movies, index }),
            load_failure,
            metrics,
        }
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    /// Shared handle to the counters, for the metrics endpoint
    pub fn metrics_handle(&self) -> Arc<MetricsRegistry> {
        Arc::clone(&self.metrics)
    }

    /// Validates, persists and mirrors a new movie.
    pub async fn create(&self, request: CreateMovieRequest) -> CatalogResult<Movie> {
        let Some(rating) = Rating::parse(&request.recommendation) else {
            return Err(self.reject(CatalogError::invalid_rating()));
        };

        let new_movie = NewMovie {
            name: request.name,
            genre: request.genre,
            rating,
        };
        let body = match serde_json::to_value(&new_movie) {
            Ok(body) => body,
            Err(e) => {
                let source = StorageError::write_failed_no_source(format!(
                    "Failed to encode movie: {}",
                    e
                ));
                return Err(self.store_failure(
                    Event::MovieCreateFailed,
                    source,
                    CatalogError::insert_failed,
                ));
            }
        };

        if let Err(e) = self.ensure_writable() {
            return Err(self.store_failure(
                Event::MovieCreateFailed,
                e,
                CatalogError::insert_failed,
            ));
        }

        let mut state = self.state.write().await;

        let doc = match self.with_store(move |store| store.insert(&body)).await {
            Ok(doc) => doc,
            Err(e) => {
                return Err(self.store_failure(
                    Event::MovieCreateFailed,
                    e,
                    CatalogError::insert_failed,
                ))
            }
        };

        let movie = Movie::from_new(doc.id, new_movie);
        state.movies.push(movie.clone());
        state.rebuild_index();

        self.metrics.increment_created();
        self.metrics.set_movies(state.movies.len());
        let rating = movie.rating.to_string();
        log_event(
            Event::MovieCreated,
            &[
                ("genre", movie.genre.as_str()),
                ("id", movie.id.as_str()),
                ("rating", rating.as_str()),
            ],
        );

        Ok(movie)
    }

    /// Every movie, in insertion order.
    pub async fn list(&self) -> Vec<Movie> {
        self.state.read().await.movies.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.movies.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Removes a movie from the store, then from the mirror.
    pub async fn delete(&self, id: &str) -> CatalogResult<()> {
        if let Err(e) = self.ensure_writable() {
            return Err(self.store_failure(
                Event::MovieRemoveFailed,
                e,
                CatalogError::remove_failed,
            ));
        }

        let mut state = self.state.write().await;

        let target = id.to_string();
        let removed = match self.with_store(move |store| store.remove(&target)).await {
            Ok(removed) => removed,
            Err(e) => {
                return Err(self.store_failure(
                    Event::MovieRemoveFailed,
                    e,
                    CatalogError::remove_failed,
                ))
            }
        };

        if removed == 0 {
            drop(state);
            Logger::warn(Event::RequestRejected, &[("id", id), ("reason", "not_found")]);
            self.metrics.increment_rejected();
            return Err(CatalogError::NotFound);
        }

        state.movies.retain(|movie| movie.id != id);
        state.rebuild_index();

        self.metrics.increment_removed();
        self.metrics.set_movies(state.movies.len());
        log_event(Event::MovieRemoved, &[("id", id)]);

        Ok(())
    }

    /// Movies matching one criterion.
    ///
    /// A non-empty `genre` wins; `rating` is only consulted without it.
    pub async fn filter(&self, query: &FilterQuery) -> CatalogResult<Vec<Movie>> {
        let genre = query.genre.as_deref().filter(|g| !g.is_empty());
        let rating = query.rating.as_deref().filter(|r| !r.is_empty());

        let rating = match (genre, rating) {
            (Some(_), _) => None,
            (None, Some(raw)) => match Rating::parse_str(raw) {
                Some(rating) => Some(rating),
                None => return Err(self.reject(CatalogError::invalid_filter_rating())),
            },
            (None, None) => return Err(self.reject(CatalogError::missing_filter())),
        };

        let state = self.state.read().await;
        let positions: &[usize] = match (genre, rating) {
            (Some(genre), _) => state.index.lookup_genre(genre),
            (None, Some(rating)) => state.index.lookup_rating(rating),
            (None, None) => &[],
        };
        let movies = state.collect(positions);
        drop(state);

        self.metrics.increment_filters();
        let matches = movies.len().to_string();
        let rating = rating.map(|r| r.to_string()).unwrap_or_default();
        Logger::trace(
            Event::FilterServed,
            &[
                ("genre", genre.unwrap_or("")),
                ("matches", matches.as_str()),
                ("rating", rating.as_str()),
            ],
        );

        Ok(movies)
    }

    fn reject(&self, err: CatalogError) -> CatalogError {
        self.metrics.increment_rejected();
        let reason = err.to_string();
        Logger::warn(Event::RequestRejected, &[("reason", reason.as_str())]);
        err
    }

    fn ensure_writable(&self) -> StorageResult<()> {
        match &self.load_failure {
            None => Ok(()),
            Some(reason) => Err(StorageError::unavailable(format!(
                "Store is read-only after a failed load: {}",
                reason
            ))),
        }
    }

    /// Runs `op` against the store on the blocking pool.
    async fn with_store<T, F>(&self, op: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut dyn DocumentStore) -> StorageResult<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || {
            let mut store = store
                .lock()
                .map_err(|_| StorageError::unavailable("Store lock poisoned"))?;
            op(&mut **store)
        })
        .await
        .map_err(|e| StorageError::unavailable(format!("Store task failed: {}", e)))?
    }

    fn store_failure(
        &self,
        event: Event,
        source: StorageError,
        wrap: fn(StorageError) -> CatalogError,
    ) -> CatalogError {
        self.metrics.increment_store_failures();
        let message = source.to_string();
        Logger::error(
            event,
            &[("code", source.code().code()), ("error", message.as_str())],
        );
        wrap(source)
    }
}

fn load_movies(store: &mut dyn DocumentStore) -> StorageResult<Vec<Movie>> {
    store
        .load_all()?
        .into_iter()
        .map(|doc| {
            let id = doc.id.clone();
            Movie::from_document(doc).map_err(|e| {
                StorageError::corruption_for_document(&id, format!("Not a movie document: {}", e))
            })
        })
        .collect()
}
