//! Observable events
//!
//! Every log line names exactly one of these.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Process startup begins
    StartupBegin,
    /// Configuration resolved
    ConfigLoaded,
    /// Store file opened
    StoreOpened,
    /// Store could not be opened (FATAL for the process)
    StoreOpenFailed,
    /// Startup load filled the mirror
    MoviesLoaded,
    /// Startup load failed; serving with an empty catalog
    MoviesLoadFailed,
    /// Listening for requests
    Serving,
    /// Server loop exited
    Shutdown,

    // Mutations
    /// Movie persisted and added to the mirror
    MovieCreated,
    /// Store rejected an insert
    MovieCreateFailed,
    /// Movie removed from store and mirror
    MovieRemoved,
    /// Store rejected a remove
    MovieRemoveFailed,

    // Requests
    /// Request refused before touching the store (validation or not found)
    RequestRejected,
    /// Filter query answered
    FilterServed,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::StartupBegin => "DUDAFLIX_STARTUP_BEGIN",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::StoreOpened => "STORE_OPENED",
            Event::StoreOpenFailed => "STORE_OPEN_FAILED",
            Event::MoviesLoaded => "MOVIES_LOADED",
            Event::MoviesLoadFailed => "MOVIES_LOAD_FAILED",
            Event::Serving => "DUDAFLIX_SERVING",
            Event::Shutdown => "DUDAFLIX_SHUTDOWN",

            Event::MovieCreated => "MOVIE_CREATED",
            Event::MovieCreateFailed => "MOVIE_CREATE_FAILED",
            Event::MovieRemoved => "MOVIE_REMOVED",
            Event::MovieRemoveFailed => "MOVIE_REMOVE_FAILED",

            Event::RequestRejected => "REQUEST_REJECTED",
            Event::FilterServed => "FILTER_SERVED",
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::StoreOpenFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
