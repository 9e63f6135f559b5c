//! Genre and rating indexes over the in-memory movie list
//!
//! # API
//!
//! - `rebuild(movies)` - Discard everything and regroup the given slice
//! - `lookup_genre(genre)` - Positions of movies with exactly this genre
//! - `lookup_rating(rating)` - Positions of movies with this rating
//!
//! Entries are positions into the slice passed to the last `rebuild`, so the
//! index is only meaningful next to that same slice. Positions within a group
//! are ascending, i.e. in mirror insertion order.

use std::collections::{BTreeMap, HashMap};

use crate::catalog::{Movie, Rating};

/// Position of a movie in the mirror
pub type MoviePosition = usize;

#[derive(Debug, Default, Clone)]
pub struct MovieIndex {
    by_genre: HashMap<String, Vec<MoviePosition>>,
    by_rating: BTreeMap<Rating, Vec<MoviePosition>>,
}

impl MovieIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a fresh index over `movies`.
    pub fn build(movies: &[Movie]) -> Self {
        let mut index = Self::new();
        index.rebuild(movies);
        index
    }

    /// Recomputes both groupings from scratch. O(movies.len()).
    pub fn rebuild(&mut self, movies: &[Movie]) {
        self.by_genre.clear();
        self.by_rating.clear();

        for (position, movie) in movies.iter().enumerate() {
            self.by_genre
                .entry(movie.genre.clone())
                .or_default()
                .push(position);
            self.by_rating
                .entry(movie.rating)
                .or_default()
                .push(position);
        }
    }

    pub fn lookup_genre(&self, genre: &str) -> &[MoviePosition] {
        self.by_genre.get(genre).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn lookup_rating(&self, rating: Rating) -> &[MoviePosition] {
        self.by_rating.get(&rating).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: &str, genre: &str, rating: i64) -> Movie {
        Movie {
            id: id.to_string(),
            name: format!("Movie {}", id),
            genre: genre.to_string(),
            rating: Rating::new(rating).unwrap(),
        }
    }

    fn r(value: i64) -> Rating {
        Rating::new(value).unwrap()
    }

    #[test]
    fn test_groups_keep_insertion_order() {
        let movies = vec![
            movie("a", "Drama", 4),
            movie("b", "Sci-Fi", 5),
            movie("c", "Drama", 5),
            movie("d", "Drama", 4),
        ];
        let index = MovieIndex::build(&movies);

        assert_eq!(index.lookup_genre("Drama"), &[0, 2, 3]);
        assert_eq!(index.lookup_genre("Sci-Fi"), &[1]);
        assert_eq!(index.lookup_rating(r(4)), &[0, 3]);
        assert_eq!(index.lookup_rating(r(5)), &[1, 2]);
    }

    #[test]
    fn test_missing_keys_are_empty() {
        let index = MovieIndex::build(&[movie("a", "Drama", 4)]);

        assert!(index.lookup_genre("Horror").is_empty());
        assert!(index.lookup_genre("drama").is_empty());
        assert!(index.lookup_rating(r(1)).is_empty());
    }

    #[test]
    fn test_rebuild_discards_previous_state() {
        let mut movies = vec![movie("a", "Drama", 4), movie("b", "Horror", 2)];
        let mut index = MovieIndex::build(&movies);

        movies.remove(0);
        index.rebuild(&movies);

        assert!(index.lookup_genre("Drama").is_empty());
        assert!(index.lookup_rating(r(4)).is_empty());
        assert_eq!(index.lookup_genre("Horror"), &[0]);
        assert_eq!(index.lookup_rating(r(2)), &[0]);
    }

    #[test]
    fn test_empty_genre_is_a_valid_key() {
        let index = MovieIndex::build(&[movie("a", "", 3)]);
        assert_eq!(index.lookup_genre(""), &[0]);
    }

    #[test]
    fn test_empty_index() {
        let index = MovieIndex::new();
        assert!(index.lookup_genre("").is_empty());
        assert!((1..=5).all(|v| index.lookup_rating(r(v)).is_empty()));
    }
}
