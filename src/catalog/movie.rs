//! Movie records and rating parsing

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::storage::StoredDocument;

/// A rating between 1 and 5 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: i64) -> Option<Self> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Some(Self(value as u8))
        } else {
            None
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Parses a rating from a request value.
    ///
    /// Strings go through [`parse_leading_int`], numbers are truncated toward
    /// zero. Anything else, and anything outside 1..=5, is rejected.
    pub fn parse(value: &Value) -> Option<Self> {
        let parsed = match value {
            Value::String(s) => parse_leading_int(s)?,
            Value::Number(n) => match n.as_i64() {
                Some(i) => i,
                None => {
                    let f = n.as_f64()?;
                    if !f.is_finite() {
                        return None;
                    }
                    f.trunc() as i64
                }
            },
            _ => return None,
        };
        Self::new(parsed)
    }

    /// Parses a rating from a query string value.
    pub fn parse_str(s: &str) -> Option<Self> {
        parse_leading_int(s).and_then(Self::new)
    }
}

impl TryFrom<i64> for Rating {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Rating::new(value).ok_or_else(|| format!("rating out of range: {}", value))
    }
}

impl From<Rating> for i64 {
    fn from(rating: Rating) -> Self {
        i64::from(rating.0)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Leading-integer parse: optional whitespace, optional sign, then digits.
/// Trailing characters are ignored. `None` when no digit follows the sign.
pub fn parse_leading_int(s: &str) -> Option<i64> {
    let trimmed = s.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    // Saturates on overflow.
    let magnitude = rest[..digits_len].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// A movie as persisted in the store, without its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMovie {
    pub name: String,
    pub genre: String,
    pub rating: Rating,
}

/// A stored movie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub name: String,
    pub genre: String,
    pub rating: Rating,
    #[serde(rename = "_id")]
    pub id: String,
}

impl Movie {
    pub fn from_new(id: impl Into<String>, movie: NewMovie) -> Self {
        Self {
            name: movie.name,
            genre: movie.genre,
            rating: movie.rating,
            id: id.into(),
        }
    }

    pub fn from_document(doc: StoredDocument) -> Result<Self, serde_json::Error> {
        let movie: NewMovie = serde_json::from_value(doc.body)?;
        Ok(Self::from_new(doc.id, movie))
    }
}

/// Body of `POST /movies`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateMovieRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub recommendation: Value,
}

/// Query of `GET /movies/filter`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterQuery {
    pub genre: Option<String>,
    pub rating: Option<String>,
}

impl FilterQuery {
    pub fn by_genre(genre: impl Into<String>) -> Self {
        Self {
            genre: Some(genre.into()),
            rating: None,
        }
    }

    pub fn by_rating(rating: impl Into<String>) -> Self {
        Self {
            genre: None,
            rating: Some(rating.into()),
        }
    }
}
