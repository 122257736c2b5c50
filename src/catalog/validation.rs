//! Validation of submitted genre and track fields.
//!
//! Fields are checked in a fixed order (title, length, genre) and the first
//! failure is reported. Create and update share the same rules.

use super::models::{GenreId, NewTrack, TrackForm};
use crate::error::StreamingError;
use std::fmt;

#[derive(Debug, PartialEq, Eq)]
pub enum ValidationError {
    MissingField { field: &'static str },
    NotAnInteger { field: &'static str },
    NonPositiveValue { field: &'static str, value: i64 },
    ValueTooLarge { field: &'static str, max: i64 },
    UnknownGenre { id: GenreId },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingField { field } => write!(f, "{} is required.", field),
            ValidationError::NotAnInteger { field } => {
                write!(f, "{} must be a whole number.", field)
            }
            ValidationError::NonPositiveValue { field, value } => {
                write!(f, "{} must be positive, got {}.", field, value)
            }
            ValidationError::ValueTooLarge { field, max } => {
                write!(f, "{} must be at most {}.", field, max)
            }
            ValidationError::UnknownGenre { id } => write!(f, "Genre {} does not exist.", id),
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for StreamingError {
    fn from(err: ValidationError) -> Self {
        StreamingError::Validation(err.to_string())
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted track, in seconds. Keeps `SUM(length)` far from `i64` overflow.
pub const MAX_TRACK_LENGTH: i64 = i32::MAX as i64;

fn present<'a>(value: &'a Option<String>, field: &'static str) -> ValidationResult<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ValidationError::MissingField { field }),
    }
}

fn integer(value: &str, field: &'static str) -> ValidationResult<i64> {
    value
        .parse::<i64>()
        .map_err(|_| ValidationError::NotAnInteger { field })
}

pub fn validate_genre_title(title: Option<&str>) -> ValidationResult<String> {
    match title.map(str::trim) {
        Some(t) if !t.is_empty() => Ok(t.to_string()),
        _ => Err(ValidationError::MissingField { field: "Title" }),
    }
}

/// Checks presence and shape of every field. Whether the genre exists is up
/// to the caller, which has the store at hand.
pub fn validate_track_form(form: &TrackForm) -> ValidationResult<NewTrack> {
    let title = present(&form.title, "Title")?;

    let length = integer(present(&form.length, "Length")?, "Length")?;
    if length < 1 {
        return Err(ValidationError::NonPositiveValue {
            field: "Length",
            value: length,
        });
    }
    if length > MAX_TRACK_LENGTH {
        return Err(ValidationError::ValueTooLarge {
            field: "Length",
            max: MAX_TRACK_LENGTH,
        });
    }

    let genre_id = GenreId(integer(present(&form.genre_id, "Genre")?, "Genre")?);

    Ok(NewTrack {
        title: title.to_string(),
        length,
        genre_id,
    })
}
