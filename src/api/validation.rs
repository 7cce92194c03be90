use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use crate::database::games::MAX_GAME_PLAYERS;
use crate::errors::{ApiError, FieldError};

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Collects field errors across a request so the client gets all of
/// them at once instead of one per round trip.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(path, message));
    }

    pub fn text(&mut self, path: &str, value: &str, min: usize, max: usize) {
        let length = value.chars().count();
        if length < min || length > max {
            self.add(path, format!("must be between {min} and {max} characters"));
        }
    }

    pub fn email(&mut self, path: &str, value: &str) {
        if !EMAIL_REGEX.is_match(value) {
            self.add(path, "must be a valid email address");
        }
    }

    pub fn latitude(&mut self, path: &str, value: f64) {
        if !(-90.0..=90.0).contains(&value) {
            self.add(path, "must be between -90 and 90");
        }
    }

    pub fn longitude(&mut self, path: &str, value: f64) {
        if !(-180.0..=180.0).contains(&value) {
            self.add(path, "must be between -180 and 180");
        }
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self.errors))
        }
    }
}

/// Malformed ids are validation errors, never 404s.
pub fn parse_uuid(path: &str, value: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(value)
        .map_err(|_| ApiError::Validation(vec![FieldError::new(path, "must be a valid UUID")]))
}

/// Parses a list of player ids, enforcing the 1..=2 size a game allows.
pub fn parse_id_list(path: &str, values: &[String]) -> Result<Vec<Uuid>, ApiError> {
    let mut validator = Validator::new();
    if values.is_empty() || values.len() > MAX_GAME_PLAYERS {
        validator.add(
            path,
            format!("must contain between 1 and {MAX_GAME_PLAYERS} ids"),
        );
    }

    let ids = values
        .iter()
        .enumerate()
        .filter_map(|(index, raw)| match Uuid::parse_str(raw) {
            Ok(id) => Some(id),
            Err(_) => {
                validator.add(&format!("{path}.{index}"), "must be a valid UUID");
                None
            }
        })
        .collect();

    validator.finish()?;
    Ok(ids)
}
