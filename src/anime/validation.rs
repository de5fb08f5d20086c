//! Field checks for anime request payloads.

use serde_json::Value;
use std::str::FromStr;

use super::models::{AnimeUpdate, NewAnime, WatchStatus, LEGACY_WATCHED_STATUS};
use super::types::{AddAnimeRequest, UpdateAnimeRequest};
use crate::shared::AppError;

pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 10.0;

const ERR_NAME: &str = "Name is required and must be a string";
const ERR_IMAGE_URL: &str = "Image URL is required and must be a string";
const ERR_RATING: &str = "Rating must be between 0 and 10";
const ERR_STATUS: &str = "Invalid status value";

fn non_blank_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

/// A missing or null rating is allowed; anything else must be a number in range
pub fn validate_rating(value: Option<&Value>) -> Result<Option<f64>, AppError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(rating) if rating.is_finite() && (MIN_RATING..=MAX_RATING).contains(&rating) => {
                Ok(Some(rating))
            }
            _ => Err(AppError::Validation(ERR_RATING.to_string())),
        },
        Some(_) => Err(AppError::Validation(ERR_RATING.to_string())),
    }
}

pub fn parse_status(value: &str) -> Result<WatchStatus, AppError> {
    WatchStatus::from_str(value.trim()).map_err(|_| AppError::Validation(ERR_STATUS.to_string()))
}

/// A status field that must be present and valid
pub fn validate_status(value: Option<&Value>) -> Result<WatchStatus, AppError> {
    match value {
        Some(Value::String(s)) => parse_status(s),
        _ => Err(AppError::Validation(ERR_STATUS.to_string())),
    }
}

/// Checks name, rating and image url in that order
pub fn validate_new_anime(request: &AddAnimeRequest) -> Result<(NewAnime, WatchStatus), AppError> {
    let name = non_blank_string(request.name.as_ref())
        .ok_or_else(|| AppError::Validation(ERR_NAME.to_string()))?;
    let vote_average = validate_rating(request.vote_average.as_ref())?;
    let image_url = non_blank_string(request.image_url.as_ref())
        .ok_or_else(|| AppError::Validation(ERR_IMAGE_URL.to_string()))?;

    let status = match request.status.as_ref() {
        None | Some(Value::Null) => WatchStatus::default(),
        Some(Value::String(s)) if s.trim() == LEGACY_WATCHED_STATUS => WatchStatus::Completed,
        other => validate_status(other)?,
    };

    Ok((
        NewAnime {
            name,
            image_url,
            vote_average,
        },
        status,
    ))
}

/// Present fields must satisfy the same rules as on insert
pub fn validate_update(request: &UpdateAnimeRequest) -> Result<AnimeUpdate, AppError> {
    let name = match request.name.as_ref() {
        None | Some(Value::Null) => None,
        other => Some(
            non_blank_string(other).ok_or_else(|| AppError::Validation(ERR_NAME.to_string()))?,
        ),
    };
    let image_url = match request.image_url.as_ref() {
        None | Some(Value::Null) => None,
        other => Some(
            non_blank_string(other)
                .ok_or_else(|| AppError::Validation(ERR_IMAGE_URL.to_string()))?,
        ),
    };

    Ok(AnimeUpdate {
        name,
        image_url,
        vote_average: validate_rating(request.vote_average.as_ref())?,
    })
}
