use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request payload for adding an anime to the caller's list
///
/// Fields are kept loosely typed so that wrong types produce field-specific
/// validation messages instead of a generic body rejection.
#[derive(Debug, Default, Deserialize)]
pub struct AddAnimeRequest {
    #[serde(alias = "title")]
    pub name: Option<Value>,
    pub image_url: Option<Value>,
    pub vote_average: Option<Value>,
    pub status: Option<Value>,
}

/// Request payload for a partial anime update
#[derive(Debug, Default, Deserialize)]
pub struct UpdateAnimeRequest {
    #[serde(alias = "title")]
    pub name: Option<Value>,
    pub image_url: Option<Value>,
    pub vote_average: Option<Value>,
}

/// Request payload for changing the caller's watch status
#[derive(Debug, Default, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<Value>,
}

/// Query string for listing the caller's anime
#[derive(Debug, Default, Deserialize)]
pub struct ListAnimeQuery {
    pub status: Option<String>,
}

/// `{"message", "data"}` envelope for mutations that return a row
#[derive(Debug, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub message: String,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }
}
