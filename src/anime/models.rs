use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString};
use uuid::Uuid;

/// Where a user is with a show
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WatchStatus {
    Watching,
    Completed,
    PlanToWatch,
    Dropped,
}

/// Status value written by older clients for finished shows
pub const LEGACY_WATCHED_STATUS: &str = "watched";

impl WatchStatus {
    /// Parses a stored status, reading the legacy `watched` value as completed
    pub fn from_stored(value: &str) -> Option<Self> {
        match value.trim() {
            LEGACY_WATCHED_STATUS => Some(WatchStatus::Completed),
            other => WatchStatus::from_str(other).ok(),
        }
    }
}

impl Default for WatchStatus {
    /// Adding a show from search marks it as already watched
    fn default() -> Self {
        WatchStatus::Completed
    }
}

/// Row of the anime_list table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnimeModel {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    pub image_url: String,
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub user_id: Option<String>, // User who first added the show
    pub created_at: DateTime<Utc>,
}

impl AnimeModel {
    /// Creates a new row with a generated id
    pub fn new(anime: NewAnime, user_id: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: anime.name,
            image_url: anime.image_url,
            vote_average: anime.vote_average,
            user_id: Some(user_id.to_string()),
            created_at: Utc::now(),
        }
    }

    /// Applies the fields present in a partial update
    pub fn apply(&mut self, changes: &AnimeUpdate) {
        if let Some(name) = &changes.name {
            self.name = name.clone();
        }
        if let Some(image_url) = &changes.image_url {
            self.image_url = image_url.clone();
        }
        if let Some(vote_average) = changes.vote_average {
            self.vote_average = Some(vote_average);
        }
    }
}

/// Validated payload for inserting an anime row
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewAnime {
    pub name: String,
    pub image_url: String,
    pub vote_average: Option<f64>,
}

/// Validated partial update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct AnimeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f64>,
}

impl AnimeUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.image_url.is_none() && self.vote_average.is_none()
    }
}

/// Row of the user_anime join table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserAnimeModel {
    pub user_id: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub anime_id: String,
    pub status: WatchStatus,
}

/// An anime row together with the requesting user's status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnimeListItem {
    #[serde(flatten)]
    pub anime: AnimeModel,
    pub status: WatchStatus,
}

/// Accepts both numeric and string primary keys
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}
