use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use super::client::{KeyRole, SupabaseClient};
use crate::anime::models::{
    AnimeListItem, AnimeModel, AnimeUpdate, NewAnime, UserAnimeModel, WatchStatus,
};
use crate::anime::repository::AnimeRepository;
use crate::shared::AppError;

const ANIME_TABLE: &str = "anime_list";
const USER_ANIME_TABLE: &str = "user_anime";

fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

/// Kept as text so one unreadable status does not fail the whole list
#[derive(Debug, Deserialize)]
struct StatusRow {
    #[serde(default)]
    status: Option<String>,
}

/// anime_list row with the embedded `user_anime!inner(status)` relation
#[derive(Debug, Deserialize)]
struct ListRow {
    #[serde(flatten)]
    anime: AnimeModel,
    #[serde(default)]
    user_anime: Vec<StatusRow>,
}

/// AnimeRepository backed by the `anime_list` and `user_anime` tables
pub struct SupabaseAnimeRepository {
    client: SupabaseClient,
}

impl SupabaseAnimeRepository {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    async fn is_tracked(&self, anime_id: &str, user_id: &str) -> Result<bool, AppError> {
        let request = self
            .client
            .table(Method::GET, USER_ANIME_TABLE, KeyRole::Service)
            .query(&[
                ("select", "anime_id".to_string()),
                ("anime_id", eq(anime_id)),
                ("user_id", eq(user_id)),
                ("limit", "1".to_string()),
            ]);
        let rows: Vec<Value> = self.client.send_json(request).await?;
        Ok(!rows.is_empty())
    }

    async fn get_anime(&self, anime_id: &str) -> Result<Option<AnimeModel>, AppError> {
        let request = self
            .client
            .table(Method::GET, ANIME_TABLE, KeyRole::Service)
            .query(&[
                ("select", "*".to_string()),
                ("id", eq(anime_id)),
                ("limit", "1".to_string()),
            ]);
        let rows: Vec<AnimeModel> = self.client.send_json(request).await?;
        Ok(rows.into_iter().next())
    }
}

#[async_trait]
impl AnimeRepository for SupabaseAnimeRepository {
    #[instrument(skip(self))]
    async fn find_by_name(&self, name: &str) -> Result<Option<AnimeModel>, AppError> {
        let request = self
            .client
            .table(Method::GET, ANIME_TABLE, KeyRole::Service)
            .query(&[
                ("select", "*".to_string()),
                ("name", eq(name)),
                ("limit", "1".to_string()),
            ]);
        let rows: Vec<AnimeModel> = self.client.send_json(request).await?;

        debug!(found = !rows.is_empty(), "Looked up anime by name");
        Ok(rows.into_iter().next())
    }

    #[instrument(skip(self, anime))]
    async fn insert_anime(&self, anime: &NewAnime, user_id: &str) -> Result<AnimeModel, AppError> {
        let request = self
            .client
            .table(Method::POST, ANIME_TABLE, KeyRole::Service)
            .header("Prefer", "return=representation")
            .json(&json!([{
                "name": anime.name,
                "image_url": anime.image_url,
                "vote_average": anime.vote_average,
                "user_id": user_id,
            }]));

        let rows: Vec<AnimeModel> = self.client.send_json(request).await.map_err(|e| match e {
            AppError::Conflict(msg) => AppError::Upstream(msg),
            other => other,
        })?;

        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::Upstream("Insert returned no rows".to_string()))
    }

    #[instrument(skip(self, entry))]
    async fn add_to_user_list(&self, entry: &UserAnimeModel) -> Result<(), AppError> {
        let request = self
            .client
            .table(Method::POST, USER_ANIME_TABLE, KeyRole::Service)
            .header("Prefer", "return=minimal")
            .json(&[entry]);

        self.client.send_empty(request).await.map_err(|e| match e {
            AppError::Conflict(_) => AppError::Conflict("Anime already in list".to_string()),
            other => other,
        })
    }

    #[instrument(skip(self))]
    async fn remove_from_user_list(
        &self,
        anime_id: &str,
        user_id: &str,
    ) -> Result<u64, AppError> {
        let request = self
            .client
            .table(Method::DELETE, USER_ANIME_TABLE, KeyRole::Service)
            .header("Prefer", "return=representation")
            .query(&[("anime_id", eq(anime_id)), ("user_id", eq(user_id))]);
        let rows: Vec<Value> = self.client.send_json(request).await?;

        debug!(removed = rows.len(), "Removed user anime relations");
        Ok(rows.len() as u64)
    }

    #[instrument(skip(self))]
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<AnimeListItem>, AppError> {
        let request = self
            .client
            .table(Method::GET, ANIME_TABLE, KeyRole::Service)
            .query(&[
                ("select", "*,user_anime!inner(status)".to_string()),
                ("user_anime.user_id", eq(user_id)),
                ("order", "created_at.desc".to_string()),
            ]);
        let rows: Vec<ListRow> = self.client.send_json(request).await?;

        let items: Vec<AnimeListItem> = rows
            .into_iter()
            .filter_map(|row| {
                let Some(relation) = row.user_anime.first() else {
                    warn!(anime_id = %row.anime.id, "Listed anime without a relation row");
                    return None;
                };
                match relation.status.as_deref().and_then(WatchStatus::from_stored) {
                    Some(status) => Some(AnimeListItem {
                        status,
                        anime: row.anime,
                    }),
                    None => {
                        warn!(anime_id = %row.anime.id, status = ?relation.status, "Skipping relation with unknown status");
                        None
                    }
                }
            })
            .collect();

        debug!(count = items.len(), "Listed user anime");
        Ok(items)
    }

    #[instrument(skip(self, changes))]
    async fn update_anime(
        &self,
        anime_id: &str,
        user_id: &str,
        changes: &AnimeUpdate,
    ) -> Result<Option<AnimeModel>, AppError> {
        if !self.is_tracked(anime_id, user_id).await? {
            debug!("Update target not tracked by user");
            return Ok(None);
        }
        if changes.is_empty() {
            let anime = self.get_anime(anime_id).await?;
            return Ok(anime.filter(|a| a.user_id.as_deref() == Some(user_id)));
        }

        // Only the creator of the catalogue row may edit it
        let request = self
            .client
            .table(Method::PATCH, ANIME_TABLE, KeyRole::Service)
            .header("Prefer", "return=representation")
            .query(&[("id", eq(anime_id)), ("user_id", eq(user_id))])
            .json(changes);
        let rows: Vec<AnimeModel> = self.client.send_json(request).await.map_err(|e| match e {
            AppError::Conflict(msg) => AppError::Upstream(msg),
            other => other,
        })?;

        Ok(rows.into_iter().next())
    }

    #[instrument(skip(self))]
    async fn update_status(
        &self,
        anime_id: &str,
        user_id: &str,
        status: WatchStatus,
    ) -> Result<bool, AppError> {
        let request = self
            .client
            .table(Method::PATCH, USER_ANIME_TABLE, KeyRole::Service)
            .header("Prefer", "return=representation")
            .query(&[("anime_id", eq(anime_id)), ("user_id", eq(user_id))])
            .json(&json!({ "status": status }));
        let rows: Vec<Value> = self.client.send_json(request).await?;

        Ok(!rows.is_empty())
    }
}
