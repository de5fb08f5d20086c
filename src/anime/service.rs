use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::{
    models::{AnimeListItem, AnimeModel, UserAnimeModel, WatchStatus},
    repository::AnimeRepository,
    types::{AddAnimeRequest, UpdateAnimeRequest, UpdateStatusRequest},
    validation,
};
use crate::shared::AppError;

/// Service for handling the caller's anime list
pub struct AnimeService {
    repository: Arc<dyn AnimeRepository + Send + Sync>,
}

impl AnimeService {
    pub fn new(repository: Arc<dyn AnimeRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    /// Adds an anime to the user's list, reusing the catalogue row when the name exists
    #[instrument(skip(self, request))]
    pub async fn add_anime(
        &self,
        user_id: &str,
        request: AddAnimeRequest,
    ) -> Result<AnimeModel, AppError> {
        let (new_anime, status) = validation::validate_new_anime(&request)?;

        let result = async {
            let anime = match self.repository.find_by_name(&new_anime.name).await? {
                Some(existing) => {
                    debug!(anime_id = %existing.id, "Reusing existing anime");
                    existing
                }
                None => self.repository.insert_anime(&new_anime, user_id).await?,
            };

            self.repository
                .add_to_user_list(&UserAnimeModel {
                    user_id: user_id.to_string(),
                    anime_id: anime.id.clone(),
                    status,
                })
                .await?;

            Ok::<_, AppError>(anime)
        }
        .await
        .map_err(|e| e.mask_upstream("Failed to add anime"))?;

        info!(anime_id = %result.id, name = %result.name, status = %status, "Anime added to list");
        Ok(result)
    }

    /// Removes the anime from the user's list. Untracked ids are a no-op.
    #[instrument(skip(self))]
    pub async fn delete_anime(&self, user_id: &str, anime_id: &str) -> Result<(), AppError> {
        let removed = self
            .repository
            .remove_from_user_list(anime_id, user_id)
            .await
            .map_err(|e| e.mask_upstream("Failed to delete anime"))?;

        debug!(removed, "Delete request processed");
        Ok(())
    }

    /// Lists the user's anime, optionally narrowed to one status
    #[instrument(skip(self))]
    pub async fn list_anime(
        &self,
        user_id: &str,
        status: Option<WatchStatus>,
    ) -> Result<Vec<AnimeListItem>, AppError> {
        let mut items = self
            .repository
            .list_for_user(user_id)
            .await
            .map_err(|e| e.mask_upstream("Failed to fetch anime list"))?;

        if let Some(status) = status {
            items.retain(|item| item.status == status);
        }

        info!(count = items.len(), "Anime list fetched");
        Ok(items)
    }

    #[instrument(skip(self, request))]
    pub async fn update_anime(
        &self,
        user_id: &str,
        anime_id: &str,
        request: UpdateAnimeRequest,
    ) -> Result<AnimeModel, AppError> {
        let changes = validation::validate_update(&request)?;

        let updated = self
            .repository
            .update_anime(anime_id, user_id, &changes)
            .await
            .map_err(|e| e.mask_upstream("Failed to update anime"))?
            .ok_or_else(|| AppError::NotFound("Anime not found".to_string()))?;

        info!(anime_id = %updated.id, "Anime updated");
        Ok(updated)
    }

    #[instrument(skip(self, request))]
    pub async fn update_status(
        &self,
        user_id: &str,
        anime_id: &str,
        request: UpdateStatusRequest,
    ) -> Result<WatchStatus, AppError> {
        let status = validation::validate_status(request.status.as_ref())?;

        let updated = self
            .repository
            .update_status(anime_id, user_id, status)
            .await
            .map_err(|e| e.mask_upstream("Failed to update anime status"))?;

        if !updated {
            return Err(AppError::NotFound("Anime not found".to_string()));
        }

        info!(anime_id = %anime_id, status = %status, "Anime status updated");
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anime::repository::InMemoryAnimeRepository;
    use serde_json::json;

    fn add_request(name: &str, rating: serde_json::Value) -> AddAnimeRequest {
        AddAnimeRequest {
            name: Some(json!(name)),
            image_url: Some(json!(format!("https://cdn.example/{}.jpg", name))),
            vote_average: Some(rating),
            status: None,
        }
    }

    fn service() -> (AnimeService, Arc<InMemoryAnimeRepository>) {
        let repo = Arc::new(InMemoryAnimeRepository::new());
        (AnimeService::new(repo.clone()), repo)
    }

    #[tokio::test]
    async fn test_add_reuses_catalogue_row_across_users() {
        let (service, repo) = service();

        let first = service
            .add_anime("user-1", add_request("Akira", json!(8)))
            .await
            .unwrap();
        let second = service
            .add_anime("user-2", add_request("Akira", json!(9)))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(repo.anime_count(), 1);
        assert_eq!(repo.relation_count(), 2);
    }

    #[tokio::test]
    async fn test_add_rejects_invalid_rating_before_storage() {
        let (service, repo) = service();

        let result = service
            .add_anime("user-1", add_request("Akira", json!(11)))
            .await;

        assert!(matches!(result, Err(AppError::Validation(msg)) if msg == "Rating must be between 0 and 10"));
        assert_eq!(repo.anime_count(), 0);
    }

    #[tokio::test]
    async fn test_add_twice_conflicts() {
        let (service, _) = service();
        service
            .add_anime("user-1", add_request("Akira", json!(8)))
            .await
            .unwrap();

        let result = service
            .add_anime("user-1", add_request("Akira", json!(8)))
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_delete_untracked_is_noop() {
        let (service, repo) = service();
        let anime = service
            .add_anime("user-1", add_request("Akira", json!(8)))
            .await
            .unwrap();

        service.delete_anime("user-2", &anime.id).await.unwrap();
        assert_eq!(repo.relation_count(), 1);
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let (service, _) = service();
        service
            .add_anime("user-1", add_request("Akira", json!(8)))
            .await
            .unwrap();
        let trigun = service
            .add_anime("user-1", add_request("Trigun", json!(7)))
            .await
            .unwrap();
        service
            .update_status(
                "user-1",
                &trigun.id,
                UpdateStatusRequest {
                    status: Some(json!("watching")),
                },
            )
            .await
            .unwrap();

        let watching = service
            .list_anime("user-1", Some(WatchStatus::Watching))
            .await
            .unwrap();
        assert_eq!(watching.len(), 1);
        assert_eq!(watching[0].anime.name, "Trigun");

        let all = service.list_anime("user-1", None).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_update_untracked_is_not_found() {
        let (service, _) = service();
        let anime = service
            .add_anime("user-1", add_request("Akira", json!(8)))
            .await
            .unwrap();

        let result = service
            .update_anime(
                "user-2",
                &anime.id,
                UpdateAnimeRequest {
                    vote_average: Some(json!(3)),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_status_rejects_unknown_value() {
        let (service, _) = service();
        let anime = service
            .add_anime("user-1", add_request("Akira", json!(8)))
            .await
            .unwrap();

        let result = service
            .update_status(
                "user-1",
                &anime.id,
                UpdateStatusRequest {
                    status: Some(json!("rewatching")),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(msg)) if msg == "Invalid status value"));
    }
}
