use async_trait::async_trait;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::{
    AnimeListItem, AnimeModel, AnimeUpdate, NewAnime, UserAnimeModel, WatchStatus,
};
use crate::shared::AppError;

/// Trait for anime catalogue and per-user list operations
#[async_trait]
pub trait AnimeRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<AnimeModel>, AppError>;
    async fn insert_anime(&self, anime: &NewAnime, user_id: &str) -> Result<AnimeModel, AppError>;

    /// Fails with `AppError::Conflict` when the user already tracks the anime
    async fn add_to_user_list(&self, entry: &UserAnimeModel) -> Result<(), AppError>;

    /// Returns the number of relations removed (0 when the user never tracked it)
    async fn remove_from_user_list(&self, anime_id: &str, user_id: &str)
        -> Result<u64, AppError>;

    /// The user's tracked anime, newest first
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<AnimeListItem>, AppError>;

    /// Returns `None` unless the user tracks the anime and created the catalogue row
    async fn update_anime(
        &self,
        anime_id: &str,
        user_id: &str,
        changes: &AnimeUpdate,
    ) -> Result<Option<AnimeModel>, AppError>;

    /// Returns `false` when the user does not track the anime
    async fn update_status(
        &self,
        anime_id: &str,
        user_id: &str,
        status: WatchStatus,
    ) -> Result<bool, AppError>;
}

#[derive(Default)]
struct Tables {
    anime: Vec<AnimeModel>,
    user_anime: Vec<UserAnimeModel>,
}

impl Tables {
    fn is_tracked(&self, anime_id: &str, user_id: &str) -> bool {
        self.user_anime
            .iter()
            .any(|e| e.anime_id == anime_id && e.user_id == user_id)
    }
}

/// In-memory implementation of AnimeRepository for development and testing
pub struct InMemoryAnimeRepository {
    tables: Mutex<Tables>,
}

impl Default for InMemoryAnimeRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAnimeRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
        }
    }

    /// Creates an in-memory repository with pre-populated catalogue rows
    pub fn with_anime(anime: Vec<AnimeModel>) -> Self {
        Self {
            tables: Mutex::new(Tables {
                anime,
                user_anime: Vec::new(),
            }),
        }
    }

    /// Returns the number of catalogue rows
    pub fn anime_count(&self) -> usize {
        self.tables.lock().unwrap().anime.len()
    }

    /// Returns the number of user/anime relations
    pub fn relation_count(&self) -> usize {
        self.tables.lock().unwrap().user_anime.len()
    }
}

#[async_trait]
impl AnimeRepository for InMemoryAnimeRepository {
    #[instrument(skip(self))]
    async fn find_by_name(&self, name: &str) -> Result<Option<AnimeModel>, AppError> {
        let tables = self.tables.lock().unwrap();
        let anime = tables.anime.iter().find(|a| a.name == name).cloned();

        debug!(name = %name, found = anime.is_some(), "Looked up anime by name in memory");
        Ok(anime)
    }

    #[instrument(skip(self, anime))]
    async fn insert_anime(&self, anime: &NewAnime, user_id: &str) -> Result<AnimeModel, AppError> {
        let mut tables = self.tables.lock().unwrap();
        if tables.anime.iter().any(|a| a.name == anime.name) {
            warn!(name = %anime.name, "Anime name already exists in memory");
            return Err(AppError::DatabaseError(
                "duplicate key value violates unique constraint \"anime_list_name_key\""
                    .to_string(),
            ));
        }

        let model = AnimeModel::new(anime.clone(), user_id);
        tables.anime.push(model.clone());

        debug!(anime_id = %model.id, name = %model.name, "Anime inserted in memory");
        Ok(model)
    }

    #[instrument(skip(self, entry))]
    async fn add_to_user_list(&self, entry: &UserAnimeModel) -> Result<(), AppError> {
        let mut tables = self.tables.lock().unwrap();
        if !tables.anime.iter().any(|a| a.id == entry.anime_id) {
            warn!(anime_id = %entry.anime_id, "Relation references unknown anime");
            return Err(AppError::DatabaseError(
                "insert violates foreign key constraint \"user_anime_anime_id_fkey\"".to_string(),
            ));
        }
        if tables.is_tracked(&entry.anime_id, &entry.user_id) {
            debug!(anime_id = %entry.anime_id, user_id = %entry.user_id, "Anime already tracked");
            return Err(AppError::Conflict("Anime already in list".to_string()));
        }
        tables.user_anime.push(entry.clone());

        debug!(anime_id = %entry.anime_id, user_id = %entry.user_id, status = %entry.status, "Relation created in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_from_user_list(
        &self,
        anime_id: &str,
        user_id: &str,
    ) -> Result<u64, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.user_anime.len();
        tables
            .user_anime
            .retain(|e| !(e.anime_id == anime_id && e.user_id == user_id));
        let removed = (before - tables.user_anime.len()) as u64;

        debug!(removed, "Relations removed from memory");
        Ok(removed)
    }

    #[instrument(skip(self))]
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<AnimeListItem>, AppError> {
        let tables = self.tables.lock().unwrap();
        let mut items: Vec<AnimeListItem> = tables
            .user_anime
            .iter()
            .filter(|e| e.user_id == user_id)
            .filter_map(|e| {
                tables
                    .anime
                    .iter()
                    .find(|a| a.id == e.anime_id)
                    .map(|anime| AnimeListItem {
                        anime: anime.clone(),
                        status: e.status,
                    })
            })
            .collect();
        items.sort_by(|a, b| b.anime.created_at.cmp(&a.anime.created_at));

        debug!(count = items.len(), "Listed user anime from memory");
        Ok(items)
    }

    #[instrument(skip(self, changes))]
    async fn update_anime(
        &self,
        anime_id: &str,
        user_id: &str,
        changes: &AnimeUpdate,
    ) -> Result<Option<AnimeModel>, AppError> {
        let mut tables = self.tables.lock().unwrap();
        if !tables.is_tracked(anime_id, user_id) {
            debug!("Update target not tracked by user");
            return Ok(None);
        }
        let owned = tables
            .anime
            .iter()
            .any(|a| a.id == anime_id && a.user_id.as_deref() == Some(user_id));
        if !owned {
            debug!("Update target created by another user");
            return Ok(None);
        }

        if let Some(new_name) = &changes.name {
            if tables
                .anime
                .iter()
                .any(|a| a.id != anime_id && &a.name == new_name)
            {
                warn!(name = %new_name, "Rename collides with existing anime");
                return Err(AppError::DatabaseError(
                    "duplicate key value violates unique constraint \"anime_list_name_key\""
                        .to_string(),
                ));
            }
        }

        let updated = tables
            .anime
            .iter_mut()
            .find(|a| a.id == anime_id)
            .map(|anime| {
                anime.apply(changes);
                anime.clone()
            });

        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn update_status(
        &self,
        anime_id: &str,
        user_id: &str,
        status: WatchStatus,
    ) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let mut updated = false;
        for entry in tables
            .user_anime
            .iter_mut()
            .filter(|e| e.anime_id == anime_id && e.user_id == user_id)
        {
            entry.status = status;
            updated = true;
        }

        debug!(updated, "Status update applied in memory");
        Ok(updated)
    }
}
