use serde::{Deserialize, Serialize};

/// Query string for catalogue search
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub limit: Option<u32>,
}

/// Normalised catalogue entry returned to clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub mal_id: u64,
    pub title: String,
    pub image_url: Option<String>,
    pub score: Option<f64>,
    pub genres: Vec<String>,
}

// Jikan v4 response shapes, only the fields we keep

#[derive(Debug, Deserialize)]
pub(crate) struct JikanSearchResponse {
    #[serde(default)]
    pub data: Vec<JikanAnime>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JikanAnime {
    pub mal_id: u64,
    pub title: String,
    #[serde(default)]
    pub images: Option<JikanImages>,
    pub score: Option<f64>,
    #[serde(default)]
    pub genres: Vec<JikanNamed>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JikanImages {
    pub jpg: Option<JikanImage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JikanImage {
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JikanNamed {
    pub name: String,
}

impl From<JikanAnime> for SearchResult {
    fn from(anime: JikanAnime) -> Self {
        Self {
            mal_id: anime.mal_id,
            title: anime.title,
            image_url: anime
                .images
                .and_then(|images| images.jpg)
                .and_then(|jpg| jpg.image_url),
            score: anime.score,
            genres: anime.genres.into_iter().map(|g| g.name).collect(),
        }
    }
}
