use serde::{Deserialize, Serialize};

use crate::entities::movie;

pub const TITLE_MAX_LEN: usize = 250;
pub const DESCRIPTION_MAX_LEN: usize = 350;
pub const REVIEW_MAX_LEN: usize = 250;
pub const RATING_MAX: f64 = 10.0;

pub const PLACEHOLDER_REVIEW: &str = "Not reviewed yet.";

/// A persisted catalog entry.
#[derive(Clone, Debug, PartialEq)]
pub struct Movie {
    pub id: i32,
    pub title: String,
    pub year: i32,
    pub description: String,
    pub rating: f64,
    pub ranking: i32,
    pub review: String,
    pub image_url: String,
}

impl From<movie::Model> for Movie {
    fn from(m: movie::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            year: m.year,
            description: m.description,
            rating: m.rating,
            ranking: m.ranking,
            review: m.review,
            image_url: m.image_url,
        }
    }
}

/// A movie that has not been stored yet.
#[derive(Clone, Debug, PartialEq)]
pub struct MovieDraft {
    pub title: String,
    pub year: i32,
    pub description: String,
    pub rating: f64,
    pub ranking: i32,
    pub review: String,
    pub image_url: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MovieUpdate {
    pub rating: Option<f64>,
    pub review: Option<String>,
}

impl MovieUpdate {
    pub fn is_empty(&self) -> bool {
        self.rating.is_none() && self.review.is_none()
    }
}

/// One TMDB search result. Round-trips through the selection form as JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MovieCandidate {
    pub id: i64,
    #[serde(default)]
    pub original_title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

impl MovieCandidate {
    pub fn release_year(&self) -> Option<i32> {
        let date = self.release_date.as_deref()?.trim();
        let year = date.get(..4)?;
        if !year.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        year.parse().ok()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectForm {
    #[serde(default)]
    pub candidate: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct EditForm {
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub review: String,
}
