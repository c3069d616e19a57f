use crate::error::{ShelfError, ShelfResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use utoipa::ToSchema;
use uuid::Uuid;

/// A catalog book. Descriptive fields are cached locally from the external
/// metadata provider; the rating aggregate is maintained by the catalog store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: Uuid,
    /// Identifier assigned by the external metadata provider.
    pub external_id: String,
    pub title: String,
    pub author: String,
    pub genres: Vec<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    /// Mean of all user ratings, 0 when `total_ratings` is 0.
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub total_ratings: u32,
}

impl Book {
    pub fn new(
        external_id: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
        genres: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let mut seen = HashSet::new();
        let genres = genres
            .into_iter()
            .map(Into::into)
            .filter(|g: &String| seen.insert(g.clone()))
            .collect();
        Self {
            id: Uuid::new_v4(),
            external_id: external_id.into(),
            title: title.into(),
            author: author.into(),
            genres,
            cover_image: None,
            average_rating: 0.0,
            total_ratings: 0,
        }
    }

    pub fn with_cover(mut self, url: impl Into<String>) -> Self {
        self.cover_image = Some(url.into());
        self
    }

    pub fn with_ratings(mut self, average_rating: f64, total_ratings: u32) -> Self {
        self.total_ratings = total_ratings;
        self.average_rating = if total_ratings == 0 { 0.0 } else { average_rating };
        self
    }

    /// `average_rating * ln(total_ratings + 1)`. Unrated books score 0.
    pub fn popularity(&self) -> f64 {
        self.average_rating * (self.total_ratings as f64 + 1.0).ln()
    }

    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g == genre)
    }

    /// Fold a user rating event into the aggregate.
    pub fn apply_rating(&mut self, change: RatingChange) {
        let n = self.total_ratings as f64;
        let sum = self.average_rating * n;
        match change {
            RatingChange::Added(r) => {
                self.total_ratings += 1;
                self.average_rating = (sum + r) / (n + 1.0);
            }
            RatingChange::Changed { old, new } => {
                if self.total_ratings == 0 {
                    // Aggregate lost the original rating; count the new one fresh.
                    self.total_ratings = 1;
                    self.average_rating = new;
                } else {
                    self.average_rating = (sum - old + new) / n;
                }
            }
            RatingChange::Removed(r) => {
                if self.total_ratings <= 1 {
                    self.total_ratings = 0;
                    self.average_rating = 0.0;
                } else {
                    self.total_ratings -= 1;
                    self.average_rating = (sum - r) / (n - 1.0);
                }
            }
        }
        self.average_rating = self.average_rating.clamp(0.0, Rating::MAX);
    }
}

/// Orders books by `(average_rating desc, total_ratings desc)`.
pub fn popularity_order(a: &Book, b: &Book) -> Ordering {
    b.average_rating
        .partial_cmp(&a.average_rating)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.total_ratings.cmp(&a.total_ratings))
}

/// A change to a book's rating aggregate caused by one user's library entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RatingChange {
    Added(f64),
    Changed { old: f64, new: f64 },
    Removed(f64),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ReadingStatus {
    #[default]
    ToRead,
    Reading,
    Read,
}

/// A user rating in half-star steps from 1 to 5.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "f64", into = "f64")]
pub struct Rating(f64);

impl Rating {
    pub const MIN: f64 = 1.0;
    pub const MAX: f64 = 5.0;

    pub fn new(value: f64) -> ShelfResult<Self> {
        if !(Self::MIN..=Self::MAX).contains(&value) || (value * 2.0).fract() != 0.0 {
            return Err(ShelfError::InvalidArgument(format!(
                "rating must be between 1 and 5 in steps of 0.5, got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Rating {
    type Error = ShelfError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for f64 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

/// Membership of one book in one user's library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserBook {
    pub book_id: Uuid,
    pub status: ReadingStatus,
    #[serde(default)]
    pub rating: Option<Rating>,
    pub date_added: DateTime<Utc>,
    #[serde(default)]
    pub date_started: Option<DateTime<Utc>>,
    #[serde(default)]
    pub date_completed: Option<DateTime<Utc>>,
}

impl UserBook {
    pub fn new(book_id: Uuid, status: ReadingStatus) -> Self {
        let now = Utc::now();
        let mut entry = Self {
            book_id,
            status: ReadingStatus::ToRead,
            rating: None,
            date_added: now,
            date_started: None,
            date_completed: None,
        };
        entry.set_status(status, now);
        entry
    }

    /// Move to `status`, stamping the start/completion dates the first time
    /// the entry reaches them.
    pub fn set_status(&mut self, status: ReadingStatus, now: DateTime<Utc>) {
        match status {
            ReadingStatus::ToRead => {}
            ReadingStatus::Reading => {
                self.date_started.get_or_insert(now);
            }
            ReadingStatus::Read => {
                self.date_started.get_or_insert(now);
                self.date_completed.get_or_insert(now);
            }
        }
        self.status = status;
    }
}

/// Derived per-user topical preferences. Always rebuilt wholesale from the
/// user's library, favorites and the referenced books.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceModel {
    pub preferred_genres: HashMap<String, f64>,
    pub preferred_authors: HashMap<String, f64>,
    /// Mean of the user's own ratings; absent when nothing is rated.
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub total_books_read: u32,
}

impl PreferenceModel {
    pub fn has_preferences(&self) -> bool {
        !self.preferred_genres.is_empty() || !self.preferred_authors.is_empty()
    }

    /// Highest-weighted genres. Ties keep map iteration order, which is
    /// unspecified.
    pub fn top_genres(&self, n: usize) -> Vec<String> {
        top_keys(&self.preferred_genres, n)
    }

    pub fn top_authors(&self, n: usize) -> Vec<String> {
        top_keys(&self.preferred_authors, n)
    }
}

fn top_keys(weights: &HashMap<String, f64>, n: usize) -> Vec<String> {
    let mut entries: Vec<(&String, f64)> = weights.iter().map(|(k, v)| (k, *v)).collect();
    entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    entries.into_iter().take(n).map(|(k, _)| k.clone()).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub library: Vec<UserBook>,
    #[serde(default)]
    pub favorites: HashSet<Uuid>,
    #[serde(default)]
    pub preferences: PreferenceModel,
}

impl User {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            library: Vec::new(),
            favorites: HashSet::new(),
            preferences: PreferenceModel::default(),
        }
    }

    pub fn entry(&self, book_id: Uuid) -> Option<&UserBook> {
        self.library.iter().find(|e| e.book_id == book_id)
    }

    pub fn owned_book_ids(&self) -> HashSet<Uuid> {
        self.library.iter().map(|e| e.book_id).collect()
    }
}

/// A user's library joined with the books it references, loaded in one
/// store call.
#[derive(Debug, Clone, Default)]
pub struct LibrarySnapshot {
    pub entries: Vec<UserBook>,
    pub favorites: HashSet<Uuid>,
    /// Referenced books by id. Entries whose book no longer resolves are
    /// simply absent.
    pub books: HashMap<Uuid, Book>,
}
