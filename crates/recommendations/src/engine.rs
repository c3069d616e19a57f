//! Recommendation orchestrator: loads the user's preference model, pulls a
//! bounded candidate pool, scores and ranks it.

use crate::candidates::build_candidates;
use crate::scorer::score;
use serde::{Deserialize, Serialize};
use shelf_core::config::RecommendationConfig;
use shelf_core::types::Book;
use shelf_core::{ShelfError, ShelfResult};
use shelf_store::{CatalogStore, UserStore};
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;
use utoipa::ToSchema;
use uuid::Uuid;

const MAX_GENRE_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub genres: Vec<String>,
    pub cover_image: Option<String>,
    pub average_rating: f64,
    /// Relevance score rounded to two decimals.
    pub score: f64,
}

/// The preference keys a result was built from. Both lists are empty when
/// the user has no personalization yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BasedOn {
    pub top_genres: Vec<String>,
    pub top_authors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResponse {
    pub recommendations: Vec<Recommendation>,
    pub based_on: BasedOn,
}

pub struct RecommendationEngine {
    users: Arc<dyn UserStore>,
    catalog: Arc<dyn CatalogStore>,
    config: RecommendationConfig,
}

impl RecommendationEngine {
    pub fn new(
        users: Arc<dyn UserStore>,
        catalog: Arc<dyn CatalogStore>,
        config: RecommendationConfig,
    ) -> Self {
        Self {
            users,
            catalog,
            config,
        }
    }

    /// Rank unowned books for `user_id`.
    ///
    /// `limit` defaults from config and is capped at `max_limit`. A
    /// `genre_filter` restricts membership to that genre while the user's
    /// preferences still drive the ranking.
    pub fn recommend(
        &self,
        user_id: Uuid,
        limit: Option<usize>,
        genre_filter: Option<&str>,
    ) -> ShelfResult<RecommendationResponse> {
        let start = Instant::now();
        let limit = self.resolve_limit(limit)?;
        let genre_filter = genre_filter.map(normalize_genre).transpose()?;

        let user = self
            .users
            .get_user(user_id)?
            .ok_or_else(|| ShelfError::user_not_found(user_id))?;
        let owned = user.owned_book_ids();
        let model = &user.preferences;
        let has_preferences = model.has_preferences();

        let top_genres = model.top_genres(self.config.top_n);
        let top_authors = model.top_authors(self.config.top_n);

        let query = build_candidates(
            &top_genres,
            &top_authors,
            genre_filter,
            limit * self.config.pool_factor,
        );
        let candidates = self.catalog.query(&query)?;
        let pool_size = candidates.len();

        let mut scored: Vec<(Book, f64)> = candidates
            .into_iter()
            .filter(|book| !owned.contains(&book.id))
            .map(|book| {
                let s = score(
                    &book,
                    &model.preferred_genres,
                    &model.preferred_authors,
                    has_preferences,
                );
                (book, s)
            })
            .collect();

        // Stable: equal scores keep the store's popularity order.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(limit);

        let recommendations: Vec<Recommendation> = scored
            .into_iter()
            .map(|(book, s)| Recommendation {
                id: book.id,
                title: book.title,
                author: book.author,
                genres: book.genres,
                cover_image: book.cover_image,
                average_rating: book.average_rating,
                score: round2(s),
            })
            .collect();

        metrics::counter!("recommendations.requests").increment(1);
        metrics::histogram!("recommendations.latency_us")
            .record(start.elapsed().as_micros() as f64);
        debug!(
            user_id = %user_id,
            limit,
            pool_size,
            returned = recommendations.len(),
            personalized = has_preferences,
            genre_filter = genre_filter.unwrap_or(""),
            "Recommendations computed"
        );

        Ok(RecommendationResponse {
            recommendations,
            based_on: BasedOn {
                top_genres,
                top_authors,
            },
        })
    }

    fn resolve_limit(&self, limit: Option<usize>) -> ShelfResult<usize> {
        match limit {
            None => Ok(self.config.default_limit.min(self.config.max_limit)),
            Some(0) => Err(ShelfError::InvalidArgument(
                "limit must be at least 1".to_string(),
            )),
            Some(n) => Ok(n.min(self.config.max_limit)),
        }
    }
}

fn normalize_genre(genre: &str) -> ShelfResult<&str> {
    let genre = genre.trim();
    if genre.is_empty() {
        return Err(ShelfError::InvalidArgument(
            "genre must not be empty".to_string(),
        ));
    }
    if genre.chars().count() > MAX_GENRE_LEN {
        return Err(ShelfError::InvalidArgument(
            "genre exceeds maximum length".to_string(),
        ));
    }
    Ok(genre)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::PreferenceRecomputer;
    use shelf_core::types::{Rating, ReadingStatus, User, UserBook};
    use shelf_store::MemoryStore;

    struct Fixture {
        store: Arc<MemoryStore>,
        engine: RecommendationEngine,
        recomputer: PreferenceRecomputer,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let engine = RecommendationEngine::new(
            store.clone(),
            store.clone(),
            RecommendationConfig::default(),
        );
        let recomputer = PreferenceRecomputer::new(store.clone());
        Fixture {
            store,
            engine,
            recomputer,
        }
    }

    fn add_book(
        store: &MemoryStore,
        title: &str,
        author: &str,
        genres: &[&str],
        avg: f64,
        n: u32,
    ) -> Uuid {
        let book = Book::new(title, title, author, genres.iter().copied()).with_ratings(avg, n);
        let id = book.id;
        store.insert_book(book).unwrap();
        id
    }

    fn add_user(store: &MemoryStore) -> Uuid {
        let user = User::new("reader");
        let id = user.id;
        store.insert_user(user).unwrap();
        id
    }

    fn rate(store: &MemoryStore, user_id: Uuid, book_id: Uuid, rating: f64) {
        let mut entry = UserBook::new(book_id, ReadingStatus::Read);
        entry.rating = Some(Rating::new(rating).unwrap());
        store.insert_entry(user_id, entry).unwrap();
    }

    fn titles(response: &RecommendationResponse) -> Vec<&str> {
        response
            .recommendations
            .iter()
            .map(|r| r.title.as_str())
            .collect()
    }

    #[test]
    fn test_same_author_and_genre_outranks_unrelated() {
        let f = fixture();
        let a = add_book(&f.store, "A", "X", &["Fiction"], 4.0, 10);
        add_book(&f.store, "B", "X", &["Fiction"], 4.5, 100);
        add_book(&f.store, "C", "Y", &["Non-Fiction"], 4.5, 100);
        let user_id = add_user(&f.store);
        rate(&f.store, user_id, a, 5.0);
        f.recomputer.recompute(user_id).unwrap();

        // C has no genre/author overlap, so it is not even a candidate.
        let response = f.engine.recommend(user_id, Some(10), None).unwrap();
        assert_eq!(titles(&response), vec!["B"]);
        assert_eq!(response.based_on.top_genres, vec!["Fiction"]);
        assert_eq!(response.based_on.top_authors, vec!["X"]);

        // Under a filter that admits both, the preference match still wins.
        f.store
            .insert_book(
                Book::new("D", "D", "Y", ["Non-Fiction", "Fiction"]).with_ratings(4.5, 100),
            )
            .unwrap();
        let response = f.engine.recommend(user_id, Some(10), Some("Fiction")).unwrap();
        assert_eq!(titles(&response), vec!["B", "D"]);
    }

    #[test]
    fn test_owned_books_are_excluded() {
        let f = fixture();
        let owned = add_book(&f.store, "Owned", "X", &["Fiction"], 5.0, 1000);
        add_book(&f.store, "Other", "X", &["Fiction"], 3.0, 10);
        let user_id = add_user(&f.store);
        rate(&f.store, user_id, owned, 5.0);
        f.recomputer.recompute(user_id).unwrap();

        let response = f.engine.recommend(user_id, None, None).unwrap();
        assert!(response.recommendations.iter().all(|r| r.id != owned));
        assert_eq!(titles(&response), vec!["Other"]);
    }

    #[test]
    fn test_cold_start_ranks_by_popularity() {
        let f = fixture();
        add_book(&f.store, "Niche", "A", &["Poetry"], 5.0, 2);
        add_book(&f.store, "Classic", "B", &["Classics"], 4.2, 5000);
        add_book(&f.store, "New", "C", &["Fantasy"], 0.0, 0);
        let user_id = add_user(&f.store);

        let response = f.engine.recommend(user_id, None, None).unwrap();
        assert!(response.based_on.top_genres.is_empty());
        assert!(response.based_on.top_authors.is_empty());
        assert_eq!(titles(&response), vec!["Classic", "Niche", "New"]);
        assert_eq!(response.recommendations[2].score, 0.0);
        let expected = round2(4.2 * 5001f64.ln());
        assert_eq!(response.recommendations[0].score, expected);
    }

    #[test]
    fn test_limit_is_capped() {
        let f = fixture();
        for i in 0..120 {
            add_book(&f.store, &format!("Book {i}"), "A", &["Fiction"], 4.0, i);
        }
        let user_id = add_user(&f.store);
        let response = f.engine.recommend(user_id, Some(100), None).unwrap();
        assert_eq!(response.recommendations.len(), 50);

        let response = f.engine.recommend(user_id, Some(3), None).unwrap();
        assert_eq!(response.recommendations.len(), 3);
    }

    #[test]
    fn test_zero_limit_rejected() {
        let f = fixture();
        let user_id = add_user(&f.store);
        let err = f.engine.recommend(user_id, Some(0), None).unwrap_err();
        assert!(matches!(err, ShelfError::InvalidArgument(_)));
    }

    #[test]
    fn test_genre_filter_restricts_membership() {
        let f = fixture();
        let liked = add_book(&f.store, "Liked", "X", &["Romance"], 4.0, 10);
        add_book(&f.store, "Romance Pick", "X", &["Romance"], 4.9, 900);
        add_book(&f.store, "Whodunit", "Y", &["Mystery"], 4.0, 50);
        add_book(&f.store, "Cozy", "Z", &["Mystery", "Romance"], 3.5, 20);
        let user_id = add_user(&f.store);
        rate(&f.store, user_id, liked, 5.0);
        f.recomputer.recompute(user_id).unwrap();

        let response = f
            .engine
            .recommend(user_id, None, Some(" Mystery "))
            .unwrap();
        assert_eq!(titles(&response), vec!["Cozy", "Whodunit"]);
        assert_eq!(response.based_on.top_genres, vec!["Romance"]);
    }

    #[test]
    fn test_blank_genre_rejected() {
        let f = fixture();
        let user_id = add_user(&f.store);
        let err = f.engine.recommend(user_id, None, Some("  ")).unwrap_err();
        assert!(matches!(err, ShelfError::InvalidArgument(_)));
        let long = "g".repeat(MAX_GENRE_LEN + 1);
        let err = f.engine.recommend(user_id, None, Some(&long)).unwrap_err();
        assert!(matches!(err, ShelfError::InvalidArgument(_)));
    }

    #[test]
    fn test_unknown_user_is_not_found() {
        let f = fixture();
        let err = f.engine.recommend(Uuid::new_v4(), None, None).unwrap_err();
        assert!(matches!(err, ShelfError::NotFound(_)));
    }

    #[test]
    fn test_scores_rounded_to_two_decimals() {
        assert_eq!(round2(1.23456), 1.23);
        assert_eq!(round2(2.0 / 3.0), 0.67);
    }
}
