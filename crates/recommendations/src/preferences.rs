//! Preference recomputation: rebuild a user's weighted genre/author model
//! from their current library.

use crate::weight::weight;
use shelf_core::types::{LibrarySnapshot, PreferenceModel, ReadingStatus};
use shelf_core::{ShelfError, ShelfResult};
use shelf_store::UserStore;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

/// Build a fresh model from a library snapshot. Pure: the result depends only
/// on the entries, favorites and referenced books.
pub fn build_preferences(snapshot: &LibrarySnapshot) -> PreferenceModel {
    let mut preferred_genres: HashMap<String, f64> = HashMap::new();
    let mut preferred_authors: HashMap<String, f64> = HashMap::new();

    for entry in &snapshot.entries {
        let Some(book) = snapshot.books.get(&entry.book_id) else {
            continue;
        };

        let w = weight(
            entry.rating.map(|r| r.value()),
            snapshot.favorites.contains(&entry.book_id),
            entry.status,
        );
        if w <= 0.0 {
            continue;
        }

        for genre in &book.genres {
            *preferred_genres.entry(genre.clone()).or_insert(0.0) += w;
        }
        *preferred_authors.entry(book.author.clone()).or_insert(0.0) += w;
    }

    let ratings: Vec<f64> = snapshot
        .entries
        .iter()
        .filter_map(|e| e.rating.map(|r| r.value()))
        .collect();
    let average_rating = if ratings.is_empty() {
        None
    } else {
        Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
    };

    let total_books_read = snapshot
        .entries
        .iter()
        .filter(|e| e.status == ReadingStatus::Read)
        .count() as u32;

    PreferenceModel {
        preferred_genres,
        preferred_authors,
        average_rating,
        total_books_read,
    }
}

/// Loads a user's library and replaces their stored preference model.
pub struct PreferenceRecomputer {
    users: Arc<dyn UserStore>,
}

impl PreferenceRecomputer {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Recompute and store the model for `user_id`. The old model stays in
    /// place unless the new one is fully built.
    pub fn recompute(&self, user_id: Uuid) -> ShelfResult<PreferenceModel> {
        let start = Instant::now();

        let snapshot = self
            .users
            .library_snapshot(user_id)?
            .ok_or_else(|| ShelfError::user_not_found(user_id))?;

        let model = build_preferences(&snapshot);
        self.users.replace_preferences(user_id, model.clone())?;

        let elapsed = start.elapsed();
        metrics::counter!("preferences.recompute.success").increment(1);
        metrics::histogram!("preferences.recompute.latency_us").record(elapsed.as_micros() as f64);

        if model.has_preferences() {
            debug!(
                user_id = %user_id,
                genres = model.preferred_genres.len(),
                authors = model.preferred_authors.len(),
                books_read = model.total_books_read,
                "Preferences recomputed"
            );
        } else {
            info!(user_id = %user_id, "Preferences recomputed, no signal yet");
        }

        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_core::types::{Book, Rating, User, UserBook};
    use shelf_store::{CatalogStore, MemoryStore};

    fn entry(book: &Book, status: ReadingStatus, rating: Option<f64>) -> UserBook {
        let mut e = UserBook::new(book.id, status);
        e.rating = rating.map(|r| Rating::new(r).unwrap());
        e
    }

    #[test]
    fn test_weights_accumulate_per_genre_and_author() {
        let a = Book::new("a", "A", "Christie", ["Mystery", "Classics"]);
        let b = Book::new("b", "B", "Christie", ["Mystery"]);
        let snapshot = LibrarySnapshot {
            entries: vec![
                entry(&a, ReadingStatus::Read, Some(5.0)),
                entry(&b, ReadingStatus::Read, Some(4.0)),
            ],
            favorites: [b.id].into_iter().collect(),
            books: [(a.id, a.clone()), (b.id, b.clone())].into_iter().collect(),
        };

        let model = build_preferences(&snapshot);
        // a: 1.0, b: 0.667 + 0.5
        let expected_b = 2.0 / 3.0 + 0.5;
        assert!((model.preferred_genres["Mystery"] - (1.0 + expected_b)).abs() < 1e-9);
        assert!((model.preferred_genres["Classics"] - 1.0).abs() < 1e-9);
        assert!((model.preferred_authors["Christie"] - (1.0 + expected_b)).abs() < 1e-9);
        assert_eq!(model.average_rating, Some(4.5));
        assert_eq!(model.total_books_read, 2);
    }

    #[test]
    fn test_zero_weight_entries_are_skipped() {
        let meh = Book::new("m", "Meh", "Nobody", ["Horror"]);
        let snapshot = LibrarySnapshot {
            entries: vec![entry(&meh, ReadingStatus::Read, Some(2.5))],
            favorites: Default::default(),
            books: [(meh.id, meh.clone())].into_iter().collect(),
        };

        let model = build_preferences(&snapshot);
        assert!(!model.has_preferences());
        // Rollups still count the entry.
        assert_eq!(model.average_rating, Some(2.5));
        assert_eq!(model.total_books_read, 1);
    }

    #[test]
    fn test_unresolved_books_are_ignored() {
        let ghost = Book::new("g", "Ghost", "Nobody", ["Horror"]);
        let snapshot = LibrarySnapshot {
            entries: vec![entry(&ghost, ReadingStatus::ToRead, None)],
            favorites: Default::default(),
            books: HashMap::new(),
        };
        let model = build_preferences(&snapshot);
        assert!(model.preferred_genres.is_empty());
        assert_eq!(model.average_rating, None);
        assert_eq!(model.total_books_read, 0);
    }

    #[test]
    fn test_recompute_is_idempotent_and_overwrites() {
        let store = Arc::new(MemoryStore::new());
        let book = Book::new("a", "A", "Le Guin", ["Fantasy"]);
        let book_id = book.id;
        store.insert_book(book).unwrap();

        let mut user = User::new("reader");
        user.preferences
            .preferred_genres
            .insert("Stale".to_string(), 9.0);
        let user_id = user.id;
        store.insert_user(user).unwrap();
        let mut rated = UserBook::new(book_id, ReadingStatus::Read);
        rated.rating = Some(Rating::new(4.5).unwrap());
        store.insert_entry(user_id, rated).unwrap();

        let recomputer = PreferenceRecomputer::new(store.clone());
        let first = recomputer.recompute(user_id).unwrap();
        let second = recomputer.recompute(user_id).unwrap();
        assert_eq!(first, second);
        assert!(!first.preferred_genres.contains_key("Stale"));

        let stored = store.get_user(user_id).unwrap().unwrap().preferences;
        assert_eq!(stored, second);
    }

    #[test]
    fn test_recompute_unknown_user_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let recomputer = PreferenceRecomputer::new(store);
        let err = recomputer.recompute(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, ShelfError::NotFound(_)));
    }
}
