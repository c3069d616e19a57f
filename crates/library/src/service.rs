use chrono::Utc;
use serde::Deserialize;
use shelf_core::types::{Rating, RatingChange, ReadingStatus, UserBook};
use shelf_core::{ShelfError, ShelfResult};
use shelf_recommendations::RefreshDispatcher;
use shelf_store::{CatalogStore, UserStore};
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddBookRequest {
    pub book_id: Uuid,
    #[serde(default)]
    pub status: ReadingStatus,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntryRequest {
    #[serde(default)]
    pub status: Option<ReadingStatus>,
    #[serde(default)]
    pub rating: Option<Rating>,
}

/// Applies library mutations, keeps book rating aggregates in step, and
/// dispatches a preference refresh after every change that affects the
/// preference model. The refresh never delays or fails the mutation.
pub struct LibraryService {
    users: Arc<dyn UserStore>,
    catalog: Arc<dyn CatalogStore>,
    refresh: Arc<dyn RefreshDispatcher>,
}

impl LibraryService {
    pub fn new(
        users: Arc<dyn UserStore>,
        catalog: Arc<dyn CatalogStore>,
        refresh: Arc<dyn RefreshDispatcher>,
    ) -> Self {
        Self {
            users,
            catalog,
            refresh,
        }
    }

    pub fn add_book(&self, user_id: Uuid, request: &AddBookRequest) -> ShelfResult<UserBook> {
        self.ensure_user(user_id)?;
        self.ensure_book(request.book_id)?;

        let entry = UserBook::new(request.book_id, request.status);
        self.users.insert_entry(user_id, entry.clone())?;

        info!(
            user_id = %user_id,
            book_id = %request.book_id,
            status = ?request.status,
            "Book added to library"
        );
        metrics::counter!("library.books.added").increment(1);
        self.refresh.schedule(user_id);
        Ok(entry)
    }

    /// Update status and/or rating of an existing entry. The book's
    /// aggregate is adjusted while the entry is locked, and the entry is
    /// left unchanged if that adjustment fails.
    pub fn update_entry(
        &self,
        user_id: Uuid,
        book_id: Uuid,
        request: &UpdateEntryRequest,
    ) -> ShelfResult<UserBook> {
        let mut change = None;
        let (previous, updated) = self
            .users
            .update_entry(user_id, book_id, &mut |current, entry| {
                if let Some(status) = request.status {
                    entry.set_status(status, Utc::now());
                }
                if let Some(rating) = request.rating {
                    entry.rating = Some(rating);
                }
                change = rating_change(current.rating, entry.rating);
                match change {
                    Some(change) => self.apply_rating_change(book_id, change),
                    None => Ok(()),
                }
            })?;

        if change.is_some() || previous.status != updated.status {
            self.refresh.schedule(user_id);
        }
        Ok(updated)
    }

    /// Remove a book from the library, retracting its rating from the
    /// book's aggregate.
    pub fn remove_book(&self, user_id: Uuid, book_id: Uuid) -> ShelfResult<UserBook> {
        let removed = self
            .users
            .remove_entry(user_id, book_id, &mut |entry| match entry.rating {
                Some(rating) => {
                    self.apply_rating_change(book_id, RatingChange::Removed(rating.value()))
                }
                None => Ok(()),
            })?
            .ok_or_else(|| ShelfError::NotFound(format!("book {book_id} is not in the library")))?;

        info!(user_id = %user_id, book_id = %book_id, "Book removed from library");
        metrics::counter!("library.books.removed").increment(1);
        self.refresh.schedule(user_id);
        Ok(removed)
    }

    /// Add or remove a favorite. Favorites need not be in the library.
    /// Returns whether anything changed.
    pub fn set_favorite(&self, user_id: Uuid, book_id: Uuid, favorite: bool) -> ShelfResult<bool> {
        if favorite {
            self.ensure_book(book_id)?;
        }
        let changed = self.users.set_favorite(user_id, book_id, favorite)?;
        if changed {
            self.refresh.schedule(user_id);
        }
        Ok(changed)
    }

    fn apply_rating_change(&self, book_id: Uuid, change: RatingChange) -> ShelfResult<()> {
        match self.catalog.apply_rating(book_id, change) {
            Ok(_) => Ok(()),
            // Entry outlived its catalog record; nothing to aggregate into.
            Err(ShelfError::NotFound(_)) => {
                warn!(book_id = %book_id, ?change, "Rating change for book missing from catalog");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn ensure_user(&self, user_id: Uuid) -> ShelfResult<()> {
        self.users
            .get_user(user_id)?
            .map(|_| ())
            .ok_or_else(|| ShelfError::user_not_found(user_id))
    }

    fn ensure_book(&self, book_id: Uuid) -> ShelfResult<()> {
        self.catalog
            .get_book(book_id)?
            .map(|_| ())
            .ok_or_else(|| ShelfError::book_not_found(book_id))
    }
}

fn rating_change(old: Option<Rating>, new: Option<Rating>) -> Option<RatingChange> {
    match (old, new) {
        (None, Some(new)) => Some(RatingChange::Added(new.value())),
        (Some(old), Some(new)) if old != new => Some(RatingChange::Changed {
            old: old.value(),
            new: new.value(),
        }),
        _ => None,
    }
}
