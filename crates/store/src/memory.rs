//! In-memory user and catalog store backed by DashMap.
//!
//! Production: replace with a document database. This provides the same API
//! surface for development and testing.

use crate::traits::{CatalogStore, UserStore};
use dashmap::DashMap;
use shelf_core::query::CandidateQuery;
use shelf_core::types::{
    popularity_order, Book, LibrarySnapshot, PreferenceModel, RatingChange, User, UserBook,
};
use shelf_core::{ShelfError, ShelfResult};
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

/// Thread-safe in-memory store for users and the book catalog.
pub struct MemoryStore {
    users: DashMap<Uuid, User>,
    books: DashMap<Uuid, Book>,
}

impl MemoryStore {
    pub fn new() -> Self {
        info!("Memory store initialized (in-memory, development mode)");
        Self {
            users: DashMap::new(),
            books: DashMap::new(),
        }
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn book_count(&self) -> usize {
        self.books.len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UserStore for MemoryStore {
    fn get_user(&self, user_id: Uuid) -> ShelfResult<Option<User>> {
        Ok(self.users.get(&user_id).map(|r| r.value().clone()))
    }

    fn insert_user(&self, user: User) -> ShelfResult<()> {
        if self.users.contains_key(&user.id) {
            return Err(ShelfError::Conflict(format!("user {} already exists", user.id)));
        }
        self.users.insert(user.id, user);
        Ok(())
    }

    fn library_snapshot(&self, user_id: Uuid) -> ShelfResult<Option<LibrarySnapshot>> {
        let Some(user) = self.users.get(&user_id) else {
            return Ok(None);
        };
        let entries = user.library.clone();
        let favorites = user.favorites.clone();
        drop(user);

        let ids: Vec<Uuid> = entries.iter().map(|e| e.book_id).collect();
        let books = self.get_books(&ids)?;
        debug!(
            user_id = %user_id,
            entries = entries.len(),
            resolved = books.len(),
            "Loaded library snapshot"
        );
        Ok(Some(LibrarySnapshot {
            entries,
            favorites,
            books,
        }))
    }

    fn replace_preferences(&self, user_id: Uuid, model: PreferenceModel) -> ShelfResult<()> {
        let mut user = self
            .users
            .get_mut(&user_id)
            .ok_or_else(|| ShelfError::user_not_found(user_id))?;
        user.preferences = model;
        Ok(())
    }

    fn insert_entry(&self, user_id: Uuid, entry: UserBook) -> ShelfResult<()> {
        let mut user = self
            .users
            .get_mut(&user_id)
            .ok_or_else(|| ShelfError::user_not_found(user_id))?;
        if user.entry(entry.book_id).is_some() {
            return Err(ShelfError::Conflict(format!(
                "book {} is already in the library",
                entry.book_id
            )));
        }
        user.library.push(entry);
        Ok(())
    }

    fn update_entry(
        &self,
        user_id: Uuid,
        book_id: Uuid,
        edit: &mut dyn FnMut(&UserBook, &mut UserBook) -> ShelfResult<()>,
    ) -> ShelfResult<(UserBook, UserBook)> {
        let mut user = self
            .users
            .get_mut(&user_id)
            .ok_or_else(|| ShelfError::user_not_found(user_id))?;
        let slot = user
            .library
            .iter_mut()
            .find(|e| e.book_id == book_id)
            .ok_or_else(|| ShelfError::NotFound(format!("book {book_id} is not in the library")))?;

        let mut updated = slot.clone();
        edit(slot, &mut updated)?;
        let previous = std::mem::replace(slot, updated.clone());
        Ok((previous, updated))
    }

    fn remove_entry(
        &self,
        user_id: Uuid,
        book_id: Uuid,
        before_remove: &mut dyn FnMut(&UserBook) -> ShelfResult<()>,
    ) -> ShelfResult<Option<UserBook>> {
        let mut user = self
            .users
            .get_mut(&user_id)
            .ok_or_else(|| ShelfError::user_not_found(user_id))?;
        let Some(idx) = user.library.iter().position(|e| e.book_id == book_id) else {
            return Ok(None);
        };
        before_remove(&user.library[idx])?;
        Ok(Some(user.library.remove(idx)))
    }

    fn set_favorite(&self, user_id: Uuid, book_id: Uuid, favorite: bool) -> ShelfResult<bool> {
        let mut user = self
            .users
            .get_mut(&user_id)
            .ok_or_else(|| ShelfError::user_not_found(user_id))?;
        let changed = if favorite {
            user.favorites.insert(book_id)
        } else {
            user.favorites.remove(&book_id)
        };
        Ok(changed)
    }
}

impl CatalogStore for MemoryStore {
    fn get_book(&self, book_id: Uuid) -> ShelfResult<Option<Book>> {
        Ok(self.books.get(&book_id).map(|r| r.value().clone()))
    }

    fn get_books(&self, book_ids: &[Uuid]) -> ShelfResult<HashMap<Uuid, Book>> {
        Ok(book_ids
            .iter()
            .filter_map(|id| self.books.get(id).map(|b| (*id, b.value().clone())))
            .collect())
    }

    fn insert_book(&self, book: Book) -> ShelfResult<()> {
        if self.books.contains_key(&book.id) {
            return Err(ShelfError::Conflict(format!("book {} already exists", book.id)));
        }
        self.books.insert(book.id, book);
        Ok(())
    }

    fn query(&self, query: &CandidateQuery) -> ShelfResult<Vec<Book>> {
        let mut rows: Vec<Book> = self
            .books
            .iter()
            .filter(|r| query.matches(r.value()))
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by(popularity_order);
        rows.truncate(query.limit);
        Ok(rows)
    }

    fn apply_rating(&self, book_id: Uuid, change: RatingChange) -> ShelfResult<Book> {
        let mut book = self
            .books
            .get_mut(&book_id)
            .ok_or_else(|| ShelfError::book_not_found(book_id))?;
        book.apply_rating(change);
        debug!(
            book_id = %book_id,
            average_rating = book.average_rating,
            total_ratings = book.total_ratings,
            "Rating aggregate updated"
        );
        Ok(book.value().clone())
    }
}
