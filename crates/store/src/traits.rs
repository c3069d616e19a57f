//! Storage collaborators consumed by the recommendation engine and the
//! library service.

use shelf_core::query::CandidateQuery;
use shelf_core::types::{Book, LibrarySnapshot, PreferenceModel, RatingChange, User, UserBook};
use shelf_core::ShelfResult;
use std::collections::HashMap;
use uuid::Uuid;

/// Per-user documents: library entries, favorites and the derived
/// preference model.
pub trait UserStore: Send + Sync {
    fn get_user(&self, user_id: Uuid) -> ShelfResult<Option<User>>;

    fn insert_user(&self, user: User) -> ShelfResult<()>;

    /// Load the user's entries and favorites together with every referenced
    /// book in a single batched read. `None` when the user does not exist.
    fn library_snapshot(&self, user_id: Uuid) -> ShelfResult<Option<LibrarySnapshot>>;

    /// Swap in a freshly computed model. Never merges with the old one.
    fn replace_preferences(&self, user_id: Uuid, model: PreferenceModel) -> ShelfResult<()>;

    /// Add a new entry; `Conflict` if the book is already in the library.
    fn insert_entry(&self, user_id: Uuid, entry: UserBook) -> ShelfResult<()>;

    /// Edit an existing entry in place, returning `(previous, updated)`.
    /// `NotFound` if the book is not in the library.
    ///
    /// `edit` runs on a copy while the user's record is locked; the copy is
    /// written back only if `edit` succeeds, so concurrent edits of the same
    /// library serialize and a failed edit leaves the entry untouched.
    fn update_entry(
        &self,
        user_id: Uuid,
        book_id: Uuid,
        edit: &mut dyn FnMut(&UserBook, &mut UserBook) -> ShelfResult<()>,
    ) -> ShelfResult<(UserBook, UserBook)>;

    /// Remove an entry, returning it if it was present. `before_remove`
    /// runs under the same lock; an error keeps the entry in place.
    fn remove_entry(
        &self,
        user_id: Uuid,
        book_id: Uuid,
        before_remove: &mut dyn FnMut(&UserBook) -> ShelfResult<()>,
    ) -> ShelfResult<Option<UserBook>>;

    /// Add or remove a favorite. Returns whether the set changed.
    fn set_favorite(&self, user_id: Uuid, book_id: Uuid, favorite: bool) -> ShelfResult<bool>;
}

/// The shared book catalog.
pub trait CatalogStore: Send + Sync {
    fn get_book(&self, book_id: Uuid) -> ShelfResult<Option<Book>>;

    /// Batched lookup; ids that do not resolve are left out of the map.
    fn get_books(&self, book_ids: &[Uuid]) -> ShelfResult<HashMap<Uuid, Book>>;

    fn insert_book(&self, book: Book) -> ShelfResult<()>;

    /// Run a candidate query. Rows come back sorted by
    /// `(average_rating desc, total_ratings desc)`, at most `query.limit`.
    fn query(&self, query: &CandidateQuery) -> ShelfResult<Vec<Book>>;

    /// Fold a rating change into the book's aggregate, returning the
    /// updated book.
    fn apply_rating(&self, book_id: Uuid, change: RatingChange) -> ShelfResult<Book>;
}
