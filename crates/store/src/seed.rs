//! Demo catalog and readers so a fresh development server returns useful
//! recommendations.

use crate::memory::MemoryStore;
use crate::traits::{CatalogStore, UserStore};
use shelf_core::types::{Book, Rating, ReadingStatus, User, UserBook};
use shelf_core::ShelfResult;
use tracing::info;
use uuid::Uuid;

/// Reader with a mystery/classics-leaning library.
pub const DEMO_READER_ID: Uuid = Uuid::from_u128(0x5e1f_0000_0000_0000_0000_0000_0000_0001);
/// Reader with an empty library; receives popularity-only results.
pub const DEMO_NEWCOMER_ID: Uuid = Uuid::from_u128(0x5e1f_0000_0000_0000_0000_0000_0000_0002);

const CATALOG: &[(&str, &str, &str, &[&str], f64, u32)] = &[
    ("OL1", "The Murder of Roger Ackroyd", "Agatha Christie", &["Mystery", "Classics"], 4.3, 1200),
    ("OL2", "And Then There Were None", "Agatha Christie", &["Mystery", "Thriller"], 4.4, 2100),
    ("OL3", "The Big Sleep", "Raymond Chandler", &["Mystery", "Noir"], 4.0, 640),
    ("OL4", "Pride and Prejudice", "Jane Austen", &["Classics", "Romance"], 4.5, 3300),
    ("OL5", "Emma", "Jane Austen", &["Classics", "Romance"], 4.0, 900),
    ("OL6", "Dune", "Frank Herbert", &["Science Fiction", "Classics"], 4.6, 4100),
    ("OL7", "The Left Hand of Darkness", "Ursula K. Le Guin", &["Science Fiction"], 4.2, 800),
    ("OL8", "A Wizard of Earthsea", "Ursula K. Le Guin", &["Fantasy"], 4.1, 950),
    ("OL9", "The Hobbit", "J.R.R. Tolkien", &["Fantasy", "Classics"], 4.7, 5200),
    ("OL10", "Gone Girl", "Gillian Flynn", &["Thriller", "Mystery"], 4.1, 2800),
    ("OL11", "Sapiens", "Yuval Noah Harari", &["Non-Fiction", "History"], 4.4, 3900),
    ("OL12", "The Name of the Rose", "Umberto Eco", &["Mystery", "Historical Fiction"], 4.2, 700),
];

/// Populate `store` with the demo catalog and two demo readers.
pub fn seed_demo_data(store: &MemoryStore) -> ShelfResult<()> {
    let mut ids = Vec::with_capacity(CATALOG.len());
    for (external_id, title, author, genres, avg, total) in CATALOG {
        let book = Book::new(*external_id, *title, *author, genres.iter().copied())
            .with_cover(format!("https://covers.example.org/{external_id}.jpg"))
            .with_ratings(*avg, *total);
        ids.push(book.id);
        store.insert_book(book)?;
    }

    let mut reader = User::new("demo-reader");
    reader.id = DEMO_READER_ID;
    store.insert_user(reader)?;

    let mut rated = UserBook::new(ids[0], ReadingStatus::Read);
    rated.rating = Some(Rating::new(5.0)?);
    store.insert_entry(DEMO_READER_ID, rated)?;

    let mut liked = UserBook::new(ids[4], ReadingStatus::Read);
    liked.rating = Some(Rating::new(4.0)?);
    store.insert_entry(DEMO_READER_ID, liked)?;

    store.insert_entry(DEMO_READER_ID, UserBook::new(ids[2], ReadingStatus::ToRead))?;
    store.set_favorite(DEMO_READER_ID, ids[0], true)?;

    let mut newcomer = User::new("demo-newcomer");
    newcomer.id = DEMO_NEWCOMER_ID;
    store.insert_user(newcomer)?;

    info!(
        books = store.book_count(),
        users = store.user_count(),
        "Seeded demo data"
    );
    Ok(())
}
