//! Library membership mutations: the trigger points for preference refresh
//! and for the catalog's rating aggregates.

#![warn(clippy::unwrap_used)]

pub mod service;

pub use service::{AddBookRequest, LibraryService, UpdateEntryRequest};
