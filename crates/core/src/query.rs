//! Catalog query description handed to the catalog store. The store decides
//! how to execute it but must honour the ordering and the row limit.

use crate::types::Book;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CandidateFilter {
    /// Only books tagged with this genre.
    Genre { genre: String },
    /// Books in any of `genres` or written by any of `authors`.
    Matching {
        genres: Vec<String>,
        authors: Vec<String>,
    },
    /// The whole catalog.
    All,
}

/// A bounded catalog read. Results are sorted by
/// `(average_rating desc, total_ratings desc)` and hold at most `limit` rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateQuery {
    pub filter: CandidateFilter,
    pub limit: usize,
}

impl CandidateQuery {
    pub fn matches(&self, book: &Book) -> bool {
        match &self.filter {
            CandidateFilter::Genre { genre } => book.has_genre(genre),
            CandidateFilter::Matching { genres, authors } => {
                authors.iter().any(|a| *a == book.author)
                    || book.genres.iter().any(|g| genres.contains(g))
            }
            CandidateFilter::All => true,
        }
    }
}
