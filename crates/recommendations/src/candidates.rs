//! Candidate retrieval: turn a user's top genres/authors into a bounded
//! catalog query.

use shelf_core::query::{CandidateFilter, CandidateQuery};

/// Build the candidate pool query.
///
/// An explicit `genre_filter` wins outright: membership is that genre only and
/// preferences are left to the scorer. Otherwise books match on any top genre
/// or any top author, and with no preferences at all the whole catalog is
/// eligible. `pool_size` bounds the rows the store returns.
pub fn build_candidates(
    top_genres: &[String],
    top_authors: &[String],
    genre_filter: Option<&str>,
    pool_size: usize,
) -> CandidateQuery {
    let filter = match genre_filter {
        Some(genre) => CandidateFilter::Genre {
            genre: genre.to_string(),
        },
        None if top_genres.is_empty() && top_authors.is_empty() => CandidateFilter::All,
        None => CandidateFilter::Matching {
            genres: top_genres.to_vec(),
            authors: top_authors.to_vec(),
        },
    };

    CandidateQuery {
        filter,
        limit: pool_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_genre_filter_takes_precedence() {
        let query = build_candidates(
            &strings(&["Fantasy"]),
            &strings(&["Tolkien"]),
            Some("Mystery"),
            50,
        );
        assert_eq!(
            query.filter,
            CandidateFilter::Genre {
                genre: "Mystery".into()
            }
        );
        assert_eq!(query.limit, 50);
    }

    #[test]
    fn test_preferences_build_or_query() {
        let query = build_candidates(&strings(&["Fantasy", "Horror"]), &[], None, 25);
        assert_eq!(
            query.filter,
            CandidateFilter::Matching {
                genres: strings(&["Fantasy", "Horror"]),
                authors: vec![],
            }
        );
    }

    #[test]
    fn test_no_preferences_matches_whole_catalog() {
        let query = build_candidates(&[], &[], None, 10);
        assert_eq!(query.filter, CandidateFilter::All);
        assert_eq!(query.limit, 10);
    }
}
