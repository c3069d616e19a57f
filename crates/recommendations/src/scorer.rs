//! Relevance scoring for a single candidate book.

use shelf_core::types::Book;
use std::collections::HashMap;

/// An author match counts double a single genre match.
const AUTHOR_MULTIPLIER: f64 = 2.0;
/// Popularity only breaks ties between similar preference matches.
const POPULARITY_DAMPING: f64 = 0.1;

/// Score `book` against a user's preference maps.
///
/// Without preferences this is plain popularity,
/// `average_rating * ln(total_ratings + 1)`; books nobody has rated score 0
/// whatever their rating field says. With preferences it is the summed genre
/// weights plus twice the author weight plus a damped popularity term.
pub fn score(
    book: &Book,
    preferred_genres: &HashMap<String, f64>,
    preferred_authors: &HashMap<String, f64>,
    has_preferences: bool,
) -> f64 {
    let popularity = book.popularity();
    if !has_preferences {
        return popularity;
    }

    let genre_score: f64 = book
        .genres
        .iter()
        .filter_map(|g| preferred_genres.get(g))
        .sum();
    let author_score = preferred_authors.get(&book.author).copied().unwrap_or(0.0);

    genre_score + AUTHOR_MULTIPLIER * author_score + POPULARITY_DAMPING * popularity
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_popularity_only_without_preferences() {
        let book = Book::new("x", "X", "A", ["Fiction"]).with_ratings(4.0, 99);
        let s = score(&book, &HashMap::new(), &HashMap::new(), false);
        assert!((s - 4.0 * 100f64.ln()).abs() < 1e-9);
    }

    #[test]
    fn test_unrated_book_scores_zero_popularity() {
        let book = Book::new("x", "X", "A", ["Fiction"]);
        assert_eq!(score(&book, &HashMap::new(), &HashMap::new(), false), 0.0);
    }

    #[test]
    fn test_personalized_blend() {
        let book = Book::new("x", "X", "Herbert", ["Science Fiction", "Classics"])
            .with_ratings(4.0, 0);
        let genres = weights(&[("Science Fiction", 1.0), ("Classics", 0.5), ("Horror", 3.0)]);
        let authors = weights(&[("Herbert", 0.75)]);
        let s = score(&book, &genres, &authors, true);
        assert!((s - (1.5 + 2.0 * 0.75)).abs() < 1e-9);
    }

    #[test]
    fn test_author_match_outweighs_genre_match() {
        let by_author = Book::new("a", "A", "Christie", ["Romance"]).with_ratings(4.0, 10);
        let by_genre = Book::new("b", "B", "Someone", ["Mystery"]).with_ratings(4.0, 10);
        let genres = weights(&[("Mystery", 1.0)]);
        let authors = weights(&[("Christie", 1.0)]);
        assert!(
            score(&by_author, &genres, &authors, true) > score(&by_genre, &genres, &authors, true)
        );
    }

    #[test]
    fn test_popularity_breaks_ties() {
        let popular = Book::new("a", "A", "X", ["Fantasy"]).with_ratings(4.5, 1000);
        let obscure = Book::new("b", "B", "Y", ["Fantasy"]).with_ratings(4.5, 3);
        let genres = weights(&[("Fantasy", 1.0)]);
        let none = HashMap::new();
        assert!(score(&popular, &genres, &none, true) > score(&obscure, &genres, &none, true));
    }
}
