//! Per-book interest signal.

use shelf_core::types::ReadingStatus;

/// Ratings at or below this carry no positive signal.
const NEUTRAL_RATING: f64 = 2.5;
/// Flat bonus for favorited books, applied even when unrated.
pub const FAVORITE_BONUS: f64 = 0.5;
/// Latent interest of an unrated, unfavorited want-to-read book.
pub const TO_READ_WEIGHT: f64 = 0.1;

/// Map one library entry's rating, favorite flag and status to a
/// non-negative weight. Rating weight is `(rating - 2) / 3`, reaching 1.0 at
/// five stars.
pub fn weight(rating: Option<f64>, is_favorite: bool, status: ReadingStatus) -> f64 {
    let mut weight = match rating {
        Some(r) if r > NEUTRAL_RATING => ((r - 2.0) / 3.0).max(0.0),
        _ => 0.0,
    };

    if is_favorite {
        weight += FAVORITE_BONUS;
    }

    if weight == 0.0 && status == ReadingStatus::ToRead {
        weight = TO_READ_WEIGHT;
    }

    weight
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATINGS: [f64; 9] = [1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0, 4.5, 5.0];

    #[test]
    fn test_low_ratings_carry_no_weight() {
        for r in RATINGS.iter().copied().filter(|r| *r <= 2.5) {
            assert_eq!(weight(Some(r), false, ReadingStatus::Read), 0.0);
            assert_eq!(weight(Some(r), false, ReadingStatus::Reading), 0.0);
        }
        assert_eq!(weight(None, false, ReadingStatus::Read), 0.0);
    }

    #[test]
    fn test_rating_weight_is_monotonic_and_saturates() {
        let mut previous = 0.0;
        for r in RATINGS.iter().copied().filter(|r| *r > 2.5) {
            let w = weight(Some(r), false, ReadingStatus::Read);
            assert!(w >= previous, "weight dropped at rating {r}");
            assert!(w <= 1.0);
            previous = w;
        }
        assert_eq!(weight(Some(5.0), false, ReadingStatus::Read), 1.0);
        assert!((weight(Some(4.0), false, ReadingStatus::Read) - 2.0 / 3.0).abs() < 1e-9);
        assert!((weight(Some(3.0), false, ReadingStatus::Read) - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_favorite_adds_exactly_half() {
        for status in [ReadingStatus::Reading, ReadingStatus::Read] {
            for rating in RATINGS.iter().copied().map(Some).chain([None]) {
                let plain = weight(rating, false, status);
                let favorite = weight(rating, true, status);
                assert!((favorite - plain - FAVORITE_BONUS).abs() < 1e-12);
            }
        }
        // Rated want-to-read books behave the same way.
        let plain = weight(Some(4.0), false, ReadingStatus::ToRead);
        let favorite = weight(Some(4.0), true, ReadingStatus::ToRead);
        assert!((favorite - plain - FAVORITE_BONUS).abs() < 1e-12);
    }

    #[test]
    fn test_to_read_floor_only_when_otherwise_zero() {
        assert_eq!(weight(None, false, ReadingStatus::ToRead), TO_READ_WEIGHT);
        assert_eq!(weight(Some(2.0), false, ReadingStatus::ToRead), TO_READ_WEIGHT);
        assert_eq!(weight(None, true, ReadingStatus::ToRead), FAVORITE_BONUS);
        assert_eq!(weight(Some(5.0), false, ReadingStatus::ToRead), 1.0);
    }
}
