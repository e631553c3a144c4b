use uuid::Uuid;

use crate::reviews::{ReviewError, ReviewRepository};

/// Calculator for computing and updating branch average ratings
///
/// Only approved reviews count towards the aggregate; a moderation
/// decision in either direction triggers a recompute.
#[derive(Clone)]
pub struct RatingCalculator {
    repository: ReviewRepository,
}

impl RatingCalculator {
    /// Create a new RatingCalculator
    pub fn new(repository: ReviewRepository) -> Self {
        Self { repository }
    }

    /// Recalculate and update the average rating for a branch
    ///
    /// Fetches all approved ratings, computes the arithmetic mean, and
    /// writes the new average and count onto the branch. Returns the
    /// calculated average (or None if no approved reviews exist).
    pub async fn recalculate_branch(
        &self,
        tenancy_id: Uuid,
        branch_id: i32,
    ) -> Result<Option<f64>, ReviewError> {
        let ratings = self
            .repository
            .approved_ratings_for_branch(tenancy_id, branch_id)
            .await?;

        let count = ratings.len() as i32;
        let average = Self::average(&ratings);

        self.repository
            .update_branch_rating(tenancy_id, branch_id, average, count)
            .await?;

        Ok(average)
    }

    fn average(ratings: &[i16]) -> Option<f64> {
        if ratings.is_empty() {
            return None;
        }
        let sum: i32 = ratings.iter().map(|&r| i32::from(r)).sum();
        Some(f64::from(sum) / ratings.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_empty() {
        assert_eq!(RatingCalculator::average(&[]), None);
    }

    #[test]
    fn test_average_single() {
        assert_eq!(RatingCalculator::average(&[5]), Some(5.0));
    }

    #[test]
    fn test_average_mixed() {
        assert_eq!(RatingCalculator::average(&[5, 4, 3]), Some(4.0));
    }

    #[test]
    fn test_average_fractional() {
        assert_eq!(RatingCalculator::average(&[5, 4]), Some(4.5));
    }
}
