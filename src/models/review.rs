use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use pgvector::Vector;

/// Lowest rating a review may carry
pub const MIN_RATING: i32 = 1;
/// Highest rating a review may carry
pub const MAX_RATING: i32 = 5;

/// Free-text survey answers attached to a review
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(default)]
pub struct ReviewSurvey {
    pub skin_type_review: Option<String>,
    pub skin_concern_review: Option<String>,
    pub irritation_level_review: Option<String>,
    pub cleansing_power_review: Option<String>,
    pub spreadability_review: Option<String>,
}

/// A stored review
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Review {
    pub review_id: i32,
    pub product_id: i32,
    pub reviewer_id: i32,
    pub product_name: Option<String>,
    pub reviewer_name: Option<String>,
    pub rating: Option<i32>,
    pub used_over_one_month: Option<bool>,
    pub repurchase_intention: Option<bool>,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub survey: ReviewSurvey,
    pub review_content: Option<String>,
    pub review_date: Option<NaiveDateTime>,
    pub review_content_embedding: Option<Vector>,
}

/// Body of review create and update requests
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewInput {
    pub product_id: i32,
    pub reviewer_id: i32,
    pub rating: i32,
    #[serde(default)]
    pub used_over_one_month: Option<bool>,
    #[serde(default)]
    pub repurchase_intention: Option<bool>,
    #[serde(flatten)]
    pub survey: ReviewSurvey,
    #[serde(default)]
    pub review_content: Option<String>,
    #[serde(default)]
    pub review_date: Option<NaiveDateTime>,
}

/// Review row returned by the search endpoints, without ids or embedding
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ReviewSearchRow {
    pub product_name: Option<String>,
    pub reviewer_name: Option<String>,
    pub rating: Option<i32>,
    pub used_over_one_month: Option<bool>,
    pub repurchase_intention: Option<bool>,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub survey: ReviewSurvey,
    pub review_content: Option<String>,
    pub review_date: Option<NaiveDateTime>,
}

/// Returns an error message when `rating` is out of range
pub fn check_rating(rating: i32) -> Result<(), String> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(format!(
            "rating must be between {} and {}, got {}",
            MIN_RATING, MAX_RATING, rating
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_rating_bounds() {
        assert!(check_rating(1).is_ok());
        assert!(check_rating(5).is_ok());
        assert!(check_rating(0).is_err());
        assert_eq!(
            check_rating(6).unwrap_err(),
            "rating must be between 1 and 5, got 6"
        );
    }

    #[test]
    fn test_review_input_parses_survey_fields() {
        let input: ReviewInput = serde_json::from_value(serde_json::json!({
            "product_id": 3,
            "reviewer_id": 9,
            "rating": 4,
            "used_over_one_month": true,
            "skin_type_review": "건성에 좋아요",
            "review_content": "촉촉하고 순해요",
            "review_date": "2023-05-01T09:30:00"
        }))
        .unwrap();
        assert_eq!(input.rating, 4);
        assert_eq!(input.survey.skin_type_review.as_deref(), Some("건성에 좋아요"));
        assert_eq!(input.repurchase_intention, None);
        assert!(input.review_date.is_some());
    }
}
