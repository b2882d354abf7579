use serde::{Deserialize, Serialize};

/// Star-rating summary of a single product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductRatingSummary {
    pub product_id: i32,
    pub product_name: String,
    pub number_of_reviews: Option<i32>,
    pub review_rating: Option<f64>,
    pub review_5_star_ratio: Option<f64>,
    pub review_4_star_ratio: Option<f64>,
    pub review_3_star_ratio: Option<f64>,
    pub review_2_star_ratio: Option<f64>,
    pub review_1_star_ratio: Option<f64>,
}

/// Review behaviour aggregated over every product of a brand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct BrandReviewRatios {
    pub brand_name: String,
    pub total_reviews: i64,
    /// Share of reviews written after more than a month of use
    pub used_over_one_month_ratio: f64,
    /// Share of reviews stating they would buy again
    pub repurchase_intention_ratio: f64,
    pub average_rating: Option<f64>,
}
