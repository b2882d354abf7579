use serde::{Deserialize, Serialize};

use pgvector::Vector;

/// Review-derived attribute vote counts of a product
///
/// Each group (skin type, concern, irritation, cleansing power,
/// spreadability) counts how many reviewers picked each option.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(default)]
pub struct ProductAttributes {
    pub skin_type_dry: Option<i32>,
    pub skin_type_combination: Option<i32>,
    pub skin_type_oily: Option<i32>,
    pub skin_concern_moisturizing: Option<i32>,
    pub skin_concern_soothing: Option<i32>,
    pub skin_concern_wrinkles_whitening: Option<i32>,
    pub cleansing_power_very_satisfied: Option<i32>,
    pub cleansing_power_average: Option<i32>,
    pub cleansing_power_somewhat_disappointed: Option<i32>,
    pub spreadability_very_satisfied: Option<i32>,
    pub spreadability_average: Option<i32>,
    pub spreadability_somewhat_disappointed: Option<i32>,
    pub irritation_level_not_irritating: Option<i32>,
    pub irritation_level_average: Option<i32>,
    pub irritation_level_irritating: Option<i32>,
}

impl ProductAttributes {
    pub const COLUMNS: [&'static str; 15] = [
        "skin_type_dry",
        "skin_type_combination",
        "skin_type_oily",
        "skin_concern_moisturizing",
        "skin_concern_soothing",
        "skin_concern_wrinkles_whitening",
        "cleansing_power_very_satisfied",
        "cleansing_power_average",
        "cleansing_power_somewhat_disappointed",
        "spreadability_very_satisfied",
        "spreadability_average",
        "spreadability_somewhat_disappointed",
        "irritation_level_not_irritating",
        "irritation_level_average",
        "irritation_level_irritating",
    ];

    pub fn values(&self) -> [Option<i32>; 15] {
        [
            self.skin_type_dry,
            self.skin_type_combination,
            self.skin_type_oily,
            self.skin_concern_moisturizing,
            self.skin_concern_soothing,
            self.skin_concern_wrinkles_whitening,
            self.cleansing_power_very_satisfied,
            self.cleansing_power_average,
            self.cleansing_power_somewhat_disappointed,
            self.spreadability_very_satisfied,
            self.spreadability_average,
            self.spreadability_somewhat_disappointed,
            self.irritation_level_not_irritating,
            self.irritation_level_average,
            self.irritation_level_irritating,
        ]
    }
}

/// Aggregate review statistics scraped with the catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(default)]
pub struct RatingStats {
    pub number_of_reviews: Option<i32>,
    pub review_rating: Option<f64>,
    pub review_5_star_ratio: Option<f64>,
    pub review_4_star_ratio: Option<f64>,
    pub review_3_star_ratio: Option<f64>,
    pub review_2_star_ratio: Option<f64>,
    pub review_1_star_ratio: Option<f64>,
}

/// A catalog product
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Product {
    pub product_id: i32,
    pub product_name: String,
    pub product_category: Option<String>,
    pub brand_name: Option<String>,
    pub original_price: Option<i32>,
    pub final_price: Option<i32>,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub stats: RatingStats,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub attributes: ProductAttributes,
    pub product_name_embedding: Option<Vector>,
}

/// Body of product create and update requests
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub product_name: String,
    #[serde(default)]
    pub product_category: Option<String>,
    #[serde(default)]
    pub brand_name: Option<String>,
    #[serde(default)]
    pub original_price: Option<i32>,
    #[serde(default)]
    pub final_price: Option<i32>,
    #[serde(flatten)]
    pub stats: RatingStats,
    #[serde(flatten)]
    pub attributes: ProductAttributes,
}

/// Product fields used by the recommender, without the embedding
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ProductFeatures {
    pub product_id: i32,
    pub product_name: String,
    pub product_category: Option<String>,
    pub brand_name: Option<String>,
    pub final_price: Option<i32>,
    pub number_of_reviews: Option<i32>,
    pub review_rating: Option<f64>,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub attributes: ProductAttributes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_columns_line_up_with_values() {
        let attrs = ProductAttributes {
            irritation_level_irritating: Some(7),
            skin_type_dry: Some(3),
            ..Default::default()
        };
        let values = attrs.values();
        assert_eq!(values.len(), ProductAttributes::COLUMNS.len());
        assert_eq!(values[0], Some(3));
        assert_eq!(ProductAttributes::COLUMNS[0], "skin_type_dry");
        assert_eq!(values[14], Some(7));
        assert_eq!(ProductAttributes::COLUMNS[14], "irritation_level_irritating");
    }

    #[test]
    fn test_product_input_accepts_minimal_body() {
        let input: ProductInput = serde_json::from_value(serde_json::json!({
            "product_name": "라운드랩 1025 독도 토너",
            "product_category": "토너",
            "skin_type_oily": 120
        }))
        .unwrap();
        assert_eq!(input.product_category.as_deref(), Some("토너"));
        assert_eq!(input.attributes.skin_type_oily, Some(120));
        assert_eq!(input.stats.review_rating, None);
    }
}
