use serde::{Deserialize, Serialize};

use super::SkinProfile;

/// How a recommendation request is served, chosen from its inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Free-text query and skin profile
    Hybrid,
    /// Skin profile only
    Profile,
    /// Free-text query only
    Semantic,
}

impl Strategy {
    /// Picks the strategy for the given inputs, `None` when both are empty
    pub fn select(has_profile: bool, has_query: bool) -> Option<Self> {
        match (has_profile, has_query) {
            (true, true) => Some(Strategy::Hybrid),
            (true, false) => Some(Strategy::Profile),
            (false, true) => Some(Strategy::Semantic),
            (false, false) => None,
        }
    }
}

/// Body of `POST /recommendations`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub profile: Option<SkinProfile>,
    #[serde(default)]
    pub top_n: Option<usize>,
}

/// Raw (pre-normalization) value of every signal for one product
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Signals {
    pub semantic: Option<f64>,
    pub preference: Option<f64>,
    pub product: Option<f64>,
    pub cohort: Option<f64>,
    pub brand: Option<f64>,
}

/// One ranked product
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub product_id: i32,
    pub product_name: String,
    pub brand_name: Option<String>,
    pub product_category: Option<String>,
    pub final_price: Option<i32>,
    /// Weighted sum of z-scored signals
    pub score: f64,
    pub signals: Signals,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationResponse {
    pub strategy: Strategy,
    /// Category detected in the query, if any
    pub category: Option<String>,
    pub recommendations: Vec<Recommendation>,
}

/// Row of the query-only semantic ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemanticMatch {
    pub product_id: i32,
    pub product_name: String,
    pub name_similarity: f64,
    pub review_count: i64,
    pub used_count: i64,
    pub avg_similarity: Option<f64>,
    pub avg_similarity_used: Option<f64>,
    pub final_score: f64,
}
