pub mod product;
pub mod recommendation;
pub mod review;
pub mod reviewer;
pub mod search;

pub use product::{Product, ProductAttributes, ProductFeatures, ProductInput, RatingStats};
pub use recommendation::{
    Recommendation, RecommendationRequest, RecommendationResponse, SemanticMatch, Signals,
    Strategy,
};
pub use review::{Review, ReviewInput, ReviewSearchRow, ReviewSurvey};
pub use reviewer::{PersonalColors, Reviewer, ReviewerInput, SkinConcern, SkinProfile, SkinType};
pub use search::{BrandReviewRatios, ProductRatingSummary};

use serde::Deserialize;

/// Default page size of list endpoints
pub const DEFAULT_LIMIT: i64 = 10;
/// Largest page size a list endpoint will return
pub const MAX_LIMIT: i64 = 100;

/// `skip`/`limit` query parameters of list endpoints
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT as u32
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: default_limit(),
        }
    }
}

impl Pagination {
    pub fn offset(&self) -> i64 {
        i64::from(self.skip)
    }

    /// Requested page size, clamped to `1..=MAX_LIMIT`
    pub fn limit(&self) -> i64 {
        i64::from(self.limit).clamp(1, MAX_LIMIT)
    }
}
