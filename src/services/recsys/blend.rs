//! Score shrinkage and z-score blending of recommendation signals.

use crate::models::{BrandReviewRatios, ProductFeatures, Signals, Strategy};

/// Pseudo-review count pulling sparse product ratings toward the catalog mean
pub const PRODUCT_PRIOR_WEIGHT: f64 = 10.0;

/// `(n·mean + m·prior) / (n + m)`
pub fn bayesian_average(mean: f64, count: f64, prior_mean: f64, prior_weight: f64) -> f64 {
    let denominator = count + prior_weight;
    if denominator <= 0.0 {
        return prior_mean;
    }
    (count * mean + prior_weight * prior_mean) / denominator
}

/// Shrunk rating of every product, in input order
///
/// The prior is the mean rating of the products passed in; products without
/// a rating get `None`.
pub fn product_scores(products: &[ProductFeatures]) -> Vec<Option<f64>> {
    let ratings: Vec<f64> = products.iter().filter_map(|p| p.review_rating).collect();
    if ratings.is_empty() {
        return vec![None; products.len()];
    }
    let catalog_mean = ratings.iter().sum::<f64>() / ratings.len() as f64;

    products
        .iter()
        .map(|p| {
            p.review_rating.map(|rating| {
                let count = f64::from(p.number_of_reviews.unwrap_or(0).max(0));
                bayesian_average(rating, count, catalog_mean, PRODUCT_PRIOR_WEIGHT)
            })
        })
        .collect()
}

/// Repurchase-heavy blend of a brand's review behaviour, in `[0, 1]`
pub fn brand_score(ratios: &BrandReviewRatios) -> Option<f64> {
    if ratios.total_reviews == 0 {
        return None;
    }
    let rating = ratios.average_rating.map_or(0.0, |r| r / 5.0);
    Some(
        0.5 * ratios.repurchase_intention_ratio
            + 0.3 * ratios.used_over_one_month_ratio
            + 0.2 * rating,
    )
}

/// Population z-scores; missing values score 0
///
/// With fewer than two values, or no spread, every entry is 0.
pub fn z_scores(values: &[Option<f64>]) -> Vec<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.len() < 2 {
        return vec![0.0; values.len()];
    }

    let n = present.len() as f64;
    let mean = present.iter().sum::<f64>() / n;
    let variance = present.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();
    if std_dev <= f64::EPSILON {
        return vec![0.0; values.len()];
    }

    values
        .iter()
        .map(|v| v.map_or(0.0, |v| (v - mean) / std_dev))
        .collect()
}

/// Per-signal weights of a strategy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    pub semantic: f64,
    pub preference: f64,
    pub product: f64,
    pub cohort: f64,
    pub brand: f64,
}

impl Weights {
    pub fn for_strategy(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Hybrid => Weights {
                semantic: 0.40,
                preference: 0.25,
                product: 0.15,
                cohort: 0.10,
                brand: 0.10,
            },
            Strategy::Profile => Weights {
                semantic: 0.0,
                preference: 0.40,
                product: 0.25,
                cohort: 0.20,
                brand: 0.15,
            },
            Strategy::Semantic => Weights {
                semantic: 0.70,
                preference: 0.0,
                product: 0.20,
                cohort: 0.0,
                brand: 0.10,
            },
        }
    }
}

fn column(signals: &[Signals], pick: impl Fn(&Signals) -> Option<f64>) -> Vec<f64> {
    z_scores(&signals.iter().map(pick).collect::<Vec<_>>())
}

/// Weighted sum of each signal's z-score, one score per candidate
pub fn blend(signals: &[Signals], weights: Weights) -> Vec<f64> {
    let semantic = column(signals, |s| s.semantic);
    let preference = column(signals, |s| s.preference);
    let product = column(signals, |s| s.product);
    let cohort = column(signals, |s| s.cohort);
    let brand = column(signals, |s| s.brand);

    (0..signals.len())
        .map(|i| {
            weights.semantic * semantic[i]
                + weights.preference * preference[i]
                + weights.product * product[i]
                + weights.cohort * cohort[i]
                + weights.brand * brand[i]
        })
        .collect()
}
