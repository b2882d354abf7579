//! Rule-based matching of a skin profile against review-derived product
//! attributes.

use std::collections::BTreeSet;

use crate::models::{ProductAttributes, SkinConcern, SkinProfile, SkinType};

/// Product attribute a profile flag asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Target {
    DrySkin,
    OilySkin,
    CombinationSkin,
    Moisturizing,
    Soothing,
    WrinklesWhitening,
    NotIrritating,
}

fn skin_type_targets(skin_type: SkinType) -> &'static [Target] {
    match skin_type {
        SkinType::Dry | SkinType::MildlyDry => &[Target::DrySkin, Target::Moisturizing],
        SkinType::Oily | SkinType::TroubleProne => &[Target::OilySkin],
        SkinType::Combination | SkinType::Normal => &[Target::CombinationSkin],
        SkinType::Sensitive => &[Target::Soothing, Target::NotIrritating],
    }
}

fn concern_targets(concern: SkinConcern) -> &'static [Target] {
    match concern {
        SkinConcern::ExcessSebum
        | SkinConcern::Pores
        | SkinConcern::Blackheads
        | SkinConcern::Keratin => &[Target::OilySkin],
        SkinConcern::Atopy | SkinConcern::Redness | SkinConcern::Trouble => {
            &[Target::Soothing, Target::NotIrritating]
        }
        SkinConcern::Whitening
        | SkinConcern::Wrinkles
        | SkinConcern::Spots
        | SkinConcern::Elasticity
        | SkinConcern::DarkCircles => &[Target::WrinklesWhitening],
    }
}

/// Distinct attributes the profile asks for
pub fn targets(profile: &SkinProfile) -> BTreeSet<Target> {
    let from_types = profile.skin_types().into_iter().flat_map(skin_type_targets);
    let from_concerns = profile.concerns().into_iter().flat_map(concern_targets);
    from_types.chain(from_concerns).copied().collect()
}

/// Votes for `target` as a share of its vote group, `None` without votes
pub fn share(attributes: &ProductAttributes, target: Target) -> Option<f64> {
    let skin_type = [
        attributes.skin_type_dry,
        attributes.skin_type_combination,
        attributes.skin_type_oily,
    ];
    let concern = [
        attributes.skin_concern_moisturizing,
        attributes.skin_concern_soothing,
        attributes.skin_concern_wrinkles_whitening,
    ];
    let irritation = [
        attributes.irritation_level_not_irritating,
        attributes.irritation_level_average,
        attributes.irritation_level_irritating,
    ];

    let (group, index) = match target {
        Target::DrySkin => (skin_type, 0),
        Target::CombinationSkin => (skin_type, 1),
        Target::OilySkin => (skin_type, 2),
        Target::Moisturizing => (concern, 0),
        Target::Soothing => (concern, 1),
        Target::WrinklesWhitening => (concern, 2),
        Target::NotIrritating => (irritation, 0),
    };

    let votes = |v: Option<i32>| f64::from(v.unwrap_or(0).max(0));
    let total: f64 = group.iter().map(|v| votes(*v)).sum();
    if total <= 0.0 {
        return None;
    }
    Some(votes(group[index]) / total)
}

/// Mean share over the profile's targets that have votes
pub fn score(targets: &BTreeSet<Target>, attributes: &ProductAttributes) -> Option<f64> {
    let shares: Vec<f64> = targets
        .iter()
        .filter_map(|target| share(attributes, *target))
        .collect();

    if shares.is_empty() {
        return None;
    }
    Some(shares.iter().sum::<f64>() / shares.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attributes() -> ProductAttributes {
        ProductAttributes {
            skin_type_dry: Some(60),
            skin_type_combination: Some(30),
            skin_type_oily: Some(10),
            skin_concern_moisturizing: Some(50),
            skin_concern_soothing: Some(25),
            skin_concern_wrinkles_whitening: Some(25),
            irritation_level_not_irritating: Some(90),
            irritation_level_average: Some(10),
            irritation_level_irritating: Some(0),
            ..Default::default()
        }
    }

    #[test]
    fn test_targets_deduplicate() {
        let profile = SkinProfile {
            skin_type_oily: true,
            skin_type_trouble_prone: true,
            skin_concern_pores: true,
            ..Default::default()
        };
        assert_eq!(targets(&profile).into_iter().collect::<Vec<_>>(), vec![Target::OilySkin]);
    }

    #[test]
    fn test_targets_dry_and_sensitive() {
        let profile = SkinProfile {
            skin_type_mildly_dry: true,
            skin_type_sensitive: true,
            ..Default::default()
        };
        assert_eq!(
            targets(&profile).into_iter().collect::<Vec<_>>(),
            vec![
                Target::DrySkin,
                Target::Moisturizing,
                Target::Soothing,
                Target::NotIrritating
            ]
        );
    }

    #[test]
    fn test_share_within_group() {
        let attrs = attributes();
        assert_eq!(share(&attrs, Target::DrySkin), Some(0.6));
        assert_eq!(share(&attrs, Target::Soothing), Some(0.25));
        assert_eq!(share(&attrs, Target::NotIrritating), Some(0.9));
    }

    #[test]
    fn test_share_none_without_votes() {
        let attrs = ProductAttributes::default();
        assert_eq!(share(&attrs, Target::OilySkin), None);
    }

    #[test]
    fn test_score_is_mean_of_available_shares() {
        let profile = SkinProfile {
            skin_type_dry: true,
            ..Default::default()
        };
        let score = score(&targets(&profile), &attributes()).unwrap();
        assert!((score - 0.55).abs() < 1e-9);
    }

    #[test]
    fn test_score_skips_groups_without_votes() {
        let attrs = ProductAttributes {
            skin_type_oily: Some(5),
            skin_type_dry: Some(5),
            ..Default::default()
        };
        let profile = SkinProfile {
            skin_type_oily: true,
            skin_concern_wrinkles: true,
            ..Default::default()
        };
        assert_eq!(score(&targets(&profile), &attrs), Some(0.5));
        assert_eq!(score(&BTreeSet::new(), &attrs), None);
    }
}
