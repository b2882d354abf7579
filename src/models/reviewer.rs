use serde::{Deserialize, Serialize};

/// Skin types a reviewer can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkinType {
    TroubleProne,
    Oily,
    Sensitive,
    Dry,
    MildlyDry,
    Combination,
    Normal,
}

/// Skin concerns a reviewer can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkinConcern {
    Keratin,
    Pores,
    Blackheads,
    ExcessSebum,
    Whitening,
    Redness,
    Wrinkles,
    Trouble,
    DarkCircles,
    Elasticity,
    Atopy,
    Spots,
}

/// Skin type and concern flags of a reviewer or of an anonymous user
///
/// Serialized flat (`skin_type_oily: true`, ...), matching both the table
/// columns and the request bodies of the recommendation endpoints. Missing
/// flags deserialize as `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(default)]
pub struct SkinProfile {
    pub skin_type_trouble_prone: bool,
    pub skin_type_oily: bool,
    pub skin_type_sensitive: bool,
    pub skin_type_dry: bool,
    pub skin_type_mildly_dry: bool,
    pub skin_type_combination: bool,
    pub skin_type_normal: bool,
    pub skin_concern_keratin: bool,
    pub skin_concern_pores: bool,
    pub skin_concern_blackheads: bool,
    pub skin_concern_excess_sebum: bool,
    pub skin_concern_whitening: bool,
    pub skin_concern_redness: bool,
    pub skin_concern_wrinkles: bool,
    pub skin_concern_trouble: bool,
    pub skin_concern_dark_circles: bool,
    pub skin_concern_elasticity: bool,
    pub skin_concern_atopy: bool,
    pub skin_concern_spots: bool,
}

impl SkinProfile {
    /// Column names in the order returned by [`SkinProfile::flags`]
    pub const COLUMNS: [&'static str; 19] = [
        "skin_type_trouble_prone",
        "skin_type_oily",
        "skin_type_sensitive",
        "skin_type_dry",
        "skin_type_mildly_dry",
        "skin_type_combination",
        "skin_type_normal",
        "skin_concern_keratin",
        "skin_concern_pores",
        "skin_concern_blackheads",
        "skin_concern_excess_sebum",
        "skin_concern_whitening",
        "skin_concern_redness",
        "skin_concern_wrinkles",
        "skin_concern_trouble",
        "skin_concern_dark_circles",
        "skin_concern_elasticity",
        "skin_concern_atopy",
        "skin_concern_spots",
    ];

    pub fn flags(&self) -> [bool; 19] {
        [
            self.skin_type_trouble_prone,
            self.skin_type_oily,
            self.skin_type_sensitive,
            self.skin_type_dry,
            self.skin_type_mildly_dry,
            self.skin_type_combination,
            self.skin_type_normal,
            self.skin_concern_keratin,
            self.skin_concern_pores,
            self.skin_concern_blackheads,
            self.skin_concern_excess_sebum,
            self.skin_concern_whitening,
            self.skin_concern_redness,
            self.skin_concern_wrinkles,
            self.skin_concern_trouble,
            self.skin_concern_dark_circles,
            self.skin_concern_elasticity,
            self.skin_concern_atopy,
            self.skin_concern_spots,
        ]
    }

    /// Profile as a bitmask, bit `i` set when `flags()[i]` is set
    pub fn bits(&self) -> u32 {
        self.flags()
            .iter()
            .enumerate()
            .filter(|(_, set)| **set)
            .fold(0, |acc, (i, _)| acc | (1 << i))
    }

    pub fn is_empty(&self) -> bool {
        self.bits() == 0
    }

    pub fn skin_types(&self) -> Vec<SkinType> {
        [
            (self.skin_type_trouble_prone, SkinType::TroubleProne),
            (self.skin_type_oily, SkinType::Oily),
            (self.skin_type_sensitive, SkinType::Sensitive),
            (self.skin_type_dry, SkinType::Dry),
            (self.skin_type_mildly_dry, SkinType::MildlyDry),
            (self.skin_type_combination, SkinType::Combination),
            (self.skin_type_normal, SkinType::Normal),
        ]
        .into_iter()
        .filter_map(|(set, skin_type)| set.then_some(skin_type))
        .collect()
    }

    pub fn concerns(&self) -> Vec<SkinConcern> {
        [
            (self.skin_concern_keratin, SkinConcern::Keratin),
            (self.skin_concern_pores, SkinConcern::Pores),
            (self.skin_concern_blackheads, SkinConcern::Blackheads),
            (self.skin_concern_excess_sebum, SkinConcern::ExcessSebum),
            (self.skin_concern_whitening, SkinConcern::Whitening),
            (self.skin_concern_redness, SkinConcern::Redness),
            (self.skin_concern_wrinkles, SkinConcern::Wrinkles),
            (self.skin_concern_trouble, SkinConcern::Trouble),
            (self.skin_concern_dark_circles, SkinConcern::DarkCircles),
            (self.skin_concern_elasticity, SkinConcern::Elasticity),
            (self.skin_concern_atopy, SkinConcern::Atopy),
            (self.skin_concern_spots, SkinConcern::Spots),
        ]
        .into_iter()
        .filter_map(|(set, concern)| set.then_some(concern))
        .collect()
    }
}

/// Personal colour flags; stored and returned, not used for scoring
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(default)]
pub struct PersonalColors {
    pub personal_color_spring_warm: bool,
    pub personal_color_cool: bool,
    pub personal_color_autumn_warm: bool,
    pub personal_color_winter_cool: bool,
    pub personal_color_summer_cool: bool,
    pub personal_color_warm: bool,
}

impl PersonalColors {
    pub const COLUMNS: [&'static str; 6] = [
        "personal_color_spring_warm",
        "personal_color_cool",
        "personal_color_autumn_warm",
        "personal_color_winter_cool",
        "personal_color_summer_cool",
        "personal_color_warm",
    ];

    pub fn flags(&self) -> [bool; 6] {
        [
            self.personal_color_spring_warm,
            self.personal_color_cool,
            self.personal_color_autumn_warm,
            self.personal_color_winter_cool,
            self.personal_color_summer_cool,
            self.personal_color_warm,
        ]
    }
}

/// A stored reviewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reviewer {
    pub reviewer_id: i32,
    pub reviewer_name: String,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub profile: SkinProfile,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub colors: PersonalColors,
}

/// Body of reviewer create and update requests
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewerInput {
    pub reviewer_name: String,
    #[serde(flatten)]
    pub profile: SkinProfile,
    #[serde(flatten)]
    pub colors: PersonalColors,
}
