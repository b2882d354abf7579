//! Keyword-based category detection and filtering.
//!
//! A query such as "아빠한테 선물하기 좋은 토너" names the product category it
//! wants; when it does, only products of that category are ranked.

use crate::models::ProductFeatures;

/// A product category and the terms that identify it in queries and catalog
/// text. Terms are lowercase.
#[derive(Debug, PartialEq, Eq)]
pub struct Category {
    pub name: &'static str,
    pub terms: &'static [&'static str],
}

pub const CATEGORIES: &[Category] = &[
    Category {
        name: "크림",
        terms: &["크림", "cream"],
    },
    Category {
        name: "에센스",
        terms: &["에센스", "세럼", "앰플", "essence", "serum", "ampoule"],
    },
    Category {
        name: "폼 클렌저",
        terms: &["폼 클렌저", "폼클렌저", "클렌징 폼", "클렌징폼", "foam cleanser", "cleansing foam"],
    },
    Category {
        name: "미스트",
        terms: &["미스트", "mist"],
    },
    Category {
        name: "오일",
        terms: &["오일", "oil"],
    },
    Category {
        name: "필링",
        terms: &["필링", "peeling"],
    },
    Category {
        name: "선크림",
        terms: &["선크림", "썬크림", "선블록", "sunscreen", "sun cream", "sunblock"],
    },
    Category {
        name: "토너",
        terms: &["토너", "toner"],
    },
    Category {
        name: "클렌징 워터",
        terms: &["클렌징 워터", "클렌징워터", "cleansing water", "micellar water"],
    },
    Category {
        name: "로션",
        terms: &["로션", "lotion"],
    },
];

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-'
}

/// Whether lowercase `text` contains `term`
///
/// Korean terms match anywhere, since they are commonly fused into compounds
/// ("수분크림"). ASCII terms must stand as whole words: "oil" does not match
/// "oily", "oil-free" or "toil".
fn contains_term(text: &str, term: &str) -> bool {
    if !term.is_ascii() {
        return text.contains(term);
    }

    text.match_indices(term).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + term.len()..].chars().next();
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    })
}

/// Finds the category named in `query`
///
/// The longest matching term wins, so "선크림" resolves to sunscreen rather
/// than cream; equal lengths resolve to the earlier category.
pub fn detect(query: &str) -> Option<&'static Category> {
    let query = query.to_lowercase();

    CATEGORIES
        .iter()
        .flat_map(|category| category.terms.iter().map(move |term| (category, *term)))
        .filter(|(_, term)| contains_term(&query, term))
        .fold(None, |best: Option<(&Category, usize)>, (category, term)| {
            let len = term.chars().count();
            match best {
                Some((_, best_len)) if best_len >= len => best,
                _ => Some((category, len)),
            }
        })
        .map(|(category, _)| category)
}

/// Whether catalog `text` belongs to `category`
///
/// Text that only matches through a longer term of another category (a
/// "선크림" when filtering for "크림") does not belong.
pub fn text_matches(category: &Category, text: &str) -> bool {
    let text = text.to_lowercase();

    let matched: Vec<&str> = category
        .terms
        .iter()
        .copied()
        .filter(|term| contains_term(&text, term))
        .collect();
    if matched.is_empty() {
        return false;
    }

    let shadowed = CATEGORIES
        .iter()
        .filter(|other| other.name != category.name)
        .flat_map(|other| other.terms.iter())
        .filter(|longer| matched.iter().any(|term| longer.len() > term.len() && longer.contains(term)))
        .any(|longer| contains_term(&text, longer));

    !shadowed
}

pub fn product_matches(category: &Category, product: &ProductFeatures) -> bool {
    let text = format!(
        "{} {}",
        product.product_category.as_deref().unwrap_or_default(),
        product.product_name
    );
    text_matches(category, &text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProductAttributes;

    fn product(name: &str, category: Option<&str>) -> ProductFeatures {
        ProductFeatures {
            product_id: 1,
            product_name: name.to_string(),
            product_category: category.map(str::to_string),
            brand_name: None,
            final_price: None,
            number_of_reviews: None,
            review_rating: None,
            attributes: ProductAttributes::default(),
        }
    }

    #[test]
    fn test_detect_korean_category() {
        assert_eq!(detect("아빠한테 선물하기 좋은 토너").unwrap().name, "토너");
    }

    #[test]
    fn test_detect_prefers_longest_term() {
        assert_eq!(detect("끈적이지 않는 선크림 추천").unwrap().name, "선크림");
        assert_eq!(detect("light SUN CREAM for oily skin").unwrap().name, "선크림");
        assert_eq!(detect("민감성 피부 크림").unwrap().name, "크림");
    }

    #[test]
    fn test_detect_multiword_terms() {
        assert_eq!(detect("순한 클렌징 워터").unwrap().name, "클렌징 워터");
        assert_eq!(detect("약산성 폼클렌저").unwrap().name, "폼 클렌저");
    }

    #[test]
    fn test_detect_none_without_category() {
        assert!(detect("건조한 피부에 좋은 제품").is_none());
        assert!(detect("").is_none());
    }

    #[test]
    fn test_detect_ascii_terms_need_word_boundaries() {
        assert!(detect("moisturizer for oily skin").is_none());
        assert!(detect("chemistry of toil").is_none());
        assert_eq!(detect("oil-free lotion").unwrap().name, "로션");
        assert_eq!(detect("cleansing oil, please").unwrap().name, "오일");
        assert_eq!(detect("수분크림").unwrap().name, "크림");
        assert_eq!(detect("데일리toner추천").unwrap().name, "토너");
    }

    #[test]
    fn test_text_matches_excludes_more_specific_category() {
        let cream = detect("크림").unwrap();
        assert!(text_matches(cream, "스킨케어 수분 크림"));
        assert!(!text_matches(cream, "톤업 선크림 SPF50+"));
        assert!(!text_matches(cream, "수분 토너"));
    }

    #[test]
    fn test_product_matches_uses_category_and_name() {
        let toner = detect("toner").unwrap();
        assert!(product_matches(toner, &product("독도 토너", None)));
        assert!(product_matches(toner, &product("1025 Dokdo", Some("스킨/토너"))));
        assert!(!product_matches(toner, &product("독도 로션", Some("로션"))));
    }

    #[test]
    fn test_oil_free_product_is_not_an_oil() {
        let lotion = detect("lotion").unwrap();
        let oil = detect("oil").unwrap();
        let oil_free = product("Oil-Free Daily Lotion", None);
        assert!(product_matches(lotion, &oil_free));
        assert!(!product_matches(oil, &oil_free));
    }
}
