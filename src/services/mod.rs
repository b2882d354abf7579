pub mod embedding;
pub mod products;
pub mod recsys;
pub mod review_search;
pub mod reviewers;
pub mod reviews;

/// `$start, $start+1, ...` placeholders for `count` bind parameters
pub(crate) fn placeholders(start: usize, count: usize) -> String {
    (start..start + count)
        .map(|i| format!("${}", i))
        .collect::<Vec<_>>()
        .join(", ")
}
