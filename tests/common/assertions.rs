//! Domain-specific assertion macros for advodir harnesses.
//!
//! These wrap `pretty_assertions` and add failure messages that name the
//! search being checked, so a failing parameterised case is easy to place.

use advodir_core::SearchResponse;

/// First names on a page, in order. Most assertions compare these.
pub fn first_names(response: &SearchResponse) -> Vec<String> {
    response.data.iter().map(|a| a.first_name.clone()).collect()
}

/// Assert the first names on a page plus both totals.
///
/// ```rust
/// assert_page!(response, ["Ann"], items = 2, pages = 2);
/// ```
#[macro_export]
macro_rules! assert_page {
    ($response:expr, [$($name:expr),* $(,)?], items = $items:expr, pages = $pages:expr) => {{
        let response: &advodir_core::SearchResponse = &$response;
        let expected: Vec<String> = vec![$($name.to_string()),*];
        pretty_assertions::assert_eq!(
            $crate::common::first_names(response),
            expected,
            "assert_page! failed: unexpected records on page"
        );
        pretty_assertions::assert_eq!(
            (response.total_items, response.total_pages),
            ($items as u64, $pages as u64),
            "assert_page! failed: (total_items, total_pages)"
        );
    }};
}

/// Assert that every record on a page satisfies the predicate built from
/// `$term`, and that the page is in strictly increasing id order.
#[macro_export]
macro_rules! assert_all_match {
    ($response:expr, $term:expr) => {{
        let response: &advodir_core::SearchResponse = &$response;
        let term: &str = $term;
        let predicate = advodir_core::Predicate::build(term);
        for advocate in &response.data {
            if !predicate.matches(advocate) {
                panic!(
                    "assert_all_match! failed: {:?} {:?} ({}, {}) does not match {:?}",
                    advocate.first_name, advocate.last_name, advocate.city, advocate.degree, term
                );
            }
        }
        if let Some(pair) = response.data.windows(2).find(|w| w[0].id >= w[1].id) {
            panic!(
                "assert_all_match! failed: ids out of order for {:?}: {} then {}",
                term, pair[0].id, pair[1].id
            );
        }
    }};
}
