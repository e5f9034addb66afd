//! Lenient page-range parsing.
//!
//! The public string form is 1-based: `"1-3, 5, 8-10"`. Malformed tokens
//! and tokens entirely outside the document are dropped rather than
//! rejected; range endpoints that merely overshoot are clamped. Callers
//! rely on always getting *some* result, so this module never errors;
//! dropped tokens are only counted and logged.

use tracing::warn;

/// Parse a range string into groups of 1-based page numbers, one group per
/// comma-separated token, preserving token order.
pub fn parse_page_groups(input: &str, total_pages: u32) -> Vec<Vec<u32>> {
    let mut groups = Vec::new();
    let mut dropped = 0_usize;

    for token in input.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }

        match parse_token(token, total_pages) {
            Some(group) => groups.push(group),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        warn!(dropped, input, "dropped unusable range tokens");
    }

    groups
}

/// Flattened form of [`parse_page_groups`], deduplicated and sorted.
pub fn parse_pages(input: &str, total_pages: u32) -> Vec<u32> {
    let mut pages: Vec<u32> = parse_page_groups(input, total_pages)
        .into_iter()
        .flatten()
        .collect();
    pages.sort_unstable();
    pages.dedup();
    pages
}

fn parse_token(token: &str, total_pages: u32) -> Option<Vec<u32>> {
    if total_pages == 0 {
        return None;
    }

    if let Some((start, end)) = token.split_once('-') {
        let start: u32 = start.trim().parse().ok()?;
        let end: u32 = end.trim().parse().ok()?;
        if start > end || start > total_pages || end < 1 {
            return None;
        }
        let start = start.max(1);
        let end = end.min(total_pages);
        Some((start..=end).collect())
    } else {
        let page: u32 = token.parse().ok()?;
        if page < 1 || page > total_pages {
            return None;
        }
        Some(vec![page])
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// The parser never panics, whatever the input looks like.
        #[test]
        fn never_panics(input in ".{0,64}", total in 0u32..500) {
            let _ = parse_page_groups(&input, total);
        }

        /// Every parsed page number is within the document.
        #[test]
        fn pages_stay_in_bounds(input in "[0-9, -]{0,32}", total in 1u32..200) {
            for group in parse_page_groups(&input, total) {
                for page in group {
                    prop_assert!(page >= 1 && page <= total);
                }
            }
        }
    }
}
