//! Property tests for the extraction engine
//!
//! Inputs are assembled from fragments that exercise every citation style,
//! brand spellings and malformed brackets.

use brandlens_domain::Citation;
use brandlens_extractor::{classify_sources, extract_citations, extract_mentions};
use proptest::prelude::*;
use std::collections::HashSet;

fn fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Tesla".to_string()),
        Just("tesla's".to_string()),
        Just("Tesla[https://tesla.com]".to_string()),
        Just("[Tesla](https://www.tesla.com/about)".to_string()),
        Just("Source[https://reuters.com/a]".to_string()),
        Just("source[https://tesla.com]".to_string()),
        Just("https://blog.tesla.com/post.".to_string()),
        Just("https://reuters.com/a".to_string()),
        Just("tesla.com".to_string()),
        Just("[broken(https://x.io".to_string()),
        Just("]]((".to_string()),
        Just("Brand_Name[https://b.io]".to_string()),
        "[a-z]{1,8}".prop_map(|s| s),
        "[A-Za-z .,()\\[\\]]{0,12}".prop_map(|s| s),
    ]
}

fn answer() -> impl Strategy<Value = String> {
    prop::collection::vec(fragment(), 0..24).prop_map(|parts| parts.join(" "))
}

proptest! {
    #[test]
    fn citations_have_unique_urls(text in answer()) {
        let citations = extract_citations(&text);
        let unique: HashSet<&str> = citations.iter().map(|c| c.url.as_str()).collect();
        prop_assert_eq!(unique.len(), citations.len());
    }

    #[test]
    fn citations_are_ordered_and_well_formed(text in answer()) {
        let citations = extract_citations(&text);
        for c in &citations {
            prop_assert!(c.start < c.end);
            prop_assert!(c.end <= text.len());
            prop_assert!(c.url.starts_with("http://") || c.url.starts_with("https://"));
        }
        for pair in citations.windows(2) {
            prop_assert!(pair[0].end <= pair[1].start);
        }
    }

    #[test]
    fn mentions_never_overlap(text in answer(), brand in prop_oneof![Just("Tesla"), Just("Brand Name"), Just("C++"), Just("")]) {
        let citations = extract_citations(&text);
        let mentions = extract_mentions(&text, brand, &citations);
        for pair in mentions.windows(2) {
            prop_assert!(pair[0].end <= pair[1].start);
        }
        for m in &mentions {
            prop_assert_eq!(m.is_linked(), m.url.is_some());
        }
    }

    #[test]
    fn classification_is_idempotent(text in answer()) {
        let citations = extract_citations(&text);
        let first = classify_sources(&citations, "https://tesla.com");
        prop_assert!(first.is_disjoint());
        prop_assert_eq!(first.len(), citations.len());

        let again: Vec<Citation> = first.all().map(Citation::from_url).collect();
        let second = classify_sources(&again, "https://tesla.com");
        prop_assert_eq!(first, second);
    }
}
