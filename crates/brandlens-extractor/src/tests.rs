//! Integration tests for the Extractor

#[cfg(test)]
mod tests {
    use crate::{
        analyze_response, classify_sources, extract_citations, extract_mentions, Budget,
        ExtractorConfig, MentionExtractor,
    };
    use brandlens_domain::{MentionKind, PatternType};

    const ANSWER: &str = "Tesla's latest innovations reshaped the industry. Founded by Elon Musk, **[Tesla](https://www.tesla.com)** keeps pushing (Source[https://www.tesla.com/about]).

**Cybertruck.** The **Tesla[https://www.tesla.com/cybertruck]** design is covered by source[https://www.reuters.com/markets/tesla-cybertruck/] and (source[https://www.teslarati.com/cybertruck-teardown/]).
 https://shop.tesla.com/category/cybertruck?variant=toolbox.

- [Tesla Model S Plaid](https://www.tesla.com/models/plaid)
- Tesla[https://www.tesla.com/cybertruck]
- Plain URL (owned): https://www.tesla.com/about
";

    #[test]
    fn test_mixed_citation_styles() {
        let citations = extract_citations(ANSWER);

        let types: Vec<PatternType> = citations.iter().map(|c| c.pattern_type).collect();
        assert_eq!(
            types,
            vec![
                PatternType::MarkdownLink,
                PatternType::SourcePattern,
                PatternType::TextUrlPattern,
                PatternType::SourcePattern,
                PatternType::SourcePattern,
                PatternType::PlainUrl,
                PatternType::MarkdownLink,
            ]
        );
        assert_eq!(citations[2].text, "Tesla");
        assert_eq!(
            citations[5].url,
            "https://shop.tesla.com/category/cybertruck?variant=toolbox"
        );
        assert_eq!(citations[6].text, "Tesla Model S Plaid");
    }

    #[test]
    fn test_repeated_urls_counted_once() {
        let citations = extract_citations(ANSWER);
        let cybertruck = citations
            .iter()
            .filter(|c| c.url == "https://www.tesla.com/cybertruck")
            .count();
        let about = citations
            .iter()
            .filter(|c| c.url == "https://www.tesla.com/about")
            .count();

        assert_eq!(cybertruck, 1);
        assert_eq!(about, 1);
    }

    #[test]
    fn test_owned_and_external_sources() {
        let citations = extract_citations(ANSWER);
        let sources = classify_sources(&citations, "https://www.tesla.com");

        assert_eq!(sources.owned.len(), 5);
        assert_eq!(
            sources.external,
            vec![
                "https://www.reuters.com/markets/tesla-cybertruck/",
                "https://www.teslarati.com/cybertruck-teardown/",
            ]
        );
    }

    #[test]
    fn test_mentions_in_long_answer() {
        let citations = extract_citations(ANSWER);
        let mentions = extract_mentions(ANSWER, "Tesla", &citations);

        let linked = mentions.iter().filter(|m| m.kind == MentionKind::Linked).count();
        let unlinked = mentions.iter().filter(|m| m.kind == MentionKind::Unlinked).count();
        assert_eq!(linked, 3);
        assert_eq!(unlinked, 2);
        assert_eq!(mentions[0].text, "Tesla's");

        for pair in mentions.windows(2) {
            assert!(pair[0].end <= pair[1].start, "mentions overlap: {:?}", pair);
        }
        for mention in &mentions {
            if mention.is_linked() {
                assert!(mention.url.is_some());
            } else {
                assert!(mention.url.is_none());
            }
        }
    }

    #[test]
    fn test_case_variants_of_brand_agree() {
        let citations = extract_citations(ANSWER);
        let baseline = extract_mentions(ANSWER, "Tesla", &citations).len();

        for brand in ["tesla", "TESLA"] {
            assert_eq!(extract_mentions(ANSWER, brand, &citations).len(), baseline);
        }
    }

    #[test]
    fn test_window_is_configurable() {
        let text = "Tesla and then some words https://example.org/path here";
        let citations = extract_citations(text);

        let narrow = MentionExtractor::new(ExtractorConfig {
            url_proximity_window: 5,
            ..ExtractorConfig::default()
        });
        assert_eq!(narrow.extract(text, "Tesla", &citations).len(), 1);
    }

    #[test]
    fn test_full_report_budget() {
        let report = analyze_response(
            ANSWER,
            "Tesla",
            "https://www.tesla.com",
            Budget {
                max_searches: 2,
                max_sources: 6,
            },
        );

        // tesla.com, shop.tesla.com, reuters.com, teslarati.com
        assert_eq!(report.usage.searches_used, 4);
        assert_eq!(report.usage.sources_used, 7);
        assert!(!report.usage.budget_respected);
    }
}
