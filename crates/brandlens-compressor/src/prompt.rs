//! Prompt assembly for brand questions

/// Default number of web searches (unique domains) the model may use
pub const DEFAULT_MAX_SEARCHES: usize = 3;

/// Default number of unique sources the model may cite
pub const DEFAULT_MAX_SOURCES: usize = 6;

/// Builds the brand-analysis prompt sent to the LLM
///
/// # Examples
///
/// ```
/// use brandlens_compressor::PromptBuilder;
///
/// let prompt = PromptBuilder::new("Tesla", "https://tesla.com", "Which model is cheapest?")
///     .with_budget(2, 4)
///     .build();
///
/// assert!(prompt.contains("- Max web searches: 2"));
/// assert!(prompt.ends_with("Answer:"));
/// ```
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    brand_name: String,
    website_url: String,
    question: String,
    max_searches: usize,
    max_sources: usize,
}

impl PromptBuilder {
    /// Create a new prompt builder for `question` about `brand_name`
    pub fn new(
        brand_name: impl Into<String>,
        website_url: impl Into<String>,
        question: impl Into<String>,
    ) -> Self {
        Self {
            brand_name: brand_name.into(),
            website_url: website_url.into(),
            question: question.into(),
            max_searches: DEFAULT_MAX_SEARCHES,
            max_sources: DEFAULT_MAX_SOURCES,
        }
    }

    /// Set the search and source limits stated in the prompt
    pub fn with_budget(mut self, max_searches: usize, max_sources: usize) -> Self {
        self.max_searches = max_searches;
        self.max_sources = max_sources;
        self
    }

    /// Build the compact prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(COMPACT_INSTRUCTIONS);
        prompt.push_str("\n\n");

        prompt.push_str("CONSTRAINTS\n");
        prompt.push_str(&format!("- Max web searches: {}\n", self.max_searches));
        prompt.push_str(&format!("- Max sources: {}\n\n", self.max_sources));

        prompt.push_str(COMPACT_FORMAT);
        prompt.push_str("\n\n");

        prompt.push_str(&format!("Brand: {}\n", self.brand_name));
        prompt.push_str(&format!("Website: {}\n", self.website_url));
        prompt.push_str(&format!("Question: {}\n\n", self.question.trim()));
        prompt.push_str("Answer:");

        prompt
    }

    /// Build the longer, more explicit prompt
    pub fn build_verbose(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(VERBOSE_INSTRUCTIONS);
        prompt.push_str("\n\n");

        prompt.push_str("IMPORTANT CONSTRAINTS:\n");
        prompt.push_str(&format!(
            "- You have a maximum of {} web searches available (unique domains)\n",
            self.max_searches
        ));
        prompt.push_str(&format!(
            "- You can include at most {} unique sources (urls) in your response\n",
            self.max_sources
        ));
        prompt.push_str(VERBOSE_RULES);
        prompt.push_str("\n\n");

        prompt.push_str("Brand Information:\n");
        prompt.push_str(&format!("- Brand Name: {}\n", self.brand_name));
        prompt.push_str(&format!("- Website: {}\n\n", self.website_url));
        prompt.push_str(&format!("Question: {}\n\n", self.question.trim()));
        prompt.push_str("Answer:");

        prompt
    }
}

const COMPACT_INSTRUCTIONS: &str =
    "Give an accurate answer. Cite sources as [text](url). Do not exceed budgets.";

const COMPACT_FORMAT: &str = r#"FORMAT
- Write in plain markdown.
- Include citations inline next to claims."#;

const VERBOSE_INSTRUCTIONS: &str = r#"Please provide a comprehensive, accurate answer about the brand.
Include relevant citations with markdown links [text](url) when referencing sources."#;

const VERBOSE_RULES: &str = r#"- Use web search to find current, accurate information
- These limits CANNOT be exceeded under any circumstances
- If needed summarize the information to fit the limits."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_prompt_layout() {
        let prompt = PromptBuilder::new("Tesla", "https://tesla.com", "  Is it safe?  ").build();

        assert!(prompt.starts_with("Give an accurate answer."));
        assert!(prompt.contains("- Max web searches: 3\n- Max sources: 6"));
        assert!(prompt.contains("Brand: Tesla\nWebsite: https://tesla.com\nQuestion: Is it safe?\n\nAnswer:"));
    }

    #[test]
    fn test_budget_applied() {
        let prompt = PromptBuilder::new("Acme", "acme.io", "Why?")
            .with_budget(1, 2)
            .build_verbose();

        assert!(prompt.contains("maximum of 1 web searches"));
        assert!(prompt.contains("at most 2 unique sources"));
        assert!(prompt.contains("- Brand Name: Acme"));
    }

    #[test]
    fn test_verbose_is_longer() {
        let builder = PromptBuilder::new("Tesla", "https://tesla.com", "Which car?");
        assert!(builder.build_verbose().len() > builder.build().len());
        assert!(builder.build_verbose().ends_with("Answer:"));
    }
}
