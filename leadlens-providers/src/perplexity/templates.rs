//! Lead-enrichment prompt templates.
//!
//! Each template produces a research prompt asking for structured output;
//! the facade methods in [`super`] pair them with citation-enabled chat
//! requests.

/// Company overview prompt.
pub fn company_info(company_name: &str) -> String {
    format!(
        "Provide detailed, current information about {company_name} including: company overview, \
         industry, size, headquarters location, key executives, recent news, and main \
         products/services. Format as structured data."
    )
}

/// Professional-background prompt for a person, optionally scoped to a
/// company.
pub fn person_info(person_name: &str, company: Option<&str>) -> String {
    let affiliation = company
        .map(|c| format!(" who works at {c}"))
        .unwrap_or_default();
    format!(
        "Find professional information about {person_name}{affiliation} including: current role, \
         professional background, education, notable achievements, and social media presence. \
         Format as structured data."
    )
}

/// Contact-enrichment prompt from an email address.
pub fn contact_enrichment(email: &str) -> String {
    format!(
        "Based on the email address {email}, find: associated person's name, company, job title, \
         professional background, and any publicly available contact information."
    )
}

/// Industry research prompt.
pub fn industry_research(industry: &str, topic: &str) -> String {
    format!(
        "Provide comprehensive research about {topic} in the {industry} industry, including: key \
         trends, major players, market size, challenges, and opportunities."
    )
}

/// Competitor analysis prompt.
pub fn competitor_analysis(company_name: &str) -> String {
    format!(
        "Identify and analyze the main competitors of {company_name}, including: competitor \
         names, market positioning, strengths/weaknesses, and differentiation factors."
    )
}

/// Lead qualification prompt against caller-supplied criteria.
pub fn lead_qualification(company_name: &str, criteria: &str) -> String {
    format!(
        "Evaluate {company_name} as a potential lead based on: {criteria}. Provide a \
         qualification score and reasoning."
    )
}

/// Recent-news summary prompt.
pub fn news_summary(company_name: &str, timeframe: &str) -> String {
    format!(
        "Summarize recent news and developments about {company_name} from the {timeframe}, \
         focusing on: funding, partnerships, product launches, and leadership changes."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_info_with_and_without_company() {
        let with = person_info("Jane Doe", Some("Acme Corp"));
        assert!(with.contains("Jane Doe who works at Acme Corp"));

        let without = person_info("Jane Doe", None);
        assert!(without.contains("about Jane Doe including"));
        assert!(!without.contains("works at"));
    }

    #[test]
    fn test_templates_embed_the_subject() {
        assert!(company_info("Tesla Inc").contains("Tesla Inc"));
        assert!(contact_enrichment("a@b.com").contains("a@b.com"));
        assert!(industry_research("SaaS", "AI adoption").contains("AI adoption in the SaaS"));
        assert!(competitor_analysis("Salesforce").contains("Salesforce"));
        assert!(lead_qualification("Acme", "revenue >$10M").contains("revenue >$10M"));
        assert!(news_summary("Apple", "last week").contains("from the last week"));
    }
}
