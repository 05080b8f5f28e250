// Prompts for the narrative analysis and the table-picking data assistant

pub const SYSTEM_PROMPT_ANALYST: &str = "You are a helpful professional financial analyst.";

pub const ANALYSIS_INSTRUCTIONS: &str = r#"generate a concise financial analysis report evaluating the company's financial health. The report should be structured into the following six sections:
1. Financial Summary: Provide an overview of the key financial figures, including total assets, liabilities, equity, and net income, highlighting any significant observations.
2. Breakdown of Financial Components: Analyze and describe the composition of assets, liabilities, and equity, noting any dominant or missing components.
3. Key Financial Ratios Interpretation: Evaluate the company's financial health by interpreting relevant ratios (e.g., current ratio, debt-to-equity ratio, return on equity, equity multiplier, debt ratio, and net profit margin) in the context of standard benchmarks.
4. Key Findings: Highlight the most critical takeaways from the data, such as liquidity, solvency, profitability, or significant trends.
5. Key Insights: Summarize actionable insights that can be drawn from the analysis, focusing on areas of strength, risks, or opportunities.
6. Recommendations: Provide practical recommendations for improving financial performance, mitigating risks, or leveraging opportunities.
Ensure that the analysis is clear, precise, and easy to understand, using the data provided to support conclusions where applicable."#;

/// Section totals of 1.00 usually mean the upstream total was missing.
pub const ZERO_GUARD_NOTE: &str = "Note: a section total of exactly 1.00 indicates the reported total was missing or zero and a placeholder was substituted; treat ratios built on it with caution.";

pub fn analysis_prompt(record_json: &str, target_date: &str) -> String {
    format!(
        "Financial data and calculated ratios: {}\n{}\nUsing the provided balance sheet data for the specified date, {}, {}",
        record_json, ZERO_GUARD_NOTE, target_date, ANALYSIS_INSTRUCTIONS
    )
}

pub fn table_selection_prompt(tables: &[String], question: &str) -> String {
    format!(
        "As a senior financial analyst, you have access to the following tables: {}.\n\
        The user has asked the following question: {}.\n\
        Your task is to carefully analyze the available tables and determine which ones contain relevant information to answer the user's question.\n\
        Return only a list of table names that would be useful, formatted as follows: [table_name_1, table_name_2, ...].\n\
        Do not include any explanations or additional text, only the list of relevant tables.",
        tables.join(", "),
        question
    )
}

pub fn answer_prompt(knowledge_json: &str, question: &str) -> String {
    format!(
        "As a senior financial analyst, you have access to the following knowledge, keyed by table name:\n{}\n\
        The user has asked the following question: {}.\n\
        Based on your analysis of the available data, provide a detailed response to the user's question.\n\
        Be sure to include specific details and insights from the relevant tables to support your analysis.\n\
        Generate a paragraph-style response that is clear, concise, and informative.",
        knowledge_json, question
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_prompt_mentions_date_and_sections() {
        let prompt = analysis_prompt("{\"total_asset\": 10.0}", "2024-06-30");
        assert!(prompt.starts_with("Financial data and calculated ratios: {\"total_asset\": 10.0}"));
        assert!(prompt.contains("for the specified date, 2024-06-30,"));
        assert!(prompt.contains("6. Recommendations"));
    }

    #[test]
    fn test_table_selection_prompt_lists_tables() {
        let tables = vec!["invoices".to_string(), "payments".to_string()];
        let prompt = table_selection_prompt(&tables, "Who owes us money?");
        assert!(prompt.contains("following tables: invoices, payments."));
        assert!(prompt.contains("Who owes us money?"));
    }
}
