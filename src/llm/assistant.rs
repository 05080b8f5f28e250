use crate::error::Result;
use crate::llm::client::NarrativeClient;
use crate::llm::prompts::{answer_prompt, table_selection_prompt};
use crate::source::SupabaseSource;
use futures::future::join_all;
use log::{info, warn};
use serde_json::{Map, Value};

/// Answers free-text questions from whichever tables the model deems relevant.
pub struct DataAssistant {
    client: NarrativeClient,
    source: SupabaseSource,
}

impl DataAssistant {
    pub fn new(client: NarrativeClient, source: SupabaseSource) -> Self {
        Self { client, source }
    }

    /// Two round trips to the model: one to pick tables, one to answer from their rows.
    pub async fn ask(&self, question: &str) -> Result<String> {
        let tables = self.source.list_tables().await?;
        info!("Data assistant sees {} tables", tables.len());

        let selection = self
            .client
            .complete(&table_selection_prompt(&tables, question))
            .await?;
        let relevant: Vec<String> = parse_table_list(&selection)
            .into_iter()
            .filter(|name| tables.contains(name))
            .collect();
        info!("Relevant tables: {:?}", relevant);

        let fetched = join_all(relevant.iter().map(|table| self.source.fetch_table(table))).await;

        let mut knowledge = Map::new();
        for (table, rows) in relevant.iter().zip(fetched) {
            match rows {
                Ok(rows) => {
                    knowledge.insert(table.clone(), rows);
                }
                Err(e) => warn!("Skipping table {}: {}", table, e),
            }
        }

        let knowledge_json = serde_json::to_string(&Value::Object(knowledge))?;
        self.client
            .complete(&answer_prompt(&knowledge_json, question))
            .await
    }
}

/// Parses a reply shaped like `[table_a, "table_b"]` into trimmed, unquoted names.
pub fn parse_table_list(reply: &str) -> Vec<String> {
    reply
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(|name| name.trim().trim_matches(|c: char| c == '"' || c == '\'' || c == '`').trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_table_list() {
        assert_eq!(
            parse_table_list("[accounting_balance_sheets, \"invoices\", 'payments']"),
            vec!["accounting_balance_sheets", "invoices", "payments"]
        );
    }

    #[test]
    fn test_parse_empty_list() {
        assert!(parse_table_list("[]").is_empty());
        assert!(parse_table_list("  ").is_empty());
    }
}
