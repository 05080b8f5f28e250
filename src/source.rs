use crate::config::SupabaseSettings;
use crate::error::{BriefingError, Result};
use crate::schema::RawReport;
use log::info;
use reqwest::{Client, RequestBuilder};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Reads balance sheets and arbitrary tables from a Supabase project over PostgREST.
#[derive(Clone)]
pub struct SupabaseSource {
    client: Client,
    base_url: String,
    api_key: String,
    table: String,
}

impl SupabaseSource {
    pub fn new(settings: &SupabaseSettings) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: settings.url.trim_end_matches('/').to_string(),
            api_key: settings.key.clone(),
            table: settings.table.clone(),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Fetches `date` and `report_json` for every balance sheet, oldest first.
    pub async fn fetch_balance_sheets(&self) -> Result<Vec<RawReport>> {
        let url = format!("{}/rest/v1/{}", self.base_url, self.table);
        let res = self
            .authorized(self.client.get(&url))
            .query(&[("select", "date,report_json"), ("order", "date.asc")])
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let error_text = res.text().await?;
            return Err(BriefingError::FetchFailed(format!(
                "Balance sheet query failed (status {}): {}",
                status, error_text
            )));
        }

        let reports: Vec<RawReport> = res.json().await?;
        info!("Fetched {} balance sheets from {}", reports.len(), self.table);
        Ok(reports)
    }

    /// Table names exposed by the `get_tables` database function.
    pub async fn list_tables(&self) -> Result<Vec<String>> {
        let url = format!("{}/rest/v1/rpc/get_tables", self.base_url);
        let res = self
            .authorized(self.client.post(&url))
            .json(&serde_json::json!({}))
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let error_text = res.text().await?;
            return Err(BriefingError::FetchFailed(format!(
                "get_tables failed (status {}): {}",
                status, error_text
            )));
        }

        let body: serde_json::Value = res.json().await?;
        Ok(table_names(&body))
    }

    /// Every row of `table` as raw JSON.
    pub async fn fetch_table(&self, table: &str) -> Result<serde_json::Value> {
        let url = format!("{}/rest/v1/{}", self.base_url, table.trim());
        let res = self
            .authorized(self.client.get(&url))
            .query(&[("select", "*")])
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let error_text = res.text().await?;
            return Err(BriefingError::FetchFailed(format!(
                "Query on table {} failed (status {}): {}",
                table, status, error_text
            )));
        }

        Ok(res.json().await?)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }
}

/// `get_tables` may answer with plain strings or with rows such as
/// `{"table_name": "..."}`.
fn table_names(body: &serde_json::Value) -> Vec<String> {
    body.as_array()
        .map(|rows| {
            rows.iter()
                .filter_map(|row| match row {
                    serde_json::Value::String(name) => Some(name.clone()),
                    serde_json::Value::Object(fields) => fields
                        .get("table_name")
                        .or_else(|| fields.values().next())
                        .and_then(|v| v.as_str())
                        .map(str::to_string),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}
