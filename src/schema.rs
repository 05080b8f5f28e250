use crate::ratios::RatioSet;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One row of the upstream `accounting_balance_sheets` table.
///
/// Every field is optional because the store hands us whatever was written into it.
/// Substitution of defaults happens in the normalizer, never here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RawReport {
    #[schemars(description = "Reporting date as an ISO-8601 date or datetime string")]
    #[serde(default)]
    pub date: Option<String>,

    #[schemars(description = "Nested balance sheet with assets, liabilities and equity sections")]
    #[serde(default)]
    pub report_json: Option<ReportJson>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ReportJson {
    #[serde(default)]
    pub assets: Option<Vec<ReportSection>>,

    #[serde(default)]
    pub liabilities: Option<Vec<ReportSection>>,

    #[serde(default)]
    pub equity: Option<Vec<ReportSection>>,
}

/// A balance sheet section. Upstream wraps each section in a one-element list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ReportSection {
    #[schemars(description = "Section total; may be null")]
    #[serde(default)]
    pub value: Option<f64>,

    #[serde(default)]
    pub sub_items: Option<Vec<RawLineItem>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RawLineItem {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LineItem {
    #[schemars(description = "Account name as reported (e.g. 'Cash', 'Accounts Payable', 'Net Income')")]
    pub name: String,

    #[schemars(description = "Reported balance; null when the upstream value was missing")]
    pub value: Option<f64>,
}

/// The normalized, section-flattened view of one balance sheet.
///
/// Totals have already passed through the [`ZeroGuard`](crate::normalizer::ZeroGuard),
/// so under the default policy they are never zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FlatRecord {
    #[schemars(description = "Reporting date exactly as stored upstream")]
    pub date: String,

    #[schemars(description = "Total assets for the reporting date")]
    pub total_asset: f64,

    pub asset_breakdown: Vec<LineItem>,

    #[schemars(description = "Total liabilities for the reporting date")]
    pub total_liability: f64,

    pub liability_breakdown: Vec<LineItem>,

    #[schemars(description = "Total equity for the reporting date")]
    pub total_equity: f64,

    pub equity_breakdown: Vec<LineItem>,

    #[schemars(description = "Value of the 'Net Income' equity line, 0 when absent")]
    pub net_income: f64,

    pub ratios: RatioSet,
}

impl FlatRecord {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(FlatRecord)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}
