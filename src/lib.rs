//! # Balance Sheet Briefing
//!
//! Turns raw balance sheet rows (as stored in the upstream `accounting_balance_sheets`
//! table) into comparable records with derived financial ratios, picks the sheet
//! nearest a requested date and renders it as a markdown briefing.
//!
//! ## Core Concepts
//!
//! - **Raw Report**: one upstream row, a date plus a nested `report_json` whose sections
//!   may be missing, empty or null
//! - **Flat Record**: the normalized sheet with totals, line-item breakdowns, net income
//!   and six ratios
//! - **Zero Guard**: the named policy that substitutes `1` for missing or zero totals so
//!   every ratio stays finite
//! - **Nearest-Date Resolution**: exact match first, otherwise the smallest absolute
//!   distance, ties to the earlier record
//!
//! ## Example
//!
//! ```rust,ignore
//! use balance_sheet_briefing::*;
//!
//! let raw = export::load_raw_reports(std::path::Path::new("balance_sheets.json"))?;
//! let pipeline = BriefingPipeline::default();
//! let briefing = pipeline.briefing(&raw, "2024-03-15")?;
//! println!("{}", briefing.markdown);
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod export;
pub mod normalizer;
pub mod ratios;
pub mod renderer;
pub mod resolver;
pub mod schema;
pub mod series;
pub mod utils;

#[cfg(feature = "remote")]
pub mod llm;
#[cfg(feature = "remote")]
pub mod source;

#[cfg(feature = "server")]
pub mod server;

pub use cache::TimedCache;
pub use config::BriefingConfig;
pub use error::{BriefingError, Result};
pub use normalizer::{normalize, normalize_with, ZeroGuard};
pub use ratios::{ratio_label, RatioSet, RATIO_KEYS};
pub use renderer::render;
pub use resolver::{available_dates, resolve, sort_by_report_date};
pub use schema::*;
pub use series::ChartData;

use log::{debug, info};
use serde::{Deserialize, Serialize};

/// A resolved balance sheet together with its rendered markdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Briefing {
    pub target_date: String,
    pub record: FlatRecord,
    pub markdown: String,
}

/// Normalize, sort, resolve and render in one place.
#[derive(Debug, Clone, Default)]
pub struct BriefingPipeline {
    guard: ZeroGuard,
}

impl BriefingPipeline {
    pub fn new(guard: ZeroGuard) -> Self {
        Self { guard }
    }

    /// Normalized records ordered oldest first.
    pub fn records(&self, raw: &[RawReport]) -> Result<Vec<FlatRecord>> {
        let mut records = normalize_with(raw, &self.guard)?;
        sort_by_report_date(&mut records)?;
        debug!("Prepared {} balance sheet records", records.len());
        Ok(records)
    }

    pub fn briefing(&self, raw: &[RawReport], target_date: &str) -> Result<Briefing> {
        let records = self.records(raw)?;
        let record = resolve(&records, target_date)?;

        info!(
            "Briefing for {} resolved to balance sheet dated {}",
            target_date, record.date
        );

        Ok(Briefing {
            target_date: target_date.to_string(),
            markdown: render(record),
            record: record.clone(),
        })
    }
}

pub fn generate_briefing(raw: &[RawReport], target_date: &str) -> Result<Briefing> {
    BriefingPipeline::default().briefing(raw, target_date)
}
