use crate::error::{BriefingError, Result};
use crate::ratios::RatioSet;
use crate::schema::{FlatRecord, LineItem, RawLineItem, RawReport, ReportSection};
use log::{debug, info};
use serde::{Deserialize, Serialize};

pub const NET_INCOME_ITEM: &str = "Net Income";

/// Policy applied to section totals before any ratio is divided by them.
///
/// The default substitutes `1` for a total that is missing, null or exactly zero, which
/// keeps every ratio finite. This also rewrites a genuine zero total (a company with no
/// liabilities, say) to `1`, so ratios built on it are distorted rather than infinite.
/// `Passthrough` keeps true zeros and treats missing totals as `0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ZeroGuard {
    Substitute(f64),
    Passthrough,
}

impl Default for ZeroGuard {
    fn default() -> Self {
        Self::Substitute(1.0)
    }
}

impl ZeroGuard {
    pub fn apply(&self, total: Option<f64>) -> f64 {
        match (self, total) {
            (Self::Substitute(fallback), None) => *fallback,
            (Self::Substitute(fallback), Some(value)) if value == 0.0 => *fallback,
            (_, Some(value)) => value,
            (Self::Passthrough, None) => 0.0,
        }
    }
}

/// Normalizes every report with the default [`ZeroGuard`]. Output order matches input.
pub fn normalize(reports: &[RawReport]) -> Result<Vec<FlatRecord>> {
    normalize_with(reports, &ZeroGuard::default())
}

pub fn normalize_with(reports: &[RawReport], guard: &ZeroGuard) -> Result<Vec<FlatRecord>> {
    let records = reports
        .iter()
        .enumerate()
        .map(|(index, report)| normalize_report(index, report, guard))
        .collect::<Result<Vec<_>>>()?;

    info!("Normalized {} balance sheets", records.len());
    Ok(records)
}

/// Flattens a single report. `index` only feeds error messages.
pub fn normalize_report(index: usize, report: &RawReport, guard: &ZeroGuard) -> Result<FlatRecord> {
    let report_json = report
        .report_json
        .as_ref()
        .ok_or(BriefingError::StructuralError {
            index,
            field: "report_json",
        })?;
    let date = report.date.clone().ok_or(BriefingError::StructuralError {
        index,
        field: "date",
    })?;

    let assets = first_section(report_json.assets.as_deref());
    let liabilities = first_section(report_json.liabilities.as_deref());
    let equity = first_section(report_json.equity.as_deref());

    let asset_breakdown = breakdown(assets);
    let liability_breakdown = breakdown(liabilities);
    let equity_breakdown = breakdown(equity);

    let total_asset = guard.apply(assets.and_then(|s| s.value));
    let total_liability = guard.apply(liabilities.and_then(|s| s.value));
    let total_equity = guard.apply(equity.and_then(|s| s.value));
    let net_income = net_income(&equity_breakdown);

    debug!(
        "Balance sheet {} ({}): assets={}, liabilities={}, equity={}, net_income={}",
        index, date, total_asset, total_liability, total_equity, net_income
    );

    Ok(FlatRecord {
        date,
        total_asset,
        asset_breakdown,
        total_liability,
        liability_breakdown,
        total_equity,
        equity_breakdown,
        net_income,
        ratios: RatioSet::compute(total_asset, total_liability, total_equity, net_income),
    })
}

fn first_section(sections: Option<&[ReportSection]>) -> Option<&ReportSection> {
    sections.and_then(|s| s.first())
}

fn breakdown(section: Option<&ReportSection>) -> Vec<LineItem> {
    section
        .and_then(|s| s.sub_items.as_deref())
        .unwrap_or_default()
        .iter()
        .map(|item: &RawLineItem| LineItem {
            name: item.name.clone().unwrap_or_default(),
            value: item.value,
        })
        .collect()
}

/// Only the first "Net Income" line counts, even when its value is null.
fn net_income(equity_breakdown: &[LineItem]) -> f64 {
    equity_breakdown
        .iter()
        .find(|item| item.name == NET_INCOME_ITEM)
        .and_then(|item| item.value)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawReport {
        serde_json::from_value(value).unwrap()
    }

    fn populated() -> RawReport {
        raw(json!({
            "date": "2024-06-30",
            "report_json": {
                "assets": [{
                    "value": 500000.0,
                    "sub_items": [
                        { "name": "Cash", "value": 150000.0 },
                        { "name": "Inventory", "value": 350000.0 }
                    ]
                }],
                "liabilities": [{
                    "value": 200000.0,
                    "sub_items": [{ "name": "Accounts Payable", "value": 200000.0 }]
                }],
                "equity": [{
                    "value": 300000.0,
                    "sub_items": [
                        { "name": "Share Capital", "value": 255000.0 },
                        { "name": "Net Income", "value": 45000.0 }
                    ]
                }]
            }
        }))
    }

    #[test]
    fn test_normalize_populated_report() {
        let record = normalize_report(0, &populated(), &ZeroGuard::default()).unwrap();

        assert_eq!(record.date, "2024-06-30");
        assert_eq!(record.total_asset, 500000.0);
        assert_eq!(record.total_liability, 200000.0);
        assert_eq!(record.total_equity, 300000.0);
        assert_eq!(record.net_income, 45000.0);
        assert_eq!(record.asset_breakdown.len(), 2);
        assert_eq!(record.asset_breakdown[1].name, "Inventory");
        assert_eq!(record.liability_breakdown[0].value, Some(200000.0));
        assert!((record.ratios.current_ratio - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_missing_totals_default_to_one() {
        let report = raw(json!({
            "date": "2024-01-01",
            "report_json": {
                "assets": [{ "value": null, "sub_items": [] }],
                "liabilities": [],
                "equity": [{ "value": 0 }]
            }
        }));

        let record = normalize_report(0, &report, &ZeroGuard::default()).unwrap();
        assert_eq!(record.total_asset, 1.0);
        assert_eq!(record.total_liability, 1.0);
        assert_eq!(record.total_equity, 1.0);
        assert_eq!(record.net_income, 0.0);
        assert!(record.asset_breakdown.is_empty());
        assert!(record.equity_breakdown.is_empty());
        assert_eq!(record.ratios.current_ratio, 1.0);
    }

    #[test]
    fn test_missing_sections_entirely() {
        let report = raw(json!({ "date": "2024-01-01", "report_json": {} }));
        let record = normalize_report(3, &report, &ZeroGuard::default()).unwrap();

        assert_eq!(record.total_asset, 1.0);
        assert_eq!(record.net_income, 0.0);
        assert!(record.liability_breakdown.is_empty());
    }

    #[test]
    fn test_net_income_takes_first_match_even_if_null() {
        let report = raw(json!({
            "date": "2024-01-01",
            "report_json": {
                "equity": [{
                    "value": 100.0,
                    "sub_items": [
                        { "name": "net income", "value": 7.0 },
                        { "name": "Net Income", "value": null },
                        { "name": "Net Income", "value": 12.0 }
                    ]
                }]
            }
        }));

        let record = normalize_report(0, &report, &ZeroGuard::default()).unwrap();
        assert_eq!(record.net_income, 0.0);
        assert_eq!(record.equity_breakdown.len(), 3);
        assert_eq!(record.equity_breakdown[1].value, None);
    }

    #[test]
    fn test_nameless_line_item() {
        let report = raw(json!({
            "date": "2024-01-01",
            "report_json": { "assets": [{ "value": 5.0, "sub_items": [{ "value": 5.0 }] }] }
        }));

        let record = normalize_report(0, &report, &ZeroGuard::default()).unwrap();
        assert_eq!(record.asset_breakdown[0].name, "");
        assert_eq!(record.asset_breakdown[0].value, Some(5.0));
    }

    #[test]
    fn test_missing_report_json_is_structural_error() {
        let reports = vec![populated(), raw(json!({ "date": "2024-09-30" }))];

        match normalize(&reports) {
            Err(BriefingError::StructuralError { index, field }) => {
                assert_eq!(index, 1);
                assert_eq!(field, "report_json");
            }
            other => panic!("expected structural error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_date_is_structural_error() {
        let report = raw(json!({ "report_json": {} }));
        assert!(matches!(
            normalize_report(0, &report, &ZeroGuard::default()),
            Err(BriefingError::StructuralError { field: "date", .. })
        ));
    }

    #[test]
    fn test_zero_guard_policies() {
        let default = ZeroGuard::default();
        assert_eq!(default.apply(None), 1.0);
        assert_eq!(default.apply(Some(0.0)), 1.0);
        assert_eq!(default.apply(Some(-4.0)), -4.0);

        let custom = ZeroGuard::Substitute(1000.0);
        assert_eq!(custom.apply(None), 1000.0);

        let passthrough = ZeroGuard::Passthrough;
        assert_eq!(passthrough.apply(None), 0.0);
        assert_eq!(passthrough.apply(Some(0.0)), 0.0);
        assert_eq!(passthrough.apply(Some(12.5)), 12.5);
    }

    #[test]
    fn test_passthrough_keeps_true_zero_liabilities() {
        let report = raw(json!({
            "date": "2024-01-01",
            "report_json": {
                "assets": [{ "value": 100.0 }],
                "liabilities": [{ "value": 0.0 }],
                "equity": [{ "value": 100.0 }]
            }
        }));

        let record = normalize_report(0, &report, &ZeroGuard::Passthrough).unwrap();
        assert_eq!(record.total_liability, 0.0);
        assert!(record.ratios.current_ratio.is_infinite());
        assert_eq!(record.ratios.debt_ratio, 0.0);
    }

    #[test]
    fn test_normalize_preserves_order() {
        let dates = ["2024-06-30", "2023-12-31", "2024-03-31", "2023-12-31"];
        let reports: Vec<RawReport> = dates
            .iter()
            .map(|d| raw(json!({ "date": d, "report_json": {} })))
            .collect();

        let records = normalize(&reports).unwrap();
        let out: Vec<&str> = records.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(out, dates.to_vec());
    }
}
