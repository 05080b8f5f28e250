use crate::ratios::RATIO_KEYS;
use crate::schema::FlatRecord;
use crate::utils::parse_report_day;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-metric time series for charting totals and ratios across reporting dates.
///
/// Every vector is aligned with `dates`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub dates: Vec<String>,
    pub total_assets: Vec<f64>,
    pub total_liabilities: Vec<f64>,
    pub total_equities: Vec<f64>,
    pub net_incomes: Vec<f64>,
    /// Keyed by ratio key (`current_ratio`, ...).
    pub ratios: BTreeMap<String, Vec<f64>>,
    /// First record falling on the same calendar day as the selected date.
    pub selected_index: Option<usize>,
}

impl ChartData {
    pub fn from_records(records: &[FlatRecord], selected: Option<&str>) -> Self {
        let mut ratios: BTreeMap<String, Vec<f64>> = RATIO_KEYS
            .iter()
            .map(|key| (key.to_string(), Vec::with_capacity(records.len())))
            .collect();

        for record in records {
            for (key, value) in record.ratios.entries() {
                ratios.entry(key.to_string()).or_default().push(value);
            }
        }

        Self {
            dates: records.iter().map(|r| r.date.clone()).collect(),
            total_assets: records.iter().map(|r| r.total_asset).collect(),
            total_liabilities: records.iter().map(|r| r.total_liability).collect(),
            total_equities: records.iter().map(|r| r.total_equity).collect(),
            net_incomes: records.iter().map(|r| r.net_income).collect(),
            ratios,
            selected_index: selected.and_then(|date| selected_index(records, date)),
        }
    }

    pub fn ratio_series(&self, key: &str) -> Option<&[f64]> {
        self.ratios.get(key).map(|v| v.as_slice())
    }
}

/// Records with unparsable dates never match; an unparsable selection matches nothing.
pub fn selected_index(records: &[FlatRecord], selected: &str) -> Option<usize> {
    let day = parse_report_day(selected).ok()?;
    records
        .iter()
        .position(|r| parse_report_day(&r.date).map(|d| d == day).unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratios::RatioSet;

    fn record(date: &str, assets: f64, liabilities: f64) -> FlatRecord {
        FlatRecord {
            date: date.to_string(),
            total_asset: assets,
            asset_breakdown: vec![],
            total_liability: liabilities,
            liability_breakdown: vec![],
            total_equity: assets - liabilities,
            equity_breakdown: vec![],
            net_income: 0.0,
            ratios: RatioSet::compute(assets, liabilities, assets - liabilities, 0.0),
        }
    }

    #[test]
    fn test_series_alignment() {
        let records = vec![record("2024-01-01", 100.0, 40.0), record("2024-06-30", 200.0, 50.0)];
        let chart = ChartData::from_records(&records, None);

        assert_eq!(chart.dates, vec!["2024-01-01", "2024-06-30"]);
        assert_eq!(chart.total_assets, vec![100.0, 200.0]);
        assert_eq!(chart.total_equities, vec![60.0, 150.0]);
        assert_eq!(chart.ratios.len(), 6);
        assert_eq!(chart.ratio_series("current_ratio").unwrap(), &[2.5, 4.0]);
        assert_eq!(chart.selected_index, None);
    }

    #[test]
    fn test_selected_index_matches_calendar_day() {
        let records = vec![
            record("2024-01-01T00:00:00Z", 1.0, 1.0),
            record("2024-06-30T00:00:00Z", 1.0, 1.0),
        ];
        let chart = ChartData::from_records(&records, Some("2024-06-30T15:00:00"));
        assert_eq!(chart.selected_index, Some(1));

        assert_eq!(selected_index(&records, "2024-06-29"), None);
        assert_eq!(selected_index(&records, "nonsense"), None);
    }

    #[test]
    fn test_empty_records() {
        let chart = ChartData::from_records(&[], Some("2024-01-01"));
        assert!(chart.dates.is_empty());
        assert!(chart.ratio_series("debt_ratio").unwrap().is_empty());
        assert_eq!(chart.selected_index, None);
    }
}
