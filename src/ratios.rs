use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Ratio keys in presentation order.
pub const RATIO_KEYS: [&str; 6] = [
    "current_ratio",
    "debt_to_equity_ratio",
    "return_on_equity",
    "equity_multiplier",
    "debt_ratio",
    "net_profit_margin",
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RatioSet {
    #[schemars(description = "Total assets divided by total liabilities")]
    pub current_ratio: f64,

    #[schemars(description = "Total liabilities divided by total equity")]
    pub debt_to_equity_ratio: f64,

    #[schemars(description = "Net income divided by total equity")]
    pub return_on_equity: f64,

    #[schemars(description = "Total assets divided by total equity")]
    pub equity_multiplier: f64,

    #[schemars(description = "Total liabilities divided by total assets")]
    pub debt_ratio: f64,

    #[schemars(description = "Net income divided by total assets")]
    pub net_profit_margin: f64,
}

impl RatioSet {
    /// Derives all six ratios. No rounding is applied.
    ///
    /// The normalizer's zero-guard keeps the three totals non-zero under the default
    /// policy; with `ZeroGuard::Passthrough` a zero total yields an infinite or NaN ratio.
    pub fn compute(total_asset: f64, total_liability: f64, total_equity: f64, net_income: f64) -> Self {
        Self {
            current_ratio: total_asset / total_liability,
            debt_to_equity_ratio: total_liability / total_equity,
            return_on_equity: net_income / total_equity,
            equity_multiplier: total_asset / total_equity,
            debt_ratio: total_liability / total_asset,
            net_profit_margin: net_income / total_asset,
        }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        match key {
            "current_ratio" => Some(self.current_ratio),
            "debt_to_equity_ratio" => Some(self.debt_to_equity_ratio),
            "return_on_equity" => Some(self.return_on_equity),
            "equity_multiplier" => Some(self.equity_multiplier),
            "debt_ratio" => Some(self.debt_ratio),
            "net_profit_margin" => Some(self.net_profit_margin),
            _ => None,
        }
    }

    /// `(key, value)` pairs in [`RATIO_KEYS`] order.
    pub fn entries(&self) -> [(&'static str, f64); 6] {
        [
            (RATIO_KEYS[0], self.current_ratio),
            (RATIO_KEYS[1], self.debt_to_equity_ratio),
            (RATIO_KEYS[2], self.return_on_equity),
            (RATIO_KEYS[3], self.equity_multiplier),
            (RATIO_KEYS[4], self.debt_ratio),
            (RATIO_KEYS[5], self.net_profit_margin),
        ]
    }
}

/// "debt_to_equity_ratio" -> "Debt To Equity Ratio"
pub fn ratio_label(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_formulas() {
        let ratios = RatioSet::compute(500_000.0, 200_000.0, 300_000.0, 45_000.0);

        assert!((ratios.current_ratio - 2.5).abs() < 1e-12);
        assert!((ratios.debt_to_equity_ratio - 200_000.0 / 300_000.0).abs() < 1e-12);
        assert!((ratios.return_on_equity - 0.15).abs() < 1e-12);
        assert!((ratios.equity_multiplier - 500_000.0 / 300_000.0).abs() < 1e-12);
        assert!((ratios.debt_ratio - 0.4).abs() < 1e-12);
        assert!((ratios.net_profit_margin - 0.09).abs() < 1e-12);
    }

    #[test]
    fn test_negative_net_income() {
        let ratios = RatioSet::compute(100.0, 50.0, 50.0, -25.0);
        assert!((ratios.return_on_equity + 0.5).abs() < 1e-12);
        assert!((ratios.net_profit_margin + 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_entries_follow_key_order() {
        let ratios = RatioSet::compute(4.0, 2.0, 1.0, 1.0);
        let keys: Vec<&str> = ratios.entries().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, RATIO_KEYS.to_vec());

        for (key, value) in ratios.entries() {
            assert_eq!(ratios.get(key), Some(value));
        }
        assert_eq!(ratios.get("quick_ratio"), None);
    }

    #[test]
    fn test_ratio_label() {
        assert_eq!(ratio_label("current_ratio"), "Current Ratio");
        assert_eq!(ratio_label("debt_to_equity_ratio"), "Debt To Equity Ratio");
        assert_eq!(ratio_label("net_profit_margin"), "Net Profit Margin");
    }

    #[test]
    fn test_serialized_field_order() {
        let json = serde_json::to_string(&RatioSet::compute(1.0, 1.0, 1.0, 0.0)).unwrap();
        let positions: Vec<usize> = RATIO_KEYS
            .iter()
            .map(|key| json.find(&format!("\"{}\"", key)).unwrap())
            .collect();
        let mut sorted = positions.clone();
        sorted.sort();
        assert_eq!(positions, sorted);
    }
}
