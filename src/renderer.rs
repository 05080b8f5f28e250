use crate::ratios::ratio_label;
use crate::schema::{FlatRecord, LineItem};
use crate::utils::{format_currency, parse_report_date};

/// Renders one balance sheet as a markdown briefing.
///
/// Never fails: an unparsable date is printed as stored and a missing line value is
/// printed as `N/A`.
pub fn render(record: &FlatRecord) -> String {
    let mut markdown = String::new();
    markdown.push_str(&format!(
        "\n# Financial Report\n\n**Date:** {}\n\n",
        format_report_date(&record.date)
    ));

    push_section(
        &mut markdown,
        "Assets",
        "Total Assets",
        record.total_asset,
        &record.asset_breakdown,
    );
    push_section(
        &mut markdown,
        "Liabilities",
        "Total Liabilities",
        record.total_liability,
        &record.liability_breakdown,
    );
    push_section(
        &mut markdown,
        "Equity",
        "Total Equity",
        record.total_equity,
        &record.equity_breakdown,
    );

    markdown.push_str(&format!(
        "## Net Income\n**Net Income:** {}\n\n## Ratios\n",
        format_currency(record.net_income)
    ));

    for (key, value) in record.ratios.entries() {
        markdown.push_str(&format!("- **{}:** {:.2}\n", ratio_label(key), value));
    }

    markdown
}

/// `2024-12-31` -> `December 31, 2024`; anything unparsable is returned unchanged.
pub fn format_report_date(date: &str) -> String {
    match parse_report_date(date) {
        Ok(parsed) => parsed.format("%B %d, %Y").to_string(),
        Err(_) => date.to_string(),
    }
}

fn push_section(markdown: &mut String, title: &str, total_label: &str, total: f64, items: &[LineItem]) {
    markdown.push_str(&format!(
        "## {}\n**{}:** {}\n\n### Breakdown\n",
        title,
        total_label,
        format_currency(total)
    ));

    for item in items {
        let value = match item.value {
            Some(value) => format_currency(value),
            None => "N/A".to_string(),
        };
        markdown.push_str(&format!("- **{}:** {}\n", item.name, value));
    }

    markdown.push_str("\n\n");
}
