use crate::error::Result;
use crate::schema::{FlatRecord, RawReport};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const BALANCE_SHEETS_KEY: &str = "accounting_balance_sheets";

/// Snapshot files come either as a bare array of rows or wrapped in an object keyed
/// by the table name.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawSnapshot {
    Rows(Vec<RawReport>),
    Keyed {
        accounting_balance_sheets: Vec<RawReport>,
    },
}

pub fn parse_raw_reports(json: &str) -> Result<Vec<RawReport>> {
    let snapshot: RawSnapshot = serde_json::from_str(json)?;
    Ok(match snapshot {
        RawSnapshot::Rows(rows) => rows,
        RawSnapshot::Keyed {
            accounting_balance_sheets,
        } => accounting_balance_sheets,
    })
}

pub fn load_raw_reports(path: &Path) -> Result<Vec<RawReport>> {
    let json = fs::read_to_string(path)?;
    let reports = parse_raw_reports(&json)?;
    info!("Loaded {} balance sheets from {}", reports.len(), path.display());
    Ok(reports)
}

pub fn save_raw_reports(reports: &[RawReport], path: &Path) -> Result<()> {
    fs::write(path, to_pretty_json(reports)?)?;
    info!("Wrote {} raw balance sheets to {}", reports.len(), path.display());
    Ok(())
}

/// Writes the records as pretty-printed UTF-8 JSON.
pub fn export_records(records: &[FlatRecord], path: &Path) -> Result<()> {
    fs::write(path, to_pretty_json(records)?)?;
    info!("Balance sheet data has been written to {}", path.display());
    Ok(())
}

pub fn load_records(path: &Path) -> Result<Vec<FlatRecord>> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// Four-space indented JSON.
fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::normalize;
    use crate::BriefingError;

    const ROWS: &str = r#"[
        { "date": "2024-01-01", "report_json": { "assets": [{ "value": 10.0, "sub_items": [] }] } },
        { "date": "2024-06-30", "report_json": {} }
    ]"#;

    #[test]
    fn test_parse_bare_array() {
        let reports = parse_raw_reports(ROWS).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[1].date.as_deref(), Some("2024-06-30"));
    }

    #[test]
    fn test_parse_keyed_snapshot() {
        let keyed = format!("{{ \"{}\": {} }}", BALANCE_SHEETS_KEY, ROWS);
        let reports = parse_raw_reports(&keyed).unwrap();
        assert_eq!(reports.len(), 2);
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(matches!(
            parse_raw_reports("not json"),
            Err(BriefingError::SerializationError(_))
        ));
    }

    #[test]
    fn test_export_and_reload_records() {
        let records = normalize(&parse_raw_reports(ROWS).unwrap()).unwrap();
        let path = std::env::temp_dir().join(format!("briefing-export-{}.json", std::process::id()));

        export_records(&records, &path).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("[\n    {\n        \"date\""));
        assert!(written.contains("\"total_asset\": 10.0"));

        let reloaded = load_records(&path).unwrap();
        fs::remove_file(&path).ok();
        assert_eq!(reloaded, records);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let path = Path::new("/definitely/not/here.json");
        assert!(matches!(load_raw_reports(path), Err(BriefingError::IoError(_))));
    }
}
