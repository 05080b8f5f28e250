use crate::error::{BriefingError, Result};
use crate::schema::FlatRecord;
use crate::utils::parse_report_date;
use chrono::NaiveDateTime;
use log::debug;

/// Returns the record dated closest to `target_date`.
///
/// An exact match wins outright (first one in input order). Otherwise the record with
/// the smallest absolute distance is returned, and ties go to the earlier record.
/// Every record date must parse: a silently skipped record could change the answer.
pub fn resolve<'a>(records: &'a [FlatRecord], target_date: &str) -> Result<&'a FlatRecord> {
    let target = parse_report_date(target_date)?;

    if records.is_empty() {
        return Err(BriefingError::EmptyInput);
    }

    let dates = parse_record_dates(records)?;

    if let Some(index) = dates.iter().position(|date| *date == target) {
        debug!("Exact balance sheet match for {}", target_date);
        return Ok(&records[index]);
    }

    let mut nearest = 0;
    let mut nearest_distance = (dates[0] - target).abs();
    for (index, date) in dates.iter().enumerate().skip(1) {
        let distance = (*date - target).abs();
        if distance < nearest_distance {
            nearest = index;
            nearest_distance = distance;
        }
    }

    debug!(
        "Nearest balance sheet to {} is {} ({} days away)",
        target_date,
        records[nearest].date,
        nearest_distance.num_days()
    );

    Ok(&records[nearest])
}

/// Sorts records by parsed date, oldest first. Equal dates keep their relative order.
///
/// If any date fails to parse the records are left as they were.
pub fn sort_by_report_date(records: &mut Vec<FlatRecord>) -> Result<()> {
    let dates = parse_record_dates(records)?;

    let mut keyed: Vec<(NaiveDateTime, FlatRecord)> = dates.into_iter().zip(records.drain(..)).collect();
    keyed.sort_by_key(|(date, _)| *date);
    records.extend(keyed.into_iter().map(|(_, record)| record));

    Ok(())
}

/// Record date strings, newest first, as offered in a date picker.
pub fn available_dates(records: &[FlatRecord]) -> Vec<String> {
    let mut dates: Vec<String> = records.iter().map(|r| r.date.clone()).collect();
    dates.sort_by(|a, b| b.cmp(a));
    dates
}

fn parse_record_dates(records: &[FlatRecord]) -> Result<Vec<NaiveDateTime>> {
    records.iter().map(|r| parse_report_date(&r.date)).collect()
}
