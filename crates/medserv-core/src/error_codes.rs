//! Error-code log aggregation for the device error chart

use std::collections::BTreeMap;
use std::collections::HashMap;

use chrono::NaiveDate;
use medserv_source::RawErrorCodeEntry;
use serde::{Deserialize, Serialize};

use crate::models::{ErrorCodeDaySummary, ErrorCodeOccurrence};
use crate::reports::{ChartData, ChartDataset};
use crate::time::day_key;

/// Raw code the devices log when nothing went wrong
pub const NO_ERROR_SENTINEL: &str = "-";
/// Label shown instead of the sentinel
pub const NO_ERROR_LABEL: &str = "No Error";

/// Normalize a raw error code
///
/// Returns `None` when nothing is left after trimming.
pub fn normalize_code(raw: &str) -> Option<String> {
    if raw == NO_ERROR_SENTINEL {
        return Some(NO_ERROR_LABEL.to_string());
    }
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Group error-code entries by calendar day
///
/// Entries without a usable date (`date`, then `created_at`) or with an
/// empty code are dropped. Days are returned in ascending order; codes within
/// a day keep log order.
pub fn aggregate_error_codes(entries: &[RawErrorCodeEntry]) -> Vec<ErrorCodeDaySummary> {
    let mut days: BTreeMap<NaiveDate, Vec<ErrorCodeOccurrence>> = BTreeMap::new();
    let mut skipped = 0usize;

    for entry in entries {
        let Some(day) = entry.raw_date().and_then(day_key) else {
            skipped += 1;
            continue;
        };
        let Some(code) = entry.code().and_then(normalize_code) else {
            skipped += 1;
            continue;
        };

        let description = entry
            .description()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        days.entry(day).or_default().push(ErrorCodeOccurrence { code, description });
    }

    if skipped > 0 {
        log::debug!("Skipped {} of {} error-code entries", skipped, entries.len());
    }

    days.into_iter()
        .map(|(date, codes)| ErrorCodeDaySummary {
            date,
            count: codes.len(),
            codes,
        })
        .collect()
}

/// Total occurrences of one code over the aggregated period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeFrequency {
    pub code: String,
    pub count: usize,
    /// First non-empty description seen for the code
    pub description: Option<String>,
}

/// Most frequent codes, descending by count then ascending by code
pub fn code_frequency(days: &[ErrorCodeDaySummary], limit: usize) -> Vec<CodeFrequency> {
    let mut totals: HashMap<&str, CodeFrequency> = HashMap::new();
    for occurrence in days.iter().flat_map(|d| d.codes.iter()) {
        let entry = totals.entry(occurrence.code.as_str()).or_insert_with(|| CodeFrequency {
            code: occurrence.code.clone(),
            count: 0,
            description: None,
        });
        entry.count += 1;
        if entry.description.is_none() {
            entry.description = occurrence.description.clone();
        }
    }

    let mut frequencies: Vec<CodeFrequency> = totals.into_values().collect();
    frequencies.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.code.cmp(&b.code)));
    frequencies.truncate(limit);
    frequencies
}

/// Bar chart of entries per day
pub fn error_code_chart(days: &[ErrorCodeDaySummary]) -> ChartData {
    ChartData {
        chart_type: "bar".to_string(),
        title: "Error codes per day".to_string(),
        labels: days.iter().map(|d| d.date.format("%Y-%m-%d").to_string()).collect(),
        datasets: vec![ChartDataset {
            label: "Entries".to_string(),
            data: days.iter().map(|d| d.count as f64).collect(),
            background_color: Some("#f87171".to_string()),
            border_color: Some("#dc2626".to_string()),
        }],
    }
}
