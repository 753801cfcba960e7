//! Display helpers for subject data

use serde::Serialize;

use crate::types::{IndexKey, SubjectIndexes, SubjectStats};

/// Shown in place of a missing or zero value.
pub const PLACEHOLDER: &str = "N/A";

/// Shown when a subject has no recorded inventor.
pub const UNKNOWN_INVENTOR: &str = "Unknown";

/// `None` and `0` render as the placeholder, anything else with thousands separators.
pub fn format_stat_value(value: Option<u64>) -> String {
    match value {
        None | Some(0) => PLACEHOLDER.to_string(),
        Some(v) => group_thousands(v),
    }
}

/// `1234567` -> `1,234,567`
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    grouped
}

/// One decimal. Exact ties round away from zero (`0.25` -> `0.3`).
pub fn format_index_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}", round_ties_away(v)),
        None => PLACEHOLDER.to_string(),
    }
}

/// `{:.1}` rounds exact ties to even. Only multiples of 0.25 that are not
/// multiples of 0.5 are exact ties at one decimal, so those are rounded here.
fn round_ties_away(v: f64) -> f64 {
    let is_tie = (v * 4.0).fract() == 0.0 && (v * 2.0).fract() != 0.0;
    if is_tie {
        (v * 10.0).round() / 10.0
    } else {
        v
    }
}

/// Read an index score from the first index record.
pub fn index_value(indexes: &[SubjectIndexes], key: IndexKey) -> Option<f64> {
    indexes.first().and_then(|idx| idx.get(key))
}

pub fn inventor_display(inventor: Option<&str>) -> &str {
    match inventor {
        Some(name) if !name.trim().is_empty() => name,
        _ => UNKNOWN_INVENTOR,
    }
}

pub fn should_display_category(category: Option<&str>) -> bool {
    category.is_some_and(|c| !c.trim().is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedStat {
    pub raw: u64,
    pub formatted: String,
}

impl FormattedStat {
    fn new(value: Option<u64>) -> Self {
        Self {
            raw: value.unwrap_or(0),
            formatted: format_stat_value(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedStats {
    pub organizations: FormattedStat,
    pub press: FormattedStat,
    pub patents: FormattedStat,
    pub papers: FormattedStat,
    pub books: FormattedStat,
}

/// Display text only, for compact listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimpleFormattedStats {
    pub organizations: String,
    pub press: String,
    pub patents: String,
    pub papers: String,
    pub books: String,
}

pub fn formatted_stats(stats: &SubjectStats) -> FormattedStats {
    FormattedStats {
        organizations: FormattedStat::new(stats.organizations),
        press: FormattedStat::new(stats.press),
        patents: FormattedStat::new(stats.patents),
        papers: FormattedStat::new(stats.papers),
        books: FormattedStat::new(stats.books),
    }
}

pub fn simple_formatted_stats(stats: &SubjectStats) -> SimpleFormattedStats {
    SimpleFormattedStats {
        organizations: format_stat_value(stats.organizations),
        press: format_stat_value(stats.press),
        patents: format_stat_value(stats.patents),
        papers: format_stat_value(stats.papers),
        books: format_stat_value(stats.books),
    }
}
