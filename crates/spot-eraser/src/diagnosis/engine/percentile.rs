use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use super::AgeEstimate;
use crate::diagnosis::domain::BirthYear;
use crate::diagnosis::profile::PercentileTable;

/// Percentage reported when a label carries no number.
const DEFAULT_PERCENT: i32 = 50;

fn percent_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\d+)%").expect("percent pattern compiles"))
}

pub(crate) fn estimate(
    total: u32,
    table: &PercentileTable,
    birth_year: Option<&BirthYear>,
    today: NaiveDate,
) -> AgeEstimate {
    let band = table.band_for(total);
    let skin_age = birth_year
        .and_then(BirthYear::year)
        .and_then(|year| skin_age(year, today, band.adjustment));

    AgeEstimate {
        percentile: percentile_from_label(&band.label),
        percentile_label: band.label.clone(),
        skin_age,
    }
}

/// Real age in whole calendar years, scaled by the band ratio and rounded half
/// to even. `None` when the year is too far from today to yield an age.
pub(crate) fn skin_age(birth_year: i32, today: NaiveDate, adjustment: f64) -> Option<u32> {
    let real_age = today.year().checked_sub(birth_year)?.max(0);
    let scaled = (f64::from(real_age) * (1.0 + adjustment)).round_ties_even();
    if scaled < 0.0 || scaled > f64::from(u32::MAX) {
        return None;
    }
    Some(scaled as u32)
}

/// "top X%" keeps X; any other label ("bottom X%") reports `100 - X`.
pub(crate) fn percentile_from_label(label: &str) -> i32 {
    let percent = percent_pattern()
        .captures(label)
        .and_then(|captures| captures.get(1))
        .and_then(|digits| digits.as_str().parse::<i32>().ok())
        .unwrap_or(DEFAULT_PERCENT);

    if label.to_ascii_lowercase().contains("top") {
        percent
    } else {
        100 - percent
    }
}
