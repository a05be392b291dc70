//! Static questionnaire configuration: weight tables, thresholds, result codes
//! and the percentile/age table. Profiles are built once and shared through
//! `Arc`; nothing here is mutated after startup.

mod tables;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use super::domain::{Category, ExternalFactor, ResultCode, SkinType};

/// Supported questionnaire generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    /// 12 questions, lenient answer range, percentile and skin-age estimate.
    Extended,
    /// 9 questions, strict answer range, no percentile estimate.
    Classic,
}

impl ProfileKind {
    pub fn label(self) -> &'static str {
        match self {
            ProfileKind::Extended => "extended",
            ProfileKind::Classic => "classic",
        }
    }
}

impl FromStr for ProfileKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "extended" | "12" => Ok(ProfileKind::Extended),
            "classic" | "9" => Ok(ProfileKind::Classic),
            other => Err(format!("unknown quiz profile '{other}' (expected extended or classic)")),
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Increments contributed by one (question, option) cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delta {
    pub skin: BTreeMap<SkinType, u32>,
    pub factor: BTreeMap<ExternalFactor, u32>,
    /// Added straight to the running total, outside any category.
    pub total: u32,
}

impl Delta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skin(mut self, category: SkinType, points: u32) -> Self {
        *self.skin.entry(category).or_insert(0) += points;
        self
    }

    pub fn factor(mut self, category: ExternalFactor, points: u32) -> Self {
        *self.factor.entry(category).or_insert(0) += points;
        self
    }

    pub fn total(mut self, points: u32) -> Self {
        self.total += points;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    pub question: usize,
    pub option: u8,
}

/// Sparse (question, option) -> delta table. Missing cells contribute nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeightTable {
    cells: BTreeMap<CellKey, Delta>,
}

impl WeightTable {
    pub fn builder() -> WeightTableBuilder {
        WeightTableBuilder::default()
    }

    /// `question` is 1-based.
    pub fn cell(&self, question: usize, option: u8) -> Option<&Delta> {
        self.cells.get(&CellKey { question, option })
    }

    pub fn cells(&self) -> impl Iterator<Item = (&CellKey, &Delta)> {
        self.cells.iter()
    }
}

#[derive(Debug, Default)]
pub struct WeightTableBuilder {
    cells: BTreeMap<CellKey, Delta>,
}

impl WeightTableBuilder {
    pub fn cell(mut self, question: usize, option: u8, delta: Delta) -> Self {
        self.cells.insert(CellKey { question, option }, delta);
        self
    }

    pub fn build(self) -> WeightTable {
        WeightTable { cells: self.cells }
    }
}

/// Minimum score per category. Categories without an entry are never eligible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thresholds<C: Category> {
    minimums: BTreeMap<C, u32>,
}

impl<C: Category> Thresholds<C> {
    pub fn new(entries: impl IntoIterator<Item = (C, u32)>) -> Self {
        Self {
            minimums: entries.into_iter().collect(),
        }
    }

    pub fn minimum(&self, category: C) -> Option<u32> {
        self.minimums.get(&category).copied()
    }
}

/// (skin type, external factor) -> result code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultMap {
    codes: BTreeMap<(SkinType, ExternalFactor), ResultCode>,
}

impl ResultMap {
    pub fn new(entries: impl IntoIterator<Item = ((SkinType, ExternalFactor), ResultCode)>) -> Self {
        Self {
            codes: entries.into_iter().collect(),
        }
    }

    pub fn lookup(&self, skin: SkinType, factor: ExternalFactor) -> Option<ResultCode> {
        self.codes.get(&(skin, factor)).copied()
    }

    pub fn codes(&self) -> impl Iterator<Item = (&(SkinType, ExternalFactor), &ResultCode)> {
        self.codes.iter()
    }
}

/// Ranking label plus the ratio applied to the real age.
#[derive(Debug, Clone, PartialEq)]
pub struct PercentileBand {
    pub label: String,
    pub adjustment: f64,
}

impl PercentileBand {
    pub fn new(label: impl Into<String>, adjustment: f64) -> Self {
        Self {
            label: label.into(),
            adjustment,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PercentileBucket {
    /// Inclusive total-score range.
    pub range: RangeInclusive<u32>,
    pub band: PercentileBand,
}

/// Ordered buckets over the total score; first match wins, else `fallback`.
#[derive(Debug, Clone, PartialEq)]
pub struct PercentileTable {
    buckets: Vec<PercentileBucket>,
    fallback: PercentileBand,
}

impl PercentileTable {
    pub fn new(buckets: Vec<PercentileBucket>, fallback: PercentileBand) -> Self {
        Self { buckets, fallback }
    }

    pub fn band_for(&self, total: u32) -> &PercentileBand {
        self.buckets
            .iter()
            .find(|bucket| bucket.range.contains(&total))
            .map(|bucket| &bucket.band)
            .unwrap_or(&self.fallback)
    }

    pub fn buckets(&self) -> &[PercentileBucket] {
        &self.buckets
    }

    pub fn fallback(&self) -> &PercentileBand {
        &self.fallback
    }
}

/// Complete scoring configuration for one questionnaire generation.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizProfile {
    pub kind: ProfileKind,
    pub question_count: usize,
    /// Valid option indices; `0` is additionally accepted when `strict_range` is off.
    pub options: RangeInclusive<u8>,
    pub strict_range: bool,
    pub weights: WeightTable,
    pub skin_thresholds: Thresholds<SkinType>,
    pub factor_thresholds: Thresholds<ExternalFactor>,
    pub result_map: ResultMap,
    /// Present only for profiles that estimate percentile and skin age.
    pub percentiles: Option<PercentileTable>,
}

static EXTENDED: OnceLock<Arc<QuizProfile>> = OnceLock::new();
static CLASSIC: OnceLock<Arc<QuizProfile>> = OnceLock::new();

impl QuizProfile {
    pub fn extended() -> Self {
        tables::extended()
    }

    pub fn classic() -> Self {
        tables::classic()
    }

    /// Process-wide instance of a built-in profile.
    pub fn shared(kind: ProfileKind) -> Arc<QuizProfile> {
        let cell = match kind {
            ProfileKind::Extended => &EXTENDED,
            ProfileKind::Classic => &CLASSIC,
        };
        cell.get_or_init(|| {
            Arc::new(match kind {
                ProfileKind::Extended => tables::extended(),
                ProfileKind::Classic => tables::classic(),
            })
        })
        .clone()
    }

    /// Shared profile, or a private copy when the range policy is overridden.
    pub fn resolve(kind: ProfileKind, strict_range: Option<bool>) -> Arc<QuizProfile> {
        let shared = Self::shared(kind);
        match strict_range {
            Some(strict) if strict != shared.strict_range => {
                Arc::new((*shared).clone().with_strict_range(strict))
            }
            _ => shared,
        }
    }

    pub fn with_strict_range(mut self, strict_range: bool) -> Self {
        self.strict_range = strict_range;
        self
    }

    /// Lowest accepted answer value under the current range policy.
    pub fn min_answer(&self) -> u8 {
        if self.strict_range {
            *self.options.start()
        } else {
            0
        }
    }

    pub fn max_answer(&self) -> u8 {
        *self.options.end()
    }

    /// Check the static tables, reporting every problem at once.
    pub fn validate(&self) -> Result<(), ProfileError> {
        let mut problems = Vec::new();

        if !matches!(self.question_count, 9 | 12) {
            problems.push(format!(
                "question_count: must be 9 or 12 (found {})",
                self.question_count
            ));
        }

        if self.options.is_empty() || *self.options.start() == 0 {
            problems.push(format!(
                "options: must be a non-empty range starting at 1 or above (found {:?})",
                self.options
            ));
        }

        for (key, _) in self.weights.cells() {
            if key.question == 0 || key.question > self.question_count {
                problems.push(format!(
                    "weights[q{}][{}]: question outside 1..={}",
                    key.question, key.option, self.question_count
                ));
            }
            if !self.options.contains(&key.option) {
                problems.push(format!(
                    "weights[q{}][{}]: option outside {:?}",
                    key.question, key.option, self.options
                ));
            }
        }

        let mut seen_codes = BTreeSet::new();
        for ((skin, factor), code) in self.result_map.codes() {
            if !seen_codes.insert(*code) {
                problems.push(format!(
                    "result_map[{}, {}]: duplicate code {}",
                    skin.key(),
                    factor.key(),
                    code
                ));
            }
        }

        if let Some(table) = &self.percentiles {
            for (i, bucket) in table.buckets().iter().enumerate() {
                if bucket.range.is_empty() {
                    problems.push(format!(
                        "percentiles[{}]: empty range {:?}",
                        i, bucket.range
                    ));
                }
                for (j, other) in table.buckets().iter().enumerate().skip(i + 1) {
                    let overlaps = bucket.range.start() <= other.range.end()
                        && other.range.start() <= bucket.range.end();
                    if overlaps {
                        problems.push(format!(
                            "percentiles[{}] {:?} overlaps percentiles[{}] {:?}",
                            i, bucket.range, j, other.range
                        ));
                    }
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ProfileError {
                kind: self.kind,
                problems,
            })
        }
    }
}

/// Static configuration rejected at startup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} profile is invalid: {}", .problems.join("; "))]
pub struct ProfileError {
    pub kind: ProfileKind,
    pub problems: Vec<String>,
}
