use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A scoring axis category. `CANONICAL` fixes both the score-map layout and
/// the tie-break order used during selection.
pub trait Category: Copy + Ord + fmt::Debug + Send + Sync + 'static {
    const CANONICAL: &'static [Self];

    fn key(self) -> &'static str;
}

/// Class A: intrinsic skin type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkinType {
    Sensitivity,
    Oily,
    Dry,
    Combination,
}

impl Category for SkinType {
    const CANONICAL: &'static [Self] = &[
        SkinType::Sensitivity,
        SkinType::Oily,
        SkinType::Dry,
        SkinType::Combination,
    ];

    fn key(self) -> &'static str {
        match self {
            SkinType::Sensitivity => "sensitivity",
            SkinType::Oily => "oily",
            SkinType::Dry => "dry",
            SkinType::Combination => "combination",
        }
    }
}

/// Class B: external contributing factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExternalFactor {
    Stress,
    Environment,
}

impl Category for ExternalFactor {
    const CANONICAL: &'static [Self] = &[ExternalFactor::Stress, ExternalFactor::Environment];

    fn key(self) -> &'static str {
        match self {
            ExternalFactor::Stress => "stress",
            ExternalFactor::Environment => "environment",
        }
    }
}

/// Identifier of a (skin type, external factor) combination; selects the result artwork.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultCode(pub u8);

impl ResultCode {
    /// Artwork shown when no combination was selected.
    pub const FALLBACK: ResultCode = ResultCode(1);
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display language requested by the client. Only carried through; the
/// engine itself is language agnostic. The default is the share-page language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Lang {
    #[default]
    Kor,
    Eng,
}

impl Lang {
    /// Language stored on diagnosis and click records the client did not tag.
    pub const RECORD_DEFAULT: Lang = Lang::Eng;

    /// Lenient parse used for query strings: anything but `ENG` is Korean.
    pub fn from_code(code: &str) -> Self {
        Self::parse(code).unwrap_or(Lang::Kor)
    }

    /// Exact tag match, ignoring case and surrounding whitespace.
    pub fn parse(code: &str) -> Option<Self> {
        let code = code.trim();
        if code.eq_ignore_ascii_case("ENG") {
            Some(Lang::Eng)
        } else if code.eq_ignore_ascii_case("KOR") {
            Some(Lang::Kor)
        } else {
            None
        }
    }

    /// Record language for an optional client tag.
    fn for_record(code: Option<&str>) -> Self {
        code.and_then(Self::parse).unwrap_or(Self::RECORD_DEFAULT)
    }

    pub fn code(self) -> &'static str {
        match self {
            Lang::Kor => "KOR",
            Lang::Eng => "ENG",
        }
    }
}

/// Birth year as submitted by the client. Anything that does not resolve to
/// an integer year simply disables the skin-age estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BirthYear {
    Year(i64),
    Decimal(f64),
    Text(String),
    Other(serde_json::Value),
}

impl BirthYear {
    pub fn year(&self) -> Option<i32> {
        match self {
            // A literal zero is treated as "not provided".
            BirthYear::Year(0) => None,
            BirthYear::Year(year) => i32::try_from(*year).ok(),
            BirthYear::Decimal(value) if value.is_finite() && *value != 0.0 => {
                let truncated = value.trunc();
                if truncated >= i32::MIN as f64 && truncated <= i32::MAX as f64 {
                    Some(truncated as i32)
                } else {
                    None
                }
            }
            BirthYear::Decimal(_) => None,
            BirthYear::Text(text) => text.trim().parse::<i32>().ok(),
            BirthYear::Other(_) => None,
        }
    }
}

impl From<i32> for BirthYear {
    fn from(value: i32) -> Self {
        BirthYear::Year(value as i64)
    }
}

/// One submitted answer. Clients normally send an integer option, but any JSON
/// value is accepted so that loosely typed forms can be scored: falsy values
/// (`false`, `0.0`, `""`, empty containers) count as "no answer".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Number(i64),
    Decimal(f64),
    Flag(bool),
    Text(String),
    Other(serde_json::Value),
}

impl Answer {
    /// Integer reading of the value, if it has one. Decimals truncate toward
    /// zero and `true` reads as `1`.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Answer::Number(value) => Some(*value),
            Answer::Decimal(value) if value.is_finite() => Some(value.trunc() as i64),
            Answer::Decimal(_) => None,
            Answer::Flag(flag) => Some(i64::from(*flag)),
            Answer::Text(text) => text.trim().parse::<i64>().ok(),
            Answer::Other(_) => None,
        }
    }

    pub fn is_falsy(&self) -> bool {
        match self {
            Answer::Number(value) => *value == 0,
            Answer::Decimal(value) => *value == 0.0,
            Answer::Flag(flag) => !flag,
            Answer::Text(text) => text.is_empty(),
            Answer::Other(serde_json::Value::Array(items)) => items.is_empty(),
            Answer::Other(serde_json::Value::Object(fields)) => fields.is_empty(),
            Answer::Other(serde_json::Value::Null) => true,
            Answer::Other(_) => false,
        }
    }
}

impl From<i64> for Answer {
    fn from(value: i64) -> Self {
        Answer::Number(value)
    }
}

/// Questionnaire submission as received from the client.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DiagnosisSubmission {
    pub answers: Vec<Option<Answer>>,
    #[serde(default)]
    pub birth_year: Option<BirthYear>,
    /// Raw language tag; missing or unknown values are stored as English.
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub client_started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub client_submitted_at: Option<DateTime<Utc>>,
    /// Filled from request headers, never from the body.
    #[serde(skip)]
    pub user_agent: Option<String>,
}

impl DiagnosisSubmission {
    pub fn new(answers: Vec<Option<i64>>) -> Self {
        Self {
            answers: answers
                .into_iter()
                .map(|answer| answer.map(Answer::from))
                .collect(),
            ..Self::default()
        }
    }

    pub fn lang(&self) -> Lang {
        Lang::for_record(self.lang.as_deref())
    }
}

/// Result-page button click as received from the client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ClickSubmission {
    pub button_key: String,
    #[serde(default)]
    pub diagnosis_id: Option<String>,
    #[serde(default)]
    pub lang: Option<String>,
}

impl ClickSubmission {
    pub fn lang(&self) -> Lang {
        Lang::for_record(self.lang.as_deref())
    }
}

/// Identifier wrapper for stored diagnoses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DiagnosisId(pub String);

/// Identifier wrapper for stored click events.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClickId(pub String);
