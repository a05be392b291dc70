use crate::diagnosis::domain::Answer;
use crate::diagnosis::profile::QuizProfile;

/// Rejected answer vector. The only error the scoring engine raises.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("answers must be a list of length {expected} (received {actual})")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("answer to question {question} must be within {min}..={max} (received {})", describe(.value))]
    OutOfRange {
        question: usize,
        value: Option<i64>,
        min: u8,
        max: u8,
    },
    #[error("answer to question {question} is not a number (received {raw})")]
    NotANumber { question: usize, raw: String },
}

fn describe(value: &Option<i64>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "nothing".to_string(),
    }
}

/// Read submitted values as integer options. Falsy values become missing
/// answers, which the range check then coerces or rejects by policy.
pub(crate) fn resolve_answers(
    answers: &[Option<Answer>],
) -> Result<Vec<Option<i64>>, ValidationError> {
    answers
        .iter()
        .enumerate()
        .map(|(index, answer)| match answer {
            None => Ok(None),
            Some(answer) => match answer.as_integer() {
                Some(value) => Ok(Some(value)),
                None if answer.is_falsy() => Ok(None),
                None => Err(ValidationError::NotANumber {
                    question: index + 1,
                    raw: serde_json::to_string(answer).unwrap_or_else(|_| "?".to_string()),
                }),
            },
        })
        .collect()
}

/// Check length and range, yielding one option index per question.
///
/// Under the lenient policy a missing answer counts as `0` (no effect); under
/// the strict policy it is out of range like any other value below the first
/// option.
pub(crate) fn normalize_answers(
    answers: &[Option<i64>],
    profile: &QuizProfile,
) -> Result<Vec<u8>, ValidationError> {
    if answers.len() != profile.question_count {
        return Err(ValidationError::LengthMismatch {
            expected: profile.question_count,
            actual: answers.len(),
        });
    }

    let min = profile.min_answer();
    let max = profile.max_answer();

    answers
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            let value = match raw {
                Some(value) => *value,
                None if !profile.strict_range => 0,
                None => {
                    return Err(ValidationError::OutOfRange {
                        question: index + 1,
                        value: None,
                        min,
                        max,
                    })
                }
            };

            if value < i64::from(min) || value > i64::from(max) {
                return Err(ValidationError::OutOfRange {
                    question: index + 1,
                    value: Some(value),
                    min,
                    max,
                });
            }

            Ok(value as u8)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(len: usize, value: i64) -> Vec<Option<i64>> {
        vec![Some(value); len]
    }

    #[test]
    fn rejects_wrong_length() {
        let profile = QuizProfile::classic();
        for len in [8, 10] {
            let err = normalize_answers(&filled(len, 1), &profile).expect_err("length rejected");
            assert_eq!(
                err,
                ValidationError::LengthMismatch {
                    expected: 9,
                    actual: len
                }
            );
        }
    }

    #[test]
    fn strict_policy_rejects_zero_and_missing() {
        let profile = QuizProfile::classic();
        let mut answers = filled(9, 2);
        answers[4] = Some(0);
        let err = normalize_answers(&answers, &profile).expect_err("zero rejected");
        assert!(matches!(
            err,
            ValidationError::OutOfRange {
                question: 5,
                value: Some(0),
                ..
            }
        ));

        answers[4] = None;
        let err = normalize_answers(&answers, &profile).expect_err("missing rejected");
        assert!(err.to_string().contains("received nothing"));
    }

    #[test]
    fn lenient_policy_coerces_missing_to_zero() {
        let profile = QuizProfile::extended();
        let mut answers = filled(12, 3);
        answers[1] = None;
        answers[8] = Some(0);
        let normalized = normalize_answers(&answers, &profile).expect("accepted");
        assert_eq!(normalized[1], 0);
        assert_eq!(normalized[8], 0);
        assert_eq!(normalized[0], 3);
    }

    #[test]
    fn falsy_answers_resolve_to_missing() {
        let submitted = vec![
            Some(Answer::Flag(false)),
            Some(Answer::Text(String::new())),
            Some(Answer::Decimal(0.0)),
            Some(Answer::Text(" 2 ".to_string())),
            None,
        ];
        let resolved = resolve_answers(&submitted).expect("resolves");
        assert_eq!(resolved, vec![Some(0), None, Some(0), Some(2), None]);

        let err = resolve_answers(&[Some(Answer::Number(1)), Some(Answer::Text("two".to_string()))])
            .expect_err("text rejected");
        assert_eq!(
            err,
            ValidationError::NotANumber {
                question: 2,
                raw: "\"two\"".to_string()
            }
        );
    }

    #[test]
    fn both_policies_reject_values_above_last_option() {
        for profile in [QuizProfile::extended(), QuizProfile::classic()] {
            let mut answers = filled(profile.question_count, 1);
            answers[0] = Some(5);
            let err = normalize_answers(&answers, &profile).expect_err("five rejected");
            assert!(err.to_string().contains("question 1"));
        }

        let mut answers = filled(12, 1);
        answers[3] = Some(-1);
        assert!(normalize_answers(&answers, &QuizProfile::extended()).is_err());
    }
}
