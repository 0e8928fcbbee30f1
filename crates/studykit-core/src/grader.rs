//! Answer grading.
//!
//! `grade` is a pure function over items and answers. It never mutates its
//! inputs and persisting the result is left to the caller.

use serde::{Deserialize, Serialize};

use crate::error::GradeError;
use crate::model::{GradedItem, UserAnswer};

/// The outcome of grading one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradingResult {
    pub correct_count: usize,
    pub total_count: usize,
    /// Rounded half-up from `correct_count / total_count * 100`.
    pub percentage: u8,
    /// Per-item correctness, in item order.
    pub verdicts: Vec<bool>,
}

/// Grade `answers` against `items`, position by position.
pub fn grade(items: &[GradedItem], answers: &[UserAnswer]) -> Result<GradingResult, GradeError> {
    if items.is_empty() {
        return Err(GradeError::EmptyItemSet);
    }
    if items.len() != answers.len() {
        return Err(GradeError::LengthMismatch {
            items: items.len(),
            answers: answers.len(),
        });
    }

    let verdicts: Vec<bool> = items
        .iter()
        .zip(answers)
        .map(|(item, answer)| is_correct(item, answer))
        .collect();
    let correct_count = verdicts.iter().filter(|v| **v).count();
    let total_count = items.len();

    Ok(GradingResult {
        correct_count,
        total_count,
        percentage: percentage(correct_count, total_count),
        verdicts,
    })
}

/// Whether a single answer is correct. Unanswered and mismatched answer
/// variants are incorrect.
pub fn is_correct(item: &GradedItem, answer: &UserAnswer) -> bool {
    match (item, answer) {
        (GradedItem::MultipleChoice { correct_option, .. }, UserAnswer::Choice(chosen)) => {
            chosen == correct_option
        }
        (GradedItem::TrueFalse { correct_value, .. }, UserAnswer::Boolean(value)) => {
            value == correct_value
        }
        (
            GradedItem::ShortAnswer {
                correct_text,
                acceptable_alternates,
                ..
            },
            UserAnswer::Text(text),
        ) => {
            let submitted = normalize(text);
            submitted == normalize(correct_text)
                || acceptable_alternates
                    .iter()
                    .any(|alt| normalize(alt) == submitted)
        }
        _ => false,
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// `round(part / total * 100)` with halves rounded up. `total` must be > 0.
pub fn percentage(part: usize, total: usize) -> u8 {
    debug_assert!(total > 0);
    let rounded = (200 * part + total) / (2 * total);
    rounded.min(100) as u8
}

/// Encouragement shown next to a percentage score.
pub fn score_message(percentage: u8) -> &'static str {
    match percentage {
        100..=u8::MAX => "Perfect score! Congratulations!",
        80..=99 => "Great job! You did excellently!",
        60..=79 => "Good effort! You're on the right track.",
        40..=59 => "Not bad, but there's room for improvement.",
        _ => "Keep practicing, you'll get better!",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OptionLetter;

    fn mc(correct: OptionLetter) -> GradedItem {
        GradedItem::MultipleChoice {
            question: "Pick one".into(),
            options: ["w".into(), "x".into(), "y".into(), "z".into()],
            correct_option: correct,
        }
    }

    fn tf(correct: bool) -> GradedItem {
        GradedItem::TrueFalse {
            question: "True?".into(),
            correct_value: correct,
        }
    }

    fn short(correct: &str, alternates: &[&str]) -> GradedItem {
        GradedItem::ShortAnswer {
            question: "Name it".into(),
            correct_text: correct.into(),
            acceptable_alternates: alternates.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn mixed_items() -> Vec<GradedItem> {
        vec![
            mc(OptionLetter::B),
            tf(false),
            short("Paris", &["France's capital"]),
            mc(OptionLetter::D),
        ]
    }

    #[test]
    fn all_correct_is_100() {
        let answers = vec![
            UserAnswer::Choice(OptionLetter::B),
            UserAnswer::Boolean(false),
            UserAnswer::Text("Paris".into()),
            UserAnswer::Choice(OptionLetter::D),
        ];
        let result = grade(&mixed_items(), &answers).unwrap();
        assert_eq!(result.correct_count, 4);
        assert_eq!(result.percentage, 100);
        assert!(result.verdicts.iter().all(|v| *v));
    }

    #[test]
    fn all_unanswered_is_zero() {
        let answers = vec![UserAnswer::Unanswered; 4];
        let result = grade(&mixed_items(), &answers).unwrap();
        assert_eq!(result.correct_count, 0);
        assert_eq!(result.total_count, 4);
        assert_eq!(result.percentage, 0);
    }

    #[test]
    fn short_answer_ignores_case_and_whitespace() {
        let items = vec![short("Paris", &["France's capital"])];
        let result = grade(&items, &[UserAnswer::Text("  paris ".into())]).unwrap();
        assert_eq!(result.correct_count, 1);

        let result = grade(&items, &[UserAnswer::Text("FRANCE'S CAPITAL\n".into())]).unwrap();
        assert_eq!(result.correct_count, 1);

        let result = grade(&items, &[UserAnswer::Text("Lyon".into())]).unwrap();
        assert_eq!(result.correct_count, 0);
    }

    #[test]
    fn multiple_choice_three_of_four() {
        let items = vec![
            mc(OptionLetter::A),
            mc(OptionLetter::B),
            mc(OptionLetter::C),
            mc(OptionLetter::D),
        ];
        let answers = vec![
            UserAnswer::Choice(OptionLetter::A),
            UserAnswer::Choice(OptionLetter::B),
            UserAnswer::Choice(OptionLetter::C),
            UserAnswer::Choice(OptionLetter::A),
        ];
        let result = grade(&items, &answers).unwrap();
        assert_eq!(result.correct_count, 3);
        assert_eq!(result.total_count, 4);
        assert_eq!(result.percentage, 75);
        assert_eq!(result.verdicts, vec![true, true, true, false]);
    }

    #[test]
    fn mismatched_answer_variant_is_incorrect() {
        let result = grade(&[tf(true)], &[UserAnswer::Text("true".into())]).unwrap();
        assert_eq!(result.correct_count, 0);
    }

    #[test]
    fn grading_is_idempotent() {
        let answers = vec![
            UserAnswer::Choice(OptionLetter::C),
            UserAnswer::Boolean(false),
            UserAnswer::Unanswered,
            UserAnswer::Choice(OptionLetter::D),
        ];
        let items = mixed_items();
        let first = grade(&items, &answers).unwrap();
        let second = grade(&items, &answers).unwrap();
        assert_eq!(first, second);
        assert_eq!(items, mixed_items());
    }

    #[test]
    fn length_mismatch_and_empty_set_fail() {
        assert_eq!(
            grade(&mixed_items(), &[UserAnswer::Unanswered]),
            Err(GradeError::LengthMismatch {
                items: 4,
                answers: 1
            })
        );
        assert_eq!(grade(&[], &[]), Err(GradeError::EmptyItemSet));
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(1, 8), 13); // 12.5
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(3, 3), 100);
        assert_eq!(percentage(0, 7), 0);
    }

    #[test]
    fn score_message_thresholds() {
        assert_eq!(score_message(100), "Perfect score! Congratulations!");
        assert_eq!(score_message(80), "Great job! You did excellently!");
        assert_eq!(score_message(75), "Good effort! You're on the right track.");
        assert_eq!(score_message(40), "Not bad, but there's room for improvement.");
        assert_eq!(score_message(25), "Keep practicing, you'll get better!");
    }
}
