//! Band scoring.
//!
//! Reading is scored by counting exact matches against the answer key and
//! mapping the count through a fixed threshold table. Writing scores come
//! from the external examiner. The overall band is the mean of the two,
//! rounded half-up to one decimal.

use std::collections::BTreeMap;

use crate::error::ExamError;
use crate::model::ExamContent;

/// Number of questions the reading threshold table is calibrated for.
pub const READING_QUESTION_COUNT: usize = 13;

/// Essays shorter than this are not sent to the examiner.
pub const MIN_ESSAY_WORDS: usize = 10;

/// Normalise an answer for comparison.
pub fn normalize_answer(answer: &str) -> String {
    answer.trim().to_lowercase()
}

/// Whether `given` matches `expected` (case-insensitive, trimmed).
pub fn answer_matches(given: &str, expected: &str) -> bool {
    normalize_answer(given) == normalize_answer(expected)
}

/// Count questions answered correctly. Unanswered questions count as wrong.
pub fn correct_count(content: &ExamContent, answers: &BTreeMap<u32, String>) -> usize {
    content
        .questions
        .iter()
        .filter(|q| {
            answers
                .get(&q.id)
                .is_some_and(|given| answer_matches(given, &q.correct_answer))
        })
        .count()
}

/// Map a reading correct-count to a band.
///
/// The jump from 4.0 straight to 0.0 below three correct answers is part of
/// the published table and is kept as is.
pub fn reading_band(correct: usize) -> f64 {
    match correct {
        c if c >= READING_QUESTION_COUNT => 9.0,
        c if c >= 11 => 8.0,
        c if c >= 9 => 7.0,
        c if c >= 7 => 6.0,
        c if c >= 5 => 5.0,
        c if c >= 3 => 4.0,
        _ => 0.0,
    }
}

/// Round half-up to one decimal place.
pub fn round_to_tenth(value: f64) -> f64 {
    // The epsilon keeps values like 6.65 (stored as 6.6499999...) rounding up.
    ((value * 10.0) + 0.5 + 1e-9).floor() / 10.0
}

/// Overall band from the reading band and an optional writing band.
pub fn overall_band(reading: f64, writing: Option<f64>) -> f64 {
    match writing {
        Some(writing) => round_to_tenth((reading + writing) / 2.0),
        None => reading,
    }
}

/// Number of whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Local gate before an essay may be submitted. Returns the word count.
pub fn check_essay_length(text: &str) -> Result<usize, ExamError> {
    let words = word_count(text);
    if words < MIN_ESSAY_WORDS {
        return Err(ExamError::EssayTooShort {
            words,
            min: MIN_ESSAY_WORDS,
        });
    }
    Ok(words)
}

/// Format remaining seconds as `m:ss`.
pub fn format_time(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
