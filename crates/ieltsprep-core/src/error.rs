//! Error types shared across ieltsprep.
//!
//! `ServiceError` covers every failure at the external boundaries (identity,
//! document store, essay grading). It lives in `ieltsprep-core` so the
//! orchestrator and gateway can classify failures without string matching.
//! The remaining enums describe rejected actions in the local flows; a
//! rejected action never changes state.

use thiserror::Error;

use crate::model::ExamStep;

/// Failures talking to an external service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A required credential (API key, id token) is not configured.
    #[error("missing credential: {0}")]
    MissingCredential(String),

    /// The service rejected our credentials.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested document does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The service answered with an error status.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The request did not complete in time.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// Transport-level failure.
    #[error("network error: {0}")]
    Network(String),

    /// The reply could not be understood.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl ServiceError {
    /// Returns `true` if retrying the same request cannot succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            ServiceError::MissingCredential(_)
                | ServiceError::AuthenticationFailed(_)
                | ServiceError::NotFound(_)
        )
    }
}

/// Actions rejected by the exam state machine.
#[derive(Debug, Error, PartialEq)]
pub enum ExamError {
    #[error("cannot {action} during the {step} step")]
    InvalidTransition { step: ExamStep, action: &'static str },

    #[error("question {0} is not part of this exam")]
    UnknownQuestion(u32),

    #[error("'{answer}' is not an option for question {question}")]
    InvalidOption { question: u32, answer: String },

    #[error("please write at least {min} words for the examiner to evaluate (found {words})")]
    EssayTooShort { words: usize, min: usize },

    #[error("the examiner is already evaluating this essay")]
    EvaluationInProgress,
}

/// Actions rejected by the onboarding questionnaire.
#[derive(Debug, Error, PartialEq)]
pub enum OnboardingError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("target score {0} must be between 4.0 and 9.0 in steps of 0.5")]
    InvalidTargetScore(f64),

    #[error("this step expects {expected}")]
    WrongStep { expected: &'static str },

    #[error("questionnaire already completed")]
    Completed,
}

/// Actions rejected by a practice session.
#[derive(Debug, Error, PartialEq)]
pub enum PracticeError {
    #[error("question {0} is not part of this lesson")]
    UnknownQuestion(u32),

    #[error("option {option} is out of range for question {question}")]
    UnknownOption { question: u32, option: usize },

    #[error("answer all questions before finishing ({answered}/{total})")]
    Incomplete { answered: usize, total: usize },

    #[error("the lesson is already finished")]
    Finished,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permanent_errors() {
        assert!(ServiceError::MissingCredential("gemini".into()).is_permanent());
        assert!(ServiceError::AuthenticationFailed("bad".into()).is_permanent());
        assert!(!ServiceError::Network("reset".into()).is_permanent());
        assert!(!ServiceError::Timeout(30).is_permanent());
    }

    #[test]
    fn exam_error_messages() {
        let err = ExamError::InvalidTransition {
            step: ExamStep::Intro,
            action: "finish the section",
        };
        assert_eq!(err.to_string(), "cannot finish the section during the intro step");

        let err = ExamError::EssayTooShort { words: 9, min: 10 };
        assert!(err.to_string().contains("at least 10 words"));
    }
}
