//! Mock exam session state machine.
//!
//! An `ExamSession` walks `intro → reading → listening → writing → speaking →
//! result`. Every transition goes through a method on the session; a method
//! either applies its transition completely or returns an `ExamError` and
//! leaves the session untouched. The countdown is reset exactly when a step
//! is entered and only decreases while a timed step is active.
//!
//! Essay evaluation is split in two so that the network call can run outside
//! the session: `begin_evaluation` hands out an `EvaluationTicket`, and
//! `complete_evaluation` only accepts the ticket of the evaluation currently
//! in flight. Anything else is reported as stale and ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ExamError, ServiceError};
use crate::grading::{EssayAssessment, EssayRequest};
use crate::model::{ExamContent, ExamStep, QuestionKind, Section};
use crate::scoring::{check_essay_length, correct_count, overall_band, reading_band};

/// Section durations in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionTimings {
    pub reading_secs: u32,
    pub listening_secs: u32,
    pub writing_secs: u32,
    pub speaking_secs: u32,
}

impl Default for SectionTimings {
    fn default() -> Self {
        Self {
            reading_secs: 10 * 60,
            listening_secs: 10 * 60,
            writing_secs: 15 * 60,
            speaking_secs: 5 * 60,
        }
    }
}

impl SectionTimings {
    pub fn for_section(&self, section: Section) -> u32 {
        match section {
            Section::Reading => self.reading_secs,
            Section::Listening => self.listening_secs,
            Section::Writing => self.writing_secs,
            Section::Speaking => self.speaking_secs,
        }
    }
}

/// What happens when a section's countdown reaches zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutPolicy {
    /// The section stays open with the clock at 0:00.
    #[default]
    Continue,
    /// The section is finished as if the user had pressed "finish". In the
    /// writing section this means submitting the essay, which still has to
    /// pass the minimum word count.
    AutoAdvance,
}

/// Session configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamConfig {
    #[serde(default)]
    pub timings: SectionTimings,
    #[serde(default)]
    pub timeout_policy: TimeoutPolicy,
}

/// Proof that an evaluation was started; required to complete it.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationTicket {
    session: Uuid,
    generation: u64,
    pub request: EssayRequest,
}

/// Result of handing an examiner reply back to the session.
#[derive(Debug)]
pub enum EvaluationOutcome {
    /// Score recorded; the session moved on to speaking.
    Scored(EssayAssessment),
    /// The examiner failed; the session stays in writing for a retry.
    Failed(ServiceError),
    /// The reply belongs to an evaluation that is no longer current.
    Stale,
}

/// Result of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing is counting down (intro, result, or evaluation in flight).
    Paused,
    /// Seconds left after this tick.
    Running(u32),
    /// The clock just reached zero in this section. Reported once.
    Expired(Section),
    /// The clock reached zero and the session advanced on its own.
    Advanced { from: ExamStep, to: ExamStep },
}

/// Final score summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResult {
    pub reading_correct: usize,
    pub reading_total: usize,
    pub reading_band: f64,
    pub writing_band: Option<f64>,
    pub writing_feedback: Option<String>,
    pub overall_band: f64,
}

/// In-memory state of one mock exam attempt.
#[derive(Debug, Clone)]
pub struct ExamSession {
    id: Uuid,
    content: ExamContent,
    config: ExamConfig,
    step: ExamStep,
    time_left: u32,
    expiry_reported: bool,
    reading_answers: BTreeMap<u32, String>,
    writing_text: String,
    writing: Option<EssayAssessment>,
    evaluating: bool,
    generation: u64,
    recording: bool,
}

impl ExamSession {
    pub fn new(content: ExamContent, config: ExamConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            content,
            config,
            step: ExamStep::Intro,
            time_left: 0,
            expiry_reported: false,
            reading_answers: BTreeMap::new(),
            writing_text: String::new(),
            writing: None,
            evaluating: false,
            generation: 0,
            recording: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn content(&self) -> &ExamContent {
        &self.content
    }

    pub fn config(&self) -> &ExamConfig {
        &self.config
    }

    pub fn step(&self) -> ExamStep {
        self.step
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn reading_answers(&self) -> &BTreeMap<u32, String> {
        &self.reading_answers
    }

    pub fn writing_text(&self) -> &str {
        &self.writing_text
    }

    pub fn writing_assessment(&self) -> Option<&EssayAssessment> {
        self.writing.as_ref()
    }

    pub fn is_evaluating(&self) -> bool {
        self.evaluating
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Bumped by every evaluation started or cancelled.
    pub fn evaluation_generation(&self) -> u64 {
        self.generation
    }

    fn expect_step(&self, step: ExamStep, action: &'static str) -> Result<(), ExamError> {
        if self.step != step {
            return Err(ExamError::InvalidTransition {
                step: self.step,
                action,
            });
        }
        Ok(())
    }

    fn enter(&mut self, step: ExamStep) {
        tracing::debug!(session = %self.id, from = %self.step, to = %step, "exam step");
        self.step = step;
        self.time_left = step
            .section()
            .map(|s| self.config.timings.for_section(s))
            .unwrap_or(0);
        self.expiry_reported = false;
        self.recording = false;
    }

    /// intro → reading.
    pub fn start(&mut self) -> Result<(), ExamError> {
        self.expect_step(ExamStep::Intro, "start the exam")?;
        self.enter(ExamStep::Reading);
        Ok(())
    }

    /// Record (or replace) the answer to a reading question.
    ///
    /// Multiple-choice answers must name one of the options; they are stored
    /// with the option's own spelling.
    pub fn answer(&mut self, question_id: u32, answer: &str) -> Result<(), ExamError> {
        self.expect_step(ExamStep::Reading, "answer reading questions")?;
        let question = self
            .content
            .question(question_id)
            .ok_or(ExamError::UnknownQuestion(question_id))?;

        let stored = match (question.kind, &question.options) {
            (QuestionKind::MultipleChoice, Some(options)) => options
                .iter()
                .find(|o| o.trim().eq_ignore_ascii_case(answer.trim()))
                .cloned()
                .ok_or_else(|| ExamError::InvalidOption {
                    question: question_id,
                    answer: answer.to_string(),
                })?,
            _ => answer.to_string(),
        };

        self.reading_answers.insert(question_id, stored);
        Ok(())
    }

    /// reading → listening, listening → writing. No completeness check.
    pub fn finish_section(&mut self) -> Result<ExamStep, ExamError> {
        let next = match self.step {
            ExamStep::Reading => ExamStep::Listening,
            ExamStep::Listening => ExamStep::Writing,
            step => {
                return Err(ExamError::InvalidTransition {
                    step,
                    action: "finish the section",
                })
            }
        };
        self.enter(next);
        Ok(next)
    }

    /// Replace the essay text.
    pub fn set_essay(&mut self, text: impl Into<String>) -> Result<(), ExamError> {
        self.expect_step(ExamStep::Writing, "edit the essay")?;
        if self.evaluating {
            return Err(ExamError::EvaluationInProgress);
        }
        self.writing_text = text.into();
        Ok(())
    }

    /// Append a line to the essay.
    pub fn append_essay(&mut self, line: &str) -> Result<(), ExamError> {
        self.expect_step(ExamStep::Writing, "edit the essay")?;
        if self.evaluating {
            return Err(ExamError::EvaluationInProgress);
        }
        if !self.writing_text.is_empty() {
            self.writing_text.push('\n');
        }
        self.writing_text.push_str(line);
        Ok(())
    }

    /// Gate the essay and mark an evaluation as in flight.
    pub fn begin_evaluation(&mut self) -> Result<EvaluationTicket, ExamError> {
        self.expect_step(ExamStep::Writing, "submit the essay")?;
        if self.evaluating {
            return Err(ExamError::EvaluationInProgress);
        }
        let word_count = check_essay_length(&self.writing_text)?;

        self.evaluating = true;
        self.generation += 1;
        tracing::debug!(session = %self.id, generation = self.generation, word_count, "evaluation started");

        Ok(EvaluationTicket {
            session: self.id,
            generation: self.generation,
            request: EssayRequest {
                essay: self.writing_text.clone(),
                word_count,
            },
        })
    }

    /// Drop the evaluation in flight; its reply will be treated as stale.
    pub fn cancel_evaluation(&mut self) {
        if self.evaluating {
            self.evaluating = false;
            self.generation += 1;
        }
    }

    /// Hand the examiner's reply back to the session.
    pub fn complete_evaluation(
        &mut self,
        ticket: &EvaluationTicket,
        reply: Result<EssayAssessment, ServiceError>,
    ) -> EvaluationOutcome {
        let current = ticket.session == self.id
            && ticket.generation == self.generation
            && self.evaluating
            && self.step == ExamStep::Writing;
        if !current {
            tracing::debug!(session = %self.id, generation = ticket.generation, "stale evaluation ignored");
            return EvaluationOutcome::Stale;
        }

        self.evaluating = false;
        match reply {
            Ok(assessment) => {
                self.writing = Some(assessment.clone());
                self.enter(ExamStep::Speaking);
                EvaluationOutcome::Scored(assessment)
            }
            Err(e) => EvaluationOutcome::Failed(e),
        }
    }

    /// Start or stop the (stubbed) speaking recorder. Returns the new state.
    pub fn set_recording(&mut self, recording: bool) -> Result<bool, ExamError> {
        self.expect_step(ExamStep::Speaking, "record an answer")?;
        self.recording = recording;
        Ok(self.recording)
    }

    /// speaking → result.
    pub fn finish_exam(&mut self) -> Result<ExamResult, ExamError> {
        self.expect_step(ExamStep::Speaking, "finish the exam")?;
        self.enter(ExamStep::Result);
        self.result()
    }

    /// Score summary; available once the exam is over.
    pub fn result(&self) -> Result<ExamResult, ExamError> {
        self.expect_step(ExamStep::Result, "view results")?;
        let correct = correct_count(&self.content, &self.reading_answers);
        let reading = reading_band(correct);
        let writing = self.writing.as_ref().map(|w| w.score);

        Ok(ExamResult {
            reading_correct: correct,
            reading_total: self.content.questions.len(),
            reading_band: reading,
            writing_band: writing,
            writing_feedback: self.writing.as_ref().map(|w| w.feedback.clone()),
            overall_band: overall_band(reading, writing),
        })
    }

    /// Advance the countdown by one second.
    pub fn tick(&mut self) -> TickOutcome {
        let Some(section) = self.step.section() else {
            return TickOutcome::Paused;
        };
        if self.evaluating {
            return TickOutcome::Paused;
        }

        if self.time_left > 0 {
            self.time_left -= 1;
            if self.time_left > 0 {
                return TickOutcome::Running(self.time_left);
            }
        }

        if self.expiry_reported {
            return TickOutcome::Running(0);
        }
        self.expiry_reported = true;
        tracing::info!(session = %self.id, %section, "section time is up");

        if self.config.timeout_policy == TimeoutPolicy::AutoAdvance {
            let from = self.step;
            let advanced = match self.step {
                ExamStep::Reading | ExamStep::Listening => self.finish_section().ok(),
                ExamStep::Speaking => self.finish_exam().ok().map(|_| ExamStep::Result),
                _ => None,
            };
            if let Some(to) = advanced {
                return TickOutcome::Advanced { from, to };
            }
        }

        TickOutcome::Expired(section)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::fallback_exam;

    const TEN_WORDS: &str = "one two three four five six seven eight nine ten";

    fn session() -> ExamSession {
        ExamSession::new(fallback_exam(), ExamConfig::default())
    }

    fn at_writing() -> ExamSession {
        let mut s = session();
        s.start().unwrap();
        s.finish_section().unwrap();
        s.finish_section().unwrap();
        s
    }

    fn assessment(score: f64) -> EssayAssessment {
        EssayAssessment {
            score,
            feedback: "Clear position.".into(),
        }
    }

    #[test]
    fn linear_walkthrough_resets_timer_per_step() {
        let mut s = session();
        assert_eq!(s.step(), ExamStep::Intro);
        assert_eq!(s.time_left(), 0);

        s.start().unwrap();
        assert_eq!((s.step(), s.time_left()), (ExamStep::Reading, 600));
        assert_eq!(s.finish_section().unwrap(), ExamStep::Listening);
        assert_eq!(s.time_left(), 600);
        assert_eq!(s.finish_section().unwrap(), ExamStep::Writing);
        assert_eq!(s.time_left(), 900);

        s.set_essay(TEN_WORDS).unwrap();
        let ticket = s.begin_evaluation().unwrap();
        let outcome = s.complete_evaluation(&ticket, Ok(assessment(6.5)));
        assert!(matches!(outcome, EvaluationOutcome::Scored(_)));
        assert_eq!((s.step(), s.time_left()), (ExamStep::Speaking, 300));

        let result = s.finish_exam().unwrap();
        assert_eq!(s.step(), ExamStep::Result);
        assert_eq!(result.writing_band, Some(6.5));
        assert_eq!(result.reading_total, 13);
    }

    #[test]
    fn invalid_transitions_leave_state_unchanged() {
        let mut s = session();
        assert!(s.finish_section().is_err());
        assert!(s.answer(1, "True").is_err());
        assert!(s.finish_exam().is_err());
        assert!(s.result().is_err());
        assert_eq!(s.step(), ExamStep::Intro);

        s.start().unwrap();
        assert!(s.start().is_err());
        assert!(s.begin_evaluation().is_err());
        assert_eq!(s.step(), ExamStep::Reading);
    }

    #[test]
    fn answers_must_reference_known_questions() {
        let mut s = session();
        s.start().unwrap();
        assert_eq!(s.answer(99, "x"), Err(ExamError::UnknownQuestion(99)));
        assert!(s.reading_answers().is_empty());

        s.answer(6, "Pavilions").unwrap();
        s.answer(6, "pavilions").unwrap();
        assert_eq!(s.reading_answers().len(), 1);
    }

    #[test]
    fn multiple_choice_answers_use_option_spelling() {
        let mut s = session();
        s.start().unwrap();
        s.answer(3, "not given").unwrap();
        assert_eq!(s.reading_answers()[&3], "Not Given");
        assert!(matches!(
            s.answer(3, "maybe"),
            Err(ExamError::InvalidOption { question: 3, .. })
        ));
    }

    #[test]
    fn short_essay_is_blocked_before_evaluation() {
        let mut s = at_writing();
        s.set_essay("one two three four five six seven eight nine").unwrap();
        assert_eq!(
            s.begin_evaluation(),
            Err(ExamError::EssayTooShort { words: 9, min: 10 })
        );
        assert!(!s.is_evaluating());

        s.set_essay(TEN_WORDS).unwrap();
        assert!(s.begin_evaluation().is_ok());
    }

    #[test]
    fn only_one_evaluation_in_flight() {
        let mut s = at_writing();
        s.set_essay(TEN_WORDS).unwrap();
        let _ticket = s.begin_evaluation().unwrap();
        assert_eq!(s.begin_evaluation(), Err(ExamError::EvaluationInProgress));
        assert_eq!(s.set_essay("edit"), Err(ExamError::EvaluationInProgress));
    }

    #[test]
    fn failed_evaluation_stays_in_writing() {
        let mut s = at_writing();
        s.set_essay(TEN_WORDS).unwrap();
        let ticket = s.begin_evaluation().unwrap();
        let outcome =
            s.complete_evaluation(&ticket, Err(ServiceError::Network("reset".into())));
        assert!(matches!(outcome, EvaluationOutcome::Failed(_)));
        assert_eq!(s.step(), ExamStep::Writing);
        assert!(!s.is_evaluating());
        assert!(s.writing_assessment().is_none());

        // retry works
        let ticket = s.begin_evaluation().unwrap();
        assert!(matches!(
            s.complete_evaluation(&ticket, Ok(assessment(7.0))),
            EvaluationOutcome::Scored(_)
        ));
    }

    #[test]
    fn stale_replies_are_ignored() {
        let mut s = at_writing();
        s.set_essay(TEN_WORDS).unwrap();
        let old = s.begin_evaluation().unwrap();
        s.cancel_evaluation();
        let fresh = s.begin_evaluation().unwrap();

        assert!(matches!(
            s.complete_evaluation(&old, Ok(assessment(9.0))),
            EvaluationOutcome::Stale
        ));
        assert!(s.is_evaluating());
        assert!(matches!(
            s.complete_evaluation(&fresh, Ok(assessment(6.0))),
            EvaluationOutcome::Scored(_)
        ));
        assert_eq!(s.writing_assessment().unwrap().score, 6.0);
    }

    #[test]
    fn ticket_from_another_session_is_stale() {
        let mut a = at_writing();
        let mut b = at_writing();
        a.set_essay(TEN_WORDS).unwrap();
        b.set_essay(TEN_WORDS).unwrap();
        let ticket_a = a.begin_evaluation().unwrap();
        let _ticket_b = b.begin_evaluation().unwrap();
        assert!(matches!(
            b.complete_evaluation(&ticket_a, Ok(assessment(8.0))),
            EvaluationOutcome::Stale
        ));
    }

    #[test]
    fn countdown_paused_outside_timed_steps_and_while_evaluating() {
        let mut s = session();
        assert_eq!(s.tick(), TickOutcome::Paused);

        let mut s = at_writing();
        assert_eq!(s.tick(), TickOutcome::Running(899));
        s.set_essay(TEN_WORDS).unwrap();
        let _ticket = s.begin_evaluation().unwrap();
        assert_eq!(s.tick(), TickOutcome::Paused);
        assert_eq!(s.time_left(), 899);
    }

    #[test]
    fn continue_policy_keeps_section_open() {
        let config = ExamConfig {
            timings: SectionTimings {
                reading_secs: 2,
                ..Default::default()
            },
            timeout_policy: TimeoutPolicy::Continue,
        };
        let mut s = ExamSession::new(fallback_exam(), config);
        s.start().unwrap();
        assert_eq!(s.tick(), TickOutcome::Running(1));
        assert_eq!(s.tick(), TickOutcome::Expired(Section::Reading));
        assert_eq!(s.tick(), TickOutcome::Running(0));
        assert_eq!(s.time_left(), 0);
        assert_eq!(s.step(), ExamStep::Reading);
        s.answer(1, "False").unwrap();
    }

    #[test]
    fn auto_advance_policy_finishes_sections() {
        let config = ExamConfig {
            timings: SectionTimings {
                reading_secs: 1,
                listening_secs: 1,
                writing_secs: 1,
                speaking_secs: 1,
            },
            timeout_policy: TimeoutPolicy::AutoAdvance,
        };
        let mut s = ExamSession::new(fallback_exam(), config);
        s.start().unwrap();
        assert_eq!(
            s.tick(),
            TickOutcome::Advanced {
                from: ExamStep::Reading,
                to: ExamStep::Listening
            }
        );
        assert_eq!(
            s.tick(),
            TickOutcome::Advanced {
                from: ExamStep::Listening,
                to: ExamStep::Writing
            }
        );
        // writing expiry is left to the orchestrator, which submits the essay
        assert_eq!(s.tick(), TickOutcome::Expired(Section::Writing));
        assert_eq!(s.step(), ExamStep::Writing);
    }

    #[test]
    fn writing_timeout_with_empty_essay_does_not_crash() {
        let config = ExamConfig {
            timings: SectionTimings {
                writing_secs: 1,
                ..Default::default()
            },
            timeout_policy: TimeoutPolicy::AutoAdvance,
        };
        let mut s = ExamSession::new(fallback_exam(), config);
        s.start().unwrap();
        s.finish_section().unwrap();
        s.finish_section().unwrap();
        assert_eq!(s.tick(), TickOutcome::Expired(Section::Writing));
        assert!(matches!(
            s.begin_evaluation(),
            Err(ExamError::EssayTooShort { words: 0, .. })
        ));
        assert_eq!(s.step(), ExamStep::Writing);
    }

    #[test]
    fn recording_only_in_speaking_and_reset_on_exit() {
        let mut s = at_writing();
        assert!(s.set_recording(true).is_err());
        s.set_essay(TEN_WORDS).unwrap();
        let ticket = s.begin_evaluation().unwrap();
        s.complete_evaluation(&ticket, Ok(assessment(5.0)));
        assert!(s.set_recording(true).unwrap());
        assert!(s.is_recording());
        s.finish_exam().unwrap();
        assert!(!s.is_recording());
    }

    #[test]
    fn perfect_reading_averages_with_writing() {
        let mut s = session();
        s.start().unwrap();
        for q in s.content().questions.clone() {
            s.answer(q.id, &q.correct_answer).unwrap();
        }
        s.finish_section().unwrap();
        s.finish_section().unwrap();
        assert!(s.finish_exam().is_err());
        s.set_essay(TEN_WORDS).unwrap();
        let ticket = s.begin_evaluation().unwrap();
        s.complete_evaluation(&ticket, Ok(assessment(6.5)));
        let result = s.finish_exam().unwrap();
        assert_eq!(result.reading_correct, 13);
        assert_eq!(result.reading_band, 9.0);
        assert_eq!(result.overall_band, 7.8);
    }
}
