//! Onboarding questionnaire.
//!
//! A fixed sequence of steps. Choice steps store the selected option and move
//! on; the name and target-score steps need an explicit `advance`. Finishing
//! the last step yields the complete `OnboardingAnswers`.

use chrono::Utc;

use crate::error::OnboardingError;
use crate::model::{ExamDate, OnboardingAnswers, Reason, Section, TimeCommitment};

pub const MIN_TARGET_SCORE: f64 = 4.0;
pub const MAX_TARGET_SCORE: f64 = 9.0;
pub const TARGET_SCORE_STEP: f64 = 0.5;
pub const DEFAULT_TARGET_SCORE: f64 = 7.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnboardingStep {
    Name,
    Reason,
    FirstTime,
    TargetScore,
    HardestPart,
    ExamDate,
    TimeCommitment,
}

impl OnboardingStep {
    pub const ORDER: [OnboardingStep; 7] = [
        OnboardingStep::Name,
        OnboardingStep::Reason,
        OnboardingStep::FirstTime,
        OnboardingStep::TargetScore,
        OnboardingStep::HardestPart,
        OnboardingStep::ExamDate,
        OnboardingStep::TimeCommitment,
    ];

    pub fn title(self) -> &'static str {
        match self {
            OnboardingStep::Name => "What should we call you?",
            OnboardingStep::Reason => "Why are you preparing for IELTS?",
            OnboardingStep::FirstTime => "Have you taken IELTS before?",
            OnboardingStep::TargetScore => "What band do you need?",
            OnboardingStep::HardestPart => "Which part is hardest for you?",
            OnboardingStep::ExamDate => "When do you plan to take the exam?",
            OnboardingStep::TimeCommitment => "How much time can you spend per day?",
        }
    }
}

/// Whether a target score lies on the slider.
pub fn is_valid_target(score: f64) -> bool {
    (MIN_TARGET_SCORE..=MAX_TARGET_SCORE).contains(&score)
        && ((score - MIN_TARGET_SCORE) / TARGET_SCORE_STEP).fract() == 0.0
}

/// What moving forward did.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    Next(OnboardingStep),
    Completed(OnboardingAnswers),
}

/// Questionnaire state.
#[derive(Debug, Clone)]
pub struct OnboardingFlow {
    index: usize,
    completed: bool,
    name: String,
    reason: Option<Reason>,
    first_time: Option<bool>,
    target_score: f64,
    hardest_part: Option<Section>,
    exam_date: Option<ExamDate>,
    time_commitment: Option<TimeCommitment>,
}

impl Default for OnboardingFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl OnboardingFlow {
    pub fn new() -> Self {
        Self {
            index: 0,
            completed: false,
            name: String::new(),
            reason: None,
            first_time: None,
            target_score: DEFAULT_TARGET_SCORE,
            hardest_part: None,
            exam_date: None,
            time_commitment: None,
        }
    }

    pub fn step(&self) -> OnboardingStep {
        OnboardingStep::ORDER[self.index]
    }

    /// Zero-based position and total, for the progress bar.
    pub fn position(&self) -> (usize, usize) {
        (self.index, OnboardingStep::ORDER.len())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target_score(&self) -> f64 {
        self.target_score
    }

    /// Go back one step. No-op on the first step.
    pub fn back(&mut self) -> OnboardingStep {
        if !self.completed && self.index > 0 {
            self.index -= 1;
        }
        self.step()
    }

    fn expect(&self, step: OnboardingStep, expected: &'static str) -> Result<(), OnboardingError> {
        if self.completed {
            return Err(OnboardingError::Completed);
        }
        if self.step() != step {
            return Err(OnboardingError::WrongStep { expected });
        }
        Ok(())
    }

    pub fn set_name(&mut self, name: &str) -> Result<(), OnboardingError> {
        self.expect(OnboardingStep::Name, "a name")?;
        self.name = name.trim().to_string();
        Ok(())
    }

    pub fn set_target_score(&mut self, score: f64) -> Result<(), OnboardingError> {
        self.expect(OnboardingStep::TargetScore, "a target score")?;
        if !is_valid_target(score) {
            return Err(OnboardingError::InvalidTargetScore(score));
        }
        self.target_score = score;
        Ok(())
    }

    /// Confirm an input step (name or target score) and move on.
    pub fn advance(&mut self) -> Result<Progress, OnboardingError> {
        if self.completed {
            return Err(OnboardingError::Completed);
        }
        match self.step() {
            OnboardingStep::Name if self.name.is_empty() => Err(OnboardingError::EmptyName),
            OnboardingStep::Name | OnboardingStep::TargetScore => Ok(self.next()),
            _ => Err(OnboardingError::WrongStep {
                expected: "an option",
            }),
        }
    }

    pub fn choose_reason(&mut self, reason: Reason) -> Result<Progress, OnboardingError> {
        self.expect(OnboardingStep::Reason, "a reason")?;
        self.reason = Some(reason);
        Ok(self.next())
    }

    pub fn choose_first_time(&mut self, first_time: bool) -> Result<Progress, OnboardingError> {
        self.expect(OnboardingStep::FirstTime, "yes or no")?;
        self.first_time = Some(first_time);
        Ok(self.next())
    }

    pub fn choose_hardest_part(&mut self, section: Section) -> Result<Progress, OnboardingError> {
        self.expect(OnboardingStep::HardestPart, "a section")?;
        self.hardest_part = Some(section);
        Ok(self.next())
    }

    pub fn choose_exam_date(&mut self, date: ExamDate) -> Result<Progress, OnboardingError> {
        self.expect(OnboardingStep::ExamDate, "an exam date")?;
        self.exam_date = Some(date);
        Ok(self.next())
    }

    pub fn choose_time_commitment(
        &mut self,
        time: TimeCommitment,
    ) -> Result<Progress, OnboardingError> {
        self.expect(OnboardingStep::TimeCommitment, "a time commitment")?;
        self.time_commitment = Some(time);
        Ok(self.next())
    }

    fn next(&mut self) -> Progress {
        if self.index + 1 < OnboardingStep::ORDER.len() {
            self.index += 1;
            return Progress::Next(self.step());
        }

        // Every choice step sits before the last one, so all are set here;
        // the fallbacks only matter if the order above changes.
        self.completed = true;
        Progress::Completed(OnboardingAnswers {
            name: self.name.clone(),
            reason: self.reason.unwrap_or(Reason::StudyAbroad),
            is_first_time: self.first_time.unwrap_or(true),
            target_score: self.target_score,
            hardest_part: self.hardest_part.unwrap_or(Section::Writing),
            time_commitment: self.time_commitment.unwrap_or(TimeCommitment::Minutes30),
            exam_date: self.exam_date.unwrap_or(ExamDate::Undecided),
            completed_at: Utc::now(),
        })
    }
}
