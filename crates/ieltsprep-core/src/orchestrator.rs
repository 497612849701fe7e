//! Exam orchestrator.
//!
//! Drives an `ExamSession` against an `EssayEvaluator` and a one-second
//! countdown. The orchestrator owns the session for its whole lifetime;
//! dropping the orchestrator discards the attempt.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use crate::error::ExamError;
use crate::exam::{EvaluationOutcome, ExamResult, ExamSession, TickOutcome, TimeoutPolicy};
use crate::model::{ExamStep, Section};
use crate::traits::EssayEvaluator;

/// Period of the exam countdown.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// A countdown interval whose first tick fires one period from now.
pub fn countdown() -> Interval {
    let mut interval = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

/// The exam clock.
///
/// While nothing polls it (untimed step, examiner call in flight) the
/// interval falls behind. `sync` restarts the period whenever the session
/// has changed step or started an evaluation since the last call, so the
/// next tick is a full second away.
pub struct ExamClock {
    interval: Interval,
    phase: (ExamStep, u64),
}

impl ExamClock {
    pub fn new(session: &ExamSession) -> Self {
        Self {
            interval: countdown(),
            phase: (session.step(), session.evaluation_generation()),
        }
    }

    /// Wait for the next second.
    pub async fn tick(&mut self) {
        self.interval.tick().await;
    }

    /// Restart the period if `session` moved on. Returns `true` if it did.
    pub fn sync(&mut self, session: &ExamSession) -> bool {
        let phase = (session.step(), session.evaluation_generation());
        if phase == self.phase {
            return false;
        }
        self.phase = phase;
        self.interval.reset();
        true
    }
}

/// What a countdown tick did.
#[derive(Debug)]
pub struct TickReport {
    pub tick: TickOutcome,
    /// Set when the writing clock ran out under `AutoAdvance` and the essay
    /// was submitted on the user's behalf.
    pub submission: Option<Result<EvaluationOutcome, ExamError>>,
}

/// Owns one exam attempt and the examiner it reports to.
pub struct ExamOrchestrator {
    session: ExamSession,
    evaluator: Arc<dyn EssayEvaluator>,
}

impl ExamOrchestrator {
    pub fn new(session: ExamSession, evaluator: Arc<dyn EssayEvaluator>) -> Self {
        Self { session, evaluator }
    }

    pub fn session(&self) -> &ExamSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut ExamSession {
        &mut self.session
    }

    pub fn step(&self) -> ExamStep {
        self.session.step()
    }

    /// Submit the essay and wait for the examiner.
    ///
    /// Local rejections (too short, wrong step) come back as `Err` without
    /// any network call. Examiner failures come back as
    /// `EvaluationOutcome::Failed` with the session still in writing.
    pub async fn submit_writing(&mut self) -> Result<EvaluationOutcome, ExamError> {
        let ticket = self.session.begin_evaluation()?;
        tracing::info!(
            session = %self.session.id(),
            evaluator = self.evaluator.name(),
            words = ticket.request.word_count,
            "submitting essay"
        );

        let reply = self.evaluator.evaluate(&ticket.request).await;
        if let Err(e) = &reply {
            tracing::warn!(session = %self.session.id(), "essay evaluation failed: {e}");
        }
        Ok(self.session.complete_evaluation(&ticket, reply))
    }

    /// Apply one countdown tick.
    pub async fn tick(&mut self) -> TickReport {
        let tick = self.session.tick();
        let submission = match tick {
            TickOutcome::Expired(Section::Writing)
                if self.session.config().timeout_policy == TimeoutPolicy::AutoAdvance =>
            {
                let outcome = self.submit_writing().await;
                if let Err(e) = &outcome {
                    tracing::info!(session = %self.session.id(), "automatic submission blocked: {e}");
                }
                Some(outcome)
            }
            _ => None,
        };
        TickReport { tick, submission }
    }

    /// speaking → result.
    pub fn finish_exam(&mut self) -> Result<ExamResult, ExamError> {
        self.session.finish_exam()
    }

    /// Leave the exam. Anything still in flight is dropped with the session.
    pub fn exit(self) -> ExamSession {
        tracing::debug!(session = %self.session.id(), step = %self.session.step(), "exam exited");
        self.session
    }
}
