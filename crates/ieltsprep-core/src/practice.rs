//! Practice (learning-session) flow.
//!
//! A lesson is walked as a fixed list of steps: the passage, one step per
//! question, then a review. Answers are option indices and may change freely
//! until the session is finished.

use std::collections::BTreeMap;

use crate::content::{Lesson, LessonQuestion};
use crate::error::PracticeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PracticeStep {
    Passage,
    /// Index into the lesson's question list.
    Question(usize),
    Review,
}

/// Result of moving backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    At(PracticeStep),
    /// Moved back past the first step; the caller leaves the lesson.
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PracticeScore {
    pub correct: usize,
    pub total: usize,
}

#[derive(Debug, Clone)]
pub struct PracticeSession {
    lesson: Lesson,
    position: usize,
    answers: BTreeMap<u32, usize>,
    score: Option<PracticeScore>,
}

impl PracticeSession {
    pub fn new(lesson: Lesson) -> Self {
        Self {
            lesson,
            position: 0,
            answers: BTreeMap::new(),
            score: None,
        }
    }

    pub fn lesson(&self) -> &Lesson {
        &self.lesson
    }

    fn step_count(&self) -> usize {
        self.lesson.questions.len() + 2
    }

    pub fn step(&self) -> PracticeStep {
        match self.position {
            0 => PracticeStep::Passage,
            p if p <= self.lesson.questions.len() => PracticeStep::Question(p - 1),
            _ => PracticeStep::Review,
        }
    }

    /// The question shown on the current step, if any.
    pub fn current_question(&self) -> Option<&LessonQuestion> {
        match self.step() {
            PracticeStep::Question(i) => self.lesson.questions.get(i),
            _ => None,
        }
    }

    /// Advance one step; stays on review once there.
    pub fn next(&mut self) -> PracticeStep {
        if self.position + 1 < self.step_count() {
            self.position += 1;
        }
        self.step()
    }

    pub fn back(&mut self) -> Navigation {
        if self.position == 0 {
            return Navigation::Exit;
        }
        self.position -= 1;
        Navigation::At(self.step())
    }

    pub fn answer(&self, question: u32) -> Option<usize> {
        self.answers.get(&question).copied()
    }

    pub fn answered(&self) -> usize {
        self.answers.len()
    }

    pub fn select(&mut self, question: u32, option: usize) -> Result<(), PracticeError> {
        if self.score.is_some() {
            return Err(PracticeError::Finished);
        }
        let q = self
            .lesson
            .questions
            .iter()
            .find(|q| q.id == question)
            .ok_or(PracticeError::UnknownQuestion(question))?;
        if option >= q.options.len() {
            return Err(PracticeError::UnknownOption { question, option });
        }
        self.answers.insert(question, option);
        Ok(())
    }

    /// Lock the answers and score them.
    pub fn finish(&mut self) -> Result<PracticeScore, PracticeError> {
        if self.score.is_some() {
            return Err(PracticeError::Finished);
        }
        let total = self.lesson.questions.len();
        if self.answers.len() < total {
            return Err(PracticeError::Incomplete {
                answered: self.answers.len(),
                total,
            });
        }
        let correct = self
            .lesson
            .questions
            .iter()
            .filter(|q| self.answers.get(&q.id) == Some(&q.correct_option))
            .count();
        let score = PracticeScore { correct, total };
        tracing::debug!(correct, total, "practice finished");
        self.score = Some(score);
        Ok(score)
    }

    pub fn score(&self) -> Option<PracticeScore> {
        self.score
    }

    pub fn is_correct(&self, question: u32) -> Option<bool> {
        self.score?;
        let q = self.lesson.questions.iter().find(|q| q.id == question)?;
        Some(self.answers.get(&question) == Some(&q.correct_option))
    }
}
