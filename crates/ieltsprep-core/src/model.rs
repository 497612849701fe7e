//! Core data model types for ieltsprep.
//!
//! These are the types persisted to the document store (profiles, exam
//! variants) and the small enums shared by the exam, onboarding and
//! dashboard flows. Wire names are camelCase to match the stored documents.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Collection holding one profile document per user id.
pub const USERS_COLLECTION: &str = "users";

/// Collection holding exam variants.
pub const EXAMS_COLLECTION: &str = "exams";

/// The only exam variant the application knows about.
pub const DEFAULT_VARIANT: &str = "variant_1";

/// A user's profile document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub has_completed_onboarding: bool,
    /// Full onboarding questionnaire, stored once completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onboarding: Option<OnboardingAnswers>,
}

impl UserProfile {
    /// The profile seeded on first sign-in.
    pub fn seeded(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            score: 0.0,
            streak: 0,
            has_completed_onboarding: false,
            onboarding: None,
        }
    }

    /// Apply an acknowledged partial update.
    pub fn apply(&mut self, update: &ProfileUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(score) = update.score {
            self.score = score;
        }
        if let Some(streak) = update.streak {
            self.streak = streak;
        }
        if let Some(done) = update.has_completed_onboarding {
            self.has_completed_onboarding = done;
        }
        if let Some(onboarding) = &update.onboarding {
            self.onboarding = Some(onboarding.clone());
        }
    }
}

/// Partial profile mutation. Only fields that are `Some` are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streak: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_completed_onboarding: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub onboarding: Option<OnboardingAnswers>,
}

impl ProfileUpdate {
    /// Update written when the onboarding questionnaire completes.
    pub fn onboarding_complete(answers: OnboardingAnswers) -> Self {
        Self {
            name: Some(answers.name.clone()),
            has_completed_onboarding: Some(true),
            onboarding: Some(answers),
            ..Default::default()
        }
    }

    /// Update written from the settings screen.
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Answers collected by the onboarding questionnaire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingAnswers {
    pub name: String,
    pub reason: Reason,
    pub is_first_time: bool,
    pub target_score: f64,
    pub hardest_part: Section,
    pub time_commitment: TimeCommitment,
    pub exam_date: ExamDate,
    pub completed_at: DateTime<Utc>,
}

/// Why the user is preparing for the exam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reason {
    #[serde(rename = "Study Abroad")]
    StudyAbroad,
    #[serde(rename = "Work Opportunities")]
    WorkOpportunities,
    #[serde(rename = "Local Uni")]
    LocalUni,
    #[serde(rename = "Teaching")]
    Teaching,
}

impl Reason {
    pub const ALL: [Reason; 4] = [
        Reason::StudyAbroad,
        Reason::WorkOpportunities,
        Reason::LocalUni,
        Reason::Teaching,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Reason::StudyAbroad => "Study abroad",
            Reason::WorkOpportunities => "Career / immigration",
            Reason::LocalUni => "Local university admission",
            Reason::Teaching => "I teach IELTS",
        }
    }
}

/// How much time per day the user wants to spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeCommitment {
    #[serde(rename = "15m")]
    Minutes15,
    #[serde(rename = "30m")]
    Minutes30,
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "max")]
    Intensive,
}

impl TimeCommitment {
    pub const ALL: [TimeCommitment; 4] = [
        TimeCommitment::Minutes15,
        TimeCommitment::Minutes30,
        TimeCommitment::Hour1,
        TimeCommitment::Intensive,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TimeCommitment::Minutes15 => "15 minutes",
            TimeCommitment::Minutes30 => "30 minutes",
            TimeCommitment::Hour1 => "1 hour",
            TimeCommitment::Intensive => "2+ hours",
        }
    }
}

/// When the user plans to sit the exam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExamDate {
    #[serde(rename = "<1m")]
    UnderOneMonth,
    #[serde(rename = "1-3m")]
    OneToThreeMonths,
    #[serde(rename = "3-6m")]
    ThreeToSixMonths,
    #[serde(rename = "none")]
    Undecided,
}

impl ExamDate {
    pub const ALL: [ExamDate; 4] = [
        ExamDate::UnderOneMonth,
        ExamDate::OneToThreeMonths,
        ExamDate::ThreeToSixMonths,
        ExamDate::Undecided,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ExamDate::UnderOneMonth => "Less than a month",
            ExamDate::OneToThreeMonths => "1-3 months",
            ExamDate::ThreeToSixMonths => "3-6 months",
            ExamDate::Undecided => "No date yet",
        }
    }

    /// Upper bound of the planning window in days, if there is one.
    pub fn window_days(self) -> Option<i64> {
        match self {
            ExamDate::UnderOneMonth => Some(30),
            ExamDate::OneToThreeMonths => Some(90),
            ExamDate::ThreeToSixMonths => Some(180),
            ExamDate::Undecided => None,
        }
    }
}

/// One of the four exam sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Section {
    Listening,
    Reading,
    Writing,
    Speaking,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Listening,
        Section::Reading,
        Section::Writing,
        Section::Speaking,
    ];
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Listening => write!(f, "Listening"),
            Section::Reading => write!(f, "Reading"),
            Section::Writing => write!(f, "Writing"),
            Section::Speaking => write!(f, "Speaking"),
        }
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "listening" => Ok(Section::Listening),
            "reading" => Ok(Section::Reading),
            "writing" => Ok(Section::Writing),
            "speaking" => Ok(Section::Speaking),
            other => Err(format!("unknown section: {other}")),
        }
    }
}

/// A reading passage with its questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamContent {
    pub id: String,
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl ExamContent {
    pub fn question(&self, id: u32) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}

/// A single reading question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    #[serde(rename = "question", alias = "prompt")]
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub correct_answer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice,
    TextInput,
}

/// Steps of the mock exam, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamStep {
    Intro,
    Reading,
    Listening,
    Writing,
    Speaking,
    Result,
}

impl ExamStep {
    /// The section a timed step belongs to.
    pub fn section(self) -> Option<Section> {
        match self {
            ExamStep::Reading => Some(Section::Reading),
            ExamStep::Listening => Some(Section::Listening),
            ExamStep::Writing => Some(Section::Writing),
            ExamStep::Speaking => Some(Section::Speaking),
            ExamStep::Intro | ExamStep::Result => None,
        }
    }

    pub fn is_timed(self) -> bool {
        self.section().is_some()
    }
}

impl fmt::Display for ExamStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExamStep::Intro => write!(f, "intro"),
            ExamStep::Reading => write!(f, "reading"),
            ExamStep::Listening => write!(f, "listening"),
            ExamStep::Writing => write!(f, "writing"),
            ExamStep::Speaking => write!(f, "speaking"),
            ExamStep::Result => write!(f, "result"),
        }
    }
}

/// Light/dark theme preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme: {other}")),
        }
    }
}
