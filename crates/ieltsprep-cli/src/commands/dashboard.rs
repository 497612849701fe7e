//! The `ieltsprep dashboard` command.

use std::path::PathBuf;

use anyhow::Result;
use chrono::{Duration, NaiveDate, Utc};
use clap::ValueEnum;
use comfy_table::{presets, Cell, Table};

use ieltsprep_core::model::{Section, Theme, UserProfile};

use super::Context;
use crate::state::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum View {
    Home,
    Stats,
    Calendar,
    Settings,
}

/// Per-section progress shown on the home view.
pub const SECTION_PROGRESS: [(Section, u8); 4] = [
    (Section::Listening, 65),
    (Section::Reading, 40),
    (Section::Writing, 20),
    (Section::Speaking, 10),
];

pub async fn execute(config_path: Option<PathBuf>, view: View) -> Result<()> {
    let ctx = Context::load(config_path.as_deref())?;
    let (_, handle) = ctx.profile().await?;
    let profile = handle.profile();

    if !profile.has_completed_onboarding {
        anyhow::bail!("finish onboarding first: run `ieltsprep onboard`");
    }

    match view {
        View::Home => print_home(profile, ctx.state.theme),
        View::Stats => print_stats(profile, ctx.state.theme),
        View::Calendar => print_calendar(profile),
        View::Settings => print_settings(profile, ctx.session()?, ctx.state.theme),
    }
    Ok(())
}

pub fn table(theme: Theme) -> Table {
    let mut table = Table::new();
    match theme {
        Theme::Light => table.load_preset(presets::UTF8_FULL),
        Theme::Dark => table.load_preset(presets::UTF8_HORIZONTAL_ONLY),
    };
    table
}

fn progress_bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) / 10;
    format!("{}{} {percent}%", "#".repeat(filled), ".".repeat(10 - filled))
}

fn print_home(profile: &UserProfile, theme: Theme) {
    println!("Hello, {}!", display_name(profile));
    println!("Score: {:.1}   Streak: {} days\n", profile.score, profile.streak);

    let mut table = table(theme);
    table.set_header(vec!["Section", "Progress"]);
    for (section, percent) in SECTION_PROGRESS {
        table.add_row(vec![Cell::new(section), Cell::new(progress_bar(percent))]);
    }
    println!("{table}");
    println!("\nNext: `ieltsprep practice` or `ieltsprep exam`");
}

fn print_stats(profile: &UserProfile, theme: Theme) {
    let mut table = table(theme);
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec![
        Cell::new("Current score"),
        Cell::new(format!("{:.1}", profile.score)),
    ]);
    table.add_row(vec![
        Cell::new("Streak"),
        Cell::new(format!("{} days", profile.streak)),
    ]);

    if let Some(answers) = &profile.onboarding {
        table.add_row(vec![
            Cell::new("Target band"),
            Cell::new(format!("{:.1}", answers.target_score)),
        ]);
        let gap = (answers.target_score - profile.score).max(0.0);
        table.add_row(vec![Cell::new("To go"), Cell::new(format!("{gap:.1}"))]);
        table.add_row(vec![
            Cell::new("Focus area"),
            Cell::new(answers.hardest_part),
        ]);
        table.add_row(vec![
            Cell::new("Goal"),
            Cell::new(answers.reason.label()),
        ]);
    }
    println!("{table}");
}

/// Last day of the planned exam window, if the user picked one.
pub fn exam_deadline(profile: &UserProfile) -> Option<NaiveDate> {
    let answers = profile.onboarding.as_ref()?;
    let days = answers.exam_date.window_days()?;
    Some((answers.completed_at + Duration::days(days)).date_naive())
}

fn print_calendar(profile: &UserProfile) {
    let Some(answers) = &profile.onboarding else {
        println!("No study plan yet.");
        return;
    };

    println!("Exam window: {}", answers.exam_date.label());
    match exam_deadline(profile) {
        Some(deadline) => {
            let left = (deadline - Utc::now().date_naive()).num_days().max(0);
            println!("Planned exam by {deadline} ({left} days left)");
        }
        None => println!("No exam date set."),
    }
    println!("Daily practice: {}", answers.time_commitment.label());
}

pub fn print_settings(profile: &UserProfile, session: &Session, theme: Theme) {
    println!("Name:    {}", display_name(profile));
    if let Some(email) = &session.email {
        println!("Email:   {email}");
    }
    println!("Sign-in: {}", session.method);
    println!("Theme:   {theme}");
    println!();
    println!("Change name:  ieltsprep settings --name <NAME>");
    println!("Switch theme: ieltsprep theme");
    println!("Sign out:     ieltsprep logout");
}

fn display_name(profile: &UserProfile) -> &str {
    if profile.name.trim().is_empty() {
        "Student"
    } else {
        &profile.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ieltsprep_core::model::{ExamDate, OnboardingAnswers, Reason, TimeCommitment};

    fn onboarded(exam_date: ExamDate) -> UserProfile {
        let mut profile = UserProfile::seeded("Alex");
        profile.has_completed_onboarding = true;
        profile.onboarding = Some(OnboardingAnswers {
            name: "Alex".into(),
            reason: Reason::StudyAbroad,
            is_first_time: true,
            target_score: 7.0,
            hardest_part: Section::Writing,
            time_commitment: TimeCommitment::Hour1,
            exam_date,
            completed_at: Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap(),
        });
        profile
    }

    #[test]
    fn deadline_follows_exam_window() {
        let profile = onboarded(ExamDate::UnderOneMonth);
        assert_eq!(
            exam_deadline(&profile),
            NaiveDate::from_ymd_opt(2026, 1, 31)
        );
        assert_eq!(exam_deadline(&onboarded(ExamDate::Undecided)), None);
        assert_eq!(exam_deadline(&UserProfile::seeded("x")), None);
    }

    #[test]
    fn progress_bar_scales() {
        assert_eq!(progress_bar(65), "######.... 65%");
        assert_eq!(progress_bar(0), ".......... 0%");
        assert_eq!(progress_bar(100), "########## 100%");
    }
}
