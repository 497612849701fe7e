//! The `ieltsprep onboard` command.

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use ieltsprep_core::model::{ExamDate, ProfileUpdate, Reason, Section, TimeCommitment};
use ieltsprep_core::onboarding::{
    OnboardingFlow, OnboardingStep, Progress, MAX_TARGET_SCORE, MIN_TARGET_SCORE,
};

use super::{parse_choice, print_options, Context, Input};

const FIRST_TIME_OPTIONS: [&str; 2] = ["First time", "Taken it before"];

pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let ctx = Context::load(config_path.as_deref())?;
    let (gateway, mut handle) = ctx.profile().await?;

    if handle.profile().has_completed_onboarding {
        println!("Onboarding already completed. Run `ieltsprep dashboard`.");
        return Ok(());
    }

    let mut flow = OnboardingFlow::new();
    let mut input = Input::stdin();
    println!("Type 'back' to return to the previous question.\n");

    let answers = loop {
        let step = flow.step();
        let (position, total) = flow.position();
        println!("[{}/{}] {}", position + 1, total, step.title());
        print_step_options(step);

        let prompt = match step {
            OnboardingStep::TargetScore => format!(
                "Band {MIN_TARGET_SCORE:.1}-{MAX_TARGET_SCORE:.1} [{:.1}]: ",
                flow.target_score()
            ),
            _ => "> ".to_string(),
        };
        let Some(line) = input.ask(&prompt).await? else {
            anyhow::bail!("onboarding cancelled; nothing was saved");
        };

        if line.eq_ignore_ascii_case("back") {
            flow.back();
            continue;
        }

        match apply(&mut flow, step, &line) {
            Ok(Some(Progress::Completed(answers))) => break answers,
            Ok(_) => {}
            Err(message) => println!("  {message}"),
        }
        println!();
    };

    let name = answers.name.clone();
    let target = answers.target_score;
    handle
        .update(&gateway, ProfileUpdate::onboarding_complete(answers))
        .await
        .context("failed to save onboarding answers")?;

    println!("\nAll set, {name}! Target band {target:.1}.");
    println!("Run `ieltsprep dashboard` to see your plan.");
    Ok(())
}

fn print_step_options(step: OnboardingStep) {
    match step {
        OnboardingStep::Reason => print_options(Reason::ALL.iter().map(|r| r.label()), None),
        OnboardingStep::FirstTime => print_options(FIRST_TIME_OPTIONS, None),
        OnboardingStep::HardestPart => {
            let labels: Vec<String> = Section::ALL.iter().map(|s| s.to_string()).collect();
            print_options(labels.iter().map(String::as_str), None)
        }
        OnboardingStep::ExamDate => print_options(ExamDate::ALL.iter().map(|d| d.label()), None),
        OnboardingStep::TimeCommitment => {
            print_options(TimeCommitment::ALL.iter().map(|t| t.label()), None)
        }
        OnboardingStep::Name | OnboardingStep::TargetScore => {}
    }
}

/// Feed one line of input to the current step.
fn apply(
    flow: &mut OnboardingFlow,
    step: OnboardingStep,
    line: &str,
) -> Result<Option<Progress>, String> {
    let pick = |len: usize| {
        parse_choice(line, len).ok_or_else(|| format!("Pick a number between 1 and {len}."))
    };

    let progress = match step {
        OnboardingStep::Name => {
            flow.set_name(line).map_err(|e| e.to_string())?;
            flow.advance()
        }
        OnboardingStep::TargetScore => {
            if !line.is_empty() {
                let score: f64 = line
                    .parse()
                    .map_err(|_| format!("'{line}' is not a number."))?;
                flow.set_target_score(score).map_err(|e| e.to_string())?;
            }
            flow.advance()
        }
        OnboardingStep::Reason => flow.choose_reason(Reason::ALL[pick(Reason::ALL.len())?]),
        OnboardingStep::FirstTime => flow.choose_first_time(pick(FIRST_TIME_OPTIONS.len())? == 0),
        OnboardingStep::HardestPart => {
            flow.choose_hardest_part(Section::ALL[pick(Section::ALL.len())?])
        }
        OnboardingStep::ExamDate => flow.choose_exam_date(ExamDate::ALL[pick(ExamDate::ALL.len())?]),
        OnboardingStep::TimeCommitment => {
            flow.choose_time_commitment(TimeCommitment::ALL[pick(TimeCommitment::ALL.len())?])
        }
    };
    progress.map(Some).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_answers_complete_the_flow() {
        let mut flow = OnboardingFlow::new();
        let script = ["Alex", "2", "1", "6.5", "3", "4", "2"];
        let mut last = None;
        for line in script {
            let step = flow.step();
            last = apply(&mut flow, step, line).unwrap();
        }
        let Some(Progress::Completed(answers)) = last else {
            panic!("flow did not complete");
        };
        assert_eq!(answers.reason, Reason::WorkOpportunities);
        assert!(answers.is_first_time);
        assert_eq!(answers.target_score, 6.5);
        assert_eq!(answers.hardest_part, Section::Writing);
        assert_eq!(answers.exam_date, ExamDate::Undecided);
        assert_eq!(answers.time_commitment, TimeCommitment::Minutes30);
    }

    #[test]
    fn bad_input_keeps_the_step() {
        let mut flow = OnboardingFlow::new();
        assert!(apply(&mut flow, OnboardingStep::Name, "").is_err());
        apply(&mut flow, OnboardingStep::Name, "Sam").unwrap();
        assert_eq!(flow.step(), OnboardingStep::Reason);
        assert!(apply(&mut flow, OnboardingStep::Reason, "9").is_err());
        assert_eq!(flow.step(), OnboardingStep::Reason);
    }

    #[test]
    fn empty_target_keeps_default() {
        let mut flow = OnboardingFlow::new();
        for line in ["Sam", "1", "2"] {
            let step = flow.step();
            apply(&mut flow, step, line).unwrap();
        }
        apply(&mut flow, OnboardingStep::TargetScore, "").unwrap();
        assert_eq!(flow.step(), OnboardingStep::HardestPart);
        assert_eq!(flow.target_score(), 7.0);
    }
}
