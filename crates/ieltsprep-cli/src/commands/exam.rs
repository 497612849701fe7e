//! The `ieltsprep exam` command.
//!
//! Lines starting with `/` are commands; anything else is an answer
//! (`<question> <answer>` in reading) or essay text (in writing).

use std::path::PathBuf;

use anyhow::Result;

use ieltsprep_core::content::WRITING_TASK;
use ieltsprep_core::exam::{EvaluationOutcome, ExamResult, ExamSession, TickOutcome};
use ieltsprep_core::gateway::ContentSource;
use ieltsprep_core::model::{ExamStep, QuestionKind};
use ieltsprep_core::orchestrator::{ExamClock, ExamOrchestrator};
use ieltsprep_core::scoring::{format_time, word_count, MIN_ESSAY_WORDS};
use ieltsprep_providers::create_evaluator;

use super::dashboard::table;
use super::{Context, Input};

const HELP: &str = "Commands: /start /finish /submit /show /time /record /quit /help";

const NOT_AVAILABLE: &str = "not available";

pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let ctx = Context::load(config_path.as_deref())?;
    let gateway = ctx.gateway()?;
    let loaded = gateway.load_exam_content(&ctx.config.exam.variant).await;
    if loaded.source == ContentSource::Fallback {
        println!("(Exam content unavailable from {}; using the built-in test.)\n", gateway.store_name());
    }

    let evaluator = create_evaluator(&ctx.config.evaluator)?;
    let session = ExamSession::new(loaded.content, ctx.config.exam.exam_config());
    let mut orch = ExamOrchestrator::new(session, evaluator);
    let mut input = Input::stdin();
    let mut clock = ExamClock::new(orch.session());

    render(orch.session());

    loop {
        clock.sync(orch.session());
        let timed = orch.step().is_timed();
        tokio::select! {
            line = input.line() => {
                let Some(line) = line? else {
                    println!("Input closed; exam abandoned during the {} step.", orch.step());
                    return Ok(());
                };
                if line.is_empty() {
                    continue;
                }
                match handle_line(&mut orch, &line).await {
                    Flow::Continue => {}
                    Flow::Quit => {
                        let session = orch.exit();
                        println!("Exam abandoned during the {} step.", session.step());
                        return Ok(());
                    }
                    Flow::Done(result) => {
                        print_result(&result, ctx.state.theme);
                        return Ok(());
                    }
                }
            }
            _ = clock.tick(), if timed => {
                let report = orch.tick().await;
                match report.tick {
                    TickOutcome::Running(left) if left > 0 && left % 60 == 0 => {
                        println!("[{} left]", format_time(left));
                    }
                    TickOutcome::Expired(section) => {
                        println!("Time is up for {section}. Use /finish when you are ready.");
                    }
                    TickOutcome::Advanced { to, .. } => {
                        println!("Time is up.");
                        if to == ExamStep::Result {
                            let result = orch.session().result()?;
                            print_result(&result, ctx.state.theme);
                            return Ok(());
                        }
                        render(orch.session());
                    }
                    _ => {}
                }
                if let Some(submission) = report.submission {
                    report_submission(&orch, submission);
                }
            }
        }
    }
}

enum Flow {
    Continue,
    Quit,
    Done(ExamResult),
}

async fn handle_line(orch: &mut ExamOrchestrator, line: &str) -> Flow {
    let step = orch.step();
    let command = line.strip_prefix('/').map(|c| c.trim().to_lowercase());

    let outcome = match command.as_deref() {
        Some("quit") => return Flow::Quit,
        Some("help") => {
            println!("{HELP}");
            Ok(())
        }
        Some("show") => {
            render(orch.session());
            Ok(())
        }
        Some("time") => {
            println!("{} left", format_time(orch.session().time_left()));
            Ok(())
        }
        Some("start") => orch.session_mut().start().map(|()| render(orch.session())),
        Some("finish") if step == ExamStep::Speaking => match orch.finish_exam() {
            Ok(result) => return Flow::Done(result),
            Err(e) => Err(e),
        },
        Some("finish") => orch
            .session_mut()
            .finish_section()
            .map(|_| render(orch.session())),
        Some("submit") => {
            println!("Sending your essay to the examiner...");
            let submission = orch.submit_writing().await;
            report_submission(orch, submission);
            Ok(())
        }
        Some("record") => {
            let recording = !orch.session().is_recording();
            orch.session_mut().set_recording(recording).map(|on| {
                if on {
                    println!("Recording... (type /record again to stop)");
                } else {
                    println!("Recording stopped.");
                }
            })
        }
        Some(other) => {
            println!("Unknown command /{other}. {HELP}");
            Ok(())
        }
        None => match step {
            ExamStep::Reading => match parse_answer(line) {
                Some((id, answer)) => orch.session_mut().answer(id, answer),
                None => {
                    println!("Answer as '<question number> <answer>', e.g. '6 pavilions'.");
                    Ok(())
                }
            },
            ExamStep::Writing => orch.session_mut().append_essay(line),
            ExamStep::Intro => orch.session_mut().start().map(|()| render(orch.session())),
            _ => {
                println!("{HELP}");
                Ok(())
            }
        },
    };

    if let Err(e) = outcome {
        println!("  {e}");
    }
    Flow::Continue
}

fn parse_answer(line: &str) -> Option<(u32, &str)> {
    let (id, answer) = line.split_once(char::is_whitespace)?;
    let id = id.trim_end_matches(['.', ':']).parse().ok()?;
    let answer = answer.trim();
    (!answer.is_empty()).then_some((id, answer))
}

fn report_submission(
    orch: &ExamOrchestrator,
    submission: Result<EvaluationOutcome, ieltsprep_core::error::ExamError>,
) {
    match submission {
        Ok(EvaluationOutcome::Scored(assessment)) => {
            println!("Writing band: {:.1}", assessment.score);
            println!("{}\n", assessment.feedback);
            render(orch.session());
        }
        Ok(EvaluationOutcome::Failed(e)) => {
            println!("Failed to reach the AI examiner: {e}");
            println!("Your essay is kept. Try /submit again.");
        }
        Ok(EvaluationOutcome::Stale) => {
            tracing::debug!(session = %orch.session().id(), "examiner reply arrived after the essay moved on");
        }
        Err(e) => println!("  {e}"),
    }
}

fn render(session: &ExamSession) {
    let time = format_time(session.time_left());
    match session.step() {
        ExamStep::Intro => {
            let t = &session.config().timings;
            println!("IELTS mock exam");
            println!(
                "Reading {}m, Listening {}m, Writing {}m, Speaking {}m.",
                t.reading_secs / 60,
                t.listening_secs / 60,
                t.writing_secs / 60,
                t.speaking_secs / 60
            );
            println!("{HELP}");
            println!("Type /start to begin.");
        }
        ExamStep::Reading => {
            let content = session.content();
            println!("== Reading ({time}) ==\n{}\n\n{}\n", content.title, content.text);
            for q in &content.questions {
                let given = session
                    .reading_answers()
                    .get(&q.id)
                    .map(|a| format!(" [{a}]"))
                    .unwrap_or_default();
                println!("{}{given}", q.prompt);
                if let (QuestionKind::MultipleChoice, Some(options)) = (q.kind, &q.options) {
                    println!("   ({})", options.join(" / "));
                }
            }
            println!("\nAnswer with '<number> <answer>'. /finish moves to listening.");
        }
        ExamStep::Listening => {
            println!("== Listening ({time}) ==");
            println!("Audio playback is not available in the terminal. /finish moves to writing.");
        }
        ExamStep::Writing => {
            println!("== Writing ({time}) ==\n{WRITING_TASK}\n");
            let words = word_count(session.writing_text());
            if words > 0 {
                println!("{}\n", session.writing_text());
            }
            println!("{words} words so far (minimum {MIN_ESSAY_WORDS}). Type your essay, then /submit.");
        }
        ExamStep::Speaking => {
            println!("== Speaking ({time}) ==");
            println!("Describe a place you like to visit. /record toggles the recorder, /finish ends the exam.");
        }
        ExamStep::Result => {}
    }
}

fn print_result(result: &ExamResult, theme: ieltsprep_core::model::Theme) {
    let mut table = table(theme);
    table.set_header(vec!["Section", "Band"]);
    table.add_row(vec![
        "Reading".to_string(),
        format!(
            "{:.1} ({}/{} correct)",
            result.reading_band, result.reading_correct, result.reading_total
        ),
    ]);
    table.add_row(vec!["Listening".to_string(), NOT_AVAILABLE.to_string()]);
    table.add_row(vec![
        "Writing".to_string(),
        result
            .writing_band
            .map(|b| format!("{b:.1}"))
            .unwrap_or_else(|| "not graded".to_string()),
    ]);
    table.add_row(vec!["Speaking".to_string(), NOT_AVAILABLE.to_string()]);
    table.add_row(vec![
        "Overall band".to_string(),
        format!("{:.1}", result.overall_band),
    ]);
    println!("\n{table}");
    if let Some(feedback) = &result.writing_feedback {
        println!("Examiner: {feedback}");
    }
}
