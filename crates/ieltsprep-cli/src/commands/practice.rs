//! The `ieltsprep practice` command.

use anyhow::Result;

use ieltsprep_core::content::practice_lesson;
use ieltsprep_core::practice::{Navigation, PracticeSession, PracticeStep};

use super::{parse_choice, print_options, Input};

pub async fn execute() -> Result<()> {
    let mut session = PracticeSession::new(practice_lesson());
    let mut input = Input::stdin();

    println!("{} ({} practice)", session.lesson().title, session.lesson().section);
    println!("Enter continues, 'back' goes back.\n");

    loop {
        render(&session);
        let Some(line) = input.ask("> ").await? else {
            println!("Practice session ended.");
            return Ok(());
        };

        if line.eq_ignore_ascii_case("back") {
            if session.back() == Navigation::Exit {
                println!("Left the lesson.");
                return Ok(());
            }
            continue;
        }

        match session.step() {
            PracticeStep::Passage => {
                session.next();
            }
            PracticeStep::Question(_) => {
                if line.is_empty() {
                    session.next();
                    continue;
                }
                let Some(question) = session.current_question() else {
                    continue;
                };
                let (id, count) = (question.id, question.options.len());
                match parse_choice(&line, count) {
                    Some(option) => match session.select(id, option) {
                        Ok(()) => {
                            session.next();
                        }
                        Err(e) => println!("  {e}"),
                    },
                    None => println!("  Pick a number between 1 and {count}."),
                }
            }
            PracticeStep::Review => match session.finish() {
                Ok(score) => {
                    println!("\nScore: {}/{}", score.correct, score.total);
                    for q in &session.lesson().questions {
                        let mark = if session.is_correct(q.id) == Some(true) {
                            "correct"
                        } else {
                            "wrong"
                        };
                        let answer = q.options.get(q.correct_option).map_or("", String::as_str);
                        println!("  {}. {mark} (answer: {answer})", q.id);
                    }
                    return Ok(());
                }
                Err(e) => println!("  {e}"),
            },
        }
    }
}

fn render(session: &PracticeSession) {
    match session.step() {
        PracticeStep::Passage => {
            println!("{}\n", session.lesson().text);
        }
        PracticeStep::Question(i) => {
            if let Some(q) = session.current_question() {
                println!(
                    "Question {}/{}: {}",
                    i + 1,
                    session.lesson().questions.len(),
                    q.prompt
                );
                print_options(q.options.iter().map(String::as_str), session.answer(q.id));
            }
        }
        PracticeStep::Review => {
            let total = session.lesson().questions.len();
            println!(
                "Review: {}/{} answered. Press Enter to finish.",
                session.answered(),
                total
            );
        }
    }
}
