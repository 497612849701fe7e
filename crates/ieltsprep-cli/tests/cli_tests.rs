//! CLI integration tests using assert_cmd.
//!
//! Every test runs against a temporary state directory and a local file
//! store with the mock examiner, so nothing touches the network.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const OFFLINE_CONFIG: &str = r#"
[store]
type = "file"

[evaluator]
type = "mock"
score = 6.5
feedback = "Clear position, limited range of vocabulary."
"#;

fn ieltsprep(dir: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("ieltsprep").unwrap();
    cmd.current_dir(dir)
        .env("IELTSPREP_STATE_DIR", dir.join("state"))
        .env_remove("IELTSPREP_GEMINI_KEY")
        .env_remove("IELTSPREP_FIREBASE_KEY")
        .env_remove("RUST_LOG");
    cmd
}

fn workspace(config: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("ieltsprep.toml"), config).unwrap();
    dir
}

fn guest_login(dir: &Path, name: &str) {
    ieltsprep(dir)
        .args(["login", "--method", "guest", "--name", name])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Signed in as {name} (guest)")))
        .stdout(predicate::str::contains("ieltsprep onboard"));
}

// Name, reason, first time, target, hardest part, exam date, daily time.
const ONBOARDING_SCRIPT: &str = "Alex\n2\n1\n7.5\n3\n1\n3\n";

#[test]
fn init_creates_config() {
    let dir = TempDir::new().unwrap();

    ieltsprep(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created ieltsprep.toml"));
    assert!(dir.path().join("ieltsprep.toml").exists());

    ieltsprep(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn theme_toggles_and_persists() {
    let dir = TempDir::new().unwrap();

    ieltsprep(dir.path())
        .arg("theme")
        .assert()
        .success()
        .stdout(predicate::str::contains("Theme: dark"));
    ieltsprep(dir.path())
        .arg("theme")
        .assert()
        .success()
        .stdout(predicate::str::contains("Theme: light"));
    ieltsprep(dir.path())
        .args(["theme", "dark"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Theme: dark"));
}

#[test]
fn practice_lesson_scores_answers() {
    let dir = TempDir::new().unwrap();

    ieltsprep(dir.path())
        .arg("practice")
        .write_stdin("\n2\n3\n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("The Great Barrier Reef"))
        .stdout(predicate::str::contains("Score: 2/2"));
}

#[test]
fn practice_back_from_passage_leaves() {
    let dir = TempDir::new().unwrap();

    ieltsprep(dir.path())
        .arg("practice")
        .write_stdin("back\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Left the lesson."));
}

#[test]
fn practice_wrong_answer_is_marked() {
    let dir = TempDir::new().unwrap();

    ieltsprep(dir.path())
        .arg("practice")
        .write_stdin("\n1\n3\n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 1/2"))
        .stdout(predicate::str::contains("1. wrong"));
}

#[test]
fn dashboard_requires_login() {
    let dir = workspace(OFFLINE_CONFIG);

    ieltsprep(dir.path())
        .arg("dashboard")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not signed in"));
}

#[test]
fn dashboard_requires_onboarding() {
    let dir = workspace(OFFLINE_CONFIG);
    guest_login(dir.path(), "Alex");

    ieltsprep(dir.path())
        .arg("dashboard")
        .assert()
        .failure()
        .stderr(predicate::str::contains("finish onboarding first"));
}

#[test]
fn onboarding_then_dashboard() {
    let dir = workspace(OFFLINE_CONFIG);
    guest_login(dir.path(), "Alex");

    ieltsprep(dir.path())
        .arg("onboard")
        .write_stdin(ONBOARDING_SCRIPT)
        .assert()
        .success()
        .stdout(predicate::str::contains("All set, Alex! Target band 7.5."));

    ieltsprep(dir.path())
        .arg("dashboard")
        .assert()
        .success()
        .stdout(predicate::str::contains("Hello, Alex!"))
        .stdout(predicate::str::contains("Listening"));

    ieltsprep(dir.path())
        .args(["dashboard", "--view", "stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Target band"))
        .stdout(predicate::str::contains("7.5"));

    ieltsprep(dir.path())
        .arg("onboard")
        .assert()
        .success()
        .stdout(predicate::str::contains("already completed"));
}

#[test]
fn onboarding_back_and_cancel() {
    let dir = workspace(OFFLINE_CONFIG);
    guest_login(dir.path(), "Alex");

    ieltsprep(dir.path())
        .arg("onboard")
        .write_stdin("Alex\nback\nSam\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("onboarding cancelled"));

    ieltsprep(dir.path())
        .arg("dashboard")
        .assert()
        .failure()
        .stderr(predicate::str::contains("finish onboarding first"));
}

#[test]
fn settings_rename_and_logout() {
    let dir = workspace(OFFLINE_CONFIG);
    guest_login(dir.path(), "Alex");

    ieltsprep(dir.path())
        .args(["settings", "--name", "Sam"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Name updated to Sam."))
        .stdout(predicate::str::contains("Sign-in: guest"));

    ieltsprep(dir.path())
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed out."));
    ieltsprep(dir.path())
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not signed in."));
}

#[test]
fn google_login_requires_token() {
    let dir = workspace(OFFLINE_CONFIG);

    ieltsprep(dir.path())
        .args(["login", "--method", "google"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--id-token"));
}

#[test]
fn exam_runs_to_result_with_mock_examiner() {
    let dir = workspace(OFFLINE_CONFIG);
    let script = "/start\n\
        1 False\n\
        2 True\n\
        3 Not Given\n\
        6 pavilions\n\
        7 Drought\n\
        /finish\n\
        /finish\n\
        Universities should teach practical skills as well as academic knowledge.\n\
        Graduates then find work more easily.\n\
        /submit\n\
        /record\n\
        /record\n\
        /finish\n";

    ieltsprep(dir.path())
        .arg("exam")
        .write_stdin(script)
        .assert()
        .success()
        .stdout(predicate::str::contains("== Reading"))
        .stdout(predicate::str::contains("== Writing"))
        .stdout(predicate::str::contains("Writing band: 6.5"))
        .stdout(predicate::str::contains("== Speaking"))
        .stdout(predicate::str::contains("5/13 correct"))
        .stdout(predicate::str::is_match(r"Listening\s*.\s*not available").unwrap())
        .stdout(predicate::str::is_match(r"Speaking\s*.\s*not available").unwrap())
        .stdout(predicate::str::contains("Overall band"))
        .stdout(predicate::str::contains("5.8"));
}

#[test]
fn exam_rejects_short_essay_and_stays_in_writing() {
    let dir = workspace(OFFLINE_CONFIG);
    let script = "/start\n/finish\n/finish\nToo short.\n/submit\n/quit\n";

    ieltsprep(dir.path())
        .arg("exam")
        .write_stdin(script)
        .assert()
        .success()
        .stdout(predicate::str::contains("at least 10"))
        .stdout(predicate::str::contains("abandoned during the writing step"));
}

#[test]
fn exam_without_gemini_key_keeps_essay() {
    let config = r#"
[store]
type = "memory"

[evaluator]
type = "gemini"
api_key = ""
"#;
    let dir = workspace(config);
    let script = "/start\n/finish\n/finish\n\
        Universities should teach practical skills as well as academic knowledge.\n\
        /submit\n/quit\n";

    ieltsprep(dir.path())
        .arg("exam")
        .write_stdin(script)
        .assert()
        .success()
        .stdout(predicate::str::contains("Failed to reach the AI examiner"))
        .stdout(predicate::str::contains("Your essay is kept"))
        .stdout(predicate::str::contains("abandoned during the writing step"));
}

#[test]
fn exam_commands_are_step_checked() {
    let dir = workspace(OFFLINE_CONFIG);

    ieltsprep(dir.path())
        .arg("exam")
        .write_stdin("/record\n/bogus\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Unknown command /bogus"))
        .stdout(predicate::str::contains("exam abandoned during the intro step"));
}
