// Smoke tests driving the compiled binary against a throwaway database.
// No TTY needed: every exercised subcommand is non-interactive.

use std::process::{Command, Output};

fn glossa(dir: &tempfile::TempDir, args: &[&str]) -> Output {
    let bin = assert_cmd::cargo::cargo_bin("glossa");
    let db = dir.path().join("vocab.db");
    Command::new(bin)
        .arg("--db")
        .arg(&db)
        .args(args)
        .output()
        .expect("failed to run glossa binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn add_then_stats_runs_clean() {
    let dir = tempfile::tempdir().unwrap();

    let added = glossa(&dir, &["add", "laconic", "Using very few words"]);
    assert!(added.status.success(), "stderr: {}", stderr(&added));
    assert!(stdout(&added).contains("added 'laconic'"));

    let stats = glossa(&dir, &["stats"]);
    assert!(stats.status.success());
    assert!(stdout(&stats).contains("words practiced"));
}

#[test]
fn duplicate_add_fails_with_a_clear_message() {
    let dir = tempfile::tempdir().unwrap();

    let first = glossa(&dir, &["add", "laconic", "Using very few words"]);
    assert!(first.status.success());

    let second = glossa(&dir, &["add", "laconic", "Another definition"]);
    assert!(!second.status.success());
    assert!(stderr(&second).contains("already in the vocabulary"));
}

#[test]
fn learn_prints_the_starter_batch_and_records_a_session() {
    let dir = tempfile::tempdir().unwrap();

    // First run seeds the starter vocabulary
    let learn = glossa(&dir, &["learn", "-n", "3"]);
    assert!(learn.status.success(), "stderr: {}", stderr(&learn));
    assert!(stdout(&learn).contains("studied 3 words today"));

    let stats = glossa(&dir, &["stats"]);
    assert!(stats.status.success());
    assert!(stdout(&stats).contains("sessions (7 days): 1"));
}

#[test]
fn quiz_with_closed_stdin_records_no_answers() {
    let dir = tempfile::tempdir().unwrap();

    // Seed the starter vocabulary
    let learn = glossa(&dir, &["learn", "-n", "1"]);
    assert!(learn.status.success(), "stderr: {}", stderr(&learn));

    // stdin is closed, so the quiz must end before grading anything
    let quiz = glossa(&dir, &["quiz", "-n", "3"]);
    assert!(quiz.status.success(), "stderr: {}", stderr(&quiz));
    assert!(stdout(&quiz).contains("quiz ended before any answers were given"));

    // No answer was fabricated: nothing has an attempt on record
    let review = glossa(&dir, &["review"]);
    assert!(review.status.success());
    assert!(stdout(&review).contains("no words to review yet"));
}

#[test]
fn review_before_any_practice_says_so() {
    let dir = tempfile::tempdir().unwrap();

    let review = glossa(&dir, &["review"]);
    assert!(review.status.success());
    assert!(stdout(&review).contains("no words to review yet"));
}

#[test]
fn export_writes_a_csv_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("results.csv");

    let export = glossa(&dir, &["export", out.to_str().unwrap()]);
    assert!(export.status.success(), "stderr: {}", stderr(&export));
    assert!(stdout(&export).contains("exported 0 quiz results"));

    let contents = std::fs::read_to_string(&out).unwrap();
    assert!(contents.starts_with("word,answered_at,was_correct,response_time_secs"));
}
