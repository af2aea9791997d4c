use chrono::Local;
use glossa::store::{NewWord, VocabDb};

/// Daily-session lifecycle and the aggregates computed over it.

#[test]
fn one_session_per_day_no_matter_how_often_started() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = VocabDb::open(dir.path().join("vocab.db")).unwrap();

    let ids: Vec<i64> = (0..5)
        .map(|_| db.start_or_get_todays_session().unwrap())
        .collect();
    assert!(ids.iter().all(|&id| id == ids[0]));

    let session = db.session(ids[0]).unwrap().unwrap();
    assert_eq!(session.date, Local::now().date_naive());
    assert!(!session.completed);
}

#[test]
fn idempotence_holds_across_database_reopens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vocab.db");

    let first = {
        let mut db = VocabDb::open(&path).unwrap();
        db.start_or_get_todays_session().unwrap()
    };
    let second = {
        let mut db = VocabDb::open(&path).unwrap();
        db.start_or_get_todays_session().unwrap()
    };
    assert_eq!(first, second);
}

#[test]
fn finalized_session_flows_into_user_stats() {
    let mut db = VocabDb::open_in_memory().unwrap();
    let id = db.add_word(&NewWord::new("candid", "Frank")).unwrap();

    let session = db.start_or_get_todays_session().unwrap();
    db.record_answer(id, true, 1.0).unwrap();
    db.finalize_session(session, 1, 100.0).unwrap();

    let stats = db.user_stats().unwrap();
    assert_eq!(stats.words_attempted, 1);
    assert_eq!(stats.sessions_last_7_days, 1);
    assert_eq!(stats.average_session_score, 100.0);

    // Re-finalizing with a new score replaces the old one (last write wins)
    db.finalize_session(session, 1, 50.0).unwrap();
    let stats = db.user_stats().unwrap();
    assert_eq!(stats.average_session_score, 50.0);
}

#[test]
fn incomplete_sessions_do_not_count_toward_averages() {
    let mut db = VocabDb::open_in_memory().unwrap();

    db.start_or_get_todays_session().unwrap();
    let stats = db.user_stats().unwrap();
    assert_eq!(stats.sessions_last_7_days, 0);
    assert_eq!(stats.average_session_score, 0.0);
}
