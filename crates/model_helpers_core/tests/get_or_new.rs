mod common;

use chrono::{TimeZone, Utc};
use common::{open_test_db, Episode, LooseEpisode};
use model_helpers_core::{
    FieldError, FieldValue, FixedClock, GetOrNew, Lookup, ModelRepository, RepoError, SqliteModelRepository,
    Timestamped,
};

fn stamped_episode(show: &str, number: i64, title: &str) -> Episode {
    let mut episode = Episode {
        show: show.to_string(),
        number,
        title: Some(title.to_string()),
        ..Episode::default()
    };
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap());
    episode
        .add_timestamps_with_clock(&Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(), &clock)
        .unwrap();
    episode
}

#[test]
fn no_match_returns_unsaved_prepopulated_record() {
    let conn = open_test_db();
    let repo = SqliteModelRepository::<Episode>::new(&conn);

    let lookup = Lookup::new().with("show", "Severance").with("number", 3_i64);
    let (episode, created) = repo.get_or_new(&lookup).unwrap();

    assert!(created);
    assert_eq!(episode.id, None);
    assert_eq!(episode.show, "Severance");
    assert_eq!(episode.number, 3);
    assert_eq!(episode.title, None);
    assert!(episode.is_outdated(None, None));
    assert!(repo.filter(&Lookup::new()).unwrap().is_empty());
}

#[test]
fn single_match_returns_existing_record() {
    let conn = open_test_db();
    let repo = SqliteModelRepository::<Episode>::new(&conn);
    let mut stored = stamped_episode("Severance", 3, "In Perpetuity");
    repo.save(&mut stored).unwrap();

    let lookup = Lookup::new().with("show", "Severance").with("number", 3_i64);
    let (episode, created) = repo.get_or_new(&lookup).unwrap();

    assert!(!created);
    assert_eq!(episode, stored);
}

#[test]
fn new_record_can_be_completed_then_saved() {
    let conn = open_test_db();
    let repo = SqliteModelRepository::<Episode>::new(&conn);
    let lookup = Lookup::new().with("show", "Andor").with("number", 1_i64);

    let (mut episode, created) = repo.get_or_new(&lookup).unwrap();
    assert!(created);
    episode.title = Some("Kassa".to_string());
    episode
        .add_timestamps_and_save(&Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(), &repo)
        .unwrap();

    let (again, created_again) = repo.get_or_new(&lookup).unwrap();
    assert!(!created_again);
    assert_eq!(again.id, episode.id);
    assert_eq!(again.title.as_deref(), Some("Kassa"));
}

#[test]
fn multiple_matches_are_an_error() {
    let conn = open_test_db();
    let repo = SqliteModelRepository::<LooseEpisode>::new(&conn);
    for title in ["Pilot", "Pilot (recut)"] {
        let mut duplicate = LooseEpisode(stamped_episode("Andor", 1, title));
        repo.save(&mut duplicate).unwrap();
    }

    let err = repo
        .get_or_new(&Lookup::new().with("show", "Andor").with("number", 1_i64))
        .unwrap_err();

    assert!(matches!(
        err,
        RepoError::MultipleObjectsReturned {
            model: "LooseEpisode",
            count: 2
        }
    ));
}

#[test]
fn lookup_with_id_sets_primary_key_on_new_record() {
    let conn = open_test_db();
    let repo = SqliteModelRepository::<Episode>::new(&conn);

    let (episode, created) = repo
        .get_or_new(&Lookup::new().with("id", 42_i64).with("show", "Andor"))
        .unwrap();

    assert!(created);
    assert_eq!(episode.id, Some(42));
    assert_eq!(episode.show, "Andor");
}

#[test]
fn null_id_lookup_returns_unsaved_record_without_id() {
    let conn = open_test_db();
    let repo = SqliteModelRepository::<Episode>::new(&conn);
    let mut stored = stamped_episode("Andor", 1, "Kassa");
    repo.save(&mut stored).unwrap();

    let (episode, created) = repo
        .get_or_new(
            &Lookup::new()
                .with("id", FieldValue::Null)
                .with("show", "Andor"),
        )
        .unwrap();

    assert!(created);
    assert_eq!(episode.id, None);
    assert_eq!(episode.show, "Andor");
}

#[test]
fn unknown_lookup_field_is_rejected() {
    let conn = open_test_db();
    let repo = SqliteModelRepository::<Episode>::new(&conn);

    let err = repo
        .get_or_new(&Lookup::new().with("season", 2_i64))
        .unwrap_err();

    assert!(matches!(
        err,
        RepoError::Field(FieldError::UnknownField { model: "Episode", ref field }) if field == "season"
    ));
}
