mod common;

use chrono::{TimeZone, Utc};
use common::{open_test_db, Episode, LooseEpisode};
use model_helpers_core::repo::model_repo::MAX_GET_RESULTS;
use model_helpers_core::{
    DbError, FieldValue, InfoTimestamps, Lookup, ModelRepository, RepoError,
    SqliteModelRepository,
};

fn episode(show: &str, number: i64) -> Episode {
    let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    Episode {
        show: show.to_string(),
        number,
        timestamps: InfoTimestamps::new(at, at),
        ..Episode::default()
    }
}

#[test]
fn save_assigns_ids_and_get_reads_back() {
    let conn = open_test_db();
    let repo = SqliteModelRepository::<Episode>::new(&conn);

    let mut first = episode("Andor", 1);
    let mut second = episode("Andor", 2);
    let first_id = repo.save(&mut first).unwrap();
    let second_id = repo.save(&mut second).unwrap();

    assert_eq!(first.id, Some(first_id));
    assert_ne!(first_id, second_id);

    let loaded = repo.get(&Lookup::new().with("id", second_id)).unwrap();
    assert_eq!(loaded, second);
}

#[test]
fn save_updates_existing_row() {
    let conn = open_test_db();
    let repo = SqliteModelRepository::<Episode>::new(&conn);

    let mut record = episode("Andor", 1);
    let id = repo.save(&mut record).unwrap();
    record.title = Some("Kassa".to_string());
    assert_eq!(repo.save(&mut record).unwrap(), id);

    let all = repo.filter(&Lookup::new()).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].title.as_deref(), Some("Kassa"));
}

#[test]
fn save_with_unknown_id_inserts_that_id() {
    let conn = open_test_db();
    let repo = SqliteModelRepository::<Episode>::new(&conn);

    let mut record = episode("Andor", 1);
    record.id = Some(77);
    assert_eq!(repo.save(&mut record).unwrap(), 77);
    assert_eq!(repo.get(&Lookup::new().with("id", 77_i64)).unwrap(), record);
}

#[test]
fn get_reports_missing_record() {
    let conn = open_test_db();
    let repo = SqliteModelRepository::<Episode>::new(&conn);

    let err = repo.get(&Lookup::new().with("show", "Nope")).unwrap_err();
    assert!(matches!(err, RepoError::DoesNotExist { model: "Episode" }));
    assert_eq!(err.to_string(), "Episode matching query does not exist");
}

#[test]
fn get_caps_the_reported_match_count() {
    let conn = open_test_db();
    let repo = SqliteModelRepository::<LooseEpisode>::new(&conn);
    for _ in 0..(MAX_GET_RESULTS + 4) {
        repo.save(&mut LooseEpisode(episode("Andor", 1))).unwrap();
    }

    let err = repo.get(&Lookup::new().with("show", "Andor")).unwrap_err();
    assert!(matches!(
        err,
        RepoError::MultipleObjectsReturned { count, .. } if count == MAX_GET_RESULTS
    ));
}

#[test]
fn empty_lookup_gets_the_only_record() {
    let conn = open_test_db();
    let repo = SqliteModelRepository::<Episode>::new(&conn);
    let mut only = episode("Andor", 1);
    repo.save(&mut only).unwrap();

    assert_eq!(repo.get(&Lookup::new()).unwrap(), only);
}

#[test]
fn null_lookup_matches_missing_values() {
    let conn = open_test_db();
    let repo = SqliteModelRepository::<Episode>::new(&conn);
    let mut untitled = episode("Andor", 1);
    let mut titled = episode("Andor", 2);
    titled.title = Some("Kassa".to_string());
    repo.save(&mut untitled).unwrap();
    repo.save(&mut titled).unwrap();

    let found = repo
        .get(&Lookup::new().with("title", FieldValue::Null))
        .unwrap();
    assert_eq!(found.number, 1);
}

#[test]
fn filter_orders_by_id() {
    let conn = open_test_db();
    let repo = SqliteModelRepository::<Episode>::new(&conn);
    for number in [3, 1, 2] {
        repo.save(&mut episode("Andor", number)).unwrap();
    }

    let numbers: Vec<i64> = repo
        .filter(&Lookup::new().with("show", "Andor"))
        .unwrap()
        .into_iter()
        .map(|record| record.number)
        .collect();
    assert_eq!(numbers, [3, 1, 2]);
}

#[test]
fn unique_constraint_is_enforced_by_storage() {
    let conn = open_test_db();
    let repo = SqliteModelRepository::<Episode>::new(&conn);
    repo.save(&mut episode("Andor", 1)).unwrap();

    let err = repo.save(&mut episode("Andor", 1)).unwrap_err();
    assert!(matches!(err, RepoError::Db(DbError::Sqlite(_))));
}

#[test]
fn saving_unstamped_record_fails() {
    let conn = open_test_db();
    let repo = SqliteModelRepository::<Episode>::new(&conn);
    let mut record = Episode {
        show: "Andor".to_string(),
        number: 1,
        ..Episode::default()
    };

    assert!(repo.save(&mut record).is_err());
    assert_eq!(record.id, None);
}

#[test]
fn delete_removes_and_reports_missing() {
    let conn = open_test_db();
    let repo = SqliteModelRepository::<Episode>::new(&conn);
    let id = repo.save(&mut episode("Andor", 1)).unwrap();

    repo.delete(id).unwrap();
    assert!(repo.filter(&Lookup::new()).unwrap().is_empty());
    assert!(matches!(
        repo.delete(id).unwrap_err(),
        RepoError::DoesNotExist { .. }
    ));
}
