//! Store integration tests: add-location flow, connection edits, error messages.

use std::fs;

use assert_fs::prelude::*;
use endevor_core::{
    store::{self, AddLocationOutcome, ConnectionUpdate, LocationChoice},
    EndevorConnection, EndevorId, SearchLocation, ServiceLocation, Source, StoreError,
};
use predicates::prelude::predicate;
use rstest::rstest;

fn connection(url: &str) -> EndevorConnection {
    EndevorConnection {
        location: ServiceLocation::from_service_url(url).expect("url"),
        reject_unauthorized: false,
    }
}

fn add_service(home: &assert_fs::TempDir, name: &str) {
    store::add_service_at(
        home.path(),
        EndevorId::internal(name),
        connection("http://mf.example.com:8080/EndevorService/api/v2"),
    )
    .expect("add service");
}

// ---------------------------------------------------------------------------
// 1. Add search location
// ---------------------------------------------------------------------------

#[test]
fn single_service_is_picked_when_none_given() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    add_service(&home, "prod");

    let added = store::add_search_location_at(
        home.path(),
        None,
        LocationChoice::Create {
            name: "dev1".to_owned(),
            location: SearchLocation::new("DEV", "1"),
        },
    )
    .expect("add location");

    assert_eq!(added.service_id, EndevorId::internal("prod"));
    assert_eq!(added.search_location_id, EndevorId::internal("dev1"));
    assert_eq!(added.outcome, AddLocationOutcome::Created);

    let service = store::load_service_at(home.path(), "prod").expect("load");
    assert_eq!(service.search_locations, vec!["dev1".to_owned()]);
}

#[rstest]
#[case::no_services(&[])]
#[case::many_services(&["prod", "test"])]
fn service_must_be_named_unless_exactly_one(#[case] services: &[&str]) {
    let home = assert_fs::TempDir::new().expect("tempdir");
    for name in services {
        add_service(&home, name);
    }

    let err = store::add_search_location_at(
        home.path(),
        None,
        LocationChoice::Existing("dev1".to_owned()),
    )
    .unwrap_err();

    match err {
        StoreError::ServiceNotSpecified { available } => assert_eq!(available, services),
        other => panic!("expected ServiceNotSpecified, got {other:?}"),
    }
}

#[test]
fn existing_location_reports_other_services_using_it() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    add_service(&home, "prod");
    add_service(&home, "test");

    store::add_search_location_at(
        home.path(),
        Some("prod"),
        LocationChoice::Create {
            name: "dev1".to_owned(),
            location: SearchLocation::new("DEV", "1"),
        },
    )
    .expect("create");

    let added = store::add_search_location_at(
        home.path(),
        Some("test"),
        LocationChoice::Existing("dev1".to_owned()),
    )
    .expect("attach");
    assert_eq!(
        added.outcome,
        AddLocationOutcome::UsedExistingLocation { in_use_by: 1 }
    );
    assert_eq!(
        store::services_using_location_at(home.path(), "dev1")
            .expect("services")
            .len(),
        2
    );
}

#[test]
fn unused_existing_location_attaches_once() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    add_service(&home, "prod");
    store::create_search_location_at(home.path(), "qa", SearchLocation::new("QA", "2"))
        .expect("create");

    for _ in 0..2 {
        let added = store::add_search_location_at(
            home.path(),
            Some("prod"),
            LocationChoice::Existing("qa".to_owned()),
        )
        .expect("attach");
        assert_eq!(added.outcome, AddLocationOutcome::UnusedExistingLocation);
    }

    let service = store::load_service_at(home.path(), "prod").expect("load");
    assert_eq!(service.search_locations, vec!["qa".to_owned()]);
}

#[test]
fn creating_a_taken_location_name_fails() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    store::create_search_location_at(home.path(), "dev1", SearchLocation::new("DEV", "1"))
        .expect("create");
    let err =
        store::create_search_location_at(home.path(), "dev1", SearchLocation::new("DEV", "2"))
            .unwrap_err();
    assert!(matches!(err, StoreError::LocationExists { .. }), "got: {err}");
    assert_eq!(
        store::search_location_names_at(home.path()).expect("names"),
        vec!["dev1".to_owned()]
    );
}

#[test]
fn attaching_unknown_location_fails() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    add_service(&home, "prod");
    let err = store::add_search_location_at(
        home.path(),
        Some("prod"),
        LocationChoice::Existing("missing".to_owned()),
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "search location 'missing' not found");
}

#[test]
fn failed_attach_removes_the_location_it_created() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    add_service(&home, "prod");
    // a directory where the service's temp file goes makes the re-save fail
    let blocker = home.child(".endevor/services/prod.yaml.tmp");
    blocker.create_dir_all().expect("blocker dir");

    let create = || LocationChoice::Create {
        name: "dev1".to_owned(),
        location: SearchLocation::new("DEV", "1"),
    };
    store::add_search_location_at(home.path(), Some("prod"), create()).unwrap_err();
    home.child(".endevor/locations/dev1.yaml")
        .assert(predicate::path::missing());

    fs::remove_dir(blocker.path()).expect("remove blocker");
    let added = store::add_search_location_at(home.path(), Some("prod"), create())
        .expect("retry succeeds");
    assert_eq!(added.outcome, AddLocationOutcome::Created);
}

#[rstest]
#[case::parent_dir("../outside")]
#[case::nested("a/b")]
#[case::hidden(".hidden")]
fn loads_refuse_names_that_escape_the_store(#[case] name: &str) {
    let home = assert_fs::TempDir::new().expect("tempdir");
    home.child("outside.yaml").write_str("not: a service\n").expect("write");

    let err = store::load_service_at(home.path(), name).unwrap_err();
    assert!(matches!(err, StoreError::InvalidName(_)), "got: {err}");
    let err = store::load_search_location_at(home.path(), name).unwrap_err();
    assert!(matches!(err, StoreError::InvalidName(_)), "got: {err}");
}

// ---------------------------------------------------------------------------
// 2. Edit connection details
// ---------------------------------------------------------------------------

#[test]
fn internal_service_connection_is_stored() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    add_service(&home, "prod");

    let edited = connection("https://new.example.com:9443/api");
    let update = store::edit_connection_at(home.path(), "prod", edited.clone()).expect("edit");
    assert!(matches!(update, ConnectionUpdate::Stored(_)));

    let service = store::load_service_at(home.path(), "prod").expect("load");
    assert_eq!(service.connection, edited);
}

#[test]
fn synchronized_service_connection_is_session_only() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let original = connection("http://mf.example.com:8080/api");
    store::add_service_at(
        home.path(),
        EndevorId::new("shared", Source::Synchronized),
        original.clone(),
    )
    .expect("add");

    let edited = connection("https://new.example.com:9443/api");
    let update = store::edit_connection_at(home.path(), "shared", edited.clone()).expect("edit");
    assert_eq!(update, ConnectionUpdate::Session(edited));

    let service = store::load_service_at(home.path(), "shared").expect("load");
    assert_eq!(service.connection, original, "store must stay untouched");
}

#[test]
fn editing_unknown_service_fails() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let err = store::edit_connection_at(home.path(), "nope", connection("http://h"))
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { kind: "service", .. }));
}

// ---------------------------------------------------------------------------
// 3. Load error messages
// ---------------------------------------------------------------------------

#[test]
fn corrupt_service_yaml_returns_parse_error_with_path() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let dir = home.path().join(".endevor").join("services");
    fs::create_dir_all(&dir).expect("mkdir");
    fs::write(dir.join("prod.yaml"), b": : corrupt : yaml : !!!\n  - broken: [unclosed")
        .expect("write");

    let err = store::load_service_at(home.path(), "prod").unwrap_err();
    assert!(matches!(err, StoreError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("prod.yaml"));

    let err = store::list_services_at(home.path()).unwrap_err();
    assert!(matches!(err, StoreError::Parse { .. }), "got: {err}");
}

#[test]
fn list_is_sorted_and_empty_when_no_store() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    assert!(store::list_services_at(home.path()).expect("list").is_empty());

    add_service(&home, "zeta");
    add_service(&home, "alpha");
    let names: Vec<_> = store::list_services_at(home.path())
        .expect("list")
        .into_iter()
        .map(|s| s.id.name)
        .collect();
    assert_eq!(names, ["alpha", "zeta"]);
}

#[test]
fn service_file_lands_in_services_dir() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    add_service(&home, "prod");
    home.child(".endevor/services/prod.yaml")
        .assert(predicate::path::is_file());
    home.child(".endevor/services/prod.yaml")
        .assert(predicate::str::contains("EndevorService/api/v2"));
    home.child(".endevor/services/prod.yaml.tmp")
        .assert(predicate::path::missing());
}
