mod common;

use common::{store_with, ORIGIN};
use solarsite::engine::Engine;
use solarsite::persist::SqliteStore;
use solarsite::record::{Field, NewRecord};
use solarsite::settings::Limits;
use solarsite::SolarError;

/// A parcel with every attribute set, `spread` shifting all of them together.
fn complete(address: &str, lat: f64, lon: f64, spread: f64) -> NewRecord {
    NewRecord::new(address, lat, lon)
        .with(Field::AnnualGhi, 5.0 + spread * 0.1)
        .with(Field::AnnualTilt, 25.0 + spread)
        .with(Field::GridDistance, 1.0 + spread)
        .with(Field::SolarScore, 70.0 + spread * 2.0)
        .with(Field::Area, 10.0 + spread * 3.0)
        .with(Field::Slope, 2.0 + spread * 0.5)
        .with(Field::SolarDayLength, 12.0 + spread * 0.05)
}

fn setup() -> SqliteStore {
    store_with(vec![
        complete("1 Reference Rd, Homestead, FL", ORIGIN.0, ORIGIN.1, 0.0),
        complete("2 Twin Rd, Homestead, FL", ORIGIN.0 + 0.01, ORIGIN.1, 0.2),
        complete("3 Distant Ave, Pensacola, FL", 30.4, -87.2, 9.0),
        complete("4 Middle Way, Sebring, FL", 27.5, -81.4, 4.0),
        NewRecord::new("5 Partial Ln, Naples, FL", 26.1, -81.8).with(Field::SolarScore, 70.0),
    ])
}

#[test]
fn get_returns_every_stored_attribute() {
    let store = setup();
    let limits = Limits::default();
    let engine = Engine::new(&store, &limits);
    let record = engine.get(2).expect("record 2 exists");
    assert_eq!(record.address, "2 Twin Rd, Homestead, FL");
    assert_eq!(record.attributes.len(), Field::ATTRIBUTES.len());
    assert!((record.value(Field::SolarScore).unwrap() - 70.4).abs() < 1e-9);

    let partial = engine.get(5).expect("record 5 exists");
    assert_eq!(partial.value(Field::Slope), None);
    assert_eq!(partial.value(Field::Id), Some(5.0));
}

#[test]
fn unknown_id_is_not_found_rather_than_a_bad_request() {
    let store = setup();
    let limits = Limits::default();
    let engine = Engine::new(&store, &limits);
    let err = engine.get(999).unwrap_err();
    assert!(matches!(err, SolarError::NotFound(999)));
    assert!(!err.is_client_error());
}

#[test]
fn search_matches_address_substrings_in_id_order() {
    let store = setup();
    let limits = Limits::default();
    let engine = Engine::new(&store, &limits);
    let homestead: Vec<i64> = engine
        .search("homestead", None)
        .expect("search ok")
        .iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(homestead, vec![1, 2]);

    let limited = engine.search("FL", Some(3)).expect("search ok");
    assert_eq!(limited.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2, 3]);

    assert!(engine.search("Tallahassee", None).expect("search ok").is_empty());
}

#[test]
fn blank_search_lists_everything() {
    let store = setup();
    let limits = Limits::default();
    let engine = Engine::new(&store, &limits);
    assert_eq!(engine.search("", None).expect("search ok").len(), 5);
}

#[test]
fn similar_ranks_by_standardised_distance() {
    let store = setup();
    let limits = Limits::default();
    let engine = Engine::new(&store, &limits);
    let neighbors = engine.similar(1, Some(2)).expect("similar ok");
    let ids: Vec<i64> = neighbors.iter().map(|n| n.record.id).collect();
    assert_eq!(ids, vec![2, 4]);
    assert!(neighbors[0].dissimilarity < neighbors[1].dissimilarity);
}

#[test]
fn similar_excludes_the_reference_and_incomplete_records() {
    let store = setup();
    let limits = Limits::default();
    let engine = Engine::new(&store, &limits);
    // default k is 3 and only three other complete records exist
    let ids: Vec<i64> = engine
        .similar(1, None)
        .expect("similar ok")
        .iter()
        .map(|n| n.record.id)
        .collect();
    assert_eq!(ids, vec![2, 4, 3]);
}

#[test]
fn similar_needs_a_complete_reference() {
    let store = setup();
    let limits = Limits::default();
    let engine = Engine::new(&store, &limits);
    assert!(matches!(engine.similar(5, None), Err(SolarError::InvalidParameter(_))));
    assert!(matches!(engine.similar(42, None), Err(SolarError::NotFound(42))));
}
