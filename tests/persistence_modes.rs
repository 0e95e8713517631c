use solarsite::filter::Predicate;
use solarsite::persist::{PersistenceMode, SqliteStore};
use solarsite::record::{Field, NewRecord};
use solarsite::store::RecordStore;
use solarsite::SolarError;

#[test]
fn in_memory_mode_allows_basic_operations() {
    let store = SqliteStore::open(PersistenceMode::InMemory).expect("store");
    assert_eq!(store.mode(), &PersistenceMode::InMemory);
    assert_eq!(store.count(&Predicate::all()).expect("count"), 0);
    let id = store
        .insert(&NewRecord::new("1 Memory Ln", 10.0, 20.0).with(Field::Area, 4.5))
        .expect("insert");
    assert_eq!(id, 1);
    let record = store.get(id).expect("get").expect("stored");
    assert_eq!(record.value(Field::Area), Some(4.5));
    // the store keeps its own timestamps
    assert!(record.updated_at.is_some());
}

#[test]
fn file_mode_persists_across_reopen() {
    let path = std::env::temp_dir().join("solarsite_persistence_modes.db");
    let path = path.to_string_lossy().to_string();
    let cleanup = |path: &str| {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{path}{suffix}"));
        }
    };
    cleanup(&path);

    {
        let store = SqliteStore::open(PersistenceMode::File(path.clone())).expect("store");
        store.insert(&NewRecord::new("9 Disk Dr", -33.9, 151.2)).expect("insert");
    }
    let store = SqliteStore::open(PersistenceMode::File(path.clone())).expect("reopen");
    assert_eq!(store.count(&Predicate::all()).expect("count"), 1);
    assert_eq!(store.get(1).expect("get").expect("stored").address, "9 Disk Dr");
    drop(store);
    cleanup(&path);
}

#[test]
fn schema_rejects_invalid_rows() {
    let store = SqliteStore::open(PersistenceMode::InMemory).expect("store");
    store.insert(&NewRecord::new("1 Unique St", 0.0, 0.0)).expect("insert");

    let duplicate = store.insert(&NewRecord::new("1 Unique St", 1.0, 1.0));
    assert!(matches!(duplicate, Err(SolarError::Persistence(_))));

    let off_globe = store.insert(&NewRecord::new("2 Nowhere", 95.0, 0.0));
    assert!(matches!(off_globe, Err(SolarError::Persistence(_))));

    let steep = store.insert(&NewRecord::new("3 Cliff", 0.0, 0.0).with(Field::AnnualTilt, 120.0));
    assert!(matches!(steep, Err(SolarError::Persistence(_))));

    for field in [Field::Slope, Field::SolarDayLength, Field::Area, Field::GridDistance] {
        let negative = store.insert(&NewRecord::new("4 Below Zero", 0.0, 0.0).with(field, -1.0));
        assert!(matches!(negative, Err(SolarError::Persistence(_))), "{field} accepted -1");
    }

    assert_eq!(store.count(&Predicate::all()).expect("count"), 1);
}

#[test]
fn missing_record_is_none() {
    let store = SqliteStore::open(PersistenceMode::InMemory).expect("store");
    assert!(store.get(7).expect("get").is_none());
}
