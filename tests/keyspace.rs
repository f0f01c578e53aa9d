use kvdao::{
    Cell, Column, ConsistencyLevel, Keyspace, MemoryEngine, Mutation, Result, StoreEngine,
    TimestampClock,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

#[test]
fn clock_is_strictly_increasing() {
    let clock = TimestampClock::new();
    let mut last = clock.next();
    for _ in 0..10_000 {
        let next = clock.next();
        assert!(next > last);
        last = next;
    }
}

#[test]
fn clock_never_repeats_across_threads() {
    let clock = Arc::new(TimestampClock::new());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let clock = Arc::clone(&clock);
            thread::spawn(move || (0..1000).map(|_| clock.next()).collect::<Vec<_>>())
        })
        .collect();

    let mut seen = HashSet::new();
    for handle in handles {
        for timestamp in handle.join().expect("clock thread panicked") {
            assert!(seen.insert(timestamp));
        }
    }
    assert_eq!(seen.len(), 4000);
}

#[test]
fn cloned_keyspaces_share_a_clock() {
    let keyspace = Keyspace::new("Keyspace1", MemoryEngine::new());
    let clone = keyspace.clone();
    let first = keyspace.create_timestamp();
    let second = clone.create_timestamp();
    assert!(second > first);
}

#[test]
fn newer_timestamp_wins() {
    let old = Cell {
        value: Some("b".to_owned()),
        timestamp: 1,
    };
    let new = Cell {
        value: Some("a".to_owned()),
        timestamp: 2,
    };
    assert!(new.supersedes(&old));
    assert!(!old.supersedes(&new));
}

#[test]
fn ties_are_broken_deterministically() {
    let tombstone = Cell {
        value: None,
        timestamp: 5,
    };
    let a = Cell {
        value: Some("a".to_owned()),
        timestamp: 5,
    };
    let b = Cell {
        value: Some("b".to_owned()),
        timestamp: 5,
    };
    assert!(tombstone.supersedes(&a));
    assert!(!a.supersedes(&tombstone));
    assert!(b.supersedes(&a));
    assert!(!a.supersedes(&b));
    assert!(!a.supersedes(&a.clone()));
}

#[test]
fn older_write_does_not_overwrite_newer() -> Result<()> {
    let engine = MemoryEngine::new();
    let keyspace = Keyspace::new("Keyspace1", engine.clone());

    let mut mutator = keyspace.mutator();
    mutator.add_insertion("key1", "Standard1", Column::new("v", "newer", 20));
    mutator.execute()?;

    let mut mutator = keyspace.mutator();
    mutator.add_insertion("key1", "Standard1", Column::new("v", "older", 10));
    mutator.execute()?;

    let column = keyspace.get_column("Standard1", "key1", "v")?;
    assert_eq!(column, Some(Column::new("v", "newer", 20)));
    Ok(())
}

#[test]
fn mutator_batches_everything() -> Result<()> {
    let keyspace = Keyspace::new("Keyspace1", MemoryEngine::new());
    let mut mutator = keyspace.mutator();
    mutator
        .add_insertion("key1", "Standard1", Column::new("v", "value1", 1))
        .add_insertion("key2", "Standard1", Column::new("v", "value2", 2))
        .add_deletion("key3", "Standard1", "v");
    assert_eq!(mutator.pending().len(), 3);
    match &mutator.pending()[2] {
        Mutation::Deletion { key, .. } => assert_eq!(key, "key3"),
        other => panic!("expected a deletion, got {:?}", other),
    }
    mutator.execute()?;

    let rows = keyspace.multiget_slice(
        "Standard1",
        &["key1".to_owned(), "key2".to_owned(), "key3".to_owned()],
        &["v".to_owned()],
    )?;
    assert_eq!(rows.len(), 3);
    let key1 = rows.get_by_key("key1").expect("row for key1");
    assert_eq!(
        key1.column_by_name("v").map(|c| c.value.as_str()),
        Some("value1")
    );
    assert!(rows.get_by_key("key3").expect("row for key3").is_empty());
    Ok(())
}

#[test]
fn single_insert_leaves_queued_batch_alone() -> Result<()> {
    let keyspace = Keyspace::new("Keyspace1", MemoryEngine::new());
    let mut mutator = keyspace.mutator();
    mutator.add_insertion("queued", "Standard1", Column::new("v", "queued", 1));
    mutator.insert("direct", "Standard1", Column::new("v", "direct", 1))?;

    assert_eq!(mutator.pending().len(), 1);
    assert!(keyspace.get_column("Standard1", "direct", "v")?.is_some());
    assert!(keyspace.get_column("Standard1", "queued", "v")?.is_none());
    Ok(())
}

#[test]
fn deletion_shadows_earlier_insert_in_same_batch() -> Result<()> {
    let engine = MemoryEngine::new();
    let mutations = vec![
        Mutation::Insert {
            key: "key1".to_owned(),
            column_family: "Standard1".to_owned(),
            column: Column::new("v", "value1", 1),
        },
        Mutation::Deletion {
            key: "key1".to_owned(),
            column_family: "Standard1".to_owned(),
            column_name: "v".to_owned(),
            timestamp: 2,
        },
    ];
    engine.batch_mutate("Keyspace1", &mutations, ConsistencyLevel::All)?;
    let column = engine.get_column("Keyspace1", "Standard1", "key1", "v", ConsistencyLevel::One)?;
    assert_eq!(column, None);
    Ok(())
}
