use kvdao::{
    ConsistencyLevel, ConsistencyPolicy, DaoConfig, ErrorKind, KvDao, KvdaoError, Keyspace,
    MemoryEngine, Result, StoreEngine,
};
use std::collections::HashMap;

fn dao(engine: &MemoryEngine, policy: ConsistencyPolicy) -> KvDao<MemoryEngine> {
    let keyspace = Keyspace::new("Keyspace1", engine.clone()).with_consistency_policy(policy);
    KvDao::new(keyspace, DaoConfig::default())
}

fn one_all() -> ConsistencyPolicy {
    ConsistencyPolicy::new(ConsistencyLevel::One, ConsistencyLevel::All)
}

#[test]
fn required_replicas() {
    assert_eq!(ConsistencyLevel::One.required_replicas(3), 1);
    assert_eq!(ConsistencyLevel::Quorum.required_replicas(3), 2);
    assert_eq!(ConsistencyLevel::Quorum.required_replicas(4), 3);
    assert_eq!(ConsistencyLevel::All.required_replicas(3), 3);
    assert_eq!(ConsistencyLevel::All.required_replicas(0), 1);
}

#[test]
fn level_names() -> Result<()> {
    assert_eq!("one".parse::<ConsistencyLevel>()?, ConsistencyLevel::One);
    assert_eq!("QUORUM".parse::<ConsistencyLevel>()?, ConsistencyLevel::Quorum);
    assert_eq!("All".parse::<ConsistencyLevel>()?, ConsistencyLevel::All);
    assert!("two".parse::<ConsistencyLevel>().is_err());
    assert_eq!(ConsistencyLevel::All.to_string(), "ALL");
    Ok(())
}

#[test]
fn default_policy_is_quorum() {
    let keyspace = Keyspace::new("Keyspace1", MemoryEngine::new());
    assert_eq!(
        keyspace.consistency_policy(),
        ConsistencyPolicy::new(ConsistencyLevel::Quorum, ConsistencyLevel::Quorum)
    );
}

#[test]
fn write_all_fails_with_a_replica_down() -> Result<()> {
    let engine = MemoryEngine::with_replicas(3);
    let dao = dao(&engine, one_all());
    dao.insert("key1", "value1")?;

    engine.set_replica_up(2, false)?;
    match dao.insert("key1", "value2") {
        Err(KvdaoError::Unavailable { required, alive }) => {
            assert_eq!(required, 3);
            assert_eq!(alive, 2);
        }
        other => panic!("expected unavailable, got {:?}", other),
    }

    // reads at ONE still work and nothing of the failed write landed
    assert_eq!(dao.get("key1")?, Some("value1".to_owned()));

    engine.set_replica_up(2, true)?;
    assert_eq!(dao.get("key1")?, Some("value1".to_owned()));
    Ok(())
}

#[test]
fn failed_batch_writes_nothing() -> Result<()> {
    let engine = MemoryEngine::with_replicas(2);
    let dao = dao(&engine, one_all());
    engine.set_replica_up(0, false)?;

    let key_values: HashMap<String, String> = (0..10)
        .map(|i| (format!("key{}", i), format!("value{}", i)))
        .collect();
    let err = dao.insert_multi(&key_values).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unavailable);

    engine.set_replica_up(0, true)?;
    let keys: Vec<&String> = key_values.keys().collect();
    assert!(dao.get_multi(&keys)?.is_empty());
    Ok(())
}

#[test]
fn reads_fail_with_every_replica_down() -> Result<()> {
    let engine = MemoryEngine::with_replicas(2);
    let dao = dao(&engine, one_all());
    engine.set_replica_up(0, false)?;
    engine.set_replica_up(1, false)?;
    assert_eq!(engine.live_replicas()?, 0);

    assert_eq!(dao.get("key1").unwrap_err().kind(), ErrorKind::Unavailable);
    assert_eq!(
        dao.get_multi(&["key1"]).unwrap_err().kind(),
        ErrorKind::Unavailable
    );
    Ok(())
}

#[test]
fn weak_writes_can_be_read_stale_at_one() -> Result<()> {
    let engine = MemoryEngine::with_replicas(3);
    let weak = dao(
        &engine,
        ConsistencyPolicy::new(ConsistencyLevel::One, ConsistencyLevel::One),
    );
    weak.insert("key1", "old")?;

    engine.set_replica_up(0, false)?;
    weak.insert("key1", "new")?;
    engine.set_replica_up(0, true)?;

    // replica 0 missed the second write; ONE reads just that replica
    assert_eq!(weak.get("key1")?, Some("old".to_owned()));

    let strong = dao(
        &engine,
        ConsistencyPolicy::new(ConsistencyLevel::All, ConsistencyLevel::All),
    );
    assert_eq!(strong.get("key1")?, Some("new".to_owned()));
    Ok(())
}

#[test]
fn quorum_survives_one_replica_down() -> Result<()> {
    let engine = MemoryEngine::with_replicas(3);
    let dao = dao(
        &engine,
        ConsistencyPolicy::new(ConsistencyLevel::Quorum, ConsistencyLevel::Quorum),
    );
    engine.set_replica_up(1, false)?;
    dao.insert("key1", "value1")?;
    assert_eq!(dao.get("key1")?, Some("value1".to_owned()));

    engine.set_replica_up(0, false)?;
    assert_eq!(dao.get("key1").unwrap_err().kind(), ErrorKind::Unavailable);
    Ok(())
}

#[test]
fn replica_index_out_of_range() {
    let engine = MemoryEngine::with_replicas(2);
    let err = engine.set_replica_up(2, false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRequest);
}

#[test]
fn engine_rejects_empty_names() {
    let engine = MemoryEngine::new();
    let err = engine
        .get_column("", "Standard1", "key", "v", ConsistencyLevel::One)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    let err = engine
        .multiget_slice(
            "Keyspace1",
            "",
            &["key".to_owned()],
            &["v".to_owned()],
            ConsistencyLevel::One,
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRequest);
}
