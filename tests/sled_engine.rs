use kvdao::{
    Column, ConsistencyLevel, DaoConfig, KvDao, Keyspace, Mutation, Result, SledEngine,
    StoreEngine,
};
use std::collections::HashMap;
use tempfile::TempDir;

#[test]
fn values_survive_reopen() -> Result<()> {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");

    {
        let engine = SledEngine::open(temp_dir.path())?;
        let dao = KvDao::new(Keyspace::new("Keyspace1", engine), DaoConfig::default());
        let key_values: HashMap<String, String> = (0..20)
            .map(|i| (format!("key{}", i), format!("value{}", i)))
            .collect();
        dao.insert_multi(&key_values)?;
        dao.delete(&["key0"])?;
    }

    let engine = SledEngine::open(temp_dir.path())?;
    let dao = KvDao::new(Keyspace::new("Keyspace1", engine), DaoConfig::default());
    assert_eq!(dao.get("key0")?, None);
    assert_eq!(dao.get("key1")?, Some("value1".to_owned()));
    assert_eq!(dao.get("key19")?, Some("value19".to_owned()));
    Ok(())
}

#[test]
fn every_level_is_satisfiable_on_one_node() -> Result<()> {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let engine = SledEngine::open(temp_dir.path())?;
    let insert = vec![Mutation::Insert {
        key: "key1".to_owned(),
        column_family: "Standard1".to_owned(),
        column: Column::new("v", "value1", 1),
    }];
    for level in &[
        ConsistencyLevel::One,
        ConsistencyLevel::Quorum,
        ConsistencyLevel::All,
    ] {
        engine.batch_mutate("Keyspace1", &insert, *level)?;
        let column = engine.get_column("Keyspace1", "Standard1", "key1", "v", *level)?;
        assert_eq!(column.map(|c| c.value), Some("value1".to_owned()));
    }
    Ok(())
}

#[test]
fn stale_deletion_is_ignored() -> Result<()> {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let engine = SledEngine::open(temp_dir.path())?;
    let level = ConsistencyLevel::All;

    let insert = vec![Mutation::Insert {
        key: "key1".to_owned(),
        column_family: "Standard1".to_owned(),
        column: Column::new("v", "value1", 10),
    }];
    engine.batch_mutate("Keyspace1", &insert, level)?;

    let stale_delete = vec![Mutation::Deletion {
        key: "key1".to_owned(),
        column_family: "Standard1".to_owned(),
        column_name: "v".to_owned(),
        timestamp: 5,
    }];
    engine.batch_mutate("Keyspace1", &stale_delete, level)?;

    let column = engine.get_column("Keyspace1", "Standard1", "key1", "v", level)?;
    assert_eq!(column, Some(Column::new("v", "value1", 10)));
    Ok(())
}

#[test]
fn keys_with_separators_do_not_collide() -> Result<()> {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let engine = SledEngine::open(temp_dir.path())?;
    let level = ConsistencyLevel::One;

    let mutations = vec![
        Mutation::Insert {
            key: "a\u{0}b".to_owned(),
            column_family: "Standard1".to_owned(),
            column: Column::new("v", "first", 1),
        },
        Mutation::Insert {
            key: "a".to_owned(),
            column_family: "Standard1".to_owned(),
            column: Column::new("b\u{0}v", "second", 1),
        },
    ];
    engine.batch_mutate("Keyspace1", &mutations, level)?;

    let first = engine.get_column("Keyspace1", "Standard1", "a\u{0}b", "v", level)?;
    let second = engine.get_column("Keyspace1", "Standard1", "a", "b\u{0}v", level)?;
    assert_eq!(first.map(|c| c.value), Some("first".to_owned()));
    assert_eq!(second.map(|c| c.value), Some("second".to_owned()));
    Ok(())
}
