use crate::column::{Cell, Column, ColumnSlice, Mutation, Rows};
use crate::consistency::ConsistencyLevel;
use crate::engine::{validate_mutations, validate_read, validate_slice, StoreEngine};
use crate::errors::{KvdaoError, Result};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// (keyspace, column family, row key, column name)
type CellKey = (String, String, String, String);

fn cell_key(keyspace: &str, column_family: &str, key: &str, column: &str) -> CellKey {
    (
        keyspace.to_owned(),
        column_family.to_owned(),
        key.to_owned(),
        column.to_owned(),
    )
}

#[derive(Debug)]
struct Replica {
    up: bool,
    cells: HashMap<CellKey, Cell>,
}

impl Replica {
    fn apply(&mut self, key: CellKey, cell: Cell) {
        match self.cells.get(&key) {
            Some(existing) if !cell.supersedes(existing) => {}
            _ => {
                self.cells.insert(key, cell);
            }
        }
    }
}

#[derive(Debug)]
struct SharedReplicas {
    replicas: Vec<Replica>,
}

impl SharedReplicas {
    fn live(&self) -> impl Iterator<Item = &Replica> {
        self.replicas.iter().filter(|r| r.up)
    }

    fn live_count(&self) -> usize {
        self.live().count()
    }

    /// Reconciled cell across the first `required` live replicas
    fn read(&self, key: &CellKey, required: usize) -> Option<Cell> {
        self.live()
            .take(required)
            .filter_map(|r| r.cells.get(key))
            .fold(None, |best: Option<&Cell>, cell| match best {
                Some(b) if !cell.supersedes(b) => Some(b),
                _ => Some(cell),
            })
            .cloned()
    }
}

/// An in-process store holding a configurable number of replicas.
///
/// Replicas can be marked down to exercise consistency levels: a down
/// replica misses every write made while it is down.
#[derive(Clone, Debug)]
pub struct MemoryEngine(Arc<RwLock<SharedReplicas>>);

impl MemoryEngine {
    /// A store with a single replica
    pub fn new() -> Self {
        Self::with_replicas(1)
    }

    /// A store with `replication_factor` replicas, all up
    pub fn with_replicas(replication_factor: usize) -> Self {
        let replicas = (0..replication_factor.max(1))
            .map(|_| Replica {
                up: true,
                cells: HashMap::new(),
            })
            .collect();
        MemoryEngine(Arc::new(RwLock::new(SharedReplicas { replicas })))
    }

    /// Number of replicas
    pub fn replication_factor(&self) -> Result<usize> {
        Ok(self.read_lock()?.replicas.len())
    }

    /// Number of replicas currently up
    pub fn live_replicas(&self) -> Result<usize> {
        Ok(self.read_lock()?.live_count())
    }

    /// Bring a replica up or take it down
    pub fn set_replica_up(&self, index: usize, up: bool) -> Result<()> {
        let mut shared = self.write_lock()?;
        let count = shared.replicas.len();
        match shared.replicas.get_mut(index) {
            Some(replica) => {
                replica.up = up;
                Ok(())
            }
            None => Err(KvdaoError::InvalidRequest(format!(
                "replica {} out of range, {} replicas",
                index, count
            ))),
        }
    }

    fn read_lock(&self) -> Result<std::sync::RwLockReadGuard<'_, SharedReplicas>> {
        self.0
            .read()
            .map_err(|_e| KvdaoError::LockError("Error getting read lock".to_owned()))
    }

    fn write_lock(&self) -> Result<std::sync::RwLockWriteGuard<'_, SharedReplicas>> {
        self.0
            .write()
            .map_err(|_e| KvdaoError::LockError("Error getting write lock".to_owned()))
    }
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreEngine for MemoryEngine {
    fn get_column(
        &self,
        keyspace: &str,
        column_family: &str,
        key: &str,
        column: &str,
        level: ConsistencyLevel,
    ) -> Result<Option<Column>> {
        validate_read(keyspace, column_family, key, column)?;
        let shared = self.read_lock()?;
        let required = level.ensure_available(shared.replicas.len(), shared.live_count())?;

        let key = cell_key(keyspace, column_family, key, column);
        Ok(shared
            .read(&key, required)
            .and_then(|cell| cell.into_column(column)))
    }

    fn multiget_slice(
        &self,
        keyspace: &str,
        column_family: &str,
        keys: &[String],
        column_names: &[String],
        level: ConsistencyLevel,
    ) -> Result<Rows> {
        validate_slice(keyspace, column_family, keys, column_names)?;
        let shared = self.read_lock()?;
        let required = level.ensure_available(shared.replicas.len(), shared.live_count())?;

        let mut rows = Rows::default();
        for key in keys {
            let columns = column_names
                .iter()
                .filter_map(|name| {
                    let lookup = cell_key(keyspace, column_family, key, name);
                    shared
                        .read(&lookup, required)
                        .and_then(|cell| cell.into_column(name))
                })
                .collect();
            rows.push(key.clone(), ColumnSlice::new(columns));
        }
        Ok(rows)
    }

    fn batch_mutate(
        &self,
        keyspace: &str,
        mutations: &[Mutation],
        level: ConsistencyLevel,
    ) -> Result<()> {
        validate_mutations(keyspace, mutations)?;
        let mut shared = self.write_lock()?;
        level.ensure_available(shared.replicas.len(), shared.live_count())?;

        for replica in shared.replicas.iter_mut().filter(|r| r.up) {
            for mutation in mutations {
                let key = cell_key(
                    keyspace,
                    mutation.column_family(),
                    mutation.key(),
                    mutation.column_name(),
                );
                replica.apply(key, mutation.to_cell());
            }
        }
        Ok(())
    }
}
