use crate::column::{Cell, Column, ColumnSlice, Mutation, Rows};
use crate::consistency::ConsistencyLevel;
use crate::engine::{validate_mutations, validate_read, validate_slice, StoreEngine};
use crate::errors::{KvdaoError, Result};
use crate::protocol::{read_message, write_message};
use sled::{Batch, Db};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// A single node has a single replica
const REPLICATION_FACTOR: usize = 1;

/// Cells persisted in a sled db, one node, one replica
#[derive(Clone)]
pub struct SledEngine {
    db: Db,
    /// Serializes read-compare-write of cells
    write_lock: Arc<Mutex<()>>,
}

/// Length prefixed so that no component can bleed into the next one
fn encode_key(keyspace: &str, column_family: &str, key: &str, column: &str) -> Vec<u8> {
    let parts = [keyspace, column_family, key, column];
    let mut encoded = Vec::with_capacity(parts.iter().map(|p| p.len() + 4).sum());
    for part in parts.iter() {
        encoded.extend_from_slice(&(part.len() as u32).to_be_bytes());
        encoded.extend_from_slice(part.as_bytes());
    }
    encoded
}

fn encode_cell(cell: &Cell) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_message(&mut buf, cell)?;
    Ok(buf)
}

impl SledEngine {
    /// Open the sled db at `dirpath`, creating it if needed
    pub fn open(dirpath: &Path) -> Result<Self> {
        let db = Db::open(dirpath)?;
        Ok(Self {
            db,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn read_cell(&self, encoded_key: &[u8]) -> Result<Option<Cell>> {
        match self.db.get(encoded_key)? {
            Some(bytes) => {
                let mut reader: &[u8] = &bytes;
                Ok(Some(read_message(&mut reader)?))
            }
            None => Ok(None),
        }
    }

    fn read_column(
        &self,
        keyspace: &str,
        column_family: &str,
        key: &str,
        column: &str,
    ) -> Result<Option<Column>> {
        let encoded_key = encode_key(keyspace, column_family, key, column);
        Ok(self
            .read_cell(&encoded_key)?
            .and_then(|cell| cell.into_column(column)))
    }
}

impl StoreEngine for SledEngine {
    fn get_column(
        &self,
        keyspace: &str,
        column_family: &str,
        key: &str,
        column: &str,
        level: ConsistencyLevel,
    ) -> Result<Option<Column>> {
        validate_read(keyspace, column_family, key, column)?;
        level.ensure_available(REPLICATION_FACTOR, REPLICATION_FACTOR)?;
        self.read_column(keyspace, column_family, key, column)
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
        level.ensure_available(REPLICATION_FACTOR, REPLICATION_FACTOR)?;

        let mut rows = Rows::default();
        for key in keys {
            let mut columns = Vec::new();
            for name in column_names {
                if let Some(column) = self.read_column(keyspace, column_family, key, name)? {
                    columns.push(column);
                }
            }
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
        level.ensure_available(REPLICATION_FACTOR, REPLICATION_FACTOR)?;

        let _guard = self
            .write_lock
            .lock()
            .map_err(|_e| KvdaoError::LockError("Error getting write lock".to_owned()))?;

        // winners within this batch, checked against what is already stored
        let mut pending: HashMap<Vec<u8>, Cell> = HashMap::new();
        for mutation in mutations {
            let encoded_key = encode_key(
                keyspace,
                mutation.column_family(),
                mutation.key(),
                mutation.column_name(),
            );
            let cell = mutation.to_cell();
            let current = match pending.get(&encoded_key) {
                Some(current) => Some(current.clone()),
                None => self.read_cell(&encoded_key)?,
            };
            if current.map_or(true, |current| cell.supersedes(&current)) {
                pending.insert(encoded_key, cell);
            }
        }

        let mut batch = Batch::default();
        for (encoded_key, cell) in pending {
            batch.insert(encoded_key, encode_cell(&cell)?);
        }
        self.db.apply_batch(batch)?;
        self.db.flush()?;
        Ok(())
    }
}
