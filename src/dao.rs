use crate::client::RemoteEngine;
use crate::column::Column;
use crate::consistency::{ConsistencyLevel, ConsistencyPolicy};
use crate::engine::StoreEngine;
use crate::errors::Result;
use crate::keyspace::Keyspace;
use slog::{debug, o, Discard, Logger};
use std::collections::{HashMap, HashSet};

/// Where the DAO keeps its values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaoConfig {
    /// Column family holding the records
    pub column_family: String,
    /// Column each value is stored under
    pub column_name: String,
}

impl Default for DaoConfig {
    fn default() -> Self {
        Self {
            column_family: "Standard1".to_owned(),
            column_name: "v".to_owned(),
        }
    }
}

/// String keys to string values, one column per row
pub struct KvDao<E: StoreEngine> {
    keyspace: Keyspace<E>,
    config: DaoConfig,
    logger: Logger,
}

impl KvDao<RemoteEngine> {
    /// Connect to the store node at `host_port` and open `keyspace`,
    /// reading at ONE and writing at ALL
    pub fn connect(host_port: &str, keyspace: &str) -> Result<Self> {
        let engine = RemoteEngine::connect(host_port)?;
        let keyspace = Keyspace::new(keyspace, engine).with_consistency_policy(
            ConsistencyPolicy::new(ConsistencyLevel::One, ConsistencyLevel::All),
        );
        Ok(Self::new(keyspace, DaoConfig::default()))
    }
}

impl<E: StoreEngine> KvDao<E> {
    /// Wrap an already opened keyspace
    pub fn new(keyspace: Keyspace<E>, config: DaoConfig) -> Self {
        Self {
            keyspace,
            config,
            logger: Logger::root(Discard, o!()),
        }
    }

    /// Log operations to `logger`
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    /// The keyspace handle in use
    pub fn keyspace(&self) -> &Keyspace<E> {
        &self.keyspace
    }

    /// The column family and column in use
    pub fn config(&self) -> &DaoConfig {
        &self.config
    }

    fn column(&self, value: &str) -> Column {
        Column::new(
            &self.config.column_name,
            value,
            self.keyspace.create_timestamp(),
        )
    }

    /// Insert a new value keyed by key
    pub fn insert(&self, key: &str, value: &str) -> Result<()> {
        debug!(self.logger, "insert"; "key" => key);
        self.keyspace
            .mutator()
            .insert(key, &self.config.column_family, self.column(value))
    }

    /// Get a value, `None` if there is no value for the key
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        debug!(self.logger, "get"; "key" => key);
        let column = self.keyspace.get_column(
            &self.config.column_family,
            key,
            &self.config.column_name,
        )?;
        Ok(column.map(|c| c.value))
    }

    /// Get several values in one request. Keys without a value
    /// are left out of the result.
    pub fn get_multi<K: AsRef<str>>(&self, keys: &[K]) -> Result<HashMap<String, String>> {
        let mut seen = HashSet::new();
        let keys: Vec<String> = keys
            .iter()
            .map(|k| k.as_ref())
            .filter(|k| seen.insert(*k))
            .map(|k| k.to_owned())
            .collect();
        debug!(self.logger, "get multi"; "keys" => keys.len());

        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = self.keyspace.multiget_slice(
            &self.config.column_family,
            &keys,
            &[self.config.column_name.clone()],
        )?;

        let mut values = HashMap::with_capacity(keys.len());
        for row in rows {
            if let Some(column) = row.slice.column_by_name(&self.config.column_name) {
                values.insert(row.key, column.value.clone());
            }
        }
        Ok(values)
    }

    /// Insert several values in one batch, each with its own timestamp
    pub fn insert_multi(&self, key_values: &HashMap<String, String>) -> Result<()> {
        debug!(self.logger, "insert multi"; "keys" => key_values.len());
        let mut mutator = self.keyspace.mutator();
        for (key, value) in key_values {
            mutator.add_insertion(key, &self.config.column_family, self.column(value));
        }
        mutator.execute()
    }

    /// Delete several values in one batch. Missing keys are fine.
    pub fn delete<K: AsRef<str>>(&self, keys: &[K]) -> Result<()> {
        debug!(self.logger, "delete"; "keys" => keys.len());
        let mut mutator = self.keyspace.mutator();
        for key in keys {
            mutator.add_deletion(
                key.as_ref(),
                &self.config.column_family,
                &self.config.column_name,
            );
        }
        mutator.execute()
    }
}
