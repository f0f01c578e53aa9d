use crate::column::{Column, Mutation};
use crate::engine::StoreEngine;
use crate::errors::Result;
use crate::keyspace::Keyspace;

/// Collects inserts and deletions and sends them as one batch at the
/// keyspace's write level
pub struct Mutator<'a, E: StoreEngine> {
    keyspace: &'a Keyspace<E>,
    mutations: Vec<Mutation>,
}

impl<'a, E: StoreEngine> Mutator<'a, E> {
    /// An empty batch against `keyspace`
    pub fn new(keyspace: &'a Keyspace<E>) -> Self {
        Self {
            keyspace,
            mutations: Vec::new(),
        }
    }

    /// Queue a column write
    pub fn add_insertion(&mut self, key: &str, column_family: &str, column: Column) -> &mut Self {
        self.mutations.push(Mutation::Insert {
            key: key.to_owned(),
            column_family: column_family.to_owned(),
            column,
        });
        self
    }

    /// Queue a column deletion stamped with a fresh keyspace timestamp
    pub fn add_deletion(&mut self, key: &str, column_family: &str, column_name: &str) -> &mut Self {
        let timestamp = self.keyspace.create_timestamp();
        self.mutations.push(Mutation::Deletion {
            key: key.to_owned(),
            column_family: column_family.to_owned(),
            column_name: column_name.to_owned(),
            timestamp,
        });
        self
    }

    /// Queued mutations
    pub fn pending(&self) -> &[Mutation] {
        &self.mutations
    }

    /// Write a single column right away, leaving the queued batch alone
    pub fn insert(&self, key: &str, column_family: &str, column: Column) -> Result<()> {
        let mut single = Mutator::new(self.keyspace);
        single.add_insertion(key, column_family, column);
        single.execute()
    }

    /// Send the batch. An empty batch never reaches the store.
    pub fn execute(self) -> Result<()> {
        if self.mutations.is_empty() {
            return Ok(());
        }
        self.keyspace.engine().batch_mutate(
            self.keyspace.name(),
            &self.mutations,
            self.keyspace.consistency_policy().write,
        )
    }
}
