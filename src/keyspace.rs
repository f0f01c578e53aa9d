use crate::column::{now_micros, Column, Rows};
use crate::consistency::ConsistencyPolicy;
use crate::engine::StoreEngine;
use crate::errors::Result;
use crate::mutator::Mutator;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Hands out microsecond timestamps that never repeat and never go
/// backwards, even when the wall clock does
#[derive(Debug, Default)]
pub struct TimestampClock {
    last: AtomicI64,
}

impl TimestampClock {
    /// A clock that has not issued anything yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Next timestamp, strictly greater than every previous one
    pub fn next(&self) -> i64 {
        let mut last = self.last.load(Ordering::SeqCst);
        loop {
            let candidate = now_micros().max(last + 1);
            match self
                .last
                .compare_exchange(last, candidate, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return candidate,
                Err(actual) => last = actual,
            }
        }
    }
}

/// A handle to a named keyspace on a store, with the consistency
/// levels its queries and mutations run at
#[derive(Clone, Debug)]
pub struct Keyspace<E: StoreEngine> {
    name: String,
    engine: E,
    policy: ConsistencyPolicy,
    clock: Arc<TimestampClock>,
}

impl<E: StoreEngine> Keyspace<E> {
    /// Open `name` on `engine` with the default (QUORUM/QUORUM) policy
    pub fn new(name: &str, engine: E) -> Self {
        Self {
            name: name.to_owned(),
            engine,
            policy: ConsistencyPolicy::default(),
            clock: Arc::new(TimestampClock::new()),
        }
    }

    /// Replace the consistency policy
    pub fn set_consistency_policy(&mut self, policy: ConsistencyPolicy) {
        self.policy = policy;
    }

    /// Builder form of `set_consistency_policy`
    pub fn with_consistency_policy(mut self, policy: ConsistencyPolicy) -> Self {
        self.set_consistency_policy(policy);
        self
    }

    /// The keyspace name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The attached policy
    pub fn consistency_policy(&self) -> ConsistencyPolicy {
        self.policy
    }

    /// The engine behind this handle
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// A fresh write timestamp
    pub fn create_timestamp(&self) -> i64 {
        self.clock.next()
    }

    /// Read one column at the read level
    pub fn get_column(&self, column_family: &str, key: &str, column: &str) -> Result<Option<Column>> {
        self.engine
            .get_column(&self.name, column_family, key, column, self.policy.read)
    }

    /// Read columns of several rows at the read level, in one request
    pub fn multiget_slice(
        &self,
        column_family: &str,
        keys: &[String],
        column_names: &[String],
    ) -> Result<Rows> {
        self.engine.multiget_slice(
            &self.name,
            column_family,
            keys,
            column_names,
            self.policy.read,
        )
    }

    /// Start a batch of mutations against this keyspace
    pub fn mutator(&self) -> Mutator<'_, E> {
        Mutator::new(self)
    }
}
