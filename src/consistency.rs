use crate::errors::{KvdaoError, Result};
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How many replicas must take part in a read or write
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsistencyLevel {
    /// A single replica
    One,
    /// A majority of replicas
    Quorum,
    /// Every replica
    All,
}

impl ConsistencyLevel {
    /// Number of replicas this level needs out of `replication_factor`
    pub fn required_replicas(self, replication_factor: usize) -> usize {
        let required = match self {
            ConsistencyLevel::One => 1,
            ConsistencyLevel::Quorum => replication_factor / 2 + 1,
            ConsistencyLevel::All => replication_factor,
        };
        required.max(1)
    }

    /// Fails with `Unavailable` unless `alive` replicas are enough
    pub fn ensure_available(self, replication_factor: usize, alive: usize) -> Result<usize> {
        let required = self.required_replicas(replication_factor);
        if alive < required {
            return Err(KvdaoError::Unavailable { required, alive });
        }
        Ok(required)
    }
}

impl fmt::Display for ConsistencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConsistencyLevel::One => "ONE",
            ConsistencyLevel::Quorum => "QUORUM",
            ConsistencyLevel::All => "ALL",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ConsistencyLevel {
    type Err = KvdaoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "one" => Ok(ConsistencyLevel::One),
            "quorum" => Ok(ConsistencyLevel::Quorum),
            "all" => Ok(ConsistencyLevel::All),
            other => Err(KvdaoError::InvalidRequest(format!(
                "unknown consistency level {}",
                other
            ))),
        }
    }
}

/// Read and write levels attached to a keyspace handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsistencyPolicy {
    /// Level used by queries
    pub read: ConsistencyLevel,
    /// Level used by mutations
    pub write: ConsistencyLevel,
}

impl ConsistencyPolicy {
    /// Create a policy from a read and a write level
    pub fn new(read: ConsistencyLevel, write: ConsistencyLevel) -> Self {
        Self { read, write }
    }
}

impl Default for ConsistencyPolicy {
    fn default() -> Self {
        Self::new(ConsistencyLevel::Quorum, ConsistencyLevel::Quorum)
    }
}
