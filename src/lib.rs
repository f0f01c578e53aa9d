#![deny(missing_docs)]

//! A key value DAO over a column family store, plus the
//! pieces of store it needs to run against.

pub use client::RemoteEngine;
pub use column::{Cell, Column, ColumnSlice, Mutation, Row, Rows};
pub use consistency::{ConsistencyLevel, ConsistencyPolicy};
pub use dao::{DaoConfig, KvDao};
pub use engine::StoreEngine;
pub use errors::{ErrorKind, KvdaoError, Result};
pub use keyspace::{Keyspace, TimestampClock};
pub use memory_engine::MemoryEngine;
pub use mutator::Mutator;
pub use server::{KvdaoServer, ServerHandle};
pub use sled_engine::SledEngine;

mod client;
mod column;
mod consistency;
mod dao;
mod engine;
mod errors;
mod keyspace;
mod memory_engine;
mod mutator;
pub mod protocol;
mod server;
mod sled_engine;
pub mod thread_pool;
