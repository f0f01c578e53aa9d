use crate::column::{Column, Mutation, Rows};
use crate::consistency::ConsistencyLevel;
use crate::errors::{KvdaoError, Result};

/// The store client a keyspace handle talks to.
///
/// Implementations own the actual storage (or the connection to it) and
/// enforce consistency levels. Handles are cheap to clone and share their
/// underlying state.
pub trait StoreEngine: Clone + Send + 'static {
    /// Read a single column of a row
    fn get_column(
        &self,
        keyspace: &str,
        column_family: &str,
        key: &str,
        column: &str,
        level: ConsistencyLevel,
    ) -> Result<Option<Column>>;

    /// Read the named columns of several rows in one request
    fn multiget_slice(
        &self,
        keyspace: &str,
        column_family: &str,
        keys: &[String],
        column_names: &[String],
        level: ConsistencyLevel,
    ) -> Result<Rows>;

    /// Apply every mutation or none of them
    fn batch_mutate(
        &self,
        keyspace: &str,
        mutations: &[Mutation],
        level: ConsistencyLevel,
    ) -> Result<()>;
}

fn non_empty(what: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(KvdaoError::InvalidRequest(format!("{} may not be empty", what)));
    }
    Ok(())
}

/// Checks shared by every single-column read
pub(crate) fn validate_read(keyspace: &str, column_family: &str, key: &str, column: &str) -> Result<()> {
    non_empty("keyspace", keyspace)?;
    non_empty("column family", column_family)?;
    non_empty("key", key)?;
    non_empty("column name", column)
}

/// Checks shared by every multi-row read
pub(crate) fn validate_slice(
    keyspace: &str,
    column_family: &str,
    keys: &[String],
    column_names: &[String],
) -> Result<()> {
    non_empty("keyspace", keyspace)?;
    non_empty("column family", column_family)?;
    for key in keys {
        non_empty("key", key)?;
    }
    for name in column_names {
        non_empty("column name", name)?;
    }
    Ok(())
}

/// Checks shared by every batch
pub(crate) fn validate_mutations(keyspace: &str, mutations: &[Mutation]) -> Result<()> {
    non_empty("keyspace", keyspace)?;
    for mutation in mutations {
        non_empty("column family", mutation.column_family())?;
        non_empty("key", mutation.key())?;
        non_empty("column name", mutation.column_name())?;
    }
    Ok(())
}
