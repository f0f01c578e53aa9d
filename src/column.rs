use serde_derive::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// A named, timestamped value inside a row
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Column value
    pub value: String,
    /// Write timestamp in microseconds since the epoch
    pub timestamp: i64,
}

impl Column {
    /// Create a column with an explicit timestamp
    pub fn new(name: &str, value: &str, timestamp: i64) -> Self {
        Self {
            name: name.to_owned(),
            value: value.to_owned(),
            timestamp,
        }
    }
}

/// The columns read back for a single row
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSlice {
    columns: Vec<Column>,
}

impl ColumnSlice {
    /// Wrap a list of columns
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Find a column by name
    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// All columns in the slice
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Whether the row had none of the requested columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// A row key with its column slice
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Row key
    pub key: String,
    /// Columns found for the key
    pub slice: ColumnSlice,
}

/// Result of a multi-key slice query. Every requested key
/// has a row, possibly with an empty slice.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Rows {
    rows: Vec<Row>,
}

impl Rows {
    /// Add a row
    pub fn push(&mut self, key: String, slice: ColumnSlice) {
        self.rows.push(Row { key, slice });
    }

    /// Look up the row for a key
    pub fn get_by_key(&self, key: &str) -> Option<&ColumnSlice> {
        self.rows.iter().find(|r| r.key == key).map(|r| &r.slice)
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there are no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl IntoIterator for Rows {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

/// A single row-level change carried by a batch
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Write a column
    Insert {
        /// Row key
        key: String,
        /// Target column family
        column_family: String,
        /// Column to write
        column: Column,
    },
    /// Delete a column
    Deletion {
        /// Row key
        key: String,
        /// Target column family
        column_family: String,
        /// Column to delete
        column_name: String,
        /// Deletion timestamp in microseconds since the epoch
        timestamp: i64,
    },
}

impl Mutation {
    /// Row key the mutation applies to
    pub fn key(&self) -> &str {
        match self {
            Mutation::Insert { key, .. } | Mutation::Deletion { key, .. } => key,
        }
    }

    /// Column family the mutation applies to
    pub fn column_family(&self) -> &str {
        match self {
            Mutation::Insert { column_family, .. } | Mutation::Deletion { column_family, .. } => {
                column_family
            }
        }
    }

    /// Name of the column the mutation applies to
    pub fn column_name(&self) -> &str {
        match self {
            Mutation::Insert { column, .. } => &column.name,
            Mutation::Deletion { column_name, .. } => column_name,
        }
    }

    /// The cell this mutation leaves behind
    pub fn to_cell(&self) -> Cell {
        match self {
            Mutation::Insert { column, .. } => Cell {
                value: Some(column.value.clone()),
                timestamp: column.timestamp,
            },
            Mutation::Deletion { timestamp, .. } => Cell {
                value: None,
                timestamp: *timestamp,
            },
        }
    }
}

/// The stored state of one column: a live value or a tombstone
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// `None` marks a tombstone
    pub value: Option<String>,
    /// Timestamp of the write that produced this cell
    pub timestamp: i64,
}

impl Cell {
    /// Whether this cell wins over `other`.
    ///
    /// Higher timestamps win. On a tie a tombstone beats a live value
    /// and the greater of two live values wins.
    pub fn supersedes(&self, other: &Cell) -> bool {
        if self.timestamp != other.timestamp {
            return self.timestamp > other.timestamp;
        }
        match (&self.value, &other.value) {
            (None, Some(_)) => true,
            (Some(mine), Some(theirs)) => mine > theirs,
            _ => false,
        }
    }

    /// Turn a live cell back into a column
    pub fn into_column(self, name: &str) -> Option<Column> {
        let timestamp = self.timestamp;
        self.value.map(|value| Column {
            name: name.to_owned(),
            value,
            timestamp,
        })
    }
}

/// Microseconds since the Unix epoch by the wall clock
pub fn now_micros() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as i64)
        .unwrap_or_default()
}
