//! Messages exchanged between `RemoteEngine` and `KvdaoServer`.
//!
//! Each connection carries exactly one request and one response, each a
//! single BSON document.

use crate::column::{Column, Mutation, Rows};
use crate::consistency::ConsistencyLevel;
use crate::errors::{ErrorKind, KvdaoError, Result};
use bson::{Bson, Document};
use serde::de::DeserializeOwned;
use serde_derive::{Deserialize, Serialize};
use std::io::{Read, Write};

/// A request sent to a store node
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Request {
    /// Keyspace the operation runs in
    pub keyspace: String,
    /// Level the node has to satisfy
    pub consistency: ConsistencyLevel,
    /// What to do
    pub operation: Operation,
}

/// Operations understood by a store node
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Operation {
    /// Read one column of one row
    GetColumn {
        /// Column family
        column_family: String,
        /// Row key
        key: String,
        /// Column name
        column: String,
    },
    /// Read named columns of several rows
    MultigetSlice {
        /// Column family
        column_family: String,
        /// Row keys
        keys: Vec<String>,
        /// Column names
        column_names: Vec<String>,
    },
    /// Apply a batch of mutations atomically
    BatchMutate {
        /// The batch
        mutations: Vec<Mutation>,
    },
    /// Stop accepting connections
    Shutdown,
}

/// The single reply to a `Request`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Response {
    /// What happened
    pub outcome: Outcome,
}

/// Result of an operation on the node
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Reply to `GetColumn`
    Column(Option<Column>),
    /// Reply to `MultigetSlice`
    Rows(Rows),
    /// Reply to `BatchMutate` and `Shutdown`
    Done,
    /// The operation failed on the node
    Failure {
        /// Kind of the failure
        kind: ErrorKind,
        /// Description of the failure
        message: String,
    },
}

impl Outcome {
    /// Wrap a node side error for the wire
    pub fn failure(err: &KvdaoError) -> Self {
        Outcome::Failure {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Serialize a value that maps to a BSON document
pub(crate) fn to_document<T: serde::Serialize>(value: &T) -> Result<Document> {
    match bson::to_bson(value)? {
        Bson::Document(document) => Ok(document),
        _ => Err(KvdaoError::SerializationError(
            "value does not serialize to a document".to_owned(),
        )),
    }
}

/// Write `value` as one BSON document
pub(crate) fn write_message<W: Write, T: serde::Serialize>(writer: &mut W, value: &T) -> Result<()> {
    let document = to_document(value)?;
    bson::encode_document(writer, &document)?;
    writer.flush()?;
    Ok(())
}

/// Read one BSON document and deserialize it
pub(crate) fn read_message<R: Read, T: DeserializeOwned>(reader: &mut R) -> Result<T> {
    let document = bson::decode_document(reader)?;
    Ok(bson::from_bson(Bson::Document(document))?)
}
