use serde_derive::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::io;
use std::result;

/// Coarse classification of a `KvdaoError`, preserved across the wire
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request could not be sent, received or decoded
    Transport,
    /// Not enough live replicas to satisfy the consistency level
    Unavailable,
    /// The request itself was malformed (empty names or keys)
    InvalidRequest,
    /// The backing storage failed
    Storage,
    /// Anything else local to the process (thread pools, etc)
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Transport => "transport",
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::InvalidRequest => "invalid request",
            ErrorKind::Storage => "storage",
            ErrorKind::Internal => "internal",
        };
        write!(f, "{}", name)
    }
}

/// Every failure a store-touching operation can report
#[derive(Debug)]
pub enum KvdaoError {
    /// Socket or file level failure
    Io(io::Error),
    /// BSON encoding failure
    EncoderError(bson::EncoderError),
    /// BSON decoding failure
    DecoderError(bson::DecoderError),
    /// Failure inside sled
    SledError(sled::Error),
    /// A store node answered with something unexpected
    ProtocolError(String),
    /// Fewer live replicas than the consistency level requires
    Unavailable {
        /// Replicas the level needs
        required: usize,
        /// Replicas that were live
        alive: usize,
    },
    /// Malformed request
    InvalidRequest(String),
    /// A value could not be turned into the stored representation
    SerializationError(String),
    /// A lock was poisoned
    LockError(String),
    /// A thread pool could not be built
    ThreadPoolError(String),
    /// Failure reported by a remote store node
    Remote {
        /// Kind of the failure on the node
        kind: ErrorKind,
        /// Message from the node
        message: String,
    },
}

impl KvdaoError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            KvdaoError::Io(_)
            | KvdaoError::EncoderError(_)
            | KvdaoError::DecoderError(_)
            | KvdaoError::ProtocolError(_) => ErrorKind::Transport,
            KvdaoError::SledError(_)
            | KvdaoError::SerializationError(_)
            | KvdaoError::LockError(_) => ErrorKind::Storage,
            KvdaoError::Unavailable { .. } => ErrorKind::Unavailable,
            KvdaoError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            KvdaoError::ThreadPoolError(_) => ErrorKind::Internal,
            KvdaoError::Remote { kind, .. } => *kind,
        }
    }
}

impl From<KvdaoError> for io::Error {
    fn from(err: KvdaoError) -> Self {
        match err {
            KvdaoError::Io(err) => err,
            other => io::Error::new(io::ErrorKind::Other, other.to_string()),
        }
    }
}

impl From<io::Error> for KvdaoError {
    fn from(err: io::Error) -> KvdaoError {
        KvdaoError::Io(err)
    }
}

impl From<bson::EncoderError> for KvdaoError {
    fn from(err: bson::EncoderError) -> KvdaoError {
        KvdaoError::EncoderError(err)
    }
}

impl From<bson::DecoderError> for KvdaoError {
    fn from(err: bson::DecoderError) -> KvdaoError {
        KvdaoError::DecoderError(err)
    }
}

impl From<sled::Error> for KvdaoError {
    fn from(err: sled::Error) -> KvdaoError {
        KvdaoError::SledError(err)
    }
}

impl fmt::Display for KvdaoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KvdaoError::Io(err) => write!(f, "io error: {}", err),
            KvdaoError::EncoderError(err) => write!(f, "encoding error: {}", err),
            KvdaoError::DecoderError(err) => write!(f, "decoding error: {}", err),
            KvdaoError::SledError(err) => write!(f, "sled error: {}", err),
            KvdaoError::ProtocolError(msg) => write!(f, "protocol error: {}", msg),
            KvdaoError::Unavailable { required, alive } => write!(
                f,
                "not enough replicas available: required {}, alive {}",
                required, alive
            ),
            KvdaoError::InvalidRequest(msg) => write!(f, "invalid request: {}", msg),
            KvdaoError::SerializationError(msg) => write!(f, "serialization error: {}", msg),
            KvdaoError::LockError(msg) => write!(f, "lock error: {}", msg),
            KvdaoError::ThreadPoolError(msg) => write!(f, "thread pool error: {}", msg),
            KvdaoError::Remote { kind, message } => {
                write!(f, "remote {} error: {}", kind, message)
            }
        }
    }
}

impl Error for KvdaoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            KvdaoError::Io(err) => Some(err),
            KvdaoError::EncoderError(err) => Some(err),
            KvdaoError::DecoderError(err) => Some(err),
            KvdaoError::SledError(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type used throughout kvdao
pub type Result<T> = result::Result<T, KvdaoError>;
