use crate::column::{Column, Mutation, Rows};
use crate::consistency::ConsistencyLevel;
use crate::engine::StoreEngine;
use crate::errors::{KvdaoError, Result};
use crate::protocol::{read_message, write_message, Operation, Outcome, Request, Response};
use std::io;
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};

/// A `StoreEngine` backed by a `KvdaoServer` reached over TCP.
///
/// Every request opens its own connection.
#[derive(Clone, Debug)]
pub struct RemoteEngine {
    addr: SocketAddr,
}

impl RemoteEngine {
    /// Resolve `host_port` and make sure a node answers there
    pub fn connect(host_port: &str) -> Result<Self> {
        let addr = host_port.to_socket_addrs()?.next().ok_or_else(|| {
            KvdaoError::Io(io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("could not resolve {}", host_port),
            ))
        })?;
        // an empty connection is a probe, the node ignores it
        TcpStream::connect(addr)?;
        Ok(Self { addr })
    }

    /// Address of the node
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Ask the node to stop accepting connections
    pub fn shutdown_server(&self) -> Result<()> {
        let request = Request {
            keyspace: String::new(),
            consistency: ConsistencyLevel::One,
            operation: Operation::Shutdown,
        };
        match self.send(&request)? {
            Outcome::Done => Ok(()),
            other => Err(unexpected(&other)),
        }
    }

    fn send(&self, request: &Request) -> Result<Outcome> {
        let mut stream = TcpStream::connect(self.addr)?;
        write_message(&mut stream, request)?;
        stream.shutdown(Shutdown::Write)?;

        let response: Response = read_message(&mut stream)?;
        match response.outcome {
            Outcome::Failure { kind, message } => Err(KvdaoError::Remote { kind, message }),
            outcome => Ok(outcome),
        }
    }
}

fn unexpected(outcome: &Outcome) -> KvdaoError {
    KvdaoError::ProtocolError(format!("unexpected response {:?}", outcome))
}

impl StoreEngine for RemoteEngine {
    fn get_column(
        &self,
        keyspace: &str,
        column_family: &str,
        key: &str,
        column: &str,
        level: ConsistencyLevel,
    ) -> Result<Option<Column>> {
        let request = Request {
            keyspace: keyspace.to_owned(),
            consistency: level,
            operation: Operation::GetColumn {
                column_family: column_family.to_owned(),
                key: key.to_owned(),
                column: column.to_owned(),
            },
        };
        match self.send(&request)? {
            Outcome::Column(column) => Ok(column),
            other => Err(unexpected(&other)),
        }
    }

    fn multiget_slice(
        &self,
        keyspace: &str,
        column_family: &str,
        keys: &[String],
        column_names: &[String],
        level: ConsistencyLevel,
    ) -> Result<Rows> {
        let request = Request {
            keyspace: keyspace.to_owned(),
            consistency: level,
            operation: Operation::MultigetSlice {
                column_family: column_family.to_owned(),
                keys: keys.to_vec(),
                column_names: column_names.to_vec(),
            },
        };
        match self.send(&request)? {
            Outcome::Rows(rows) => Ok(rows),
            other => Err(unexpected(&other)),
        }
    }

    fn batch_mutate(
        &self,
        keyspace: &str,
        mutations: &[Mutation],
        level: ConsistencyLevel,
    ) -> Result<()> {
        let request = Request {
            keyspace: keyspace.to_owned(),
            consistency: level,
            operation: Operation::BatchMutate {
                mutations: mutations.to_vec(),
            },
        };
        match self.send(&request)? {
            Outcome::Done => Ok(()),
            other => Err(unexpected(&other)),
        }
    }
}
