use crate::engine::StoreEngine;
use crate::errors::{KvdaoError, Result};
use crate::protocol::{read_message, write_message, Operation, Outcome, Request, Response};
use crate::thread_pool::ThreadPool;
use crossbeam::crossbeam_channel::{unbounded, Sender};
use slog::{debug, error, info, Logger};
use std::io::Read;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;

/// A store node serving any `StoreEngine` over TCP
pub struct KvdaoServer<E: StoreEngine> {
    /// Address the server will listen on
    addr: String,
    /// Pluggable storage backend
    engine: E,
    /// Logger
    logger: Logger,
}

enum Message {
    Terminate,
}

/// A running server
pub struct ServerHandle {
    local_addr: SocketAddr,
    sender: Sender<Message>,
    handle: thread::JoinHandle<()>,
}

/// Make the accept loop notice a pending `Terminate`
fn request_stop(sender: &Sender<Message>, local_addr: SocketAddr) {
    // the loop may already be gone, in which case nobody is listening
    let _ = sender.send(Message::Terminate);
    let _ = TcpStream::connect(local_addr);
}

impl ServerHandle {
    /// Address the server actually bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections and wait for the accept loop to exit
    pub fn shutdown(self) -> Result<()> {
        request_stop(&self.sender, self.local_addr);
        self.join()
    }

    /// Wait for the accept loop to exit, e.g. after a `Shutdown` request
    pub fn join(self) -> Result<()> {
        self.handle
            .join()
            .map_err(|_| KvdaoError::ThreadPoolError("server thread panicked".to_owned()))
    }
}

/// What to do with a request, and whether the server should stop afterwards
fn dispatch<E: StoreEngine>(engine: &E, request: Request, logger: &Logger) -> (Outcome, bool) {
    let Request {
        keyspace,
        consistency,
        operation,
    } = request;

    let result = match operation {
        Operation::GetColumn {
            column_family,
            key,
            column,
        } => {
            debug!(logger, "get column"; "keyspace" => &keyspace, "column_family" => &column_family, "key" => &key, "column" => &column, "consistency" => %consistency);
            engine
                .get_column(&keyspace, &column_family, &key, &column, consistency)
                .map(Outcome::Column)
        }
        Operation::MultigetSlice {
            column_family,
            keys,
            column_names,
        } => {
            debug!(logger, "multiget slice"; "keyspace" => &keyspace, "column_family" => &column_family, "keys" => keys.len(), "consistency" => %consistency);
            engine
                .multiget_slice(&keyspace, &column_family, &keys, &column_names, consistency)
                .map(Outcome::Rows)
        }
        Operation::BatchMutate { mutations } => {
            debug!(logger, "batch mutate"; "keyspace" => &keyspace, "mutations" => mutations.len(), "consistency" => %consistency);
            engine
                .batch_mutate(&keyspace, &mutations, consistency)
                .map(|_| Outcome::Done)
        }
        Operation::Shutdown => {
            info!(logger, "shutdown requested");
            return (Outcome::Done, true);
        }
    };

    match result {
        Ok(outcome) => (outcome, false),
        Err(e) => {
            error!(logger, "operation failed"; "error" => %e, "kind" => %e.kind());
            (Outcome::failure(&e), false)
        }
    }
}

fn handle_connection<E: StoreEngine>(
    engine: &E,
    mut stream: TcpStream,
    logger: &Logger,
    sender: &Sender<Message>,
    local_addr: SocketAddr,
) -> Result<()> {
    let mut incoming = Vec::new();
    stream.read_to_end(&mut incoming)?;

    if incoming.is_empty() {
        debug!(logger, "empty connection");
        return Ok(());
    }

    let (outcome, stop) = match read_message::<_, Request>(&mut incoming.as_slice()) {
        Ok(request) => dispatch(engine, request, logger),
        Err(e) => {
            error!(logger, "undecodable request"; "error" => %e, "bytes" => incoming.len());
            (Outcome::failure(&e), false)
        }
    };

    write_message(&mut stream, &Response { outcome })?;

    if stop {
        request_stop(sender, local_addr);
    }
    Ok(())
}

impl<E: StoreEngine> KvdaoServer<E> {
    /// Create a new store node listening on `addr` and
    /// serving `engine`
    pub fn new(addr: String, engine: E, logger: Logger) -> Self {
        Self {
            addr,
            engine,
            logger,
        }
    }

    /// Bind the listener and serve connections on `thread_pool`
    /// from a background thread
    pub fn start<P: ThreadPool + Send + 'static>(&self, thread_pool: P) -> Result<ServerHandle> {
        let listener = TcpListener::bind(&self.addr)?;
        let local_addr = listener.local_addr()?;
        info!(self.logger, "listening"; "addr" => %local_addr);

        let (sender, receiver) = unbounded();
        let engine = self.engine.clone();
        let logger = self.logger.clone();
        let loop_sender = sender.clone();

        let handle = thread::spawn(move || {
            for stream in listener.incoming() {
                if let Ok(Message::Terminate) = receiver.try_recv() {
                    break;
                }

                let stream = match stream {
                    Ok(stream) => stream,
                    Err(e) => {
                        error!(logger, "error accepting connection"; "error" => %e);
                        continue;
                    }
                };

                let engine = engine.clone();
                let logger = logger.clone();
                let sender = loop_sender.clone();
                thread_pool.spawn(move || {
                    if let Err(e) = handle_connection(&engine, stream, &logger, &sender, local_addr)
                    {
                        error!(logger, "error handling connection"; "error" => %e);
                    }
                });
            }
            info!(logger, "stopped accepting connections"; "addr" => %local_addr);
        });

        Ok(ServerHandle {
            local_addr,
            sender,
            handle,
        })
    }
}
