extern crate clap;

#[macro_use]
extern crate slog;
extern crate sloggers;

extern crate kvdao;

use std::fs;
use std::io;
use std::path::Path;

use sloggers::terminal::{Destination, TerminalLoggerBuilder};
use sloggers::types::Severity;
use sloggers::Build;

use kvdao::thread_pool::{NaiveThreadPool, RayonThreadPool, SharedQueueThreadPool, ThreadPool};
use kvdao::{KvdaoServer, MemoryEngine, SledEngine, StoreEngine};

use clap::{App, Arg};

fn get_engine(engine_path: &Path) -> io::Result<Option<String>> {
    match fs::read_to_string(engine_path) {
        Ok(e) => Ok(Some(e)),
        Err(ref e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

fn invalid_arg(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, msg)
}

fn serve<E: StoreEngine>(
    addr: String,
    engine: E,
    pool: &str,
    threads: u32,
    logger: slog::Logger,
) -> io::Result<()> {
    let server = KvdaoServer::new(addr, engine, logger);
    let handle = match pool {
        "naive" => server.start(NaiveThreadPool::new(threads)?)?,
        "rayon" => server.start(RayonThreadPool::new(threads)?)?,
        _ => server.start(SharedQueueThreadPool::new(threads)?)?,
    };
    handle.join()?;
    Ok(())
}

fn main() -> io::Result<()> {
    let mut builder = TerminalLoggerBuilder::new();
    builder.level(Severity::Debug);
    builder.destination(Destination::Stderr);

    let logger = builder
        .build()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
    info!(logger, "starting up"; "version" => env!("CARGO_PKG_VERSION"));

    let matches = App::new("kvdao-server")
        .about("column family store node")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Maxb")
        .arg(
            Arg::with_name("addr")
                .short("a")
                .long("addr")
                .help("address to listen on in IP:PORT format")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("engine")
                .short("e")
                .long("engine")
                .help("storage engine, sled or memory")
                .possible_values(&["sled", "memory"])
                .takes_value(true),
        )
        .arg(
            Arg::with_name("data-path")
                .short("p")
                .long("data-path")
                .help("the directory to store data in")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("replicas")
                .short("r")
                .long("replicas")
                .help("replication factor of the memory engine")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("threads")
                .short("t")
                .long("threads")
                .help("number of worker threads")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("pool")
                .long("pool")
                .help("thread pool implementation")
                .possible_values(&["naive", "shared", "rayon"])
                .takes_value(true),
        )
        .get_matches();

    let data_path = Path::new(matches.value_of("data-path").unwrap_or("./"));
    let addr = matches
        .value_of("addr")
        .unwrap_or("127.0.0.1:9160")
        .to_owned();
    let pool = matches.value_of("pool").unwrap_or("shared");
    let threads = match matches.value_of("threads") {
        Some(t) => t
            .parse::<u32>()
            .map_err(|e| invalid_arg(format!("bad thread count {}: {}", t, e)))?,
        None => num_cpus::get() as u32,
    };
    if threads == 0 {
        return Err(invalid_arg("thread count must be at least 1".to_owned()));
    }
    let replicas = match matches.value_of("replicas") {
        Some(r) => r
            .parse::<usize>()
            .map_err(|e| invalid_arg(format!("bad replica count {}: {}", r, e)))?,
        None => 1,
    };

    let engine_opt = matches.value_of("engine").unwrap_or("sled");

    fs::create_dir_all(data_path)?;
    let engine_path = data_path.join("engine");
    let prev_engine = get_engine(&engine_path)?.unwrap_or_else(|| engine_opt.to_owned());

    info!(logger, "configuration";
        "address" => &addr,
        "engine_opt" => engine_opt,
        "prev_engine" => &prev_engine,
        "data_path" => format!("{:?}", data_path.canonicalize()?),
        "pool" => pool,
        "threads" => threads,
        "replicas" => replicas);

    if prev_engine != engine_opt {
        error!(logger, "engine mismatch"; "requested" => engine_opt, "existing" => &prev_engine);
        return Err(io::Error::new(
            io::ErrorKind::Other,
            "engine mismatch".to_owned(),
        ));
    }

    fs::write(&engine_path, engine_opt.as_bytes())?;

    if engine_opt == "memory" {
        serve(addr, MemoryEngine::with_replicas(replicas), pool, threads, logger)
    } else {
        let engine = SledEngine::open(&data_path.join("sled"))?;
        serve(addr, engine, pool, threads, logger)
    }
}
