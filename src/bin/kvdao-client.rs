extern crate clap;
extern crate kvdao;

use std::collections::HashMap;
use std::io;
use std::process;

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};

use kvdao::{DaoConfig, KvDao, KvdaoError, RemoteEngine};

const DEFAULT_ADDR: &str = "127.0.0.1:9160";
const DEFAULT_KEYSPACE: &str = "Keyspace1";

fn open_dao(matches: &ArgMatches) -> kvdao::Result<KvDao<RemoteEngine>> {
    let addr = matches.value_of("addr").unwrap_or(DEFAULT_ADDR);
    let keyspace = matches.value_of("keyspace").unwrap_or(DEFAULT_KEYSPACE);
    let dao = KvDao::connect(addr, keyspace)?;

    let defaults = DaoConfig::default();
    let config = DaoConfig {
        column_family: matches
            .value_of("column-family")
            .map(|s| s.to_owned())
            .unwrap_or(defaults.column_family),
        column_name: matches
            .value_of("column")
            .map(|s| s.to_owned())
            .unwrap_or(defaults.column_name),
    };
    Ok(KvDao::new(dao.keyspace().clone(), config))
}

/// Inserts `count` generated pairs one by one, then reads them back
fn demo(dao: &KvDao<RemoteEngine>, count: usize) -> kvdao::Result<()> {
    for i in 0..count {
        dao.insert(&format!("key{}", i), &format!("value{}", i))?;
    }
    for i in 0..count {
        match dao.get(&format!("key{}", i))? {
            Some(value) => println!("{}", value),
            None => println!("Key not found"),
        }
    }
    Ok(())
}

fn run(name: &str, matches: &ArgMatches) -> kvdao::Result<()> {
    let dao = open_dao(matches)?;
    match name {
        "get" => {
            let key = matches.value_of("key").unwrap_or_default();
            match dao.get(key)? {
                Some(value) => println!("{}", value),
                None => println!("Key not found"),
            }
        }
        "set" => {
            let key = matches.value_of("key").unwrap_or_default();
            let value = matches.value_of("value").unwrap_or_default();
            dao.insert(key, value)?;
        }
        "mget" => {
            let keys: Vec<&str> = matches.values_of("keys").map(|v| v.collect()).unwrap_or_default();
            let values = dao.get_multi(&keys)?;
            for key in keys {
                if let Some(value) = values.get(key) {
                    println!("{}\t{}", key, value);
                }
            }
        }
        "mset" => {
            let pairs: Vec<&str> = matches.values_of("pairs").map(|v| v.collect()).unwrap_or_default();
            if pairs.len() % 2 != 0 {
                return Err(KvdaoError::InvalidRequest(
                    "mset needs key value pairs".to_owned(),
                ));
            }
            let key_values: HashMap<String, String> = pairs
                .chunks(2)
                .map(|pair| (pair[0].to_owned(), pair[1].to_owned()))
                .collect();
            dao.insert_multi(&key_values)?;
        }
        "rm" => {
            let keys: Vec<&str> = matches.values_of("keys").map(|v| v.collect()).unwrap_or_default();
            dao.delete(&keys)?;
        }
        "demo" => {
            let count = match matches.value_of("count") {
                Some(c) => c.parse::<usize>().map_err(|e| {
                    io::Error::new(io::ErrorKind::InvalidInput, format!("bad count {}: {}", c, e))
                })?,
                None => 100,
            };
            demo(&dao, count)?;
        }
        "shutdown" => {
            dao.keyspace().engine().shutdown_server()?;
        }
        _ => {}
    }
    Ok(())
}

fn main() {
    let connection_args = vec![
        Arg::with_name("addr")
            .short("a")
            .long("addr")
            .help("address to connect to in IP:PORT format")
            .takes_value(true),
        Arg::with_name("keyspace")
            .short("k")
            .long("keyspace")
            .help("keyspace to use")
            .takes_value(true),
        Arg::with_name("column-family")
            .short("c")
            .long("column-family")
            .help("column family holding the values")
            .takes_value(true),
        Arg::with_name("column")
            .long("column")
            .help("column the values are stored under")
            .takes_value(true),
    ];

    let matches = App::new("kvdao-client")
        .about("key value access to a column family store")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Maxb")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("get")
                .about("get a key")
                .arg(
                    Arg::with_name("key")
                        .help("the key to fetch")
                        .index(1)
                        .required(true),
                )
                .args(&connection_args),
        )
        .subcommand(
            SubCommand::with_name("set")
                .about("set a key")
                .arg(
                    Arg::with_name("key")
                        .help("the key to set")
                        .index(1)
                        .required(true),
                )
                .arg(
                    Arg::with_name("value")
                        .help("the value to set to")
                        .index(2)
                        .required(true),
                )
                .args(&connection_args),
        )
        .subcommand(
            SubCommand::with_name("mget")
                .about("get several keys in one request")
                .arg(
                    Arg::with_name("keys")
                        .help("the keys to fetch")
                        .index(1)
                        .multiple(true)
                        .required(true),
                )
                .args(&connection_args),
        )
        .subcommand(
            SubCommand::with_name("mset")
                .about("set several keys in one batch")
                .arg(
                    Arg::with_name("pairs")
                        .help("alternating keys and values")
                        .index(1)
                        .multiple(true)
                        .required(true),
                )
                .args(&connection_args),
        )
        .subcommand(
            SubCommand::with_name("rm")
                .about("remove keys")
                .arg(
                    Arg::with_name("keys")
                        .help("the keys to remove")
                        .index(1)
                        .multiple(true)
                        .required(true),
                )
                .args(&connection_args),
        )
        .subcommand(
            SubCommand::with_name("demo")
                .about("insert generated keys, then read them back")
                .arg(
                    Arg::with_name("count")
                        .short("n")
                        .long("count")
                        .help("number of keys, 100 by default")
                        .takes_value(true),
                )
                .args(&connection_args),
        )
        .subcommand(
            SubCommand::with_name("shutdown")
                .about("stop the store node")
                .args(&connection_args),
        )
        .get_matches();

    let (name, sub_matches) = match matches.subcommand() {
        (name, Some(sub_matches)) => (name, sub_matches),
        _ => process::exit(1),
    };

    if let Err(e) = run(name, sub_matches) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
