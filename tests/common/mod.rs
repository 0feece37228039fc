#![allow(dead_code, clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use dbprobe::{
    config::{
        self, DB_CONNECT_TIMEOUT, DB_HOST, DB_NAME, DB_PASSWORD, DB_PORT, DB_TYPE, DB_USER,
    },
    descriptor::ConnectionDescriptor,
};
use std::{collections::HashMap, env, process::Command};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    time::{Duration, Instant, sleep},
};

/// Settings matching the compose/podman containers used in CI
pub const POSTGRES_ENV: &[(&str, &str)] = &[
    (DB_TYPE, "postgres"),
    (DB_HOST, "127.0.0.1"),
    (DB_PORT, "5432"),
    (DB_USER, "postgres"),
    (DB_PASSWORD, "secret"),
    (DB_NAME, "testdb"),
];

pub const MARIADB_ENV: &[(&str, &str)] = &[
    (DB_TYPE, "mysql"),
    (DB_HOST, "127.0.0.1"),
    (DB_PORT, "3306"),
    (DB_USER, "dbprobe"),
    (DB_PASSWORD, "secret"),
    (DB_NAME, "testdb"),
];

pub const DB_KEYS: &[&str] = &[
    DB_TYPE,
    DB_HOST,
    DB_PORT,
    DB_USER,
    DB_PASSWORD,
    DB_NAME,
    DB_CONNECT_TIMEOUT,
];

pub fn skip_if_no_postgres() -> bool {
    env::var("SKIP_POSTGRES_TESTS").is_ok()
}

pub fn skip_if_no_mariadb() -> bool {
    env::var("SKIP_MARIADB_TESTS").is_ok()
}

pub fn source(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

/// Override or add one key of a fixed setting
pub fn with(pairs: &[(&str, &str)], key: &str, value: &str) -> HashMap<String, String> {
    let mut map = source(pairs);
    map.insert(key.to_string(), value.to_string());
    map
}

pub fn descriptor(pairs: &[(&str, &str)]) -> ConnectionDescriptor {
    ConnectionDescriptor::build(&config::resolve(&source(pairs)).expect("valid configuration"))
}

/// A local port nobody listens on, also usable as a free port to bind
pub fn pick_closed_port() -> u16 {
    std::net::TcpListener::bind(("127.0.0.1", 0))
        .expect("failed to bind random local port")
        .local_addr()
        .expect("failed to read local addr")
        .port()
}

/// `dbprobe` binary with a clean database environment
pub fn dbprobe_cmd(pairs: &[(&str, &str)]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_dbprobe"));
    for key in DB_KEYS {
        cmd.env_remove(key);
    }
    for key in ["RUST_LOG", "DBPROBE_HOST", "DBPROBE_PORT", "DBPROBE_DEBUG"] {
        cmd.env_remove(key);
    }
    cmd.envs(pairs.iter().copied());
    cmd
}

/// Plain HTTP/1.1 GET, returns the status code and body
pub async fn http_get(port: u16, path: &str) -> Option<(u16, String)> {
    let mut stream = TcpStream::connect(("127.0.0.1", port)).await.ok()?;
    let request =
        format!("GET {path} HTTP/1.1\r\nHost: 127.0.0.1:{port}\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await.ok()?;

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.ok()?;
    let response = String::from_utf8(response).ok()?;
    let (head, body) = response.split_once("\r\n\r\n")?;
    let status = head.split_whitespace().nth(1)?.parse().ok()?;
    Some((status, body.to_string()))
}

/// Poll `path` until the server answers or `timeout` elapses
pub async fn wait_for_http(port: u16, path: &str, timeout: Duration) -> Option<(u16, String)> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(response) = http_get(port, path).await {
            return Some(response);
        }

        if Instant::now() >= deadline {
            return None;
        }

        sleep(Duration::from_millis(100)).await;
    }
}
