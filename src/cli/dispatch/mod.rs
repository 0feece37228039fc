use crate::cli::{
    actions::Action,
    commands::{DEFAULT_PORT, DEFAULT_SERVE_HOST},
};
use anyhow::{Context, Result};
use clap::ArgMatches;
use std::net::{IpAddr, Ipv4Addr};

/// Convert `ArgMatches` into typed Action enum with validation
///
/// No subcommand means serving on the loopback address with debug logging.
///
/// # Errors
///
/// Returns an error if the listen address is not a valid IP address
pub fn dispatch(matches: &ArgMatches) -> Result<Action> {
    match matches.subcommand() {
        Some(("check", _)) => Ok(Action::Check),
        Some(("serve", sub)) => {
            let host = sub
                .get_one::<String>("host")
                .map_or(DEFAULT_SERVE_HOST, String::as_str);
            let listen = host
                .parse::<IpAddr>()
                .with_context(|| format!("Invalid IP address: {host}"))?;

            Ok(Action::Serve {
                listen,
                port: sub.get_one::<u16>("port").copied().unwrap_or(DEFAULT_PORT),
                debug: sub.get_flag("debug"),
            })
        }
        _ => Ok(Action::Serve {
            listen: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            debug: true,
        }),
    }
}
