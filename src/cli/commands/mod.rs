use clap::{
    Arg, ArgAction, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

pub const DEFAULT_SERVE_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;

/// Pure clap command definitions with zero business logic
#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new(env!("CARGO_PKG_NAME"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .after_help(
            "Database settings are read from the environment on every check:\n  \
            DB_TYPE             postgres (default) | mysql\n  \
            DB_HOST             host name (default: localhost)\n  \
            DB_PORT             port (default: 5432 for postgres, 3306 for mysql)\n  \
            DB_USER             user name\n  \
            DB_PASSWORD         password\n  \
            DB_NAME             database (default: postgres or mysql)\n  \
            DB_CONNECT_TIMEOUT  seconds allowed for connect and for the query (default: 5)\n\n\
            Without a subcommand the HTTP server starts on 127.0.0.1:5000 with debug logging.",
        )
        .subcommand(
            Command::new("check")
                .about("Run a liveness check against the configured database")
                .long_about(
                    "Run a liveness check against the configured database.\n\n\
                    Prints the result as JSON and exits with 0 when the database\n\
                    answered SELECT 1, or 2 otherwise.",
                ),
        )
        .subcommand(
            Command::new("serve")
                .about("Serve GET /db/health over HTTP")
                .arg(
                    Arg::new("host")
                        .default_value(DEFAULT_SERVE_HOST)
                        .env("DBPROBE_HOST")
                        .help("IP address to bind to")
                        .long("host")
                        .value_name("IP"),
                )
                .arg(
                    Arg::new("port")
                        .default_value("5000")
                        .env("DBPROBE_PORT")
                        .help("listening port")
                        .long("port")
                        .short('p')
                        .value_parser(clap::value_parser!(u16)),
                )
                .arg(
                    Arg::new("debug")
                        .action(ArgAction::SetTrue)
                        .env("DBPROBE_DEBUG")
                        .help("enable debug logging")
                        .long("debug"),
                ),
        )
}
