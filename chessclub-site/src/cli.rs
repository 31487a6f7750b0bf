use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;

use getopts::Options;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Args {
    pub address: Option<SocketAddr>,
    pub env_file: Option<PathBuf>,
}

fn opts() -> Options {
    let mut opts = Options::new();
    opts.optflag(
        "h",
        "help",
        concat!("Print the help output of ", env!("CARGO_PKG_NAME")),
    );
    opts.optopt(
        "a",
        "address",
        "Socket address (IP and port) to listen on, overrides CHESSCLUB_SITE_ADDR [Default: 127.0.0.1:8080]",
        "SOCKET_ADDRESS",
    );
    opts.optopt(
        "e",
        "env-file",
        "Load environment variables from this file instead of ./.env",
        "PATH",
    );
    opts
}

pub fn try_parse(args: &[String]) -> Result<Option<Args>, String> {
    let opts = opts();
    let matches = opts.parse(args).map_err(|fail| fail.to_string())?;

    if matches.opt_present("help") {
        return Ok(None);
    }

    let address = matches
        .opt_get::<SocketAddr>("address")
        .map_err(|err| format!("Provided value for option 'address' is invalid: {err}"))?;

    Ok(Some(Args {
        address,
        env_file: matches.opt_str("env-file").map(PathBuf::from),
    }))
}

/// Parses the process arguments (without the program name), exiting on
/// `--help` or invalid input.
pub fn parse(args: Vec<String>) -> Args {
    match try_parse(&args) {
        Ok(Some(args)) => args,
        Ok(None) => {
            let opts = opts();
            println!("{}", opts.usage(&opts.short_usage(env!("CARGO_PKG_NAME"))));
            process::exit(0);
        }
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn defaults_to_nothing() {
        assert_eq!(try_parse(&[]), Ok(Some(Args::default())));
    }

    #[test]
    fn address_and_env_file() {
        let parsed = try_parse(&args(&["-a", "0.0.0.0:3000", "--env-file", "/etc/club.env"]))
            .unwrap()
            .unwrap();
        assert_eq!(parsed.address, Some(SocketAddr::from(([0, 0, 0, 0], 3000))));
        assert_eq!(parsed.env_file, Some(PathBuf::from("/etc/club.env")));
    }

    #[test]
    fn help_and_errors() {
        assert_eq!(try_parse(&args(&["--help"])), Ok(None));
        assert!(try_parse(&args(&["--address", "nowhere"])).is_err());
        assert!(try_parse(&args(&["--verbose"])).is_err());
    }
}
