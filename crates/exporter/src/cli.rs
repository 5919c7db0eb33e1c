use std::path::PathBuf;

pub const DEFAULT_CONFIG_PATH: &str = "config.yml";

const USAGE: &str = "\
Usage: lagwatch [OPTIONS]

Options:
  -c, --config <PATH>  Configuration file (default: config.yml)
  -V, --version        Print version
  -h, --help           Print help
";

#[derive(Debug)]
pub struct Args {
    pub config_path: PathBuf,
}

#[derive(Debug)]
enum Parsed {
    Run(Args),
    Help,
    Version,
}

pub fn parse() -> Args {
    match parse_from(std::env::args().skip(1)) {
        Ok(Parsed::Run(args)) => args,
        Ok(Parsed::Help) => {
            print!("{USAGE}");
            std::process::exit(0);
        }
        Ok(Parsed::Version) => {
            println!("lagwatch {}", env!("CARGO_PKG_VERSION"));
            std::process::exit(0);
        }
        Err(msg) => {
            eprintln!("error: {msg}");
            eprint!("{USAGE}");
            std::process::exit(2);
        }
    }
}

fn parse_from(args: impl Iterator<Item = String>) -> Result<Parsed, String> {
    let mut args = args;
    let mut config_path = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Parsed::Help),
            "-V" | "--version" => return Ok(Parsed::Version),
            "-c" | "--config" => {
                let path = args
                    .next()
                    .ok_or_else(|| "--config requires a path".to_string())?;
                config_path = Some(PathBuf::from(path));
            }
            other => match other.strip_prefix("--config=") {
                Some(path) if !path.is_empty() => config_path = Some(PathBuf::from(path)),
                _ => return Err(format!("unknown argument '{other}'")),
            },
        }
    }

    Ok(Parsed::Run(Args {
        config_path: config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH)),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(args: &[&str]) -> Result<Parsed, String> {
        parse_from(args.iter().map(|s| s.to_string()))
    }

    fn config_path(args: &[&str]) -> PathBuf {
        match run(args) {
            Ok(Parsed::Run(a)) => a.config_path,
            _ => panic!("expected run args"),
        }
    }

    #[test]
    fn defaults_to_config_yml() {
        assert_eq!(config_path(&[]), PathBuf::from(DEFAULT_CONFIG_PATH));
    }

    #[test]
    fn config_flag_forms() {
        assert_eq!(config_path(&["--config", "/etc/lagwatch.yml"]), PathBuf::from("/etc/lagwatch.yml"));
        assert_eq!(config_path(&["-c", "a.yml"]), PathBuf::from("a.yml"));
        assert_eq!(config_path(&["--config=b.yml"]), PathBuf::from("b.yml"));
    }

    #[test]
    fn last_config_wins() {
        assert_eq!(config_path(&["-c", "a.yml", "--config", "b.yml"]), PathBuf::from("b.yml"));
    }

    #[test]
    fn missing_config_value_is_error() {
        assert!(run(&["--config"]).unwrap_err().contains("requires a path"));
        assert!(run(&["--config="]).unwrap_err().contains("unknown argument"));
    }

    #[test]
    fn unknown_argument_is_error() {
        assert!(run(&["--verbose"]).unwrap_err().contains("--verbose"));
    }

    #[test]
    fn help_and_version_short_circuit() {
        assert!(matches!(run(&["-h"]), Ok(Parsed::Help)));
        assert!(matches!(run(&["--config", "a.yml", "--version"]), Ok(Parsed::Version)));
    }
}
