//! Parsing Options.
//! `pflow [--target {rust,python,json,ron}] [--output FILE] [--config FILE] [--name NAME] FILE`

use clap::{Arg, Command};
use std::path::PathBuf;
use thiserror::Error;

use crate::codegen::Target;
use crate::config::DEFAULT_CONFIG_FILE;

#[derive(Debug, Error)]
pub enum OptionsError {
    #[error(transparent)]
    Clap(#[from] clap::Error),
    #[error("mismatched quotes in PFLOW_FLAGS")]
    MismatchedQuotes,
    #[error("{0}")]
    Target(String),
}

fn make_options_parser() -> clap::Command {
    Command::new("pflow")
        .no_binary_name(true)
        .version("v0.1.0")
        .about("Compiles a pflow net definition into a vector addition system model")
        .arg(
            Arg::new("input")
                .value_name("FILE")
                .help("Net definition document")
                .required(true),
        )
        .arg(
            Arg::new("target")
                .short('t')
                .long("target")
                .help("What to emit for the compiled model")
                .value_parser(Target::NAMES),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Where to write the emitted artifact; stdout when absent"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .default_value(DEFAULT_CONFIG_FILE),
        )
        .arg(
            Arg::new("name")
                .short('n')
                .long("name")
                .help("Machine name; defaults to the input file stem"),
        )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub input: PathBuf,
    pub target: Option<Target>,
    pub output: Option<PathBuf>,
    pub config: PathBuf,
    pub name: Option<String>,
}

impl Options {
    /// `env_flags` (as found in `PFLOW_FLAGS`) go before the real arguments.
    pub fn parse_with_env_flags(env_flags: &str, args: &[String]) -> Result<Self, OptionsError> {
        let mut flags = shellwords::split(env_flags).map_err(|_| OptionsError::MismatchedQuotes)?;
        flags.extend(args.iter().cloned());
        Self::parse_from_args(&flags)
    }

    pub fn parse_from_args(flags: &[String]) -> Result<Self, OptionsError> {
        let matches = make_options_parser().try_get_matches_from(flags.iter())?;
        let string = |id: &str| matches.get_one::<String>(id).cloned();

        let target = string("target")
            .map(|name| name.parse::<Target>())
            .transpose()
            .map_err(OptionsError::Target)?;

        Ok(Options {
            input: string("input").map(PathBuf::from).unwrap_or_default(),
            target,
            output: string("output").map(PathBuf::from),
            config: string("config")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE)),
            name: string("name"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(flags: &[&str]) -> Vec<String> {
        flags.iter().map(|flag| flag.to_string()).collect()
    }

    #[test]
    fn test_parse_defaults() {
        let options = Options::parse_from_args(&args(&["net.pflow"])).unwrap();
        assert_eq!(options.input, PathBuf::from("net.pflow"));
        assert_eq!(options.target, None);
        assert_eq!(options.output, None);
        assert_eq!(options.config, PathBuf::from("pflow.toml"));
    }

    #[test]
    fn test_parse_all_flags() {
        let options = Options::parse_from_args(&args(&[
            "-t", "python", "-o", "out.py", "-c", "cfg.toml", "-n", "Orders", "net.pflow",
        ]))
        .unwrap();
        assert_eq!(options.target, Some(Target::Python));
        assert_eq!(options.output, Some(PathBuf::from("out.py")));
        assert_eq!(options.config, PathBuf::from("cfg.toml"));
        assert_eq!(options.name.as_deref(), Some("Orders"));
    }

    #[test]
    fn test_env_flags_come_first() {
        let options =
            Options::parse_with_env_flags("--target 'json'", &args(&["net.pflow"])).unwrap();
        assert_eq!(options.target, Some(Target::Json));

        assert!(matches!(
            Options::parse_with_env_flags("--name 'open", &args(&["net.pflow"])),
            Err(OptionsError::MismatchedQuotes)
        ));
    }

    #[test]
    fn test_parse_from_args_err() {
        assert!(Options::parse_from_args(&args(&["-t", "cobol", "net.pflow"])).is_err());
        assert!(Options::parse_from_args(&args(&[])).is_err());
    }
}
