use crate::error::Error;
use crate::result::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

/// What the binary was asked to do
#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    /// Run one building block described by a step manifest
    Launch { manifest: PathBuf, dry_run: bool },

    /// Pack files and directories into an archive
    Zip { output: PathBuf, sources: Vec<PathBuf> },
}

/// Command-line arguments
#[derive(Debug)]
pub struct Args {
    /// Enable verbose output
    pub verbose: bool,

    pub action: Action,
}

fn command() -> Command {
    Command::new("biobb-bioml")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Building blocks for the BioML feature extraction and model training toolkit")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Enable verbose output"),
        )
        .subcommand(
            Command::new("launch")
                .about("Run the building block described by a step manifest")
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .value_name("FILE")
                        .required(true)
                        .help("Step manifest (TOML)"),
                )
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .action(ArgAction::SetTrue)
                        .help("Print the command line without staging or running it"),
                ),
        )
        .subcommand(
            Command::new("zip")
                .about("Archive files and directories (.zip, .tar.gz or .tgz)")
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("ARCHIVE")
                        .required(true)
                        .help("Destination archive, overwritten if present"),
                )
                .arg(
                    Arg::new("sources")
                        .value_name("SOURCE")
                        .num_args(0..)
                        .help("Files and directories to archive"),
                ),
        )
}

impl Args {
    /// Parse command-line arguments
    pub fn parse() -> Result<Self> {
        Self::from_matches(&command().get_matches())
    }

    fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let verbose = matches.get_flag("verbose");

        let action = match matches.subcommand() {
            Some(("launch", sub)) => Action::Launch {
                manifest: sub
                    .get_one::<String>("config")
                    .map(PathBuf::from)
                    .ok_or_else(|| Error::custom("Missing --config"))?,
                dry_run: sub.get_flag("dry-run"),
            },
            Some(("zip", sub)) => Action::Zip {
                output: sub
                    .get_one::<String>("output")
                    .map(PathBuf::from)
                    .ok_or_else(|| Error::custom("Missing --output"))?,
                sources: sub
                    .get_many::<String>("sources")
                    .map(|values| values.map(PathBuf::from).collect())
                    .unwrap_or_default(),
            },
            _ => return Err(Error::custom("Unknown subcommand")),
        };

        Ok(Self { verbose, action })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        let matches = command().try_get_matches_from(argv).unwrap();
        Args::from_matches(&matches).unwrap()
    }

    #[test]
    fn test_launch() {
        let args = parse(&["biobb-bioml", "launch", "-c", "train.toml", "--dry-run", "-v"]);

        assert!(args.verbose);
        assert_eq!(
            args.action,
            Action::Launch {
                manifest: PathBuf::from("train.toml"),
                dry_run: true,
            }
        );
    }

    #[test]
    fn test_zip() {
        let args = parse(&["biobb-bioml", "zip", "-o", "out.zip", "results", "model.pkl"]);

        assert!(!args.verbose);
        assert_eq!(
            args.action,
            Action::Zip {
                output: PathBuf::from("out.zip"),
                sources: vec![PathBuf::from("results"), PathBuf::from("model.pkl")],
            }
        );
    }

    #[test]
    fn test_zip_without_sources() {
        let args = parse(&["biobb-bioml", "zip", "--output", "empty.zip"]);
        assert!(matches!(args.action, Action::Zip { ref sources, .. } if sources.is_empty()));
    }

    #[test]
    fn test_launch_requires_config() {
        assert!(command().try_get_matches_from(["biobb-bioml", "launch"]).is_err());
    }

    #[test]
    fn test_command_is_consistent() {
        command().debug_assert();
    }
}
