//! devfp CLI: prints this host's fingerprint, or scores two inputs.
//!
//! ```text
//! devfp [--config <file>]                              print generate() as JSON
//! devfp [--config <file>] compare <a> <b> [--explain]  print the similarity score
//! ```
//!
//! Each compare operand is read from the file it names when one exists, and
//! taken as literal text (JSON or a bare identifier) otherwise.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use devfp::{DevfpConfig, generate_with, set_digest_algorithm};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: devfp [--config <file>] [compare <a> <b> [--explain]]";

enum Command {
    Generate,
    Compare {
        left: String,
        right: String,
        explain: bool,
    },
    Help,
}

struct Args {
    config: Option<PathBuf>,
    command: Command,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Args> {
    let mut config = None;
    let mut positional = Vec::new();
    let mut explain = false;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = args.next().context("--config needs a file argument")?;
                config = Some(PathBuf::from(path));
            }
            "--explain" => explain = true,
            "--help" | "-h" => {
                return Ok(Args {
                    config,
                    command: Command::Help,
                });
            }
            _ => positional.push(arg),
        }
    }

    let command = match positional.as_slice() {
        [] if !explain => Command::Generate,
        [cmd, left, right] if cmd == "compare" => Command::Compare {
            left: left.clone(),
            right: right.clone(),
            explain,
        },
        _ => bail!("unrecognized arguments\n{USAGE}"),
    };
    Ok(Args { config, command })
}

fn read_operand(operand: &str) -> anyhow::Result<String> {
    let path = Path::new(operand);
    if path.is_file() {
        return std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()));
    }
    Ok(operand.to_string())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    let config = match &args.config {
        Some(path) => DevfpConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DevfpConfig::default(),
    };

    match args.command {
        Command::Help => println!("{USAGE}"),
        Command::Generate => {
            set_digest_algorithm(config.digest_algorithm());
            let fingerprint = generate_with(&config.collector()).await;
            println!("{}", serde_json::to_string_pretty(&fingerprint)?);
        }
        Command::Compare {
            left,
            right,
            explain,
        } => {
            let comparator = config.comparator()?;
            let left = read_operand(&left)?;
            let right = read_operand(&right)?;
            if explain {
                let report = comparator.explain(left, right);
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", comparator.compare(left, right));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<Args> {
        parse_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn no_arguments_generates() {
        let args = parse(&[]).unwrap();
        assert!(matches!(args.command, Command::Generate));
        assert!(args.config.is_none());
    }

    #[test]
    fn compare_with_config_and_explain() {
        let args = parse(&["--config", "devfp.yaml", "compare", "a", "b", "--explain"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("devfp.yaml")));
        match args.command {
            Command::Compare {
                left,
                right,
                explain,
            } => {
                assert_eq!((left.as_str(), right.as_str()), ("a", "b"));
                assert!(explain);
            }
            _ => panic!("expected compare"),
        }
    }

    #[test]
    fn stray_arguments_are_rejected() {
        assert!(parse(&["compare", "only-one"]).is_err());
        assert!(parse(&["frobnicate"]).is_err());
        assert!(parse(&["--config"]).is_err());
    }

    #[test]
    fn literal_operand_is_passed_through() {
        assert_eq!(read_operand("not-a-file-abc123").unwrap(), "not-a-file-abc123");
    }
}
