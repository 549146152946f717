use std::path::PathBuf;

use crate::{
  dataset::Mode,
  error::{ Error, Result },
};


pub const USAGE: &str = "usage: weightrank [--mode iris|fab|bee] [--input PATH] [--config PATH] [--out DIR]";


/// Command line options of the `weightrank` binary.

#[derive(Debug, Clone, PartialEq)]
pub struct Args {
  pub mode: Mode,
  /// Data file, defaults to the mode's standard file name.
  pub input: Option<PathBuf>,
  /// TOML file with hyperparameters.
  pub config: Option<PathBuf>,
  /// Overrides the plot directory of the config.
  pub out: Option<PathBuf>,
  pub help: bool,
}

impl Default for Args {
  fn default() -> Self {
    Self { mode: Mode::Iris, input: None, config: None, out: None, help: false }
  }
}

/// Parse arguments, excluding the binary name.
///
/// Flags may start with one or two dashes and take their value either
/// as the next argument or after an `=`.

pub fn parse_cli<I>(mut args: I) -> Result<Args>
where
  I: Iterator<Item = String>,
{
  let mut parsed = Args::default();

  while let Some(arg) = args.next() {
    let flag = arg.strip_prefix("--").or_else(|| arg.strip_prefix('-') )
      .ok_or_else(|| Error::Config(format!("unexpected argument {arg:?}\n{USAGE}")) )?;
    let (name, inline) = match flag.split_once('=') {
      Some((name, value)) => (name, Some(value.to_string())),
      None => (flag, None),
    };
    if name == "h" || name == "help" {
      parsed.help = true;
      continue
    }
    let value = match inline {
      Some(value) => value,
      None => args.next().ok_or_else(|| Error::Config(format!("missing value for {arg}")) )?,
    };
    match name {
      "mode" => parsed.mode = value.parse()?,
      "input" => parsed.input = Some(value.into()),
      "config" => parsed.config = Some(value.into()),
      "out" => parsed.out = Some(value.into()),
      _ => return Err(Error::Config(format!("unknown flag {arg:?}\n{USAGE}"))),
    }
  }

  Ok(parsed)
}

/// Convenience wrapper that parses the arguments of the current process.

pub fn parse_env() -> Result<Args> {
  parse_cli(std::env::args().skip(1))
}
