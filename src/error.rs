use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum Error {
  Io(std::io::Error),
  Csv(csv::Error),
  Config(String),
  Parse { file: PathBuf, value: String },
  InvalidData(String),
  Plot(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Error::Io(err) => write!(f, "io error: {err}"),
      Error::Csv(err) => write!(f, "csv error: {err}"),
      Error::Config(msg) => write!(f, "invalid config: {msg}"),
      Error::Parse { file, value } => write!(f, "could not parse {value:?} in {}", file.display()),
      Error::InvalidData(msg) => write!(f, "invalid data: {msg}"),
      Error::Plot(msg) => write!(f, "plot failed: {msg}"),
    }
  }
}

impl std::error::Error for Error {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Error::Io(err) => Some(err),
      Error::Csv(err) => Some(err),
      _ => None,
    }
  }
}

impl From<std::io::Error> for Error {
  fn from(err: std::io::Error) -> Self {
    Error::Io(err)
  }
}

impl From<csv::Error> for Error {
  fn from(err: csv::Error) -> Self {
    Error::Csv(err)
  }
}

impl From<toml::de::Error> for Error {
  fn from(err: toml::de::Error) -> Self {
    Error::Config(err.to_string())
  }
}
