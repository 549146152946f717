use std::fs;
use std::path::{ Path, PathBuf };

use serde::Deserialize;

use crate::error::{ Error, Result };


/// Experiment hyperparameters, optionally loaded from a TOML file.
///
/// Keys missing from the file keep their default value.

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
  /// Number of full-batch gradient descent steps.
  pub iterations: usize,
  /// Fraction of the previous update carried over into the next one.
  pub momentum: f64,
  pub learning_rate: f64,
  /// Gradients with a larger global norm get rescaled to this norm.
  pub clip_norm: f64,
  /// Seed for weight initialization.
  pub seed: u64,
  /// PageRank damping factor.
  pub damping: f64,
  /// PageRank stops once the total rank change drops to this value.
  pub tolerance: f64,
  /// Number of histogram bins.
  pub bins: usize,
  /// Directory that receives the rendered plots.
  pub out_dir: PathBuf,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      iterations: 256,
      momentum: 0.3,
      learning_rate: 0.3,
      clip_norm: 1.0,
      seed: 1,
      damping: 0.85,
      tolerance: 1e-6,
      bins: 256,
      out_dir: PathBuf::from("."),
    }
  }
}

impl Config {
  pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
    let content = fs::read_to_string(path.as_ref())?;
    let config: Self = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
  }

  pub fn validate(&self) -> Result<()> {
    if !(self.damping > 0.0 && self.damping < 1.0) {
      return Err(Error::Config(format!("damping must lie in (0, 1), got {}", self.damping)))
    }
    if self.tolerance <= 0.0 {
      return Err(Error::Config(format!("tolerance must be positive, got {}", self.tolerance)))
    }
    if self.clip_norm <= 0.0 {
      return Err(Error::Config(format!("clip_norm must be positive, got {}", self.clip_norm)))
    }
    if self.bins == 0 {
      return Err(Error::Config("bins must be at least 1".into()))
    }
    Ok(())
  }
}
