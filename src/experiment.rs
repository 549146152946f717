use std::io::{ self, Write };
use std::path::Path;

use log::info;

use crate::{
  autoencoder::{ Autoencoder, TrainReport },
  config::Config,
  dataset::{ Dataset, Mode },
  error::Result,
  factors::{ label_factors, Factor },
  pagerank::{ rank_features, FeatureRank },
  plot,
};


pub const BEFORE_HISTOGRAM: &str = "before_weights_histogram.png";
pub const AFTER_HISTOGRAM: &str = "after_weights_histogram.png";
pub const COST_SCATTER: &str = "epochs.png";


/// Everything an experiment produced besides its printed output and plots.

#[derive(Debug)]
pub struct Outcome {
  pub model: Autoencoder<f32>,
  pub report: TrainReport<f32>,
  /// Features, least important first.
  pub ranks: Vec<FeatureRank<f32>>,
  /// Only computed for fabrication data, whose last feature is the pass/fail label.
  pub factors: Option<Vec<Factor<f32>>>,
}


/// Load the data for `mode` and run the experiment on it, printing to stdout.

pub fn run(mode: Mode, input: Option<&Path>, config: &Config) -> Result<Outcome> {
  let dataset = mode.load(input)?;
  info!("{} mode: {} samples of {} features", mode, dataset.rows, dataset.width);
  std::fs::create_dir_all(&config.out_dir)?;
  let stdout = io::stdout();
  let mut out = stdout.lock();
  let outcome = process(mode, &dataset, config, &mut out)?;
  out.flush()?;
  Ok(outcome)
}

/// Train an autoencoder on `dataset`, then rank its features by the
/// PageRank of the learned weight graph.

pub fn process<W: Write>(mode: Mode, dataset: &Dataset, config: &Config, out: &mut W) -> Result<Outcome> {
  config.validate()?;
  if mode == Mode::Iris {
    writeln!(out, "flowers {}", dataset.rows)?;
  }
  let model = Autoencoder::<f32>::new(dataset.width, config.seed);

  plot::histogram("Before Weight Histogram", config.out_dir.join(BEFORE_HISTOGRAM), &model.weights().to_vec(), config.bins)?;

  info!("training for {} iterations", config.iterations);
  let mut failure = None;
  let report = model.train(&dataset.tensor(), config, |i, cost| {
    if failure.is_none() {
      failure = writeln!(out, "{i} {cost}").err();
    }
  });
  if let Some(err) = failure {
    return Err(err.into())
  }
  writeln!(out, "{:?}", report.elapsed)?;

  plot::cost_scatter(config.out_dir.join(COST_SCATTER), &report.costs)?;
  plot::histogram("After Weight Histogram", config.out_dir.join(AFTER_HISTOGRAM), &model.weights().to_vec(), config.bins)?;

  info!("ranking features");
  let ranks = rank_features(
    model.weights(),
    &dataset.headers,
    config.damping as f32,
    config.tolerance as f32,
  );
  let mut sum = 0.0;
  for rank in &ranks {
    writeln!(out, "{} {} {}", rank.node, rank.header, rank.rank)?;
    sum += rank.rank;
  }
  writeln!(out, "{sum}")?;

  let factors = if mode == Mode::Fab {
    let factors = label_factors(model.weights());
    for factor in &factors {
      writeln!(out, "{} {}", factor.column, factor.weight)?;
    }
    Some(factors)
  } else {
    None
  };

  Ok(Outcome { model, report, ranks, factors })
}


#[cfg(test)]
mod tests {
  use super::*;

  fn config(name: &str) -> Config {
    let out_dir = std::env::temp_dir().join("weightrank-experiment-tests").join(name);
    std::fs::create_dir_all(&out_dir).unwrap();
    Config { iterations: 8, bins: 16, out_dir, ..Config::default() }
  }

  #[test]
  fn prints_costs_then_ranks() {
    let dataset = Dataset::new(
      vec!["a".into(), "b".into(), "c".into()],
      3,
      vec![1.0, 0.5, 0.0, 0.0, 1.0, 0.5, 0.5, 0.0, 1.0, 1.0, 1.0, 1.0],
    ).unwrap();
    let config = config("small");
    let mut out = vec![];
    let outcome = process(Mode::Iris, &dataset, &config, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    // sample count, 8 costs, elapsed time, 3 ranks, rank sum
    assert_eq!(lines.len(), 1 + 8 + 1 + 3 + 1);
    assert_eq!(lines[0], "flowers 4");
    assert!(lines[1].starts_with("0 "));
    assert!(lines[8].starts_with("7 "));
    for (line, rank) in lines[10..13].iter().zip(&outcome.ranks) {
      assert_eq!(line.split(' ').nth(1), Some(rank.header.as_str()));
    }
    let sum: f32 = lines[13].parse().unwrap();
    assert!((sum - 1.0).abs() < 1e-3);
    assert!(outcome.factors.is_none());
    for name in [BEFORE_HISTOGRAM, AFTER_HISTOGRAM, COST_SCATTER] {
      assert!(config.out_dir.join(name).exists(), "{name}");
    }
  }

  #[test]
  fn fab_reports_factors() {
    let dataset = Dataset::new(
      vec!["0".into(), "1".into(), "Pass/Fail".into()],
      3,
      vec![0.2, 0.4, -1.0, 0.3, 0.1, 1.0, 0.25, 0.35, -1.0],
    ).unwrap();
    let mut out = vec![];
    let outcome = process(Mode::Fab, &dataset, &config("fab"), &mut out).unwrap();
    let factors = outcome.factors.unwrap();
    assert_eq!(factors.len(), 3);
    assert!(factors.windows(2).all(|pair| pair[0].weight.abs() <= pair[1].weight.abs() ));
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.lines().count(), 8 + 1 + 3 + 1 + 3);
    assert!(!text.starts_with("flowers"));
  }
}
