use std::path::Path;
use std::sync::OnceLock;

use log::debug;
use plotters::prelude::*;
use plotters::coord::{ Shift, types::RangedCoordf64 };
use plotters::style::{ register_font, FontStyle };

use crate::{
  error::{ Error, Result },
  scalar::Real,
};


/// Edge length of every rendered image, 8 inches at 96 dpi.
pub const SIZE: u32 = 768;

const FONT: &[u8] = include_bytes!("../data/DejaVuSans.ttf");

type Chart<'a, 'b> = ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;


/// Number of `values` falling into each of `bins` equal-width buckets
/// spanning `min..=max`.

pub fn bin_counts<T: Real>(values: &[T], bins: usize, min: f64, max: f64) -> Vec<usize> {
  assert!(bins > 0, "Need at least one bin");
  let mut counts = vec![0; bins];
  let width = (max - min) / bins as f64;
  for value in values {
    let value = value.to_f64().unwrap_or(min);
    let bin = if width > 0.0 { ((value - min) / width).floor() as usize } else { 0 };
    counts[bin.min(bins - 1)] += 1;
  }
  counts
}

/// Render a histogram of `values` to the PNG file at `path`.

pub fn histogram<T: Real>(title: &str, path: impl AsRef<Path>, values: &[T], bins: usize) -> Result<()> {
  let path = path.as_ref();
  let (min, max) = bounds(values.iter().filter_map(|v| v.to_f64() ))
    .ok_or_else(|| Error::InvalidData("cannot plot a histogram of nothing".into()) )?;
  let counts = bin_counts(values, bins, min, max);
  let width = (max - min) / bins as f64;
  let top = counts.iter().copied().max().unwrap_or(0) as f64;

  load_font()?;
  let root = BitMapBackend::new(path, (SIZE, SIZE)).into_drawing_area();
  root.fill(&WHITE).map_err(plot_error)?;
  let mut chart = builder(&root, title)
    .build_cartesian_2d(min..max, 0.0..(top * 1.05).max(1.0))
    .map_err(plot_error)?;
  decorate(&mut chart, "weight", "count")?;
  chart.draw_series(counts.iter().enumerate().map(|(i, &count)| {
    let left = min + i as f64 * width;
    Rectangle::new([(left, 0.0), (left + width, count as f64)], BLUE.mix(0.6).filled())
  })).map_err(plot_error)?;
  root.present().map_err(plot_error)?;

  debug!("wrote {} ({} values in {} bins)", path.display(), values.len(), bins);
  Ok(())
}

/// Render the cost of every training epoch as a scatter plot.

pub fn cost_scatter<T: Real>(path: impl AsRef<Path>, costs: &[T]) -> Result<()> {
  let path = path.as_ref();
  let (min, max) = bounds(costs.iter().filter_map(|c| c.to_f64() ))
    .ok_or_else(|| Error::InvalidData("no costs to plot".into()) )?;
  let epochs = costs.len().max(2) as f64 - 1.0;

  load_font()?;
  let root = BitMapBackend::new(path, (SIZE, SIZE)).into_drawing_area();
  root.fill(&WHITE).map_err(plot_error)?;
  let mut chart = builder(&root, "epochs vs cost")
    .build_cartesian_2d(0.0..epochs, min..max)
    .map_err(plot_error)?;
  decorate(&mut chart, "epochs", "cost")?;
  chart.draw_series(costs.iter().enumerate().filter_map(|(i, cost)| {
    cost.to_f64().map(|cost| Circle::new((i as f64, cost), 1, BLACK.filled()) )
  })).map_err(plot_error)?;
  root.present().map_err(plot_error)?;

  debug!("wrote {} ({} epochs)", path.display(), costs.len());
  Ok(())
}


fn plot_error(err: impl std::error::Error) -> Error {
  Error::Plot(err.to_string())
}

/// Finite range covering all values, widened when they all coincide.

fn bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
  let (min, max) = values
    .filter(|v| v.is_finite() )
    .fold(None, |acc: Option<(f64, f64)>, v| match acc {
      None => Some((v, v)),
      Some((min, max)) => Some((min.min(v), max.max(v))),
    })?;
  if max > min { Some((min, max)) } else { Some((min - 0.5, max + 0.5)) }
}

/// Make the bundled font available to plotters under the `sans-serif` family.

fn load_font() -> Result<()> {
  static LOADED: OnceLock<bool> = OnceLock::new();
  let loaded = *LOADED.get_or_init(|| register_font("sans-serif", FontStyle::Normal, FONT).is_ok() );
  if loaded {
    Ok(())
  } else {
    Err(Error::Plot("bundled font could not be loaded".into()))
  }
}

fn builder<'a, 'b>(root: &'a DrawingArea<BitMapBackend<'b>, Shift>, title: &str) -> ChartBuilder<'a, 'b, BitMapBackend<'b>> {
  let mut builder = ChartBuilder::on(root);
  builder
    .margin(16)
    .caption(title, ("sans-serif", 24))
    .x_label_area_size(48)
    .y_label_area_size(64);
  builder
}

fn decorate(chart: &mut Chart, x_desc: &str, y_desc: &str) -> Result<()> {
  chart.configure_mesh()
    .disable_mesh()
    .x_desc(x_desc)
    .y_desc(y_desc)
    .draw()
    .map_err(plot_error)
}


#[cfg(test)]
mod tests {
  use super::*;

  fn scratch(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join("weightrank-plot-tests");
    std::fs::create_dir_all(&dir).unwrap();
    dir.join(name)
  }

  #[test]
  fn counts() {
    let values = [0.0f32, 0.1, 0.5, 0.99, 1.0];
    assert_eq!(bin_counts(&values, 4, 0.0, 1.0), vec![2, 0, 1, 2]);
    assert_eq!(bin_counts(&values, 1, 0.0, 1.0), vec![5]);
  }

  #[test]
  fn constant_values() {
    assert_eq!(bounds([2.0, 2.0].into_iter()), Some((1.5, 2.5)));
    assert_eq!(bounds([f64::NAN].into_iter()), None);
  }

  #[test]
  fn renders_histogram() {
    let path = scratch("histogram.png");
    let values: Vec<f32> = (0..100).map(|i| (i as f32 / 10.0).sin() ).collect();
    histogram("Before Weight Histogram", &path, &values, 16).unwrap();
    assert!(std::fs::metadata(&path).unwrap().len() > 0);
  }

  #[test]
  fn title_is_drawn() {
    let values: Vec<f32> = (0..64).map(|i| i as f32 / 64.0 ).collect();
    let before = scratch("title-before.png");
    let after = scratch("title-after.png");
    histogram("Before Weight Histogram", &before, &values, 16).unwrap();
    histogram("After Weight Histogram", &after, &values, 16).unwrap();
    assert_ne!(std::fs::read(&before).unwrap(), std::fs::read(&after).unwrap());
  }

  #[test]
  fn renders_scatter() {
    let path = scratch("epochs.png");
    cost_scatter(&path, &[3.0f64, 2.0, 1.5, 1.25]).unwrap();
    assert!(std::fs::metadata(&path).unwrap().len() > 0);
  }

  #[test]
  fn empty_histogram() {
    let values: [f32; 0] = [];
    assert!(matches!(histogram("", scratch("empty.png"), &values, 4), Err(Error::InvalidData(_))));
  }
}
