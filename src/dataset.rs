use std::fmt;
use std::io::Read;
use std::path::{ Path, PathBuf };
use std::str::FromStr;

use log::{ debug, warn };

use crate::{
  error::{ Error, Result },
  tensor::Tensor,
};


const IRIS: &str = include_str!("../data/iris.csv");

const IRIS_HEADERS: [&str; 4] = [
  "sepal length in cm",
  "sepal width in cm",
  "petal length in cm",
  "petal width in cm",
];

const FAB_INPUT: &str = "uci-secom.csv";
const BEE_INPUT: &str = "bee_data.csv";

const BEE_WIDTH: usize = 50;
const BEE_HEADER_COLUMN: usize = 5;
const BEE_VALUE_COLUMN: usize = 19;


/// Source of the samples an experiment gets run on.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
  /// Fisher's iris measurements, bundled with the crate.
  Iris,
  /// UCI SECOM semiconductor fabrication data.
  Fab,
  /// Bee colony statistics, one value per state and year.
  Bee,
}

impl Mode {
  /// File read when no explicit input is given.

  pub fn default_input(&self) -> Option<&'static str> {
    match self {
      Mode::Iris => None,
      Mode::Fab => Some(FAB_INPUT),
      Mode::Bee => Some(BEE_INPUT),
    }
  }

  pub fn load(&self, input: Option<&Path>) -> Result<Dataset> {
    let path = |default: &'static str| input.unwrap_or(Path::new(default));
    match self {
      Mode::Iris => {
        if let Some(path) = input {
          warn!("iris data is bundled, ignoring {}", path.display());
        }
        Dataset::iris()
      },
      Mode::Fab => Dataset::fab(path(FAB_INPUT)),
      Mode::Bee => Dataset::bee(path(BEE_INPUT)),
    }
  }
}

impl FromStr for Mode {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "iris" => Ok(Mode::Iris),
      "fab" => Ok(Mode::Fab),
      "bee" => Ok(Mode::Bee),
      _ => Err(Error::Config(format!("unknown mode {s:?}, expected iris, fab or bee"))),
    }
  }
}

impl fmt::Display for Mode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Mode::Iris => "iris",
      Mode::Fab => "fab",
      Mode::Bee => "bee",
    };
    write!(f, "{name}")
  }
}


/// Rows of `width` features each, stored row-major.

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
  pub headers: Vec<String>,
  pub width: usize,
  pub rows: usize,
  pub data: Vec<f32>,
}

impl Dataset {
  pub fn new(headers: Vec<String>, width: usize, data: Vec<f32>) -> Result<Self> {
    if width == 0 || data.is_empty() {
      return Err(Error::InvalidData("dataset is empty".into()))
    }
    if data.len() % width != 0 {
      return Err(Error::InvalidData(format!(
        "{} values do not fill rows of {} features", data.len(), width)))
    }
    if headers.len() < width {
      warn!("only {} headers for {} features", headers.len(), width);
    }
    Ok(Self { headers, width, rows: data.len() / width, data })
  }

  /// Samples as a `[rows, width]` tensor.

  pub fn tensor(&self) -> Tensor<f32> {
    Tensor::new(&[self.rows, self.width], self.data.clone())
  }

  /// The bundled Fisher iris measurements, 150 samples of 4 features.

  pub fn iris() -> Result<Self> {
    let path = PathBuf::from("iris.csv");
    let mut reader = csv::Reader::from_reader(IRIS.as_bytes());
    let mut data = vec![];
    for record in reader.records() {
      let record = record?;
      for value in record.iter().take(IRIS_HEADERS.len()) {
        data.push(parse(&path, value)?);
      }
    }
    let dataset = Self::new(IRIS_HEADERS.iter().map(|h| h.to_string() ).collect(), IRIS_HEADERS.len(), data)?;
    debug!("loaded {} flowers", dataset.rows);
    Ok(dataset)
  }

  /// SECOM data. The leading timestamp column is dropped, empty cells read as zero.

  pub fn fab(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let reader = open(path)?;
    Self::read_fab(path, reader)
  }

  fn read_fab(path: &Path, reader: impl Read) -> Result<Self> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers: Vec<String> = reader.headers()?.iter().skip(1).map(String::from).collect();
    let width = headers.len();
    let mut data = vec![];
    for record in reader.records() {
      let record = record?;
      for value in record.iter().skip(1) {
        data.push(if value.is_empty() { 0.0 } else { parse(path, value)? });
      }
    }
    let dataset = Self::new(headers, width, data)?;
    debug!("loaded {} fabrication runs of {} measurements", dataset.rows, dataset.width);
    Ok(dataset)
  }

  /// Bee colony data. Every record contributes one value, thousands
  /// separators removed, and the first rows name the features.

  pub fn bee(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let reader = open(path)?;
    Self::read_bee(path, reader)
  }

  fn read_bee(path: &Path, reader: impl Read) -> Result<Self> {
    let mut reader = csv::ReaderBuilder::new()
      .flexible(true)
      .from_reader(reader);
    let mut headers = Vec::with_capacity(BEE_WIDTH);
    let mut data = vec![];
    for record in reader.records() {
      let record = record?;
      let field = |column: usize| record.get(column).ok_or_else(||
        Error::InvalidData(format!("{} has no column {}", path.display(), column)) );
      if headers.len() < BEE_WIDTH {
        headers.push(field(BEE_HEADER_COLUMN)?.to_string());
      }
      data.push(parse(path, &field(BEE_VALUE_COLUMN)?.replace(',', ""))?);
    }
    let dataset = Self::new(headers, BEE_WIDTH, data)?;
    debug!("loaded {} years of {} states", dataset.rows, dataset.width);
    Ok(dataset)
  }
}


fn open(path: &Path) -> Result<std::fs::File> {
  std::fs::File::open(path).map_err(|err| {
    warn!("could not open {}", path.display());
    Error::Io(err)
  })
}

fn parse(path: &Path, value: &str) -> Result<f32> {
  value.trim().parse().map_err(|_| Error::Parse { file: path.to_path_buf(), value: value.to_string() })
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::ops::BaseOps;

  #[test]
  fn iris() {
    let iris = Dataset::iris().unwrap();
    assert_eq!(iris.rows, 150);
    assert_eq!(iris.width, 4);
    assert_eq!(iris.headers[2], "petal length in cm");
    assert_eq!(&iris.data[..4], &[5.1, 3.5, 1.4, 0.2]);
    assert_eq!(iris.tensor().shape().dims, vec![150, 4]);
  }

  #[test]
  fn fab_skips_timestamp() {
    let csv = "Time,0,1,Pass/Fail\n\
      2008-07-19 11:55:00,3030.93,,-1\n\
      2008-07-19 12:32:00,3095.78,2465.14,1\n";
    let fab = Dataset::read_fab(Path::new("fab.csv"), csv.as_bytes()).unwrap();
    assert_eq!(fab.headers, vec!["0", "1", "Pass/Fail"]);
    assert_eq!(fab.width, 3);
    assert_eq!(fab.rows, 2);
    assert_eq!(fab.data, vec![3030.93, 0.0, -1.0, 3095.78, 2465.14, 1.0]);
  }

  #[test]
  fn fab_parse_error() {
    let csv = "Time,0\nnow,abc\n";
    match Dataset::read_fab(Path::new("fab.csv"), csv.as_bytes()) {
      Err(Error::Parse { file, value }) => {
        assert_eq!(file, PathBuf::from("fab.csv"));
        assert_eq!(value, "abc");
      },
      other => panic!("unexpected {other:?}"),
    }
  }

  fn bee_csv(records: usize) -> String {
    let mut csv = String::from((0..20).map(|i| format!("h{i}") ).collect::<Vec<_>>().join(","));
    csv.push('\n');
    for i in 0..records {
      let mut fields: Vec<String> = (0..20).map(|_| "x".to_string() ).collect();
      fields[5] = format!("state{}", i % BEE_WIDTH);
      fields[19] = format!("\"1,{:03}\"", i);
      csv.push_str(&fields.join(","));
      csv.push('\n');
    }
    csv
  }

  #[test]
  fn bee_layout() {
    let csv = bee_csv(2 * BEE_WIDTH);
    let bee = Dataset::read_bee(Path::new("bee.csv"), csv.as_bytes()).unwrap();
    assert_eq!(bee.width, BEE_WIDTH);
    assert_eq!(bee.rows, 2);
    assert_eq!(bee.headers.len(), BEE_WIDTH);
    assert_eq!(bee.headers[7], "state7");
    assert_eq!(bee.data[0], 1000.0);
    assert_eq!(bee.data[51], 1051.0);
  }

  #[test]
  fn bee_incomplete_rows() {
    let csv = bee_csv(BEE_WIDTH + 1);
    assert!(matches!(Dataset::read_bee(Path::new("bee.csv"), csv.as_bytes()), Err(Error::InvalidData(_))));
  }

  #[test]
  fn modes() {
    assert_eq!("fab".parse::<Mode>().unwrap(), Mode::Fab);
    assert!("quantum".parse::<Mode>().is_err());
    assert_eq!(Mode::Bee.default_input(), Some("bee_data.csv"));
    assert_eq!(Mode::Iris.to_string(), "iris");
  }

  #[test]
  fn missing_file() {
    let path = std::env::temp_dir().join("weightrank-missing.csv");
    assert!(matches!(Mode::Fab.load(Some(&path)), Err(Error::Io(_))));
  }
}
