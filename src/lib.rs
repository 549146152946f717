//! Rank the features of a dataset by their importance to a linear autoencoder.
//!
//! A single-layer autoencoder learns to reconstruct every sample from all
//! of its features. The learned square weight matrix then gets read as a
//! directed graph between features, and PageRank over that graph tells
//! which features the reconstruction leans on the most.
//!
//! Training runs on a small reverse-mode automatic differentiation engine
//! over CPU tensors.
//!
//! # Example
//!
//! ```
//! use weightrank::{ Autoencoder, Config, Dataset, pagerank::rank_features };
//!
//! let iris = Dataset::iris().unwrap();
//! let model = Autoencoder::<f32>::new(iris.width, 1);
//! let config = Config { iterations: 16, ..Config::default() };
//! let report = model.train(&iris.tensor(), &config, |_, _| {} );
//! assert_eq!(report.costs.len(), 16);
//!
//! let ranks = rank_features(model.weights(), &iris.headers, 0.85, 1e-6);
//! assert_eq!(ranks.len(), 4);
//! ```
//!
//! # Optional features
//!
//! - `unsafe` *(default)*: accelerated matrix math using [matrixmultiply] crate.

mod internal;
mod shape;
mod tensor;
mod variable;

pub mod ops;
pub mod scalar;
pub mod optimize;
pub mod loss;
pub mod autoencoder;
pub mod pagerank;
pub mod factors;
pub mod dataset;
pub mod plot;
pub mod config;
pub mod error;
pub mod experiment;
pub mod cli;

pub use shape::Shape;
pub use tensor::Tensor;
pub use variable::{ Variable, UnaryOp, BinaryOp };
pub use autoencoder::{ Autoencoder, TrainReport };
pub use config::Config;
pub use dataset::{ Dataset, Mode };
pub use error::{ Error, Result };
pub use experiment::{ run, process, Outcome };
