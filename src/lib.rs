//! An adaptive byte predictor for context-mixing compression.
//!
//! A [`Predictor`](predictor::Predictor) turns every byte of a stream into a
//! probability distribution over the next byte, then learns from the byte
//! that actually arrives. An entropy coder drives it through the
//! [`Model`](trainer::Model) trait; [`Trainer`](trainer::Trainer) measures the
//! code length such a coder would produce.

#[macro_use]
extern crate serde_derive;

pub mod activator;
pub mod config;
pub mod error;
pub mod predictor;
pub mod trainer;

mod layers;
mod matrix;
mod utils;

pub use crate::config::Config;
pub use crate::error::{Error, Result};
pub use crate::predictor::Predictor;
pub use crate::trainer::{Logging, Model, Report, Trainer};

/// Number of distinct byte values, and so the width of every distribution.
pub const ALPHABET: usize = 256;
