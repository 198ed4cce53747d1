//! Construction parameters for a [`Predictor`].

use crate::error::{Error, Result};
use crate::predictor::Predictor;

use std::fs;
use std::path::Path;

/// Fixed dimensions and training rate of a predictor.
///
/// Fields missing from a deserialized config take their default values.
///
/// ```
/// # use lstm_predictor::config::Config;
/// let mut predictor = Config::new()
///     .cells(8)
///     .layers(2)
///     .horizon(5)
///     .learning_rate(0.05)
///     .seed(42)
///     .build()
///     .unwrap();
/// let probs = predictor.perceive(b'x');
/// assert_eq!(probs.len(), 256);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of cells in every recurrent layer.
    pub cells: usize,
    /// Number of stacked recurrent layers.
    pub layers: usize,
    /// Timesteps per truncated backpropagation window.
    pub horizon: usize,
    /// Step size for every weight update.
    pub learning_rate: f32,
    /// Seed for weight initialization.
    pub seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cells: 32,
            layers: 2,
            horizon: 10,
            learning_rate: 0.05,
            seed: 0,
        }
    }
}

impl Config {
    /// Creates a config holding the default values.
    pub fn new() -> Self {
        Config::default()
    }

    /// Reads a JSON config from `path` and validates it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the number of cells per layer.
    pub fn cells(mut self, cells: usize) -> Self {
        self.cells = cells;
        self
    }

    /// Sets the number of layers.
    pub fn layers(mut self, layers: usize) -> Self {
        self.layers = layers;
        self
    }

    /// Sets the backpropagation window length.
    pub fn horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    /// Sets the learning rate to use during gradient descent.
    pub fn learning_rate(mut self, rate: f32) -> Self {
        self.learning_rate = rate;
        self
    }

    /// Sets the weight initialization seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Verifies that every field is usable, returning an error naming the
    /// first one that is not.
    pub fn validate(&self) -> Result<()> {
        if self.cells == 0 {
            return Err(Error::InvalidConfig("cells must be at least 1".into()));
        }
        if self.layers == 0 {
            return Err(Error::InvalidConfig("layers must be at least 1".into()));
        }
        if self.horizon == 0 {
            return Err(Error::InvalidConfig("horizon must be at least 1".into()));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "learning rate must be positive and finite, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }

    /// Builds a freshly initialized predictor.
    pub fn build(&self) -> Result<Predictor> {
        Predictor::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn zero_cells() {
        assert!(Config::new().cells(0).build().is_err());
    }

    #[test]
    fn zero_layers() {
        assert!(Config::new().layers(0).build().is_err());
    }

    #[test]
    fn zero_horizon() {
        assert!(Config::new().horizon(0).build().is_err());
    }

    #[test]
    fn bad_learning_rate() {
        for &rate in &[0.0, -0.1, std::f32::NAN, std::f32::INFINITY] {
            match Config::new().learning_rate(rate).validate() {
                Err(Error::InvalidConfig(msg)) => assert!(msg.contains("learning rate")),
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"cells": 4, "seed": 9}"#).unwrap();
        assert_eq!(config, Config::new().cells(4).seed(9));
    }

    #[test]
    fn load_from_file() {
        let path =
            std::env::temp_dir().join(format!("lstm-predictor-{}.json", std::process::id()));
        let expected = Config::new().cells(6).layers(3).horizon(7).learning_rate(0.01);
        {
            let mut file = std::fs::File::create(&path).unwrap();
            file.write_all(serde_json::to_string(&expected).unwrap().as_bytes())
                .unwrap();
        }
        let loaded = Config::load(&path);
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded.unwrap(), expected);
    }

    #[test]
    fn load_rejects_invalid_values() {
        let path = std::env::temp_dir()
            .join(format!("lstm-predictor-bad-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"horizon": 0}"#).unwrap();
        let loaded = Config::load(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(loaded, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn load_missing_file() {
        assert!(matches!(
            Config::load("/nonexistent/lstm-predictor.json"),
            Err(Error::Io(_))
        ));
    }
}
