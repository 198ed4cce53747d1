//! Utilities for running a byte stream through a model.

use crate::ALPHABET;

use std::fmt;
use std::time::Instant;
use tracing::info;

/// An adaptive next-byte model, as driven by an entropy coder.
pub trait Model {
    /// Returns the distribution of the byte following `byte`, without
    /// learning.
    fn predict(&mut self, byte: u8) -> &[f32];

    /// Learns that `byte` followed the previous prediction, then returns the
    /// distribution of the byte after it.
    fn perceive(&mut self, byte: u8) -> &[f32];
}

/// Code length totals for the bytes seen so far.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Report {
    /// Number of bytes coded.
    pub bytes: u64,
    /// Ideal code length of those bytes, in bits.
    pub bits: f64,
}

impl Report {
    /// Returns the average cost of a byte, or 0 when nothing was coded.
    pub fn bits_per_byte(&self) -> f64 {
        if self.bytes == 0 {
            0.0
        } else {
            self.bits / self.bytes as f64
        }
    }

    /// Returns the size an ideal arithmetic coder would produce, in bytes.
    pub fn compressed_len(&self) -> u64 {
        (self.bits / 8.0).ceil() as u64
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} bytes -> {} bytes ({:.4} bits/byte)",
            self.bytes,
            self.compressed_len(),
            self.bits_per_byte()
        )
    }
}

/// Feeds streams through a model and accounts for their code length.
///
/// Each byte costs `-log2(p)`, where `p` is the probability the model gave
/// it one step earlier. The first byte is costed under a uniform
/// distribution.
#[derive(Debug)]
pub struct Trainer<M: Model> {
    model: M,
    logging: Logging,
    next: Vec<f32>,
    report: Report,
}

impl<M: Model> Trainer<M> {
    /// Creates a new Trainer instance, logging on completion.
    pub fn new(model: M) -> Self {
        Trainer {
            model,
            logging: Logging::Completion,
            next: vec![1.0 / ALPHABET as f32; ALPHABET],
            report: Report::default(),
        }
    }

    /// Sets the type of logging to be emitted during training.
    pub fn logging(mut self, logging: Logging) -> Self {
        self.logging = logging;
        self
    }

    /// Trains the model on `data`, continuing from wherever the previous
    /// call left off. Returns the running totals.
    pub fn train(&mut self, data: &[u8]) -> Report {
        let start_time = Instant::now();
        for &byte in data {
            let p = self.next[byte as usize];
            self.report.bits -= f64::from(p).log2();
            self.report.bytes += 1;
            self.next.copy_from_slice(self.model.perceive(byte));
            self.logging.progress(&self.report);
        }
        self.logging.completion(&self.report, start_time);
        self.report
    }

    /// Returns the running totals.
    pub fn report(&self) -> Report {
        self.report
    }

    /// Returns the model being trained.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Consumes the trainer, returning the trained model.
    pub fn into_model(self) -> M {
        self.model
    }
}

/// Logging frequency to use during training
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Logging {
    /// No logs will be emitted
    Silent,
    /// A summary will be emitted after every `train` call
    Completion,
    /// A summary will be emitted after every `n` bytes, and on completion
    Interval(u64),
}

impl Logging {
    /// Performs logging after a byte has been coded.
    fn progress(&self, report: &Report) {
        if let Logging::Interval(freq) = *self {
            if freq > 0 && report.bytes % freq == 0 {
                info!(
                    bytes = report.bytes,
                    bits_per_byte = report.bits_per_byte(),
                    "progress"
                );
            }
        }
    }

    /// Performs logging at the end of a `train` call.
    fn completion(&self, report: &Report, start_time: Instant) {
        if let Logging::Silent = self {
            return;
        }
        info!(
            bytes = report.bytes,
            compressed = report.compressed_len(),
            bits_per_byte = report.bits_per_byte(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use approx::assert_relative_eq;

    /// Always predicts `favorite` with probability one half.
    struct Fixed {
        favorite: u8,
        probs: Vec<f32>,
        seen: Vec<u8>,
    }

    impl Fixed {
        fn new(favorite: u8) -> Self {
            let mut probs = vec![0.5 / 255.0; ALPHABET];
            probs[favorite as usize] = 0.5;
            Fixed {
                favorite,
                probs,
                seen: Vec::new(),
            }
        }
    }

    impl Model for Fixed {
        fn predict(&mut self, _: u8) -> &[f32] {
            &self.probs
        }

        fn perceive(&mut self, byte: u8) -> &[f32] {
            self.seen.push(byte);
            &self.probs
        }
    }

    #[test]
    fn empty_stream() {
        let mut trainer = Trainer::new(Fixed::new(0)).logging(Logging::Silent);
        let report = trainer.train(&[]);
        assert_eq!(report, Report::default());
        assert_eq!(report.bits_per_byte(), 0.0);
        assert_eq!(report.compressed_len(), 0);
    }

    #[test]
    fn first_byte_costs_eight_bits() {
        let mut trainer = Trainer::new(Fixed::new(b'z')).logging(Logging::Silent);
        let report = trainer.train(b"z");
        assert_relative_eq!(report.bits, 8.0, epsilon = 1e-9);
        assert_eq!(report.compressed_len(), 1);
    }

    #[test]
    fn later_bytes_use_the_previous_prediction() {
        let mut trainer = Trainer::new(Fixed::new(b'z')).logging(Logging::Interval(2));
        let report = trainer.train(b"azzz");
        // 8 bits for the first byte, then one bit per favored byte.
        assert_relative_eq!(report.bits, 11.0, epsilon = 1e-5);
        assert_eq!(report.bytes, 4);
        assert_eq!(trainer.model().favorite, b'z');
        assert_eq!(trainer.into_model().seen, b"azzz".to_vec());
    }

    #[test]
    fn chunked_streams_match_whole_streams() {
        let data = b"mississippi mississippi mississippi";
        let config = Config::new().cells(4).layers(2).horizon(3).seed(5);

        let mut whole = Trainer::new(config.build().unwrap()).logging(Logging::Silent);
        let expected = whole.train(data);

        let mut chunked = Trainer::new(config.build().unwrap()).logging(Logging::Silent);
        for chunk in data.chunks(7) {
            chunked.train(chunk);
        }
        assert_eq!(chunked.report().bytes, expected.bytes);
        assert_eq!(chunked.report().bits.to_bits(), expected.bits.to_bits());
    }

    #[test]
    fn predictor_compresses_repetition() {
        let config = Config::new().cells(4).layers(2).horizon(4).learning_rate(0.5);
        let mut trainer = Trainer::new(config.build().unwrap()).logging(Logging::Silent);
        let report = trainer.train(&[0x41; 1500]);
        assert!(report.bits_per_byte() < 1.0, "{}", report);
        assert_eq!(trainer.model().sweeps(), 1500 / 4 - 1);
    }
}
