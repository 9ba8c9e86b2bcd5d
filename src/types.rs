use std::path::PathBuf;

use anyhow::anyhow;
use ndarray::Array3;

use crate::error::{Error, Result};

/// Sample rate every input must already be at. The pipeline never resamples;
/// anything else is rejected during ingestion.
pub const SUPPORTED_SAMPLE_RATE: u32 = 44_100;

/// Default location of the separation model weights, relative to the working
/// directory. Override per run via [`SeparateOptions::model_path`].
pub const DEFAULT_MODEL_PATH: &str = "models/ggml-model-htdemucs-4s-f16.bin";

/// Canonical in-memory audio representation: two equal-length f32 channels.
///
/// The equal-length invariant is enforced at construction; mono sources are
/// expanded so both channels carry the same sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioBuffer {
    left: Vec<f32>,
    right: Vec<f32>,
}

impl AudioBuffer {
    /// Build a buffer from planar channels of equal length.
    pub fn from_planar(left: Vec<f32>, right: Vec<f32>) -> Result<Self> {
        if left.len() != right.len() {
            return Err(Error::Argument(format!(
                "channel length mismatch: left={}, right={}",
                left.len(),
                right.len()
            )));
        }
        Ok(Self { left, right })
    }

    /// Build a stereo buffer from an interleaved sample stream.
    ///
    /// One channel is duplicated into both outputs; two channels are
    /// de-interleaved, sample `i` of channel `c` taken from offset `i*2+c`.
    pub fn from_interleaved(samples: &[f32], channel_count: u16) -> Result<Self> {
        match channel_count {
            1 => Ok(Self {
                left: samples.to_vec(),
                right: samples.to_vec(),
            }),
            2 => {
                let frames = samples.len() / 2;
                let mut left = Vec::with_capacity(frames);
                let mut right = Vec::with_capacity(frames);
                for frame in samples.chunks_exact(2) {
                    left.push(frame[0]);
                    right.push(frame[1]);
                }
                Ok(Self { left, right })
            }
            other => Err(Error::Argument(format!(
                "unsupported channel count {other}, expected 1 or 2"
            ))),
        }
    }

    /// Samples per channel.
    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    pub fn left(&self) -> &[f32] {
        &self.left
    }

    pub fn right(&self) -> &[f32] {
        &self.right
    }

    /// Interleave back into the L R L R layout codecs expect.
    pub fn to_interleaved(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.left.len() * 2);
        for (l, r) in self.left.iter().zip(&self.right) {
            out.push(*l);
            out.push(*r);
        }
        out
    }
}

/// Multi-target tensor produced by one inference run, indexed
/// `(target, channel, sample)`. Read-only once constructed.
#[derive(Debug)]
pub struct SeparationOutput {
    tensor: Array3<f32>,
}

impl SeparationOutput {
    /// Validate a raw engine tensor against the run it came from.
    ///
    /// The shape must be `[expected_targets, 2, expected_len]`; a mismatch
    /// means the engine broke its contract.
    pub fn from_tensor(
        tensor: Array3<f32>,
        expected_targets: usize,
        expected_len: usize,
    ) -> Result<Self> {
        let shape = tensor.shape();
        if shape != [expected_targets, 2, expected_len] {
            return Err(Error::Inference(anyhow!(
                "engine returned tensor of shape {:?}, expected [{}, 2, {}]",
                shape,
                expected_targets,
                expected_len
            )));
        }
        Ok(Self { tensor })
    }

    pub fn target_count(&self) -> usize {
        self.tensor.shape()[0]
    }

    pub fn sample_count(&self) -> usize {
        self.tensor.shape()[2]
    }

    /// Slice one target out of the tensor, channel 0 as left and 1 as right.
    pub fn target_buffer(&self, target: usize) -> AudioBuffer {
        let left = self.tensor.slice(ndarray::s![target, 0, ..]).to_vec();
        let right = self.tensor.slice(ndarray::s![target, 1, ..]).to_vec();
        AudioBuffer { left, right }
    }
}

/// Per-run configuration.
#[derive(Clone, Debug)]
pub struct SeparateOptions {
    /// Path to the model weight file.
    pub model_path: PathBuf,
}

impl Default for SeparateOptions {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
        }
    }
}

/// One stem file written by a run.
#[derive(Clone, Debug)]
pub struct StemFile {
    pub index: usize,
    pub name: &'static str,
    pub path: PathBuf,
}

/// Everything a successful run produced, in target order.
#[derive(Clone, Debug)]
pub struct SeparationReport {
    pub stems: Vec<StemFile>,
}
