//! # audio-stem
//!
//! Orchestration pipeline for audio stem separation: decodes a mixed
//! recording into the buffer layout a separation engine expects, runs the
//! engine with inline progress reporting, and demultiplexes the
//! multi-target output into per-stem WAV files.

mod audio;
mod error;
mod model;
mod pipeline;
mod progress;
mod separator;
mod types;
mod writer;

pub use crate::{
    audio::{read_audio, write_audio},
    error::{Error, Result},
    model::{InferenceEngine, ModelHandle, ModelVariant, MODEL_MAGIC},
    pipeline::{separate, separate_with_sink},
    progress::{BoundaryHandle, CallbackSink, ConsoleSink, ProgressEvent, ProgressSink},
    separator::run_separation,
    types::{
        AudioBuffer, SeparateOptions, SeparationOutput, SeparationReport, StemFile,
        DEFAULT_MODEL_PATH, SUPPORTED_SAMPLE_RATE,
    },
    writer::{target_name, write_targets, TARGET_NAMES},
};
