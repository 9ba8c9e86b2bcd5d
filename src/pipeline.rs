use std::path::Path;

use tracing::info;

use crate::{
    audio::read_audio,
    error::{Error, Result},
    model::{InferenceEngine, ModelHandle},
    progress::{ConsoleSink, ProgressSink},
    separator::run_separation,
    types::{SeparateOptions, SeparationReport},
    writer::write_targets,
};

/// Separate `input_path` into per-stem files under `output_dir`, reporting
/// progress to the default console sink.
pub fn separate(
    engine: &dyn InferenceEngine,
    input_path: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    opts: &SeparateOptions,
) -> Result<SeparationReport> {
    let mut sink = ConsoleSink;
    separate_with_sink(engine, input_path, output_dir, opts, &mut sink)
}

/// Like [`separate`], delivering progress to a caller-supplied sink.
///
/// Runs the whole pipeline sequentially on the calling thread: ingest, load
/// model, infer, demux, write. Ingestion and loader failures surface before
/// the engine is ever invoked. A writer failure leaves the stems written so
/// far on disk; callers must treat a failed run's output directory as
/// potentially partial.
pub fn separate_with_sink(
    engine: &dyn InferenceEngine,
    input_path: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    opts: &SeparateOptions,
    sink: &mut dyn ProgressSink,
) -> Result<SeparationReport> {
    let input_path = input_path.as_ref();
    let output_dir = output_dir.as_ref();

    if input_path.as_os_str().is_empty() {
        return Err(Error::Argument("input path is required".into()));
    }
    if output_dir.as_os_str().is_empty() {
        return Err(Error::Argument("output directory is required".into()));
    }

    info!(
        input = %input_path.display(),
        output = %output_dir.display(),
        "starting separation"
    );

    let audio = read_audio(input_path)?;
    let handle = ModelHandle::load(&opts.model_path)?;

    let output = run_separation(engine, &handle, &audio, sink)?;
    let stems = write_targets(&output, output_dir)?;

    info!(stems = stems.len(), "separation finished");

    Ok(SeparationReport { stems })
}
