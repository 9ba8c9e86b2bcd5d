use tracing::debug;

use crate::{
    error::{Error, Result},
    model::{InferenceEngine, ModelHandle},
    progress::{ProgressEvent, ProgressSink},
    types::{AudioBuffer, SeparationOutput},
};

/// Run one inference pass and adapt its native progress stream to the sink.
///
/// Blocks the calling thread until the engine returns the full output
/// tensor. Engine-native fractions are clamped to `[0, 1]` and forced
/// non-decreasing before delivery; the sink is invoked inline. An engine
/// failure or a tensor of the wrong shape surfaces as
/// [`Error::Inference`], with no retry.
pub fn run_separation(
    engine: &dyn InferenceEngine,
    handle: &ModelHandle,
    input: &AudioBuffer,
    sink: &mut dyn ProgressSink,
) -> Result<SeparationOutput> {
    debug!(
        targets = handle.target_count(),
        samples = input.len(),
        "starting inference"
    );

    let mut last = 0.0f32;
    let mut forward = |fraction: f32, message: &str| {
        let fraction = fraction.clamp(0.0, 1.0).max(last);
        last = fraction;
        sink.emit(ProgressEvent { fraction, message });
    };

    let tensor = engine
        .infer(handle, input, &mut forward)
        .map_err(Error::Inference)?;

    SeparationOutput::from_tensor(tensor, handle.target_count(), input.len())
}
