use std::{fs, path::Path};

use anyhow::{anyhow, Result as EngineResult};
use hound::{SampleFormat, WavSpec, WavWriter};
use ndarray::Array3;
use tempfile::tempdir;

use audio_stem::{
    separate, separate_with_sink, AudioBuffer, Error, InferenceEngine, ModelHandle,
    ProgressEvent, ProgressSink, SeparateOptions, MODEL_MAGIC, SUPPORTED_SAMPLE_RATE,
};

/// Engine that copies the mix into every target and reports four progress
/// steps, the way a windowed model would.
struct CopyEngine;

impl InferenceEngine for CopyEngine {
    fn infer(
        &self,
        handle: &ModelHandle,
        input: &AudioBuffer,
        progress: &mut dyn FnMut(f32, &str),
    ) -> EngineResult<Array3<f32>> {
        let targets = handle.target_count();
        let n = input.len();

        let mut tensor = Array3::zeros((targets, 2, n));
        for t in 0..targets {
            progress(t as f32 / targets as f32, "separating");
            for i in 0..n {
                tensor[(t, 0, i)] = input.left()[i];
                tensor[(t, 1, i)] = input.right()[i];
            }
        }
        progress(1.0, "done");

        Ok(tensor)
    }
}

struct FailingEngine;

impl InferenceEngine for FailingEngine {
    fn infer(
        &self,
        _handle: &ModelHandle,
        _input: &AudioBuffer,
        _progress: &mut dyn FnMut(f32, &str),
    ) -> EngineResult<Array3<f32>> {
        Err(anyhow!("backend exploded"))
    }
}

/// Engine that returns a tensor with the wrong sample count.
struct ShortEngine;

impl InferenceEngine for ShortEngine {
    fn infer(
        &self,
        handle: &ModelHandle,
        input: &AudioBuffer,
        _progress: &mut dyn FnMut(f32, &str),
    ) -> EngineResult<Array3<f32>> {
        Ok(Array3::zeros((handle.target_count(), 2, input.len() / 2)))
    }
}

struct RecordingSink {
    fractions: Vec<f32>,
}

impl ProgressSink for RecordingSink {
    fn emit(&mut self, event: ProgressEvent<'_>) {
        self.fractions.push(event.fraction);
    }
}

fn write_model(path: &Path, declared_targets: u32) {
    let mut bytes = MODEL_MAGIC.to_le_bytes().to_vec();
    bytes.extend_from_slice(&declared_targets.to_le_bytes());
    bytes.extend_from_slice(&[0u8; 128]);
    fs::write(path, bytes).unwrap();
}

fn write_mono_wav(path: &Path, sample_rate: u32, frames: usize) {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for i in 0..frames {
        let t = i as f32 / sample_rate as f32;
        writer
            .write_sample((2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.2)
            .unwrap();
    }
    writer.finalize().unwrap();
}

#[test]
fn two_second_mono_run_yields_four_named_stems() {
    let tmp = tempdir().unwrap();
    let input = tmp.path().join("mix.wav");
    let out_dir = tmp.path().join("stems");
    let model = tmp.path().join("model.bin");

    let frames = SUPPORTED_SAMPLE_RATE as usize * 2;
    write_mono_wav(&input, SUPPORTED_SAMPLE_RATE, frames);
    write_model(&model, 4);

    let opts = SeparateOptions { model_path: model };
    let report = separate(&CopyEngine, &input, &out_dir, &opts).expect("pipeline failed");

    assert_eq!(report.stems.len(), 4);
    for (stem, expected) in report.stems.iter().zip([
        "target_0_drums.wav",
        "target_1_bass.wav",
        "target_2_other.wav",
        "target_3_vocals.wav",
    ]) {
        assert_eq!(stem.path.file_name().unwrap(), expected);

        let reader = hound::WavReader::open(&stem.path).unwrap();
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.spec().sample_rate, SUPPORTED_SAMPLE_RATE);
        assert_eq!(reader.duration() as usize, frames);
    }
}

#[test]
fn six_source_model_writes_six_stems() {
    let tmp = tempdir().unwrap();
    let input = tmp.path().join("mix.wav");
    let out_dir = tmp.path().join("stems");
    let model = tmp.path().join("model-6s.bin");

    write_mono_wav(&input, SUPPORTED_SAMPLE_RATE, 4410);
    write_model(&model, 6);

    let opts = SeparateOptions { model_path: model };
    let report = separate(&CopyEngine, &input, &out_dir, &opts).expect("pipeline failed");

    let names: Vec<&str> = report.stems.iter().map(|s| s.name).collect();
    assert_eq!(names, ["drums", "bass", "other", "vocals", "guitar", "piano"]);
}

#[test]
fn progress_observed_by_sink_is_monotonic_and_bounded() {
    let tmp = tempdir().unwrap();
    let input = tmp.path().join("mix.wav");
    let out_dir = tmp.path().join("stems");
    let model = tmp.path().join("model.bin");

    write_mono_wav(&input, SUPPORTED_SAMPLE_RATE, 2048);
    write_model(&model, 4);

    let opts = SeparateOptions { model_path: model };
    let mut sink = RecordingSink {
        fractions: Vec::new(),
    };
    separate_with_sink(&CopyEngine, &input, &out_dir, &opts, &mut sink)
        .expect("pipeline failed");

    assert!(!sink.fractions.is_empty());
    let mut last = 0.0f32;
    for &f in &sink.fractions {
        assert!((0.0..=1.0).contains(&f), "fraction {f} out of range");
        assert!(f >= last, "fraction {f} decreased after {last}");
        last = f;
    }
    assert_eq!(*sink.fractions.last().unwrap(), 1.0);
}

#[test]
fn unsupported_sample_rate_fails_before_any_output() {
    let tmp = tempdir().unwrap();
    let input = tmp.path().join("48k.wav");
    let out_dir = tmp.path().join("stems");
    let model = tmp.path().join("model.bin");

    write_mono_wav(&input, 48_000, 4800);
    write_model(&model, 4);

    let opts = SeparateOptions { model_path: model };
    let result = separate(&CopyEngine, &input, &out_dir, &opts);

    assert!(matches!(result, Err(Error::Format { .. })));
    assert!(!out_dir.exists(), "no output may be produced");
}

#[test]
fn missing_model_fails_before_inference() {
    let tmp = tempdir().unwrap();
    let input = tmp.path().join("mix.wav");
    let out_dir = tmp.path().join("stems");

    write_mono_wav(&input, SUPPORTED_SAMPLE_RATE, 1024);

    let opts = SeparateOptions {
        model_path: tmp.path().join("missing.bin"),
    };
    // FailingEngine would error if it were ever reached
    let result = separate(&FailingEngine, &input, &out_dir, &opts);

    assert!(matches!(result, Err(Error::ModelLoad { .. })));
    assert!(!out_dir.exists());
}

#[test]
fn empty_arguments_are_rejected_upfront() {
    let opts = SeparateOptions::default();

    assert!(matches!(
        separate(&CopyEngine, "", "out", &opts),
        Err(Error::Argument(_))
    ));
    assert!(matches!(
        separate(&CopyEngine, "in.wav", "", &opts),
        Err(Error::Argument(_))
    ));
}

#[test]
fn engine_failure_surfaces_as_inference_error() {
    let tmp = tempdir().unwrap();
    let input = tmp.path().join("mix.wav");
    let out_dir = tmp.path().join("stems");
    let model = tmp.path().join("model.bin");

    write_mono_wav(&input, SUPPORTED_SAMPLE_RATE, 1024);
    write_model(&model, 4);

    let opts = SeparateOptions { model_path: model };
    let result = separate(&FailingEngine, &input, &out_dir, &opts);

    assert!(matches!(result, Err(Error::Inference(_))));
    assert!(!out_dir.exists());
}

#[test]
fn contract_violating_tensor_is_an_inference_error() {
    let tmp = tempdir().unwrap();
    let input = tmp.path().join("mix.wav");
    let out_dir = tmp.path().join("stems");
    let model = tmp.path().join("model.bin");

    write_mono_wav(&input, SUPPORTED_SAMPLE_RATE, 1024);
    write_model(&model, 4);

    let opts = SeparateOptions { model_path: model };
    let result = separate(&ShortEngine, &input, &out_dir, &opts);

    assert!(matches!(result, Err(Error::Inference(_))));
}
