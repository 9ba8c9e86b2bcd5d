use std::{fs::File, path::Path};

use hound::WavWriter;
use symphonia::core::{
    audio::SampleBuffer, codecs::DecoderOptions, formats::FormatOptions, io::MediaSourceStream,
    meta::MetadataOptions, probe::Hint,
};
use symphonia::default::{get_codecs, get_probe};
use tracing::debug;

use crate::{
    error::{Error, Result},
    types::{AudioBuffer, SUPPORTED_SAMPLE_RATE},
};

fn format_error(path: &Path, reason: impl Into<String>) -> Error {
    Error::Format {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

fn encode_error(path: &Path, source: hound::Error) -> Error {
    Error::Encode {
        path: path.to_path_buf(),
        source,
    }
}

/// Decode a source file into the canonical stereo buffer.
///
/// The file must already be at [`SUPPORTED_SAMPLE_RATE`] and carry one or
/// two channels; mono is expanded by duplicating the single channel. Stereo
/// keeps its interleave order, sample `i` of channel `c` coming from source
/// offset `i*2+c`.
pub fn read_audio<P: AsRef<Path>>(path: P) -> Result<AudioBuffer> {
    let path = path.as_ref();

    let file =
        File::open(path).map_err(|e| format_error(path, format!("failed to open: {e}")))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| format_error(path, format!("failed to probe container: {e}")))?;

    let mut format = probed.format;
    let track = format
        .default_track()
        .ok_or_else(|| format_error(path, "no default audio track"))?;

    let mut decoder = get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| format_error(path, format!("unsupported codec: {e}")))?;

    let mut samples: Vec<f32> = Vec::new();
    let mut sample_rate: u32 = 0;
    let mut channels: u16 = 0;

    while let Ok(packet) = format.next_packet() {
        let decoded = decoder
            .decode(&packet)
            .map_err(|e| format_error(path, format!("decode failure: {e}")))?;
        sample_rate = decoded.spec().rate;
        channels = decoded.spec().channels.count() as u16;

        let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
        buffer.copy_interleaved_ref(decoded);
        samples.extend_from_slice(buffer.samples());
    }

    if sample_rate != SUPPORTED_SAMPLE_RATE {
        return Err(format_error(
            path,
            format!("sample rate {sample_rate} Hz, only {SUPPORTED_SAMPLE_RATE} Hz is supported"),
        ));
    }
    if channels != 1 && channels != 2 {
        return Err(format_error(
            path,
            format!("{channels} channels, only mono and stereo are supported"),
        ));
    }

    debug!(
        sample_rate,
        channels,
        samples = samples.len(),
        "decoded {}",
        path.display()
    );

    AudioBuffer::from_interleaved(&samples, channels)
}

/// Encode a stereo buffer as a 16-bit WAV file at the pipeline sample rate.
pub fn write_audio<P: AsRef<Path>>(path: P, audio: &AudioBuffer) -> Result<()> {
    let path = path.as_ref();

    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: SUPPORTED_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec).map_err(|e| encode_error(path, e))?;
    for sample in audio.to_interleaved() {
        let s = (sample * i16::MAX as f32).clamp(i16::MIN as f32, i16::MAX as f32) as i16;
        writer.write_sample(s).map_err(|e| encode_error(path, e))?;
    }

    writer.finalize().map_err(|e| encode_error(path, e))?;
    Ok(())
}
