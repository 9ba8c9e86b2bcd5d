use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use ndarray::Array3;
use tracing::info;

use crate::{
    error::{Error, Result},
    types::AudioBuffer,
};

/// Magic number opening every supported weight container.
pub const MODEL_MAGIC: u32 = 0x6767_6d6c;

/// Which model variant the weight file declares.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelVariant {
    FourSource,
    SixSource,
}

/// Opaque handle to a loaded separation model.
///
/// Either fully valid and ready for inference, or [`ModelHandle::load`]
/// failed and no handle exists. One handle serves one run at a time.
#[derive(Debug)]
pub struct ModelHandle {
    path: PathBuf,
    variant: ModelVariant,
}

impl ModelHandle {
    /// Read the weight container header and derive the model variant.
    ///
    /// The header is little-endian: [`MODEL_MAGIC`] followed by the declared
    /// target count, which must be 4 or 6. The weight payload after the
    /// header is opaque to this crate and consumed by the engine.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let load_error = |reason: String| Error::ModelLoad {
            path: path.to_path_buf(),
            reason,
        };

        let mut file =
            File::open(path).map_err(|e| load_error(format!("failed to open: {e}")))?;

        let mut magic_bytes = [0u8; 4];
        file.read_exact(&mut magic_bytes)
            .map_err(|_| load_error("file too short for a weight header".into()))?;
        let magic = u32::from_le_bytes(magic_bytes);
        if magic != MODEL_MAGIC {
            return Err(load_error(format!("bad magic {magic:#010x}")));
        }

        let mut count_bytes = [0u8; 4];
        file.read_exact(&mut count_bytes)
            .map_err(|_| load_error("file too short for a weight header".into()))?;
        let declared = u32::from_le_bytes(count_bytes);

        let variant = match declared {
            4 => ModelVariant::FourSource,
            6 => ModelVariant::SixSource,
            other => return Err(load_error(format!("unsupported target count {other}"))),
        };

        info!(targets = declared, "loaded model {}", path.display());

        Ok(Self {
            path: path.to_path_buf(),
            variant,
        })
    }

    /// Number of stems this model separates into.
    pub fn target_count(&self) -> usize {
        match self.variant {
            ModelVariant::FourSource => 4,
            ModelVariant::SixSource => 6,
        }
    }

    pub fn variant(&self) -> ModelVariant {
        self.variant
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Call contract for the external separation engine.
///
/// Implementations own all numeric work. The pipeline hands over the
/// validated buffer and collects a raw `(target, channel, sample)` tensor;
/// engine-native progress arrives through `progress` as
/// `(fraction in [0, 1], message)` pairs, delivered inline on the calling
/// thread.
pub trait InferenceEngine {
    fn infer(
        &self,
        handle: &ModelHandle,
        input: &AudioBuffer,
        progress: &mut dyn FnMut(f32, &str),
    ) -> anyhow::Result<Array3<f32>>;
}
