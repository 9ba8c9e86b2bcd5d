use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{
    audio::write_audio,
    error::{Error, Result},
    types::{SeparationOutput, StemFile},
};

/// Semantic stem name for each output target index, in model order.
pub const TARGET_NAMES: [&str; 6] = ["drums", "bass", "other", "vocals", "guitar", "piano"];

/// Map a target index to its stem name. `None` for indexes past the table.
pub fn target_name(index: usize) -> Option<&'static str> {
    TARGET_NAMES.get(index).copied()
}

/// Slice each target out of the output tensor and persist it as
/// `target_<index>_<name>.wav` inside `out_dir`.
///
/// The directory is created if absent; re-running into an existing directory
/// overwrites same-named files. A failure on one target aborts the remaining
/// ones, and files already written stay on disk.
pub fn write_targets(output: &SeparationOutput, out_dir: &Path) -> Result<Vec<StemFile>> {
    let mut written = Vec::with_capacity(output.target_count());

    for index in 0..output.target_count() {
        let name = target_name(index).ok_or(Error::UnsupportedTarget { index })?;

        fs::create_dir_all(out_dir)?;

        let path: PathBuf = out_dir.join(format!("target_{index}_{name}.wav"));
        let stem = output.target_buffer(index);
        write_audio(&path, &stem)?;

        debug!(index, name, "wrote {}", path.display());
        written.push(StemFile { index, name, path });
    }

    Ok(written)
}
