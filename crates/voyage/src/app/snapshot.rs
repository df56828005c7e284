use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};
use navgrid::RgbaFrame;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub(crate) enum SnapshotError {
    #[error("frame buffer does not hold {width}x{height} RGBA pixels")]
    BufferSize { width: u32, height: u32 },
    #[error("failed to create snapshot directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write snapshot '{path}': {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub(crate) fn write_png(frame: RgbaFrame, path: &Path) -> Result<(), SnapshotError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| SnapshotError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let (width, height) = (frame.width(), frame.height());
    let image = RgbaImage::from_raw(width, height, frame.into_bytes())
        .ok_or(SnapshotError::BufferSize { width, height })?;
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|source| SnapshotError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
    info!(path = %path.display(), width, height, "snapshot_written");
    Ok(())
}
