//! Writing finished comparisons out of the process

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};
use log::info;
use thiserror::Error;

use crate::compose::Composition;

/// Name every exported comparison is written under
pub const EXPORT_FILE_NAME: &str = "ab-comparison.png";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to encode PNG: {0}")]
    Encode(#[from] image::ImageError),
    #[error("failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("clipboard error: {0}")]
    Clipboard(#[from] arboard::Error),
}

/// Encode a pixel buffer as PNG bytes
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

/// Write the composition to `dir/ab-comparison.png`, replacing any previous
/// export there.
pub fn export_png(composition: &Composition, dir: &Path) -> Result<PathBuf, ExportError> {
    let bytes = encode_png(&composition.image)?;
    std::fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(EXPORT_FILE_NAME);
    std::fs::write(&path, &bytes).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;
    info!(
        "exported {}x{} comparison to {:?}",
        composition.width, composition.height, path
    );
    Ok(path)
}

/// Place the composition on the system clipboard as an image
pub fn copy_to_clipboard(composition: &Composition) -> Result<(), ExportError> {
    let mut clipboard = arboard::Clipboard::new()?;
    clipboard.set_image(arboard::ImageData {
        width: composition.width as usize,
        height: composition.height as usize,
        bytes: composition.image.as_raw().as_slice().into(),
    })?;
    Ok(())
}
