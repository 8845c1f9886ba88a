//! Image loading utilities
//!
//! Decodes files, byte buffers and clipboard contents into [`DecodedImage`]
//! handles, and tracks which comparison slot holds which image.

use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use image::{DynamicImage, RgbaImage};
use log::debug;

use crate::compose::layout::Slot;

/// A decoded raster image. Cloning shares the pixel data.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    image: Arc<DynamicImage>,
}

impl DecodedImage {
    pub fn new(image: DynamicImage) -> Self {
        Self {
            image: Arc::new(image),
        }
    }

    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self::new(DynamicImage::ImageRgba8(pixels))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    /// A handle is usable only when both dimensions are non-zero
    pub fn is_valid(&self) -> bool {
        self.width() > 0 && self.height() > 0
    }

    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }
}

impl From<DynamicImage> for DecodedImage {
    fn from(image: DynamicImage) -> Self {
        Self::new(image)
    }
}

/// Load an image from a file path
///
/// Supports PNG, JPEG, GIF and WebP formats.
pub fn load_image(path: &Path) -> Result<DecodedImage> {
    let img = image::open(path).with_context(|| format!("Failed to load image: {:?}", path))?;
    debug!("decoded {:?} ({}x{})", path, img.width(), img.height());
    Ok(DecodedImage::new(img))
}

/// Load an image from bytes
pub fn load_image_from_bytes(bytes: &[u8]) -> Result<DecodedImage> {
    let img = image::load_from_memory(bytes).context("Failed to decode image from memory")?;
    Ok(DecodedImage::new(img))
}

/// Read an image off the system clipboard
pub fn load_image_from_clipboard() -> Result<DecodedImage> {
    let mut clipboard = arboard::Clipboard::new().context("Clipboard unavailable")?;
    let data = clipboard
        .get_image()
        .context("Clipboard does not contain an image")?;
    let (width, height) = (data.width as u32, data.height as u32);
    let pixels = RgbaImage::from_raw(width, height, data.bytes.into_owned())
        .ok_or_else(|| anyhow!("Clipboard image has an unexpected buffer size"))?;
    Ok(DecodedImage::from_rgba(pixels))
}

/// Get supported image format extensions
pub fn supported_extensions() -> &'static [&'static str] {
    &["png", "jpg", "jpeg", "gif", "webp"]
}

/// Check if a file extension is a supported image format
pub fn is_supported_format(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext_lower = ext.to_lowercase();
            supported_extensions().iter().any(|&e| e == ext_lower)
        })
        .unwrap_or(false)
}

/// The two images being compared
#[derive(Debug, Clone, Default)]
pub struct ImageSlots {
    a: Option<DecodedImage>,
    b: Option<DecodedImage>,
}

impl ImageSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: Slot) -> Option<&DecodedImage> {
        match slot {
            Slot::A => self.a.as_ref(),
            Slot::B => self.b.as_ref(),
        }
    }

    pub fn set(&mut self, slot: Slot, image: DecodedImage) {
        *self.slot_mut(slot) = Some(image);
    }

    pub fn clear(&mut self, slot: Slot) -> Option<DecodedImage> {
        self.slot_mut(slot).take()
    }

    /// Put `image` in the first empty slot, A before B.
    ///
    /// Returns the slot that was filled, or `None` when both are taken.
    pub fn paste(&mut self, image: DecodedImage) -> Option<Slot> {
        let slot = [Slot::A, Slot::B]
            .into_iter()
            .find(|slot| self.get(*slot).is_none())?;
        self.set(slot, image);
        Some(slot)
    }

    /// Both images, once both are present
    pub fn pair(&self) -> Option<(&DecodedImage, &DecodedImage)> {
        Some((self.a.as_ref()?, self.b.as_ref()?))
    }

    pub fn is_full(&self) -> bool {
        self.pair().is_some()
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut Option<DecodedImage> {
        match slot {
            Slot::A => &mut self.a,
            Slot::B => &mut self.b,
        }
    }
}
