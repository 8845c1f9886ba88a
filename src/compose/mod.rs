//! Two-image comparison compositor
//!
//! Lays two images side by side on a rounded, filled canvas and labels them
//! "A" and "B". Composition is deterministic: the same images and style
//! always produce the same pixels.

pub mod fonts;
pub mod gradient;
pub mod layout;
pub mod style;
pub mod surface;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use image::imageops::FilterType;
use image::RgbaImage;
use log::{debug, warn};
use thiserror::Error;

use crate::color_space::Rgb;
use crate::image_loader::DecodedImage;
use fonts::{FontBook, LabelFace};
use gradient::Fill;
use layout::{Layout, Placement, Slot, LABEL_FONT_SIZE};
use style::StyleConfig;
use surface::{rounded_rect_mask, Surface};

pub use layout::{LABEL_STRIP_HEIGHT, MAX_HEIGHT, PADDING};

/// Label text colour, independent of theme and background
pub const LABEL_COLOR: Rgb = Rgb::BLACK;

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("image {slot} is not a decoded image ({width}x{height})")]
    InvalidImage { slot: Slot, width: u32, height: u32 },
}

/// A finished comparison bitmap
#[derive(Debug, Clone)]
pub struct Composition {
    pub image: RgbaImage,
    pub width: u32,
    pub height: u32,
    pub layout: Layout,
}

/// Composes comparisons, holding the label fonts it has loaded
pub struct Compositor {
    fonts: FontBook,
    faces: Mutex<HashMap<String, Option<Arc<LabelFace>>>>,
}

impl Compositor {
    pub fn new(fonts: FontBook) -> Self {
        Self {
            fonts,
            faces: Mutex::new(HashMap::new()),
        }
    }

    /// Compositor using the fonts installed on this machine
    pub fn with_system_fonts() -> Self {
        Self::new(FontBook::system(&[]))
    }

    /// Compose `image_a` and `image_b` onto a fresh bitmap
    pub fn compose(
        &self,
        image_a: &DecodedImage,
        image_b: &DecodedImage,
        style: &StyleConfig,
    ) -> Result<Composition, ComposeError> {
        let mut surface = Surface::new(0, 0);
        let layout = self.compose_into(&mut surface, image_a, image_b, style)?;
        let image = surface.take_pixels();
        let (width, height) = image.dimensions();
        Ok(Composition {
            image,
            width,
            height,
            layout,
        })
    }

    /// Compose onto `surface`, resizing it to the canvas size.
    ///
    /// The surface carries no clip once this returns, whatever the outcome.
    pub fn compose_into(
        &self,
        surface: &mut Surface,
        image_a: &DecodedImage,
        image_b: &DecodedImage,
        style: &StyleConfig,
    ) -> Result<Layout, ComposeError> {
        validate(Slot::A, image_a)?;
        validate(Slot::B, image_b)?;

        let layout = Layout::compute(image_a.dimensions(), image_b.dimensions());
        let (width, height) = layout.canvas_size();
        debug!("composing {}", layout);

        let scaled_a = resample(image_a, &layout.a);
        let scaled_b = resample(image_b, &layout.b);
        let fill = Fill::resolve(&style.background, width as f32, height as f32);
        let face = self.label_face(&style.label_font);

        surface.reset(width, height);
        let mut canvas = surface.save_clip(rounded_rect_mask(width, height, style.corner_radius_px));

        canvas.fill_with(|x, y| fill.color_at(x, y).to_rgba());

        for (scaled, placement) in [(&scaled_a, &layout.a), (&scaled_b, &layout.b)] {
            let (left, top) = placement.pixel_origin();
            canvas.draw_image(scaled, left, top);
        }

        match face {
            Some(face) => {
                for slot in [Slot::A, Slot::B] {
                    let (x, y) = layout.label_anchor(slot);
                    face.draw_centered(
                        &mut canvas,
                        slot.label(),
                        (x as f32, y as f32),
                        LABEL_FONT_SIZE,
                        LABEL_COLOR,
                    );
                }
            }
            None => warn!(
                "no font found for {:?} or any sans-serif fallback, labels skipped",
                style.label_font
            ),
        }

        Ok(layout)
    }

    fn label_face(&self, family: &str) -> Option<Arc<LabelFace>> {
        let mut faces = self.faces.lock().unwrap_or_else(PoisonError::into_inner);
        faces
            .entry(family.to_string())
            .or_insert_with(|| self.fonts.resolve(family).map(Arc::new))
            .clone()
    }
}

/// Compose with a process-wide compositor backed by the system fonts
pub fn compose(
    image_a: &DecodedImage,
    image_b: &DecodedImage,
    style: &StyleConfig,
) -> Result<Composition, ComposeError> {
    static SHARED: OnceLock<Compositor> = OnceLock::new();
    SHARED
        .get_or_init(Compositor::with_system_fonts)
        .compose(image_a, image_b, style)
}

fn validate(slot: Slot, image: &DecodedImage) -> Result<(), ComposeError> {
    if image.is_valid() {
        Ok(())
    } else {
        let (width, height) = image.dimensions();
        Err(ComposeError::InvalidImage {
            slot,
            width,
            height,
        })
    }
}

/// Resample an image to its placed pixel size
fn resample(image: &DecodedImage, placement: &Placement) -> RgbaImage {
    let (width, height) = placement.pixel_size();
    let source = image.as_dynamic();
    if (source.width(), source.height()) == (width, height) {
        source.to_rgba8()
    } else {
        source.resize_exact(width, height, FilterType::Lanczos3).to_rgba8()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn flat(width: u32, height: u32, color: [u8; 4]) -> DecodedImage {
        DecodedImage::from_rgba(RgbaImage::from_pixel(width, height, Rgba(color)))
    }

    fn compositor() -> Compositor {
        Compositor::new(FontBook::empty())
    }

    #[test]
    fn test_rejects_empty_image() {
        let err = compositor()
            .compose(&flat(0, 0, [0; 4]), &flat(10, 10, [0; 4]), &StyleConfig::default())
            .unwrap_err();
        assert!(matches!(err, ComposeError::InvalidImage { slot: Slot::A, .. }));
    }

    #[test]
    fn test_output_matches_layout() {
        let composition = compositor()
            .compose(
                &flat(400, 300, [255, 0, 0, 255]),
                &flat(400, 300, [0, 0, 255, 255]),
                &StyleConfig::solid("#ffffff").with_corner_radius(0.0),
            )
            .unwrap();
        assert_eq!((composition.width, composition.height), (920, 480));
        assert_eq!(composition.image.dimensions(), (920, 480));
        assert_eq!(*composition.image.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
        assert_eq!(*composition.image.get_pixel(40, 40), Rgba([255, 0, 0, 255]));
        assert_eq!(*composition.image.get_pixel(480, 40), Rgba([0, 0, 255, 255]));
        assert_eq!(*composition.image.get_pixel(39, 40), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_large_image_is_downscaled() {
        let composition = compositor()
            .compose(
                &flat(100, 1600, [0, 255, 0, 255]),
                &flat(50, 50, [0, 0, 0, 255]),
                &StyleConfig::default(),
            )
            .unwrap();
        assert_eq!(composition.layout.a.height, 800.0);
        assert_eq!(composition.layout.a.width, 50.0);
        assert_eq!(composition.height, 980);
    }

    #[test]
    fn test_surface_clip_released() {
        let mut surface = Surface::new(0, 0);
        compositor()
            .compose_into(
                &mut surface,
                &flat(10, 10, [0, 0, 0, 255]),
                &flat(10, 10, [0, 0, 0, 255]),
                &StyleConfig::default().with_corner_radius(50.0),
            )
            .unwrap();
        assert_eq!(surface.clip_depth(), 0);
        assert_eq!(surface.pixels().get_pixel(0, 0)[3], 0);

        surface.fill_solid(Rgba([1, 2, 3, 255]));
        assert_eq!(*surface.pixels().get_pixel(0, 0), Rgba([1, 2, 3, 255]));
    }
}
