//! Drawing surface with a scoped clip stack
//!
//! All painting goes through [`Surface`], which confines writes to the
//! current clip mask. Clips are pushed with [`Surface::save_clip`] and popped
//! when the returned [`ClipScope`] is dropped, so no exit path can leave a
//! clip behind on a surface that gets reused.

use std::ops::{Deref, DerefMut};

use image::{GrayImage, Luma, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;
use log::warn;

const OPAQUE: Luma<u8> = Luma([255]);

/// An RGBA pixel buffer plus clip state
pub struct Surface {
    pixels: RgbaImage,
    clip_stack: Vec<GrayImage>,
}

impl Surface {
    /// Transparent surface of the given size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
            clip_stack: Vec::new(),
        }
    }

    /// Resize and clear to transparent
    pub fn reset(&mut self, width: u32, height: u32) {
        if !self.clip_stack.is_empty() {
            warn!(
                "surface reset with {} clip(s) still active, discarding",
                self.clip_stack.len()
            );
            self.clip_stack.clear();
        }
        self.pixels = RgbaImage::new(width, height);
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn clip_depth(&self) -> usize {
        self.clip_stack.len()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_pixels(self) -> RgbaImage {
        self.pixels
    }

    /// Swap the pixel buffer out, leaving an empty surface behind
    pub fn take_pixels(&mut self) -> RgbaImage {
        std::mem::replace(&mut self.pixels, RgbaImage::new(0, 0))
    }

    /// Intersect the current clip with `mask` until the scope is dropped.
    ///
    /// A mask whose size does not match the surface clips everything outside
    /// its bounds.
    pub fn save_clip(&mut self, mask: GrayImage) -> ClipScope<'_> {
        let (width, height) = self.pixels.dimensions();
        let combined = GrayImage::from_fn(width, height, |x, y| {
            let inner = if x < mask.width() && y < mask.height() {
                mask.get_pixel(x, y)[0]
            } else {
                0
            };
            Luma([inner.min(self.coverage(x, y))])
        });
        self.clip_stack.push(combined);
        ClipScope { surface: self }
    }

    fn coverage(&self, x: u32, y: u32) -> u8 {
        self.clip_stack
            .last()
            .map(|mask| mask.get_pixel(x, y)[0])
            .unwrap_or(255)
    }

    /// Composite `color` over pixel `(x, y)` scaled by `coverage` in `0..=1`.
    /// Out-of-bounds coordinates are ignored.
    pub fn blend_pixel(&mut self, x: i64, y: i64, color: Rgba<u8>, coverage: f32) {
        if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        let clip = self.coverage(x, y) as f32 / 255.0;
        let alpha = (color[3] as f32 / 255.0) * coverage.clamp(0.0, 1.0) * clip;
        if alpha <= 0.0 {
            return;
        }

        let dst = self.pixels.get_pixel_mut(x, y);
        if alpha >= 1.0 {
            *dst = Rgba([color[0], color[1], color[2], 255]);
            return;
        }
        *dst = source_over(*dst, color, alpha);
    }

    /// Paint every pixel with the colour `shader` returns for it
    pub fn fill_with<F>(&mut self, shader: F)
    where
        F: Fn(u32, u32) -> Rgba<u8>,
    {
        for y in 0..self.height() {
            for x in 0..self.width() {
                self.blend_pixel(x as i64, y as i64, shader(x, y), 1.0);
            }
        }
    }

    pub fn fill_solid(&mut self, color: Rgba<u8>) {
        self.fill_with(|_, _| color);
    }

    /// Draw `image` with its top-left corner at `(left, top)`
    pub fn draw_image(&mut self, image: &RgbaImage, left: i64, top: i64) {
        for (x, y, pixel) in image.enumerate_pixels() {
            self.blend_pixel(left + x as i64, top + y as i64, *pixel, 1.0);
        }
    }
}

/// Restores the surface's previous clip when dropped
pub struct ClipScope<'a> {
    surface: &'a mut Surface,
}

impl Deref for ClipScope<'_> {
    type Target = Surface;

    fn deref(&self) -> &Surface {
        &*self.surface
    }
}

impl DerefMut for ClipScope<'_> {
    fn deref_mut(&mut self) -> &mut Surface {
        &mut *self.surface
    }
}

impl Drop for ClipScope<'_> {
    fn drop(&mut self) {
        self.surface.clip_stack.pop();
    }
}

/// Non-premultiplied source-over with an effective source alpha
fn source_over(dst: Rgba<u8>, src: Rgba<u8>, src_alpha: f32) -> Rgba<u8> {
    let dst_alpha = dst[3] as f32 / 255.0;
    let out_alpha = src_alpha + dst_alpha * (1.0 - src_alpha);
    if out_alpha <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let channel = |s: u8, d: u8| {
        let value =
            (s as f32 * src_alpha + d as f32 * dst_alpha * (1.0 - src_alpha)) / out_alpha;
        value.round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        channel(src[0], dst[0]),
        channel(src[1], dst[1]),
        channel(src[2], dst[2]),
        (out_alpha * 255.0).round() as u8,
    ])
}

/// Largest radius that keeps the corner arcs from overlapping
pub fn clamp_radius(radius: f32, width: u32, height: u32) -> f32 {
    let limit = width.min(height) as f32 / 2.0;
    if radius.is_finite() {
        radius.clamp(0.0, limit)
    } else {
        0.0
    }
}

/// Clip mask for a rounded rectangle covering a `width` x `height` surface
pub fn rounded_rect_mask(width: u32, height: u32, radius: f32) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    if width == 0 || height == 0 {
        return mask;
    }

    let r = clamp_radius(radius, width, height).round() as u32;
    if r == 0 {
        draw_filled_rect_mut(&mut mask, Rect::at(0, 0).of_size(width, height), OPAQUE);
        return mask;
    }

    // Two overlapping bands cover everything except the four corner squares.
    if width > 2 * r {
        draw_filled_rect_mut(
            &mut mask,
            Rect::at(r as i32, 0).of_size(width - 2 * r, height),
            OPAQUE,
        );
    }
    if height > 2 * r {
        draw_filled_rect_mut(
            &mut mask,
            Rect::at(0, r as i32).of_size(width, height - 2 * r),
            OPAQUE,
        );
    }

    let (r, w, h) = (r as i32, width as i32, height as i32);
    for center in [(r, r), (w - 1 - r, r), (r, h - 1 - r), (w - 1 - r, h - 1 - r)] {
        draw_filled_circle_mut(&mut mask, center, r, OPAQUE);
    }

    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    #[test]
    fn test_square_mask_covers_everything() {
        let mask = rounded_rect_mask(20, 10, 0.0);
        assert!(mask.pixels().all(|p| p[0] == 255));
    }

    #[test]
    fn test_rounded_mask_cuts_corners() {
        let mask = rounded_rect_mask(100, 60, 20.0);
        assert_eq!(mask.get_pixel(0, 0)[0], 0);
        assert_eq!(mask.get_pixel(99, 0)[0], 0);
        assert_eq!(mask.get_pixel(0, 59)[0], 0);
        assert_eq!(mask.get_pixel(99, 59)[0], 0);
        assert_eq!(mask.get_pixel(50, 0)[0], 255);
        assert_eq!(mask.get_pixel(0, 30)[0], 255);
        assert_eq!(mask.get_pixel(50, 30)[0], 255);
    }

    #[test]
    fn test_radius_is_clamped() {
        assert_eq!(clamp_radius(500.0, 100, 60), 30.0);
        assert_eq!(clamp_radius(-4.0, 100, 60), 0.0);
        assert_eq!(clamp_radius(f32::NAN, 100, 60), 0.0);

        // An oversized radius turns the short sides into half circles.
        let mask = rounded_rect_mask(100, 60, 500.0);
        assert_eq!(mask.get_pixel(50, 30)[0], 255);
        assert_eq!(mask.get_pixel(0, 0)[0], 0);
    }

    #[test]
    fn test_clip_confines_fill() {
        let mut surface = Surface::new(100, 60);
        {
            let mut clip = surface.save_clip(rounded_rect_mask(100, 60, 20.0));
            assert_eq!(clip.clip_depth(), 1);
            clip.fill_solid(RED);
        }
        assert_eq!(surface.clip_depth(), 0);
        assert_eq!(surface.pixels().get_pixel(0, 0)[3], 0);
        assert_eq!(*surface.pixels().get_pixel(50, 30), RED);
    }

    #[test]
    fn test_clip_restored_after_scope() {
        let mut surface = Surface::new(10, 10);
        drop(surface.save_clip(GrayImage::new(10, 10)));
        surface.fill_solid(RED);
        assert!(surface.pixels().pixels().all(|p| *p == RED));
    }

    #[test]
    fn test_nested_clips_intersect() {
        let mut surface = Surface::new(10, 10);
        let mut left_half = GrayImage::new(10, 10);
        draw_filled_rect_mut(&mut left_half, Rect::at(0, 0).of_size(5, 10), OPAQUE);
        let mut top_half = GrayImage::new(10, 10);
        draw_filled_rect_mut(&mut top_half, Rect::at(0, 0).of_size(10, 5), OPAQUE);

        {
            let mut outer = surface.save_clip(left_half);
            let mut inner = outer.save_clip(top_half);
            inner.fill_solid(RED);
        }

        assert_eq!(*surface.pixels().get_pixel(2, 2), RED);
        assert_eq!(surface.pixels().get_pixel(7, 2)[3], 0);
        assert_eq!(surface.pixels().get_pixel(2, 7)[3], 0);
    }

    #[test]
    fn test_source_over_half_alpha() {
        let mut surface = Surface::new(1, 1);
        surface.fill_solid(Rgba([0, 0, 0, 255]));
        surface.blend_pixel(0, 0, Rgba([255, 255, 255, 255]), 0.5);
        let px = surface.pixels().get_pixel(0, 0);
        assert!((px[0] as i16 - 128).abs() <= 1);
        assert_eq!(px[3], 255);
    }

    #[test]
    fn test_draw_image_clips_to_bounds() {
        let mut surface = Surface::new(4, 4);
        let image = RgbaImage::from_pixel(4, 4, RED);
        surface.draw_image(&image, 2, -2);
        assert_eq!(*surface.pixels().get_pixel(3, 0), RED);
        assert_eq!(surface.pixels().get_pixel(1, 0)[3], 0);
        assert_eq!(surface.pixels().get_pixel(3, 3)[3], 0);
    }
}
