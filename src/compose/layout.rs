//! Canvas geometry for a two-image comparison

use std::fmt;

/// Images taller than this are scaled down to it
pub const MAX_HEIGHT: f64 = 800.0;

/// Gap around and between the images
pub const PADDING: f64 = 40.0;

/// Band under the images that holds the labels
pub const LABEL_STRIP_HEIGHT: f64 = 100.0;

/// Label font size in pixels
pub const LABEL_FONT_SIZE: f32 = 48.0;

/// Which side of the comparison an image belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    A,
    B,
}

impl Slot {
    pub fn label(&self) -> &'static str {
        match self {
            Slot::A => "A",
            Slot::B => "B",
        }
    }

    pub fn other(&self) -> Self {
        match self {
            Slot::A => Slot::B,
            Slot::B => Slot::A,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Scale applied to an image of the given natural height. Never upscales.
pub fn scale_factor(natural_height: u32) -> f64 {
    (MAX_HEIGHT / natural_height as f64).min(1.0)
}

/// Displayed size of an image after height limiting
pub fn scaled_size(natural_width: u32, natural_height: u32) -> (f64, f64) {
    let (w, h) = (natural_width as f64, natural_height as f64);
    if h > MAX_HEIGHT {
        // Pin the height exactly so it can never drift above the limit.
        (w * MAX_HEIGHT / h, MAX_HEIGHT)
    } else {
        (w, h)
    }
}

/// Where one image lands on the canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Placement {
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Pixel size the source image is resampled to
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.width.round() as u32).max(1),
            (self.height.round() as u32).max(1),
        )
    }

    /// Top-left pixel the resampled image is drawn at
    pub fn pixel_origin(&self) -> (i64, i64) {
        (self.x.round() as i64, self.y.round() as i64)
    }
}

/// Computed layout of a composition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub a: Placement,
    pub b: Placement,
    pub content_height: f64,
    pub total_width: f64,
    pub total_height: f64,
}

impl Layout {
    /// Lay out two images given their natural `(width, height)`
    pub fn compute(size_a: (u32, u32), size_b: (u32, u32)) -> Self {
        let (width_a, height_a) = scaled_size(size_a.0, size_a.1);
        let (width_b, height_b) = scaled_size(size_b.0, size_b.1);

        let content_height = height_a.max(height_b);
        let total_width = width_a + width_b + 3.0 * PADDING;
        let total_height = content_height + 2.0 * PADDING + LABEL_STRIP_HEIGHT;

        let a = Placement {
            x: PADDING,
            y: PADDING + (content_height - height_a) / 2.0,
            width: width_a,
            height: height_a,
        };
        let b = Placement {
            x: 2.0 * PADDING + width_a,
            y: PADDING + (content_height - height_b) / 2.0,
            width: width_b,
            height: height_b,
        };

        Self {
            a,
            b,
            content_height,
            total_width,
            total_height,
        }
    }

    pub fn placement(&self, slot: Slot) -> Placement {
        match slot {
            Slot::A => self.a,
            Slot::B => self.b,
        }
    }

    /// Pixel dimensions of the canvas. Fractional sizes are truncated.
    pub fn canvas_size(&self) -> (u32, u32) {
        (self.total_width as u32, self.total_height as u32)
    }

    /// Vertical centre of the label strip
    pub fn label_baseline_center(&self) -> f64 {
        self.content_height + 2.0 * PADDING + LABEL_STRIP_HEIGHT / 2.0
    }

    /// Point a slot's label is centred on
    pub fn label_anchor(&self, slot: Slot) -> (f64, f64) {
        (self.placement(slot).center_x(), self.label_baseline_center())
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "canvas {}x{}", self.total_width, self.total_height)?;
        for slot in [Slot::A, Slot::B] {
            let p = self.placement(slot);
            write!(
                f,
                " | {} {}x{} @ ({}, {})",
                slot, p.width, p.height, p.x, p.y
            )?;
        }
        Ok(())
    }
}
