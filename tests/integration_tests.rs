//! Integration tests for abcompose

use abcompose::compose::fonts::FontBook;
use abcompose::compose::layout::{Layout, Slot, MAX_HEIGHT, PADDING};
use abcompose::compose::style::{GradientStop, StyleConfig};
use abcompose::compose::surface::Surface;
use abcompose::compose::{Composition, Compositor};
use abcompose::image_loader::{DecodedImage, ImageSlots};
use image::{Rgba, RgbaImage};

const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

fn flat(width: u32, height: u32, color: Rgba<u8>) -> DecodedImage {
    DecodedImage::from_rgba(RgbaImage::from_pixel(width, height, color))
}

fn create_color_image(width: u32, height: u32) -> DecodedImage {
    let image = RgbaImage::from_fn(width, height, |x, y| {
        let r = ((x as f32 / width as f32) * 255.0) as u8;
        let g = ((y as f32 / height as f32) * 255.0) as u8;
        Rgba([r, g, 128, 255])
    });
    DecodedImage::from_rgba(image)
}

/// Compositor without label fonts so pixel checks do not depend on the host
fn compositor() -> Compositor {
    Compositor::new(FontBook::empty())
}

fn compose(a: &DecodedImage, b: &DecodedImage, style: &StyleConfig) -> Composition {
    compositor().compose(a, b, style).unwrap()
}

mod layout_tests {
    use super::*;

    #[test]
    fn test_equal_images_on_white() {
        let composition = compose(
            &flat(400, 300, RED),
            &flat(400, 300, BLUE),
            &StyleConfig::solid("#ffffff").with_corner_radius(0.0),
        );

        assert_eq!((composition.width, composition.height), (920, 480));
        assert_eq!(composition.layout.a.y, PADDING);
        assert_eq!(composition.layout.b.y, PADDING);

        let image = &composition.image;
        assert_eq!(*image.get_pixel(40, 40), RED);
        assert_eq!(*image.get_pixel(439, 339), RED);
        assert_eq!(*image.get_pixel(480, 40), BLUE);
        assert_eq!(*image.get_pixel(460, 200), WHITE);
        assert_eq!(*image.get_pixel(460, 400), WHITE);
    }

    #[test]
    fn test_shorter_image_centered() {
        let composition = compose(
            &flat(200, 800, RED),
            &flat(200, 400, BLUE),
            &StyleConfig::solid("#ffffff").with_corner_radius(0.0),
        );

        assert_eq!(composition.layout.content_height, 800.0);
        assert_eq!((composition.width, composition.height), (520, 980));

        let image = &composition.image;
        assert_eq!(*image.get_pixel(40, 40), RED);
        assert_eq!(*image.get_pixel(280, 240), BLUE);
        assert_eq!(*image.get_pixel(479, 639), BLUE);
        assert_eq!(*image.get_pixel(280, 239), WHITE);
        assert_eq!(*image.get_pixel(280, 640), WHITE);
    }

    #[test]
    fn test_tall_image_scaled_to_limit() {
        let composition = compose(
            &create_color_image(300, 1200),
            &flat(100, 100, BLUE),
            &StyleConfig::default(),
        );

        assert_eq!(composition.layout.a.height, MAX_HEIGHT);
        assert_eq!(composition.layout.a.width, 200.0);
        assert_eq!((composition.width, composition.height), (420, 980));
        assert_eq!(composition.layout.b.y, 40.0 + 350.0);
    }
}

mod background_tests {
    use super::*;

    fn gradient(stops: Vec<GradientStop>) -> StyleConfig {
        StyleConfig::gradient(stops, 90.0).with_corner_radius(0.0)
    }

    #[test]
    fn test_gradient_runs_left_to_right() {
        let composition = compose(
            &flat(400, 300, RED),
            &flat(400, 300, BLUE),
            &gradient(vec![
                GradientStop::new("#000000", 0.0),
                GradientStop::new("#ffffff", 100.0),
            ]),
        );

        let left = composition.image.get_pixel(5, 240);
        let right = composition.image.get_pixel(914, 240);
        assert!(left[0] < 60, "left edge {:?}", left);
        assert!(right[0] > 195, "right edge {:?}", right);
        assert_eq!(left[3], 255);
    }

    #[test]
    fn test_stop_order_does_not_matter() {
        let a = create_color_image(120, 90);
        let b = create_color_image(80, 90);
        let forward = compose(
            &a,
            &b,
            &gradient(vec![
                GradientStop::new("#ff0000", 0.0),
                GradientStop::new("#00ff00", 40.0),
                GradientStop::new("#0000ff", 100.0),
            ]),
        );
        let shuffled = compose(
            &a,
            &b,
            &gradient(vec![
                GradientStop::new("#0000ff", 100.0),
                GradientStop::new("#ff0000", 0.0),
                GradientStop::new("#00ff00", 40.0),
            ]),
        );
        assert_eq!(forward.image, shuffled.image);
    }

    #[test]
    fn test_single_stop_is_flat() {
        let composition = compose(
            &flat(10, 10, RED),
            &flat(10, 10, RED),
            &gradient(vec![GradientStop::new("#336699", 50.0)]),
        );
        assert_eq!(*composition.image.get_pixel(2, 2), Rgba([0x33, 0x66, 0x99, 255]));
        assert_eq!(
            *composition.image.get_pixel(composition.width - 3, composition.height - 3),
            Rgba([0x33, 0x66, 0x99, 255])
        );
    }

    #[test]
    fn test_invalid_color_uses_default_background() {
        let composition = compose(
            &flat(10, 10, RED),
            &flat(10, 10, RED),
            &StyleConfig::solid("not a colour").with_corner_radius(0.0),
        );
        assert_eq!(*composition.image.get_pixel(1, 1), Rgba([0xf8, 0xfa, 0xfc, 255]));
    }

    #[test]
    fn test_empty_gradient_uses_default_background() {
        let composition = compose(&flat(10, 10, RED), &flat(10, 10, RED), &gradient(Vec::new()));
        assert_eq!(*composition.image.get_pixel(1, 1), Rgba([0xf8, 0xfa, 0xfc, 255]));
    }
}

mod clip_tests {
    use super::*;

    #[test]
    fn test_square_corners_are_opaque() {
        let composition = compose(
            &flat(50, 50, RED),
            &flat(50, 50, RED),
            &StyleConfig::default().with_corner_radius(0.0),
        );
        let (w, h) = (composition.width - 1, composition.height - 1);
        for (x, y) in [(0, 0), (w, 0), (0, h), (w, h)] {
            assert_eq!(composition.image.get_pixel(x, y)[3], 255);
        }
    }

    #[test]
    fn test_rounded_corners_are_transparent() {
        let composition = compose(
            &flat(50, 50, RED),
            &flat(50, 50, RED),
            &StyleConfig::default().with_corner_radius(24.0),
        );
        let (w, h) = (composition.width - 1, composition.height - 1);
        for (x, y) in [(0, 0), (w, 0), (0, h), (w, h)] {
            assert_eq!(*composition.image.get_pixel(x, y), Rgba([0, 0, 0, 0]));
        }
        assert_eq!(composition.image.get_pixel(w / 2, 0)[3], 255);
        assert_eq!(composition.image.get_pixel(0, h / 2)[3], 255);
    }

    #[test]
    fn test_reused_surface_has_no_leftover_clip() {
        let compositor = compositor();
        let mut surface = Surface::new(0, 0);
        let a = flat(30, 30, RED);
        let b = flat(30, 30, BLUE);

        compositor
            .compose_into(&mut surface, &a, &b, &StyleConfig::default().with_corner_radius(50.0))
            .unwrap();
        assert_eq!(surface.clip_depth(), 0);
        assert_eq!(surface.pixels().get_pixel(0, 0)[3], 0);

        compositor
            .compose_into(&mut surface, &a, &b, &StyleConfig::default().with_corner_radius(0.0))
            .unwrap();
        assert_eq!(surface.clip_depth(), 0);
        assert_eq!(surface.pixels().get_pixel(0, 0)[3], 255);

        surface.fill_solid(WHITE);
        assert!(surface.pixels().pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn test_failed_compose_leaves_surface_usable() {
        let compositor = compositor();
        let mut surface = Surface::new(4, 4);
        let result = compositor.compose_into(
            &mut surface,
            &flat(0, 0, RED),
            &flat(4, 4, RED),
            &StyleConfig::default(),
        );
        assert!(result.is_err());
        assert_eq!(surface.clip_depth(), 0);
    }
}

mod label_tests {
    use super::*;
    use std::path::PathBuf;

    /// First row below two 400x300 images
    const STRIP_TOP: u32 = 340;

    fn labelled_compositor() -> Compositor {
        let fixtures = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/fonts");
        let fonts = FontBook::scan(&[fixtures]);
        assert!(!fonts.is_empty(), "font fixture missing");
        Compositor::new(fonts)
    }

    fn labelled(style: StyleConfig) -> Composition {
        labelled_compositor()
            .compose(&flat(400, 300, WHITE), &flat(400, 300, WHITE), &style)
            .unwrap()
    }

    /// Bounding box of pixels darker than mid grey in the given columns below
    /// the images, as `(min_x, min_y, max_x, max_y)`
    fn dark_bounds(
        image: &RgbaImage,
        columns: std::ops::Range<u32>,
    ) -> Option<(u32, u32, u32, u32)> {
        let mut bounds: Option<(u32, u32, u32, u32)> = None;
        for y in STRIP_TOP..image.height() {
            for x in columns.clone() {
                let p = image.get_pixel(x, y);
                if p[3] == 255 && p[0] < 128 && p[1] < 128 && p[2] < 128 {
                    bounds = Some(match bounds {
                        None => (x, y, x, y),
                        Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                    });
                }
            }
        }
        bounds
    }

    #[test]
    fn test_labels_centred_on_columns() {
        let composition = labelled(
            StyleConfig::solid("#ffffff")
                .with_corner_radius(0.0)
                .with_label_font("DejaVu Sans"),
        );
        assert_eq!(composition.height, 480);

        for (slot, columns) in [(Slot::A, 40..440), (Slot::B, 480..880)] {
            let (anchor_x, anchor_y) = composition.layout.label_anchor(slot);
            assert_eq!(anchor_y, 430.0);

            let (x0, y0, x1, y1) = dark_bounds(&composition.image, columns)
                .unwrap_or_else(|| panic!("no label drawn for {}", slot));
            let center_x = (x0 + x1) as f64 / 2.0;
            let center_y = (y0 + y1) as f64 / 2.0;
            assert!((center_x - anchor_x).abs() <= 4.0, "{} label x {}", slot, center_x);
            assert!((center_y - anchor_y).abs() <= 5.0, "{} label y {}", slot, center_y);

            let glyph_height = y1 - y0 + 1;
            assert!((25..=48).contains(&glyph_height), "{} label height {}", slot, glyph_height);
        }
    }

    #[test]
    fn test_labels_only_touch_label_strip() {
        let style = StyleConfig::solid("#ffffff").with_corner_radius(0.0);
        let with_labels = labelled(style.clone());
        let without = compose(&flat(400, 300, WHITE), &flat(400, 300, WHITE), &style);

        assert_ne!(with_labels.image, without.image);
        for y in 0..STRIP_TOP {
            for x in 0..with_labels.width {
                assert_eq!(with_labels.image.get_pixel(x, y), without.image.get_pixel(x, y));
            }
        }
    }

    #[test]
    fn test_labels_black_on_dark_gradient() {
        let composition = labelled(
            StyleConfig::gradient(
                vec![
                    GradientStop::new("#0f172a", 0.0),
                    GradientStop::new("#1e293b", 100.0),
                ],
                90.0,
            )
            .with_corner_radius(0.0),
        );

        let black = composition
            .image
            .enumerate_pixels()
            .filter(|(_, y, p)| {
                *y >= STRIP_TOP && p[3] == 255 && p[0] <= 2 && p[1] <= 2 && p[2] <= 2
            })
            .count();
        assert!(black > 50, "only {} black label pixels", black);

        // The background itself never reaches black
        let edge = composition.image.get_pixel(5, 450);
        assert!(edge[0] >= 15 && edge[2] >= 42, "background {:?}", edge);
    }

    #[test]
    fn test_labelled_compose_is_deterministic() {
        let style = StyleConfig::default().with_label_font("DejaVu Sans");
        let a = create_color_image(257, 190);
        let b = create_color_image(190, 257);

        let first = labelled_compositor().compose(&a, &b, &style).unwrap();
        let compositor = labelled_compositor();
        let second = compositor.compose(&a, &b, &style).unwrap();
        let third = compositor.compose(&a, &b, &style).unwrap();
        assert_eq!(first.image.as_raw(), second.image.as_raw());
        assert_eq!(second.image.as_raw(), third.image.as_raw());
    }

    #[test]
    fn test_unknown_family_falls_back_to_sans_serif() {
        let composition = labelled(
            StyleConfig::solid("#ffffff")
                .with_corner_radius(0.0)
                .with_label_font("No Such Family"),
        );
        assert!(dark_bounds(&composition.image, 40..440).is_some());
        assert!(dark_bounds(&composition.image, 480..880).is_some());
    }
}

mod determinism_tests {
    use super::*;

    #[test]
    fn test_repeated_compose_is_identical() {
        let a = create_color_image(321, 917);
        let b = create_color_image(640, 480);
        let style = StyleConfig::gradient(
            vec![
                GradientStop::new("#f8fafc", 0.0),
                GradientStop::new("#e2e8f0", 100.0),
            ],
            33.0,
        );

        let compositor = compositor();
        let first = compositor.compose(&a, &b, &style).unwrap();
        let second = compositor.compose(&a, &b, &style).unwrap();
        assert_eq!(first.image.as_raw(), second.image.as_raw());
    }

    #[test]
    fn test_shared_compositor_labels_do_not_change_size() {
        let composition = abcompose::compose(
            &flat(64, 48, RED),
            &flat(64, 48, BLUE),
            &StyleConfig::default(),
        )
        .unwrap();
        assert_eq!((composition.width, composition.height), (248, 228));
    }
}

mod export_tests {
    use super::*;
    use abcompose::export::{encode_png, export_png, EXPORT_FILE_NAME};

    #[test]
    fn test_export_round_trip() {
        let composition = compose(
            &create_color_image(120, 80),
            &flat(60, 80, BLUE),
            &StyleConfig::default(),
        );

        let dir = std::env::temp_dir().join(format!("abcompose-it-{}", std::process::id()));
        let path = export_png(&composition, &dir).unwrap();
        assert!(path.ends_with(EXPORT_FILE_NAME));

        let decoded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (composition.width, composition.height));
        assert_eq!(decoded, composition.image);

        let bytes = encode_png(&composition.image).unwrap();
        assert_eq!(bytes, std::fs::read(&path).unwrap());
        let _ = std::fs::remove_dir_all(&dir);
    }
}

mod slot_tests {
    use super::*;

    #[test]
    fn test_paste_fills_a_then_b() {
        let mut slots = ImageSlots::new();
        assert_eq!(slots.paste(flat(1, 1, RED)), Some(Slot::A));
        assert_eq!(slots.paste(flat(2, 2, BLUE)), Some(Slot::B));
        assert_eq!(slots.paste(flat(3, 3, RED)), None);

        let (a, b) = slots.pair().unwrap();
        assert_eq!(a.dimensions(), (1, 1));
        assert_eq!(b.dimensions(), (2, 2));
    }
}

mod layout_properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn scaled_height_never_exceeds_limit(
            wa in 1u32..5000, ha in 1u32..5000, wb in 1u32..5000, hb in 1u32..5000
        ) {
            let layout = Layout::compute((wa, ha), (wb, hb));
            for (placement, h) in [(layout.a, ha), (layout.b, hb)] {
                prop_assert!(placement.height <= MAX_HEIGHT);
                let expected = h as f64 * (MAX_HEIGHT / h as f64).min(1.0);
                prop_assert!((placement.height - expected).abs() < 1e-9);
            }
        }

        #[test]
        fn canvas_adds_fixed_margins(
            wa in 1u32..5000, ha in 1u32..5000, wb in 1u32..5000, hb in 1u32..5000
        ) {
            let layout = Layout::compute((wa, ha), (wb, hb));
            prop_assert_eq!(layout.total_width, layout.a.width + layout.b.width + 120.0);
            prop_assert_eq!(
                layout.total_height,
                layout.a.height.max(layout.b.height) + 180.0
            );
        }

        #[test]
        fn shorter_image_is_centered(
            wa in 1u32..5000, ha in 1u32..5000, wb in 1u32..5000, hb in 1u32..5000
        ) {
            let layout = Layout::compute((wa, ha), (wb, hb));
            let offset_gap = (layout.a.y - layout.b.y).abs();
            let height_gap = (layout.a.height - layout.b.height).abs() / 2.0;
            prop_assert!((offset_gap - height_gap).abs() < 1e-9);

            let taller = if layout.a.height >= layout.b.height { layout.a } else { layout.b };
            prop_assert_eq!(taller.y, PADDING);
            prop_assert_eq!(layout.b.x, 2.0 * PADDING + layout.a.width);
        }
    }
}
