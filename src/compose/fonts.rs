//! Label font discovery and text drawing
//!
//! Fonts are looked up by family name among the font files installed on the
//! machine. A bold face is preferred; when the requested family is missing a
//! generic sans-serif family stands in for it.

use std::fs;
use std::path::{Path, PathBuf};

use ab_glyph::{point, Font, FontVec, Glyph, GlyphId, PxScale, ScaleFont};
use directories::BaseDirs;
use log::{debug, warn};

use super::surface::Surface;
use crate::color_space::Rgb;

/// Families tried, in order, when the requested one is not installed
pub const SANS_SERIF_FALLBACKS: &[&str] = &[
    "DejaVu Sans",
    "Liberation Sans",
    "Noto Sans",
    "Arial",
    "Helvetica",
    "FreeSans",
];

const FONT_EXTENSIONS: &[&str] = &["ttf", "otf"];
const MAX_SCAN_DEPTH: usize = 6;

/// A parsed font face ready to draw labels
pub struct LabelFace {
    pub family: String,
    pub path: PathBuf,
    font: FontVec,
}

impl std::fmt::Debug for LabelFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelFace")
            .field("family", &self.family)
            .field("path", &self.path)
            .finish()
    }
}

impl LabelFace {
    pub fn from_file(family: &str, path: &Path) -> Option<Self> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("cannot read font {:?}: {}", path, e);
                return None;
            }
        };
        match FontVec::try_from_vec(bytes) {
            Ok(font) => Some(Self {
                family: family.to_string(),
                path: path.to_path_buf(),
                font,
            }),
            Err(e) => {
                warn!("cannot parse font {:?}: {}", path, e);
                None
            }
        }
    }

    /// Lay out `text` on a single line starting at the origin
    fn layout(&self, text: &str, size: f32) -> (Vec<Glyph>, f32) {
        let scale = PxScale::from(size);
        let scaled = self.font.as_scaled(scale);

        let mut glyphs = Vec::with_capacity(text.len());
        let mut caret = 0.0;
        let mut previous: Option<GlyphId> = None;
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id);
            }
            glyphs.push(id.with_scale_and_position(scale, point(caret, 0.0)));
            caret += scaled.h_advance(id);
            previous = Some(id);
        }
        (glyphs, caret)
    }

    /// Advance width of `text` at `size` pixels
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        self.layout(text, size).1
    }

    /// Draw `text` centred on `center`, using the middle of the em box as
    /// the vertical reference.
    pub fn draw_centered(
        &self,
        surface: &mut Surface,
        text: &str,
        center: (f32, f32),
        size: f32,
        color: Rgb,
    ) {
        let scaled = self.font.as_scaled(PxScale::from(size));
        let (glyphs, width) = self.layout(text, size);
        let origin_x = center.0 - width / 2.0;
        let baseline = center.1 + (scaled.ascent() + scaled.descent()) / 2.0;
        let rgba = color.to_rgba();

        for mut glyph in glyphs {
            glyph.position = point(glyph.position.x + origin_x, baseline);
            let Some(outlined) = self.font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            let (left, top) = (bounds.min.x as i64, bounds.min.y as i64);
            outlined.draw(|x, y, coverage| {
                surface.blend_pixel(left + x as i64, top + y as i64, rgba, coverage);
            });
        }
    }
}

/// Installed font files, indexed for lookup by family name
#[derive(Debug, Clone, Default)]
pub struct FontBook {
    files: Vec<PathBuf>,
}

impl FontBook {
    /// A book with no fonts. Labels are skipped when composing with it.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Scan the platform font directories plus `extra_dirs`
    pub fn system(extra_dirs: &[PathBuf]) -> Self {
        let mut dirs = extra_dirs.to_vec();
        dirs.extend(platform_font_dirs());
        Self::scan(&dirs)
    }

    /// Scan the given directories recursively for font files
    pub fn scan(dirs: &[PathBuf]) -> Self {
        let mut files = Vec::new();
        for dir in dirs {
            collect_font_files(dir, 0, &mut files);
        }
        files.sort();
        files.dedup();
        debug!("font book indexed {} file(s)", files.len());
        Self { files }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Best file for a bold face of `family`, if one is installed
    pub fn find(&self, family: &str) -> Option<&Path> {
        let wanted = normalize(family);
        if wanted.is_empty() {
            return None;
        }

        // Files are sorted, so ties resolve to the same path on every run.
        self.files
            .iter()
            .filter_map(|path| {
                let stem = normalize(&path.file_stem()?.to_string_lossy());
                match_score(&stem, &wanted).map(|score| (score, path))
            })
            .max_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.cmp(a.1)))
            .map(|(_, path)| path.as_path())
    }

    /// Load the face for `family`, falling back through
    /// [`SANS_SERIF_FALLBACKS`].
    pub fn resolve(&self, family: &str) -> Option<LabelFace> {
        let candidates = family_aliases(family)
            .into_iter()
            .chain(SANS_SERIF_FALLBACKS.iter().map(|s| s.to_string()));

        for candidate in candidates {
            if let Some(path) = self.find(&candidate) {
                if let Some(face) = LabelFace::from_file(&candidate, path) {
                    debug!("label font {:?} resolved to {:?}", family, path);
                    return Some(face);
                }
            }
        }
        None
    }
}

/// Lowercase with everything but ASCII letters and digits removed
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Higher is better; `None` means the file is not this family
fn match_score(stem: &str, family: &str) -> Option<u8> {
    let rest = stem.strip_prefix(family)?;
    if rest.contains("italic") || rest.contains("oblique") {
        return None;
    }
    match rest {
        "bold" | "bd" | "b" => Some(4),
        "" | "regular" => Some(1),
        _ if rest.ends_with("bold") && !rest.contains("semi") && !rest.contains("extra") => {
            Some(3)
        }
        _ if rest.contains("bold") => Some(2),
        _ => None,
    }
}

/// Names a family goes by on different platforms
fn family_aliases(family: &str) -> Vec<String> {
    let mut names = vec![family.to_string()];
    let extra: &[&str] = match normalize(family).as_str() {
        "systemui" => &["Segoe UI", "SF NS", "Cantarell", "Ubuntu", "Noto Sans"],
        "sfprodisplay" => &["SF Pro", "SF NS Display"],
        "helveticaneue" => &["Helvetica", "Nimbus Sans"],
        "arial" => &["Liberation Sans", "Arimo"],
        "timesnewroman" => &["Times", "Liberation Serif", "Tinos"],
        "georgia" => &["Gelasio"],
        "couriernew" => &["Courier", "Liberation Mono", "Cousine"],
        "monaco" => &["Menlo", "DejaVu Sans Mono"],
        _ => &[],
    };
    names.extend(extra.iter().map(|s| s.to_string()));
    names
}

fn platform_font_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if cfg!(target_os = "macos") {
        dirs.push(PathBuf::from("/System/Library/Fonts"));
        dirs.push(PathBuf::from("/Library/Fonts"));
    } else if cfg!(windows) {
        dirs.push(PathBuf::from("C:\\Windows\\Fonts"));
    } else {
        dirs.push(PathBuf::from("/usr/share/fonts"));
        dirs.push(PathBuf::from("/usr/local/share/fonts"));
    }

    if let Some(base) = BaseDirs::new() {
        let home = base.home_dir();
        if cfg!(target_os = "macos") {
            dirs.push(home.join("Library/Fonts"));
        } else if !cfg!(windows) {
            dirs.push(base.data_dir().join("fonts"));
            dirs.push(home.join(".fonts"));
        }
    }
    dirs
}

fn collect_font_files(dir: &Path, depth: usize, out: &mut Vec<PathBuf>) {
    if depth > MAX_SCAN_DEPTH {
        return;
    }
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_font_files(&path, depth + 1, out);
        } else if is_font_file(&path) {
            out.push(path);
        }
    }
}

fn is_font_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| FONT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(names: &[&str]) -> FontBook {
        let mut files: Vec<PathBuf> = names.iter().map(|n| PathBuf::from("/fonts").join(n)).collect();
        files.sort();
        FontBook { files }
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("Times New Roman"), "timesnewroman");
        assert_eq!(normalize("DejaVuSans-Bold"), "dejavusansbold");
    }

    #[test]
    fn test_prefers_exact_bold() {
        let fonts = book(&[
            "DejaVuSans.ttf",
            "DejaVuSans-Bold.ttf",
            "DejaVuSansMono-Bold.ttf",
            "DejaVuSans-BoldOblique.ttf",
        ]);
        assert_eq!(
            fonts.find("DejaVu Sans"),
            Some(Path::new("/fonts/DejaVuSans-Bold.ttf"))
        );
    }

    #[test]
    fn test_falls_back_to_regular() {
        let fonts = book(&["Georgia.ttf", "Georgia Italic.ttf"]);
        assert_eq!(fonts.find("Georgia"), Some(Path::new("/fonts/Georgia.ttf")));
    }

    #[test]
    fn test_unknown_family() {
        let fonts = book(&["Inter-Bold.ttf"]);
        assert_eq!(fonts.find("Monaco"), None);
        assert_eq!(fonts.find(""), None);
    }

    #[test]
    fn test_aliases_include_family_first() {
        let names = family_aliases("Arial");
        assert_eq!(names[0], "Arial");
        assert!(names.contains(&"Liberation Sans".to_string()));
    }

    #[test]
    fn test_empty_book_resolves_nothing() {
        assert!(FontBook::empty().resolve("Inter").is_none());
    }

    #[test]
    fn test_font_extensions() {
        assert!(is_font_file(Path::new("a/Inter-Bold.TTF")));
        assert!(is_font_file(Path::new("a/Inter-Bold.otf")));
        assert!(!is_font_file(Path::new("a/fonts.conf")));
    }
}
