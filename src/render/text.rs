//! Text measurement and rasterization.
//!
//! Two typefaces are available:
//!
//! - [`BitmapFace`]: the embedded Spleen 12x24 bitmap font, scaled to any
//!   pixel height with supersampled anti-aliasing. Always available.
//! - [`TtfFace`]: a TrueType/OpenType font loaded at runtime and rendered
//!   with ab_glyph.
//!
//! Both produce a [`GlyphMask`]: a coverage buffer plus the baseline offset,
//! which the canvas tints and composites.

use ab_glyph::{Font as _, FontArc, ScaleFont as _};
use spleen_font::{FONT_12X24, PSF2Font};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::error::{EncarteError, Result};

/// Anti-aliased text coverage. `data[y * width + x]` is in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct GlyphMask {
    pub width: usize,
    pub height: usize,
    /// Distance from the top of the mask to the text baseline.
    pub baseline: f32,
    pub data: Vec<f32>,
}

/// A font that can measure and rasterize a single line of text.
pub trait Typeface: Send + Sync {
    /// Advance width of `text` at `px` pixel height.
    fn measure(&self, text: &str, px: f32) -> f32;

    /// Rasterize `text` at `px` pixel height.
    fn rasterize(&self, text: &str, px: f32) -> GlyphMask;
}

/// Font size and weight for one text element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    pub px: f32,
    pub bold: bool,
}

impl FontSpec {
    pub const fn regular(px: f32) -> Self {
        Self { px, bold: false }
    }

    pub const fn bold(px: f32) -> Self {
        Self { px, bold: true }
    }
}

/// Regular and bold faces used by the renderer.
#[derive(Clone)]
pub struct Fonts {
    regular: Arc<dyn Typeface>,
    bold: Arc<dyn Typeface>,
}

impl Fonts {
    /// The embedded bitmap font in both weights.
    pub fn builtin() -> Self {
        Self {
            regular: Arc::new(BitmapFace::regular()),
            bold: Arc::new(BitmapFace::bold()),
        }
    }

    /// Load TrueType faces where paths are given, built-in otherwise.
    pub fn load(regular: Option<&Path>, bold: Option<&Path>) -> Result<Self> {
        let builtin = Self::builtin();
        let regular: Arc<dyn Typeface> = match regular {
            Some(path) => Arc::new(TtfFace::from_file(path)?),
            None => builtin.regular,
        };
        let bold: Arc<dyn Typeface> = match bold {
            Some(path) => Arc::new(TtfFace::from_file(path)?),
            None => builtin.bold,
        };
        Ok(Self { regular, bold })
    }

    pub fn face(&self, font: FontSpec) -> &dyn Typeface {
        if font.bold {
            self.bold.as_ref()
        } else {
            self.regular.as_ref()
        }
    }

    pub fn measure(&self, text: &str, font: FontSpec) -> f32 {
        self.face(font).measure(text, font.px)
    }
}

impl std::fmt::Debug for Fonts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fonts").finish_non_exhaustive()
    }
}

impl Default for Fonts {
    fn default() -> Self {
        Self::builtin()
    }
}

// ============================================================================
// BITMAP FACE
// ============================================================================

const CELL_W: usize = 12;
const CELL_H: usize = 24;
/// Baseline row inside the 12x24 cell.
const CELL_BASELINE: f32 = 19.0;
/// Supersamples per axis when scaling a cell.
const SUPERSAMPLE: usize = 3;

type Cell = Arc<[bool]>;

/// Spleen 12x24 scaled to arbitrary sizes.
///
/// Monospaced: every character advances by half the pixel height.
pub struct BitmapFace {
    bold: bool,
    cells: Mutex<HashMap<char, Cell>>,
}

impl BitmapFace {
    pub fn regular() -> Self {
        Self {
            bold: false,
            cells: Mutex::new(HashMap::new()),
        }
    }

    pub fn bold() -> Self {
        Self {
            bold: true,
            cells: Mutex::new(HashMap::new()),
        }
    }

    fn advance(px: f32) -> f32 {
        px * CELL_W as f32 / CELL_H as f32
    }

    fn cell(&self, ch: char) -> Cell {
        if let Ok(cache) = self.cells.lock()
            && let Some(cell) = cache.get(&ch)
        {
            return cell.clone();
        }

        let mut bitmap = decode_cell(ch);
        if self.bold {
            embolden(&mut bitmap);
        }
        let cell: Cell = bitmap.into();
        if let Ok(mut cache) = self.cells.lock() {
            cache.insert(ch, cell.clone());
        }
        cell
    }
}

impl Typeface for BitmapFace {
    fn measure(&self, text: &str, px: f32) -> f32 {
        text.chars().count() as f32 * Self::advance(px)
    }

    fn rasterize(&self, text: &str, px: f32) -> GlyphMask {
        let advance = Self::advance(px);
        let width = (self.measure(text, px).ceil() as usize).max(1);
        let height = (px.ceil() as usize).max(1);
        let mut data = vec![0.0f32; width * height];

        let scale_x = CELL_W as f32 / advance;
        let scale_y = CELL_H as f32 / px;
        let samples = (SUPERSAMPLE * SUPERSAMPLE) as f32;

        for (i, ch) in text.chars().enumerate() {
            if ch == ' ' {
                continue;
            }
            let cell = self.cell(ch);
            let origin = i as f32 * advance;
            let x_start = origin.floor() as usize;
            let x_end = ((origin + advance).ceil() as usize).min(width);

            for y in 0..height {
                for x in x_start..x_end {
                    let mut hits = 0usize;
                    for sy in 0..SUPERSAMPLE {
                        for sx in 0..SUPERSAMPLE {
                            let fx = x as f32 + (sx as f32 + 0.5) / SUPERSAMPLE as f32 - origin;
                            let fy = y as f32 + (sy as f32 + 0.5) / SUPERSAMPLE as f32;
                            if fx < 0.0 || fx >= advance {
                                continue;
                            }
                            let cx = (fx * scale_x) as usize;
                            let cy = (fy * scale_y) as usize;
                            if cx < CELL_W && cy < CELL_H && cell[cy * CELL_W + cx] {
                                hits += 1;
                            }
                        }
                    }
                    if hits > 0 {
                        let idx = y * width + x;
                        data[idx] = (data[idx] + hits as f32 / samples).min(1.0);
                    }
                }
            }
        }

        GlyphMask {
            width,
            height,
            baseline: CELL_BASELINE / scale_y,
            data,
        }
    }
}

/// Decode one Spleen cell, falling back to composed accents or a box.
fn decode_cell(ch: char) -> Vec<bool> {
    if let Some(cell) = spleen_cell(ch) {
        return cell;
    }
    if let Some((base, accent)) = decompose(ch)
        && let Some(mut cell) = spleen_cell(base)
    {
        draw_accent(&mut cell, accent, base.is_uppercase());
        return cell;
    }
    let mut cell = vec![false; CELL_W * CELL_H];
    draw_box(&mut cell);
    cell
}

fn spleen_cell(ch: char) -> Option<Vec<bool>> {
    let mut font = PSF2Font::new(FONT_12X24).expect("embedded Spleen font is valid");
    let utf8 = ch.to_string();
    let glyph = font.glyph_for_utf8(utf8.as_bytes())?;

    let mut cell = vec![false; CELL_W * CELL_H];
    for (row_y, row) in glyph.enumerate() {
        for (col_x, on) in row.enumerate() {
            if row_y < CELL_H && col_x < CELL_W {
                cell[row_y * CELL_W + col_x] = on;
            }
        }
    }
    Some(cell)
}

/// Widen every stroke by one cell column.
fn embolden(cell: &mut [bool]) {
    for y in 0..CELL_H {
        for x in (1..CELL_W).rev() {
            let idx = y * CELL_W + x;
            cell[idx] = cell[idx] || cell[idx - 1];
        }
    }
}

fn draw_box(cell: &mut [bool]) {
    for x in 2..CELL_W - 2 {
        cell[5 * CELL_W + x] = true;
        cell[CELL_BASELINE as usize * CELL_W + x] = true;
    }
    for y in 5..=CELL_BASELINE as usize {
        cell[y * CELL_W + 2] = true;
        cell[y * CELL_W + CELL_W - 3] = true;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Accent {
    Acute,
    Grave,
    Circumflex,
    Tilde,
    Diaeresis,
    Cedilla,
}

/// Portuguese accented letters as base letter plus mark.
fn decompose(ch: char) -> Option<(char, Accent)> {
    use Accent::*;
    let pair = match ch {
        'á' => ('a', Acute),
        'à' => ('a', Grave),
        'â' => ('a', Circumflex),
        'ã' => ('a', Tilde),
        'é' => ('e', Acute),
        'ê' => ('e', Circumflex),
        'í' => ('i', Acute),
        'ó' => ('o', Acute),
        'ô' => ('o', Circumflex),
        'õ' => ('o', Tilde),
        'ú' => ('u', Acute),
        'ü' => ('u', Diaeresis),
        'ç' => ('c', Cedilla),
        'Á' => ('A', Acute),
        'À' => ('A', Grave),
        'Â' => ('A', Circumflex),
        'Ã' => ('A', Tilde),
        'É' => ('E', Acute),
        'Ê' => ('E', Circumflex),
        'Í' => ('I', Acute),
        'Ó' => ('O', Acute),
        'Ô' => ('O', Circumflex),
        'Õ' => ('O', Tilde),
        'Ú' => ('U', Acute),
        'Ü' => ('U', Diaeresis),
        'Ç' => ('C', Cedilla),
        _ => return None,
    };
    Some(pair)
}

fn draw_accent(cell: &mut [bool], accent: Accent, uppercase: bool) {
    // Lowercase marks sit above the x-height, uppercase ones in the cap gap.
    let top = if uppercase { 1 } else { 5 };
    let mut set = |x: usize, y: usize| {
        if x < CELL_W && y < CELL_H {
            cell[y * CELL_W + x] = true;
        }
    };

    match accent {
        Accent::Acute => {
            for (dx, dy) in [(7, 0), (6, 1), (5, 2)] {
                set(dx, top + dy);
                set(dx + 1, top + dy);
            }
        }
        Accent::Grave => {
            for (dx, dy) in [(4, 0), (5, 1), (6, 2)] {
                set(dx, top + dy);
                set(dx + 1, top + dy);
            }
        }
        Accent::Circumflex => {
            for (dx, dy) in [(5, 0), (6, 0), (4, 1), (7, 1), (3, 2), (8, 2)] {
                set(dx, top + dy);
            }
        }
        Accent::Tilde => {
            for (dx, dy) in [(3, 1), (4, 0), (5, 0), (6, 1), (7, 1), (8, 0)] {
                set(dx, top + dy);
            }
        }
        Accent::Diaeresis => {
            for dy in 0..2 {
                set(4, top + dy);
                set(7, top + dy);
            }
        }
        Accent::Cedilla => {
            let base = CELL_BASELINE as usize + 1;
            for (dx, dy) in [(5, 0), (6, 0), (6, 1), (7, 2), (6, 3), (5, 3)] {
                set(dx, base + dy);
            }
        }
    }
}

// ============================================================================
// TRUETYPE FACE
// ============================================================================

/// A TrueType/OpenType font rendered with ab_glyph.
pub struct TtfFace {
    font: FontArc,
}

impl TtfFace {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| EncarteError::Config(format!("Invalid font data: {}", e)))?;
        Ok(Self { font })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            EncarteError::Config(format!("Failed to read font {}: {}", path.display(), e))
        })?;
        Self::from_bytes(bytes)
    }

    /// Glyph ids with their caret positions, plus the total advance.
    fn layout(&self, text: &str, px: f32) -> (Vec<(ab_glyph::GlyphId, f32)>, f32) {
        let scaled = self.font.as_scaled(px);
        let mut glyphs = Vec::new();
        let mut caret_x = 0.0f32;
        let mut prev = None;

        for ch in text.chars() {
            let glyph_id = self.font.glyph_id(ch);
            if let Some(prev_id) = prev {
                caret_x += scaled.kern(prev_id, glyph_id);
            }
            glyphs.push((glyph_id, caret_x));
            caret_x += scaled.h_advance(glyph_id);
            prev = Some(glyph_id);
        }

        (glyphs, caret_x)
    }
}

impl Typeface for TtfFace {
    fn measure(&self, text: &str, px: f32) -> f32 {
        self.layout(text, px).1
    }

    fn rasterize(&self, text: &str, px: f32) -> GlyphMask {
        let scaled = self.font.as_scaled(px);
        let (glyphs, advance) = self.layout(text, px);

        let ascent = scaled.ascent();
        let descent = scaled.descent();
        let width = (advance.ceil() as usize + 2).max(1);
        let height = ((ascent - descent).ceil() as usize).max(1);
        let mut data = vec![0.0f32; width * height];

        for (glyph_id, glyph_x) in glyphs {
            let glyph = glyph_id.with_scale_and_position(px, ab_glyph::point(glyph_x, ascent));
            if let Some(outlined) = self.font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|gx, gy, coverage| {
                    let x = gx as i32 + bounds.min.x as i32;
                    let y = gy as i32 + bounds.min.y as i32;
                    if x >= 0 && x < width as i32 && y >= 0 && y < height as i32 {
                        let idx = y as usize * width + x as usize;
                        data[idx] = (data[idx] + coverage).min(1.0);
                    }
                });
            }
        }

        GlyphMask {
            width,
            height,
            baseline: ascent,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitmap_measure_is_monospaced() {
        let face = BitmapFace::regular();
        assert_eq!(face.measure("ABCD", 24.0), 48.0);
        assert_eq!(face.measure("", 24.0), 0.0);
        assert_eq!(face.measure("ÁÇ", 36.0), 36.0);
    }

    #[test]
    fn test_bitmap_rasterize_has_ink() {
        let face = BitmapFace::regular();
        let mask = face.rasterize("Brahma", 32.0);
        assert_eq!(mask.data.len(), mask.width * mask.height);
        assert_eq!(mask.height, 32);
        assert!(mask.data.iter().any(|&v| v > 0.0));
    }

    #[test]
    fn test_bitmap_scaling_is_anti_aliased() {
        let face = BitmapFace::regular();
        let mask = face.rasterize("Oferta", 37.0);
        let has_intermediate = mask.data.iter().any(|&v| v > 0.01 && v < 0.99);
        assert!(has_intermediate, "scaled glyphs should have partial coverage");
    }

    #[test]
    fn test_bold_has_more_ink() {
        let ink = |face: &BitmapFace| face.rasterize("R$ 9,99", 28.0).data.iter().sum::<f32>();
        assert!(ink(&BitmapFace::bold()) > ink(&BitmapFace::regular()));
    }

    #[test]
    fn test_accented_letters_render() {
        let face = BitmapFace::bold();
        for text in ["Í", "ã", "ç", "É"] {
            let mask = face.rasterize(text, 24.0);
            assert!(mask.data.iter().any(|&v| v > 0.0), "{} has no ink", text);
        }
    }

    #[test]
    fn test_decompose_covers_portuguese_letters() {
        assert_eq!(decompose('Í'), Some(('I', Accent::Acute)));
        assert_eq!(decompose('ç'), Some(('c', Accent::Cedilla)));
        assert_eq!(decompose('z'), None);
    }

    #[test]
    fn test_fonts_pick_weight() {
        let fonts = Fonts::builtin();
        let regular = fonts.face(FontSpec::regular(20.0)).rasterize("I", 20.0);
        let bold = fonts.face(FontSpec::bold(20.0)).rasterize("I", 20.0);
        let ink = |m: &GlyphMask| m.data.iter().sum::<f32>();
        assert!(ink(&bold) > ink(&regular));
    }

    #[test]
    fn test_invalid_ttf_is_config_error() {
        let err = TtfFace::from_bytes(vec![0, 1, 2, 3]).err().unwrap();
        assert!(matches!(err, EncarteError::Config(_)));
    }
}
