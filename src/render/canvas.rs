//! RGBA drawing surface.
//!
//! A small subset of a 2D canvas API on top of [`image::RgbaImage`]:
//! rectangle and circle fills, linear gradients, tinted text masks, and
//! image layers with rotation, circular clipping and drop shadows. All
//! compositing is source-over with straight alpha.

use image::{DynamicImage, Rgba, RgbaImage, imageops};
use rayon::prelude::*;

use super::color::Color;
use super::text::{FontSpec, Fonts, GlyphMask};

/// Axis-aligned rectangle in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.w / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.h / 2.0
    }
}

/// Two-stop linear gradient between canvas points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearGradient {
    pub start: (f32, f32),
    pub end: (f32, f32),
    pub from: Color,
    pub to: Color,
}

impl LinearGradient {
    pub fn new(start: (f32, f32), end: (f32, f32), from: Color, to: Color) -> Self {
        Self {
            start,
            end,
            from,
            to,
        }
    }

    /// Color at a point: projection onto the gradient axis, clamped.
    pub fn color_at(&self, x: f32, y: f32) -> Color {
        let (dx, dy) = (self.end.0 - self.start.0, self.end.1 - self.start.1);
        let len_sq = dx * dx + dy * dy;
        if len_sq == 0.0 {
            return self.from;
        }
        let t = ((x - self.start.0) * dx + (y - self.start.1) * dy) / len_sq;
        self.from.lerp(self.to, t)
    }
}

/// Fill for rectangles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    Solid(Color),
    Linear(LinearGradient),
}

impl Paint {
    fn color_at(&self, x: f32, y: f32) -> Color {
        match self {
            Paint::Solid(c) => *c,
            Paint::Linear(g) => g.color_at(x, y),
        }
    }
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Paint::Solid(color)
    }
}

/// Blurred, offset copy of a layer painted beneath it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub color: Color,
    /// Blur extent in pixels; the Gaussian sigma is half of this.
    pub blur: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl Shadow {
    pub fn new(color: Color, blur: f32, offset_y: f32) -> Self {
        Self {
            color,
            blur,
            offset_x: 0.0,
            offset_y,
        }
    }
}

/// Placement of an image layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePlacement {
    pub rect: Rect,
    /// Clockwise degrees about the rect's center.
    pub rotation: f32,
    /// Keep only the inscribed circle.
    pub clip_circle: bool,
}

/// Source-over blend of `src` onto `dst`, with `src` alpha scaled by `coverage`.
#[inline]
fn blend(dst: &mut [u8], src: Color, coverage: f32) {
    let sa = (src.a as f32 / 255.0) * coverage.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return;
    }
    let channel = |s: u8, d: u8| {
        let v = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
        v.round().clamp(0.0, 255.0) as u8
    };
    dst[0] = channel(src.r, dst[0]);
    dst[1] = channel(src.g, dst[1]);
    dst[2] = channel(src.b, dst[2]);
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

/// An RGBA canvas, initially fully transparent.
#[derive(Debug, Clone)]
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        let [r, g, b, a] = self.image.get_pixel(x, y).0;
        Color { r, g, b, a }
    }

    /// Integer pixel span covered by `[start, start + len)`, clamped to `max`.
    fn span(start: f32, len: f32, max: u32) -> (u32, u32) {
        let lo = start.round().max(0.0) as u32;
        let hi = (start + len).round().max(0.0) as u32;
        (lo.min(max), hi.min(max))
    }

    /// Fill a rectangle with a solid color or gradient.
    pub fn fill_rect(&mut self, rect: Rect, paint: impl Into<Paint>) {
        let paint = paint.into();
        let width = self.width();
        let (x0, x1) = Self::span(rect.x, rect.w, width);
        let (y0, y1) = Self::span(rect.y, rect.h, self.height());
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let row_len = width as usize * 4;
        self.image
            .par_chunks_mut(row_len)
            .enumerate()
            .skip(y0 as usize)
            .take((y1 - y0) as usize)
            .for_each(|(y, row)| {
                for x in x0..x1 {
                    let color = paint.color_at(x as f32 + 0.5, y as f32 + 0.5);
                    let idx = x as usize * 4;
                    blend(&mut row[idx..idx + 4], color, 1.0);
                }
            });
    }

    /// Outline a rectangle with lines of `line_width` centered on its edges.
    pub fn stroke_rect(&mut self, rect: Rect, line_width: f32, color: Color) {
        let half = line_width / 2.0;
        let Rect { x, y, w, h } = rect;
        self.fill_rect(Rect::new(x - half, y - half, w + line_width, line_width), color);
        self.fill_rect(Rect::new(x - half, y + h - half, w + line_width, line_width), color);
        self.fill_rect(Rect::new(x - half, y + half, line_width, h - line_width), color);
        self.fill_rect(Rect::new(x + w - half, y + half, line_width, h - line_width), color);
    }

    /// Horizontal line from `x0` to `x1`, centered on `y`.
    pub fn hline(&mut self, x0: f32, x1: f32, y: f32, line_width: f32, color: Color) {
        self.fill_rect(Rect::new(x0, y - line_width / 2.0, x1 - x0, line_width), color);
    }

    /// Anti-aliased filled circle.
    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color) {
        let (w, h) = (self.width() as i64, self.height() as i64);
        let x0 = ((cx - radius).floor() as i64).max(0);
        let x1 = ((cx + radius).ceil() as i64).min(w);
        let y0 = ((cy - radius).floor() as i64).max(0);
        let y1 = ((cy + radius).ceil() as i64).min(h);

        for y in y0..y1 {
            for x in x0..x1 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                let coverage = (radius + 0.5 - (dx * dx + dy * dy).sqrt()).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    let px = self.image.get_pixel_mut(x as u32, y as u32);
                    blend(&mut px.0, color, coverage);
                }
            }
        }
    }

    /// Composite a layer with its top-left corner at `(x, y)`.
    pub fn draw_layer(&mut self, layer: &RgbaImage, x: i64, y: i64) {
        let (w, h) = (self.width() as i64, self.height() as i64);
        for (lx, ly, px) in layer.enumerate_pixels() {
            let [r, g, b, a] = px.0;
            if a == 0 {
                continue;
            }
            let (cx, cy) = (x + lx as i64, y + ly as i64);
            if cx < 0 || cy < 0 || cx >= w || cy >= h {
                continue;
            }
            let dst = self.image.get_pixel_mut(cx as u32, cy as u32);
            blend(&mut dst.0, Color { r, g, b, a }, 1.0);
        }
    }

    /// Composite a layer, painting its blurred shadow first.
    pub fn draw_layer_with_shadow(&mut self, layer: &RgbaImage, x: i64, y: i64, shadow: Option<Shadow>) {
        if let Some(shadow) = shadow
            && shadow.color.a > 0
        {
            let margin = shadow.blur.ceil().max(0.0) as u32;
            let mut mask = RgbaImage::new(layer.width() + margin * 2, layer.height() + margin * 2);
            for (lx, ly, px) in layer.enumerate_pixels() {
                let alpha = px.0[3] as f32 / 255.0 * shadow.color.a as f32;
                mask.put_pixel(
                    lx + margin,
                    ly + margin,
                    Rgba([shadow.color.r, shadow.color.g, shadow.color.b, alpha.round() as u8]),
                );
            }
            let blurred = if shadow.blur > 0.0 {
                imageops::blur(&mask, shadow.blur / 2.0)
            } else {
                mask
            };
            self.draw_layer(
                &blurred,
                x - margin as i64 + shadow.offset_x.round() as i64,
                y - margin as i64 + shadow.offset_y.round() as i64,
            );
        }
        self.draw_layer(layer, x, y);
    }

    /// Draw `text` horizontally centered on `center_x` with its baseline at `baseline_y`.
    pub fn fill_text_centered(
        &mut self,
        fonts: &Fonts,
        text: &str,
        font: FontSpec,
        center_x: f32,
        baseline_y: f32,
        color: Color,
        shadow: Option<Shadow>,
    ) {
        if text.trim().is_empty() {
            return;
        }
        let mask = fonts.face(font).rasterize(text, font.px);
        let width = fonts.measure(text, font);
        let x = (center_x - width / 2.0).round() as i64;
        let y = (baseline_y - mask.baseline).round() as i64;
        let layer = tint_mask(&mask, color);
        self.draw_layer_with_shadow(&layer, x, y, shadow);
    }

    /// Draw an image scaled into `placement.rect`, optionally rotated,
    /// clipped to a circle, and shadowed.
    pub fn draw_image(&mut self, source: &DynamicImage, placement: ImagePlacement, shadow: Option<Shadow>) {
        let rect = placement.rect;
        let w = rect.w.round().max(1.0) as u32;
        let h = rect.h.round().max(1.0) as u32;
        let mut layer = imageops::resize(&source.to_rgba8(), w, h, imageops::FilterType::Triangle);

        if placement.clip_circle {
            clip_to_circle(&mut layer);
        }

        let (layer, x, y) = if placement.rotation != 0.0 {
            let rotated = rotate_about_center(&layer, placement.rotation);
            let x = rect.center_x() - rotated.width() as f32 / 2.0;
            let y = rect.center_y() - rotated.height() as f32 / 2.0;
            (rotated, x, y)
        } else {
            (layer, rect.x, rect.y)
        };

        self.draw_layer_with_shadow(&layer, x.round() as i64, y.round() as i64, shadow);
    }
}

/// Colorize a coverage mask.
fn tint_mask(mask: &GlyphMask, color: Color) -> RgbaImage {
    let mut layer = RgbaImage::new(mask.width as u32, mask.height as u32);
    for (x, y, px) in layer.enumerate_pixels_mut() {
        let coverage = mask.data[y as usize * mask.width + x as usize];
        let alpha = (coverage * color.a as f32).round().clamp(0.0, 255.0) as u8;
        *px = Rgba([color.r, color.g, color.b, alpha]);
    }
    layer
}

/// Multiply alpha by an anti-aliased inscribed circle.
fn clip_to_circle(layer: &mut RgbaImage) {
    let (w, h) = (layer.width() as f32, layer.height() as f32);
    let (cx, cy) = (w / 2.0, h / 2.0);
    let radius = w.min(h) / 2.0;
    for (x, y, px) in layer.enumerate_pixels_mut() {
        let dx = x as f32 + 0.5 - cx;
        let dy = y as f32 + 0.5 - cy;
        let coverage = (radius + 0.5 - (dx * dx + dy * dy).sqrt()).clamp(0.0, 1.0);
        px.0[3] = (px.0[3] as f32 * coverage).round() as u8;
    }
}

/// Rotate clockwise by `degrees` into a new layer sized to the rotated bounds.
fn rotate_about_center(layer: &RgbaImage, degrees: f32) -> RgbaImage {
    let theta = degrees.to_radians();
    let (sin, cos) = theta.sin_cos();
    let (w, h) = (layer.width() as f32, layer.height() as f32);

    let out_w = (w * cos.abs() + h * sin.abs()).ceil().max(1.0) as u32;
    let out_h = (w * sin.abs() + h * cos.abs()).ceil().max(1.0) as u32;
    let (ocx, ocy) = (out_w as f32 / 2.0, out_h as f32 / 2.0);
    let (icx, icy) = (w / 2.0, h / 2.0);

    let mut out = RgbaImage::new(out_w, out_h);
    for (x, y, px) in out.enumerate_pixels_mut() {
        let dx = x as f32 + 0.5 - ocx;
        let dy = y as f32 + 0.5 - ocy;
        // Inverse rotation back into source space.
        let sx = cos * dx + sin * dy + icx - 0.5;
        let sy = -sin * dx + cos * dy + icy - 0.5;
        *px = sample_bilinear(layer, sx, sy);
    }
    out
}

/// Bilinear sample with premultiplied averaging; transparent outside.
fn sample_bilinear(img: &RgbaImage, x: f32, y: f32) -> Rgba<u8> {
    let (w, h) = (img.width() as i64, img.height() as i64);
    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let (fx, fy) = (x - x0 as f32, y - y0 as f32);

    let mut acc = [0.0f32; 4];
    for (ox, oy, weight) in [
        (0, 0, (1.0 - fx) * (1.0 - fy)),
        (1, 0, fx * (1.0 - fy)),
        (0, 1, (1.0 - fx) * fy),
        (1, 1, fx * fy),
    ] {
        let (sx, sy) = (x0 + ox, y0 + oy);
        if sx < 0 || sy < 0 || sx >= w || sy >= h || weight <= 0.0 {
            continue;
        }
        let [r, g, b, a] = img.get_pixel(sx as u32, sy as u32).0;
        let a = a as f32 * weight;
        acc[0] += r as f32 * a;
        acc[1] += g as f32 * a;
        acc[2] += b as f32 * a;
        acc[3] += a;
    }

    if acc[3] <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let un = |c: f32| (c / acc[3]).round().clamp(0.0, 255.0) as u8;
    Rgba([un(acc[0]), un(acc[1]), un(acc[2]), acc[3].round().clamp(0.0, 255.0) as u8])
}
