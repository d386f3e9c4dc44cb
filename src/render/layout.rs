//! Flyer geometry.
//!
//! Every position on the flyer is derived here before any pixel is
//! touched, so the canvas height is known up front and long product names
//! or info blocks push the footer down instead of overlapping it.

use super::canvas::Rect;
use super::text::{FontSpec, Fonts};
use super::wrap::wrap_words;
use crate::flyer::FlyerSpec;

pub const HEADER_HEIGHT: f32 = 100.0;
pub const FOOTER_HEIGHT: f32 = 120.0;
/// Top of the product area, below the header.
pub const PRODUCT_AREA_Y: f32 = HEADER_HEIGHT + 20.0;
pub const IMAGE_AREA_HEIGHT: f32 = 400.0;
/// Horizontal inset of the image area and the offer banner.
pub const SIDE_MARGIN: f32 = 50.0;
/// Backdrop extends this far around the image area.
pub const BACKDROP_BLEED: f32 = 20.0;
/// Loaded images are fitted into this share of the image area's short side.
pub const IMAGE_FIT_RATIO: f32 = 0.8;
pub const PLACEHOLDER_SIZE: f32 = 300.0;

pub const BADGE_SIZE: f32 = 120.0;
pub const BANNER_HEIGHT: f32 = 80.0;
pub const PROMO_BOX_HEIGHT: f32 = 80.0;

pub const NAME_FONT: FontSpec = FontSpec::bold(32.0);
pub const NAME_LINE_HEIGHT: f32 = 40.0;
pub const INFO_FONT: FontSpec = FontSpec::regular(18.0);
pub const INFO_LINE_HEIGHT: f32 = 25.0;

/// Wrapped lines starting at a baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub first_baseline: f32,
    pub line_height: f32,
}

impl TextBlock {
    pub fn baselines(&self) -> impl Iterator<Item = (f32, &str)> + '_ {
        self.lines
            .iter()
            .enumerate()
            .map(|(i, line)| (self.first_baseline + i as f32 * self.line_height, line.as_str()))
    }

    /// Baseline of the last line (the first baseline when empty).
    pub fn last_baseline(&self) -> f32 {
        let extra = self.lines.len().saturating_sub(1) as f32;
        self.first_baseline + extra * self.line_height
    }
}

/// Additional-info block and its tinted box.
#[derive(Debug, Clone, PartialEq)]
pub struct InfoLayout {
    pub text: TextBlock,
    pub panel: Rect,
}

/// Positions of every flyer element for one spec.
#[derive(Debug, Clone, PartialEq)]
pub struct FlyerLayout {
    pub width: u32,
    pub height: u32,
    pub header: Rect,
    pub image_area: Rect,
    pub backdrop: Rect,
    pub placeholder: Rect,
    pub name: TextBlock,
    pub banner: Rect,
    pub original_baseline: f32,
    pub promo_panel: Rect,
    pub promo_baseline: f32,
    /// Badge center and radius.
    pub badge: (f32, f32, f32),
    pub info: Option<InfoLayout>,
    pub footer: Rect,
}

impl FlyerLayout {
    /// Measure text and place every element.
    pub fn compute(spec: &FlyerSpec, fonts: &Fonts, width: u32, min_height: u32) -> Self {
        let w = width as f32;

        let image_area = Rect::new(SIDE_MARGIN, PRODUCT_AREA_Y + 20.0, w - 2.0 * SIDE_MARGIN, IMAGE_AREA_HEIGHT);
        let backdrop = Rect::new(
            image_area.x - BACKDROP_BLEED,
            image_area.y - BACKDROP_BLEED,
            image_area.w + 2.0 * BACKDROP_BLEED,
            image_area.h + 2.0 * BACKDROP_BLEED,
        );
        let placeholder = Rect::new(
            (w - PLACEHOLDER_SIZE) / 2.0,
            PRODUCT_AREA_Y + 50.0,
            PLACEHOLDER_SIZE,
            PLACEHOLDER_SIZE,
        );

        let name = TextBlock {
            lines: wrap_words(&spec.product().name, w - 100.0, |s| fonts.measure(s, NAME_FONT)),
            first_baseline: PRODUCT_AREA_Y + 460.0,
            line_height: NAME_LINE_HEIGHT,
        };

        let banner_top = name.last_baseline() + 50.0;
        let banner = Rect::new(SIDE_MARGIN, banner_top, w - 2.0 * SIDE_MARGIN, BANNER_HEIGHT);
        let original_baseline = banner_top + 120.0;
        let promo_baseline = original_baseline + 80.0;
        let promo_panel = Rect::new(100.0, promo_baseline - 50.0, w - 200.0, PROMO_BOX_HEIGHT);

        let badge_x = w - BADGE_SIZE - 30.0;
        let badge_y = PRODUCT_AREA_Y + 30.0;
        let badge = (badge_x + BADGE_SIZE / 2.0, badge_y + BADGE_SIZE / 2.0, BADGE_SIZE / 2.0);

        let info = spec.additional_info().and_then(|info| {
            let lines = wrap_words(info, w - 200.0, |s| fonts.measure(s, INFO_FONT));
            if lines.is_empty() {
                return None;
            }
            let text = TextBlock {
                lines,
                first_baseline: promo_baseline + 60.0,
                line_height: INFO_LINE_HEIGHT,
            };
            let top = text.first_baseline - 26.0;
            let panel = Rect::new(80.0, top, w - 160.0, text.last_baseline() - top + 10.0);
            Some(InfoLayout { text, panel })
        });

        let content_bottom = match &info {
            Some(info) => info.panel.bottom(),
            None => promo_panel.bottom(),
        };
        let footer_y = (content_bottom + 20.0).max(min_height as f32 - FOOTER_HEIGHT).ceil();
        let height = (footer_y + FOOTER_HEIGHT) as u32;

        Self {
            width,
            height,
            header: Rect::new(0.0, 0.0, w, HEADER_HEIGHT),
            image_area,
            backdrop,
            placeholder,
            name,
            banner,
            original_baseline,
            promo_panel,
            promo_baseline,
            badge,
            info,
            footer: Rect::new(0.0, footer_y, w, FOOTER_HEIGHT),
        }
    }

    /// Where a loaded `(img_w, img_h)` image lands before rotation.
    ///
    /// The image is downscaled to fit, centered in the image area, then the
    /// user's scale and offset are applied. Centering uses the fitted size,
    /// so scaling grows the image from its top-left corner.
    pub fn image_rect(&self, img_w: f32, img_h: f32, scale: f32, dx: f32, dy: f32) -> Rect {
        let area = self.image_area;
        let max = area.w.min(area.h) * IMAGE_FIT_RATIO;
        let (mut w, mut h) = (img_w, img_h);
        if w > h {
            if w > max {
                h = h * max / w;
                w = max;
            }
        } else if h > max {
            w = w * max / h;
            h = max;
        }

        let x = area.x + (area.w - w) / 2.0 + dx;
        let y = area.y + (area.h - h) / 2.0 + dy;
        Rect::new(x, y, w * scale, h * scale)
    }
}
