//! The flyer render pipeline.
//!
//! [`Renderer::render`] awaits the product image and then hands off to
//! [`Renderer::paint`], which is synchronous and CPU-bound so servers can
//! run it on a blocking thread.

use image::{DynamicImage, RgbaImage};
use tracing::{debug, warn};

use super::canvas::{Canvas, ImagePlacement, LinearGradient, Paint, Rect, Shadow};
use super::color::Color;
use super::image_source::ImageLoader;
use super::layout::{FlyerLayout, INFO_FONT, NAME_FONT};
use super::text::{FontSpec, Fonts};
use crate::config::{Branding, RenderConfig};
use crate::error::{EncarteError, Result};
use crate::flyer::{self, FlyerSpec};
use crate::template::{self, Background, TemplateStyle};

const BANNER_FROM: Color = Color::rgb(0xEF, 0x44, 0x44);
const BANNER_TO: Color = Color::rgb(0xDC, 0x26, 0x26);
const BADGE_FILL: Color = Color::rgb(0xDC, 0x26, 0x26);
const PLACEHOLDER_FILL: Color = Color::rgb(0xF8, 0xFA, 0xFC);
const PLACEHOLDER_STROKE: Color = Color::rgb(0xE2, 0xE8, 0xF0);
const PLACEHOLDER_TEXT: Color = Color::rgb(0x64, 0x74, 0x8B);

/// A finished flyer and the product details export needs.
#[derive(Debug, Clone)]
pub struct RenderedFlyer {
    pub image: RgbaImage,
    pub product_code: String,
    pub product_name: String,
    pub promo_price: f64,
    /// False when the product image could not be loaded.
    pub image_loaded: bool,
}

impl RenderedFlyer {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Paints flyers at a fixed width with a given set of fonts and copy.
#[derive(Debug, Clone)]
pub struct Renderer {
    fonts: Fonts,
    branding: Branding,
    width: u32,
    min_height: u32,
}

impl Renderer {
    pub fn new(fonts: Fonts, branding: Branding, width: u32, min_height: u32) -> Self {
        Self {
            fonts,
            branding,
            width,
            min_height,
        }
    }

    /// Build from config, loading any configured TrueType fonts.
    pub fn from_config(config: &RenderConfig, branding: Branding) -> Result<Self> {
        let fonts = Fonts::load(config.regular_font.as_deref(), config.bold_font.as_deref())?;
        Ok(Self::new(fonts, branding, config.width, config.min_height))
    }

    pub fn fonts(&self) -> &Fonts {
        &self.fonts
    }

    pub fn branding(&self) -> &Branding {
        &self.branding
    }

    /// Geometry for `spec` at this renderer's size.
    pub fn layout(&self, spec: &FlyerSpec) -> FlyerLayout {
        FlyerLayout::compute(spec, &self.fonts, self.width, self.min_height)
    }

    /// Load the product image, then paint. A failed load draws the
    /// placeholder instead of failing the render.
    pub async fn render(&self, spec: &FlyerSpec, loader: &dyn ImageLoader) -> Result<RenderedFlyer> {
        let image = load_product_image(spec, loader).await;
        self.paint(spec, image.as_ref())
    }

    /// Draw the flyer with an already loaded product image.
    pub fn paint(&self, spec: &FlyerSpec, product_image: Option<&DynamicImage>) -> Result<RenderedFlyer> {
        let template = template::by_id(spec.template())
            .ok_or_else(|| EncarteError::UnknownTemplate(spec.template().to_string()))?;
        let style = template.style();
        let layout = self.layout(spec);
        if layout.height == 0 || layout.width == 0 {
            return Err(EncarteError::Render("empty canvas".to_string()));
        }

        let mut painter = Painter {
            canvas: Canvas::new(layout.width, layout.height),
            fonts: &self.fonts,
            branding: &self.branding,
            style,
            layout: &layout,
        };
        painter.background();
        painter.header();
        match product_image {
            Some(image) => painter.product_image(spec, image),
            None => painter.placeholder(),
        }
        painter.name();
        painter.banner();
        painter.prices(spec);
        painter.badge(spec);
        painter.info();
        painter.footer(spec);

        debug!(
            code = %spec.product().code,
            template = %spec.template(),
            width = layout.width,
            height = layout.height,
            "flyer painted"
        );

        Ok(RenderedFlyer {
            image: painter.canvas.into_image(),
            product_code: spec.product().code.clone(),
            product_name: spec.product().name.clone(),
            promo_price: spec.promo_price(),
            image_loaded: product_image.is_some(),
        })
    }
}

/// Fetch the product image, logging and swallowing failures.
pub async fn load_product_image(spec: &FlyerSpec, loader: &dyn ImageLoader) -> Option<DynamicImage> {
    let url = &spec.product().image_url;
    match loader.load(url).await {
        Ok(image) => Some(image),
        Err(e) => {
            warn!(code = %spec.product().code, url = %url, error = %e, "product image unavailable, drawing placeholder");
            None
        }
    }
}

struct Painter<'a> {
    canvas: Canvas,
    fonts: &'a Fonts,
    branding: &'a Branding,
    style: TemplateStyle,
    layout: &'a FlyerLayout,
}

impl Painter<'_> {
    fn center_x(&self) -> f32 {
        self.layout.width as f32 / 2.0
    }

    fn text(&mut self, text: &str, font: FontSpec, baseline: f32, color: Color, shadow: Option<Shadow>) {
        let cx = self.center_x();
        self.canvas
            .fill_text_centered(self.fonts, text, font, cx, baseline, color, shadow);
    }

    fn background(&mut self) {
        let (w, h) = (self.layout.width as f32, self.layout.height as f32);
        let paint = match self.style.background {
            Background::Solid(color) => Paint::Solid(color),
            Background::Diagonal { from, to } => Paint::Linear(LinearGradient::new((0.0, 0.0), (w, h), from, to)),
        };
        self.canvas.fill_rect(Rect::new(0.0, 0.0, w, h), paint);
    }

    fn header(&mut self) {
        self.canvas.fill_rect(self.layout.header, self.style.bar_fill);
        let color = self.style.bar_text;
        let distributor = self.branding.distributor.clone();
        let tagline = self.branding.tagline.clone();
        self.text(&distributor, FontSpec::bold(36.0), 45.0, color, None);
        self.text(&tagline, FontSpec::regular(18.0), 75.0, color, None);
    }

    fn product_image(&mut self, spec: &FlyerSpec, image: &DynamicImage) {
        self.canvas.fill_rect(self.layout.backdrop, self.style.image_backdrop);

        let transform = spec.image_transform();
        let rect = self.layout.image_rect(
            image.width() as f32,
            image.height() as f32,
            transform.scale,
            transform.x,
            transform.y,
        );
        let placement = ImagePlacement {
            rect,
            rotation: transform.rotation,
            clip_circle: spec.remove_background(),
        };
        let shadow = Shadow::new(Color::rgba(0, 0, 0, 0.3), 20.0, 10.0);
        self.canvas.draw_image(image, placement, Some(shadow));
    }

    fn placeholder(&mut self) {
        let rect = self.layout.placeholder;
        self.canvas.fill_rect(rect, PLACEHOLDER_FILL);
        self.canvas.stroke_rect(rect, 2.0, PLACEHOLDER_STROKE);
        let font = FontSpec::bold(24.0);
        self.text("Imagem não", font, rect.y + 140.0, PLACEHOLDER_TEXT, None);
        self.text("disponível", font, rect.y + 170.0, PLACEHOLDER_TEXT, None);
    }

    fn name(&mut self) {
        let color = self.style.name_text;
        for (baseline, line) in self.layout.name.baselines() {
            self.canvas.fill_text_centered(
                self.fonts,
                line,
                NAME_FONT,
                self.layout.width as f32 / 2.0,
                baseline,
                color,
                None,
            );
        }
    }

    fn banner(&mut self) {
        let banner = self.layout.banner;
        let w = self.layout.width as f32;
        let gradient = LinearGradient::new((0.0, banner.y), (w, banner.bottom()), BANNER_FROM, BANNER_TO);
        self.canvas.fill_rect(banner, Paint::Linear(gradient));

        let shadow = Shadow::new(Color::rgba(0, 0, 0, 0.3), 15.0, 5.0);
        let text = self.branding.offer_banner.clone();
        self.text(&text, FontSpec::bold(36.0), banner.y + 50.0, Color::WHITE, Some(shadow));
    }

    fn prices(&mut self, spec: &FlyerSpec) {
        let original = format!("DE R$ {}", flyer::format_price(spec.original_price()));
        let font = FontSpec::regular(28.0);
        let baseline = self.layout.original_baseline;
        let muted = self.style.muted_text;
        self.text(&original, font, baseline, muted, None);

        let text_width = self.fonts.measure(&original, font);
        let cx = self.center_x();
        self.canvas
            .hline(cx - text_width / 2.0, cx + text_width / 2.0, baseline - 10.0, 4.0, muted);

        self.canvas.fill_rect(self.layout.promo_panel, self.style.promo_fill);
        let promo = format!("R$ {}", flyer::format_price(spec.promo_price()));
        let color = self.style.promo_text;
        self.text(&promo, FontSpec::bold(56.0), self.layout.promo_baseline, color, None);
    }

    fn badge(&mut self, spec: &FlyerSpec) {
        let (cx, cy, radius) = self.layout.badge;
        self.canvas.fill_circle(cx, cy, radius, BADGE_FILL);

        let shadow = Shadow::new(Color::rgba(0, 0, 0, 0.4), 10.0, 5.0);
        let text = format!("-{}%", spec.discount_percent());
        self.canvas
            .fill_text_centered(self.fonts, &text, FontSpec::bold(28.0), cx, cy + 10.0, Color::WHITE, Some(shadow));
    }

    fn info(&mut self) {
        let Some(info) = &self.layout.info else {
            return;
        };
        self.canvas.fill_rect(info.panel, self.style.info_fill);
        let color = self.style.info_text;
        let cx = self.center_x();
        for (baseline, line) in info.text.baselines() {
            self.canvas
                .fill_text_centered(self.fonts, line, INFO_FONT, cx, baseline, color, None);
        }
    }

    fn footer(&mut self, spec: &FlyerSpec) {
        let footer = self.layout.footer;
        self.canvas.fill_rect(footer, self.style.bar_fill);

        let validity = match spec.validity() {
            Some(validity) => format!("Válido até {}", flyer::format_validity(validity)),
            None => "Válido enquanto durarem os estoques".to_string(),
        };
        let color = self.style.bar_text;
        let partner = self.branding.partner_line.clone();
        let website = self.branding.website.clone();
        self.text(&validity, FontSpec::bold(20.0), footer.y + 35.0, color, None);
        self.text(&partner, FontSpec::regular(16.0), footer.y + 65.0, color, None);
        self.text(&website, FontSpec::regular(16.0), footer.y + 90.0, color, None);
    }
}
