//! # Export and Share
//!
//! Encodes a [`RenderedFlyer`] as PNG or JPEG, names the download, and
//! hands the PNG to a [`ShareTarget`] when one exists. Sharing never
//! strands the user: without a target, or when the target fails, the
//! outcome carries a regular PNG download instead.

use image::{ImageEncoder, Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

use crate::config::Branding;
use crate::error::{EncarteError, Result};
use crate::flyer::format_price;
use crate::render::RenderedFlyer;

/// File name handed to share targets.
pub const SHARE_FILENAME: &str = "encarte.png";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    #[serde(alias = "jpeg")]
    Jpg,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpg => "jpg",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpg => "image/jpeg",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = EncarteError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpg" | "jpeg" => Ok(ExportFormat::Jpg),
            other => Err(EncarteError::Export(format!("Unsupported format '{}'", other))),
        }
    }
}

/// An encoded flyer ready to be written or sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportedFile {
    /// Write into `dir` under the generated file name.
    pub fn save_to(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// `encarte_<code>_<unix millis>.<ext>`
pub fn export_filename(product_code: &str, format: ExportFormat, unix_millis: i64) -> String {
    format!("encarte_{}_{}.{}", product_code, unix_millis, format.extension())
}

/// Lossless PNG of the canvas, alpha included.
pub fn encode_png(flyer: &RenderedFlyer) -> Result<Vec<u8>> {
    let mut png_bytes = Vec::new();
    image::codecs::png::PngEncoder::new(&mut png_bytes)
        .write_image(
            flyer.image.as_raw(),
            flyer.width(),
            flyer.height(),
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| EncarteError::Export(e.to_string()))?;
    Ok(png_bytes)
}

/// JPEG of the canvas composited onto white.
pub fn encode_jpeg(flyer: &RenderedFlyer, quality: u8) -> Result<Vec<u8>> {
    let flat = flatten_onto_white(flyer);
    let mut jpg_bytes = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpg_bytes, quality.clamp(1, 100))
        .write_image(flat.as_raw(), flat.width(), flat.height(), image::ExtendedColorType::Rgb8)
        .map_err(|e| EncarteError::Export(e.to_string()))?;
    Ok(jpg_bytes)
}

fn flatten_onto_white(flyer: &RenderedFlyer) -> RgbImage {
    let mut out = RgbImage::new(flyer.width(), flyer.height());
    for (x, y, px) in flyer.image.enumerate_pixels() {
        let [r, g, b, a] = px.0;
        let alpha = a as u32;
        let over = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        out.put_pixel(x, y, Rgb([over(r), over(g), over(b)]));
    }
    out
}

/// Encode and name a download.
pub fn export(flyer: &RenderedFlyer, format: ExportFormat, jpeg_quality: u8) -> Result<ExportedFile> {
    let bytes = match format {
        ExportFormat::Png => encode_png(flyer)?,
        ExportFormat::Jpg => encode_jpeg(flyer, jpeg_quality)?,
    };
    let filename = export_filename(&flyer.product_code, format, chrono::Utc::now().timestamp_millis());
    info!(filename = %filename, bytes = bytes.len(), "flyer exported");
    Ok(ExportedFile {
        filename,
        content_type: format.content_type(),
        bytes,
    })
}

/// What a share target receives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharePayload {
    pub title: String,
    pub text: String,
    pub filename: String,
    pub content_type: &'static str,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl SharePayload {
    /// Title and message for a flyer, without encoding the image.
    pub fn describe(flyer: &RenderedFlyer, branding: &Branding) -> Self {
        Self {
            title: branding.share_title.clone(),
            text: share_text(&flyer.product_name, flyer.promo_price),
            filename: SHARE_FILENAME.to_string(),
            content_type: ExportFormat::Png.content_type(),
            bytes: Vec::new(),
        }
    }

    pub fn build(flyer: &RenderedFlyer, branding: &Branding) -> Result<Self> {
        Ok(Self {
            bytes: encode_png(flyer)?,
            ..Self::describe(flyer, branding)
        })
    }
}

/// `Confira esta oferta: <name> por apenas R$ <promo>!`
pub fn share_text(product_name: &str, promo_price: f64) -> String {
    format!(
        "Confira esta oferta: {} por apenas R$ {}!",
        product_name,
        format_price(promo_price)
    )
}

/// Something that can receive a shared flyer, such as an OS share sheet
/// or an outbox directory.
pub trait ShareTarget: Send + Sync {
    fn share(&self, payload: &SharePayload) -> Result<()>;
}

/// Writes shared flyers and their message into a directory.
#[derive(Debug, Clone)]
pub struct OutboxShare {
    dir: PathBuf,
}

impl OutboxShare {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ShareTarget for OutboxShare {
    fn share(&self, payload: &SharePayload) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.dir.join(&payload.filename), &payload.bytes)?;
        std::fs::write(
            self.dir.join("encarte.txt"),
            format!("{}\n\n{}\n", payload.title, payload.text),
        )?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    /// Sharing was unavailable or failed; the caller should offer this file.
    Downloaded { file: ExportedFile, reason: String },
}

/// Share the flyer as PNG, falling back to a PNG download.
pub fn share(flyer: &RenderedFlyer, branding: &Branding, target: Option<&dyn ShareTarget>) -> Result<ShareOutcome> {
    let payload = SharePayload::build(flyer, branding)?;

    let reason = match target {
        Some(target) => match target.share(&payload) {
            Ok(()) => {
                info!(code = %flyer.product_code, "flyer shared");
                return Ok(ShareOutcome::Shared);
            }
            Err(e) => {
                warn!(error = %e, "share failed, falling back to download");
                e.to_string()
            }
        },
        None => "Compartilhamento não disponível".to_string(),
    };

    let filename = export_filename(&flyer.product_code, ExportFormat::Png, chrono::Utc::now().timestamp_millis());
    Ok(ShareOutcome::Downloaded {
        file: ExportedFile {
            filename,
            content_type: ExportFormat::Png.content_type(),
            bytes: payload.bytes,
        },
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::sync::Mutex;

    fn flyer() -> RenderedFlyer {
        let mut image = RgbaImage::from_pixel(16, 16, Rgba([0, 0, 0, 0]));
        image.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        RenderedFlyer {
            image,
            product_code: "1234".to_string(),
            product_name: "Cerveja Brahma 350ml".to_string(),
            promo_price: 9.99,
            image_loaded: true,
        }
    }

    struct Recorder(Mutex<Vec<SharePayload>>);

    impl ShareTarget for Recorder {
        fn share(&self, payload: &SharePayload) -> Result<()> {
            self.0.lock().unwrap().push(payload.clone());
            Ok(())
        }
    }

    struct Broken;

    impl ShareTarget for Broken {
        fn share(&self, _: &SharePayload) -> Result<()> {
            Err(EncarteError::Export("AbortError".into()))
        }
    }

    #[test]
    fn test_filename_shape() {
        assert_eq!(export_filename("1234", ExportFormat::Png, 1700000000000), "encarte_1234_1700000000000.png");
        assert_eq!(export_filename("9012", ExportFormat::Jpg, 5), "encarte_9012_5.jpg");
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("PNG".parse::<ExportFormat>().unwrap(), ExportFormat::Png);
        assert_eq!("jpeg".parse::<ExportFormat>().unwrap(), ExportFormat::Jpg);
        assert!("gif".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_png_keeps_alpha() {
        let bytes = encode_png(&flyer()).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(decoded.get_pixel(3, 3).0[3], 0);
    }

    #[test]
    fn test_jpeg_composites_onto_white() {
        let bytes = encode_jpeg(&flyer(), 95).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert!(!decoded.color().has_alpha());
        let px = decoded.to_rgb8().get_pixel(12, 12).0;
        assert!(px.iter().all(|&c| c > 240), "transparent area should be white, got {:?}", px);
    }

    #[test]
    fn test_export_names_file() {
        let file = export(&flyer(), ExportFormat::Jpg, 95).unwrap();
        assert!(file.filename.starts_with("encarte_1234_"));
        assert!(file.filename.ends_with(".jpg"));
        assert_eq!(file.content_type, "image/jpeg");
        assert!(!file.bytes.is_empty());
    }

    #[test]
    fn test_share_text() {
        assert_eq!(
            share_text("Cerveja Brahma 350ml", 9.99),
            "Confira esta oferta: Cerveja Brahma 350ml por apenas R$ 9,99!"
        );
    }

    #[test]
    fn test_share_hands_payload_to_target() {
        let recorder = Recorder(Mutex::new(Vec::new()));
        let outcome = share(&flyer(), &Branding::default(), Some(&recorder)).unwrap();
        assert_eq!(outcome, ShareOutcome::Shared);
        let shared = recorder.0.lock().unwrap();
        assert_eq!(shared[0].title, "Encarte Promocional Discar");
        assert_eq!(shared[0].filename, "encarte.png");
        assert!(!shared[0].bytes.is_empty());
    }

    #[test]
    fn test_share_without_target_downloads() {
        match share(&flyer(), &Branding::default(), None).unwrap() {
            ShareOutcome::Downloaded { file, .. } => {
                assert!(file.filename.ends_with(".png"));
                assert_eq!(file.content_type, "image/png");
            }
            other => panic!("expected download, got {:?}", other),
        }
    }

    #[test]
    fn test_share_failure_downloads_with_reason() {
        match share(&flyer(), &Branding::default(), Some(&Broken)).unwrap() {
            ShareOutcome::Downloaded { reason, .. } => assert!(reason.contains("AbortError")),
            other => panic!("expected download, got {:?}", other),
        }
    }

    #[test]
    fn test_outbox_writes_files() {
        let dir = std::env::temp_dir().join(format!("encarte-outbox-{}", std::process::id()));
        let outcome = share(&flyer(), &Branding::default(), Some(&OutboxShare::new(&dir))).unwrap();
        assert_eq!(outcome, ShareOutcome::Shared);
        assert!(dir.join("encarte.png").exists());
        let message = std::fs::read_to_string(dir.join("encarte.txt")).unwrap();
        assert!(message.contains("R$ 9,99"));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
