//! Application configuration.
//!
//! Loaded from an optional JSON file. Every field has a default, so an
//! empty object (or no file at all) yields a working setup.
//!
//! ```json
//! {
//!   "render": { "width": 1080, "jpeg_quality": 90 },
//!   "server": { "listen_addr": "127.0.0.1:3000" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{EncarteError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub render: RenderConfig,
    pub branding: Branding,
    pub server: ServerConfig,
}

impl AppConfig {
    /// Read and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| EncarteError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: AppConfig =
            serde_json::from_str(text).map_err(|e| EncarteError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// `path` if given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let r = &self.render;
        if r.width < 200 {
            return Err(EncarteError::Config(format!(
                "render.width must be at least 200, got {}",
                r.width
            )));
        }
        if r.min_height == 0 {
            return Err(EncarteError::Config("render.min_height must be positive".into()));
        }
        if !(1..=100).contains(&r.jpeg_quality) {
            return Err(EncarteError::Config(format!(
                "render.jpeg_quality must be within 1..=100, got {}",
                r.jpeg_quality
            )));
        }
        if r.image_timeout_secs == 0 {
            return Err(EncarteError::Config("render.image_timeout_secs must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height floor; content may push it further.
    pub min_height: u32,
    pub jpeg_quality: u8,
    pub image_timeout_secs: u64,
    /// Decoded product images kept in memory.
    pub image_cache_entries: usize,
    pub regular_font: Option<PathBuf>,
    pub bold_font: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800,
            min_height: 1000,
            jpeg_quality: 95,
            image_timeout_secs: 20,
            image_cache_entries: crate::render::image_source::DEFAULT_CACHE_LIMIT,
            regular_font: None,
            bold_font: None,
        }
    }
}

impl RenderConfig {
    pub fn image_timeout(&self) -> Duration {
        Duration::from_secs(self.image_timeout_secs)
    }
}

/// Fixed copy printed on every flyer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Branding {
    pub distributor: String,
    pub tagline: String,
    pub offer_banner: String,
    pub partner_line: String,
    pub website: String,
    pub share_title: String,
    pub csv_template_filename: String,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            distributor: "DISCAR DISTRIBUIDORA".to_string(),
            tagline: "Produtos Ambev - Qualidade Garantida".to_string(),
            offer_banner: "OFERTA IMPERDÍVEL!".to_string(),
            partner_line: "Discar Distribuidora - Parceira oficial Ambev".to_string(),
            website: "www.discardistribuidora.com.br".to_string(),
            share_title: "Encarte Promocional Discar".to_string(),
            csv_template_filename: crate::catalog::sample::TEMPLATE_FILENAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
    /// Idle workspaces are dropped after this many seconds.
    pub workspace_ttl_secs: u64,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            workspace_ttl_secs: 3600,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(AppConfig::from_json("{}").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = AppConfig::from_json(r#"{"render": {"width": 1080}, "server": {"listen_addr": "127.0.0.1:3000"}}"#)
            .unwrap();
        assert_eq!(config.render.width, 1080);
        assert_eq!(config.render.min_height, 1000);
        assert_eq!(config.server.listen_addr, "127.0.0.1:3000");
        assert_eq!(config.server.workspace_ttl_secs, 3600);
    }

    #[test]
    fn test_rejects_bad_quality() {
        let err = AppConfig::from_json(r#"{"render": {"jpeg_quality": 0}}"#).unwrap_err();
        assert!(matches!(err, EncarteError::Config(_)));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(AppConfig::from_json("{"), Err(EncarteError::Config(_))));
    }

    #[test]
    fn test_default_branding() {
        let branding = Branding::default();
        assert_eq!(branding.offer_banner, "OFERTA IMPERDÍVEL!");
        assert_eq!(branding.csv_template_filename, "template_encartes_discar.csv");
    }
}
