//! # Encarte - Promotional Flyer Generator
//!
//! Encarte turns a product spreadsheet into promotional flyers for a
//! beverage distributor. It provides:
//!
//! - **Catalog ingestion**: tolerant CSV/TSV parsing of product rows
//! - **Templates**: six visual themes resolved to drawing styles
//! - **Rendering**: a dynamically sized RGBA flyer with prices, discount
//!   badge and product image
//! - **Export**: PNG/JPEG downloads and share payloads
//! - **Server**: an HTTP API with per-workspace state
//!
//! ## Quick Start
//!
//! ```no_run
//! use encarte::{
//!     catalog::sample::template_csv,
//!     config::AppConfig,
//!     export::{self, ExportFormat},
//!     flyer::FlyerForm,
//!     render::{HttpImageLoader, Renderer},
//!     template::TemplateId,
//!     workspace::Workspace,
//! };
//!
//! # async fn example() -> Result<(), encarte::EncarteError> {
//! let config = AppConfig::default();
//! let renderer = Renderer::from_config(&config.render, config.branding.clone())?;
//! let loader = HttpImageLoader::new(config.render.image_timeout())?;
//!
//! let mut workspace = Workspace::new();
//! workspace.load_catalog(&template_csv())?;
//! workspace.select_template(TemplateId::Moderno);
//! workspace.submit(&FlyerForm {
//!     product_code: "1234".into(),
//!     original_price: "14,90".into(),
//!     promo_price: "9,99".into(),
//!     ..Default::default()
//! })?;
//!
//! let flyer = workspace.render(&renderer, &loader).await?;
//! let file = export::export(&flyer, ExportFormat::Png, config.render.jpeg_quality)?;
//! file.save_to(std::path::Path::new("."))?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`catalog`] | Products, CSV parsing, upload acceptance |
//! | [`template`] | Template registry and styles |
//! | [`flyer`] | Form validation, flyer spec, image transform |
//! | [`render`] | Canvas, typefaces, layout, render pipeline |
//! | [`export`] | PNG/JPEG encoding and sharing |
//! | [`workspace`] | Per-user working state |
//! | [`server`] | HTTP API |
//! | [`config`] | JSON configuration |
//! | [`error`] | Error types |

pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod flyer;
pub mod logging;
pub mod render;
pub mod server;
pub mod template;
pub mod workspace;

// Re-exports for convenience
pub use catalog::Product;
pub use error::{EncarteError, ValidationError};
pub use flyer::{FlyerForm, FlyerSpec};
pub use template::TemplateId;
pub use workspace::Workspace;
