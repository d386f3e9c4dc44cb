//! # Rendering Module
//!
//! Turns a validated [`FlyerSpec`](crate::flyer::FlyerSpec) into pixels.
//!
//! ## Modules
//!
//! - [`color`]: RGBA colors and hex parsing
//! - [`canvas`]: fills, gradients, text and image layers on an RGBA buffer
//! - [`text`]: bitmap and TrueType typefaces
//! - [`wrap`]: greedy word wrap shared by measuring and drawing
//! - [`layout`]: flyer geometry computed before drawing
//! - [`image_source`]: product image loading
//! - [`engine`]: the render pipeline
//! - [`state`]: render state machine with stale-result protection
//!
//! ## Usage Example
//!
//! ```no_run
//! use encarte::catalog::Product;
//! use encarte::config::Branding;
//! use encarte::flyer::FlyerSpec;
//! use encarte::render::{Fonts, Renderer};
//! use encarte::template::TemplateId;
//!
//! let product = Product::new("1234", "Cerveja Brahma 350ml", "https://i.imgur.com/8yKzJzF.png");
//! let spec = FlyerSpec::new(product, 14.90, 9.99, TemplateId::Moderno)?;
//! let renderer = Renderer::new(Fonts::builtin(), Branding::default(), 800, 1000);
//!
//! // Without a loaded image the placeholder box is drawn.
//! let flyer = renderer.paint(&spec, None)?;
//! assert_eq!(flyer.width(), 800);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod canvas;
pub mod color;
pub mod engine;
pub mod image_source;
pub mod layout;
pub mod state;
pub mod text;
pub mod wrap;

pub use color::Color;
pub use engine::{RenderedFlyer, Renderer};
pub use image_source::{HttpImageLoader, ImageLoader, StaticImageLoader};
pub use state::{Completion, FlyerPreview, RenderStatus, RenderTicket};
pub use text::{FontSpec, Fonts};
