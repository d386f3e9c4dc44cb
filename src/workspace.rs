//! # Workspace
//!
//! Everything one user is working on: the loaded catalog, the chosen
//! template, the last submitted flyer and its preview. Loading a new
//! spreadsheet or picking another template discards the current flyer.

use std::sync::Arc;
use tracing::info;

use crate::catalog::{self, Product};
use crate::error::{EncarteError, Result};
use crate::flyer::{FlyerForm, FlyerSpec};
use crate::render::{Completion, FlyerPreview, ImageLoader, RenderTicket, RenderedFlyer, Renderer};
use crate::template::TemplateId;

#[derive(Debug, Default)]
pub struct Workspace {
    products: Vec<Product>,
    template: Option<TemplateId>,
    current: Option<FlyerSpec>,
    preview: FlyerPreview,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn template(&self) -> Option<TemplateId> {
        self.template
    }

    /// The last successfully submitted flyer.
    pub fn current(&self) -> Option<&FlyerSpec> {
        self.current.as_ref()
    }

    pub fn preview(&self) -> &FlyerPreview {
        &self.preview
    }

    pub fn search(&self, query: &str) -> Vec<&Product> {
        catalog::search(&self.products, query)
    }

    /// Replace the catalog with the products parsed from `text`.
    ///
    /// An empty parse leaves the workspace untouched.
    pub fn load_catalog(&mut self, text: &str) -> Result<usize> {
        let products = catalog::parse_csv(text);
        self.replace_products(products)
    }

    /// Like [`Workspace::load_catalog`], from an uploaded file.
    pub fn load_upload(&mut self, filename: &str, bytes: &[u8]) -> Result<usize> {
        let products = catalog::upload::load_upload(filename, bytes)?;
        self.replace_products(products)
    }

    fn replace_products(&mut self, products: Vec<Product>) -> Result<usize> {
        if products.is_empty() {
            return Err(EncarteError::NoProducts);
        }
        let count = products.len();
        self.products = products;
        self.clear_flyer();
        info!(count, "catalog loaded");
        Ok(count)
    }

    /// Forget the catalog and the current flyer.
    pub fn reset_catalog(&mut self) {
        self.products.clear();
        self.clear_flyer();
    }

    pub fn select_template(&mut self, id: TemplateId) {
        self.template = Some(id);
        self.clear_flyer();
    }

    /// Validate the form against the catalog and template and keep the spec.
    pub fn submit(&mut self, form: &FlyerForm) -> Result<FlyerSpec> {
        let spec = form.submit(&self.products, self.template)?;
        info!(code = %spec.product().code, template = %spec.template(), "flyer submitted");
        self.current = Some(spec.clone());
        Ok(spec)
    }

    /// Start rendering the current flyer.
    pub fn begin_render(&mut self) -> Option<(RenderTicket, FlyerSpec)> {
        let spec = self.current.clone()?;
        Some((self.preview.begin(), spec))
    }

    pub fn complete_render(&mut self, ticket: RenderTicket, result: Result<RenderedFlyer>) -> Completion {
        self.preview.complete(ticket, result)
    }

    /// Render the current flyer in place, for callers that own the
    /// workspace exclusively.
    pub async fn render(&mut self, renderer: &Renderer, loader: &dyn ImageLoader) -> Result<Arc<RenderedFlyer>> {
        let (ticket, spec) = self
            .begin_render()
            .ok_or_else(|| EncarteError::Render("no flyer submitted".to_string()))?;
        let result = renderer.render(&spec, loader).await;
        self.complete_render(ticket, result);

        match self.preview.flyer() {
            Some(flyer) => Ok(flyer),
            None => Err(EncarteError::Render(
                self.preview.error().unwrap_or("render did not complete").to_string(),
            )),
        }
    }

    fn clear_flyer(&mut self) {
        self.current = None;
        self.preview.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::sample::template_csv;
    use crate::config::Branding;
    use crate::error::ValidationError;
    use crate::render::{Fonts, StaticImageLoader};

    fn form() -> FlyerForm {
        FlyerForm {
            product_code: "1234".to_string(),
            original_price: "14,90".to_string(),
            promo_price: "9,99".to_string(),
            ..Default::default()
        }
    }

    fn loaded() -> Workspace {
        let mut ws = Workspace::new();
        ws.load_catalog(&template_csv()).unwrap();
        ws
    }

    #[test]
    fn test_empty_catalog_keeps_state() {
        let mut ws = loaded();
        let err = ws.load_catalog("Código,Nome\n,,").unwrap_err();
        assert!(matches!(err, EncarteError::NoProducts));
        assert_eq!(ws.products().len(), 3);
    }

    #[test]
    fn test_submit_requires_template() {
        let mut ws = loaded();
        let err = ws.submit(&form()).unwrap_err();
        assert!(matches!(err, EncarteError::Validation(ValidationError::NoTemplate)));
        assert!(ws.current().is_none());
    }

    #[test]
    fn test_select_template_clears_flyer() {
        let mut ws = loaded();
        ws.select_template(TemplateId::Moderno);
        ws.submit(&form()).unwrap();
        assert!(ws.current().is_some());
        ws.select_template(TemplateId::Escuro);
        assert!(ws.current().is_none());
        assert_eq!(ws.template(), Some(TemplateId::Escuro));
    }

    #[test]
    fn test_reload_clears_flyer() {
        let mut ws = loaded();
        ws.select_template(TemplateId::Moderno);
        ws.submit(&form()).unwrap();
        ws.load_catalog(&template_csv()).unwrap();
        assert!(ws.current().is_none());
        ws.reset_catalog();
        assert!(ws.products().is_empty());
    }

    #[test]
    fn test_search() {
        let ws = loaded();
        assert_eq!(ws.search("skol").len(), 1);
        assert_eq!(ws.search("").len(), 3);
    }

    #[tokio::test]
    async fn test_render_stores_preview() {
        let mut ws = loaded();
        ws.select_template(TemplateId::Moderno);
        ws.submit(&form()).unwrap();
        let renderer = Renderer::new(Fonts::builtin(), Branding::default(), 800, 1000);
        let flyer = ws.render(&renderer, &StaticImageLoader::new()).await.unwrap();
        assert_eq!(flyer.product_code, "1234");
        assert!(!ws.preview().is_generating());
    }

    #[tokio::test]
    async fn test_render_without_submission_fails() {
        let mut ws = loaded();
        let renderer = Renderer::new(Fonts::builtin(), Branding::default(), 800, 1000);
        assert!(ws.render(&renderer, &StaticImageLoader::new()).await.is_err());
    }
}
