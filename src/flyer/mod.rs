//! # Flyer Input
//!
//! A [`FlyerForm`] holds raw user input. [`FlyerForm::submit`] validates it
//! against the loaded catalog and the selected template and produces an
//! immutable [`FlyerSpec`], the single input of a render pass.
//!
//! The one hard invariant lives here: a spec only exists when the promo
//! price is strictly lower than the original price.

pub mod transform;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::{self, Product};
use crate::error::ValidationError;
use crate::template::TemplateId;

pub use transform::ImageTransform;

/// Everything one render pass consumes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlyerSpec {
    product: Product,
    original_price: f64,
    promo_price: f64,
    template: TemplateId,
    additional_info: Option<String>,
    validity: Option<String>,
    remove_background: bool,
    image_transform: Option<ImageTransform>,
}

impl FlyerSpec {
    /// Build a spec, enforcing price validity and `promo < original`.
    pub fn new(
        product: Product,
        original_price: f64,
        promo_price: f64,
        template: TemplateId,
    ) -> Result<Self, ValidationError> {
        check_price(original_price)?;
        check_price(promo_price)?;
        if promo_price >= original_price {
            return Err(ValidationError::PromoNotLower);
        }

        Ok(Self {
            product,
            original_price,
            promo_price,
            template,
            additional_info: None,
            validity: None,
            remove_background: false,
            image_transform: None,
        })
    }

    /// Extra text under the price. Blank text is dropped.
    pub fn with_additional_info(mut self, info: impl Into<String>) -> Self {
        self.additional_info = non_blank(Some(info.into()));
        self
    }

    /// Validity date shown in the footer. Blank text is dropped.
    pub fn with_validity(mut self, validity: impl Into<String>) -> Self {
        self.validity = non_blank(Some(validity.into()));
        self
    }

    pub fn with_remove_background(mut self, remove: bool) -> Self {
        self.remove_background = remove;
        self
    }

    /// Out-of-range values are sanitized on the way in.
    pub fn with_image_transform(mut self, transform: ImageTransform) -> Self {
        self.image_transform = Some(transform.sanitized());
        self
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn original_price(&self) -> f64 {
        self.original_price
    }

    pub fn promo_price(&self) -> f64 {
        self.promo_price
    }

    pub fn template(&self) -> TemplateId {
        self.template
    }

    pub fn additional_info(&self) -> Option<&str> {
        self.additional_info.as_deref()
    }

    pub fn validity(&self) -> Option<&str> {
        self.validity.as_deref()
    }

    pub fn remove_background(&self) -> bool {
        self.remove_background
    }

    /// The user's transform, or the identity transform.
    pub fn image_transform(&self) -> ImageTransform {
        self.image_transform.unwrap_or_default()
    }

    /// Whole-number discount shown on the badge.
    pub fn discount_percent(&self) -> i64 {
        discount_percent(self.original_price, self.promo_price)
    }
}

/// Raw form input, as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FlyerForm {
    pub product_code: String,
    /// Accepts `14,90` or `14.90`.
    pub original_price: String,
    pub promo_price: String,
    #[serde(default)]
    pub additional_info: Option<String>,
    #[serde(default)]
    pub validity: Option<String>,
    #[serde(default)]
    pub remove_background: bool,
    #[serde(default)]
    pub image_transform: Option<ImageTransform>,
}

impl FlyerForm {
    /// Validate the form and build a spec.
    ///
    /// Checks run in the order the user sees them: catalog and template
    /// first, then required fields, then price parsing, then the
    /// promo-below-original rule.
    pub fn submit(
        &self,
        products: &[Product],
        template: Option<TemplateId>,
    ) -> Result<FlyerSpec, ValidationError> {
        if products.is_empty() {
            return Err(ValidationError::NoProducts);
        }
        let template = template.ok_or(ValidationError::NoTemplate)?;

        let code = self.product_code.trim();
        if code.is_empty() {
            return Err(ValidationError::MissingField("product_code"));
        }
        let product = catalog::find_by_code(products, code)
            .ok_or_else(|| ValidationError::UnknownProduct(code.to_string()))?;
        if self.original_price.trim().is_empty() {
            return Err(ValidationError::MissingField("original_price"));
        }
        if self.promo_price.trim().is_empty() {
            return Err(ValidationError::MissingField("promo_price"));
        }

        let original = parse_price(&self.original_price)?;
        let promo = parse_price(&self.promo_price)?;

        let mut spec = FlyerSpec::new(product.clone(), original, promo, template)?
            .with_remove_background(self.remove_background);
        if let Some(info) = &self.additional_info {
            spec = spec.with_additional_info(info.clone());
        }
        if let Some(validity) = &self.validity {
            spec = spec.with_validity(validity.clone());
        }
        if let Some(transform) = self.image_transform {
            spec = spec.with_image_transform(transform);
        }
        Ok(spec)
    }
}

/// Parse a price typed with either decimal separator.
pub fn parse_price(input: &str) -> Result<f64, ValidationError> {
    let normalized = input.trim().replace(',', ".");
    let value: f64 = normalized
        .parse()
        .map_err(|_| ValidationError::InvalidPrice(input.to_string()))?;
    check_price(value).map_err(|_| ValidationError::InvalidPrice(input.to_string()))?;
    Ok(value)
}

fn check_price(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidPrice(value.to_string()))
    }
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}

/// `round(100 * (original - promo) / original)`.
pub fn discount_percent(original: f64, promo: f64) -> i64 {
    if original <= 0.0 {
        return 0;
    }
    (((original - promo) / original) * 100.0).round() as i64
}

/// Two decimals with a comma separator, e.g. `9,99`.
pub fn format_price(value: f64) -> String {
    format!("{:.2}", value).replace('.', ",")
}

/// Footer validity text. ISO dates are shown as `DD/MM/YYYY`.
pub fn format_validity(validity: &str) -> String {
    let validity = validity.trim();
    match NaiveDate::parse_from_str(validity, "%Y-%m-%d") {
        Ok(date) => date.format("%d/%m/%Y").to_string(),
        Err(_) => validity.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::sample::example_products;

    fn form(original: &str, promo: &str) -> FlyerForm {
        FlyerForm {
            product_code: "1234".to_string(),
            original_price: original.to_string(),
            promo_price: promo.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_discount_documented_value() {
        assert_eq!(discount_percent(14.90, 9.99), 33);
    }

    #[test]
    fn test_discount_representative_values() {
        assert_eq!(discount_percent(10.0, 5.0), 50);
        assert_eq!(discount_percent(3.0, 2.0), 33);
        assert_eq!(discount_percent(8.0, 7.0), 13);
        assert_eq!(discount_percent(0.0, 1.0), 0);
    }

    #[test]
    fn test_parse_price_accepts_both_separators() {
        assert_eq!(parse_price("14,90").unwrap(), 14.90);
        assert_eq!(parse_price(" 9.99 ").unwrap(), 9.99);
    }

    #[test]
    fn test_parse_price_rejects_garbage() {
        assert!(matches!(parse_price("abc"), Err(ValidationError::InvalidPrice(_))));
        assert!(matches!(parse_price("-1"), Err(ValidationError::InvalidPrice(_))));
        assert!(matches!(parse_price("NaN"), Err(ValidationError::InvalidPrice(_))));
    }

    #[test]
    fn test_submit_builds_spec() {
        let products = example_products();
        let spec = form("14,90", "9,99")
            .submit(&products, Some(TemplateId::Moderno))
            .unwrap();
        assert_eq!(spec.product().code, "1234");
        assert_eq!(spec.template(), TemplateId::Moderno);
        assert_eq!(spec.discount_percent(), 33);
        assert_eq!(spec.additional_info(), None);
        assert_eq!(spec.image_transform(), ImageTransform::default());
    }

    #[test]
    fn test_submit_rejects_promo_not_lower() {
        let products = example_products();
        let equal = form("9,99", "9,99").submit(&products, Some(TemplateId::Moderno));
        assert_eq!(equal, Err(ValidationError::PromoNotLower));
        let higher = form("9,99", "14,90").submit(&products, Some(TemplateId::Moderno));
        assert_eq!(higher, Err(ValidationError::PromoNotLower));
    }

    #[test]
    fn test_spec_new_enforces_invariant() {
        let product = example_products().remove(0);
        assert_eq!(
            FlyerSpec::new(product, 5.0, 6.0, TemplateId::Branco),
            Err(ValidationError::PromoNotLower)
        );
    }

    #[test]
    fn test_builder_sanitizes_transform() {
        let product = example_products().remove(0);
        let spec = FlyerSpec::new(product, 10.0, 8.0, TemplateId::Moderno)
            .unwrap()
            .with_image_transform(ImageTransform {
                scale: f32::INFINITY,
                x: 12.0,
                y: f32::NAN,
                rotation: 90.0,
            });
        let t = spec.image_transform();
        assert_eq!(t.scale, 1.0);
        assert_eq!(t.x, 12.0);
        assert_eq!(t.y, 0.0);
        assert_eq!(t.rotation, 90.0);

        let huge = spec.with_image_transform(ImageTransform {
            scale: 1e9,
            ..Default::default()
        });
        assert_eq!(huge.image_transform().scale, transform::MAX_SCALE);
    }

    #[test]
    fn test_submit_requires_template_and_products() {
        let products = example_products();
        assert_eq!(form("2", "1").submit(&[], Some(TemplateId::Moderno)), Err(ValidationError::NoProducts));
        assert_eq!(form("2", "1").submit(&products, None), Err(ValidationError::NoTemplate));
    }

    #[test]
    fn test_submit_requires_fields() {
        let products = example_products();
        let mut missing = form("", "1");
        assert_eq!(
            missing.submit(&products, Some(TemplateId::Moderno)),
            Err(ValidationError::MissingField("original_price"))
        );
        missing = form("2", "1");
        missing.product_code = "  0000 ".to_string();
        assert_eq!(
            missing.submit(&products, Some(TemplateId::Moderno)),
            Err(ValidationError::UnknownProduct("0000".to_string()))
        );
    }

    #[test]
    fn test_blank_optional_fields_are_dropped() {
        let products = example_products();
        let mut f = form("2", "1");
        f.additional_info = Some("   ".to_string());
        f.validity = Some("".to_string());
        let spec = f.submit(&products, Some(TemplateId::Escuro)).unwrap();
        assert_eq!(spec.additional_info(), None);
        assert_eq!(spec.validity(), None);
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(9.99), "9,99");
        assert_eq!(format_price(14.9), "14,90");
    }

    #[test]
    fn test_format_validity() {
        assert_eq!(format_validity("2026-12-31"), "31/12/2026");
        assert_eq!(format_validity("31/12"), "31/12");
    }
}
