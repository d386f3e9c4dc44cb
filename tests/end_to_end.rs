//! Spreadsheet to exported flyer, without network access.

use encarte::{
    catalog::sample::template_csv,
    config::Branding,
    export::{self, ExportFormat},
    flyer::FlyerForm,
    render::{Fonts, Renderer, StaticImageLoader},
    template::TemplateId,
    workspace::Workspace,
};
use image::{DynamicImage, Rgba, RgbaImage};
use pretty_assertions::assert_eq;

fn renderer() -> Renderer {
    Renderer::new(Fonts::builtin(), Branding::default(), 800, 1000)
}

fn form(code: &str, original: &str, promo: &str) -> FlyerForm {
    FlyerForm {
        product_code: code.to_string(),
        original_price: original.to_string(),
        promo_price: promo.to_string(),
        ..Default::default()
    }
}

fn is_generated_name(name: &str, code: &str, ext: &str) -> bool {
    let Some(rest) = name.strip_prefix(&format!("encarte_{}_", code)) else {
        return false;
    };
    let Some(millis) = rest.strip_suffix(&format!(".{}", ext)) else {
        return false;
    };
    !millis.is_empty() && millis.chars().all(|c| c.is_ascii_digit())
}

#[tokio::test]
async fn test_example_csv_to_png() {
    let mut workspace = Workspace::new();
    assert_eq!(workspace.load_catalog(&template_csv()).unwrap(), 3);
    workspace.select_template(TemplateId::Moderno);
    let spec = workspace.submit(&form("1234", "14.90", "9.99")).unwrap();
    assert_eq!(spec.discount_percent(), 33);

    let flyer = workspace.render(&renderer(), &StaticImageLoader::new()).await.unwrap();
    assert!(!workspace.preview().is_generating());
    assert_eq!(flyer.width(), 800);
    assert!(flyer.height() >= 1000);

    let png = export::export(&flyer, ExportFormat::Png, 95).unwrap();
    assert!(!png.bytes.is_empty());
    assert!(is_generated_name(&png.filename, "1234", "png"), "{}", png.filename);

    let decoded = image::load_from_memory(&png.bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (flyer.width(), flyer.height()));
}

#[tokio::test]
async fn test_jpeg_has_no_transparency() {
    let mut workspace = Workspace::new();
    workspace.load_catalog(&template_csv()).unwrap();
    workspace.select_template(TemplateId::Branco);
    workspace.submit(&form("5678", "10,00", "7,50")).unwrap();

    // A product image with a transparent surround.
    let mut product = RgbaImage::from_pixel(100, 100, Rgba([0, 0, 0, 0]));
    for x in 40..60 {
        for y in 40..60 {
            product.put_pixel(x, y, Rgba([200, 30, 30, 255]));
        }
    }
    let loader = StaticImageLoader::new().with_image(
        "https://site.com/imagens/skol1l.jpg",
        DynamicImage::ImageRgba8(product),
    );

    let flyer = workspace.render(&renderer(), &loader).await.unwrap();
    assert!(flyer.image_loaded);

    let jpg = export::export(&flyer, ExportFormat::Jpg, 95).unwrap();
    assert!(is_generated_name(&jpg.filename, "5678", "jpg"), "{}", jpg.filename);
    let decoded = image::load_from_memory(&jpg.bytes).unwrap();
    assert!(!decoded.color().has_alpha());
}

#[tokio::test]
async fn test_every_template_renders() {
    for id in TemplateId::ALL {
        let mut workspace = Workspace::new();
        workspace.load_catalog(&template_csv()).unwrap();
        workspace.select_template(id);
        workspace
            .submit(&FlyerForm {
                additional_info: Some("Válido para pedidos acima de 10 caixas".to_string()),
                validity: Some("2026-12-31".to_string()),
                remove_background: true,
                ..form("9012", "8,49", "6,99")
            })
            .unwrap();
        let flyer = workspace.render(&renderer(), &StaticImageLoader::new()).await.unwrap();
        assert_eq!(flyer.product_code, "9012", "template {}", id);
        assert!(flyer.image.pixels().all(|p| p.0[3] == 255), "template {} left holes", id);
    }
}

#[test]
fn test_promo_not_lower_never_reaches_render() {
    let mut workspace = Workspace::new();
    workspace.load_catalog(&template_csv()).unwrap();
    workspace.select_template(TemplateId::Escuro);
    assert!(workspace.submit(&form("1234", "9,99", "9,99")).is_err());
    assert!(workspace.current().is_none());
    assert!(workspace.begin_render().is_none());
}

#[test]
fn test_tsv_with_reordered_headers() {
    let tsv = "URL da Imagem\tProduto\tCódigo\nhttp://x/a.png\tGuaraná Antarctica 2L\t777\n\n\tsem código\t";
    let mut workspace = Workspace::new();
    assert_eq!(workspace.load_catalog(tsv).unwrap(), 1);
    let product = &workspace.products()[0];
    assert_eq!(product.code, "777");
    assert_eq!(product.name, "Guaraná Antarctica 2L");
    assert_eq!(product.image_url, "http://x/a.png");
}
