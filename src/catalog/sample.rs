//! Downloadable CSV template and bundled example products.

use super::Product;

/// Header row of the CSV template.
pub const TEMPLATE_HEADER: &str = "Código,Nome do Produto,URL da Imagem";

/// Default download name for the CSV template.
pub const TEMPLATE_FILENAME: &str = "template_encartes_discar.csv";

/// Content type used when serving the CSV template.
pub const TEMPLATE_CONTENT_TYPE: &str = "text/csv;charset=utf-8";

const TEMPLATE_ROWS: &[(&str, &str, &str)] = &[
    ("1234", "Cerveja Brahma 350ml", "https://site.com/imagens/brahma350.jpg"),
    ("5678", "Skol Pilsen 1L", "https://site.com/imagens/skol1l.jpg"),
    ("9012", "Antarctica Original 600ml", "https://site.com/imagens/antarctica600.jpg"),
];

const EXAMPLE_IMAGES: &[&str] = &[
    "https://i.imgur.com/2dYJZ0D.jpg",
    "https://i.imgur.com/Gi9qBx5.jpg",
    "https://i.imgur.com/UQ0eF9B.jpg",
];

/// The CSV template: header plus three example rows, no trailing newline.
pub fn template_csv() -> String {
    let mut content = String::from(TEMPLATE_HEADER);
    for (code, name, url) in TEMPLATE_ROWS {
        content.push('\n');
        content.push_str(&format!("{},{},{}", code, name, url));
    }
    content
}

/// Example products for demos, with hosted images.
pub fn example_products() -> Vec<Product> {
    TEMPLATE_ROWS
        .iter()
        .zip(EXAMPLE_IMAGES)
        .map(|((code, name, _), url)| Product::new(*code, *name, *url))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::parse_csv;

    #[test]
    fn test_template_starts_with_header() {
        let csv = template_csv();
        assert_eq!(csv.lines().next(), Some(TEMPLATE_HEADER));
        assert_eq!(csv.lines().count(), 4);
    }

    #[test]
    fn test_template_parses_back_into_three_products() {
        let products = parse_csv(&template_csv());
        let codes: Vec<&str> = products.iter().map(|p| p.code.as_str()).collect();
        assert_eq!(codes, vec!["1234", "5678", "9012"]);
        assert_eq!(products[0].name, "Cerveja Brahma 350ml");
    }

    #[test]
    fn test_example_products_match_template_codes() {
        let examples = example_products();
        assert_eq!(examples.len(), 3);
        assert_eq!(examples[2].code, "9012");
        assert!(examples.iter().all(|p| p.image_url.starts_with("https://")));
    }
}
