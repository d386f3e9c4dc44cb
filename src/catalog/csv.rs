//! Spreadsheet text parsing.
//!
//! Accepts comma- or tab-separated text with a header row. Header names are
//! only used to locate columns; rows are matched positionally (0/1/2) when a
//! column's header isn't recognised. Quoting is not interpreted.

use tracing::debug;

use super::Product;

/// Accepted header spellings for the product code column.
const CODE_HEADERS: &[&str] = &["codigo", "código", "cod", "code"];

/// Accepted header spellings for the product name column.
const NAME_HEADERS: &[&str] = &["nome", "produto", "nome do produto", "product", "descrição"];

/// Accepted header spellings for the image URL column.
const URL_HEADERS: &[&str] = &[
    "urlimagem",
    "url",
    "imagem",
    "url da imagem",
    "url da im",
    "image",
    "link",
];

/// Field separator detected from the header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Tab,
}

impl Delimiter {
    /// Tab wins if the first line contains one, otherwise comma.
    pub fn detect(first_line: &str) -> Self {
        if first_line.contains('\t') {
            Delimiter::Tab
        } else {
            Delimiter::Comma
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Tab => '\t',
        }
    }
}

/// Resolved column positions for the three product fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub code: usize,
    pub name: usize,
    pub image_url: usize,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            code: 0,
            name: 1,
            image_url: 2,
        }
    }
}

impl ColumnMap {
    /// Locate columns from already lower-cased, trimmed header cells.
    ///
    /// A header that isn't found keeps its positional default. A match at
    /// index 0 is a real match.
    pub fn from_headers(headers: &[String]) -> Self {
        let defaults = Self::default();
        let find = |names: &[&str], fallback: usize| {
            headers
                .iter()
                .position(|h| names.contains(&h.as_str()))
                .unwrap_or(fallback)
        };

        Self {
            code: find(CODE_HEADERS, defaults.code),
            name: find(NAME_HEADERS, defaults.name),
            image_url: find(URL_HEADERS, defaults.image_url),
        }
    }
}

/// Parse spreadsheet text into products, in input order.
///
/// Rows missing any of code, name or image URL are dropped. An empty
/// result is not an error here; callers decide how to report it.
pub fn parse_csv(content: &str) -> Vec<Product> {
    let content = content.trim();
    let mut lines = content.split('\n');

    let header_line = lines.next().unwrap_or("");
    let delimiter = Delimiter::detect(header_line);
    let sep = delimiter.as_char();

    let headers: Vec<String> = header_line
        .split(sep)
        .map(|h| h.trim().to_lowercase())
        .collect();
    let columns = ColumnMap::from_headers(&headers);
    debug!(?delimiter, ?headers, ?columns, "Parsed spreadsheet header");

    let mut products = Vec::new();

    for (line_no, line) in lines.enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let values: Vec<&str> = line.split(sep).map(str::trim).collect();
        let field = |idx: usize| values.get(idx).copied().unwrap_or("");

        let code = field(columns.code);
        let name = field(columns.name);
        let image_url = field(columns.image_url);

        if code.is_empty() || name.is_empty() || image_url.is_empty() {
            debug!(line = line_no + 2, "Skipping incomplete row");
            continue;
        }

        products.push(Product::new(code, name, image_url));
    }

    debug!(count = products.len(), "Spreadsheet parsed");
    products
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parses_rows_in_order() {
        let csv = "Código,Nome do Produto,URL da Imagem\n\
                   1,Brahma,http://a/1.jpg\n\
                   2,Skol,http://a/2.jpg\n\
                   3,Antarctica,http://a/3.jpg";
        let products = parse_csv(csv);
        assert_eq!(
            products,
            vec![
                Product::new("1", "Brahma", "http://a/1.jpg"),
                Product::new("2", "Skol", "http://a/2.jpg"),
                Product::new("3", "Antarctica", "http://a/3.jpg"),
            ]
        );
    }

    #[test]
    fn test_tab_delimiter_wins_over_commas_in_fields() {
        let tsv = "codigo\tnome\turl\n10\tCerveja, lata 350ml\thttp://x/a.png\n";
        let products = parse_csv(tsv);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "Cerveja, lata 350ml");
    }

    #[test]
    fn test_incomplete_row_is_dropped_without_shifting_others() {
        let csv = "code,product,image\n1,A,http://a\n2,,http://b\n3,C\n4,D,http://d\n";
        let products = parse_csv(csv);
        let codes: Vec<&str> = products.iter().map(|p| p.code.as_str()).collect();
        assert_eq!(codes, vec!["1", "4"]);
        assert_eq!(products[1].image_url, "http://d");
    }

    #[test]
    fn test_reordered_headers_are_matched() {
        let csv = "link,descrição,cod\nhttp://img/9.jpg,Guaraná 2L,9\n";
        let products = parse_csv(csv);
        assert_eq!(products, vec![Product::new("9", "Guaraná 2L", "http://img/9.jpg")]);
    }

    #[test]
    fn test_header_match_at_index_zero_is_respected() {
        // "url" sits at index 0; a falsy-or fallback would wrongly use column 2.
        let headers: Vec<String> = ["url", "nome", "codigo"].iter().map(|s| s.to_string()).collect();
        let map = ColumnMap::from_headers(&headers);
        assert_eq!(
            map,
            ColumnMap {
                code: 2,
                name: 1,
                image_url: 0
            }
        );
    }

    #[test]
    fn test_unknown_headers_fall_back_to_positions() {
        let csv = "a,b,c\nX1,Item,http://u\n";
        let products = parse_csv(csv);
        assert_eq!(products, vec![Product::new("X1", "Item", "http://u")]);
    }

    #[test]
    fn test_crlf_and_blank_lines() {
        let csv = "codigo,nome,urlimagem\r\n\r\n1,A,http://a\r\n   \r\n2,B,http://b\r\n";
        let products = parse_csv(csv);
        assert_eq!(products.len(), 2);
        assert_eq!(products[1].image_url, "http://b");
    }

    #[test]
    fn test_empty_input_yields_no_products() {
        assert!(parse_csv("").is_empty());
        assert!(parse_csv("codigo,nome,url\n").is_empty());
    }

    #[test]
    fn test_delimiter_detection() {
        assert_eq!(Delimiter::detect("a\tb,c"), Delimiter::Tab);
        assert_eq!(Delimiter::detect("a,b,c"), Delimiter::Comma);
        assert_eq!(Delimiter::detect("abc"), Delimiter::Comma);
    }
}
