//! Upload boundary: which files are accepted and how bytes become text.
//!
//! Excel MIME types are accepted at the picker level, but only text content
//! is actually parsed. A real `.xlsx` upload will therefore yield no products.

use crate::error::{EncarteError, Result};

use super::{Product, parse_csv};

/// MIME types accepted for spreadsheet uploads.
pub const ACCEPTED_MIME_TYPES: &[&str] = &[
    "text/csv",
    "text/plain",
    "text/tab-separated-values",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
];

/// Check a file name against the accepted spreadsheet types.
///
/// Uses the MIME type guessed from the extension.
pub fn is_accepted(filename: &str) -> bool {
    mime_guess::from_path(filename)
        .iter()
        .any(|mime| ACCEPTED_MIME_TYPES.contains(&mime.essence_str()))
}

/// Decode uploaded bytes as text. Invalid UTF-8 is replaced, not rejected.
pub fn decode_text(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    text.strip_prefix('\u{feff}').unwrap_or(&text).to_string()
}

/// Accept, decode and parse an uploaded spreadsheet.
///
/// Returns [`EncarteError::NoProducts`] when nothing usable was found.
pub fn load_upload(filename: &str, bytes: &[u8]) -> Result<Vec<Product>> {
    if !is_accepted(filename) {
        return Err(EncarteError::Csv(format!(
            "Unsupported file type '{}'. Use CSV, TSV, XLS or XLSX.",
            filename
        )));
    }

    let products = parse_csv(&decode_text(bytes));
    if products.is_empty() {
        return Err(EncarteError::NoProducts);
    }
    Ok(products)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_spreadsheet_types() {
        assert!(is_accepted("produtos.csv"));
        assert!(is_accepted("PRODUTOS.CSV"));
        assert!(is_accepted("produtos.xlsx"));
        assert!(is_accepted("produtos.xls"));
        assert!(is_accepted("produtos.txt"));
    }

    #[test]
    fn test_rejects_other_types() {
        assert!(!is_accepted("foto.png"));
        assert!(!is_accepted("relatorio.pdf"));
    }

    #[test]
    fn test_decode_strips_bom() {
        assert_eq!(decode_text(b"\xEF\xBB\xBFcodigo"), "codigo");
    }

    #[test]
    fn test_load_upload_reports_no_products() {
        let err = load_upload("vazio.csv", b"codigo,nome,url\n").unwrap_err();
        assert!(matches!(err, EncarteError::NoProducts));
    }

    #[test]
    fn test_load_upload_parses_rows() {
        let products = load_upload("p.csv", b"codigo,nome,url\n1,A,http://a\n").unwrap();
        assert_eq!(products.len(), 1);
    }
}
