//! # Error Types
//!
//! This module defines error types used throughout the encarte library.

use thiserror::Error;

/// Main error type for encarte operations
#[derive(Debug, Error)]
pub enum EncarteError {
    /// The spreadsheet could not be read as text
    #[error("Spreadsheet error: {0}")]
    Csv(String),

    /// The spreadsheet was parsed but yielded no usable rows
    #[error("Nenhum produto encontrado na planilha")]
    NoProducts,

    /// A template id that is not in the registry
    #[error("Unknown template '{0}'")]
    UnknownTemplate(String),

    /// Form input rejected before a flyer spec was built
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Image loading or decoding error
    #[error("Image error: {0}")]
    Image(String),

    /// Drawing or font error during a render pass
    #[error("Render error: {0}")]
    Render(String),

    /// Encoding or share error
    #[error("Export error: {0}")]
    Export(String),

    /// Configuration could not be loaded
    #[error("Config error: {0}")]
    Config(String),

    /// Network-level errors (binding, serving)
    #[error("Transport error: {0}")]
    Transport(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons a flyer form submission is refused.
///
/// Messages are shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Faça upload de uma planilha para continuar")]
    NoProducts,

    #[error("Selecione um modelo de encarte para continuar")]
    NoTemplate,

    #[error("Por favor, preencha todos os campos")]
    MissingField(&'static str),

    #[error("Produto não encontrado: {0}")]
    UnknownProduct(String),

    #[error("Por favor, insira preços válidos")]
    InvalidPrice(String),

    #[error("O preço promocional deve ser menor que o preço original")]
    PromoNotLower,
}

pub type Result<T> = std::result::Result<T, EncarteError>;
