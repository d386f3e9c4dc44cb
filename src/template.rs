//! # Template Registry
//!
//! Static list of flyer themes. Each template resolves once to a
//! [`TemplateStyle`] lookup so the render engine never branches on the
//! template id while drawing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EncarteError;
use crate::render::color::Color;

/// Template identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateId {
    Moderno,
    Classico,
    Minimalista,
    Branco,
    Escuro,
    Destaque,
}

impl TemplateId {
    pub const ALL: [TemplateId; 6] = [
        TemplateId::Moderno,
        TemplateId::Classico,
        TemplateId::Minimalista,
        TemplateId::Branco,
        TemplateId::Escuro,
        TemplateId::Destaque,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TemplateId::Moderno => "moderno",
            TemplateId::Classico => "classico",
            TemplateId::Minimalista => "minimalista",
            TemplateId::Branco => "branco",
            TemplateId::Escuro => "escuro",
            TemplateId::Destaque => "destaque",
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateId {
    type Err = EncarteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        TemplateId::ALL
            .into_iter()
            .find(|id| id.as_str() == wanted || (wanted == "clássico" && *id == TemplateId::Classico))
            .ok_or_else(|| EncarteError::UnknownTemplate(s.to_string()))
    }
}

/// Theme colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub primary: Color,
    pub secondary: Color,
    pub accent: Color,
}

/// A named visual theme.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Template {
    pub id: TemplateId,
    pub name: &'static str,
    pub description: &'static str,
    /// Preview swatch hint for UIs.
    pub preview: &'static str,
    pub colors: Palette,
}

const fn palette(primary: Color, secondary: Color) -> Palette {
    Palette {
        primary,
        secondary,
        accent: Color::WHITE,
    }
}

static TEMPLATES: [Template; 6] = [
    Template {
        id: TemplateId::Moderno,
        name: "Moderno",
        description: "Design clean e contemporâneo com gradientes azuis",
        preview: "bg-gradient-blue",
        colors: palette(Color::rgb(0x1E, 0x40, 0xAF), Color::rgb(0x3B, 0x82, 0xF6)),
    },
    Template {
        id: TemplateId::Classico,
        name: "Clássico",
        description: "Estilo tradicional com tons de azul elegantes",
        preview: "bg-gradient-blue",
        colors: palette(Color::rgb(0x1E, 0x3A, 0x8A), Color::rgb(0x25, 0x63, 0xEB)),
    },
    Template {
        id: TemplateId::Minimalista,
        name: "Minimalista",
        description: "Design limpo e minimalista com foco no produto",
        preview: "bg-gradient-blue",
        colors: palette(Color::rgb(0x03, 0x69, 0xA1), Color::rgb(0x0E, 0xA5, 0xE9)),
    },
    Template {
        id: TemplateId::Branco,
        name: "Branco",
        description: "Fundo branco com detalhes em azul",
        preview: "bg-white",
        colors: palette(Color::rgb(0x1E, 0x40, 0xAF), Color::rgb(0x3B, 0x82, 0xF6)),
    },
    Template {
        id: TemplateId::Escuro,
        name: "Escuro",
        description: "Tema escuro com alto contraste",
        preview: "bg-gradient-dark",
        colors: palette(Color::rgb(0x0F, 0x17, 0x2A), Color::rgb(0x33, 0x41, 0x55)),
    },
    Template {
        id: TemplateId::Destaque,
        name: "Destaque",
        description: "Vermelho e laranja para ofertas relâmpago",
        preview: "bg-gradient-red",
        colors: palette(Color::rgb(0xB9, 0x1C, 0x1C), Color::rgb(0xF9, 0x73, 0x16)),
    },
];

/// All templates, in display order.
pub fn all() -> &'static [Template] {
    &TEMPLATES
}

/// Look up a template by id.
pub fn by_id(id: TemplateId) -> Option<&'static Template> {
    TEMPLATES.iter().find(|t| t.id == id)
}

/// How the canvas background is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    Solid(Color),
    /// Diagonal gradient, top-left to bottom-right.
    Diagonal { from: Color, to: Color },
}

/// Per-template drawing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateStyle {
    pub background: Background,
    /// Header and footer bars.
    pub bar_fill: Color,
    pub bar_text: Color,
    pub name_text: Color,
    /// Struck-through original price and its strike line.
    pub muted_text: Color,
    pub promo_fill: Color,
    pub promo_text: Color,
    pub info_fill: Color,
    pub info_text: Color,
    /// Backdrop behind a successfully loaded product image.
    pub image_backdrop: Color,
}

impl Template {
    pub fn style(&self) -> TemplateStyle {
        let dark = self.id == TemplateId::Escuro;
        let white = self.id == TemplateId::Branco;

        TemplateStyle {
            background: if white {
                Background::Solid(Color::WHITE)
            } else {
                Background::Diagonal {
                    from: self.colors.primary,
                    to: self.colors.secondary,
                }
            },
            bar_fill: if dark {
                Color::rgba(0, 0, 0, 0.9)
            } else {
                Color::rgba(255, 255, 255, 0.95)
            },
            bar_text: if dark { Color::WHITE } else { self.colors.primary },
            name_text: if dark { Color::WHITE } else { Color::rgb(0x1E, 0x29, 0x3B) },
            muted_text: if dark {
                Color::rgb(0x94, 0xA3, 0xB8)
            } else {
                Color::rgb(0x64, 0x74, 0x8B)
            },
            promo_fill: if dark {
                Color::rgba(255, 255, 255, 0.1)
            } else {
                Color::rgba(34, 197, 94, 0.1)
            },
            promo_text: if dark { Color::WHITE } else { Color::rgb(0x22, 0xC5, 0x5E) },
            info_fill: if dark {
                Color::rgba(255, 255, 255, 0.06)
            } else {
                Color::rgba(255, 255, 255, 0.55)
            },
            info_text: if dark {
                Color::rgb(0xD1, 0xD5, 0xDB)
            } else {
                Color::rgb(0x4B, 0x55, 0x63)
            },
            image_backdrop: if white {
                Color::rgba(248, 250, 252, 0.8)
            } else {
                Color::rgba(255, 255, 255, 0.1)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_id_has_a_template() {
        for id in TemplateId::ALL {
            let template = by_id(id).unwrap();
            assert_eq!(template.id, id);
        }
        assert_eq!(all().len(), TemplateId::ALL.len());
    }

    #[test]
    fn test_parse_ids() {
        assert_eq!("moderno".parse::<TemplateId>().unwrap(), TemplateId::Moderno);
        assert_eq!(" ESCURO ".parse::<TemplateId>().unwrap(), TemplateId::Escuro);
        assert_eq!("clássico".parse::<TemplateId>().unwrap(), TemplateId::Classico);
        assert!(matches!(
            "neon".parse::<TemplateId>(),
            Err(EncarteError::UnknownTemplate(name)) if name == "neon"
        ));
    }

    #[test]
    fn test_branco_has_solid_white_background() {
        let style = by_id(TemplateId::Branco).unwrap().style();
        assert_eq!(style.background, Background::Solid(Color::WHITE));
    }

    #[test]
    fn test_gradient_uses_template_colors() {
        let template = by_id(TemplateId::Moderno).unwrap();
        match template.style().background {
            Background::Diagonal { from, to } => {
                assert_eq!(from, template.colors.primary);
                assert_eq!(to, template.colors.secondary);
            }
            other => panic!("expected gradient, got {:?}", other),
        }
    }

    #[test]
    fn test_escuro_uses_dark_bars_and_light_text() {
        let style = by_id(TemplateId::Escuro).unwrap().style();
        assert_eq!(style.bar_fill, Color::rgba(0, 0, 0, 0.9));
        assert_eq!(style.bar_text, Color::WHITE);
        assert_eq!(style.name_text, Color::WHITE);
    }

    #[test]
    fn test_light_templates_use_primary_for_bar_text() {
        let template = by_id(TemplateId::Classico).unwrap();
        assert_eq!(template.style().bar_text, template.colors.primary);
    }
}
