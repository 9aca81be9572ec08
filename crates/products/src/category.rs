use core::str::FromStr;

use serde::{Deserialize, Serialize};

use salesdesk_core::DomainError;

/// Catalog category with its Portuguese display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductCategory {
    Lips,
    Face,
    Eyes,
    Nails,
    SkinCare,
    Hair,
    Fragrance,
    Other,
}

impl ProductCategory {
    pub const ALL: [ProductCategory; 8] = [
        ProductCategory::Lips,
        ProductCategory::Face,
        ProductCategory::Eyes,
        ProductCategory::Nails,
        ProductCategory::SkinCare,
        ProductCategory::Hair,
        ProductCategory::Fragrance,
        ProductCategory::Other,
    ];

    /// Symbolic name, as stored and serialized.
    pub fn name(&self) -> &'static str {
        match self {
            ProductCategory::Lips => "LIPS",
            ProductCategory::Face => "FACE",
            ProductCategory::Eyes => "EYES",
            ProductCategory::Nails => "NAILS",
            ProductCategory::SkinCare => "SKIN_CARE",
            ProductCategory::Hair => "HAIR",
            ProductCategory::Fragrance => "FRAGRANCE",
            ProductCategory::Other => "OTHER",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProductCategory::Lips => "Lábios",
            ProductCategory::Face => "Rosto",
            ProductCategory::Eyes => "Olhos",
            ProductCategory::Nails => "Unhas",
            ProductCategory::SkinCare => "Cuidados com a Pele",
            ProductCategory::Hair => "Cabelos",
            ProductCategory::Fragrance => "Fragrância",
            ProductCategory::Other => "Outro",
        }
    }

    /// Case-insensitive match on name or label.
    fn lookup(text: &str) -> Option<Self> {
        let wanted = text.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.name().to_lowercase() == wanted || c.label().to_lowercase() == wanted)
    }

    /// Lenient lookup for stored rows: unknown or blank values become `Other`.
    pub fn from_storage(text: Option<&str>) -> Self {
        text.and_then(Self::lookup).unwrap_or(ProductCategory::Other)
    }
}

impl FromStr for ProductCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s)
            .ok_or_else(|| DomainError::validation(format!("unknown product category: {s}")))
    }
}

impl core::fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
