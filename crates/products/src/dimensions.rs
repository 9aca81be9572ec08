use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use salesdesk_core::money::{require_positive, round2};
use salesdesk_core::{DomainError, DomainResult, ValueObject};

/// Package measures in centimetres, each strictly positive, whose volume
/// fits a [`Decimal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDimensions")]
pub struct Dimensions {
    height: Decimal,
    width: Decimal,
    depth: Decimal,
}

#[derive(Deserialize)]
struct RawDimensions {
    height: Decimal,
    width: Decimal,
    depth: Decimal,
}

impl TryFrom<RawDimensions> for Dimensions {
    type Error = DomainError;

    fn try_from(raw: RawDimensions) -> Result<Self, Self::Error> {
        Dimensions::new(raw.height, raw.width, raw.depth)
    }
}

impl Dimensions {
    pub fn new(height: Decimal, width: Decimal, depth: Decimal) -> DomainResult<Self> {
        let dims = Self {
            height: require_positive(height, "height")?,
            width: require_positive(width, "width")?,
            depth: require_positive(depth, "depth")?,
        };
        let volume = dims
            .height
            .checked_mul(dims.width)
            .and_then(|area| area.checked_mul(dims.depth));
        if volume.is_none() {
            return Err(DomainError::validation("dimensions are too large"));
        }
        Ok(dims)
    }

    pub fn height(&self) -> Decimal {
        self.height
    }

    pub fn width(&self) -> Decimal {
        self.width
    }

    pub fn depth(&self) -> Decimal {
        self.depth
    }

    /// Unrounded product of the three measures.
    pub fn volume(&self) -> Decimal {
        self.height * self.width * self.depth
    }
}

impl ValueObject for Dimensions {}

impl core::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} x {} x {} cm",
            round2(self.height),
            round2(self.width),
            round2(self.depth)
        )
    }
}
