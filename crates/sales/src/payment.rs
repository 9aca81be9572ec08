use core::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use salesdesk_core::DomainError;

static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s-]+").unwrap());

/// How a sale is settled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    #[default]
    Cash,
    CreditCard,
    DebitCard,
    Pix,
    BankTransfer,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 5] = [
        PaymentMethod::Cash,
        PaymentMethod::CreditCard,
        PaymentMethod::DebitCard,
        PaymentMethod::Pix,
        PaymentMethod::BankTransfer,
    ];

    /// Legacy Portuguese symbolic names still found in older clients and rows.
    const ALIASES: [(&'static str, PaymentMethod); 5] = [
        ("DINHEIRO", PaymentMethod::Cash),
        ("CARTAO_CREDITO", PaymentMethod::CreditCard),
        ("CARTAO_DEBITO", PaymentMethod::DebitCard),
        ("TRANSFERENCIA_BANCARIA", PaymentMethod::BankTransfer),
        ("TRANSFERENCIA", PaymentMethod::BankTransfer),
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "CASH",
            PaymentMethod::CreditCard => "CREDIT_CARD",
            PaymentMethod::DebitCard => "DEBIT_CARD",
            PaymentMethod::Pix => "PIX",
            PaymentMethod::BankTransfer => "BANK_TRANSFER",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Dinheiro",
            PaymentMethod::CreditCard => "Cartão de Crédito",
            PaymentMethod::DebitCard => "Cartão de Débito",
            PaymentMethod::Pix => "PIX",
            PaymentMethod::BankTransfer => "Transferência Bancária",
        }
    }

    /// Card payments must carry a card number.
    pub fn requires_card_number(&self) -> bool {
        match self {
            PaymentMethod::CreditCard | PaymentMethod::DebitCard => true,
            PaymentMethod::Cash | PaymentMethod::Pix | PaymentMethod::BankTransfer => false,
        }
    }

    /// Name or label ignoring case; then the normalized form (trimmed,
    /// upper-cased, whitespace/hyphen runs as `_`) against names and aliases.
    fn lookup(text: &str) -> Option<Self> {
        let wanted = text.to_lowercase();
        if let Some(found) = Self::ALL
            .into_iter()
            .find(|m| m.name().to_lowercase() == wanted || m.label().to_lowercase() == wanted)
        {
            return Some(found);
        }

        let normalized = SEPARATORS
            .replace_all(&text.trim().to_uppercase(), "_")
            .into_owned();
        Self::ALL
            .into_iter()
            .find(|m| m.name() == normalized)
            .or_else(|| {
                Self::ALIASES
                    .iter()
                    .find(|(alias, _)| *alias == normalized)
                    .map(|(_, method)| *method)
            })
    }

    /// Lenient lookup for stored rows: unknown or blank values become the default.
    pub fn from_storage(text: Option<&str>) -> Self {
        text.and_then(Self::lookup).unwrap_or_default()
    }
}

impl FromStr for PaymentMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s)
            .ok_or_else(|| DomainError::validation(format!("unknown payment method: {s}")))
    }
}

impl core::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
