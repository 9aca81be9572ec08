//! Personal identity document: CPF (tax id) plus RG (civil registry id).

use serde::{Deserialize, Serialize};

use salesdesk_core::text::{digits_only, require_not_blank};
use salesdesk_core::{DomainError, DomainResult, ValueObject};

const CPF_LEN: usize = 11;
const RG_MIN_LEN: usize = 7;
const RG_MAX_LEN: usize = 9;

/// Validated CPF/RG pair.
///
/// The CPF is stored as 11 bare digits and the RG as digits plus an optional
/// upper-case `X` check letter. Equality considers the CPF only.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(from = "StoredDocument")]
pub struct Document {
    cpf: String,
    rg: String,
}

#[derive(Deserialize)]
struct StoredDocument {
    cpf: String,
    rg: String,
}

impl From<StoredDocument> for Document {
    fn from(stored: StoredDocument) -> Self {
        Document::from_storage(&stored.cpf, &stored.rg)
    }
}

impl Document {
    /// Validates raw user input. Punctuation is ignored in both ids.
    pub fn new(cpf: &str, rg: &str) -> DomainResult<Self> {
        Ok(Self {
            cpf: validate_cpf(cpf)?,
            rg: validate_rg(rg)?,
        })
    }

    /// Rehydrates a stored document.
    ///
    /// Only canonicalizes (strips punctuation, upper-cases the RG); checksum and
    /// length rules are not re-applied to rows already accepted once.
    pub fn from_storage(cpf: &str, rg: &str) -> Self {
        Self {
            cpf: digits_only(cpf),
            rg: canonical_rg(rg),
        }
    }

    pub fn cpf(&self) -> &str {
        &self.cpf
    }

    pub fn rg(&self) -> &str {
        &self.rg
    }

    /// `000.000.000-00`. A stored CPF of unexpected length is returned as is.
    pub fn formatted_cpf(&self) -> String {
        let c = &self.cpf;
        if c.len() != CPF_LEN {
            return c.clone();
        }
        format!("{}.{}.{}-{}", &c[0..3], &c[3..6], &c[6..9], &c[9..])
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.cpf == other.cpf
    }
}

impl core::hash::Hash for Document {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.cpf.hash(state);
    }
}

impl ValueObject for Document {}

fn validate_cpf(raw: &str) -> DomainResult<String> {
    require_not_blank(raw, "cpf cannot be empty")?;
    let cleaned = digits_only(raw);

    let digits: [u8; CPF_LEN] = cleaned
        .bytes()
        .map(|b| b - b'0')
        .collect::<Vec<u8>>()
        .try_into()
        .map_err(|_| DomainError::validation("cpf must have 11 digits"))?;

    if !cpf_checksum_valid(&digits) {
        return Err(DomainError::validation("invalid cpf"));
    }
    Ok(cleaned)
}

fn canonical_rg(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || *c == 'X' || *c == 'x')
        .collect::<String>()
        .to_ascii_uppercase()
}

fn validate_rg(raw: &str) -> DomainResult<String> {
    require_not_blank(raw, "rg cannot be empty")?;
    let cleaned = canonical_rg(raw);
    if !(RG_MIN_LEN..=RG_MAX_LEN).contains(&cleaned.len()) {
        return Err(DomainError::validation("invalid rg format"));
    }
    Ok(cleaned)
}

/// Mod-11 check digit over `digits`, weights counting down from `first_weight`.
fn check_digit(digits: &[u8], first_weight: u32) -> u8 {
    let sum: u32 = digits
        .iter()
        .zip((2..=first_weight).rev())
        .map(|(d, w)| u32::from(*d) * w)
        .sum();
    let check = 11 - (sum % 11);
    if check >= 10 { 0 } else { check as u8 }
}

/// CPF validity over 11 decimal digits (each `0..=9`).
///
/// Rejects the eleven repeated-digit sequences, which satisfy the checksum
/// but are never issued.
pub fn cpf_checksum_valid(digits: &[u8; CPF_LEN]) -> bool {
    if digits.iter().all(|d| *d == digits[0]) {
        return false;
    }
    digits[9] == check_digit(&digits[..9], 10) && digits[10] == check_digit(&digits[..10], 11)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expect_validation(err: DomainError, message: &str) {
        match err {
            DomainError::Validation(ref m) => assert_eq!(m, message),
            _ => panic!("Expected Validation error, got {err:?}"),
        }
    }

    #[test]
    fn accepts_formatted_valid_cpf() {
        let doc = Document::new("123.456.789-09", "12.345.678-x").unwrap();
        assert_eq!(doc.cpf(), "12345678909");
        assert_eq!(doc.rg(), "12345678X");
        assert_eq!(doc.formatted_cpf(), "123.456.789-09");
    }

    #[test]
    fn rejects_repeated_digits_even_when_checksum_matches() {
        expect_validation(Document::new("111.111.111-11", "1234567").unwrap_err(), "invalid cpf");
        expect_validation(Document::new("00000000000", "1234567").unwrap_err(), "invalid cpf");
    }

    #[test]
    fn rejects_wrong_check_digits() {
        expect_validation(Document::new("123.456.789-00", "1234567").unwrap_err(), "invalid cpf");
    }

    #[test]
    fn rejects_blank_and_wrong_length_cpf() {
        expect_validation(Document::new("   ", "1234567").unwrap_err(), "cpf cannot be empty");
        expect_validation(
            Document::new("123.456.789", "1234567").unwrap_err(),
            "cpf must have 11 digits",
        );
        expect_validation(
            Document::new("123.456.789-091", "1234567").unwrap_err(),
            "cpf must have 11 digits",
        );
    }

    #[test]
    fn rg_length_bounds() {
        expect_validation(Document::new("52998224725", "").unwrap_err(), "rg cannot be empty");
        expect_validation(Document::new("52998224725", "123456").unwrap_err(), "invalid rg format");
        expect_validation(
            Document::new("52998224725", "1234567890").unwrap_err(),
            "invalid rg format",
        );
        assert_eq!(Document::new("52998224725", "1234567").unwrap().rg(), "1234567");
        assert_eq!(Document::new("52998224725", "123456789").unwrap().rg(), "123456789");
    }

    #[test]
    fn from_storage_only_canonicalizes() {
        let doc = Document::from_storage("111.111.111-11", "ab-12x");
        assert_eq!(doc.cpf(), "11111111111");
        assert_eq!(doc.rg(), "12X");
        assert_eq!(doc.formatted_cpf(), "111.111.111-11");

        let short = Document::from_storage("123", "1");
        assert_eq!(short.formatted_cpf(), "123");
    }

    #[test]
    fn equality_is_on_cpf_only() {
        let a = Document::new("529.982.247-25", "1234567").unwrap();
        let b = Document::new("52998224725", "7654321").unwrap();
        let c = Document::new("11144477735", "1234567").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn deserializes_through_storage_path() {
        let doc: Document =
            serde_json::from_str(r#"{"cpf":"390.533.447-05","rg":"mg-12.345.67x"}"#).unwrap();
        assert_eq!(doc.cpf(), "39053344705");
        assert_eq!(doc.rg(), "1234567X");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn with_check_digits(base: [u8; 9]) -> [u8; 11] {
            let mut digits = [0u8; 11];
            digits[..9].copy_from_slice(&base);
            digits[9] = check_digit(&digits[..9], 10);
            digits[10] = check_digit(&digits[..10], 11);
            digits
        }

        proptest! {
            #![proptest_config(ProptestConfig { cases: 1000, ..ProptestConfig::default() })]

            #[test]
            fn generated_cpfs_validate_and_round_trip_through_formatting(base in proptest::array::uniform9(0u8..10)) {
                let digits = with_check_digits(base);
                prop_assume!(!digits.iter().all(|d| *d == digits[0]));

                let raw: String = digits.iter().map(|d| char::from(b'0' + d)).collect();
                let doc = Document::new(&raw, "1234567").unwrap();
                prop_assert_eq!(doc.cpf(), raw.as_str());

                let again = Document::new(&doc.formatted_cpf(), "1234567").unwrap();
                prop_assert_eq!(again, doc);
            }

            #[test]
            fn altering_a_check_digit_invalidates(base in proptest::array::uniform9(0u8..10), bump in 1u8..10) {
                let mut digits = with_check_digits(base);
                digits[10] = (digits[10] + bump) % 10;
                prop_assert!(!cpf_checksum_valid(&digits));
            }

            #[test]
            fn repeated_digit_sequences_always_fail(d in 0u8..10) {
                let raw: String = core::iter::repeat_n(char::from(b'0' + d), 11).collect();
                prop_assert!(Document::new(&raw, "1234567").is_err());
            }
        }
    }
}
