//! Human-readable document numbers: `<PREFIX>-<CODE>-<NNNNNN>`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::AllocationError;

/// Width the sequence is zero-padded to.
pub const SEQUENCE_WIDTH: usize = 6;

/// Most digits a sequence may have; keeps every sequence within a signed
/// 64-bit column.
pub const MAX_SEQUENCE_DIGITS: usize = 18;

/// Longest client-supplied identifier accepted.
pub const MAX_IDENTIFIER_LEN: usize = 64;

/// Three-character company code used inside document numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompanyCode(String);

impl CompanyCode {
    /// Derives the code from a company name: its first three ASCII letters or
    /// digits, uppercased, padded with `X`.
    #[must_use]
    pub fn from_company(company: &str) -> Self {
        let mut code: String = company
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .take(3)
            .map(|c| c.to_ascii_uppercase())
            .collect();
        while code.len() < 3 {
            code.push('X');
        }
        Self(code)
    }

    /// The code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompanyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A generated document number such as `TRX-ACM-000042`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentNumber {
    prefix: String,
    company_code: CompanyCode,
    sequence: u64,
}

impl DocumentNumber {
    /// Assembles a number from its parts.
    #[must_use]
    pub fn new(prefix: &str, company_code: CompanyCode, sequence: u64) -> Self {
        Self {
            prefix: prefix.to_ascii_uppercase(),
            company_code,
            sequence,
        }
    }

    /// Document prefix, e.g. `TRX`.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Company code.
    #[must_use]
    pub fn company_code(&self) -> &CompanyCode {
        &self.company_code
    }

    /// Per-company sequence value.
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl fmt::Display for DocumentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{:0width$}",
            self.prefix,
            self.company_code,
            self.sequence,
            width = SEQUENCE_WIDTH
        )
    }
}

impl FromStr for DocumentNumber {
    type Err = AllocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AllocationError::InvalidIdentifier(format!("'{s}' is not PREFIX-CODE-NNNNNN"));
        let mut parts = s.splitn(3, '-');
        let (Some(prefix), Some(code), Some(sequence)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        let prefix_ok = !prefix.is_empty() && prefix.chars().all(|c| c.is_ascii_uppercase());
        let code_ok = code.len() == 3
            && code
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
        let sequence_ok =
            sequence.len() >= SEQUENCE_WIDTH && sequence.chars().all(|c| c.is_ascii_digit());
        if !(prefix_ok && code_ok && sequence_ok) {
            return Err(invalid());
        }
        let sequence = sequence.parse().map_err(|_| invalid())?;
        Ok(Self {
            prefix: prefix.to_string(),
            company_code: CompanyCode(code.to_string()),
            sequence,
        })
    }
}

impl TryFrom<String> for DocumentNumber {
    type Error = AllocationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DocumentNumber> for String {
    fn from(number: DocumentNumber) -> Self {
        number.to_string()
    }
}

/// The numbers issued under one prefix for one company code, e.g. `TRX-ACM-`.
///
/// Companies whose names share a code share a space, and client-supplied
/// identifiers may land inside it too, so sequences are read from the space
/// rather than from any one company's records.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NumberSpace {
    prefix: String,
    company_code: CompanyCode,
    lead: String,
}

impl NumberSpace {
    /// The space of `prefix` numbers for `company_code`.
    #[must_use]
    pub fn new(prefix: &str, company_code: CompanyCode) -> Self {
        let prefix = prefix.to_ascii_uppercase();
        let lead = format!("{prefix}-{company_code}-");
        Self {
            prefix,
            company_code,
            lead,
        }
    }

    /// Leading text shared by every number in the space.
    #[must_use]
    pub fn lead(&self) -> &str {
        &self.lead
    }

    /// Sequence of `number` if it belongs to this space.
    ///
    /// Only all-digit tails of [`SEQUENCE_WIDTH`] to [`MAX_SEQUENCE_DIGITS`]
    /// digits count.
    #[must_use]
    pub fn sequence_of(&self, number: &str) -> Option<u64> {
        let tail = number.strip_prefix(self.lead.as_str())?;
        if !(SEQUENCE_WIDTH..=MAX_SEQUENCE_DIGITS).contains(&tail.len())
            || !tail.chars().all(|c| c.is_ascii_digit())
        {
            return None;
        }
        tail.parse().ok()
    }

    /// The number with the given sequence in this space.
    #[must_use]
    pub fn number(&self, sequence: u64) -> DocumentNumber {
        DocumentNumber::new(&self.prefix, self.company_code.clone(), sequence)
    }
}

impl fmt::Display for NumberSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lead)
    }
}

/// Checks a client-supplied identifier and returns it trimmed.
///
/// Any shape is accepted as long as it is non-empty, at most 64 characters,
/// and free of whitespace.
///
/// # Errors
///
/// Returns `InvalidIdentifier` otherwise.
pub fn validate_client_identifier(raw: &str) -> Result<String, AllocationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AllocationError::InvalidIdentifier(
            "identifier cannot be blank".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_IDENTIFIER_LEN {
        return Err(AllocationError::InvalidIdentifier(format!(
            "identifier exceeds {MAX_IDENTIFIER_LEN} characters"
        )));
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(AllocationError::InvalidIdentifier(format!(
            "'{trimmed}' contains whitespace"
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Acme Traders", "ACM")]
    #[case("acme", "ACM")]
    #[case("A-1 Suppliers", "A1S")]
    #[case("Om", "OMX")]
    #[case("", "XXX")]
    #[case("नेपाल Tea", "TEA")]
    fn test_company_code(#[case] company: &str, #[case] expected: &str) {
        assert_eq!(CompanyCode::from_company(company).as_str(), expected);
    }

    #[test]
    fn test_format_pads_to_six_digits() {
        let number = DocumentNumber::new("trx", CompanyCode::from_company("Acme"), 42);
        assert_eq!(number.to_string(), "TRX-ACM-000042");
    }

    #[test]
    fn test_format_widens_past_six_digits() {
        let number = DocumentNumber::new("TRX", CompanyCode::from_company("Acme"), 1_234_567);
        assert_eq!(number.to_string(), "TRX-ACM-1234567");
        assert_eq!(number.to_string().parse::<DocumentNumber>().unwrap(), number);
    }

    #[test]
    fn test_parse() {
        let number: DocumentNumber = "INV-A1S-000007".parse().unwrap();
        assert_eq!(number.prefix(), "INV");
        assert_eq!(number.company_code().as_str(), "A1S");
        assert_eq!(number.sequence(), 7);
    }

    #[rstest]
    #[case("TRX-ACM-42")]
    #[case("TRX-ACME-000001")]
    #[case("trx-ACM-000001")]
    #[case("TRX-ACM")]
    #[case("TRX-ACM-00000a")]
    fn test_parse_rejects(#[case] input: &str) {
        assert!(input.parse::<DocumentNumber>().is_err());
    }

    #[test]
    fn test_client_identifier() {
        assert_eq!(validate_client_identifier("  PO-2081-17 ").unwrap(), "PO-2081-17");
        assert!(validate_client_identifier("   ").is_err());
        assert!(validate_client_identifier("PO 17").is_err());
        assert!(validate_client_identifier(&"X".repeat(65)).is_err());
        assert!(validate_client_identifier(&"X".repeat(64)).is_ok());
    }

    #[rstest]
    #[case("TRX-ACM-000007", Some(7))]
    #[case("TRX-ACM-1234567", Some(1_234_567))]
    #[case("TRX-ACM-0000002", Some(2))]
    #[case("TRX-ACM-42", None)]
    #[case("TRX-ACM-00000a", None)]
    #[case("TRX-ACMX-000001", None)]
    #[case("INV-ACM-000001", None)]
    #[case("PO-2081-17", None)]
    #[case("TRX-ACM-1234567890123456789", None)]
    fn test_number_space_sequence(#[case] number: &str, #[case] expected: Option<u64>) {
        let space = NumberSpace::new("trx", CompanyCode::from_company("Acme Traders"));
        assert_eq!(space.lead(), "TRX-ACM-");
        assert_eq!(space.sequence_of(number), expected);
    }

    #[test]
    fn test_number_space_issues_its_own_numbers() {
        let space = NumberSpace::new("INV", CompanyCode::from_company("Nepal Suppliers"));
        let number = space.number(12);
        assert_eq!(number.to_string(), "INV-NEP-000012");
        assert_eq!(space.sequence_of(&number.to_string()), Some(12));
    }
}
