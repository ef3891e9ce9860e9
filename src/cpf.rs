/// CPF identifier validation and display formatting
use std::fmt;

/// Number of digits in a CPF
pub const CPF_LENGTH: usize = 11;

/// Returns true iff `input` is exactly 11 ASCII decimal digits.
///
/// Separators, whitespace and any other surrounding content are rejected.
pub fn is_well_formed(input: &str) -> bool {
    input.len() == CPF_LENGTH && input.bytes().all(|b| b.is_ascii_digit())
}

/// Render 11 digits as `XXX.XXX.XXX-XX`.
///
/// Callers must check the input with [`is_well_formed`] first.
pub fn format_cpf(digits: &str) -> String {
    debug_assert!(is_well_formed(digits), "format_cpf called with {:?}", digits);

    format!(
        "{}.{}.{}-{}",
        &digits[0..3],
        &digits[3..6],
        &digits[6..9],
        &digits[9..11]
    )
}

/// A CPF that has passed the shape check
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cpf(String);

impl Cpf {
    /// Accept the input only if it is well formed
    pub fn parse(input: &str) -> Option<Self> {
        is_well_formed(input).then(|| Self(input.to_string()))
    }

    /// Raw digits, as stored
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Punctuated display form
    pub fn formatted(&self) -> String {
        format_cpf(&self.0)
    }
}

impl fmt::Display for Cpf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
