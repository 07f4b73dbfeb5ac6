use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::ValidationError;

/// Domestic exchange a security trades on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Exchange {
    Shanghai,
    Shenzhen,
    Beijing,
}

impl Exchange {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shanghai => "SH",
            Self::Shenzhen => "SZ",
            Self::Beijing => "BJ",
        }
    }

    /// Exchange inferred from the first digit of a 6-digit code.
    /// Returns `None` for digits with no published board assignment.
    pub const fn from_leading_digit(digit: char) -> Option<Self> {
        match digit {
            '6' => Some(Self::Shanghai),
            '0' | '3' => Some(Self::Shenzhen),
            '4' | '8' => Some(Self::Beijing),
            _ => None,
        }
    }
}

impl Display for Exchange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A-share security identifier: a 6-digit code plus its exchange.
///
/// Accepts the plain 6-digit form (`600519`) and every vendor-qualified form
/// the registered adapters emit: prefix styles (`SH.600519`, `SHSE.600519`,
/// `sh.600519`) and suffix styles (`600519.SH`, `600519.SS`, `600519.SZ`).
/// The canonical rendering is always the plain 6-digit code; adapters own the
/// mapping back into their vendor-qualified form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SecurityCode {
    code: String,
    exchange: Exchange,
    defaulted: bool,
}

impl SecurityCode {
    pub fn new(code: &str, exchange: Exchange) -> Result<Self, ValidationError> {
        Ok(Self {
            code: validate_digits(code)?,
            exchange,
            defaulted: false,
        })
    }

    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyCode);
        }

        if let Some((left, right)) = trimmed.split_once('.') {
            // Suffix style when the code comes first, prefix style otherwise.
            let (code, qualifier) = if left.chars().all(|ch| ch.is_ascii_digit()) {
                (left, right)
            } else {
                (right, left)
            };

            let exchange = exchange_from_qualifier(qualifier).ok_or_else(|| {
                ValidationError::UnknownExchange {
                    qualifier: qualifier.to_owned(),
                    value: trimmed.to_owned(),
                }
            })?;

            return Ok(Self {
                code: validate_digits(code)?,
                exchange,
                defaulted: false,
            });
        }

        let code = validate_digits(trimmed)?;
        let leading = code.chars().next().unwrap_or('0');
        match Exchange::from_leading_digit(leading) {
            Some(exchange) => Ok(Self {
                code,
                exchange,
                defaulted: false,
            }),
            None => {
                warn!(code = %code, "no exchange mapping for leading digit, assuming Shenzhen");
                Ok(Self {
                    code,
                    exchange: Exchange::Shenzhen,
                    defaulted: true,
                })
            }
        }
    }

    /// Plain 6-digit code.
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn exchange(&self) -> Exchange {
        self.exchange
    }

    /// True when the exchange was assumed because the leading digit matched
    /// no known board. Callers that care about correctness should treat this
    /// as a warning condition rather than trusting the Shenzhen default.
    pub fn defaulted_exchange(&self) -> bool {
        self.defaulted
    }
}

impl Display for SecurityCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.code)
    }
}

// Identity is the (code, exchange) pair; the defaulted flag is diagnostic only.
impl PartialEq for SecurityCode {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code && self.exchange == other.exchange
    }
}

impl Eq for SecurityCode {}

impl Hash for SecurityCode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code.hash(state);
        self.exchange.hash(state);
    }
}

impl TryFrom<String> for SecurityCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for SecurityCode {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<SecurityCode> for String {
    fn from(value: SecurityCode) -> Self {
        value.code
    }
}

fn validate_digits(code: &str) -> Result<String, ValidationError> {
    if code.len() != 6 || !code.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(ValidationError::MalformedCode {
            value: code.to_owned(),
        });
    }
    Ok(code.to_owned())
}

fn exchange_from_qualifier(qualifier: &str) -> Option<Exchange> {
    match qualifier.to_ascii_uppercase().as_str() {
        "SH" | "SHSE" | "SS" => Some(Exchange::Shanghai),
        "SZ" | "SZSE" => Some(Exchange::Shenzhen),
        "BJ" | "BJSE" | "BSE" => Some(Exchange::Beijing),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_exchange_from_leading_digit() {
        let cases = [
            ("600519", Exchange::Shanghai),
            ("000001", Exchange::Shenzhen),
            ("300750", Exchange::Shenzhen),
            ("430047", Exchange::Beijing),
            ("830799", Exchange::Beijing),
        ];

        for (code, expected) in cases {
            let symbol = SecurityCode::parse(code).expect("must parse");
            assert_eq!(symbol.exchange(), expected, "code {code}");
            assert!(!symbol.defaulted_exchange());
        }
    }

    #[test]
    fn unknown_leading_digit_defaults_to_shenzhen_with_flag() {
        let symbol = SecurityCode::parse("999999").expect("must parse");
        assert_eq!(symbol.exchange(), Exchange::Shenzhen);
        assert!(symbol.defaulted_exchange());
    }

    #[test]
    fn parses_prefix_and_suffix_qualified_forms() {
        for input in ["SH.600519", "SHSE.600519", "sh.600519", "600519.SH", "600519.SS"] {
            let symbol = SecurityCode::parse(input).expect("must parse");
            assert_eq!(symbol.code(), "600519");
            assert_eq!(symbol.exchange(), Exchange::Shanghai);
        }
    }

    #[test]
    fn rejects_unknown_qualifier() {
        let err = SecurityCode::parse("NYSE.600519").expect_err("must fail");
        assert!(matches!(err, ValidationError::UnknownExchange { .. }));
    }

    #[test]
    fn rejects_malformed_code() {
        for input in ["60051", "6005190", "60051a", ""] {
            assert!(SecurityCode::parse(input).is_err(), "input {input:?}");
        }
    }

    #[test]
    fn serde_round_trips_plain_code() {
        let symbol = SecurityCode::parse("600519").expect("must parse");
        let json = serde_json::to_string(&symbol).expect("must serialize");
        assert_eq!(json, "\"600519\"");

        let back: SecurityCode = serde_json::from_str(&json).expect("must deserialize");
        assert_eq!(back, symbol);
    }
}
