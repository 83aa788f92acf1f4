//! Kubernetes resource quantities with notation-independent comparison
//!
//! The same amount can be written many ways: `1`, `1000m`, `1e0`, `0.001k`.
//! Comparing the raw strings reports a change on every pass when the API
//! server hands back a different spelling than the one we built, so
//! quantities are parsed into an exact normalized value before comparison.
//!
//! Grammar (same as the Kubernetes API):
//!
//! ```text
//! quantity  ::= sign? number suffix
//! number    ::= digits | digits '.' digits? | '.' digits
//! suffix    ::= binarySI | decimalSI | ('e' | 'E') signedInt
//! binarySI  ::= Ki | Mi | Gi | Ti | Pi | Ei
//! decimalSI ::= n | u | m | "" | k | M | G | T | P | E
//! ```
//!
//! Values are held as `coefficient * 10^exponent` with no trailing zeros in
//! the coefficient. No floating point is involved anywhere. Nothing finer
//! than 1n is kept: a non-zero remainder below 1n rounds away from zero to
//! the next nano, which is how the API server stores such values.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use thiserror::Error;

/// Significant digits that always fit an i128 coefficient
const MAX_SIGNIFICANT_DIGITS: usize = 38;

/// Smallest representable step, 1n
const NANO_EXPONENT: i64 = -9;

/// Errors that can occur while parsing a quantity
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuantityError {
    /// The string does not follow the quantity grammar
    #[error("invalid quantity '{input}': {reason}")]
    InvalidFormat {
        /// The rejected input
        input: String,
        /// What was wrong with it
        reason: &'static str,
    },

    /// The value is well-formed but cannot be represented exactly
    #[error("quantity '{0}' is out of range")]
    OutOfRange(String),
}

/// Multiplier encoded by a quantity suffix
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Suffix {
    /// Power of two (Ki = 10, Mi = 20, ...)
    Binary(u32),
    /// Power of ten (m = -3, k = 3, e5 = 5, ...)
    Decimal(i64),
}

fn parse_suffix(suffix: &str) -> Option<Suffix> {
    let parsed = match suffix {
        "Ki" => Suffix::Binary(10),
        "Mi" => Suffix::Binary(20),
        "Gi" => Suffix::Binary(30),
        "Ti" => Suffix::Binary(40),
        "Pi" => Suffix::Binary(50),
        "Ei" => Suffix::Binary(60),
        "n" => Suffix::Decimal(-9),
        "u" => Suffix::Decimal(-6),
        "m" => Suffix::Decimal(-3),
        "" => Suffix::Decimal(0),
        "k" => Suffix::Decimal(3),
        "M" => Suffix::Decimal(6),
        "G" => Suffix::Decimal(9),
        "T" => Suffix::Decimal(12),
        "P" => Suffix::Decimal(15),
        "E" => Suffix::Decimal(18),
        other => {
            let exp = other.strip_prefix(['e', 'E'])?;
            if exp.is_empty() || exp.contains('.') {
                return None;
            }
            Suffix::Decimal(exp.parse::<i32>().ok()?.into())
        }
    };
    Some(parsed)
}

/// An exactly represented quantity, comparable regardless of notation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ParsedQuantity {
    coefficient: i128,
    exponent: i32,
}

impl ParsedQuantity {
    /// Parse a quantity string
    pub fn parse(input: &str) -> Result<Self, QuantityError> {
        let invalid = |reason| QuantityError::InvalidFormat {
            input: input.to_string(),
            reason,
        };
        let out_of_range = || QuantityError::OutOfRange(input.to_string());

        if input.is_empty() {
            return Err(invalid("empty string"));
        }

        let (negative, unsigned) = if let Some(rest) = input.strip_prefix('-') {
            (true, rest)
        } else if let Some(rest) = input.strip_prefix('+') {
            (false, rest)
        } else {
            (false, input)
        };

        let number_end = unsigned
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(unsigned.len());
        let (number, suffix) = unsigned.split_at(number_end);

        let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
        if fraction.contains('.') {
            return Err(invalid("more than one decimal point"));
        }
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid("missing digits"));
        }

        let suffix = parse_suffix(suffix).ok_or_else(|| invalid("unknown suffix"))?;

        // Fold the decimal point and trailing zeros into the exponent so the
        // coefficient only carries significant digits.
        let digits = format!("{whole}{fraction}");
        let without_leading = digits.trim_start_matches('0');
        let significant = without_leading.trim_end_matches('0');
        if significant.is_empty() {
            return Ok(Self::default());
        }
        if significant.len() > MAX_SIGNIFICANT_DIGITS {
            return Err(out_of_range());
        }

        let trailing_zeros = (without_leading.len() - significant.len()) as i64;
        let mut exponent = trailing_zeros - fraction.len() as i64;
        let mut coefficient: i128 = significant.parse().map_err(|_| out_of_range())?;

        match suffix {
            Suffix::Decimal(power) => exponent += power,
            Suffix::Binary(power) => {
                coefficient = coefficient
                    .checked_mul(1i128 << power)
                    .ok_or_else(out_of_range)?;
            }
        }

        if exponent < NANO_EXPONENT {
            coefficient = round_up_to_nano(coefficient, exponent);
            exponent = NANO_EXPONENT;
        }

        if negative {
            coefficient = -coefficient;
        }

        let exponent = i32::try_from(exponent).map_err(|_| out_of_range())?;
        Self::normalized(coefficient, exponent).ok_or_else(out_of_range)
    }

    /// Strip trailing zeros from the coefficient into the exponent
    fn normalized(mut coefficient: i128, mut exponent: i32) -> Option<Self> {
        if coefficient == 0 {
            return Some(Self::default());
        }
        while coefficient % 10 == 0 {
            coefficient /= 10;
            exponent = exponent.checked_add(1)?;
        }
        Some(Self {
            coefficient,
            exponent,
        })
    }

    fn is_zero(&self) -> bool {
        self.coefficient == 0
    }

    fn is_negative(&self) -> bool {
        self.coefficient < 0
    }

    /// Compare absolute values of two non-zero quantities
    fn cmp_magnitude(&self, other: &Self) -> Ordering {
        let a = self.coefficient.unsigned_abs().to_string();
        let b = other.coefficient.unsigned_abs().to_string();

        // Position of the most significant digit decides first
        let lead_a = a.len() as i64 + i64::from(self.exponent);
        let lead_b = b.len() as i64 + i64::from(other.exponent);

        lead_a.cmp(&lead_b).then_with(|| {
            let width = a.len().max(b.len());
            format!("{a:0<width$}").cmp(&format!("{b:0<width$}"))
        })
    }
}

/// Rescale a non-negative `coefficient * 10^exponent` to nanos, rounding
/// any remainder up
fn round_up_to_nano(coefficient: i128, exponent: i64) -> i128 {
    let shift = NANO_EXPONENT - exponent;
    // Any i128 is below 10^39, so a wider shift leaves only a remainder
    let Some(divisor) = u32::try_from(shift).ok().and_then(|s| 10i128.checked_pow(s)) else {
        return 1;
    };
    let rounded = coefficient / divisor;
    if coefficient % divisor == 0 {
        rounded
    } else {
        rounded + 1
    }
}

impl FromStr for ParsedQuantity {
    type Err = QuantityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&Quantity> for ParsedQuantity {
    type Error = QuantityError;

    fn try_from(quantity: &Quantity) -> Result<Self, Self::Error> {
        Self::parse(&quantity.0)
    }
}

impl Ord for ParsedQuantity {
    fn cmp(&self, other: &Self) -> Ordering {
        let sign = self.coefficient.signum().cmp(&other.coefficient.signum());
        if sign != Ordering::Equal || self.is_zero() {
            return sign;
        }
        let magnitude = self.cmp_magnitude(other);
        if self.is_negative() {
            magnitude.reverse()
        } else {
            magnitude
        }
    }
}

impl PartialOrd for ParsedQuantity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ParsedQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exponent >= 0 {
            return match self.exponent {
                0 => write!(f, "{}", self.coefficient),
                exp => write!(f, "{}e{}", self.coefficient, exp),
            };
        }

        let sign = if self.is_negative() { "-" } else { "" };
        let digits = self.coefficient.unsigned_abs().to_string();
        let scale = self.exponent.unsigned_abs() as usize;
        if digits.len() > scale {
            let (whole, fraction) = digits.split_at(digits.len() - scale);
            write!(f, "{sign}{whole}.{fraction}")
        } else {
            write!(f, "{sign}0.{}{digits}", "0".repeat(scale - digits.len()))
        }
    }
}

/// Semantic equality of two Kubernetes quantities.
///
/// Falls back to exact text comparison when either side is not a valid
/// quantity, so a malformed value still converges once it is overwritten.
pub fn quantities_equal(a: &Quantity, b: &Quantity) -> bool {
    match (ParsedQuantity::try_from(a), ParsedQuantity::try_from(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a.0 == b.0,
    }
}
