//! Card values (possible estimations) and their coercion at the request boundary.
//!
//! A submitted value is numeric if and only if it parses as a decimal literal that
//! [`Decimal`] holds exactly, otherwise it is kept verbatim as a label. Numeric cards
//! compare by value, so `"3"`, `"3.0"` and `"0.3e1"` are the same card.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Largest number of fractional digits a [`Decimal`] can hold exactly
const MAX_SCALE: usize = 28;

/// Parse a decimal literal: `[+-]digits[.digits][(e|E)[+-]digits]`, or with a leading `.`.
///
/// Literals that [`Decimal`] cannot hold exactly are rejected rather than rounded.
pub fn parse_decimal(input: &str) -> Option<Decimal> {
    let text = input.trim();
    let (negative, rest) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };

    let (mantissa, exponent) = match rest.find(['e', 'E']) {
        Some(pos) => (&rest[..pos], parse_exponent(&rest[pos + 1..])?),
        None => (rest, 0),
    };

    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit())
        || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    let int_part = match int_part.trim_start_matches('0') {
        "" => "0",
        digits => digits,
    };
    // Trailing zeros beyond the representable scale carry no value
    let excess = frac_part.len().saturating_sub(MAX_SCALE);
    let trailing = frac_part.len() - frac_part.trim_end_matches('0').len();
    let frac_part = &frac_part[..frac_part.len() - excess.min(trailing)];

    let literal = if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{int_part}.{frac_part}")
    };

    let mut value = scale_by_power_of_ten(Decimal::from_str_exact(&literal).ok()?, exponent)?;
    if negative && !value.is_zero() {
        value.set_sign_negative(true);
    }
    Some(value)
}

fn parse_exponent(exp: &str) -> Option<i64> {
    let digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    exp.parse().ok()
}

/// Multiply by `10^exponent` without rounding; `None` if the result is out of range.
fn scale_by_power_of_ten(mut value: Decimal, exponent: i64) -> Option<Decimal> {
    if value.is_zero() {
        return Some(Decimal::ZERO);
    }

    let target = i64::from(value.scale()).checked_sub(exponent)?;
    if target >= 0 {
        value.set_scale(u32::try_from(target).ok()?).ok()?;
        return Some(value);
    }

    value.set_scale(0).ok()?;
    for _ in 0..target.unsigned_abs() {
        value = value.checked_mul(Decimal::TEN)?;
    }
    Some(value)
}

/// A permissible estimation value.
///
/// Equality is only defined within the same variant: a label never equals a number.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawCard")]
pub enum Card {
    Numeric(Decimal),
    Label(String),
}

impl Card {
    /// Interpret a submitted value as a number if it is one, otherwise as a label.
    pub fn coerce(value: &str) -> Self {
        match parse_decimal(value) {
            Some(number) => Card::Numeric(number),
            None => Card::Label(value.to_string()),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Card::Numeric(_))
    }
}

/// Coerce a list of submitted cards into a game's card set.
///
/// Value-equal duplicates are dropped; the first occurrence keeps its position.
pub fn coerce_cards(cards: Vec<Card>) -> Vec<Card> {
    let mut unique: Vec<Card> = Vec::with_capacity(cards.len());
    for card in cards {
        if !unique.contains(&card) {
            unique.push(card);
        }
    }
    unique
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Card::Numeric(number) => fmt::Display::fmt(number, f),
            Card::Label(label) => f.write_str(label),
        }
    }
}

impl Hash for Card {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Card::Numeric(number) => {
                0u8.hash(state);
                number.normalize().hash(state);
            }
            Card::Label(label) => {
                1u8.hash(state);
                label.hash(state);
            }
        }
    }
}

/// Numbers are written as exact JSON number literals, so a card echoed back by a
/// client coerces to the same value.
impl Serialize for Card {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Card::Numeric(number) => {
                let literal = serde_json::Number::from_str(&number.normalize().to_string())
                    .map_err(serde::ser::Error::custom)?;
                literal.serialize(serializer)
            }
            Card::Label(label) => serializer.serialize_str(label),
        }
    }
}

/// Wire shape of a card: JSON allows either a number or a string.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawCard {
    Number(serde_json::Number),
    Text(String),
}

impl From<RawCard> for Card {
    fn from(raw: RawCard) -> Self {
        match raw {
            RawCard::Number(number) => Card::coerce(&number.to_string()),
            RawCard::Text(text) => Card::coerce(&text),
        }
    }
}
