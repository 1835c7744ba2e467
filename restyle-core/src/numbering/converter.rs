//! Arabic <-> Roman conversion over dotted multi-segment numbers.
//!
//! Each `.`-separated segment is converted on its own. Segments that are not
//! purely numeric (for `to_roman`) or purely alphabetic (for `to_arabic`)
//! pass through untouched, so literal separators embedded by configuration
//! survive a conversion. Roman output uses classical subtractive notation,
//! which caps at 3999: larger chapter numbers convert to Arabic fine but can
//! never be written back as Roman numerals.

use crate::error::ConversionError;

/// Largest value representable in classical subtractive notation.
pub const MAX_ROMAN: u32 = 3999;

const NUMERALS: [(u32, &str); 13] = [
    (1000, "M"),
    (900, "CM"),
    (500, "D"),
    (400, "CD"),
    (100, "C"),
    (90, "XC"),
    (50, "L"),
    (40, "XL"),
    (10, "X"),
    (9, "IX"),
    (5, "V"),
    (4, "IV"),
    (1, "I"),
];

/// "3.2" -> "III.II"
pub fn to_roman(decimal_dotted: &str) -> Result<String, ConversionError> {
    decimal_dotted
        .split('.')
        .map(|segment| {
            if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
                let value = segment.parse::<u32>().ok().filter(|v| (1..=MAX_ROMAN).contains(v));
                match value {
                    Some(v) => Ok(encode(v)),
                    None => Err(ConversionError::OutOfRange {
                        value: segment.to_string(),
                        max: MAX_ROMAN,
                    }),
                }
            } else {
                Ok(segment.to_string())
            }
        })
        .collect::<Result<Vec<_>, _>>()
        .map(|segments| segments.join("."))
}

/// "III.II" -> "3.2". Lowercase numerals are accepted.
pub fn to_arabic(roman_dotted: &str) -> Result<String, ConversionError> {
    roman_dotted
        .split('.')
        .map(|segment| {
            if !segment.is_empty() && segment.chars().all(char::is_alphabetic) {
                decode(segment).map(|v| v.to_string())
            } else {
                Ok(segment.to_string())
            }
        })
        .collect::<Result<Vec<_>, _>>()
        .map(|segments| segments.join("."))
}

/// Whether `token` stands on its own as a numeral: every dot-separated
/// segment is digits, a canonical upper-case Roman numeral, or a canonical
/// lower-case one spelled with `i`, `v` and `x` only. Lower-case `l`, `c`,
/// `d` and `m` runs are read as words ("mix", "dim", "civil").
pub fn is_numeral_token(token: &str) -> bool {
    token.split('.').all(|segment| {
        if segment.is_empty() {
            return false;
        }
        if segment.bytes().all(|b| b.is_ascii_digit()) {
            return true;
        }
        let single_case = segment.bytes().all(|b| b.is_ascii_uppercase())
            || segment.bytes().all(|b| matches!(b, b'i' | b'v' | b'x'));
        single_case && decode(segment).is_ok()
    })
}

fn encode(mut value: u32) -> String {
    let mut out = String::new();
    for (weight, symbol) in NUMERALS {
        while value >= weight {
            out.push_str(symbol);
            value -= weight;
        }
    }
    out
}

fn letter_value(c: char) -> Option<u32> {
    match c {
        'I' => Some(1),
        'V' => Some(5),
        'X' => Some(10),
        'L' => Some(50),
        'C' => Some(100),
        'D' => Some(500),
        'M' => Some(1000),
        _ => None,
    }
}

/// Strict decode: the segment must be exactly the canonical spelling of
/// its value, so "IIII", "IC" or "VX" are rejected.
fn decode(segment: &str) -> Result<u32, ConversionError> {
    let invalid = || ConversionError::InvalidRoman {
        segment: segment.to_string(),
    };
    let upper = segment.to_ascii_uppercase();
    let values = upper
        .chars()
        .map(letter_value)
        .collect::<Option<Vec<_>>>()
        .ok_or_else(invalid)?;

    let total = subtractive_total(&values);
    if total == 0 || total > MAX_ROMAN || encode(total) != upper {
        return Err(invalid());
    }
    Ok(total)
}

fn subtractive_total(values: &[u32]) -> u32 {
    let mut total: i64 = 0;
    for (i, &value) in values.iter().enumerate() {
        let value = i64::from(value);
        match values.get(i + 1) {
            Some(&next) if i64::from(next) > value => total -= value,
            _ => total += value,
        }
    }
    u32::try_from(total).unwrap_or(0)
}
