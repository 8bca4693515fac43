//! Text and binary wire formats of the PostgreSQL `numeric` type.
//!
//! ## Text format
//!
//! Plain decimal notation (`-123.45`), optionally with an exponent
//! (`1.5e3`), or one of the special values `NaN`, `Infinity` and
//! `-Infinity`.
//!
//! ## Binary format
//!
//! A header of four big-endian 16-bit fields followed by base-10000 digits:
//! - ndigits (i16): number of digits that follow
//! - weight (i16): power of 10000 of the first digit
//! - sign (u16): 0x0000 positive, 0x4000 negative, 0xC000 NaN,
//!   0xD000 +Infinity, 0xF000 -Infinity
//! - dscale (i16): number of decimal digits after the point
//! - digits (u16 each): values in `0..10000`
//!
//! The value is `sum(digit[i] * 10000^(weight - i))`.

use crate::error::CodecError;
use crate::wire::{InfinityModifier, Numeric};
use crate::Result;
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::Zero;

/// Base of a binary numeric digit.
const NBASE: u32 = 10000;

/// Decimal digits per binary numeric digit.
const DEC_DIGITS: usize = 4;

/// Size of the binary header in bytes.
const HEADER_SIZE: usize = 8;

/// Integer digits representable with the largest `i16` weight.
const MAX_WEIGHT_DIGITS: i32 = (i16::MAX as i32 + 1) * DEC_DIGITS as i32;

const NUMERIC_POS: u16 = 0x0000;
const NUMERIC_NEG: u16 = 0x4000;
const NUMERIC_NAN: u16 = 0xC000;
const NUMERIC_PINF: u16 = 0xD000;
const NUMERIC_NINF: u16 = 0xF000;

/// Wire format of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Human-readable text.
    Text,
    /// Packed binary.
    Binary,
}

impl Format {
    /// The protocol format code (0 for text, 1 for binary).
    pub fn code(self) -> i16 {
        match self {
            Format::Text => 0,
            Format::Binary => 1,
        }
    }

    /// Look up a format by its protocol code.
    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            0 => Some(Format::Text),
            1 => Some(Format::Binary),
            _ => None,
        }
    }
}

fn invalid(msg: impl Into<String>) -> CodecError {
    CodecError::InvalidWire(msg.into())
}

/// Decode non-null wire bytes into a numeric value.
///
/// # Example
/// ```
/// use pg_decimal128::{format, Format, Numeric};
///
/// let n = format::decode(b"-123.45", Format::Text).unwrap();
/// assert_eq!(n, Numeric::new(-12345, -2));
/// ```
pub fn decode(src: &[u8], format: Format) -> Result<Numeric> {
    match format {
        Format::Text => decode_text(src),
        Format::Binary => decode_binary(src),
    }
}

/// Append the wire bytes of a non-null numeric value to `buf`.
///
/// Nothing is appended on error.
pub fn encode(v: &Numeric, format: Format, buf: &mut Vec<u8>) -> Result<()> {
    match format {
        Format::Text => {
            encode_text(v, buf);
            Ok(())
        }
        Format::Binary => encode_binary(v, buf),
    }
}

fn decode_text(src: &[u8]) -> Result<Numeric> {
    let s = std::str::from_utf8(src).map_err(|_| invalid("text numeric is not UTF-8"))?;

    if s.eq_ignore_ascii_case("nan") {
        return Ok(Numeric::nan());
    }
    if s.eq_ignore_ascii_case("infinity") || s.eq_ignore_ascii_case("+infinity") {
        return Ok(Numeric::infinite(InfinityModifier::Infinity));
    }
    if s.eq_ignore_ascii_case("-infinity") {
        return Ok(Numeric::infinite(InfinityModifier::NegativeInfinity));
    }

    let (mantissa, exponent) = match s.find(|c: char| c == 'e' || c == 'E') {
        Some(pos) => {
            let exponent = s[pos + 1..]
                .parse::<i64>()
                .map_err(|_| invalid(format!("bad exponent in {s:?}")))?;
            (&s[..pos], exponent)
        }
        None => (s, 0),
    };

    let (negative, mantissa) = match mantissa.as_bytes().first() {
        Some(b'-') => (true, &mantissa[1..]),
        Some(b'+') => (false, &mantissa[1..]),
        _ => (false, mantissa),
    };

    let mut digits = String::with_capacity(mantissa.len());
    let mut scale: i64 = 0;
    let mut seen_point = false;
    for c in mantissa.chars() {
        match c {
            '0'..='9' => {
                digits.push(c);
                if seen_point {
                    scale += 1;
                }
            }
            '.' if !seen_point => seen_point = true,
            _ => return Err(invalid(format!("bad character {c:?} in {s:?}"))),
        }
    }

    let magnitude = BigUint::parse_bytes(digits.as_bytes(), 10)
        .ok_or_else(|| invalid(format!("no digits in {s:?}")))?;
    let exp = exponent
        .checked_sub(scale)
        .and_then(|e| i32::try_from(e).ok())
        .ok_or_else(|| invalid(format!("exponent out of range in {s:?}")))?;

    let sign = if negative { Sign::Minus } else { Sign::Plus };
    Ok(Numeric::new(BigInt::from_biguint(sign, magnitude), exp))
}

// Write `digits * 10^exponent` in plain notation.
fn push_positional(out: &mut String, digits: &str, exponent: i32) {
    if exponent >= 0 {
        out.push_str(digits);
        if digits != "0" {
            out.extend(std::iter::repeat('0').take(exponent as usize));
        }
        return;
    }

    let scale = exponent.unsigned_abs() as usize;
    if digits.len() > scale {
        let (int, frac) = digits.split_at(digits.len() - scale);
        out.push_str(int);
        out.push('.');
        out.push_str(frac);
    } else {
        out.push_str("0.");
        out.extend(std::iter::repeat('0').take(scale - digits.len()));
        out.push_str(digits);
    }
}

fn encode_text(v: &Numeric, buf: &mut Vec<u8>) {
    if v.nan {
        buf.extend_from_slice(b"NaN");
        return;
    }
    match v.infinity_modifier {
        InfinityModifier::Infinity => buf.extend_from_slice(b"Infinity"),
        InfinityModifier::NegativeInfinity => buf.extend_from_slice(b"-Infinity"),
        InfinityModifier::Finite => {
            let digits = v.int.magnitude().to_string();
            let mut out = String::with_capacity(digits.len() + 8);
            if v.int.sign() == Sign::Minus {
                out.push('-');
            }
            push_positional(&mut out, &digits, v.exp);
            buf.extend_from_slice(out.as_bytes());
        }
    }
}

#[inline]
fn read_u16(src: &[u8], at: usize) -> u16 {
    u16::from_be_bytes([src[at], src[at + 1]])
}

#[inline]
fn read_i16(src: &[u8], at: usize) -> i16 {
    i16::from_be_bytes([src[at], src[at + 1]])
}

fn pow10(exp: u32) -> BigUint {
    num_traits::pow(BigUint::from(10u32), exp as usize)
}

fn decode_binary(src: &[u8]) -> Result<Numeric> {
    if src.len() < HEADER_SIZE {
        return Err(invalid(format!(
            "binary numeric needs at least {HEADER_SIZE} bytes, got {}",
            src.len()
        )));
    }

    let ndigits = read_i16(src, 0);
    let weight = read_i16(src, 2);
    let sign = read_u16(src, 4);
    let dscale = read_i16(src, 6);

    let negative = match sign {
        NUMERIC_NAN => return Ok(Numeric::nan()),
        NUMERIC_PINF => return Ok(Numeric::infinite(InfinityModifier::Infinity)),
        NUMERIC_NINF => return Ok(Numeric::infinite(InfinityModifier::NegativeInfinity)),
        NUMERIC_POS => false,
        NUMERIC_NEG => true,
        other => return Err(invalid(format!("unknown sign 0x{other:04X}"))),
    };

    if ndigits < 0 || dscale < 0 {
        return Err(invalid(format!(
            "negative ndigits ({ndigits}) or dscale ({dscale})"
        )));
    }

    let body = &src[HEADER_SIZE..];
    if body.len() != ndigits as usize * 2 {
        return Err(invalid(format!(
            "expected {} digit bytes, got {}",
            ndigits as usize * 2,
            body.len()
        )));
    }

    let dscale = i32::from(dscale);
    if ndigits == 0 {
        return Ok(Numeric::new(0, -dscale));
    }

    let mut magnitude = BigUint::zero();
    for chunk in body.chunks_exact(2) {
        let digit = u16::from_be_bytes([chunk[0], chunk[1]]);
        if u32::from(digit) >= NBASE {
            return Err(invalid(format!("digit {digit} out of range")));
        }
        magnitude = magnitude * BigUint::from(NBASE) + BigUint::from(digit);
    }

    let mut exp = (i32::from(weight) - i32::from(ndigits) + 1) * DEC_DIGITS as i32;

    // The exponent follows dscale so trailing zeros survive. Digits past
    // dscale carry no display position and are rejected.
    let target = -dscale;
    if dscale > 0 && exp > target {
        magnitude *= pow10((exp - target) as u32);
        exp = target;
    } else if exp < target {
        let divisor = pow10((target - exp) as u32);
        if !(&magnitude % &divisor).is_zero() {
            return Err(invalid(format!(
                "digits beyond dscale {dscale} (weight {weight}, ndigits {ndigits})"
            )));
        }
        magnitude /= divisor;
        exp = target;
    }

    let sign = if negative { Sign::Minus } else { Sign::Plus };
    Ok(Numeric::new(BigInt::from_biguint(sign, magnitude), exp))
}

fn write_header(buf: &mut Vec<u8>, ndigits: i16, weight: i16, sign: u16, dscale: i16) {
    buf.extend_from_slice(&ndigits.to_be_bytes());
    buf.extend_from_slice(&weight.to_be_bytes());
    buf.extend_from_slice(&sign.to_be_bytes());
    buf.extend_from_slice(&dscale.to_be_bytes());
}

fn encode_binary(v: &Numeric, buf: &mut Vec<u8>) -> Result<()> {
    let special = if v.nan {
        Some(NUMERIC_NAN)
    } else {
        match v.infinity_modifier {
            InfinityModifier::Infinity => Some(NUMERIC_PINF),
            InfinityModifier::NegativeInfinity => Some(NUMERIC_NINF),
            InfinityModifier::Finite => None,
        }
    };
    if let Some(sign) = special {
        write_header(buf, 0, 0, sign, 0);
        return Ok(());
    }

    let too_large = || invalid(format!("{}e{} exceeds the binary numeric limits", v.int, v.exp));
    let dscale = if v.exp < 0 { v.exp.unsigned_abs() as usize } else { 0 };
    let dscale_field = i16::try_from(dscale).map_err(|_| too_large())?;

    if v.int.is_zero() {
        write_header(buf, 0, 0, NUMERIC_POS, dscale_field);
        return Ok(());
    }
    if v.exp > MAX_WEIGHT_DIGITS {
        return Err(too_large());
    }

    let mut digits = v.int.magnitude().to_string();
    if v.exp > 0 {
        digits.extend(std::iter::repeat('0').take(v.exp as usize));
    }

    let (int_part, frac_part) = if digits.len() > dscale {
        let (int, frac) = digits.split_at(digits.len() - dscale);
        (int.to_string(), frac.to_string())
    } else {
        let mut frac = "0".repeat(dscale - digits.len());
        frac.push_str(&digits);
        (String::new(), frac)
    };

    let int_pad = (DEC_DIGITS - int_part.len() % DEC_DIGITS) % DEC_DIGITS;
    let frac_pad = (DEC_DIGITS - frac_part.len() % DEC_DIGITS) % DEC_DIGITS;

    let mut padded = "0".repeat(int_pad);
    padded.push_str(&int_part);
    padded.push_str(&frac_part);
    padded.push_str(&"0".repeat(frac_pad));

    let mut groups: Vec<u16> = padded
        .as_bytes()
        .chunks(DEC_DIGITS)
        .map(|chunk| chunk.iter().fold(0u16, |acc, b| acc * 10 + u16::from(b - b'0')))
        .collect();

    let mut weight = ((int_pad + int_part.len()) / DEC_DIGITS) as i64 - 1;

    let leading = groups.iter().take_while(|&&g| g == 0).count();
    groups.drain(..leading);
    weight -= leading as i64;
    while groups.last() == Some(&0) {
        groups.pop();
    }

    let ndigits = i16::try_from(groups.len()).map_err(|_| too_large())?;
    let weight = i16::try_from(weight).map_err(|_| too_large())?;
    let sign = if v.int.sign() == Sign::Minus {
        NUMERIC_NEG
    } else {
        NUMERIC_POS
    };

    buf.reserve(HEADER_SIZE + groups.len() * 2);
    write_header(buf, ndigits, weight, sign, dscale_field);
    for group in groups {
        buf.extend_from_slice(&group.to_be_bytes());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary(ndigits: i16, weight: i16, sign: u16, dscale: i16, digits: &[u16]) -> Vec<u8> {
        let mut buf = Vec::new();
        write_header(&mut buf, ndigits, weight, sign, dscale);
        for d in digits {
            buf.extend_from_slice(&d.to_be_bytes());
        }
        buf
    }

    fn encoded(v: &Numeric, format: Format) -> Vec<u8> {
        let mut buf = Vec::new();
        encode(v, format, &mut buf).unwrap();
        buf
    }

    #[test]
    fn test_format_codes() {
        assert_eq!(Format::Text.code(), 0);
        assert_eq!(Format::from_code(1), Some(Format::Binary));
        assert_eq!(Format::from_code(2), None);
    }

    #[test]
    fn test_decode_text() {
        assert_eq!(decode(b"123.45", Format::Text).unwrap(), Numeric::new(12345, -2));
        assert_eq!(decode(b"-0.001", Format::Text).unwrap(), Numeric::new(-1, -3));
        assert_eq!(decode(b"1.5e3", Format::Text).unwrap(), Numeric::new(15, 2));
        assert_eq!(decode(b"42", Format::Text).unwrap(), Numeric::new(42, 0));
        assert_eq!(decode(b"NaN", Format::Text).unwrap(), Numeric::nan());
        assert_eq!(
            decode(b"Infinity", Format::Text).unwrap(),
            Numeric::infinite(InfinityModifier::Infinity)
        );
        assert_eq!(
            decode(b"-Infinity", Format::Text).unwrap(),
            Numeric::infinite(InfinityModifier::NegativeInfinity)
        );
    }

    #[test]
    fn test_decode_text_errors() {
        let cases: [&[u8]; 7] = [
            b"",
            b"-",
            b"1.2.3",
            b"12x",
            b"1e",
            b"\xff",
            b"0.1e-9223372036854775808",
        ];
        for bad in cases {
            assert!(
                matches!(decode(bad, Format::Text), Err(CodecError::InvalidWire(_))),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn test_encode_text() {
        assert_eq!(encoded(&Numeric::new(-12345, -2), Format::Text), b"-123.45");
        assert_eq!(encoded(&Numeric::new(15, -4), Format::Text), b"0.0015");
        assert_eq!(encoded(&Numeric::new(15, 2), Format::Text), b"1500");
        assert_eq!(encoded(&Numeric::new(0, -2), Format::Text), b"0.00");
        assert_eq!(encoded(&Numeric::nan(), Format::Text), b"NaN");
        assert_eq!(
            encoded(&Numeric::infinite(InfinityModifier::NegativeInfinity), Format::Text),
            b"-Infinity"
        );
    }

    #[test]
    fn test_encode_binary_layout() {
        assert_eq!(
            encoded(&Numeric::new(12345, -2), Format::Binary),
            binary(2, 0, NUMERIC_POS, 2, &[123, 4500])
        );
        assert_eq!(
            encoded(&Numeric::new(-15, -4), Format::Binary),
            binary(1, -1, NUMERIC_NEG, 4, &[15])
        );
        assert_eq!(
            encoded(&Numeric::new(1, -5), Format::Binary),
            binary(1, -2, NUMERIC_POS, 5, &[1000])
        );
        assert_eq!(
            encoded(&Numeric::new(1_000_000, 0), Format::Binary),
            binary(1, 1, NUMERIC_POS, 0, &[100])
        );
        assert_eq!(
            encoded(&Numeric::new(3, 4), Format::Binary),
            binary(1, 1, NUMERIC_POS, 0, &[3])
        );
        assert_eq!(
            encoded(&Numeric::new(0, -2), Format::Binary),
            binary(0, 0, NUMERIC_POS, 2, &[])
        );
        assert_eq!(
            encoded(&Numeric::nan(), Format::Binary),
            binary(0, 0, NUMERIC_NAN, 0, &[])
        );
        assert_eq!(
            encoded(&Numeric::infinite(InfinityModifier::Infinity), Format::Binary),
            binary(0, 0, NUMERIC_PINF, 0, &[])
        );
    }

    #[test]
    fn test_decode_binary() {
        assert_eq!(
            decode(&binary(2, 0, NUMERIC_POS, 2, &[123, 4500]), Format::Binary).unwrap(),
            Numeric::new(12345, -2)
        );
        assert_eq!(
            decode(&binary(1, -2, NUMERIC_POS, 5, &[1000]), Format::Binary).unwrap(),
            Numeric::new(1, -5)
        );
        assert_eq!(
            decode(&binary(1, 1, NUMERIC_NEG, 0, &[100]), Format::Binary).unwrap(),
            Numeric::new(-100, 4)
        );
        // dscale keeps trailing zeros: 1.50
        assert_eq!(
            decode(&binary(2, 0, NUMERIC_POS, 2, &[1, 5000]), Format::Binary).unwrap(),
            Numeric::new(150, -2)
        );
        assert_eq!(
            decode(&binary(0, 0, NUMERIC_POS, 3, &[]), Format::Binary).unwrap(),
            Numeric::new(0, -3)
        );
        // 1.00 and 10000.00: integral digits with a display scale
        assert_eq!(
            decode(&binary(1, 0, NUMERIC_POS, 2, &[1]), Format::Binary).unwrap(),
            Numeric::new(100, -2)
        );
        assert_eq!(
            decode(&binary(1, 1, NUMERIC_POS, 2, &[1]), Format::Binary).unwrap(),
            Numeric::new(1_000_000, -2)
        );
        // 0.10 sent with a trailing zero digit group
        assert_eq!(
            decode(&binary(1, -1, NUMERIC_POS, 2, &[1000]), Format::Binary).unwrap(),
            Numeric::new(10, -2)
        );
        assert_eq!(
            decode(&binary(0, 0, NUMERIC_NINF, 0, &[]), Format::Binary).unwrap(),
            Numeric::infinite(InfinityModifier::NegativeInfinity)
        );
    }

    #[test]
    fn test_decode_binary_errors() {
        let cases = [
            vec![0u8; 4],
            binary(1, 0, NUMERIC_POS, 0, &[]),
            binary(1, 0, NUMERIC_POS, 0, &[10000]),
            binary(0, 0, 0x1234, 0, &[]),
            binary(-1, 0, NUMERIC_POS, 0, &[]),
            // 0.0015 cannot be shown with two fractional digits
            binary(1, -1, NUMERIC_POS, 2, &[15]),
            binary(1, -1, NUMERIC_POS, 0, &[15]),
        ];
        for case in cases {
            assert!(
                matches!(decode(&case, Format::Binary), Err(CodecError::InvalidWire(_))),
                "{case:?}"
            );
        }
    }

    #[test]
    fn test_binary_matches_text_scale() {
        for (text, n) in [
            (&b"1.00"[..], Numeric::new(100, -2)),
            (b"10000.00", Numeric::new(1_000_000, -2)),
            (b"-0.50", Numeric::new(-50, -2)),
        ] {
            assert_eq!(decode(text, Format::Text).unwrap(), n);
            let bin = encoded(&n, Format::Binary);
            assert_eq!(decode(&bin, Format::Binary).unwrap(), n);
            assert_eq!(encoded(&n, Format::Text), text);
        }
        assert_eq!(
            encoded(&Numeric::new(1_000_000, -2), Format::Binary),
            binary(1, 1, NUMERIC_POS, 2, &[1])
        );
    }

    #[test]
    fn test_binary_roundtrip() {
        for (int, exp) in [
            (12345i64, -2),
            (-978901234567890, -9),
            (1, -30),
            (9999, 0),
            (10000, 0),
            (-5, 7),
            (i64::MAX, -18),
        ] {
            let n = Numeric::new(int, exp);
            let back = decode(&encoded(&n, Format::Binary), Format::Binary).unwrap();
            // Positive exponents come back folded into the digits.
            if exp < 0 {
                assert_eq!(back, n);
            }
            assert_eq!(
                encoded(&back, Format::Text),
                encoded(&n, Format::Text),
                "{int}e{exp}"
            );
        }
    }

    #[test]
    fn test_encode_binary_limits() {
        let mut buf = Vec::new();
        let err = encode(&Numeric::new(1, -40000), Format::Binary, &mut buf).unwrap_err();
        assert!(matches!(err, CodecError::InvalidWire(_)));
        let err = encode(&Numeric::new(1, i32::MAX), Format::Binary, &mut buf).unwrap_err();
        assert!(matches!(err, CodecError::InvalidWire(_)));
        assert!(buf.is_empty());
    }
}
