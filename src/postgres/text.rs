//! Client-side rendering of binary result values.
//!
//! Parameterized queries normally fetch server text through a projection, and then every
//! column is TEXT. This decoder covers the statements that cannot be projected (EXPLAIN, SHOW,
//! nested data-modifying WITH): each supported type is re-printed following `PostgreSQL`'s
//! default output rules (`t`/`f` booleans, shortest round-trip floats with `e+NN` exponents,
//! exact NUMERIC digits, `\x` BYTEA, ISO dates).

use std::error::Error;
use std::fmt::Write;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use tokio_postgres::types::{FromSql, Kind, Type};

use crate::sanitize::sanitize_owned;

type BoxError = Box<dyn Error + Sync + Send>;

/// A column value as text; NULL decodes to the empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgText(pub String);

impl<'a> FromSql<'a> for PgText {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        pg_value_to_text(ty, raw).map(PgText)
    }

    fn from_sql_null(_ty: &Type) -> Result<Self, BoxError> {
        Ok(PgText(String::new()))
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}

/// Render one non-NULL binary value as text.
///
/// # Errors
/// Returns an error for malformed input or a type without a text rendering here.
pub fn pg_value_to_text(ty: &Type, raw: &[u8]) -> Result<String, BoxError> {
    let text = match *ty {
        Type::BOOL => (if bool::from_sql(ty, raw)? { "t" } else { "f" }).to_string(),
        Type::INT2 => i16::from_sql(ty, raw)?.to_string(),
        Type::INT4 => i32::from_sql(ty, raw)?.to_string(),
        Type::INT8 => i64::from_sql(ty, raw)?.to_string(),
        Type::OID => u32::from_sql(ty, raw)?.to_string(),
        Type::FLOAT4 => float4_text(f32::from_sql(ty, raw)?),
        Type::FLOAT8 => float8_text(f64::from_sql(ty, raw)?),
        Type::NUMERIC => numeric_text(raw)?,
        Type::BYTEA => bytea_text(raw),
        Type::UUID => uuid_text(raw)?,
        Type::DATE => NaiveDate::from_sql(ty, raw)?.to_string(),
        Type::TIME => time_text(NaiveTime::from_sql(ty, raw)?),
        Type::TIMESTAMP => timestamp_text(&NaiveDateTime::from_sql(ty, raw)?),
        // no session time zone on this path
        Type::TIMESTAMPTZ => {
            let ts = DateTime::<Utc>::from_sql(ty, raw)?;
            format!("{}+00", timestamp_text(&ts.naive_utc()))
        }
        Type::JSONB => match raw.split_first() {
            Some((1, body)) => sanitize_owned(body),
            _ => return Err("unsupported jsonb version".into()),
        },
        Type::TEXT
        | Type::VARCHAR
        | Type::BPCHAR
        | Type::NAME
        | Type::UNKNOWN
        | Type::CHAR
        | Type::JSON
        | Type::XML => sanitize_owned(raw),
        _ => match ty.kind() {
            Kind::Enum(_) => sanitize_owned(raw),
            Kind::Domain(base) => return pg_value_to_text(base, raw),
            _ => return Err(format!("no text rendering for column type {ty}").into()),
        },
    };
    Ok(text)
}

fn float_text(sci: &str, fixed: impl FnOnce() -> String, max_fixed_exp: i32) -> String {
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci, "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    if (-4..max_fixed_exp).contains(&exp) {
        fixed()
    } else {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exp.unsigned_abs())
    }
}

/// `float8out`: shortest round-trip digits, fixed notation for exponents in `-4..15`.
#[must_use]
pub fn float8_text(v: f64) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    if v.is_infinite() {
        return (if v > 0.0 { "Infinity" } else { "-Infinity" }).to_string();
    }
    float_text(&format!("{v:e}"), || v.to_string(), 15)
}

/// `float4out`: as [`float8_text`] with single precision and fixed notation for `-4..6`.
#[must_use]
pub fn float4_text(v: f32) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    if v.is_infinite() {
        return (if v > 0.0 { "Infinity" } else { "-Infinity" }).to_string();
    }
    float_text(&format!("{v:e}"), || v.to_string(), 6)
}

const NUMERIC_NEG: u16 = 0x4000;
const NUMERIC_NAN: u16 = 0xC000;
const NUMERIC_PINF: u16 = 0xD000;
const NUMERIC_NINF: u16 = 0xF000;

fn read_i16(raw: &[u8], at: usize) -> Result<i16, BoxError> {
    raw.get(at..at + 2)
        .map(|b| i16::from_be_bytes([b[0], b[1]]))
        .ok_or_else(|| "numeric value truncated".into())
}

/// Decode the binary NUMERIC layout (base-10000 digits, weight, display scale) to its exact
/// decimal text.
///
/// # Errors
/// Returns an error if the buffer is shorter than its header claims.
pub fn numeric_text(raw: &[u8]) -> Result<String, BoxError> {
    let ndigits = usize::try_from(read_i16(raw, 0)?)?;
    let weight = i32::from(read_i16(raw, 2)?);
    #[allow(clippy::cast_sign_loss)]
    let sign = read_i16(raw, 4)? as u16;
    let dscale = usize::try_from(read_i16(raw, 6)?)?;
    let digits = (0..ndigits)
        .map(|i| read_i16(raw, 8 + 2 * i))
        .collect::<Result<Vec<_>, _>>()?;

    match sign {
        NUMERIC_NAN => return Ok("NaN".to_string()),
        NUMERIC_PINF => return Ok("Infinity".to_string()),
        NUMERIC_NINF => return Ok("-Infinity".to_string()),
        _ => {}
    }

    let digit_at = |pos: i32| -> i16 {
        usize::try_from(pos)
            .ok()
            .and_then(|p| digits.get(p).copied())
            .unwrap_or(0)
    };

    let mut out = String::new();
    if sign == NUMERIC_NEG {
        out.push('-');
    }
    if weight < 0 {
        out.push('0');
    } else {
        for pos in 0..=weight {
            let d = digit_at(pos);
            if pos == 0 {
                let _ = write!(out, "{d}");
            } else {
                let _ = write!(out, "{d:04}");
            }
        }
    }

    if dscale > 0 {
        let mut frac = String::with_capacity(dscale + 4);
        let mut pos = weight + 1;
        while frac.len() < dscale {
            let _ = write!(frac, "{:04}", digit_at(pos));
            pos += 1;
        }
        frac.truncate(dscale);
        out.push('.');
        out.push_str(&frac);
    }
    Ok(out)
}

fn bytea_text(raw: &[u8]) -> String {
    let mut out = String::with_capacity(2 + raw.len() * 2);
    out.push_str("\\x");
    for b in raw {
        let _ = write!(out, "{b:02x}");
    }
    out
}

fn uuid_text(raw: &[u8]) -> Result<String, BoxError> {
    if raw.len() != 16 {
        return Err("uuid value must be 16 bytes".into());
    }
    let mut out = String::with_capacity(36);
    for (i, b) in raw.iter().enumerate() {
        if matches!(i, 4 | 6 | 8 | 10) {
            out.push('-');
        }
        let _ = write!(out, "{b:02x}");
    }
    Ok(out)
}

fn fraction_text(nanos: u32) -> String {
    let micros = nanos / 1_000;
    if micros == 0 {
        return String::new();
    }
    let digits = format!("{micros:06}");
    format!(".{}", digits.trim_end_matches('0'))
}

fn time_text(t: NaiveTime) -> String {
    format!("{}{}", t.format("%H:%M:%S"), fraction_text(t.nanosecond()))
}

fn timestamp_text(ts: &NaiveDateTime) -> String {
    format!(
        "{}{}",
        ts.format("%Y-%m-%d %H:%M:%S"),
        fraction_text(ts.nanosecond())
    )
}
