use std::error::Error;

use tokio_postgres::types::{Format, IsNull, ToSql, Type, to_sql_checked};
use tokio_util::bytes;

use crate::sanitize::sanitize_text;
use crate::types::{Args, Param};

/// Borrowed driver parameters for one call, in argument order.
pub struct Params<'a> {
    references: Vec<&'a (dyn ToSql + Sync)>,
}

impl<'a> Params<'a> {
    /// Borrow every argument as a driver parameter; position `i` receives argument `i`.
    #[must_use]
    pub fn convert(args: &'a Args) -> Params<'a> {
        let mut references = Vec::with_capacity(args.len());
        for p in args {
            references.push(p as &(dyn ToSql + Sync));
        }
        Params { references }
    }

    /// Get a reference to the underlying parameter array
    #[must_use]
    pub fn as_refs(&self) -> &[&(dyn ToSql + Sync)] {
        &self.references
    }
}

type BoxError = Box<dyn Error + Sync + Send>;

fn wrong_type(param: &Param, ty: &Type) -> BoxError {
    format!("cannot bind {} argument to parameter of type {ty}", param.kind()).into()
}

fn is_binary_number(ty: &Type) -> bool {
    matches!(
        *ty,
        Type::INT2 | Type::INT4 | Type::INT8 | Type::FLOAT4 | Type::FLOAT8
    )
}

/// Float spelling the server's numeric input functions accept.
fn float_literal(f: f64) -> String {
    if f.is_infinite() {
        (if f > 0.0 { "Infinity" } else { "-Infinity" }).to_string()
    } else {
        f.to_string()
    }
}

fn integer_to_sql(value: i64, ty: &Type, out: &mut bytes::BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::INT2 => i16::try_from(value)?.to_sql(ty, out),
        Type::INT4 => i32::try_from(value)?.to_sql(ty, out),
        Type::INT8 => value.to_sql(ty, out),
        #[allow(clippy::cast_precision_loss)]
        Type::FLOAT8 => (value as f64).to_sql(ty, out),
        #[allow(clippy::cast_precision_loss)]
        Type::FLOAT4 => (value as f32).to_sql(ty, out),
        _ => write_text(&value.to_string(), out),
    }
}

fn write_text(text: &str, out: &mut bytes::BytesMut) -> Result<IsNull, BoxError> {
    out.extend_from_slice(text.as_bytes());
    Ok(IsNull::No)
}

/// Type-directed encoding: the argument's tag picks the conversion, the parameter type the
/// server inferred for that position picks the wire form.
///
/// Numbers bound to integer or float parameters go out in binary at the parameter's width.
/// Everything else (text arguments, numbers bound to NUMERIC, text or other types) goes out in
/// the text format, so the server's own input function parses it.
impl ToSql for Param {
    fn to_sql(&self, ty: &Type, out: &mut bytes::BytesMut) -> Result<IsNull, BoxError> {
        match self {
            Param::Int(i) => integer_to_sql(i64::from(*i), ty, out),
            Param::BigInt(i) => integer_to_sql(*i, ty, out),
            Param::Float(f) => match *ty {
                Type::FLOAT8 => f.to_sql(ty, out),
                #[allow(clippy::cast_possible_truncation)]
                Type::FLOAT4 => (*f as f32).to_sql(ty, out),
                Type::INT2 | Type::INT4 | Type::INT8 => Err(wrong_type(self, ty)),
                _ => write_text(&float_literal(*f), out),
            },
            Param::Text(bytes) => write_text(&sanitize_text(bytes), out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    fn encode_format(&self, ty: &Type) -> Format {
        match self {
            Param::Text(_) => Format::Text,
            _ if is_binary_number(ty) => Format::Binary,
            _ => Format::Text,
        }
    }

    to_sql_checked!();
}
