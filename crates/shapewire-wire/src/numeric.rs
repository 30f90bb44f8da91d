//! Numeric narrowing: picks the smallest wire subtype that exactly
//! represents an integer, and reads/writes the fixed-width payloads for
//! each subtype. Mirrors the bit-packer's job of choosing the tightest
//! encoding for a value, just done once per number instead of once per
//! declared bit-width.

use crate::cursor::{ByteReader, ByteWriter};
use crate::error::WireError;
use crate::header::numeric_subtype as subtype;

/// The largest integer magnitude a double can represent exactly. Integers
/// outside this range still encode correctly (as i64) but lose the ability
/// to round-trip through a float-based host language without precision
/// loss, hence the non-fatal diagnostic the caller is expected to emit.
pub const MAX_SAFE_INTEGER: i64 = (1i64 << 53) - 1;
pub const MIN_SAFE_INTEGER: i64 = -((1i64 << 53) - 1);

/// Returns the narrowest integer subtype that exactly represents `n`.
pub fn narrow_int_subtype(n: i64) -> u8 {
    if n >= i8::MIN as i64 && n <= i8::MAX as i64 {
        subtype::I8
    } else if n >= i16::MIN as i64 && n <= i16::MAX as i64 {
        subtype::I16
    } else if n >= i32::MIN as i64 && n <= i32::MAX as i64 {
        subtype::I32
    } else {
        subtype::I64
    }
}

/// True when `n` falls outside the range a double can represent exactly;
/// the caller should surface a diagnostic warning (not a failure) when
/// this holds and the value is still encoded as a plain (non-bigint) i64.
pub fn exceeds_safe_integer_range(n: i64) -> bool {
    n > MAX_SAFE_INTEGER || n < MIN_SAFE_INTEGER
}

pub fn write_int_payload(writer: &mut ByteWriter, subtype: u8, n: i64) {
    match subtype {
        self::subtype::I8 => writer.write_u8(n as i8 as u8),
        self::subtype::I16 => writer.write_bytes(&(n as i16).to_le_bytes()),
        self::subtype::I32 => writer.write_bytes(&(n as i32).to_le_bytes()),
        self::subtype::I64 | self::subtype::BIGINT_I64 => writer.write_i64_le(n),
        other => unreachable!("write_int_payload called with non-integer subtype {other:#x}"),
    }
}

pub fn read_int_payload(reader: &mut ByteReader, subtype: u8) -> Result<i64, WireError> {
    match subtype {
        self::subtype::I8 => Ok(reader.read_u8()? as i8 as i64),
        self::subtype::I16 => {
            let slice = reader.read_slice(2)?;
            Ok(i16::from_le_bytes([slice[0], slice[1]]) as i64)
        }
        self::subtype::I32 => {
            let slice = reader.read_slice(4)?;
            Ok(i32::from_le_bytes([slice[0], slice[1], slice[2], slice[3]]) as i64)
        }
        self::subtype::I64 | self::subtype::BIGINT_I64 => reader.read_i64_le(),
        other => Err(WireError::UnknownNumericSubtype(other)),
    }
}
