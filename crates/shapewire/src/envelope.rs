//! The 9-byte header every encoded value carries ahead of its body: one
//! version byte, then the schema's 64-bit structural fingerprint written
//! big-endian (§4.3). The body that follows uses little-endian multi-byte
//! numerics throughout, so the envelope's endianness is a deliberate,
//! visible break from the rest of the format rather than an oversight.

use shapewire_wire::{ByteReader, ByteWriter};

use crate::error::{malformed, CodecError};

pub const PROTOCOL_VERSION: u8 = 1;
pub const ENVELOPE_LEN: usize = 9;

pub fn write_envelope(writer: &mut ByteWriter, fingerprint: u64) {
    writer.write_u8(PROTOCOL_VERSION);
    writer.write_bytes(&fingerprint.to_be_bytes());
}

/// Consumes the envelope from the front of `reader` and checks it against
/// `expected_fingerprint`. Returns `Ok(())` once both checks pass, leaving
/// the cursor positioned at the start of the body.
pub fn read_envelope(reader: &mut ByteReader, expected_fingerprint: u64) -> Result<(), CodecError> {
    let version = reader.read_u8().map_err(malformed)?;
    if version != PROTOCOL_VERSION {
        return Err(CodecError::ProtocolMismatch {
            expected: PROTOCOL_VERSION,
            found: version,
        });
    }

    let fp_bytes = reader.read_slice(8).map_err(malformed)?;
    let mut arr = [0u8; 8];
    arr.copy_from_slice(fp_bytes);
    let found = u64::from_be_bytes(arr);

    if found != expected_fingerprint {
        return Err(CodecError::SchemaMismatch {
            expected: expected_fingerprint,
            found,
        });
    }

    Ok(())
}
