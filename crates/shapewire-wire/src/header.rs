//! Tagged-header bit layouts: the 3-bit type tag occupies the high bits of
//! every first header byte, with family-specific subtag and length bits
//! below it. Every function here packs or unpacks a handful of bits within
//! one to three header bytes — the same shift-and-mask style the fragment
//! assembler used for wire fields, just applied to fixed bit positions
//! instead of schema-declared ones.

use crate::error::WireError;

pub const TAG_NUMERIC: u8 = 0b000;
pub const TAG_STRING: u8 = 0b001;
pub const TAG_OBJECT: u8 = 0b010;
pub const TAG_DATE: u8 = 0b011;
pub const TAG_ARRAY: u8 = 0b100;
pub const TAG_UNION: u8 = 0b101;
pub const TAG_MAP: u8 = 0b110;
pub const TAG_RESERVED: u8 = 0b111;

/// Extracts the 3-bit type tag from a header's first byte.
pub fn tag_of(header0: u8) -> u8 {
    (header0 >> 5) & 0b111
}

// ---------------------------------------------------------------- numeric

pub mod numeric_subtype {
    pub const I8: u8 = 0x0;
    pub const F64: u8 = 0x1;
    pub const I16: u8 = 0x2;
    pub const I32: u8 = 0x3;
    pub const BIGINT_I64: u8 = 0x4;
    pub const I64: u8 = 0x5;
    pub const NAN: u8 = 0x6;
    pub const POS_INF: u8 = 0x7;
    pub const NEG_INF: u8 = 0x8;
    pub const TRUE: u8 = 0x9;
    pub const FALSE: u8 = 0xA;
}

pub fn pack_numeric_header(subtype: u8) -> u8 {
    (TAG_NUMERIC << 5) | (subtype & 0x0F)
}

pub fn unpack_numeric_subtype(header0: u8) -> u8 {
    header0 & 0x0F
}

// ----------------------------------------------------------------- string

pub const STRING_SHORT_MAX: usize = 1 << 12; // 4096
pub const STRING_LONG_MAX: usize = 1 << 20; // 1 MiB

/// Packs a string header. Returns the header bytes (2 for short form, 3 for
/// long form); the caller appends the UTF-8 payload after these bytes.
pub fn pack_string_header(len: usize) -> Result<Vec<u8>, WireError> {
    if len < STRING_SHORT_MAX {
        let high_nibble = ((len >> 8) & 0x0F) as u8;
        let low_byte = (len & 0xFF) as u8;
        let header0 = (TAG_STRING << 5) | high_nibble;
        Ok(vec![header0, low_byte])
    } else if len < STRING_LONG_MAX {
        let top_nibble = ((len >> 16) & 0x0F) as u8;
        let mid_byte = ((len >> 8) & 0xFF) as u8;
        let low_byte = (len & 0xFF) as u8;
        let header0 = (TAG_STRING << 5) | 0b1_0000 | top_nibble;
        Ok(vec![header0, mid_byte, low_byte])
    } else {
        Err(WireError::LengthOutOfRange {
            len,
            max: STRING_LONG_MAX,
        })
    }
}

/// Reads a string length given the first header byte already consumed.
/// Returns the decoded length; caller must read that many payload bytes.
pub fn read_string_len(reader: &mut crate::cursor::ByteReader, header0: u8) -> Result<usize, WireError> {
    let long_form = (header0 & 0b1_0000) != 0;
    let nibble = (header0 & 0x0F) as usize;

    if long_form {
        let mid = reader.read_u8()? as usize;
        let low = reader.read_u8()? as usize;
        Ok((nibble << 16) | (mid << 8) | low)
    } else {
        let low = reader.read_u8()? as usize;
        Ok((nibble << 8) | low)
    }
}

// ------------------------------------------------------------------- date

pub fn pack_date_header() -> u8 {
    TAG_DATE << 5
}

// ------------------------------------------------------ object/null/undef

pub mod object_subtag {
    pub const OBJECT: u8 = 0b00;
    pub const NULL: u8 = 0b01;
    pub const UNDEFINED: u8 = 0b10;
    pub const ABSENT: u8 = 0b11;
}

/// The sentinel byte meaning "this optional field's key was absent from the
/// source record". Distinct from a field carrying an explicit `undefined`.
pub const ABSENT_OPTIONAL_MARKER: u8 = 0x4C;

pub fn pack_object_header(subtag: u8) -> u8 {
    (TAG_OBJECT << 5) | ((subtag & 0b11) << 2)
}

pub fn unpack_object_subtag(header0: u8) -> u8 {
    (header0 >> 2) & 0b11
}

// ------------------------------------------------------------------ union

pub const UNION_MAX_OPTIONS: usize = 32;

pub fn pack_union_header(option_index: u8) -> Result<u8, WireError> {
    if option_index as usize >= UNION_MAX_OPTIONS {
        return Err(WireError::LengthOutOfRange {
            len: option_index as usize,
            max: UNION_MAX_OPTIONS - 1,
        });
    }
    Ok((TAG_UNION << 5) | (option_index & 0b1_1111))
}

pub fn unpack_union_index(header0: u8) -> u8 {
    header0 & 0b1_1111
}

// ----------------------------------------------------- array/tuple/set

pub const ARRAY_SHORT_MAX: usize = 1 << 3; // 8
pub const ARRAY_MID_MAX: usize = 1 << 11; // 2048
pub const ARRAY_LONG_MAX: usize = 1 << 19; // 524288

/// Packs an array/tuple/set length header. Returns 1, 2, or 3 header bytes.
pub fn pack_array_header(len: usize) -> Result<Vec<u8>, WireError> {
    if len < ARRAY_SHORT_MAX {
        Ok(vec![(TAG_ARRAY << 5) | (len as u8 & 0b111)])
    } else if len < ARRAY_MID_MAX {
        let top3 = ((len >> 8) & 0b111) as u8;
        let low8 = (len & 0xFF) as u8;
        Ok(vec![(TAG_ARRAY << 5) | (0b01 << 3) | top3, low8])
    } else if len < ARRAY_LONG_MAX {
        let top3 = ((len >> 16) & 0b111) as u8;
        let mid8 = ((len >> 8) & 0xFF) as u8;
        let low8 = (len & 0xFF) as u8;
        Ok(vec![(TAG_ARRAY << 5) | (0b10 << 3) | top3, mid8, low8])
    } else {
        Err(WireError::LengthOutOfRange {
            len,
            max: ARRAY_LONG_MAX,
        })
    }
}

pub fn read_array_len(reader: &mut crate::cursor::ByteReader, header0: u8) -> Result<usize, WireError> {
    let form = (header0 >> 3) & 0b11;
    let low3 = (header0 & 0b111) as usize;

    match form {
        0b00 => Ok(low3),
        0b01 => {
            let low8 = reader.read_u8()? as usize;
            Ok((low3 << 8) | low8)
        }
        0b10 => {
            let mid8 = reader.read_u8()? as usize;
            let low8 = reader.read_u8()? as usize;
            Ok((low3 << 16) | (mid8 << 8) | low8)
        }
        _ => Err(WireError::ReservedLengthTag),
    }
}

// ------------------------------------------------------------- map/record

pub const MAP_MID_MAX: usize = 1 << 11; // 2048
pub const MAP_LONG_MAX: usize = 1 << 19; // 524288

pub fn pack_map_header(is_map: bool, len: usize) -> Result<Vec<u8>, WireError> {
    let kind_bit: u8 = if is_map { 1 } else { 0 };

    if len < MAP_MID_MAX {
        let top3 = ((len >> 8) & 0b111) as u8;
        let low8 = (len & 0xFF) as u8;
        Ok(vec![
            (TAG_MAP << 5) | (kind_bit << 4) | top3,
            low8,
        ])
    } else if len < MAP_LONG_MAX {
        let top3 = ((len >> 16) & 0b111) as u8;
        let mid8 = ((len >> 8) & 0xFF) as u8;
        let low8 = (len & 0xFF) as u8;
        Ok(vec![
            (TAG_MAP << 5) | (kind_bit << 4) | (1 << 3) | top3,
            mid8,
            low8,
        ])
    } else {
        Err(WireError::LengthOutOfRange {
            len,
            max: MAP_LONG_MAX,
        })
    }
}

pub fn unpack_map_is_map(header0: u8) -> bool {
    (header0 & 0b1_0000) != 0
}

pub fn read_map_len(reader: &mut crate::cursor::ByteReader, header0: u8) -> Result<usize, WireError> {
    let long_form = (header0 & 0b1000) != 0;
    let top3 = (header0 & 0b111) as usize;

    if long_form {
        let mid8 = reader.read_u8()? as usize;
        let low8 = reader.read_u8()? as usize;
        Ok((top3 << 16) | (mid8 << 8) | low8)
    } else {
        let low8 = reader.read_u8()? as usize;
        Ok((top3 << 8) | low8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::ByteReader;

    #[test]
    fn numeric_header_roundtrip() {
        let header = pack_numeric_header(numeric_subtype::I8);
        assert_eq!(header, 0x00);
        assert_eq!(unpack_numeric_subtype(header), numeric_subtype::I8);
    }

    #[test]
    fn string_short_header_matches_spec_example() {
        // schema = string, value = "hi" -> header 0x20, length byte 0x02
        let bytes = pack_string_header(2).unwrap();
        assert_eq!(bytes, vec![0x20, 0x02]);

        let mut r = ByteReader::new(&[0x02]);
        assert_eq!(read_string_len(&mut r, 0x20).unwrap(), 2);
    }

    #[test]
    fn string_long_form_roundtrip() {
        let len = 70_000;
        let bytes = pack_string_header(len).unwrap();
        assert_eq!(bytes.len(), 3);
        let mut r = ByteReader::new(&bytes[1..]);
        assert_eq!(read_string_len(&mut r, bytes[0]).unwrap(), len);
    }

    #[test]
    fn object_absent_marker_is_0x4c() {
        assert_eq!(pack_object_header(object_subtag::ABSENT), ABSENT_OPTIONAL_MARKER);
    }

    #[test]
    fn union_header_matches_spec_example() {
        // union header 0xA1 (tag 5, index 1)
        assert_eq!(pack_union_header(1).unwrap(), 0xA1);
        assert_eq!(unpack_union_index(0xA1), 1);
    }

    #[test]
    fn union_rejects_overflow_index() {
        assert!(pack_union_header(32).is_err());
    }

    #[test]
    fn array_header_matches_spec_example() {
        // 8 elements forces mid-length form: header 0x88, length byte 0x08
        let bytes = pack_array_header(8).unwrap();
        assert_eq!(bytes, vec![0x88, 0x08]);

        let mut r = ByteReader::new(&[0x08]);
        assert_eq!(read_array_len(&mut r, 0x88).unwrap(), 8);
    }

    #[test]
    fn array_short_form_single_byte() {
        let bytes = pack_array_header(3).unwrap();
        assert_eq!(bytes, vec![(TAG_ARRAY << 5) | 0b011]);
    }

    #[test]
    fn array_reserved_form_rejected_on_read() {
        let header0 = (TAG_ARRAY << 5) | (0b11 << 3);
        let mut r = ByteReader::new(&[]);
        assert_eq!(
            read_array_len(&mut r, header0).unwrap_err(),
            WireError::ReservedLengthTag
        );
    }

    #[test]
    fn map_header_roundtrip_record_and_map() {
        let bytes = pack_map_header(false, 5).unwrap();
        assert_eq!(bytes.len(), 2);
        assert!(!unpack_map_is_map(bytes[0]));
        let mut r = ByteReader::new(&bytes[1..]);
        assert_eq!(read_map_len(&mut r, bytes[0]).unwrap(), 5);

        let bytes = pack_map_header(true, 5).unwrap();
        assert!(unpack_map_is_map(bytes[0]));
    }

    #[test]
    fn map_header_long_form() {
        let len = 100_000;
        let bytes = pack_map_header(true, len).unwrap();
        assert_eq!(bytes.len(), 3);
        let mut r = ByteReader::new(&bytes[1..]);
        assert_eq!(read_map_len(&mut r, bytes[0]).unwrap(), len);
    }

    #[test]
    fn tag_of_extracts_high_bits() {
        assert_eq!(tag_of(pack_date_header()), TAG_DATE);
    }
}
