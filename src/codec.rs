// GSM 03.40 codec helpers - shared encoding traits and byte-level utilities
//
// This module holds the pieces every wire structure in the crate relies on:
// the `Encodable` trait, the codec error type, hex conversion for the AT
// command channel, and GSM 7-bit septet packing.

use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;

/// Trait for types that can be encoded to bytes
pub trait Encodable {
    /// Encode this value into the buffer
    fn encode(&self, buf: &mut BytesMut) -> Result<(), CodecError>;

    /// Calculate the encoded size without actually encoding
    fn encoded_size(&self) -> usize {
        let mut buf = BytesMut::new();
        self.encode(&mut buf).map(|_| buf.len()).unwrap_or(0)
    }

    /// Convert this value to bytes (convenience method)
    fn to_bytes(&self) -> Result<Bytes, CodecError> {
        let mut buf = BytesMut::with_capacity(self.encoded_size());
        self.encode(&mut buf)?;
        Ok(buf.freeze())
    }
}

/// Codec errors with detailed context for debugging
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Incomplete data: need more bytes")]
    Incomplete,

    #[error("Field '{field}' validation failed: {reason}")]
    FieldValidation { field: &'static str, reason: String },

    #[error("Invalid concatenation info: part {part_index} of {total_parts}")]
    InvalidConcatInfo { total_parts: u8, part_index: u8 },

    #[error("Information element too long: {length} octets (max 255)")]
    ElementTooLong { length: usize },

    #[error("Invalid hex string: {0}")]
    Hex(#[from] hex::FromHexError),
}

/// Encode bytes as upper-case hex, two characters per octet, no separators
pub fn encode_hex(data: &[u8]) -> String {
    hex::encode_upper(data)
}

/// Decode a hex string (either case) into bytes
pub fn decode_hex(text: &str) -> Result<Bytes, CodecError> {
    Ok(Bytes::from(hex::decode(text.trim())?))
}

/// Number of fill bits needed after `udh_octets` so septets start on a
/// septet boundary.
pub fn septet_fill_bits(udh_octets: usize) -> u32 {
    ((7 - (udh_octets * 8) % 7) % 7) as u32
}

/// Number of septets occupied by a UDH of `udh_octets` including fill bits.
pub fn udh_septets(udh_octets: usize) -> usize {
    (udh_octets * 8).div_ceil(7)
}

/// Pack 7-bit septet values into octets, LSB first.
///
/// `fill_bits` zero bits are emitted before the first septet. This is used
/// when a user data header precedes the text, so the first character starts
/// on a septet boundary as required by GSM 03.40.
pub fn pack_septets(buf: &mut BytesMut, septets: &[u8], fill_bits: u32) {
    let mut acc: u32 = 0;
    let mut bits = fill_bits;

    for &septet in septets {
        acc |= u32::from(septet & 0x7F) << bits;
        bits += 7;
        while bits >= 8 {
            buf.put_u8((acc & 0xFF) as u8);
            acc >>= 8;
            bits -= 8;
        }
    }

    if bits > 0 {
        buf.put_u8((acc & 0xFF) as u8);
    }
}

/// Unpack `count` septets from packed octets, skipping `fill_bits` first.
pub fn unpack_septets(data: &[u8], fill_bits: u32, count: usize) -> Result<Vec<u8>, CodecError> {
    let needed_bits = fill_bits as usize + count * 7;
    if data.len() * 8 < needed_bits {
        return Err(CodecError::Incomplete);
    }

    let mut septets = Vec::with_capacity(count);
    for i in 0..count {
        let bit = fill_bits as usize + i * 7;
        let byte = bit / 8;
        let shift = bit % 8;
        let mut value = u16::from(data[byte]) >> shift;
        if shift > 1 {
            value |= u16::from(data[byte + 1]) << (8 - shift);
        }
        septets.push((value & 0x7F) as u8);
    }
    Ok(septets)
}
