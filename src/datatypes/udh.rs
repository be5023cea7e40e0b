// ABOUTME: GSM 03.40 User Data Header information elements for port addressing and concatenation
// ABOUTME: Builds and parses the [UDHL][IEI][IEDL][data...] layout carried ahead of the payload

use crate::codec::{CodecError, Encodable};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use num_enum::TryFromPrimitive;
use std::io::Cursor;

/// Encoded size of an 8-bit reference concatenation element (IEI + IEDL + 3)
pub const CONCAT_ELEMENT_SIZE: usize = 5;

/// Information element identifiers understood by this crate
#[derive(TryFromPrimitive)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InformationElementId {
    Concatenated8Bit = 0x00,
    ApplicationPort8Bit = 0x04,
    ApplicationPort16Bit = 0x05,
    Concatenated16Bit = 0x08,
}

/// Concatenation metadata shared by the segments of one multi-part message
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ConcatInfo {
    /// Reference number, identical across all segments of a message
    pub reference: u8,
    /// Total number of segments
    pub total_parts: u8,
    /// 1-based index of this segment
    pub part_index: u8,
}

impl ConcatInfo {
    /// Create concatenation info, enforcing `1 <= part_index <= total_parts`
    pub fn new(reference: u8, total_parts: u8, part_index: u8) -> Result<Self, CodecError> {
        if part_index == 0 || part_index > total_parts {
            return Err(CodecError::InvalidConcatInfo {
                total_parts,
                part_index,
            });
        }
        Ok(Self {
            reference,
            total_parts,
            part_index,
        })
    }
}

/// A single UDH information element
///
/// Elements are immutable once built. Identifiers this crate does not know
/// are kept as raw bytes so a parsed header can be re-encoded unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UdhElement {
    iei: u8,
    data: Bytes,
}

impl UdhElement {
    /// Create an arbitrary information element
    pub fn new(iei: u8, data: impl Into<Bytes>) -> Result<Self, CodecError> {
        let data = data.into();
        if data.len() > u8::MAX as usize {
            return Err(CodecError::ElementTooLong { length: data.len() });
        }
        Ok(Self { iei, data })
    }

    /// Application port addressing scheme, 16-bit ports (IEI 0x05)
    pub fn application_port_16bit(dest_port: u16, origin_port: u16) -> Self {
        let mut data = BytesMut::with_capacity(4);
        data.put_u16(dest_port);
        data.put_u16(origin_port);
        Self {
            iei: InformationElementId::ApplicationPort16Bit as u8,
            data: data.freeze(),
        }
    }

    /// Application port addressing scheme, 8-bit ports (IEI 0x04)
    pub fn application_port_8bit(dest_port: u8, origin_port: u8) -> Self {
        Self {
            iei: InformationElementId::ApplicationPort8Bit as u8,
            data: Bytes::copy_from_slice(&[dest_port, origin_port]),
        }
    }

    /// Concatenated short message, 8-bit reference number (IEI 0x00)
    pub fn concatenation(info: ConcatInfo) -> Self {
        Self {
            iei: InformationElementId::Concatenated8Bit as u8,
            data: Bytes::copy_from_slice(&[info.reference, info.total_parts, info.part_index]),
        }
    }

    /// Raw information element identifier
    pub fn iei(&self) -> u8 {
        self.iei
    }

    /// Known element kind, if the identifier is recognized
    pub fn kind(&self) -> Option<InformationElementId> {
        InformationElementId::try_from(self.iei).ok()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Concatenation info carried by an 8-bit reference element
    pub fn concat_info(&self) -> Option<ConcatInfo> {
        match (self.kind(), &self.data[..]) {
            (Some(InformationElementId::Concatenated8Bit), &[reference, total, index]) => {
                ConcatInfo::new(reference, total, index).ok()
            }
            _ => None,
        }
    }

    /// `(destination, origin)` ports carried by a port addressing element
    pub fn application_ports(&self) -> Option<(u16, u16)> {
        match (self.kind(), &self.data[..]) {
            (Some(InformationElementId::ApplicationPort16Bit), &[d1, d2, o1, o2]) => Some((
                u16::from_be_bytes([d1, d2]),
                u16::from_be_bytes([o1, o2]),
            )),
            (Some(InformationElementId::ApplicationPort8Bit), &[dest, origin]) => {
                Some((u16::from(dest), u16::from(origin)))
            }
            _ => None,
        }
    }
}

impl Encodable for UdhElement {
    fn encode(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        buf.put_u8(self.iei);
        buf.put_u8(self.data.len() as u8);
        buf.put_slice(&self.data);
        Ok(())
    }

    fn encoded_size(&self) -> usize {
        2 + self.data.len()
    }
}

/// Total UDH octets for `elements`, including the UDHL byte.
///
/// An empty element list produces no header at all.
pub fn udh_overhead(elements: &[UdhElement]) -> usize {
    if elements.is_empty() {
        return 0;
    }
    1 + elements.iter().map(Encodable::encoded_size).sum::<usize>()
}

/// Encode `[UDHL][elements...]`; writes nothing for an empty list.
pub fn encode_udh(buf: &mut BytesMut, elements: &[UdhElement]) -> Result<(), CodecError> {
    if elements.is_empty() {
        return Ok(());
    }

    let udhl = udh_overhead(elements) - 1;
    let udhl = u8::try_from(udhl).map_err(|_| CodecError::FieldValidation {
        field: "udhl",
        reason: format!("user data header of {udhl} octets exceeds 255"),
    })?;

    buf.put_u8(udhl);
    for element in elements {
        element.encode(buf)?;
    }
    Ok(())
}

/// Parse a UDH (starting with its UDHL byte) into its elements
pub fn parse_udh(data: &[u8]) -> Result<Vec<UdhElement>, CodecError> {
    let mut buf = Cursor::new(data);
    if !buf.has_remaining() {
        return Err(CodecError::Incomplete);
    }

    let udhl = buf.get_u8() as usize;
    if buf.remaining() < udhl {
        return Err(CodecError::Incomplete);
    }

    let mut header = Cursor::new(&data[1..1 + udhl]);
    let mut elements = Vec::new();
    while header.has_remaining() {
        if header.remaining() < 2 {
            return Err(CodecError::Incomplete);
        }
        let iei = header.get_u8();
        let length = header.get_u8() as usize;
        if header.remaining() < length {
            return Err(CodecError::Incomplete);
        }
        let data = header.copy_to_bytes(length);
        elements.push(UdhElement { iei, data });
    }
    Ok(elements)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_addressing_layout() {
        let element = UdhElement::application_port_16bit(0x1581, 0);
        assert_eq!(element.kind(), Some(InformationElementId::ApplicationPort16Bit));
        assert_eq!(
            element.to_bytes().unwrap().as_ref(),
            &[0x05, 0x04, 0x15, 0x81, 0x00, 0x00]
        );
        assert_eq!(element.application_ports(), Some((5505, 0)));
    }

    #[test]
    fn test_8bit_port_addressing_layout() {
        let element = UdhElement::application_port_8bit(0xF5, 0x10);
        assert_eq!(element.to_bytes().unwrap().as_ref(), &[0x04, 0x02, 0xF5, 0x10]);
        assert_eq!(element.application_ports(), Some((0xF5, 0x10)));
    }

    #[test]
    fn test_concatenation_layout() {
        let info = ConcatInfo::new(0x2A, 3, 2).unwrap();
        let element = UdhElement::concatenation(info);
        assert_eq!(element.encoded_size(), CONCAT_ELEMENT_SIZE);
        assert_eq!(
            element.to_bytes().unwrap().as_ref(),
            &[0x00, 0x03, 0x2A, 0x03, 0x02]
        );
        assert_eq!(element.concat_info(), Some(info));
    }

    #[test]
    fn test_concat_info_rejects_out_of_range() {
        assert!(ConcatInfo::new(1, 3, 0).is_err());
        assert!(ConcatInfo::new(1, 3, 4).is_err());
        assert!(ConcatInfo::new(1, 0, 0).is_err());
        assert!(ConcatInfo::new(1, 255, 255).is_ok());
    }

    #[test]
    fn test_element_too_long() {
        let result = UdhElement::new(0x20, vec![0u8; 256]);
        assert!(matches!(result, Err(CodecError::ElementTooLong { length: 256 })));
    }

    #[test]
    fn test_overhead_and_encoding() {
        let elements = vec![
            UdhElement::application_port_16bit(2948, 9200),
            UdhElement::concatenation(ConcatInfo::new(7, 2, 1).unwrap()),
        ];
        assert_eq!(udh_overhead(&elements), 12);
        assert_eq!(udh_overhead(&[]), 0);

        let mut buf = BytesMut::new();
        encode_udh(&mut buf, &elements).unwrap();
        assert_eq!(buf.len(), 12);
        assert_eq!(buf[0], 11);
        // port addressing precedes concatenation
        assert_eq!(buf[1], 0x05);
        assert_eq!(buf[7], 0x00);
    }

    #[test]
    fn test_encode_empty_udh_writes_nothing() {
        let mut buf = BytesMut::new();
        encode_udh(&mut buf, &[]).unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn test_parse_udh_recovers_elements() {
        let elements = vec![
            UdhElement::application_port_8bit(1, 2),
            UdhElement::new(0x24, vec![0xAA]).unwrap(),
        ];
        let mut buf = BytesMut::new();
        encode_udh(&mut buf, &elements).unwrap();
        assert_eq!(parse_udh(&buf).unwrap(), elements);
        assert_eq!(elements[1].kind(), None);
    }

    #[test]
    fn test_parse_truncated_udh() {
        assert!(matches!(parse_udh(&[]), Err(CodecError::Incomplete)));
        assert!(matches!(parse_udh(&[0x05, 0x00, 0x03]), Err(CodecError::Incomplete)));
        assert!(matches!(
            parse_udh(&[0x03, 0x00, 0x03, 0x01]),
            Err(CodecError::Incomplete)
        ));
    }
}
