// ABOUTME: One outbound SMS segment: SMSC field, data coding and user data (UDH + payload)
// ABOUTME: Produced by the splitter and consumed once by a send transaction

use crate::codec::CodecError;
use crate::datatypes::{ConcatInfo, DataCoding, UdhElement, parse_udh};
use bytes::Bytes;

/// A single protocol data unit ready to be wrapped into an SMS-SUBMIT
///
/// `tpdu` holds the user data: the UDH length byte and UDH elements (when
/// any are present) followed by the segment's payload. For the 7-bit
/// alphabet the payload is still one septet value per byte; packing happens
/// when the SMS-SUBMIT is encoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pdu {
    /// SMSC information field (`[0x00]` selects the modem's stored SMSC)
    pub smsc_address: Bytes,
    /// Data coding scheme of the payload
    pub data_coding: DataCoding,
    /// User data: `[UDHL][UDH...]` then payload
    pub tpdu: Bytes,
    udh_length: usize,
}

impl Pdu {
    pub(crate) fn new(
        smsc_address: Bytes,
        data_coding: DataCoding,
        tpdu: Bytes,
        udh_length: usize,
    ) -> Self {
        Self {
            smsc_address,
            data_coding,
            tpdu,
            udh_length,
        }
    }

    /// Returns true if the user data starts with a header
    pub fn has_udh(&self) -> bool {
        self.udh_length > 0
    }

    /// The header bytes including the UDHL byte, empty when absent
    pub fn udh(&self) -> &[u8] {
        &self.tpdu[..self.udh_length]
    }

    /// The payload slice carried by this segment
    pub fn payload(&self) -> &[u8] {
        &self.tpdu[self.udh_length..]
    }

    /// Decoded header elements, empty when absent
    pub fn udh_elements(&self) -> Result<Vec<UdhElement>, CodecError> {
        if !self.has_udh() {
            return Ok(Vec::new());
        }
        parse_udh(self.udh())
    }

    /// Concatenation info of this segment, if it is part of a multi-part message
    pub fn concat_info(&self) -> Option<ConcatInfo> {
        self.udh_elements()
            .ok()?
            .iter()
            .find_map(UdhElement::concat_info)
    }
}
