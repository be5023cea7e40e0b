// ABOUTME: Wraps one split PDU into a complete GSM 03.40 SMS-SUBMIT TPDU for AT+CMGS
// ABOUTME: Sets the UDHI flag, encodes the destination address and packs 7-bit user data

use crate::codec::{CodecError, pack_septets, septet_fill_bits, udh_septets};
use crate::datatypes::{Address, Alphabet, Pdu};
use bytes::{BufMut, Bytes, BytesMut};

/// TP-MTI for SMS-SUBMIT
const MTI_SUBMIT: u8 = 0x01;
/// TP-VPF, relative validity period present
const VPF_RELATIVE: u8 = 0x10;
/// TP-SRR, status report requested
const SRR: u8 = 0x20;
/// TP-UDHI, user data starts with a header
const UDHI: u8 = 0x40;

/// Maximum TP-UDL for the 7-bit alphabet, in septets
const MAX_SEPTETS: usize = 160;

/// SMS-SUBMIT header fields shared by every segment of a message
///
/// ```text
/// [first octet][TP-MR][TP-DA][TP-PID][TP-DCS][TP-VP?][TP-UDL][TP-UD]
/// ```
///
/// TP-MR is always 0; the modem assigns the real reference and reports it
/// in the `+CMGS` response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SmsSubmit {
    destination: Address,
    protocol_id: u8,
    status_report_request: bool,
    validity: Option<u8>,
}

impl SmsSubmit {
    pub fn new(destination: Address) -> Self {
        Self {
            destination,
            protocol_id: 0x00,
            status_report_request: false,
            validity: None,
        }
    }

    /// Request a delivery status report
    pub fn with_status_report(mut self, requested: bool) -> Self {
        self.status_report_request = requested;
        self
    }

    /// TP-PID, 0x00 for ordinary short messages
    pub fn with_protocol_id(mut self, protocol_id: u8) -> Self {
        self.protocol_id = protocol_id;
        self
    }

    /// Relative TP-VP value, `None` omits the field
    pub fn with_validity(mut self, validity: Option<u8>) -> Self {
        self.validity = validity;
        self
    }

    pub fn destination(&self) -> &Address {
        &self.destination
    }

    /// Encode the SMS-SUBMIT TPDU carrying `pdu`'s user data.
    ///
    /// The SMSC field is not included; it is sent separately ahead of the
    /// TPDU and excluded from the AT+CMGS length.
    pub fn encode(&self, pdu: &Pdu) -> Result<Bytes, CodecError> {
        let mut buf = BytesMut::with_capacity(32 + pdu.tpdu.len());

        let mut first_octet = MTI_SUBMIT;
        if self.validity.is_some() {
            first_octet |= VPF_RELATIVE;
        }
        if self.status_report_request {
            first_octet |= SRR;
        }
        if pdu.has_udh() {
            first_octet |= UDHI;
        }

        buf.put_u8(first_octet);
        buf.put_u8(0x00);
        self.destination.encode_destination(&mut buf);
        buf.put_u8(self.protocol_id);
        buf.put_u8(pdu.data_coding.to_byte());
        if let Some(validity) = self.validity {
            buf.put_u8(validity);
        }

        match pdu.data_coding.alphabet() {
            Alphabet::Gsm7 => encode_septet_user_data(&mut buf, pdu)?,
            Alphabet::Octet | Alphabet::Ucs2 => {
                let udl = u8::try_from(pdu.tpdu.len()).map_err(|_| CodecError::FieldValidation {
                    field: "user_data",
                    reason: format!("{} octets of user data exceeds 255", pdu.tpdu.len()),
                })?;
                buf.put_u8(udl);
                buf.put_slice(&pdu.tpdu);
            }
        }

        Ok(buf.freeze())
    }
}

fn encode_septet_user_data(buf: &mut BytesMut, pdu: &Pdu) -> Result<(), CodecError> {
    let udh = pdu.udh();
    let septets = pdu.payload();
    if let Some(position) = septets.iter().position(|&septet| septet > 0x7F) {
        return Err(CodecError::FieldValidation {
            field: "user_data",
            reason: format!(
                "byte 0x{:02X} at offset {position} is not a 7-bit septet",
                septets[position]
            ),
        });
    }
    let udl = udh_septets(udh.len()) + septets.len();
    if udl > MAX_SEPTETS {
        return Err(CodecError::FieldValidation {
            field: "user_data",
            reason: format!("{udl} septets of user data exceeds {MAX_SEPTETS}"),
        });
    }

    buf.put_u8(udl as u8);
    buf.put_slice(udh);
    pack_septets(buf, septets, septet_fill_bits(udh.len()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{encode_hex, unpack_septets};
    use crate::datatypes::{DataCoding, UdhElement};
    use crate::splitter::{PduSplitter, ReferenceCounter};

    fn destination() -> Address {
        Address::new("+46708251358").unwrap()
    }

    #[test]
    fn test_plain_7bit_submit_known_vector() {
        let pdus = PduSplitter::new()
            .split(DataCoding::Gsm7Bit, &[], b"hellohello")
            .unwrap();
        let tpdu = SmsSubmit::new(destination())
            .with_validity(Some(0xAA))
            .encode(&pdus[0])
            .unwrap();
        assert_eq!(encode_hex(&tpdu), "11000B916407281553F80000AA0AE8329BFD4697D9EC37");
    }

    #[test]
    fn test_8bit_submit_with_udh_sets_udhi() {
        let port = UdhElement::application_port_16bit(0x1581, 0);
        let pdus = PduSplitter::new()
            .split(DataCoding::EightBit, &[port], &[0x02, 0x4A])
            .unwrap();
        let tpdu = SmsSubmit::new(Address::new("1234").unwrap())
            .encode(&pdus[0])
            .unwrap();
        assert_eq!(
            encode_hex(&tpdu),
            "41000481214300040906050415810000024A"
        );
    }

    #[test]
    fn test_status_report_flag() {
        let pdus = PduSplitter::new().split(DataCoding::EightBit, &[], &[1]).unwrap();
        let tpdu = SmsSubmit::new(destination())
            .with_status_report(true)
            .encode(&pdus[0])
            .unwrap();
        assert_eq!(tpdu[0], 0x21);
    }

    #[test]
    fn test_7bit_udl_counts_septets_after_udh() {
        let splitter = PduSplitter::new().with_references(ReferenceCounter::starting_at(9));
        let text = vec![b'x'; 200];
        let pdus = splitter.split(DataCoding::Gsm7Bit, &[], &text).unwrap();
        assert_eq!(pdus.len(), 2);

        let tpdu = SmsSubmit::new(destination()).encode(&pdus[0]).unwrap();
        // first octet, MR, DA (8), PID, DCS
        let udl_offset = 1 + 1 + 8 + 1 + 1;
        assert_eq!(tpdu[0], 0x41);
        assert_eq!(tpdu[udl_offset], 160);

        let ud = &tpdu[udl_offset + 1..];
        assert_eq!(ud.len(), 140);
        assert_eq!(&ud[..6], &[0x05, 0x00, 0x03, 9, 2, 1]);
        let septets = unpack_septets(&ud[6..], 1, 153).unwrap();
        assert_eq!(septets, vec![b'x'; 153]);
    }

    #[test]
    fn test_7bit_rejects_octets_above_septet_range() {
        let pdus = PduSplitter::new()
            .split(DataCoding::Gsm7Bit, &[], &[b'a', 0x80, b'b'])
            .unwrap();
        let result = SmsSubmit::new(destination()).encode(&pdus[0]);
        assert!(matches!(
            result,
            Err(CodecError::FieldValidation { field: "user_data", .. })
        ));
    }

    #[test]
    fn test_class0_general_group_packs_160_septets() {
        let pdus = PduSplitter::new()
            .split(DataCoding::from_byte(0x10), &[], &[b'a'; 160])
            .unwrap();
        assert_eq!(pdus.len(), 1);

        let tpdu = SmsSubmit::new(destination()).encode(&pdus[0]).unwrap();
        // first octet, MR, DA (8), PID
        let dcs_offset = 1 + 1 + 8 + 1;
        assert_eq!(tpdu[dcs_offset], 0x10);
        assert_eq!(tpdu[dcs_offset + 1], 160);
        assert_eq!(tpdu.len() - (dcs_offset + 2), 140);
    }

    #[test]
    fn test_ucs2_user_data_is_verbatim() {
        let payload = [0x00, 0x48, 0x00, 0x69];
        let pdus = PduSplitter::new().split(DataCoding::Ucs2, &[], &payload).unwrap();
        let tpdu = SmsSubmit::new(destination()).encode(&pdus[0]).unwrap();
        assert_eq!(tpdu[tpdu.len() - 5], 4);
        assert_eq!(&tpdu[tpdu.len() - 4..], &payload);
        assert_eq!(tpdu[tpdu.len() - 6], 0x08);
    }
}
