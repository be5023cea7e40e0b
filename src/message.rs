// ABOUTME: Message flavors (ring tone, WAP push, port-addressed binary, text) as splitter configuration
// ABOUTME: Provides the outbound SmsMessage type and its fluent builder

use crate::codec::CodecError;
use crate::datatypes::{Address, DataCoding, Pdu, UdhElement};
use crate::macros::builder_setters;
use crate::splitter::{EncodingError, PduSplitter};
use bytes::Bytes;

/// Nokia Smart Messaging ring tone port
pub const PORT_NOKIA_RING_TONE: u16 = 0x1581;
/// Nokia Smart Messaging operator logo port
pub const PORT_NOKIA_OPERATOR_LOGO: u16 = 0x1582;
/// Nokia Smart Messaging CLI (caller group) icon port
pub const PORT_NOKIA_CLI_LOGO: u16 = 0x1583;
/// WAP push connectionless session service port
pub const PORT_WAP_PUSH: u16 = 2948;
/// WAP WSP connectionless origin port
pub const PORT_WAP_WSP: u16 = 9200;

/// How a payload is coded and which headers every segment carries
///
/// A flavor is plain configuration for [`PduSplitter::split`]; there is no
/// per-flavor behavior beyond choosing these two values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageFlavor {
    pub data_coding: DataCoding,
    pub fixed_udh: Vec<UdhElement>,
}

impl MessageFlavor {
    pub fn new(data_coding: DataCoding, fixed_udh: Vec<UdhElement>) -> Self {
        Self {
            data_coding,
            fixed_udh,
        }
    }

    /// GSM 7-bit text; the payload holds one septet value per byte
    pub fn text() -> Self {
        Self::new(DataCoding::Gsm7Bit, Vec::new())
    }

    /// UCS-2 text; the payload holds big-endian UCS-2 octets
    pub fn unicode() -> Self {
        Self::new(DataCoding::Ucs2, Vec::new())
    }

    /// Raw 8-bit data without a header
    pub fn binary() -> Self {
        Self::new(DataCoding::EightBit, Vec::new())
    }

    /// 8-bit data addressed to a 16-bit application port
    pub fn binary_to_port(dest_port: u16, origin_port: u16) -> Self {
        Self::new(
            DataCoding::EightBit,
            vec![UdhElement::application_port_16bit(dest_port, origin_port)],
        )
    }

    /// Nokia ring tone in Smart Messaging binary format
    pub fn nokia_ring_tone() -> Self {
        Self::binary_to_port(PORT_NOKIA_RING_TONE, 0)
    }

    /// Nokia operator logo in Smart Messaging binary format
    pub fn nokia_operator_logo() -> Self {
        Self::binary_to_port(PORT_NOKIA_OPERATOR_LOGO, 0)
    }

    /// Nokia CLI icon in Smart Messaging binary format
    pub fn nokia_cli_logo() -> Self {
        Self::binary_to_port(PORT_NOKIA_CLI_LOGO, 0)
    }

    /// WAP push (WSP encoded push PDU)
    pub fn wap_push() -> Self {
        Self::binary_to_port(PORT_WAP_PUSH, PORT_WAP_WSP)
    }

    /// Replace the data coding, e.g. to add a message class
    pub fn with_data_coding(mut self, data_coding: DataCoding) -> Self {
        self.data_coding = data_coding;
        self
    }

    /// Split `payload` according to this flavor
    pub fn split(&self, splitter: &PduSplitter, payload: &[u8]) -> Result<Vec<Pdu>, EncodingError> {
        splitter.split(self.data_coding, &self.fixed_udh, payload)
    }
}

/// An outbound message: destination, flavor and payload
#[derive(Clone, Debug)]
pub struct SmsMessage {
    pub destination: Address,
    pub flavor: MessageFlavor,
    pub payload: Bytes,
    /// Request a delivery status report for every segment
    pub status_report: bool,
    /// Relative validity period, `None` omits TP-VP
    pub validity: Option<u8>,
}

impl SmsMessage {
    pub fn new(destination: Address, flavor: MessageFlavor, payload: impl Into<Bytes>) -> Self {
        Self {
            destination,
            flavor,
            payload: payload.into(),
            status_report: false,
            validity: None,
        }
    }

    /// A Nokia ring tone for `destination`
    pub fn ring_tone(destination: Address, ring_tone: impl Into<Bytes>) -> Self {
        Self::new(destination, MessageFlavor::nokia_ring_tone(), ring_tone)
    }

    /// UCS-2 text, encoded from UTF-16 code units
    pub fn unicode(destination: Address, text: &str) -> Self {
        let payload: Vec<u8> = text.encode_utf16().flat_map(u16::to_be_bytes).collect();
        Self::new(destination, MessageFlavor::unicode(), payload)
    }

    pub fn builder() -> SmsMessageBuilder {
        SmsMessageBuilder::default()
    }
}

/// Builder for constructing messages with a fluent API
#[derive(Debug)]
pub struct SmsMessageBuilder {
    to: Option<String>,
    payload: Bytes,
    flavor: MessageFlavor,
    status_report: bool,
    validity: Option<u8>,
}

impl Default for SmsMessageBuilder {
    fn default() -> Self {
        Self {
            to: None,
            payload: Bytes::new(),
            flavor: MessageFlavor::binary(),
            status_report: false,
            validity: None,
        }
    }
}

impl SmsMessageBuilder {
    /// Set destination phone number
    pub fn to(mut self, to: impl Into<String>) -> Self {
        self.to = Some(to.into());
        self
    }

    pub fn payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = payload.into();
        self
    }

    builder_setters! {
        flavor: MessageFlavor,
        status_report: bool,
        validity: Option<u8>,
    }

    /// Build the message, validating the destination number
    pub fn build(self) -> Result<SmsMessage, CodecError> {
        let to = self.to.ok_or_else(|| CodecError::FieldValidation {
            field: "destination",
            reason: "destination address is required".to_string(),
        })?;

        Ok(SmsMessage {
            destination: Address::new(&to)?,
            flavor: self.flavor,
            payload: self.payload,
            status_report: self.status_report,
            validity: self.validity,
        })
    }
}
